//! Platform session store constructor.
//!
//! Returns a [`store::SessionStore`] backed by:
//! - **Web** (WASM + `web` feature): `localStorage["auth-storage"]` via [`store::LocalStorageStore`]
//! - **Desktop** (native): `<data_dir>/kanban/auth-storage.json` via [`store::FileSessionStore`]
//!
//! Any other target keeps the session in memory for the lifetime of the app.

pub fn session_store() -> impl store::SessionStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalStorageStore::new()
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        store::MemorySessionStore::new()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("kanban");
        store::FileSessionStore::new(base)
    }
}
