//! Boards of the signed-in user, shared by the board list and the views
//! that change boards.

use dioxus::prelude::*;
use store::Board;

use crate::auth::{use_auth, use_backend, Backend};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardStore {
    pub boards: Vec<Board>,
    pub favorite_ids: Vec<i64>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BoardStore {
    pub fn board(&self, id: i64) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorite_ids.contains(&id)
    }

    /// Boards created by `user_id`, then boards shared with them.
    pub fn partition(&self, user_id: i64) -> (Vec<Board>, Vec<Board>) {
        self.boards.iter().cloned().partition(|b| b.is_owned_by(user_id))
    }

    pub fn favorites(&self) -> Vec<Board> {
        self.boards
            .iter()
            .filter(|b| self.is_favorite(b.id))
            .cloned()
            .collect()
    }

    /// Insert or replace by id.
    pub fn upsert(&mut self, board: Board) {
        match self.boards.iter_mut().find(|b| b.id == board.id) {
            Some(existing) => *existing = board,
            None => self.boards.push(board),
        }
    }

    pub fn remove(&mut self, id: i64) {
        self.boards.retain(|b| b.id != id);
        self.favorite_ids.retain(|f| *f != id);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub fn use_boards() -> Signal<BoardStore> {
    use_context::<Signal<BoardStore>>()
}

/// Reload boards and favourites. A failed favourites call only empties the
/// favourites.
pub async fn refresh_boards(mut boards: Signal<BoardStore>, backend: Backend) {
    boards.write().loading = true;
    let client = backend.client();
    let (mine, favorites) = futures::join!(client.my_boards(), client.favorite_boards());
    let mut store = boards.write();
    store.loading = false;
    match mine {
        Ok(list) => {
            store.boards = list;
            store.error = None;
        }
        Err(e) => {
            tracing::error!("could not load boards: {e}");
            store.error = Some(backend.handle_error(&e));
        }
    }
    store.favorite_ids = match favorites {
        Ok(list) => list.into_iter().map(|b| b.id).collect(),
        Err(e) => {
            tracing::warn!("could not load favourite boards: {e}");
            Vec::new()
        }
    };
}

/// Loads the board list whenever the signed-in user changes.
#[component]
pub fn BoardsProvider(children: Element) -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let mut boards = use_context_provider(|| Signal::new(BoardStore::default()));

    let user_id = use_memo(move || auth.read().user_id());
    let _loader = use_resource(move || async move {
        if user_id().is_none() {
            boards.write().clear();
            return;
        }
        refresh_boards(boards, backend).await;
    });

    rsx! {
        {children}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(id: i64, owner: i64) -> Board {
        Board {
            id,
            name: format!("Board {id}"),
            user_id: owner,
            ..Default::default()
        }
    }

    #[test]
    fn test_partition_by_owner() {
        let store = BoardStore {
            boards: vec![board(1, 7), board(2, 8), board(3, 7)],
            ..Default::default()
        };
        let (mine, shared) = store.partition(7);
        assert_eq!(mine.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(shared.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_upsert_and_remove() {
        let mut store = BoardStore {
            boards: vec![board(1, 7)],
            favorite_ids: vec![1],
            ..Default::default()
        };
        let mut renamed = board(1, 7);
        renamed.name = "Renamed".into();
        store.upsert(renamed);
        store.upsert(board(2, 7));
        assert_eq!(store.boards.len(), 2);
        assert_eq!(store.board(1).map(|b| b.name.as_str()), Some("Renamed"));

        store.remove(1);
        assert!(store.board(1).is_none());
        assert!(!store.is_favorite(1));
    }
}
