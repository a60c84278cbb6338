//! User-visible alert log.
//!
//! Views report outcomes ("Board created", "Could not load cards: ...") here
//! instead of popping dialogs. The log lives in a `Signal<AlertLog>` context
//! provided by the platform app; [`AlertPanel`](crate::AlertPanel) renders it.

use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertLevel::Info => "alert-entry info",
            AlertLevel::Success => "alert-entry success",
            AlertLevel::Warning => "alert-entry warning",
            AlertLevel::Error => "alert-entry error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlertEntry {
    pub timestamp: String,
    pub level: AlertLevel,
    pub message: String,
}

/// Oldest entries are dropped past this size.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlertLog {
    pub entries: Vec<AlertEntry>,
    pub visible: bool,
}

impl AlertLog {
    pub fn push(&mut self, level: AlertLevel, message: &str, timestamp: String) {
        self.entries.push(AlertEntry {
            timestamp,
            level,
            message: message.to_string(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
        // Errors open the panel so they are not missed.
        if level == AlertLevel::Error {
            self.visible = true;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == AlertLevel::Error)
    }
}

pub fn use_alerts() -> Signal<AlertLog> {
    use_context::<Signal<AlertLog>>()
}

pub fn alert(log: &mut Signal<AlertLog>, level: AlertLevel, message: &str) {
    match level {
        AlertLevel::Error => tracing::error!("{message}"),
        AlertLevel::Warning => tracing::warn!("{message}"),
        _ => tracing::info!("{message}"),
    }
    #[cfg(target_arch = "wasm32")]
    if level == AlertLevel::Error {
        web_sys::console::warn_1(&message.into());
    }
    log.write().push(level, message, current_time());
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_opens_panel() {
        let mut log = AlertLog::default();
        log.push(AlertLevel::Info, "loaded", "10:00:00".into());
        assert!(!log.visible);
        log.push(AlertLevel::Error, "boom", "10:00:01".into());
        assert!(log.visible);
        assert!(log.has_errors());
    }

    #[test]
    fn test_caps_entries() {
        let mut log = AlertLog::default();
        for i in 0..(MAX_ENTRIES + 5) {
            log.push(AlertLevel::Info, &format!("entry {i}"), String::new());
        }
        assert_eq!(log.entries.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].message, "entry 5");
    }
}
