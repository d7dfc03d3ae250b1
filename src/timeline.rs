//! Timeline log of notable universe events
//!
//! Persisted to LocalStorage, keeps the most recent entries only.

use serde::{Deserialize, Serialize};

/// Maximum number of timeline entries to keep
pub const MAX_TIMELINE_ENTRIES: usize = 200;

/// What kind of event an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// Merges, bounces, shattering impacts
    Collision,
    /// A black hole swallowed something
    Absorption,
    /// Debris spawned or lost
    Debris,
    /// Degraded input or recovered failures
    Warning,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Collision => "collision",
            LogCategory::Absorption => "absorption",
            LogCategory::Debris => "debris",
            LogCategory::Warning => "warning",
        }
    }
}

/// A single timeline entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub message: String,
    pub category: LogCategory,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

/// Timeline, newest entry first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimelineLog {
    pub entries: Vec<TimelineEntry>,
}

impl TimelineLog {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cosmic_garden_timeline";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an entry, dropping the oldest past the cap
    pub fn push(&mut self, message: impl Into<String>, category: LogCategory, timestamp: f64) {
        self.entries.insert(
            0,
            TimelineEntry {
                message: message.into(),
                category,
                timestamp,
            },
        );
        self.entries.truncate(MAX_TIMELINE_ENTRIES);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&TimelineEntry> {
        self.entries.first()
    }

    pub fn by_category(&self, category: LogCategory) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Load the timeline from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(log) = serde_json::from_str::<TimelineLog>(&json) {
                    log::info!("Loaded {} timeline entries", log.entries.len());
                    return log;
                }
            }
        }

        Self::new()
    }

    /// Save the timeline to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Current wall-clock time in ms
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = TimelineLog::new();
        log.push("first", LogCategory::Collision, 1.0);
        log.push("second", LogCategory::Absorption, 2.0);

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().unwrap().message, "second");
    }

    #[test]
    fn test_bounded() {
        let mut log = TimelineLog::new();
        for i in 0..(MAX_TIMELINE_ENTRIES + 25) {
            log.push(format!("event {}", i), LogCategory::Debris, i as f64);
        }
        assert_eq!(log.len(), MAX_TIMELINE_ENTRIES);
        assert_eq!(
            log.latest().unwrap().message,
            format!("event {}", MAX_TIMELINE_ENTRIES + 24)
        );
    }

    #[test]
    fn test_by_category() {
        let mut log = TimelineLog::new();
        log.push("a", LogCategory::Collision, 0.0);
        log.push("b", LogCategory::Warning, 0.0);
        log.push("c", LogCategory::Collision, 0.0);

        assert_eq!(log.by_category(LogCategory::Collision).count(), 2);
        assert_eq!(log.by_category(LogCategory::Warning).count(), 1);
        assert_eq!(log.by_category(LogCategory::Debris).count(), 0);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&LogCategory::Absorption).unwrap();
        assert_eq!(json, "\"absorption\"");
    }
}
