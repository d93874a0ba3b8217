use crate::crawler::parser::MetaKind;
use crate::sanitize::Sanitizer;
use crate::state::{lock_state, PageField, PageRecord, SharedState};

/// Merges extracted values into the per-URL page records
///
/// Each handler takes the shared lock for one field update only.
#[derive(Debug, Clone)]
pub struct ExtractionSink {
    sanitizer: Sanitizer,
}

impl ExtractionSink {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }

    pub fn on_title(&self, state: &SharedState, key: &str, title: String) {
        lock_state(state).apply(key, PageField::Title(title));
    }

    pub fn on_meta(&self, state: &SharedState, key: &str, kind: MetaKind, content: String) {
        let field = match kind {
            MetaKind::Description => PageField::Description(content),
            MetaKind::Keywords => PageField::Keywords(content),
        };
        lock_state(state).apply(key, field);
    }

    /// Sanitizes the raw body before taking the lock
    pub fn on_body(&self, state: &SharedState, key: &str, raw: &str) {
        let body = self.sanitizer.sanitize_body(raw);
        lock_state(state).apply(key, PageField::Body(body));
    }

    /// The URL-stamped record for `key`, if its body is non-empty
    pub fn take_completed(&self, state: &SharedState, key: &str) -> Option<PageRecord> {
        lock_state(state).completed_record(key)
    }
}
