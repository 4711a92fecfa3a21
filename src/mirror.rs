use std::sync::Arc;

use parking_lot::RwLock;

use crate::snapshot::is_image_payload;

/// Hidden mirror of the last persisted frame that the host keeps next to the
/// board, the equivalent of an `<img>` whose `src` is overwritten on persist.
///
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct SnapshotMirror {
    src: Arc<RwLock<Option<String>>>,
}

impl SnapshotMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_src(src: impl Into<String>) -> Self {
        let mirror = Self::new();
        mirror.set_src(src);
        mirror
    }

    pub fn src(&self) -> Option<String> {
        self.src.read().clone()
    }

    pub fn set_src(&self, src: impl Into<String>) {
        *self.src.write() = Some(src.into());
    }

    /// The current source, only if it is an inline image payload
    pub fn image_payload(&self) -> Option<String> {
        self.src.read().as_deref().filter(|src| is_image_payload(src)).map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let mirror = SnapshotMirror::new();
        let other = mirror.clone();
        other.set_src("data:image/png;base64,AA==");
        assert_eq!(mirror.src().as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn test_image_payload_filters_other_sources() {
        assert_eq!(SnapshotMirror::with_src("").image_payload(), None);
        assert_eq!(SnapshotMirror::with_src("https://x/y.png").image_payload(), None);
        assert!(SnapshotMirror::with_src("data:image/png;base64,AA==").image_payload().is_some());
    }
}
