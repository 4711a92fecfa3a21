//! Local fallback store for the last persisted frame.
//!
//! One value per board, keyed `<prefix>_<widget-id>`, overwritten on every
//! persist and read once when the board loads.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::identifier::WidgetId;

pub const DEFAULT_STORAGE_PREFIX: &str = "board_snapshot_dataurl";

pub fn storage_key(prefix: &str, id: &WidgetId) -> String {
    format!("{prefix}_{id}")
}

/// Key/value store surviving reloads, like a browser's `localStorage`
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-memory store, used in tests and when nothing durable is available
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::PathBuf;

    use super::LocalStore;
    use crate::error::StoreResult;

    /// One file per key inside a directory
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.txt"))
        }
    }

    impl LocalStore for FileStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(value) => Ok(Some(value)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            fs::create_dir_all(&self.dir)?;
            fs::write(self.path_for(key), value)?;
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStore;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::LocalStore;
    use crate::error::{StoreError, StoreResult};

    /// `window.localStorage`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserStore;

    // The handle is looked up on every call so the store itself stays Send.
    fn local_storage() -> StoreResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::Unavailable("localStorage".to_owned()))
    }

    impl LocalStore for BrowserStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            local_storage()?
                .get_item(key)
                .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            local_storage()?
                .set_item(key, value)
                .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
        }
    }
}

/// A store that is never available. Reads and writes fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl LocalStore for UnavailableStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("no local store".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("no local store".to_owned()))
    }
}
