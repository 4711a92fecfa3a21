//! Host-side collaborators the board talks to.
//!
//! Both bridges are one-way: the board sends and never waits on the answer.
//! Failures are logged where the future is driven and never reach drawing.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::identifier::WidgetId;
use crate::mirror::SnapshotMirror;
use crate::snapshot::Snapshot;

/// Receipt returned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
}

/// Accepts the exported frame of a board and keeps it across reloads
pub trait SnapshotBridge: Send + Sync {
    fn push_snapshot(&self, id: &WidgetId, data_url: String) -> BoxFuture<'static, BridgeResult<Ack>>;
}

/// Told whenever any toolbar button is pressed. What happens next is up to
/// the host.
pub trait ButtonBridge: Send + Sync {
    fn button_pressed(&self, id: &WidgetId) -> BoxFuture<'static, BridgeResult<()>>;
}

pub fn snapshot_callback_name(id: &WidgetId) -> String {
    format!("persist.pushSnapshot.{id}")
}

pub fn snapshot_file_name(id: &WidgetId) -> String {
    format!("board_{id}.png")
}

#[derive(Debug, Default)]
struct RegistryEntry {
    latest: Option<String>,
    mirror: SnapshotMirror,
}

/// Process-wide snapshot store keyed by widget id.
///
/// Entries are created on first registration, updated on every push and
/// live as long as the process.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    entries: RwLock<HashMap<WidgetId, RegistryEntry>>,
    callbacks: Mutex<HashSet<String>>,
    snapshot_dir: RwLock<Option<PathBuf>>,
}

static GLOBAL_REGISTRY: LazyLock<Arc<SnapshotRegistry>> = LazyLock::new(|| Arc::new(SnapshotRegistry::new()));

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every board in this process
    pub fn global() -> Arc<SnapshotRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Also write each pushed frame to `<dir>/board_<id>.png`
    pub fn set_snapshot_dir(&self, dir: Option<PathBuf>) {
        *self.snapshot_dir.write() = dir;
    }

    /// Create-or-update the entry for `id`. Returns the snapshot callback
    /// name, registered once per id.
    pub fn register(&self, id: &WidgetId) -> String {
        self.entries.write().entry(id.clone()).or_default();

        let name = snapshot_callback_name(id);
        if self.callbacks.lock().insert(name.clone()) {
            log::debug!("Registered callback {name}");
        }
        name
    }

    /// Register a button callback under a fresh name, so every construction
    /// of a board gets its own
    pub fn register_button_callback(&self, id: &WidgetId) -> String {
        let name = format!("persist.buttonPressed.{id}.{}", uuid::Uuid::new_v4().simple());
        self.callbacks.lock().insert(name.clone());
        log::debug!("Registered callback {name}");
        name
    }

    pub fn is_registered(&self, callback_name: &str) -> bool {
        self.callbacks.lock().contains(callback_name)
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// The mirror element kept next to the board with this id
    pub fn mirror(&self, id: &WidgetId) -> SnapshotMirror {
        self.entries.write().entry(id.clone()).or_default().mirror.clone()
    }

    pub fn latest(&self, id: &WidgetId) -> Option<String> {
        self.entries.read().get(id).and_then(|entry| entry.latest.clone())
    }

    /// The snapshot a freshly constructed board should start from: the last
    /// push seen by this process, else the PNG left in the snapshot directory.
    pub fn initial_snapshot(&self, id: &WidgetId) -> Option<String> {
        if let Some(latest) = self.latest(id) {
            return Some(latest);
        }
        let dir = self.snapshot_dir.read().clone()?;
        read_png_as_data_url(&dir.join(snapshot_file_name(id)))
    }

    /// Record a pushed frame
    pub fn store(&self, id: &WidgetId, data_url: String) -> BridgeResult<Ack> {
        let snapshot = Snapshot::from_data_url(&data_url)?;

        if let Some(dir) = self.snapshot_dir.read().clone() {
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(snapshot_file_name(id)), snapshot.png())?;
        }

        let mut entries = self.entries.write();
        let entry = entries.entry(id.clone()).or_default();
        entry.mirror.set_src(data_url.clone());
        entry.latest = Some(data_url);
        log::debug!("Stored snapshot for {id} ({} bytes)", snapshot.png().len());

        Ok(Ack::OK)
    }
}

impl SnapshotBridge for SnapshotRegistry {
    fn push_snapshot(&self, id: &WidgetId, data_url: String) -> BoxFuture<'static, BridgeResult<Ack>> {
        futures::future::ready(self.store(id, data_url)).boxed()
    }
}

fn read_png_as_data_url(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(png) => Some(Snapshot::from_png(png).to_data_url()),
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not read snapshot {}: {}", path.display(), err);
            }
            None
        }
    }
}

/// Button bridge that logs every press and counts them
#[derive(Debug, Default)]
pub struct ButtonPressLog {
    presses: AtomicUsize,
}

impl ButtonPressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presses(&self) -> usize {
        self.presses.load(Ordering::SeqCst)
    }
}

impl ButtonBridge for ButtonPressLog {
    fn button_pressed(&self, id: &WidgetId) -> BoxFuture<'static, BridgeResult<()>> {
        self.presses.fetch_add(1, Ordering::SeqCst);
        log::info!("button pressed ({id})");
        futures::future::ready(Ok(())).boxed()
    }
}

/// A snapshot bridge that refuses everything, for hosts without a kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBridge;

impl SnapshotBridge for DetachedBridge {
    fn push_snapshot(&self, _id: &WidgetId, _data_url: String) -> BoxFuture<'static, BridgeResult<Ack>> {
        futures::future::ready(Err(BridgeError::Rejected("no host attached".to_owned()))).boxed()
    }
}
