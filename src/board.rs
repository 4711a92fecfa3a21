//! The drawing board engine.
//!
//! Owns the pixel surface, the tool state, the bounded undo/redo history and
//! the debounced persistence of the current frame. Everything runs on the
//! caller's thread: the frame loop calls [`Board::update`] to fire a due
//! persist and drive in-flight bridge calls.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use egui::{Color32, Pos2};
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use web_time::{Duration, Instant};

use crate::bridge::{ButtonBridge, SnapshotBridge};
use crate::config::BoardConfig;
use crate::debounce::Debouncer;
use crate::error::{BoardResult, SnapshotError};
use crate::history::FrameHistory;
use crate::identifier::WidgetId;
use crate::input::{PointerEvent, Shortcut};
use crate::mirror::SnapshotMirror;
use crate::snapshot::{Snapshot, is_image_payload};
use crate::store::{LocalStore, MemoryStore, storage_key};
use crate::surface::Surface;
use crate::tool::{Tool, ToolState};

/// Drawing state machine: `Idle -> Active -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Active {
        last: Pos2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Pen,
    Eraser,
    Undo,
    Redo,
    Clear,
    Download,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 6] = [
        ToolbarButton::Pen,
        ToolbarButton::Eraser,
        ToolbarButton::Undo,
        ToolbarButton::Redo,
        ToolbarButton::Clear,
        ToolbarButton::Download,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolbarButton::Pen => "✏ Pen",
            ToolbarButton::Eraser => "⌫ Eraser",
            ToolbarButton::Undo => "↩ Undo",
            ToolbarButton::Redo => "↪ Redo",
            ToolbarButton::Clear => "🗑 Clear",
            ToolbarButton::Download => "⬇ Download PNG",
        }
    }
}

/// Where the board found the snapshot it started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Initial,
    Mirror,
    LocalStore,
}

/// Host services a board talks to
pub struct Bridges {
    pub snapshot: Option<Arc<dyn SnapshotBridge>>,
    pub button: Option<Arc<dyn ButtonBridge>>,
    pub store: Arc<dyn LocalStore>,
    pub mirror: SnapshotMirror,
    /// Snapshot supplied by the host at construction time
    pub initial_snapshot: Option<String>,
}

impl Default for Bridges {
    fn default() -> Self {
        Self {
            snapshot: None,
            button: None,
            store: Arc::new(MemoryStore::new()),
            mirror: SnapshotMirror::new(),
            initial_snapshot: None,
        }
    }
}

pub struct Board {
    id: WidgetId,
    config: BoardConfig,
    surface: Surface,
    tools: ToolState,
    history: FrameHistory,
    stroke: StrokeState,
    persist: Debouncer,
    device_pixel_ratio: f32,
    laid_out: bool,
    storage_key: String,
    bridges: Bridges,
    pool: LocalPool,
    spawner: LocalSpawner,
    /// Bumped whenever the surface content changes
    revision: u64,
    persist_count: usize,
}

impl Board {
    pub fn new(id: WidgetId, config: BoardConfig, bridges: Bridges) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let storage_key = storage_key(&config.storage_prefix, &id);
        let tools = ToolState::new(config.default_color(), config.default_width);
        let history = FrameHistory::with_limit(config.history_limit);
        let persist = Debouncer::new(config.persist_debounce());

        Self {
            id,
            config,
            surface: Surface::new(1, 1),
            tools,
            history,
            stroke: StrokeState::Idle,
            persist,
            device_pixel_ratio: 1.0,
            laid_out: false,
            storage_key,
            bridges,
            pool,
            spawner,
            revision: 0,
            persist_count: 0,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolState {
        &mut self.tools
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.stroke, StrokeState::Active { .. })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn mirror(&self) -> &SnapshotMirror {
        &self.bridges.mirror
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// A persist is waiting for its quiet period to end
    pub fn persist_pending(&self) -> bool {
        self.persist.is_pending()
    }

    /// Time left before the pending persist fires, zero once it is due
    pub fn persist_remaining(&self, now: Instant) -> Option<Duration> {
        self.persist.remaining(now)
    }

    /// Number of persists run so far
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Size the backing buffer to the layout box. The first call fills it
    /// white and loads the persisted snapshot; later calls with a new size
    /// rescale the existing content.
    pub fn layout(&mut self, box_width: f32, box_height: f32, device_pixel_ratio: f32) {
        let device_pixel_ratio = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
        self.device_pixel_ratio = device_pixel_ratio;
        let (width, height) = Surface::backing_size(box_width, box_height, device_pixel_ratio);

        if !self.laid_out {
            self.surface = Surface::new(width, height);
            self.laid_out = true;
            self.touch();
            log::debug!("Board {} laid out at {}x{}", self.id, width, height);
            self.load_persisted();
        } else if (width, height) != self.surface.size() {
            log::debug!(
                "Board {} resized {:?} -> {}x{}",
                self.id,
                self.surface.size(),
                width,
                height
            );
            self.surface.resize(width, height);
            self.touch();
        }
    }

    /// Look for a persisted snapshot, first match wins: the host-supplied
    /// initial snapshot, then the mirror element, then the local store.
    /// A found snapshot is drawn and becomes the bottom undo entry.
    pub fn load_persisted(&mut self) -> Option<SnapshotSource> {
        let (source, payload) = self.find_persisted()?;

        match decode_payload(&payload) {
            Ok(image) => {
                self.surface.draw_image_scaled(&image);
                if let Some(frame) = self.capture() {
                    self.history.seed(frame);
                }
                self.touch();
                log::info!("Board {} restored from {:?}", self.id, source);
                Some(source)
            }
            Err(err) => {
                log::warn!("Ignoring unreadable snapshot for {} from {:?}: {}", self.id, source, err);
                None
            }
        }
    }

    fn find_persisted(&self) -> Option<(SnapshotSource, String)> {
        if let Some(initial) = self.bridges.initial_snapshot.as_deref().filter(|s| !s.is_empty()) {
            return Some((SnapshotSource::Initial, initial.to_owned()));
        }
        if let Some(src) = self.bridges.mirror.image_payload() {
            return Some((SnapshotSource::Mirror, src));
        }
        match self.bridges.store.get(&self.storage_key) {
            Ok(Some(saved)) if is_image_payload(&saved) => Some((SnapshotSource::LocalStore, saved)),
            Ok(_) => None,
            Err(err) => {
                log::debug!("Local store read failed for {}: {}", self.storage_key, err);
                None
            }
        }
    }

    /// The current frame as a history entry. `None` if it could not be
    /// encoded; the failure is logged.
    fn capture(&self) -> Option<Snapshot> {
        match Snapshot::encode(self.surface.pixels()) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::error!("Failed to capture board {}: {}", self.id, err);
                None
            }
        }
    }

    fn restore(&mut self, frame: &Snapshot) {
        match frame.decode() {
            Ok(image) => self.surface.restore(&image),
            Err(err) => log::error!("Failed to restore board {} from history: {}", self.id, err),
        }
    }

    fn stroke_width(&self) -> f32 {
        self.tools.width() * self.device_pixel_ratio
    }

    /// Start a stroke at `pos` (backing pixels). Returns false if a stroke is
    /// already active.
    pub fn pointer_down(&mut self, pos: Pos2) -> bool {
        if self.is_drawing() {
            return false;
        }
        if let Some(frame) = self.capture() {
            self.history.push(frame);
        }
        self.stroke = StrokeState::Active { last: pos };
        let (width, composite) = (self.stroke_width(), self.tools.composite());
        self.surface.stroke_segment(pos, pos, width, composite);
        self.touch();
        true
    }

    /// Continue the active stroke. Ignored while idle.
    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        let StrokeState::Active { last } = self.stroke else {
            return false;
        };
        let (width, composite) = (self.stroke_width(), self.tools.composite());
        self.surface.stroke_segment(last, pos, width, composite);
        self.stroke = StrokeState::Active { last: pos };
        self.touch();
        true
    }

    /// Finish the active stroke (pointer up, leave or cancel) and schedule a
    /// persist. Ignored while idle.
    pub fn end_stroke(&mut self, now: Instant) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.stroke = StrokeState::Idle;
        self.persist.schedule(now);
        true
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up | PointerEvent::Leave | PointerEvent::Cancel => self.end_stroke(now),
        }
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let Some(previous) = self.capture().and_then(|current| self.history.undo(current)) else {
            return false;
        };
        self.restore(&previous);
        self.touch();
        self.persist.schedule(now);
        true
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let Some(next) = self.capture().and_then(|current| self.history.redo(current)) else {
            return false;
        };
        self.restore(&next);
        self.touch();
        self.persist.schedule(now);
        true
    }

    /// Fill the whole surface white. Undoable.
    pub fn clear(&mut self, now: Instant) {
        if let Some(frame) = self.capture() {
            self.history.push(frame);
        }
        self.surface.fill(Color32::WHITE);
        self.touch();
        self.persist.schedule(now);
    }

    pub fn key_shortcut(&mut self, shortcut: Shortcut, now: Instant) -> bool {
        match shortcut {
            Shortcut::Undo => self.undo(now),
            Shortcut::Redo => self.redo(now),
        }
    }

    /// `<id>_YYYY-MM-DD_HH-MM-SS.png`
    pub fn download_file_name(&self, at: NaiveDateTime) -> String {
        format!("{}_{}.png", self.id, at.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Write the current frame as a PNG into `dir`
    pub fn download(&self, dir: &Path, at: NaiveDateTime) -> BoardResult<PathBuf> {
        let snapshot = Snapshot::encode(self.surface.pixels())?;
        fs::create_dir_all(dir)?;
        let path = dir.join(self.download_file_name(at));
        fs::write(&path, snapshot.png())?;
        log::info!("Downloaded {}", path.display());
        Ok(path)
    }

    /// Handle a toolbar button. Every button first notifies the button
    /// bridge, whatever it does itself.
    pub fn press(&mut self, button: ToolbarButton, now: Instant) -> BoardResult<()> {
        self.notify_button_pressed();

        match button {
            ToolbarButton::Pen => self.tools.set_tool(Tool::Pen),
            ToolbarButton::Eraser => self.tools.set_tool(Tool::Eraser),
            ToolbarButton::Undo => {
                self.undo(now);
            }
            ToolbarButton::Redo => {
                self.redo(now);
            }
            ToolbarButton::Clear => self.clear(now),
            ToolbarButton::Download => {
                let at = chrono::Local::now().naive_local();
                let dir = self.config.download_dir.clone();
                self.download(&dir, at)?;
            }
        }
        Ok(())
    }

    fn notify_button_pressed(&self) {
        let Some(bridge) = &self.bridges.button else {
            log::debug!("button pressed (no host attached)");
            return;
        };
        let call = bridge.button_pressed(&self.id);
        let spawned = self.spawner.spawn_local(async move {
            if let Err(err) = call.await {
                log::warn!("Button bridge failed: {err}");
            }
        });
        if let Err(err) = spawned {
            log::warn!("Could not spawn button notification: {err}");
        }
    }

    /// Fire a due persist and drive in-flight bridge calls
    pub fn update(&mut self, now: Instant) {
        if self.persist.fire_due(now) {
            self.persist_now();
        }
        self.pool.run_until_stalled();
    }

    /// Export the current frame to the local store, the mirror and the
    /// snapshot bridge. Failures are logged and never affect drawing.
    pub fn persist_now(&mut self) {
        self.persist.cancel();
        self.persist_count += 1;

        let data_url = match Snapshot::encode(self.surface.pixels()) {
            Ok(snapshot) => snapshot.to_data_url(),
            Err(err) => {
                log::error!("Failed to export board {}: {}", self.id, err);
                return;
            }
        };

        if let Err(err) = self.bridges.store.set(&self.storage_key, &data_url) {
            log::debug!("Local store write failed for {}: {}", self.storage_key, err);
        }
        self.bridges.mirror.set_src(data_url.clone());

        if let Some(bridge) = &self.bridges.snapshot {
            let id = self.id.clone();
            let call = bridge.push_snapshot(&id, data_url);
            let spawned = self.spawner.spawn_local(async move {
                match call.await {
                    Ok(ack) => log::debug!("Snapshot for {id} accepted (ok: {})", ack.ok),
                    Err(err) => log::error!("Snapshot bridge failed for {id}: {err}"),
                }
            });
            if let Err(err) = spawned {
                log::warn!("Could not spawn snapshot push: {err}");
            }
        }
    }
}

fn decode_payload(payload: &str) -> Result<image::RgbaImage, SnapshotError> {
    Snapshot::from_data_url(payload)?.decode()
}
