#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod board;
pub mod bridge;
pub mod config;
pub mod debounce;
pub mod error;
pub mod history;
pub mod identifier;
pub mod input;
pub mod mirror;
pub mod snapshot;
pub mod store;
pub mod surface;
pub mod tool;

pub use app::BoardApp;
pub use board::{Board, Bridges, SnapshotSource, StrokeState, ToolbarButton};
pub use bridge::{Ack, ButtonBridge, ButtonPressLog, SnapshotBridge, SnapshotRegistry};
pub use config::BoardConfig;
pub use error::{BoardError, BridgeError, SnapshotError, StoreError};
pub use history::FrameHistory;
pub use identifier::WidgetId;
pub use input::{PointerEvent, Shortcut};
pub use mirror::SnapshotMirror;
pub use snapshot::Snapshot;
pub use store::{LocalStore, MemoryStore};
pub use surface::{Composite, Surface};
pub use tool::{Tool, ToolState};
