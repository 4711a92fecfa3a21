#![warn(clippy::all, rust_2018_idioms)]

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use std::path::PathBuf;
    use std::sync::Arc;

    use board::bridge::{ButtonPressLog, SnapshotRegistry};
    use board::store::{FileStore, LocalStore, MemoryStore};
    use board::{Board, BoardApp, BoardConfig, Bridges, WidgetId};

    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config_path = std::env::var_os("BOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("board.json"));
    let config = BoardConfig::load_or_default(&config_path);

    let id = WidgetId::sanitize(&std::env::args().nth(1).unwrap_or_default());

    let registry = SnapshotRegistry::global();
    registry.set_snapshot_dir(config.snapshot_dir.clone());
    let callback = registry.register(&id);
    let button_callback = registry.register_button_callback(&id);
    log::info!("Board {id} using callbacks {callback} and {button_callback}");

    let store: Arc<dyn LocalStore> = match &config.store_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };

    let bridges = Bridges {
        initial_snapshot: registry.initial_snapshot(&id),
        mirror: registry.mirror(&id),
        snapshot: Some(registry),
        button: Some(Arc::new(ButtonPressLog::new())),
        store,
    };
    let board = Board::new(id.clone(), config, bridges);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 600.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        &format!("Board {id}"),
        native_options,
        Box::new(|_cc| Ok(Box::new(BoardApp::new(board)))),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use std::sync::Arc;

    use board::bridge::{ButtonPressLog, SnapshotRegistry};
    use board::store::BrowserStore;
    use board::{Board, BoardApp, BoardConfig, Bridges, WidgetId};
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` message to `console.log` and friends:
    if let Err(err) = eframe::WebLogger::init(log::LevelFilter::Debug) {
        web_sys::console::error_1(&format!("Logger already set: {err}").into());
    }

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async move {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            log::error!("No document to mount the board in");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("the_canvas_id")
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("the_canvas_id is missing or not a canvas");
            return;
        };

        let id = WidgetId::sanitize(&canvas.get_attribute("data-board-id").unwrap_or_default());
        let registry = SnapshotRegistry::global();
        registry.register(&id);
        registry.register_button_callback(&id);

        let bridges = Bridges {
            initial_snapshot: registry.initial_snapshot(&id),
            mirror: registry.mirror(&id),
            snapshot: Some(registry),
            button: Some(Arc::new(ButtonPressLog::new())),
            store: Arc::new(BrowserStore),
        };
        let board = Board::new(id, BoardConfig::default(), bridges);

        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|_cc| Ok(Box::new(BoardApp::new(board)))),
            )
            .await;
        if let Err(err) = started {
            log::error!("Failed to start the board: {err:?}");
        }
    });
}
