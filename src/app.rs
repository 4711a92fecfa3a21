use egui::{Color32, ColorImage, RichText, Slider, TextureHandle, TextureOptions};
use web_time::Instant;

use crate::board::{Board, ToolbarButton};
use crate::input::{self, PointerTracker};
use crate::tool::{MAX_WIDTH, MIN_WIDTH, Tool};

pub struct BoardApp {
    board: Board,
    pointer: PointerTracker,
    texture: Option<TextureHandle>,
    /// Board revision the texture was last uploaded at
    uploaded_revision: Option<u64>,
    status: Option<String>,
}

impl BoardApp {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            pointer: PointerTracker::new(),
            texture: None,
            uploaded_revision: None,
            status: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        ui.horizontal_wrapped(|ui| {
            for button in ToolbarButton::ALL {
                self.toolbar_button(ui, button, now);
                if button == ToolbarButton::Eraser {
                    self.tool_settings(ui);
                }
            }
        });
    }

    /// Every button stays clickable so each click reaches the host. Undo and
    /// redo are only dimmed while there is nothing to restore.
    fn toolbar_button(&mut self, ui: &mut egui::Ui, button: ToolbarButton, now: Instant) -> egui::Response {
        let selected = match button {
            ToolbarButton::Pen => self.board.tools().tool() == Tool::Pen,
            ToolbarButton::Eraser => self.board.tools().tool() == Tool::Eraser,
            _ => false,
        };
        let idle = match button {
            ToolbarButton::Undo => !self.board.can_undo(),
            ToolbarButton::Redo => !self.board.can_redo(),
            _ => false,
        };

        let mut text = RichText::new(button.label());
        if idle {
            text = text.weak();
        }
        let response = ui.add(egui::Button::new(text).selected(selected));
        if response.clicked() {
            match self.board.press(button, now) {
                Ok(()) if button == ToolbarButton::Download => {
                    self.status = Some("Image saved".to_owned());
                }
                Ok(()) => {}
                Err(err) => {
                    log::error!("{button:?} failed: {err}");
                    self.status = Some("Could not download the image".to_owned());
                }
            }
        }
        response
    }

    fn tool_settings(&mut self, ui: &mut egui::Ui) {
        ui.label("Color");
        let mut color = self.board.tools().color();
        if egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::Opaque).changed() {
            self.board.tools_mut().set_color(color);
        }

        ui.label("Width");
        let mut width = self.board.tools().width();
        if ui.add(Slider::new(&mut width, MIN_WIDTH..=MAX_WIDTH).step_by(1.0)).changed() {
            self.board.tools_mut().set_width(width);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(ui.available_width(), self.board.config().canvas_height);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());
        let rect = response.rect;
        let dpr = ui.ctx().pixels_per_point();

        self.board.layout(rect.width(), rect.height(), dpr);

        let now = Instant::now();
        for event in self.pointer.process(ui.ctx(), rect, dpr) {
            self.board.handle_pointer(event, now);
        }
        for shortcut in input::shortcuts(ui.ctx()) {
            self.board.key_shortcut(shortcut, now);
        }

        self.upload_texture(ui.ctx());
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        painter.rect_stroke(rect, 12.0, egui::Stroke::new(1.0, Color32::from_rgb(0xe2, 0xe8, 0xf0)));
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let revision = self.board.revision();
        if self.uploaded_revision == Some(revision) {
            return;
        }

        let pixels = self.board.surface().pixels();
        let image = ColorImage::from_rgba_unmultiplied(
            [pixels.width() as usize, pixels.height() as usize],
            pixels.as_raw(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    format!("board_{}", self.board.id()),
                    image,
                    TextureOptions::LINEAR,
                ));
            }
        }
        self.uploaded_revision = Some(revision);
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Board:");
                ui.strong(self.board.id().as_str());
            });

            self.toolbar(ui);

            if let Some(status) = &self.status {
                ui.small(status);
            }

            self.canvas(ui);
        });

        let now = Instant::now();
        self.board.update(now);

        if let Some(remaining) = self.board.persist_remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    /// Flush a pending persist so the last strokes survive shutdown
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.board.persist_pending() {
            self.board.persist_now();
            self.board.update(Instant::now());
        }
    }
}
