use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::surface::Composite;

pub const MIN_WIDTH: f32 = 1.0;
pub const MAX_WIDTH: f32 = 50.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Active tool, color and width. Exactly one value of each at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    tool: Tool,
    color: Color32,
    width: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(Color32::from_rgb(0x0f, 0x17, 0x2a), 8.0)
    }
}

impl ToolState {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            tool: Tool::Pen,
            color,
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
    }

    /// Compositing mode for the active tool; the eraser ignores the color
    pub fn composite(&self) -> Composite {
        match self.tool {
            Tool::Pen => Composite::SourceOver(self.color),
            Tool::Eraser => Composite::DestinationOut,
        }
    }
}
