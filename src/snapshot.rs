use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};

use crate::error::SnapshotError;

const IMAGE_PAYLOAD_PREFIX: &str = "data:image/";
const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// True if `src` looks like an inline image payload (`data:image/...`)
pub fn is_image_payload(src: &str) -> bool {
    src.starts_with(IMAGE_PAYLOAD_PREFIX)
}

/// An encoded frame as it travels to stores and bridges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    png: Vec<u8>,
}

impl Snapshot {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn encode(image: &RgbaImage) -> Result<Self, SnapshotError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self { png })
    }

    pub fn decode(&self) -> Result<RgbaImage, SnapshotError> {
        let image = image::load_from_memory(&self.png)?;
        Ok(image.to_rgba8())
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn to_data_url(&self) -> String {
        format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&self.png))
    }

    /// Parse `data:image/<type>;base64,<payload>`. Anything else is rejected.
    pub fn from_data_url(src: &str) -> Result<Self, SnapshotError> {
        let rest = src
            .trim()
            .strip_prefix(IMAGE_PAYLOAD_PREFIX)
            .ok_or(SnapshotError::NotAnImagePayload)?;
        let (_, payload) = rest
            .split_once(";base64,")
            .ok_or(SnapshotError::NotAnImagePayload)?;
        let png = STANDARD.decode(payload.trim())?;
        Ok(Self { png })
    }
}
