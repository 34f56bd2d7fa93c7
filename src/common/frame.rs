use chrono::{DateTime, Local};
use image::RgbImage;
use std::sync::Arc;

/// One still image from a capture source, always in RGB channel order.
#[derive(Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
    caption: String,
    captured_at: DateTime<Local>,
}

impl Frame {
    pub fn new(image: RgbImage, caption: impl Into<String>, captured_at: DateTime<Local>) -> Self {
        Self {
            image: Arc::new(image),
            caption: caption.into(),
            captured_at,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("caption", &self.caption)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
