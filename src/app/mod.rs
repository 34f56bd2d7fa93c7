pub mod capture_app;
pub mod views;

pub use capture_app::{CaptureApp, SourceKind};
pub use views::{CaptureView, InsightsView};
