pub mod acquirer;
pub mod backend;
pub mod http_backend;
#[cfg(feature = "opencv")]
pub mod opencv_backend;
pub mod test_pattern;

use std::sync::Arc;

pub use acquirer::{Acquirer, Acquisition, CameraSource};
pub use backend::{CaptureBackend, CaptureSession, CaptureTarget, SessionGuard};
pub use http_backend::HttpStillBackend;

/// The capture backend this build supports best.
#[cfg(feature = "opencv")]
pub fn default_backend(_client: reqwest::Client) -> Arc<dyn CaptureBackend> {
    Arc::new(opencv_backend::OpenCvBackend)
}

/// The capture backend this build supports best.
#[cfg(not(feature = "opencv"))]
pub fn default_backend(client: reqwest::Client) -> Arc<dyn CaptureBackend> {
    Arc::new(HttpStillBackend::new(client))
}
