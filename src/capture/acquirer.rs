use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use super::backend::{CaptureBackend, CaptureTarget, SessionGuard};
use super::test_pattern;
use crate::common::Frame;
use crate::error::AcquisitionError;

/// Where the next snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    LocalWebcam,
    NetworkCamera { url: String },
    TestPattern,
}

impl CameraSource {
    pub fn label(&self) -> &'static str {
        match self {
            CameraSource::LocalWebcam => "Local Webcam",
            CameraSource::NetworkCamera { .. } => "Network Camera URL",
            CameraSource::TestPattern => "Test/Demo Mode",
        }
    }
}

/// A successfully acquired frame and the message announcing it.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub frame: Frame,
    pub message: String,
}

pub struct Acquirer {
    backend: Arc<dyn CaptureBackend>,
    probe_devices: u32,
}

impl Acquirer {
    pub fn new(backend: Arc<dyn CaptureBackend>, probe_devices: u32) -> Self {
        Self {
            backend,
            probe_devices,
        }
    }

    pub async fn acquire(&self, source: &CameraSource) -> Result<Acquisition, AcquisitionError> {
        match source {
            CameraSource::TestPattern => Ok(Self::test_image()),
            CameraSource::NetworkCamera { url } => self.from_network(url).await,
            CameraSource::LocalWebcam => self.from_local().await,
        }
    }

    pub fn test_image() -> Acquisition {
        debug!("Generating test pattern");
        Acquisition {
            frame: Frame::new(test_pattern::generate(), "Test/Demo Image", Local::now()),
            message: "Test image generated successfully!".to_string(),
        }
    }

    async fn from_network(&self, url: &str) -> Result<Acquisition, AcquisitionError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AcquisitionError::EmptyUrl);
        }

        let mut session =
            SessionGuard::open(self.backend.as_ref(), CaptureTarget::Url(url.to_string())).await;
        if !session.is_opened() {
            warn!("Unable to connect to camera URL {}", url);
            return Err(AcquisitionError::ConnectionFailed {
                url: url.to_string(),
            });
        }

        let image = session
            .read()
            .await
            .ok_or(AcquisitionError::NetworkReadFailed)?;
        info!("Captured {}x{} frame from {}", image.width(), image.height(), url);
        let caption = format!("Network Camera: {}...", url.chars().take(50).collect::<String>());
        Ok(Acquisition {
            frame: Frame::new(image, caption, Local::now()),
            message: "Snapshot captured from network camera!".to_string(),
        })
    }

    async fn from_local(&self) -> Result<Acquisition, AcquisitionError> {
        if !self.backend.supports_devices() {
            warn!("The {} capture backend cannot open local cameras", self.backend.name());
            return Err(AcquisitionError::LocalCaptureUnsupported);
        }

        let mut selected = None;
        for index in 0..self.probe_devices {
            let mut session =
                SessionGuard::open(self.backend.as_ref(), CaptureTarget::Device(index)).await;
            if !session.is_opened() {
                debug!("Camera {} did not open", index);
                continue;
            }
            if session.read().await.is_some() {
                debug!("Camera {} answered the probe", index);
                selected = Some((index, session));
                break;
            }
            debug!("Camera {} opened but returned no frame", index);
        }

        let Some((index, mut session)) = selected else {
            warn!("No camera answered among {} probed indices", self.probe_devices);
            return Err(AcquisitionError::NoDevice);
        };

        let image = session.read().await;
        drop(session);
        let image = image.ok_or(AcquisitionError::DeviceReadFailed { index })?;
        info!(
            "Captured {}x{} frame from camera {}",
            image.width(),
            image.height(),
            index
        );
        Ok(Acquisition {
            frame: Frame::new(image, format!("Local Camera {}", index), Local::now()),
            message: format!("Snapshot captured successfully from camera {}!", index),
        })
    }
}
