use async_trait::async_trait;
use image::RgbImage;
use opencv::{imgproc, prelude::*, videoio};
use tracing::{debug, warn};

use super::backend::{CaptureBackend, CaptureSession, CaptureTarget};

/// Local webcams by index and any stream URL OpenCV's videoio can open.
#[derive(Clone, Copy, Default)]
pub struct OpenCvBackend;

#[async_trait]
impl CaptureBackend for OpenCvBackend {
    fn name(&self) -> &'static str {
        "opencv"
    }

    async fn open(&self, target: &CaptureTarget) -> Box<dyn CaptureSession> {
        let source = target.clone();
        let opened = tokio::task::spawn_blocking(move || match &source {
            CaptureTarget::Device(index) => {
                videoio::VideoCapture::new(*index as i32, videoio::CAP_ANY)
            }
            CaptureTarget::Url(url) => videoio::VideoCapture::from_file(url, videoio::CAP_ANY),
        })
        .await;
        let capture = match opened {
            Ok(Ok(capture)) => Some(capture),
            Ok(Err(e)) => {
                warn!("OpenCV failed to open {}: {}", target, e);
                None
            }
            Err(e) => {
                warn!("OpenCV open task for {} did not complete: {}", target, e);
                None
            }
        };
        Box::new(OpenCvSession {
            target: target.clone(),
            capture,
        })
    }
}

struct OpenCvSession {
    target: CaptureTarget,
    capture: Option<videoio::VideoCapture>,
}

impl OpenCvSession {
    fn grab(capture: &mut videoio::VideoCapture) -> opencv::Result<Option<RgbImage>> {
        let mut bgr = Mat::default();
        if !capture.read(&mut bgr)? || bgr.empty() {
            return Ok(None);
        }
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)?;
        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb.data_bytes()?.to_vec();
        Ok(RgbImage::from_raw(width, height, bytes))
    }
}

#[async_trait]
impl CaptureSession for OpenCvSession {
    fn is_opened(&self) -> bool {
        self.capture
            .as_ref()
            .map(|c| c.is_opened().unwrap_or(false))
            .unwrap_or(false)
    }

    async fn read(&mut self) -> Option<RgbImage> {
        let mut capture = self.capture.take()?;
        let grabbed = tokio::task::spawn_blocking(move || {
            let frame = Self::grab(&mut capture);
            (capture, frame)
        })
        .await;
        match grabbed {
            Ok((capture, frame)) => {
                self.capture = Some(capture);
                frame.unwrap_or_else(|e| {
                    warn!("OpenCV read from {} failed: {}", self.target, e);
                    None
                })
            }
            Err(e) => {
                warn!("OpenCV read task for {} did not complete: {}", self.target, e);
                None
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                warn!("OpenCV release of {} failed: {}", self.target, e);
            } else {
                debug!("Released OpenCV capture {}", self.target);
            }
        }
    }
}
