use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use super::backend::{CaptureBackend, CaptureSession, CaptureTarget};

const READ_TIMEOUT: Duration = Duration::from_secs(10);
// Upper bound on buffered stream bytes before a JPEG part must have completed.
const MAX_PART_BYTES: usize = 16 * 1024 * 1024;

/// Network cameras reachable over `http://` or `https://`, serving either a
/// still image or a `multipart/x-mixed-replace` MJPEG stream. Local devices
/// are never opened by this backend.
#[derive(Clone)]
pub struct HttpStillBackend {
    client: reqwest::Client,
    read_timeout: Duration,
}

impl Default for HttpStillBackend {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpStillBackend {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            read_timeout: READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    fn closed(&self, url: String) -> Box<dyn CaptureSession> {
        Box::new(HttpStillSession {
            client: self.client.clone(),
            url,
            read_timeout: self.read_timeout,
            pending: None,
            opened: false,
        })
    }
}

#[async_trait]
impl CaptureBackend for HttpStillBackend {
    fn name(&self) -> &'static str {
        "http-still"
    }

    fn supports_devices(&self) -> bool {
        false
    }

    async fn open(&self, target: &CaptureTarget) -> Box<dyn CaptureSession> {
        let url = match target {
            CaptureTarget::Url(url) => url.clone(),
            CaptureTarget::Device(index) => {
                debug!(
                    "Camera device {} unavailable: built without the opencv feature",
                    index
                );
                return self.closed(String::new());
            }
        };

        let lower = url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            warn!(
                "Cannot open {}: only http(s) cameras are supported without the opencv feature",
                url
            );
            return self.closed(url);
        }

        match tokio::time::timeout(self.read_timeout, self.client.get(&url).send()).await {
            Ok(Ok(response)) if response.status().is_success() => {
                debug!("Connected to network camera {} ({})", url, response.status());
                Box::new(HttpStillSession {
                    client: self.client.clone(),
                    url,
                    read_timeout: self.read_timeout,
                    pending: Some(response),
                    opened: true,
                })
            }
            Ok(Ok(response)) => {
                warn!("Network camera {} answered {}", url, response.status());
                self.closed(url)
            }
            Ok(Err(e)) => {
                warn!("Failed to reach network camera {}: {}", url, e);
                self.closed(url)
            }
            Err(_) => {
                warn!("Network camera {} did not answer within {:?}", url, self.read_timeout);
                self.closed(url)
            }
        }
    }
}

struct HttpStillSession {
    client: reqwest::Client,
    url: String,
    read_timeout: Duration,
    pending: Option<reqwest::Response>,
    opened: bool,
}

fn is_multipart(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase().starts_with("multipart/"))
        .unwrap_or(false)
}

/// Byte range of the first complete JPEG (SOI through EOI) in `buffer`.
fn first_jpeg(buffer: &[u8]) -> Option<&[u8]> {
    let start = buffer.windows(2).position(|w| w == [0xFF, 0xD8])?;
    let body = &buffer[start + 2..];
    let end = body.windows(2).position(|w| w == [0xFF, 0xD9])?;
    Some(&buffer[start..start + 2 + end + 2])
}

/// Pulls chunks off an MJPEG stream until one whole JPEG part has arrived.
async fn first_stream_part(
    mut response: reqwest::Response,
) -> Result<Option<Vec<u8>>, reqwest::Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        buffer.extend_from_slice(&chunk);
        if let Some(jpeg) = first_jpeg(&buffer) {
            return Ok(Some(jpeg.to_vec()));
        }
        if buffer.len() > MAX_PART_BYTES {
            return Ok(None);
        }
    }
    Ok(None)
}

/// Reads one frame's bytes, giving up after `read_timeout`.
async fn frame_bytes(
    url: &str,
    read_timeout: Duration,
    response: reqwest::Response,
) -> Option<Vec<u8>> {
    let read = async {
        if is_multipart(&response) {
            debug!("Reading first part of MJPEG stream {}", url);
            first_stream_part(response).await
        } else {
            response.bytes().await.map(|bytes| Some(bytes.to_vec()))
        }
    };
    match tokio::time::timeout(read_timeout, read).await {
        Ok(Ok(Some(bytes))) => Some(bytes),
        Ok(Ok(None)) => {
            warn!("Stream from {} ended without a complete JPEG frame", url);
            None
        }
        Ok(Err(e)) => {
            warn!("Failed to read frame body from {}: {}", url, e);
            None
        }
        Err(_) => {
            warn!("No frame from {} within {:?}", url, read_timeout);
            None
        }
    }
}

#[async_trait]
impl CaptureSession for HttpStillSession {
    fn is_opened(&self) -> bool {
        self.opened
    }

    async fn read(&mut self) -> Option<RgbImage> {
        if !self.opened {
            return None;
        }
        let response = match self.pending.take() {
            Some(response) => response,
            None => {
                let request = self.client.get(&self.url).send();
                match tokio::time::timeout(self.read_timeout, request).await {
                    Ok(Ok(response)) if response.status().is_success() => response,
                    Ok(Ok(response)) => {
                        warn!("Network camera {} answered {}", self.url, response.status());
                        return None;
                    }
                    Ok(Err(e)) => {
                        warn!("Failed to fetch frame from {}: {}", self.url, e);
                        return None;
                    }
                    Err(_) => {
                        warn!(
                            "Network camera {} did not answer within {:?}",
                            self.url, self.read_timeout
                        );
                        return None;
                    }
                }
            }
        };
        let bytes = frame_bytes(&self.url, self.read_timeout, response).await?;
        match image::load_from_memory(&bytes) {
            Ok(decoded) => Some(decoded.to_rgb8()),
            Err(e) => {
                warn!("Network camera {} did not return an image: {}", self.url, e);
                None
            }
        }
    }

    fn release(&mut self) {
        self.pending = None;
        self.opened = false;
    }
}
