use std::path::PathBuf;

use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Acquisition Error: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error("Persistence Error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Inference Error: {0}")]
    Inference(#[from] InferenceError),
    #[error("Presentation Error: {0}")]
    Presentation(#[from] PresentationError),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("UI Error: {0}")]
    Ui(String),
}

// Frame acquisition failures. Each one ends the capture cycle for its source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("Please enter a camera URL.")]
    EmptyUrl,
    #[error("Unable to connect to camera URL: {url}")]
    ConnectionFailed { url: String },
    #[error("Failed to capture frame from network camera.")]
    NetworkReadFailed,
    #[error(
        "Unable to access webcam. Please make sure your webcam is connected and not being used by another application."
    )]
    NoDevice,
    #[error("Unable to access webcam: this build has no local camera support.")]
    LocalCaptureUnsupported,
    #[error("Failed to capture frame from webcam (camera {index}).")]
    DeviceReadFailed { index: u32 },
}

impl AcquisitionError {
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            AcquisitionError::ConnectionFailed { .. } => {
                &["Make sure the URL is correct and the camera is accessible."]
            }
            AcquisitionError::NoDevice => &[
                "Note for WSL2 users: WSL2 doesn't have direct access to USB devices. You may need to:",
                "1. Use USB/IP to forward the webcam to WSL2, or",
                "2. Run this app on Windows directly, or",
                "3. Use a network camera stream instead (select 'Network Camera URL' option above)",
            ],
            AcquisitionError::LocalCaptureUnsupported => &[
                "The app was built without the `opencv` feature. To use a local webcam:",
                "1. Rebuild with `cargo build --features opencv` (requires OpenCV installed), or",
                "2. Use an http(s) network camera stream instead (select 'Network Camera URL' option above)",
            ],
            _ => &[],
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to create snapshots directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode snapshot {path} as JPEG: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Image file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("Failed to read image file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error from DIAL API: status {status}. Response: {excerpt}")]
    HttpError { status: u16, excerpt: String },
    #[error("Error sending request to DIAL API: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("API response is not valid JSON: {reason}. Response text: {excerpt}")]
    MalformedResponse { reason: String, excerpt: String },
}

impl InferenceError {
    pub fn remediation(&self) -> &'static [&'static str] {
        &["Make sure the DIAL API endpoint is correctly configured and accessible."]
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    #[error("Invalid insights format: expected a mapping, got {found}")]
    NotAMapping { found: &'static str },
}

/// Maximum number of characters of a response body carried in an error.
pub const EXCERPT_LIMIT: usize = 200;

pub fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let body = "é".repeat(300);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), EXCERPT_LIMIT);
        assert_eq!(excerpt("server error"), "server error");
    }

    #[test]
    fn no_device_carries_wsl_guidance() {
        let lines = AcquisitionError::NoDevice.remediation();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].contains("Network Camera URL"));
        assert!(AcquisitionError::EmptyUrl.remediation().is_empty());
    }

    #[test]
    fn missing_local_support_names_the_feature() {
        let err = AcquisitionError::LocalCaptureUnsupported;
        assert!(!err.to_string().contains("WSL2"));
        assert!(err.remediation()[0].contains("opencv"));
        assert!(err
            .remediation()
            .iter()
            .all(|line| !line.contains("WSL2")));
    }
}
