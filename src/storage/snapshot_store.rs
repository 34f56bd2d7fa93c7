use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info, warn};

use crate::common::Frame;
use crate::error::PersistenceError;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes frames as `snapshot_<YYYYMMDD_HHMMSS>.jpg` under one directory.
/// Two snapshots taken within the same second share a name; the later one wins.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    quality: u8,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            quality,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, at: DateTime<Local>) -> PathBuf {
        self.dir
            .join(format!("snapshot_{}.jpg", at.format(TIMESTAMP_FORMAT)))
    }

    /// Saves the frame stamped with its capture time.
    pub fn save(&self, frame: &Frame) -> Result<PathBuf, PersistenceError> {
        self.save_at(frame, frame.captured_at())
    }

    pub fn save_at(&self, frame: &Frame, at: DateTime<Local>) -> Result<PathBuf, PersistenceError> {
        if !self.dir.exists() {
            debug!("Creating snapshots directory {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::CreateDir {
                dir: self.dir.clone(),
                source,
            })?;
        }

        let path = self.path_for(at);
        let file = fs::File::create(&path).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        if let Err(e) = self.write_jpeg(file, frame, &path) {
            // Never leave a truncated snapshot behind.
            if let Err(remove) = fs::remove_file(&path) {
                warn!("Could not remove incomplete snapshot {}: {}", path.display(), remove);
            }
            return Err(e);
        }

        info!("Snapshot saved as {}", path.display());
        Ok(path)
    }

    fn write_jpeg(
        &self,
        file: fs::File,
        frame: &Frame,
        path: &Path,
    ) -> Result<(), PersistenceError> {
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(frame.image())
            .map_err(|source| PersistenceError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
