use std::path::PathBuf;

use crate::common::Frame;
use crate::presentation::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// The error line followed by its remediation lines.
    pub fn failure(message: impl Into<String>, remediation: &[&str]) -> Vec<Self> {
        std::iter::once(Notice::error(message))
            .chain(remediation.iter().map(|line| Notice::info(*line)))
            .collect()
    }
}

/// Progress of one capture cycle, in the order it happens.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    FrameCaptured { frame: Frame, snapshot: PathBuf },
    InferenceStarted,
    InsightsReady { sections: Vec<Section> },
    Notice(Notice),
}

impl WorkflowEvent {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            WorkflowEvent::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}
