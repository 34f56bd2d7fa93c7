pub mod app;
pub mod capture;
pub mod common;
pub mod config;
pub mod error;
pub mod inference;
pub mod presentation;
pub mod storage;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AcquisitionError, AppError, InferenceError, PersistenceError, PresentationError};
