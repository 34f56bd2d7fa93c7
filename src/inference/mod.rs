pub mod client;
pub mod insights;

pub use client::DialClient;
pub use insights::Insights;
