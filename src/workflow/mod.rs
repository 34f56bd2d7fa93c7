pub mod event;
pub mod orchestrator;
pub mod session;

pub use event::{Notice, NoticeLevel, WorkflowEvent};
pub use orchestrator::{CaptureReport, CaptureRequest, Workflow, WorkflowBuilder};
pub use session::Session;
