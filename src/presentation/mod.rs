pub mod presenter;
pub mod section;

pub use presenter::Presenter;
pub use section::{display_text, Section, Table};
