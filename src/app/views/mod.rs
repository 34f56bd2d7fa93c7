pub mod capture_view;
pub mod insights_view;

pub use capture_view::CaptureView;
pub use insights_view::InsightsView;

pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui);
}
