use std::path::PathBuf;

use egui::{Color32, TextureHandle, TextureOptions};

use crate::app::views::{InsightsView, View};
use crate::common::Frame;
use crate::presentation::Section;
use crate::workflow::{Notice, NoticeLevel, WorkflowEvent};

/// What the latest capture trigger produced so far.
#[derive(Default)]
pub struct CaptureView {
    frame: Option<Frame>,
    snapshot: Option<PathBuf>,
    texture: Option<TextureHandle>,
    notices: Vec<Notice>,
    inference_pending: bool,
    inference_requested: bool,
    sections: Option<Vec<Section>>,
}

impl CaptureView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::FrameCaptured { frame, snapshot } => {
                self.frame = Some(frame);
                self.snapshot = Some(snapshot);
                self.texture = None;
            }
            WorkflowEvent::InferenceStarted => {
                self.inference_pending = true;
                self.inference_requested = true;
            }
            WorkflowEvent::InsightsReady { sections } => {
                self.inference_pending = false;
                self.sections = Some(sections);
            }
            WorkflowEvent::Notice(notice) => {
                if notice.level == NoticeLevel::Error {
                    self.inference_pending = false;
                }
                self.notices.push(notice);
            }
        }
    }

    /// True once this capture rendered insights of its own.
    pub fn has_insights(&self) -> bool {
        self.sections.is_some()
    }

    fn draw_frame(&mut self, ui: &mut egui::Ui) {
        let Some(frame) = &self.frame else {
            return;
        };
        let texture = self.texture.get_or_insert_with(|| {
            let image = frame.image();
            let color_image = egui::ColorImage::from_rgb(
                [image.width() as usize, image.height() as usize],
                image.as_raw().as_slice(),
            );
            ui.ctx()
                .load_texture("snapshot_frame", color_image, TextureOptions::default())
        });
        let image = ui.add(egui::Image::new(&*texture).shrink_to_fit());
        if let Some(path) = &self.snapshot {
            image.on_hover_text(path.display().to_string());
        }
        ui.label(frame.caption());
    }

    fn draw_notice(ui: &mut egui::Ui, notice: &Notice) {
        let color = match notice.level {
            NoticeLevel::Success => Color32::GREEN,
            NoticeLevel::Info => Color32::LIGHT_BLUE,
            NoticeLevel::Error => Color32::RED,
        };
        ui.colored_label(color, &notice.message);
    }
}

impl View for CaptureView {
    fn draw(&mut self, ui: &mut egui::Ui) {
        self.draw_frame(ui);
        for notice in &self.notices {
            Self::draw_notice(ui, notice);
        }

        if self.inference_requested {
            ui.separator();
            ui.heading("DIAL API Insights");
            if self.inference_pending {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Sending image to DIAL API and processing...");
                });
            }
            if let Some(sections) = &self.sections {
                InsightsView::new("fresh", sections).draw(ui);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use image::RgbImage;

    #[test]
    fn events_fill_the_view_in_order() {
        let mut view = CaptureView::new();
        assert!(view.frame.is_none());

        view.apply(WorkflowEvent::FrameCaptured {
            frame: Frame::new(RgbImage::new(4, 4), "Test/Demo Image", Local::now()),
            snapshot: PathBuf::from("snapshots/snapshot_20240101_120000.jpg"),
        });
        view.apply(WorkflowEvent::InferenceStarted);
        assert!(view.inference_pending);
        assert!(!view.has_insights());

        view.apply(WorkflowEvent::InsightsReady {
            sections: vec![Section::Confidence("87.00%".to_string())],
        });
        assert!(!view.inference_pending);
        assert!(view.has_insights());
        assert_eq!(
            view.snapshot,
            Some(PathBuf::from("snapshots/snapshot_20240101_120000.jpg"))
        );
    }

    #[test]
    fn error_notice_stops_the_spinner() {
        let mut view = CaptureView::new();
        view.apply(WorkflowEvent::InferenceStarted);
        view.apply(WorkflowEvent::Notice(Notice::error("boom")));
        assert!(!view.inference_pending);
        assert!(!view.has_insights());
    }
}
