use egui::{Color32, RichText};

use crate::app::views::View;
use crate::presentation::{Section, Table};

/// Draws presenter sections. Holds no state besides the sections themselves.
pub struct InsightsView<'a> {
    id: &'static str,
    sections: &'a [Section],
}

impl<'a> InsightsView<'a> {
    pub fn new(id: &'static str, sections: &'a [Section]) -> Self {
        Self { id, sections }
    }

    fn draw_table(&self, ui: &mut egui::Ui, title: &str, table: &Table) {
        ui.heading(title);
        egui::Grid::new((self.id, title))
            .striped(true)
            .show(ui, |ui| {
                for column in &table.columns {
                    ui.label(RichText::new(column).strong());
                }
                ui.end_row();
                for row in &table.rows {
                    for cell in row {
                        ui.label(cell);
                    }
                    ui.end_row();
                }
            });
    }

    fn draw_json(ui: &mut egui::Ui, value: &serde_json::Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        ui.add(egui::Label::new(RichText::new(pretty).monospace()).wrap());
    }
}

impl View for InsightsView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        for section in self.sections {
            match section {
                Section::Caption(caption) => {
                    ui.label(RichText::new(caption).small().weak());
                }
                Section::Status { success, status } => {
                    if *success {
                        ui.colored_label(Color32::GREEN, format!("✅ Status: {}", status));
                    } else {
                        ui.colored_label(Color32::YELLOW, format!("⚠️ Status: {}", status));
                    }
                }
                Section::Confidence(confidence) => {
                    ui.label(format!("Confidence: {}", confidence));
                }
                Section::Table { title, table } => self.draw_table(ui, title, table),
                Section::Text { title, text } => {
                    ui.heading(*title);
                    ui.label(text);
                }
                Section::Json { title, value } => {
                    ui.heading(*title);
                    Self::draw_json(ui, value);
                }
                Section::RawResponse(value) => {
                    egui::CollapsingHeader::new("View Raw API Response")
                        .id_salt((self.id, "raw"))
                        .default_open(false)
                        .show(ui, |ui| Self::draw_json(ui, value));
                }
                Section::ValidationError(message) => {
                    ui.colored_label(Color32::RED, message);
                }
            }
        }
    }
}
