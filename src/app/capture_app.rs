use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError as MpscTryRecvError;
use tokio::sync::oneshot::error::TryRecvError as OneshotTryRecvError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::app::views::{CaptureView, InsightsView, View};
use crate::capture::CameraSource;
use crate::config::Settings;
use crate::error::AppError;
use crate::workflow::{CaptureRequest, Session, Workflow, WorkflowEvent};

const TITLE: &str = "Webcam DIAL App";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    LocalWebcam,
    NetworkCamera,
    TestPattern,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::LocalWebcam,
        SourceKind::NetworkCamera,
        SourceKind::TestPattern,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::LocalWebcam => "Local Webcam",
            SourceKind::NetworkCamera => "Network Camera URL",
            SourceKind::TestPattern => "Test/Demo Mode",
        }
    }

    /// The URL is only read for network cameras.
    pub fn to_source(self, url: &str) -> CameraSource {
        match self {
            SourceKind::LocalWebcam => CameraSource::LocalWebcam,
            SourceKind::NetworkCamera => CameraSource::NetworkCamera {
                url: url.to_string(),
            },
            SourceKind::TestPattern => CameraSource::TestPattern,
        }
    }
}

pub struct CaptureApp {
    runtime: Handle,
    workflow: Arc<Workflow>,
    source_kind: SourceKind,
    camera_url: String,
    run_inference: bool,
    // None while a capture task owns it.
    session: Option<Session>,
    in_flight: Option<oneshot::Receiver<Session>>,
    event_rx: mpsc::Receiver<WorkflowEvent>,
    event_tx: mpsc::Sender<WorkflowEvent>,
    current: CaptureView,
    errors: Vec<AppError>,
}

impl CaptureApp {
    pub fn new(runtime: Handle, workflow: Arc<Workflow>) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<WorkflowEvent>(100);
        Self {
            runtime,
            workflow,
            source_kind: SourceKind::LocalWebcam,
            camera_url: String::new(),
            run_inference: false,
            session: Some(Session::new()),
            in_flight: None,
            event_rx,
            event_tx,
            current: CaptureView::new(),
            errors: Vec::new(),
        }
    }

    pub fn start_gui(settings: &Settings) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(settings.ui.width, settings.ui.height))
                .with_title(TITLE),
            ..Default::default()
        };

        let workflow = Arc::new(Workflow::builder(settings.clone()).build());
        info!(
            "Snapshots go to {}, inference endpoint {}",
            workflow.store().dir().display(),
            workflow.client().endpoint()
        );
        let runtime = Handle::current();

        eframe::run_native(
            TITLE,
            options,
            Box::new(move |_cc| Ok(Box::new(CaptureApp::new(runtime, workflow)))),
        )
        .map_err(|e| AppError::Ui(e.to_string()))
    }

    fn is_capturing(&self) -> bool {
        self.in_flight.is_some()
    }

    fn trigger_capture(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let request = CaptureRequest {
            source: self.source_kind.to_source(&self.camera_url),
            run_inference: self.run_inference,
        };
        info!("Capture requested from {}", request.source.label());
        self.current = CaptureView::new();

        let (done_tx, done_rx) = oneshot::channel();
        let workflow = self.workflow.clone();
        let event_tx = self.event_tx.clone();
        self.runtime.spawn(async move {
            let report = workflow.capture(&mut session, &request, Some(&event_tx)).await;
            debug!(
                "Capture finished with {} events, snapshot {:?}, insights rendered: {}",
                report.events.len(),
                report.snapshot(),
                report.sections().is_some()
            );
            if done_tx.send(session).is_err() {
                error!("UI went away before the capture finished");
            }
        });
        self.in_flight = Some(done_rx);
    }

    /// Picks up the session first, then drains events. The task sends every
    /// event before the session, so a finished capture is always fully applied.
    fn poll_background(&mut self, ctx: &egui::Context) {
        if let Some(rx) = self.in_flight.as_mut() {
            match rx.try_recv() {
                Ok(session) => {
                    self.session = Some(session);
                    self.in_flight = None;
                    ctx.request_repaint();
                }
                Err(OneshotTryRecvError::Empty) => {}
                Err(OneshotTryRecvError::Closed) => {
                    self.errors.push(AppError::Ui(
                        "Capture task ended without returning the session.".to_string(),
                    ));
                    self.session = Some(Session::new());
                    self.in_flight = None;
                    ctx.request_repaint();
                }
            }
        }

        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.current.apply(event),
                Err(MpscTryRecvError::Empty) => break,
                Err(MpscTryRecvError::Disconnected) => {
                    error!("Workflow event channel disconnected");
                    break;
                }
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading(TITLE);
        ui.label(
            "This app captures video from your webcam and processes it using DIAL \
             (Device Interaction and Automation Layer) technology.",
        );
        ui.separator();

        let mut changed = false;
        ui.label("Select Camera Source:");
        ui.horizontal(|ui| {
            for kind in SourceKind::ALL {
                changed |= ui
                    .radio_value(&mut self.source_kind, kind, kind.label())
                    .changed();
            }
        });

        match self.source_kind {
            SourceKind::NetworkCamera => {
                ui.label("Enter camera URL (e.g., rtsp://, http://, or IP camera URL):");
                changed |= ui
                    .add(
                        egui::TextEdit::singleline(&mut self.camera_url)
                            .hint_text("rtsp://username:password@ip:port/stream"),
                    )
                    .changed();
            }
            SourceKind::TestPattern => {
                ui.colored_label(
                    egui::Color32::LIGHT_BLUE,
                    "Test mode will generate a sample image for testing purposes.",
                );
            }
            SourceKind::LocalWebcam => {}
        }

        changed |= ui
            .checkbox(&mut self.run_inference, "Enable DIAL API Inference")
            .changed();

        // Any interaction other than the capture button starts a fresh render.
        if changed && !self.is_capturing() {
            self.current = CaptureView::new();
        }

        let capture = ui.add_enabled(!self.is_capturing(), egui::Button::new("Capture Snapshot"));
        if capture.clicked() {
            self.trigger_capture();
        }
    }

    fn draw_latest(&self, ui: &mut egui::Ui) {
        if self.current.has_insights() {
            return;
        }
        let Some(sections) = self.session.as_ref().and_then(Workflow::latest_sections) else {
            return;
        };
        ui.separator();
        ui.heading("Latest DIAL API Insights");
        InsightsView::new("latest", &sections).draw(ui);
    }
}

impl eframe::App for CaptureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        egui::TopBottomPanel::top("capture_controls").show(ctx, |ui| {
            self.draw_controls(ui);
        });

        if !self.errors.is_empty() {
            egui::TopBottomPanel::bottom("error_panel")
                .resizable(true)
                .show(ctx, |ui| {
                    ui.heading("Error Log");
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        for error in self.errors.iter().rev() {
                            ui.label(format!("[ERROR] {}", error));
                        }
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.current.draw(ui);
                self.draw_latest(ui);
            });
        });

        if self.is_capturing() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::backend::fake::FakeBackend;
    use crate::test_support::MockEndpoint;

    fn app(endpoint: &str, snapshots: &std::path::Path) -> CaptureApp {
        let workflow = Workflow::builder(Settings::default())
            .endpoint(endpoint)
            .snapshots_dir(snapshots)
            .backend(Arc::new(FakeBackend::new()))
            .build();
        CaptureApp::new(Handle::current(), Arc::new(workflow))
    }

    #[tokio::test]
    async fn finished_capture_applies_every_event() {
        let endpoint = MockEndpoint::start(200, r#"{"status":"success","labels":["cat"]}"#).await;
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(&endpoint.url, tmp.path());
        app.source_kind = SourceKind::TestPattern;
        app.run_inference = true;
        let ctx = egui::Context::default();

        app.trigger_capture();
        assert!(app.is_capturing());
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while app.is_capturing() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.poll_background(&ctx);
        }

        assert!(!app.is_capturing());
        assert!(app.current.has_insights());
        let session = app.session.as_ref().unwrap();
        assert!(session.last_snapshot_path().unwrap().exists());
        assert!(app.errors.is_empty());
    }

    #[tokio::test]
    async fn events_queued_before_the_session_are_applied_in_the_same_poll() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app("http://127.0.0.1:9/dial/inference", tmp.path());
        app.session = None;
        let (done_tx, done_rx) = oneshot::channel();
        app.in_flight = Some(done_rx);

        app.event_tx
            .send(WorkflowEvent::InsightsReady {
                sections: vec![crate::presentation::Section::Confidence("87.00%".to_string())],
            })
            .await
            .unwrap();
        done_tx.send(Session::new()).unwrap();

        app.poll_background(&egui::Context::default());
        assert!(!app.is_capturing());
        assert!(app.session.is_some());
        assert!(app.current.has_insights());
    }

    #[test]
    fn url_only_reaches_network_sources() {
        assert_eq!(
            SourceKind::LocalWebcam.to_source("rtsp://x"),
            CameraSource::LocalWebcam
        );
        assert_eq!(
            SourceKind::NetworkCamera.to_source("rtsp://x"),
            CameraSource::NetworkCamera {
                url: "rtsp://x".to_string()
            }
        );
        for kind in SourceKind::ALL {
            assert_eq!(kind.to_source("").label(), kind.label());
        }
    }
}
