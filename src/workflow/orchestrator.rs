use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tracing::{error, info, warn, Instrument};

use super::event::{Notice, WorkflowEvent};
use super::session::Session;
use crate::capture::{self, Acquirer, CameraSource, CaptureBackend};
use crate::config::Settings;
use crate::inference::DialClient;
use crate::presentation::{Presenter, Section};
use crate::storage::SnapshotStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub source: CameraSource,
    pub run_inference: bool,
}

/// Everything one capture cycle produced, in order.
#[derive(Debug, Default)]
pub struct CaptureReport {
    pub events: Vec<WorkflowEvent>,
}

impl CaptureReport {
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.events.iter().filter_map(WorkflowEvent::notice)
    }

    pub fn snapshot(&self) -> Option<&PathBuf> {
        self.events.iter().find_map(|e| match e {
            WorkflowEvent::FrameCaptured { snapshot, .. } => Some(snapshot),
            _ => None,
        })
    }

    pub fn sections(&self) -> Option<&[Section]> {
        self.events.iter().find_map(|e| match e {
            WorkflowEvent::InsightsReady { sections } => Some(sections.as_slice()),
            _ => None,
        })
    }
}

/// Collects events for the report and forwards them to the UI as they happen.
struct Progress<'a> {
    report: CaptureReport,
    tx: Option<&'a Sender<WorkflowEvent>>,
}

impl Progress<'_> {
    async fn emit(&mut self, event: WorkflowEvent) {
        if let Some(tx) = self.tx {
            if let Err(e) = tx.send(event.clone()).await {
                warn!("Progress receiver dropped: {}", e);
            }
        }
        self.report.events.push(event);
    }

    async fn notices(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            self.emit(WorkflowEvent::Notice(notice)).await;
        }
    }
}

/// Sequences acquire -> persist -> (optional) infer -> present.
pub struct Workflow {
    acquirer: Acquirer,
    store: SnapshotStore,
    client: DialClient,
}

impl Workflow {
    pub fn new(acquirer: Acquirer, store: SnapshotStore, client: DialClient) -> Self {
        Self {
            acquirer,
            store,
            client,
        }
    }

    pub fn builder(settings: Settings) -> WorkflowBuilder {
        WorkflowBuilder::new(settings)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn client(&self) -> &DialClient {
        &self.client
    }

    /// Runs one capture cycle. Failures end the cycle with notices; they never
    /// escape, and the session only changes on a fully successful inference.
    pub async fn capture(
        &self,
        session: &mut Session,
        request: &CaptureRequest,
        tx: Option<&Sender<WorkflowEvent>>,
    ) -> CaptureReport {
        let span = tracing::info_span!(
            "capture",
            source = request.source.label(),
            inference = request.run_inference
        );
        self.run(session, request, tx).instrument(span).await
    }

    async fn run(
        &self,
        session: &mut Session,
        request: &CaptureRequest,
        tx: Option<&Sender<WorkflowEvent>>,
    ) -> CaptureReport {
        let mut progress = Progress {
            report: CaptureReport::default(),
            tx,
        };
        session.reset();

        let acquisition = match self.acquirer.acquire(&request.source).await {
            Ok(acquisition) => acquisition,
            Err(e) => {
                warn!("Acquisition failed: {}", e);
                progress
                    .notices(Notice::failure(e.to_string(), e.remediation()))
                    .await;
                return progress.report;
            }
        };

        let snapshot = match self.store.save(&acquisition.frame) {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to save snapshot: {}", e);
                progress.notices(vec![Notice::error(e.to_string())]).await;
                return progress.report;
            }
        };

        progress
            .emit(WorkflowEvent::FrameCaptured {
                frame: acquisition.frame,
                snapshot: snapshot.clone(),
            })
            .await;
        progress
            .notices(vec![
                Notice::success(acquisition.message),
                Notice::info(format!("Snapshot saved as: `{}`", snapshot.display())),
            ])
            .await;

        if !request.run_inference {
            return progress.report;
        }

        progress.emit(WorkflowEvent::InferenceStarted).await;
        match self.client.infer(&snapshot).await {
            Ok(insights) => {
                info!(
                    "Inference finished with status {}",
                    insights.status.as_deref().unwrap_or("none")
                );
                let sections = Presenter::render(&insights, Some(&snapshot));
                session.record(insights, snapshot);
                progress
                    .emit(WorkflowEvent::InsightsReady { sections })
                    .await;
            }
            Err(e) => {
                error!("Inference failed: {}", e);
                progress
                    .notices(Notice::failure(
                        format!("Error running DIAL inference: {}", e),
                        e.remediation(),
                    ))
                    .await;
            }
        }
        progress.report
    }

    /// Sections for the "latest results" block shown on re-render.
    pub fn latest_sections(session: &Session) -> Option<Vec<Section>> {
        session
            .latest()
            .map(|(insights, path)| Presenter::render(insights, Some(path)))
    }
}

pub struct WorkflowBuilder {
    settings: Settings,
    http: Option<reqwest::Client>,
    backend: Option<Arc<dyn CaptureBackend>>,
}

impl WorkflowBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            http: None,
            backend: None,
        }
    }

    // Overrides the inference endpoint from the settings.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.inference.endpoint = endpoint.into();
        self
    }

    // Overrides the snapshots directory from the settings.
    pub fn snapshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.snapshots.dir = dir.into();
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CaptureBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Workflow {
        let http = self.http.unwrap_or_default();
        let backend = self
            .backend
            .unwrap_or_else(|| capture::default_backend(http.clone()));
        Workflow::new(
            Acquirer::new(backend, self.settings.camera.probe_devices),
            SnapshotStore::new(
                self.settings.snapshots.dir.clone(),
                self.settings.snapshots.jpeg_quality,
            ),
            DialClient::new(http, self.settings.inference.endpoint.clone()),
        )
    }
}
