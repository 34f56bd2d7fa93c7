use tracing::{info, warn, Level};
use webcam_dial::app::CaptureApp;
use webcam_dial::config::Settings;
use webcam_dial::error::AppError;

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(settings.log_level());
    if !settings.has_valid_log_level() {
        warn!(
            "Unknown log level '{}', falling back to INFO",
            settings.logging.level
        );
    }
    info!("Starting Webcam DIAL App");
    CaptureApp::start_gui(&settings)
}
