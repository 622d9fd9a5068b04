use mulambo::app::PhotoApp;
use mulambo::config::Settings;
use mulambo::error::AppError;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let settings = Settings::load()?;
    PhotoApp::start_gui(settings)
}
