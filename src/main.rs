use eframe::CreationContext;
use time_tracking_uploader::app::TimeTrackingUploader;
use time_tracking_uploader::config::AppConfig;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "time_tracking_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stundenübersicht Upload");
    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 820.0])
            .with_min_inner_size([480.0, 600.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Stundenübersicht Upload",
        options,
        Box::new(|cc: &CreationContext| Box::new(TimeTrackingUploader::new(cc, config))),
    ) {
        error!("Window closed with error: {}", e);
    }
}
