use course_web::config::get_configuration;
use course_web::services::metrics::init_metrics;
use course_web::startup::Application;
use dotenvy::dotenv;
use platform_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "course-web",
        "info",
        configuration.telemetry.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let application = Application::build(configuration).await?;
    info!("Starting course-web on port {}", application.port());
    application.run_until_stopped().await?;

    Ok(())
}
