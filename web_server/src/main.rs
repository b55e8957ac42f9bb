use anyhow::Result;
use web_server::{
    app_settings::get_app_settings,
    startup::Application,
    telemetry::{get_telemetry_subscriber, init_telemetry_subscriber},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Init telemetry subscriber to process tracing spans and logs
    let subscriber = get_telemetry_subscriber(
        "pdf-toolkit",
        env!("CARGO_PKG_VERSION"),
        "dev",
        "info",
        std::io::stdout,
    );
    init_telemetry_subscriber(subscriber);

    let app_settings = get_app_settings()?;
    let app = Application::build(app_settings).await?;
    app.run_until_stopped().await?;

    Ok(())
}
