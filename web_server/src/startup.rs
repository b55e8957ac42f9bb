use std::net::TcpListener;

use actix_web::{App, HttpServer, dev::Server, web};
use actix_web_opentelemetry::RequestTracing;
use tracing_actix_web::TracingLogger;

use crate::{
    app_settings::AppSettings,
    routes::{health::health_check, merge::merge_files, unlock::unlock_file},
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: AppSettings) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, settings)?;
        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the web server and blocks the main thread until it stops
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn run(listener: TcpListener, settings: AppSettings) -> Result<Server, std::io::Error> {
    let port = listener.local_addr()?.port();

    // Each request assembles its own document, the only thing
    // shared between workers is the read-only configuration.
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestTracing::new())
            .route("/health", web::get().to(health_check))
            .route("/merge", web::post().to(merge_files))
            .route("/unlock", web::post().to(unlock_file))
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    tracing::info!("PDF Toolkit Web Server is running. port={port}");

    Ok(server)
}
