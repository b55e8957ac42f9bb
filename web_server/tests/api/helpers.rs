use std::sync::LazyLock;

pub use assembler::pdf::test_support::{
    create_locked_pdf, create_owner_locked_pdf, create_png, create_test_pdf,
};
use assembler::pdf::test_support;
use dotenv::dotenv;
use lopdf::Document;
use reqwest::multipart::{Form, Part};
use web_server::app_settings::{AppSettings, get_app_settings};
use web_server::startup::Application;
use web_server::telemetry::{get_telemetry_subscriber, init_telemetry_subscriber};

pub struct TestApp {
    /// Address where our app will be listening to HTTP requests.
    /// Commonly using 127.0.0.1:[port] during local tests.
    /// This is helpful for issuing requests against
    /// our own app instance.
    ///
    /// Port is assigned dynamically based on what the OS provides.
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_form(&self, endpoint: &str, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}{}", &self.address, endpoint))
            .multipart(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to request path={endpoint}. error={e}"))
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn the app after letting the test tweak its settings
#[allow(clippy::let_underscore_future)]
pub async fn spawn_app_with(customise: impl FnOnce(&mut AppSettings)) -> TestApp {
    dotenv().ok();

    LazyLock::force(&TRACING);

    let mut settings = get_app_settings().expect("Could not get App Settings");
    // using "0" as port will let the OS bind our test server to
    // a random available port. This allows us to run multiple instances
    // of our web server and test it in parallel
    settings.application.port = 0;
    customise(&mut settings);

    let app: Application = Application::build(settings)
        .await
        .expect("Could not build Application server");

    let app_port = app.port();
    let _ = tokio::spawn(app.run_until_stopped());

    let address = format!("http://127.0.0.1:{app_port}");
    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_telemetry_subscriber("pdf-toolkit", "test", "dev", "info", std::io::stdout);
        init_telemetry_subscriber(subscriber);
    } else {
        let subscriber =
            get_telemetry_subscriber("pdf-toolkit", "test", "dev", "info", std::io::sink);
        init_telemetry_subscriber(subscriber);
    };
});

/// A multipart file part named like a client would send it
pub fn file_part(bytes: Vec<u8>, filename: &str) -> Part {
    Part::bytes(bytes).file_name(filename.to_owned())
}

/// The `(...)` label shown on every page of a PDF, in page order
pub fn page_labels(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).expect("Response is not a valid PDF");
    test_support::page_labels(&doc)
}
