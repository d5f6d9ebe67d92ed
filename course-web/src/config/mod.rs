use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub course_api: CourseApiSettings,
    pub checkout: CheckoutSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct CourseApiSettings {
    /// Base URL of the course REST API, including the `/api` prefix
    /// (e.g. `http://localhost:8000/api`).
    pub base_url: String,
}

/// Razorpay checkout widget settings. The key id is the public key the
/// hosted widget is initialized with; signature secrets stay server-side.
#[derive(Deserialize, Clone)]
pub struct CheckoutSettings {
    pub key_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Deserialize, Clone, Default)]
pub struct TelemetrySettings {
    /// OTLP collector endpoint. Spans are exported only when set.
    pub otlp_endpoint: Option<String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Check if we're already in course-web directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("course-web") {
        base_path.join("config")
    } else {
        base_path.join("course-web").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
