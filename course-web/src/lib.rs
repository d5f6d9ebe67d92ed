pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;

use crate::config::CheckoutSettings;
use services::api_client::ApiClient;
use std::sync::Arc;

/// Shared application state: the course API gateway and checkout settings.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<ApiClient>,
    pub checkout: CheckoutSettings,
}

impl AppState {
    pub fn new(api: Arc<ApiClient>, checkout: CheckoutSettings) -> Self {
        Self { api, checkout }
    }
}
