use crate::backend::CliBackend;
use crate::config::AppConfig;

/// Shared application state accessible to all handlers.
///
/// Everything here is read-only configuration; per-request data never
/// lives longer than its request.
pub struct AppState {
    pub config: AppConfig,
    pub backend: CliBackend,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let backend = CliBackend::new(&config.backend);
        Self { config, backend }
    }
}
