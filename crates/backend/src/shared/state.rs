use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::shared::config::Config;
use crate::shared::llm::IntentClassifier;

/// Application-wide dependencies, passed to handlers through axum `State`.
///
/// Nothing in here is a process-global: the connection, config and classifier
/// are constructed once in `main` and injected everywhere they are needed.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub jwt_secret: Arc<String>,
}
