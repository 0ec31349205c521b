use std::sync::Arc;

use scribe_core::AppConfig;
use scribe_extraction::DocumentPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<DocumentPipeline>,
}
