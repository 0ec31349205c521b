use async_trait::async_trait;

use crate::document::{BatchRequest, SourceDocument};
use crate::error::Result;
use crate::result::{BatchResult, ExtractionResult};

#[async_trait]
pub trait ExtractionPipeline: Send + Sync {
    async fn extract(&self, document: SourceDocument) -> Result<ExtractionResult>;
    async fn extract_batch(&self, batch: BatchRequest) -> Result<BatchResult>;
}
