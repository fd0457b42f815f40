use std::sync::Arc;

use tracing::warn;

use crate::domain::error::Result;
use crate::domain::template::{ClassificationResponse, PromptTemplate};
use crate::infrastructure::llm_clients::OllamaClient;
use crate::infrastructure::storage::TemplateStore;

/// Classifies news articles with a stored prompt template. Generation
/// failures are folded into the response payload; only a missing template
/// is a hard error.
pub struct ClassifyUseCase {
    llm_client: Arc<OllamaClient>,
    store: Arc<TemplateStore>,
}

impl ClassifyUseCase {
    pub fn new(llm_client: Arc<OllamaClient>, store: Arc<TemplateStore>) -> Self {
        Self { llm_client, store }
    }

    pub async fn execute(&self, template_id: &str, news_text: &str) -> Result<ClassificationResponse> {
        let template = self.store.get(template_id)?;
        Ok(self.classify_with(&template, news_text).await)
    }

    /// Classify several articles with one template. Sequential on purpose:
    /// the daemon reuses the warm prompt cache between calls.
    pub async fn execute_batch(
        &self,
        template_id: &str,
        news_texts: &[String],
    ) -> Result<Vec<ClassificationResponse>> {
        let template = self.store.get(template_id)?;
        let mut results = Vec::with_capacity(news_texts.len());
        for news_text in news_texts {
            results.push(self.classify_with(&template, news_text).await);
        }
        Ok(results)
    }

    async fn classify_with(
        &self,
        template: &PromptTemplate,
        news_text: &str,
    ) -> ClassificationResponse {
        match self.llm_client.generate(template, news_text).await {
            Ok(outcome) => ClassificationResponse {
                success: true,
                result: Some(outcome.result),
                error: None,
                response_time_ms: Some(outcome.response_time_ms),
                tokens_per_second: Some(outcome.tokens_per_second),
            },
            Err(e) => {
                warn!(template = %template.name, error = %e, "Classification failed");
                ClassificationResponse::failure(e.to_string())
            }
        }
    }
}
