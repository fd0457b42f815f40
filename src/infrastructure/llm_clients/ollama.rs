use std::collections::HashMap;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::error::{AppError, Result};
use crate::domain::template::{PromptTemplate, ToolField};

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: u64,
    #[serde(default)]
    eval_duration: u64,
}

/// Outcome of one structured-output generation call.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub result: Value,
    pub response_time_ms: f64,
    pub tokens_per_second: f64,
}

/// Client for the local Ollama daemon. Structured output is requested via
/// the `format` parameter, so the model is constrained to the template's
/// JSON schema instead of being asked nicely.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                // Large local models can take minutes on a cold start.
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn generate(
        &self,
        template: &PromptTemplate,
        news_text: &str,
    ) -> Result<GenerationOutcome> {
        let started = Instant::now();

        let payload = json!({
            "model": template.model,
            "prompt": build_prompt(&template.prompt_desc, news_text),
            "format": build_format_schema(&template.tools),
            "stream": false,
            "options": {
                "temperature": template.temperature,
                "num_ctx": template.num_ctx,
            },
            "keep_alive": template.keep_alive,
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let tokens_per_second = if body.eval_duration > 0 {
            body.eval_count as f64 / body.eval_duration as f64 * 1e9
        } else {
            0.0
        };

        Ok(GenerationOutcome {
            result: parse_model_output(&body.response),
            response_time_ms,
            tokens_per_second,
        })
    }

    /// Model list as reported by the daemon's tag endpoint.
    pub async fn list_models(&self) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::LLMError(format!(
                "API error ({})",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))
    }

    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Instruction frame wrapped around the article text.
fn build_prompt(system_prompt: &str, news_text: &str) -> String {
    format!(
        "{}\n\nHaber metni:\n{}\n\nYukarıdaki haberi analiz et ve JSON formatında yanıt ver.",
        system_prompt, news_text
    )
}

/// Translate the template's tool fields into the JSON schema the daemon
/// expects in its `format` parameter.
fn build_format_schema(tools: &HashMap<String, ToolField>) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required: Vec<&String> = tools.keys().collect();
    required.sort();

    for (name, field) in tools {
        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), json!(field.field_type));
        prop.insert("description".to_string(), json!(field.description));
        if let Some(values) = &field.allowed_values {
            prop.insert("enum".to_string(), json!(values));
        }
        properties.insert(name.clone(), Value::Object(prop));
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Constrained output should be valid JSON; when a model still manages to
/// emit something else, hand the raw text back instead of failing.
fn parse_model_output(response: &str) -> Value {
    serde_json::from_str(response).unwrap_or_else(|_| json!({ "raw_response": response }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_schema_lists_required_fields() {
        let mut tools = HashMap::new();
        tools.insert(
            "kategori".to_string(),
            ToolField {
                description: "Haber kategorisi".to_string(),
                field_type: "string".to_string(),
                allowed_values: Some(vec!["ekonomi".to_string(), "spor".to_string()]),
            },
        );
        tools.insert(
            "duygu".to_string(),
            ToolField {
                description: "Duygu analizi".to_string(),
                field_type: "string".to_string(),
                allowed_values: None,
            },
        );

        let schema = build_format_schema(&tools);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["duygu", "kategori"]));
        assert_eq!(schema["properties"]["kategori"]["enum"][0], "ekonomi");
        assert!(schema["properties"]["duygu"].get("enum").is_none());
    }

    #[test]
    fn test_model_output_falls_back_to_raw_text() {
        assert_eq!(
            parse_model_output(r#"{"kategori": "spor"}"#)["kategori"],
            "spor"
        );
        assert_eq!(
            parse_model_output("not json at all")["raw_response"],
            "not json at all"
        );
    }

    #[test]
    fn test_prompt_frames_article_text() {
        let prompt = build_prompt("Sınıflandır", "Dolar yükseldi.");
        assert!(prompt.starts_with("Sınıflandır"));
        assert!(prompt.contains("Haber metni:\nDolar yükseldi."));
    }
}
