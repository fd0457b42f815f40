use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::error::{AppError, Result};

/// One output field of a classification schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolField {
    pub description: String,
    #[serde(default = "default_field_type", rename = "type")]
    pub field_type: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

fn default_field_type() -> String {
    "string".to_string()
}

/// Prompt template driving news classification against the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// System prompt describing the classification task.
    pub prompt_desc: String,
    /// Output schema, one entry per field the model must fill.
    #[serde(default)]
    pub tools: HashMap<String, ToolField>,
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
    #[serde(default)]
    pub temperature: f64,
}

fn default_model() -> String {
    "qwen2.5:32b-instruct-q4_K_M".to_string()
}

fn default_keep_alive() -> String {
    "10m".to_string()
}

fn default_num_ctx() -> u32 {
    4096
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvCacheType {
    #[serde(rename = "q4_0")]
    Q4_0,
    #[serde(rename = "q8_0")]
    Q8_0,
    #[serde(rename = "f16")]
    F16,
}

/// Global inference settings shared by all templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvCacheSettings {
    pub kv_cache_type: KvCacheType,
    pub num_parallel: u8,
    pub default_keep_alive: String,
}

impl KvCacheSettings {
    /// `num_parallel` maps onto `OLLAMA_NUM_PARALLEL` and must stay in 1..=16.
    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.num_parallel) {
            return Err(AppError::InvalidInput(format!(
                "num_parallel must be between 1 and 16, got {}",
                self.num_parallel
            )));
        }
        Ok(())
    }
}

impl Default for KvCacheSettings {
    fn default() -> Self {
        Self {
            kv_cache_type: KvCacheType::Q8_0,
            num_parallel: 4,
            default_keep_alive: default_keep_alive(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationRequest {
    pub template_id: String,
    pub news_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchClassificationRequest {
    pub template_id: String,
    pub news_texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_per_second: Option<f64>,
}

impl ClassificationResponse {
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
            response_time_ms: None,
            tokens_per_second: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<PromptTemplate>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_defaults_fill_in() {
        let template: PromptTemplate = serde_json::from_str(
            r#"{"name": "Kategori", "prompt_desc": "Haberi sınıflandır"}"#,
        )
        .unwrap();
        assert_eq!(template.keep_alive, "10m");
        assert_eq!(template.num_ctx, 4096);
        assert_eq!(template.temperature, 0.0);
        assert!(template.tools.is_empty());
    }

    #[test]
    fn test_tool_field_enum_roundtrip() {
        let field: ToolField = serde_json::from_str(
            r#"{"description": "Haber kategorisi", "enum": ["ekonomi", "spor"]}"#,
        )
        .unwrap();
        assert_eq!(field.field_type, "string");
        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["enum"][1], "spor");
    }

    #[test]
    fn test_settings_num_parallel_bounds() {
        let mut settings = KvCacheSettings::default();
        settings.validate().unwrap();

        for bad in [0u8, 17, 200] {
            settings.num_parallel = bad;
            let err = settings.validate().unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "accepted {}", bad);
        }

        for ok in [1u8, 16] {
            settings.num_parallel = ok;
            settings.validate().unwrap();
        }
    }

    #[test]
    fn test_settings_default_serialization() {
        let value = serde_json::to_value(KvCacheSettings::default()).unwrap();
        assert_eq!(value["kv_cache_type"], "q8_0");
        assert_eq!(value["num_parallel"], 4);
    }
}
