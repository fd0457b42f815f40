use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::error::{AppError, Result};
use crate::domain::template::{KvCacheSettings, PromptTemplate};

const TEMPLATES_FILE: &str = "templates.json";
const SETTINGS_FILE: &str = "settings.json";

/// JSON-file backed store for prompt templates and inference settings.
/// Everything is held in memory and flushed to disk on every mutation.
pub struct TemplateStore {
    data_dir: PathBuf,
    templates: Mutex<HashMap<String, PromptTemplate>>,
    settings: Mutex<KvCacheSettings>,
}

impl TemplateStore {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let templates = read_json_or_default::<HashMap<String, PromptTemplate>>(
            &data_dir.join(TEMPLATES_FILE),
        )?;
        let settings = read_json_or_default::<KvCacheSettings>(&data_dir.join(SETTINGS_FILE))?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            templates: Mutex::new(templates),
            settings: Mutex::new(settings),
        })
    }

    pub fn list(&self) -> Vec<PromptTemplate> {
        let templates = self.templates.lock().unwrap();
        let mut all: Vec<PromptTemplate> = templates.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn get(&self, id: &str) -> Result<PromptTemplate> {
        self.templates
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
    }

    pub fn create(&self, mut template: PromptTemplate) -> Result<PromptTemplate> {
        let id: String = uuid::Uuid::new_v4().to_string().chars().take(8).collect();
        template.id = Some(id.clone());
        let mut templates = self.templates.lock().unwrap();
        templates.insert(id, template.clone());
        self.persist_templates(&templates)?;
        Ok(template)
    }

    pub fn update(&self, id: &str, mut template: PromptTemplate) -> Result<PromptTemplate> {
        let mut templates = self.templates.lock().unwrap();
        if !templates.contains_key(id) {
            return Err(AppError::NotFound("Template not found".to_string()));
        }
        template.id = Some(id.to_string());
        templates.insert(id.to_string(), template.clone());
        self.persist_templates(&templates)?;
        Ok(template)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut templates = self.templates.lock().unwrap();
        if templates.remove(id).is_none() {
            return Err(AppError::NotFound("Template not found".to_string()));
        }
        self.persist_templates(&templates)
    }

    pub fn settings(&self) -> KvCacheSettings {
        self.settings.lock().unwrap().clone()
    }

    pub fn update_settings(&self, new_settings: KvCacheSettings) -> Result<KvCacheSettings> {
        new_settings.validate()?;
        let mut settings = self.settings.lock().unwrap();
        *settings = new_settings.clone();
        self.write_json(SETTINGS_FILE, &*settings)?;
        Ok(new_settings)
    }

    fn persist_templates(&self, templates: &HashMap<String, PromptTemplate>) -> Result<()> {
        self.write_json(TEMPLATES_FILE, templates)
    }

    fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        ensure_dir(&self.data_dir)?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::IoError(format!("Failed to serialize {}: {}", file_name, e)))?;
        fs::write(self.data_dir.join(file_name), json)?;
        Ok(())
    }
}

fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::IoError(format!("Failed to parse {}: {}", path.display(), e)))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
