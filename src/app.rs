use std::sync::Arc;

use tracing::{error, info};

use crate::application::{ClassifyUseCase, ReportUseCase, WorkbookExporter};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::OllamaClient;
use crate::infrastructure::storage::TemplateStore;
use crate::interfaces::http::{start_server, AppState};

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = AppConfig::from_env();

    let store = TemplateStore::load(&config.data_dir).map_err(|err| {
        error!(
            error = %err,
            data_dir = %config.data_dir.display(),
            "Failed to load template store"
        );
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;
    let store = Arc::new(store);
    let ollama = Arc::new(OllamaClient::new(&config.ollama_base_url));

    let state = AppState {
        report: ReportUseCase::new(),
        exporter: WorkbookExporter::new(),
        classify: ClassifyUseCase::new(ollama.clone(), store.clone()),
        store,
        ollama,
    };

    info!(host = %config.host, port = config.port, "Starting media monitoring backend");
    start_server(&config, state)?.await
}
