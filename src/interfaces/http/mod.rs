use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpResponse, HttpResponseBuilder, HttpServer};

use crate::application::{ClassifyUseCase, ReportUseCase, WorkbookExporter};
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::OllamaClient;
use crate::infrastructure::storage::TemplateStore;

mod classify;
mod report;
mod templates;

pub struct AppState {
    pub report: ReportUseCase,
    pub exporter: WorkbookExporter,
    pub classify: ClassifyUseCase,
    pub store: Arc<TemplateStore>,
    pub ollama: Arc<OllamaClient>,
}

/// Map the error taxonomy onto transport status codes. The body shape is
/// decided per handler.
pub(crate) fn error_response(error: &AppError) -> HttpResponseBuilder {
    match error {
        AppError::InvalidInput(_) => HttpResponse::BadRequest(),
        AppError::NotFound(_) => HttpResponse::NotFound(),
        AppError::ReportGeneration(_) | AppError::LLMError(_) | AppError::IoError(_) => {
            HttpResponse::InternalServerError()
        }
    }
}

pub fn start_server(config: &AppConfig, state: AppState) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Frontend runs on its own origin.

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(classify::health)
                .service(classify::list_models)
                .service(classify::classify)
                .service(classify::classify_batch)
                .service(report::report_preview)
                .service(report::report_export)
                .service(templates::list_templates)
                .service(templates::get_template)
                .service(templates::create_template)
                .service(templates::update_template)
                .service(templates::delete_template)
                .service(templates::get_settings)
                .service(templates::update_settings),
        )
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
