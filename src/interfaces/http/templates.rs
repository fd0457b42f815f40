use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use tracing::error;

use crate::domain::template::{KvCacheSettings, PromptTemplate, TemplateListResponse};

use super::{error_response, AppState};

#[get("/templates")]
pub async fn list_templates(data: web::Data<AppState>) -> impl Responder {
    let templates = data.store.list();
    let count = templates.len();
    HttpResponse::Ok().json(TemplateListResponse { templates, count })
}

#[get("/templates/{id}")]
pub async fn get_template(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.store.get(&path) {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => error_response(&e).body(e.to_string()),
    }
}

#[post("/templates")]
pub async fn create_template(
    data: web::Data<AppState>,
    template: web::Json<PromptTemplate>,
) -> impl Responder {
    match data.store.create(template.into_inner()) {
        Ok(created) => HttpResponse::Ok().json(created),
        Err(e) => {
            error!(error = %e, "Failed to create template");
            error_response(&e).body(e.to_string())
        }
    }
}

#[put("/templates/{id}")]
pub async fn update_template(
    data: web::Data<AppState>,
    path: web::Path<String>,
    template: web::Json<PromptTemplate>,
) -> impl Responder {
    match data.store.update(&path, template.into_inner()) {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => error_response(&e).body(e.to_string()),
    }
}

#[delete("/templates/{id}")]
pub async fn delete_template(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.store.delete(&path) {
        Ok(()) => HttpResponse::Ok().json(json!({ "deleted": path.into_inner() })),
        Err(e) => error_response(&e).body(e.to_string()),
    }
}

#[get("/settings")]
pub async fn get_settings(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.store.settings())
}

#[put("/settings")]
pub async fn update_settings(
    data: web::Data<AppState>,
    settings: web::Json<KvCacheSettings>,
) -> impl Responder {
    match data.store.update_settings(settings.into_inner()) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => {
            error!(error = %e, "Failed to persist settings");
            error_response(&e).body(e.to_string())
        }
    }
}
