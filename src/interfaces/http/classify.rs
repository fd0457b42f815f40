use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use tracing::{error, info};

use crate::domain::template::{BatchClassificationRequest, ClassificationRequest};

use super::{error_response, AppState};

#[get("/health")]
pub async fn health(data: web::Data<AppState>) -> impl Responder {
    let ollama_ok = data.ollama.health_check().await;
    HttpResponse::Ok().json(json!({
        "status": if ollama_ok { "healthy" } else { "degraded" },
        "api": "ok",
        "ollama": if ollama_ok { "ok" } else { "unavailable" },
    }))
}

#[get("/models")]
pub async fn list_models(data: web::Data<AppState>) -> impl Responder {
    match data.ollama.list_models().await {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(e) => {
            error!(error = %e, "Failed to list models");
            error_response(&e).body(e.to_string())
        }
    }
}

#[post("/classify")]
pub async fn classify(
    data: web::Data<AppState>,
    req: web::Json<ClassificationRequest>,
) -> impl Responder {
    info!(template_id = %req.template_id, "Classifying news article");
    match data.classify.execute(&req.template_id, &req.news_text).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e).body(e.to_string()),
    }
}

#[post("/classify/batch")]
pub async fn classify_batch(
    data: web::Data<AppState>,
    req: web::Json<BatchClassificationRequest>,
) -> impl Responder {
    info!(
        template_id = %req.template_id,
        count = req.news_texts.len(),
        "Classifying news batch"
    );
    match data
        .classify
        .execute_batch(&req.template_id, &req.news_texts)
        .await
    {
        Ok(results) => {
            let count = results.len();
            HttpResponse::Ok().json(json!({ "results": results, "count": count }))
        }
        Err(e) => error_response(&e).body(e.to_string()),
    }
}
