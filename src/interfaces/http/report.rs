use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{post, web, HttpResponse, Responder};
use tracing::{error, info};

use crate::application::use_cases::workbook_export::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
use crate::domain::report::{ReportPreview, StyleVariant};
use crate::domain::table::SourceFile;
use serde::Serialize;

use super::{error_response, AppState};

/// One batch of uploaded monitoring exports plus the optional style
/// selector of the summary sheet.
#[derive(MultipartForm)]
pub struct ReportUpload {
    pub files: Vec<Bytes>,
    pub style: Option<Text<String>>,
}

impl ReportUpload {
    fn sources(&self) -> Vec<SourceFile> {
        self.files
            .iter()
            .map(|f| SourceFile {
                name: f
                    .file_name
                    .clone()
                    .unwrap_or_else(|| "upload.xlsx".to_string()),
                data: f.data.to_vec(),
            })
            .collect()
    }

    fn style(&self) -> StyleVariant {
        self.style
            .as_ref()
            .map(|s| StyleVariant::from_param(s.as_str()))
            .unwrap_or(StyleVariant::Standard)
    }
}

#[derive(Serialize)]
struct PreviewEnvelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ReportPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[post("/report/preview")]
pub async fn report_preview(
    data: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ReportUpload>,
) -> impl Responder {
    let sources = form.sources();
    info!(files = sources.len(), "Building report preview");

    match data.report.preview(&sources) {
        Ok(preview) => HttpResponse::Ok().json(PreviewEnvelope {
            success: true,
            data: Some(preview),
            error: None,
        }),
        Err(e) => {
            error!(error = %e, "Report preview failed");
            error_response(&e).json(PreviewEnvelope {
                success: false,
                data: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[post("/report/export")]
pub async fn report_export(
    data: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ReportUpload>,
) -> impl Responder {
    let sources = form.sources();
    let style = form.style();
    info!(files = sources.len(), "Exporting executive summary workbook");

    let outcome = data.report.build_dataset(&sources).and_then(|dataset| {
        let summary = data.report.summarize(&dataset);
        data.exporter.export(&dataset, &summary, style)
    });

    match outcome {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(EXPORT_MIME_TYPE)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ))
            .body(bytes),
        Err(e) => {
            error!(error = %e, "Workbook export failed");
            error_response(&e).body(e.to_string())
        }
    }
}
