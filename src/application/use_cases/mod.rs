pub mod classify;
pub mod report_pipeline;
pub mod workbook_export;
