pub mod use_cases;

pub use use_cases::classify::ClassifyUseCase;
pub use use_cases::report_pipeline::ReportUseCase;
pub use use_cases::workbook_export::WorkbookExporter;
