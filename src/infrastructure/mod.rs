pub mod config;
pub mod llm_clients;
pub mod spreadsheet;
pub mod storage;
