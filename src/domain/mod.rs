pub mod channel;
pub mod error;
pub mod report;
pub mod table;
pub mod template;
