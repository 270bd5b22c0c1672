pub mod import_service;
pub mod record_store;
pub mod table_service;
