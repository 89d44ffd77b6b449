pub mod export_service;
pub mod ledger_service;
pub mod summary_service;
