pub mod application_service;
pub mod audit_service;
pub mod interview_service;
pub mod posting_service;
