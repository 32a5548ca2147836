// Application layer - Use cases over the platform repositories
pub mod appointment_service;
pub mod auth_service;
pub mod community_service;
pub mod dashboard_service;
pub mod document_assembler;
pub mod errors;
pub mod export;
pub mod notification_service;
pub mod report_service;
pub mod repositories;
pub mod section_renderer;
pub mod session_context;
pub mod table_layout;
pub mod user_service;
