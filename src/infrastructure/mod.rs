// Infrastructure layer - External dependencies and adapters
pub mod api_client;
pub mod config;
pub mod http_response;
pub mod logo_loader;
pub mod pdf_writer;
