// Presentation layer - HTTP handlers, router and error banners
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod platform_handlers;
pub mod router;
