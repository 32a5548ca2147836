// Domain layer - Platform entities, report payloads and the document model
pub mod analytics;
pub mod appointment;
pub mod community;
pub mod dashboard;
pub mod document;
pub mod id;
pub mod notification;
pub mod report;
pub mod session;
pub mod user;
