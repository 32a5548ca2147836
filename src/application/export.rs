// Export seams - logo loading, document serialization and download naming
use crate::domain::document::{Document, LogoImage};
use crate::domain::report::ReportKind;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("logo request failed: {0}")]
    Fetch(String),
    #[error("logo could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document rendering failed: {0}")]
    Render(String),
    #[error("export task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait LogoLoader: Send + Sync {
    async fn load(&self) -> Result<LogoImage, AssetError>;
}

/// Serializes an assembled document into a complete file buffer
pub trait DocumentWriter: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn write(&self, document: &Document) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `{ReportName}_{YYYY-MM-DD}.{ext}`, e.g. `Community_Engagement_Report_2024-01-31.pdf`
pub fn export_filename(kind: ReportKind, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", kind.title().replace(' ', "_"), date.format("%Y-%m-%d"), extension)
}

/// Load the logo within `timeout`. Any failure yields None so the header
/// falls back to the drawn placeholder; it never fails the export.
pub async fn load_logo(loader: Option<&dyn LogoLoader>, timeout: Duration) -> Option<LogoImage> {
    let loader = loader?;
    match tokio::time::timeout(timeout, loader.load()).await {
        Ok(Ok(logo)) => Some(logo),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "logo unavailable, drawing placeholder");
            None
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "logo load timed out, drawing placeholder");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct SlowLogo(pub Duration);

    #[async_trait]
    impl LogoLoader for SlowLogo {
        async fn load(&self) -> Result<LogoImage, AssetError> {
            tokio::time::sleep(self.0).await;
            Ok(LogoImage {
                rgb: vec![255; 32 * 32 * 3],
                width_px: 32,
                height_px: 32,
            })
        }
    }

    struct BrokenLogo;

    #[async_trait]
    impl LogoLoader for BrokenLogo {
        async fn load(&self) -> Result<LogoImage, AssetError> {
            Err(AssetError::Decode("not an image".to_string()))
        }
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            export_filename(ReportKind::CommunityEngagement, date, "pdf"),
            "Community_Engagement_Report_2024-01-31.pdf"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logo_timeout_falls_back() {
        let slow = SlowLogo(Duration::from_millis(6000));
        let logo = load_logo(Some(&slow), Duration::from_millis(5000)).await;
        assert!(logo.is_none());

        let quick = SlowLogo(Duration::from_millis(100));
        let logo = load_logo(Some(&quick), Duration::from_millis(5000)).await;
        assert!(logo.is_some());
    }

    #[tokio::test]
    async fn test_decode_failure_and_missing_loader() {
        assert!(load_logo(Some(&BrokenLogo), Duration::from_secs(5)).await.is_none());
        assert!(load_logo(None, Duration::from_secs(5)).await.is_none());
    }
}
