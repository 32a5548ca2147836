// Logo loader - fetches the report logo over HTTP or from disk and decodes it once
use crate::application::export::{AssetError, LogoLoader};
use crate::domain::document::LogoImage;
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpLogoLoader {
    http: Client,
    source: String,
}

impl HttpLogoLoader {
    /// `source` is an http(s) URL or a local file path
    pub fn new(http: Client, source: impl Into<String>) -> Self {
        Self {
            http,
            source: source.into(),
        }
    }

    async fn fetch(&self) -> Result<Vec<u8>, AssetError> {
        if self.source.starts_with("http://") || self.source.starts_with("https://") {
            let response = self
                .http
                .get(&self.source)
                .send()
                .await
                .map_err(|e| AssetError::Fetch(e.to_string()))?;

            if !response.status().is_success() {
                return Err(AssetError::Fetch(format!(
                    "{} answered {}",
                    self.source,
                    response.status()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| AssetError::Fetch(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(&self.source)
                .await
                .map_err(|e| AssetError::Fetch(format!("{}: {}", self.source, e)))
        }
    }
}

#[async_trait]
impl LogoLoader for HttpLogoLoader {
    async fn load(&self) -> Result<LogoImage, AssetError> {
        let bytes = self.fetch().await?;
        let decoded = printpdf::image_crate::load_from_memory(&bytes)
            .map_err(|e| AssetError::Decode(e.to_string()))?
            .into_rgb8();
        let (width_px, height_px) = decoded.dimensions();
        tracing::debug!(source = %self.source, width_px, height_px, "logo loaded");

        Ok(LogoImage {
            rgb: decoded.into_raw(),
            width_px,
            height_px,
        })
    }
}
