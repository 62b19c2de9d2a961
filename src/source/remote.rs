//! HTTP provider talking to a catalog service.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::mri::{decode_mri, MRI_CONTENT_TYPE, WEBP_CONTENT_TYPE};
use super::ChapterResolver;
use crate::error::{ErrorKind, SourceError, SourceResult};
use crate::models::{ChapterData, ChapterRef, ImageHandle, PageRef, Series};

/// Chapter description served by `GET /series/{id}/chapters/{n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterManifest {
    pub series_id: String,
    pub chapter_number: u32,
    pub page_count: u32,
}

/// Resolves chapters and images from a catalog service over HTTP.
pub struct RemoteSource {
    client: Client,
    base_url: Url,
}

impl RemoteSource {
    /// Creates a remote source rooted at `base_url`.
    pub fn new(base_url: &str) -> SourceResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a remote source using a preconfigured HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> SourceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            SourceError::with_message(
                ErrorKind::Internal,
                format!("Invalid base URL {}: {}", base_url, e),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::with_message(
                ErrorKind::Internal,
                format!("Base URL {} cannot carry a path", base_url),
            ));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the series listing.
    pub fn series_url(&self) -> Url {
        self.url_for(&["series"])
    }

    /// URL of a chapter manifest.
    pub fn chapter_url(&self, chapter: &ChapterRef) -> Url {
        let chapter_number = chapter.chapter_number.to_string();
        self.url_for(&["series", &chapter.series_id, "chapters", &chapter_number])
    }

    /// URL of a page image.
    pub fn page_url(&self, page: &PageRef) -> Url {
        let chapter_number = page.chapter_number.to_string();
        let page_number = page.page_number.to_string();
        self.url_for(&[
            "series",
            &page.series_id,
            "chapters",
            &chapter_number,
            "pages",
            &page_number,
        ])
    }

    /// Appends percent-encoded segments to the base path.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ChapterResolver for RemoteSource {
    async fn resolve_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<ChapterData>> {
        let url = self.chapter_url(chapter);
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::with_message(
                ErrorKind::Status,
                format!("{} returned {}", url, response.status()),
            ));
        }

        let body = response.bytes().await?;
        let manifest: ChapterManifest = serde_json::from_slice(&body)?;
        if manifest.series_id != chapter.series_id
            || manifest.chapter_number != chapter.chapter_number
        {
            return Err(SourceError::with_message(
                ErrorKind::InvalidReference,
                format!(
                    "{} described chapter {}#{}",
                    url, manifest.series_id, manifest.chapter_number
                ),
            ));
        }

        Ok(Some(ChapterData::with_page_count(
            chapter.clone(),
            manifest.page_count,
        )))
    }

    async fn resolve_page_image(&self, page: &PageRef) -> SourceResult<ImageHandle> {
        let url = self.page_url(page);
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::with_message(
                ErrorKind::ImageUnavailable,
                format!("{} not found", url),
            ));
        }
        let response = response.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let body = response.bytes().await?;

        if content_type == MRI_CONTENT_TYPE {
            return Ok(ImageHandle::new(WEBP_CONTENT_TYPE, decode_mri(&body)?));
        }
        Ok(ImageHandle::new(content_type, body))
    }

    async fn popular_series(&self) -> SourceResult<Vec<Series>> {
        let url = self.series_url();
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
