use async_trait::async_trait;
use tracing::info;

use crate::models::CampRecord;
use crate::services::upstream::{self, UpstreamError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to save camp: {0}")]
pub struct SaveFailed(pub UpstreamError);

/// Remote store for newly registered camps.
#[async_trait]
pub trait CampRegistry: Send + Sync {
    async fn create(&self, record: &CampRecord) -> Result<(), SaveFailed>;
}

pub struct HttpCampRegistry {
    client: reqwest::Client,
    url: String,
}

impl HttpCampRegistry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: upstream::http_client(),
            url: url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(upstream::env_url(
            "CAMP_REGISTRY_URL",
            "http://localhost:8000/api/camps",
        ))
    }
}

#[async_trait]
impl CampRegistry for HttpCampRegistry {
    async fn create(&self, record: &CampRecord) -> Result<(), SaveFailed> {
        let resp = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| SaveFailed(UpstreamError::Unreachable(e.to_string())))?;

        if !resp.status().is_success() {
            return Err(SaveFailed(UpstreamError::Status(resp.status().as_u16())));
        }

        info!(
            "🏕️ Camp '{}' saved to registry (request {})",
            record.camp_name, record.request_id
        );
        Ok(())
    }
}
