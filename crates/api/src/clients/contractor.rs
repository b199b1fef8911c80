//! HTTP-backed contractor directory client.
//!
//! The live counterpart of `fisca_core::directory::MockDirectory`.
//! Which implementation runs is fixed once at process start from
//! configuration.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use fisca_core::directory::{ContractorInfo, Directory, DirectoryError, MockDirectory};
use fisca_shared::config::{DirectoryConfig, DirectoryMode};
use fisca_shared::AppError;

/// Wire shape of the upstream registry's contractor record.
#[derive(Debug, Deserialize)]
struct ContractorDto {
    code: String,
    name: String,
    active: bool,
    in_good_standing: bool,
}

impl From<ContractorDto> for ContractorInfo {
    fn from(dto: ContractorDto) -> Self {
        Self {
            code: dto.code,
            name: dto.name,
            active: dto.active,
            in_good_standing: dto.in_good_standing,
        }
    }
}

/// HTTP client for the municipal contractor registry.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    /// Creates a client against the registry base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn contractor(&self, code: &str) -> Result<Option<ContractorInfo>, DirectoryError> {
        let url = format!("{}/contractors/{code}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let dto: ContractorDto = response
                    .json()
                    .await
                    .map_err(|e| DirectoryError::Malformed(e.to_string()))?;
                Ok(Some(dto.into()))
            }
            status => Err(DirectoryError::Unavailable(format!(
                "registry answered {status} for {url}"
            ))),
        }
    }
}

/// Builds the configured directory implementation. The choice is made
/// here, once; nothing downstream probes for capabilities at runtime.
///
/// # Errors
///
/// Returns an error when the HTTP mode is selected without a base URL.
pub fn build_directory(config: &DirectoryConfig) -> Result<Arc<dyn Directory>, AppError> {
    match config.mode {
        DirectoryMode::Mock => Ok(Arc::new(MockDirectory::with_samples())),
        DirectoryMode::Http => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                AppError::Validation(
                    "directory.base_url is required for directory.mode = http".to_string(),
                )
            })?;
            Ok(Arc::new(HttpDirectory::new(base_url)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_mode_needs_no_url() {
        let directory = build_directory(&DirectoryConfig {
            mode: DirectoryMode::Mock,
            base_url: None,
        });
        assert!(directory.is_ok());
    }

    #[test]
    fn test_http_mode_requires_url() {
        let err = build_directory(&DirectoryConfig {
            mode: DirectoryMode::Http,
            base_url: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpDirectory::new("https://registry.example/".to_string()).unwrap();
        assert_eq!(client.base_url, "https://registry.example");
    }
}
