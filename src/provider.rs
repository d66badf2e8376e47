//! The provider service.
//!
//! [`ProviderService`] is the surface a host plugin framework drives;
//! [`LogzioProvider`] implements it for the Logz.io data sources.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{LogShippingTokensClient, TokenSource};
use crate::config::ProviderConfig;
use crate::data_source::{self, DATA_SOURCE_TYPE};
use crate::error::ProviderError;
use crate::resolver::TokenResolver;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::validation::validate;

/// Names of everything a provider offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Data source type names, sorted.
    pub data_sources: Vec<String>,
}

/// Operations a host framework calls on a provider.
///
/// # Example
///
/// ```ignore
/// use logzio_provider::{LogzioProvider, ProviderService};
/// use serde_json::json;
///
/// let provider = LogzioProvider::new();
/// provider.configure(json!({"api_token": "..."})).await?;
/// let state = provider
///     .read_data_source("logzio_log_shipping_token", json!({"token_id": 42}))
///     .await?;
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let mut data_sources: Vec<String> = self.schema().data_sources.keys().cloned().collect();
        data_sources.sort();
        ProviderMetadata { data_sources }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.schema().provider, &config))
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        match self.schema().data_sources.get(data_source_type) {
            Some(schema) => Ok(validate(schema, &config)),
            None => Err(ProviderError::UnknownResource(data_source_type.to_string())),
        }
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}

/// Logz.io provider.
///
/// The token client is created once, on [`ProviderService::configure`], and
/// shared by every read afterwards.
pub struct LogzioProvider {
    source: RwLock<Option<Arc<dyn TokenSource>>>,
}

impl LogzioProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self {
            source: RwLock::new(None),
        }
    }

    /// Create a provider that reads through `source` instead of the HTTP API.
    ///
    /// A later [`ProviderService::configure`] replaces it.
    pub fn with_token_source(source: impl TokenSource + 'static) -> Self {
        let source: Arc<dyn TokenSource> = Arc::new(source);
        Self {
            source: RwLock::new(Some(source)),
        }
    }

    async fn token_source(&self) -> Result<Arc<dyn TokenSource>, ProviderError> {
        self.source.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }
}

impl Default for LogzioProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderService for LogzioProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_data_source(DATA_SOURCE_TYPE, data_source::schema())
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");
        let diagnostics = validate(&self.schema().provider, &config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
            return Ok(diagnostics);
        }

        let settings = ProviderConfig::from_value(&config)?;
        let client =
            LogShippingTokensClient::new(settings.api_token.as_str(), &settings.base_url())?;
        let base_url = client.base_url().to_string();

        let client: Arc<dyn TokenSource> = Arc::new(client);
        *self.source.write().await = Some(client);
        info!(%base_url, "Configure completed successfully");
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        match data_source_type {
            DATA_SOURCE_TYPE => Ok(data_source::validate_config(&config)),
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        debug!("ReadDataSource called");
        if data_source_type != DATA_SOURCE_TYPE {
            return Err(ProviderError::UnknownResource(data_source_type.to_string()));
        }

        let resolver = TokenResolver::new(self.token_source().await?);
        match data_source::read(&resolver, &config).await {
            Ok(state) => {
                info!("ReadDataSource completed successfully");
                Ok(state)
            }
            Err(e) => {
                error!(error = %e, "ReadDataSource failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;
    use crate::testing::{
        assert_diagnostic_contains, assert_error_contains, assert_has_errors, assert_no_errors,
        sample_token, InMemoryTokenSource, SourceCall,
    };
    use serde_json::json;

    #[test]
    fn test_metadata_lists_data_sources() {
        let provider = LogzioProvider::new();
        assert_eq!(
            provider.metadata().data_sources,
            vec![DATA_SOURCE_TYPE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_read_before_configure() {
        let provider = LogzioProvider::new();
        let err = provider
            .read_data_source(DATA_SOURCE_TYPE, json!({"token_id": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_data_source() {
        let provider = LogzioProvider::with_token_source(InMemoryTokenSource::new(vec![]));
        let err = provider
            .read_data_source("logzio_alert", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider
            .validate_data_source_config("logzio_alert", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_read_through_injected_source() {
        let source = Arc::new(InMemoryTokenSource::new(vec![sample_token(5, "svc", false)]));
        let provider = LogzioProvider::with_token_source(source.clone());

        let state = provider
            .read_data_source(DATA_SOURCE_TYPE, json!({"name": "svc", "enabled": false}))
            .await
            .unwrap();

        assert_eq!(state["id"], "5");
        assert_eq!(state["enabled"], false);
        assert_eq!(
            source.calls(),
            vec![SourceCall::Retrieve {
                page_number: 1,
                page_size: 25,
                enabled: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_configure_rejects_bad_types() {
        let provider = LogzioProvider::new();
        let diagnostics = provider.configure(json!({"api_token": 5})).await.unwrap();
        assert_has_errors(&diagnostics);
        assert_error_contains(&diagnostics, "api_token");
        assert!(provider.token_source().await.is_err());
    }

    #[tokio::test]
    async fn test_configure_rejects_region_outside_hostname_label() {
        let provider = LogzioProvider::new();
        let err = provider
            .configure(json!({"api_token": "abc", "region": "eu/x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(provider.token_source().await.is_err());
    }

    #[tokio::test]
    async fn test_configure_installs_client() {
        let provider = LogzioProvider::new();
        let diagnostics = provider
            .configure(json!({"api_token": "abc", "base_url": "http://127.0.0.1:1"}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
        assert!(diagnostics.is_empty());
        assert!(provider.token_source().await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_provider_config() {
        let provider = LogzioProvider::new();
        let diagnostics = provider
            .validate_provider_config(json!({"region": true}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_error_contains(&diagnostics, "region");
    }

    #[tokio::test]
    async fn test_validate_data_source_config_warns_on_partial_name_lookup() {
        let provider = LogzioProvider::with_token_source(InMemoryTokenSource::new(vec![]));
        let diagnostics = provider
            .validate_data_source_config(DATA_SOURCE_TYPE, json!({"enabled": true}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
        assert_diagnostic_contains(&diagnostics, DiagnosticSeverity::Warning, "'name'");
    }
}
