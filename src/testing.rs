//! Testing utilities for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] directly, and
//! [`InMemoryTokenSource`] stands in for the Logz.io API while recording
//! every call made to it.
//!
//! # Example
//!
//! ```ignore
//! use logzio_provider::testing::{sample_token, InMemoryTokenSource, ProviderTester};
//! use logzio_provider::LogzioProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn reads_by_name() {
//!     let source = InMemoryTokenSource::new(vec![sample_token(1, "svc", true)]);
//!     let tester = ProviderTester::new(LogzioProvider::with_token_source(source));
//!
//!     let state = tester
//!         .read_data_source("logzio_log_shipping_token", json!({"name": "svc", "enabled": true}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["id"], "1");
//! }
//! ```

use std::sync::Mutex;

use serde_json::Value;

use crate::client::TokenSource;
use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{
    LogShippingToken, RetrieveLogShippingTokensRequest, RetrieveLogShippingTokensResponse,
};

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Validate a data source configuration, failing on any error diagnostic.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Validate, then read.
    pub async fn validate_and_read(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_data_source_config(data_source_type, config.clone())
            .await?;
        Ok(self.read_data_source(data_source_type, config).await?)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Token source double
// =========================================================================

/// A remote call observed by [`InMemoryTokenSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCall {
    /// `get_log_shipping_token(id)`.
    Get(i32),
    /// `retrieve_log_shipping_tokens` for one page.
    Retrieve {
        /// Requested page, 1-based.
        page_number: i32,
        /// Requested page size.
        page_size: i32,
        /// Enabled filter.
        enabled: bool,
    },
}

/// An in-memory token store that behaves like the search API.
///
/// Searches filter on `enabled`, keep insertion order and slice by the
/// requested page. Unknown ids fail with a 404 [`ProviderError::Api`].
#[derive(Debug, Default)]
pub struct InMemoryTokenSource {
    tokens: Vec<LogShippingToken>,
    fail_on_page: Option<i32>,
    reported_total: Option<i32>,
    calls: Mutex<Vec<SourceCall>>,
}

impl InMemoryTokenSource {
    /// Create a store holding `tokens`, in this order.
    pub fn new(tokens: Vec<LogShippingToken>) -> Self {
        Self {
            tokens,
            ..Default::default()
        }
    }

    /// Make the search fail with a 500 when this page is requested.
    pub fn fail_on_page(mut self, page_number: i32) -> Self {
        self.fail_on_page = Some(page_number);
        self
    }

    /// Report this total on every page instead of the real count.
    pub fn with_reported_total(mut self, total: i32) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Page numbers requested so far, in order.
    pub fn page_calls(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SourceCall::Retrieve { page_number, .. } => Some(page_number),
                SourceCall::Get(_) => None,
            })
            .collect()
    }

    fn record(&self, call: SourceCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for InMemoryTokenSource {
    async fn get_log_shipping_token(&self, id: i32) -> Result<LogShippingToken, ProviderError> {
        self.record(SourceCall::Get(id));
        self.tokens
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: format!("log shipping token {} not found", id),
            })
    }

    async fn retrieve_log_shipping_tokens(
        &self,
        request: &RetrieveLogShippingTokensRequest,
    ) -> Result<RetrieveLogShippingTokensResponse, ProviderError> {
        let page_number = request.pagination.page_number;
        let page_size = request.pagination.page_size;
        self.record(SourceCall::Retrieve {
            page_number,
            page_size,
            enabled: request.filter.enabled,
        });

        if self.fail_on_page == Some(page_number) {
            return Err(ProviderError::Api {
                status: 500,
                message: "internal server error".to_string(),
            });
        }

        let matching: Vec<&LogShippingToken> = self
            .tokens
            .iter()
            .filter(|t| t.enabled == request.filter.enabled)
            .collect();
        let skip = (page_number.max(1) as usize - 1) * page_size.max(0) as usize;
        let results = matching
            .iter()
            .skip(skip)
            .take(page_size.max(0) as usize)
            .map(|t| (*t).clone())
            .collect();

        Ok(RetrieveLogShippingTokensResponse {
            total: self.reported_total.unwrap_or(matching.len() as i32),
            results,
        })
    }
}

/// A token with predictable audit fields and secret.
pub fn sample_token(id: i32, name: &str, enabled: bool) -> LogShippingToken {
    LogShippingToken {
        id,
        name: name.to_string(),
        enabled,
        token: format!("secret-{}", id),
        updated_at: 1_700_000_000 + i64::from(id),
        updated_by: "updater@example.com".to_string(),
        created_at: 1_600_000_000 + i64::from(id),
        created_by: "creator@example.com".to_string(),
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that a diagnostic of `severity` has a summary containing `substring`.
///
/// # Panics
///
/// Panics if no such diagnostic exists.
pub fn assert_diagnostic_contains(
    diagnostics: &[Diagnostic],
    severity: DiagnosticSeverity,
    substring: &str,
) {
    let found = diagnostics
        .iter()
        .any(|d| d.severity == severity && d.summary.contains(substring));

    assert!(
        found,
        "Expected a {:?} containing '{}', but none found. Diagnostics: {:?}",
        severity,
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that an error diagnostic's summary contains `substring`.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert_diagnostic_contains(diagnostics, DiagnosticSeverity::Error, substring);
}
