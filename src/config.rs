//! Provider configuration.
//!
//! Values come from the provider configuration block first and fall back to
//! environment variables.

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "LOGZIO_API_TOKEN";
/// Environment variable holding the account region.
pub const ENV_REGION: &str = "LOGZIO_REGION";
/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "LOGZIO_BASE_URL";

/// Base URL for accounts in the default (`us`) region.
pub const DEFAULT_BASE_URL: &str = "https://api.logz.io";

/// Resolved provider configuration.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ProviderConfig {
    /// Logz.io API token.
    pub api_token: String,
    /// Account region, e.g. `eu` or `au`. Empty means `us`.
    pub region: Option<String>,
    /// Explicit API endpoint; wins over `region`.
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<redacted>")
            .field("region", &self.region)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider configuration block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Logz.io provider configuration")
            .with_attribute(
                "api_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!("Logz.io API token. Defaults to ${}", ENV_API_TOKEN)),
            )
            .with_attribute(
                "region",
                Attribute::optional_string()
                    .with_description(format!("Account region. Defaults to ${} or us", ENV_REGION)),
            )
            .with_attribute(
                "base_url",
                Attribute::optional_string()
                    .with_description(format!("API endpoint override. Defaults to ${}", ENV_BASE_URL)),
            )
    }

    /// Build the configuration from a provider block and the process environment.
    pub fn from_value(config: &Value) -> Result<Self, ProviderError> {
        Self::from_value_with_env(config, |key| std::env::var(key).ok())
    }

    /// Build the configuration from a provider block, using `env` for fallbacks.
    pub fn from_value_with_env<F>(config: &Value, env: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |attr: &str, var: &str| -> Result<Option<String>, ProviderError> {
            match config.get(attr) {
                None | Some(Value::Null) => Ok(env(var).filter(|v| !v.is_empty())),
                Some(Value::String(s)) if s.is_empty() => Ok(env(var).filter(|v| !v.is_empty())),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(ProviderError::Validation(format!(
                    "{} must be a string",
                    attr
                ))),
            }
        };

        let api_token = setting("api_token", ENV_API_TOKEN)?.ok_or_else(|| {
            ProviderError::Configuration(format!(
                "api_token is required; set it in the provider block or via {}",
                ENV_API_TOKEN
            ))
        })?;

        let region = setting("region", ENV_REGION)?;
        if let Some(region) = &region {
            check_region(region)?;
        }

        Ok(Self {
            api_token,
            region,
            base_url: setting("base_url", ENV_BASE_URL)?,
        })
    }

    /// The API endpoint this configuration points at.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        match self.region.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_BASE_URL.to_string(),
            Some(region) if region.eq_ignore_ascii_case("us") => DEFAULT_BASE_URL.to_string(),
            Some(region) => format!("https://api-{}.logz.io", region.to_ascii_lowercase()),
        }
    }
}

/// The region becomes part of a hostname, so only letters, digits and `-` are allowed.
fn check_region(region: &str) -> Result<(), ProviderError> {
    let region = region.trim();
    if region.starts_with('-') || !region.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ProviderError::Validation(format!(
            "region '{}' may only contain ASCII letters, digits and '-'",
            region
        )));
    }
    Ok(())
}
