//! The `logzio_log_shipping_token` data source.
//!
//! Reads a single log shipping token either by `token_id` or by `name` and
//! `enabled`, and exposes every field of the token as computed state.

use serde_json::{json, Value};

use crate::client::TokenSource;
use crate::error::ProviderError;
use crate::resolver::{LookupRequest, TokenResolver, NOT_FOUND_MESSAGE};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::types::LogShippingToken;
use crate::validation::validate;

/// Data source type name.
pub const DATA_SOURCE_TYPE: &str = "logzio_log_shipping_token";

/// Resource identity.
pub const ATTR_ID: &str = "id";
/// Token id, input or output.
pub const ATTR_TOKEN_ID: &str = "token_id";
/// Token name, input or output.
pub const ATTR_NAME: &str = "name";
/// Enabled flag, input or output.
pub const ATTR_ENABLED: &str = "enabled";
/// Token secret.
pub const ATTR_TOKEN: &str = "token";
/// Last update time, Unix seconds.
pub const ATTR_UPDATED_AT: &str = "updated_at";
/// Who last updated the token.
pub const ATTR_UPDATED_BY: &str = "updated_by";
/// Creation time, Unix seconds.
pub const ATTR_CREATED_AT: &str = "created_at";
/// Who created the token.
pub const ATTR_CREATED_BY: &str = "created_by";

/// Schema of the data source.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a Logz.io log shipping token by id or by name")
        .with_attribute(
            ATTR_ID,
            Attribute::computed_string().with_description("Resource identity, the token id"),
        )
        .with_attribute(
            ATTR_TOKEN_ID,
            Attribute::optional_computed_int64()
                .with_description("Token id. Takes precedence over name lookups"),
        )
        .with_attribute(
            ATTR_NAME,
            Attribute::optional_computed_string()
                .with_description("Exact, case-sensitive token name. Requires enabled"),
        )
        .with_attribute(
            ATTR_ENABLED,
            Attribute::optional_computed_bool().with_description("Whether the token is enabled"),
        )
        .with_attribute(
            ATTR_TOKEN,
            Attribute::computed_string()
                .sensitive()
                .with_description("The token secret"),
        )
        .with_attribute(ATTR_UPDATED_AT, Attribute::computed_int64())
        .with_attribute(ATTR_UPDATED_BY, Attribute::computed_string())
        .with_attribute(ATTR_CREATED_AT, Attribute::computed_int64())
        .with_attribute(ATTR_CREATED_BY, Attribute::computed_string())
}

/// Build the lookup described by a data source configuration.
///
/// Returns `Ok(None)` when neither `token_id` nor both `name` and `enabled` are set.
/// An empty name or an empty `token_id` string counts as unset.
pub fn lookup_request(config: &Value) -> Result<Option<LookupRequest>, ProviderError> {
    if let Some(id) = token_id(config)? {
        return Ok(Some(LookupRequest::ById(id)));
    }

    let name = config
        .get(ATTR_NAME)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());
    let enabled = config.get(ATTR_ENABLED).and_then(Value::as_bool);

    Ok(match (name, enabled) {
        (Some(name), Some(enabled)) => Some(LookupRequest::by_name(name, enabled)),
        _ => None,
    })
}

fn token_id(config: &Value) -> Result<Option<i32>, ProviderError> {
    let raw = match config.get(ATTR_TOKEN_ID) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(raw) => raw,
    };

    let id = match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ProviderError::Validation(format!("{} must be an integer, got {}", ATTR_TOKEN_ID, raw))
    })?;

    i32::try_from(id).map(Some).map_err(|_| {
        ProviderError::Validation(format!("{} {} is out of range", ATTR_TOKEN_ID, id))
    })
}

/// Check a data source configuration before it is read.
///
/// Accepts exactly what [`read`] accepts: a numeric `token_id` string is an
/// id, and empty strings count as unset.
pub fn validate_config(config: &Value) -> Vec<Diagnostic> {
    let config = &with_numeric_token_id(config);
    let mut diagnostics = validate(&schema(), config);

    let is_set = |attr: &str| match config.get(attr) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    let (has_id, has_name, has_enabled) =
        (is_set(ATTR_TOKEN_ID), is_set(ATTR_NAME), is_set(ATTR_ENABLED));

    if has_id && has_name {
        diagnostics.push(
            Diagnostic::warning("Both token_id and name are set")
                .with_detail("The token is looked up by id; name is ignored")
                .with_attribute(ATTR_NAME),
        );
    } else if !has_id && has_name != has_enabled {
        let missing = if has_name { ATTR_ENABLED } else { ATTR_NAME };
        diagnostics.push(
            Diagnostic::warning(format!("Lookup by name also needs '{}'", missing))
                .with_detail("Set token_id, or set both name and enabled")
                .with_attribute(missing),
        );
    }

    diagnostics
}

/// Rewrite a string `token_id` the way [`lookup_request`] reads it, so schema
/// validation sees a number (or nothing) instead of a string.
fn with_numeric_token_id(config: &Value) -> Value {
    let replacement = match config.get(ATTR_TOKEN_ID) {
        Some(Value::String(raw)) if raw.trim().is_empty() => Some(Value::Null),
        Some(Value::String(raw)) => raw.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    };

    let mut config = config.clone();
    if let (Some(value), Some(map)) = (replacement, config.as_object_mut()) {
        map.insert(ATTR_TOKEN_ID.to_string(), value);
    }
    config
}

/// Read the data source: resolve the token and render it as state.
pub async fn read<S: TokenSource>(
    resolver: &TokenResolver<S>,
    config: &Value,
) -> Result<Value, ProviderError> {
    let request = lookup_request(config)?
        .ok_or_else(|| ProviderError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;
    let token = resolver.resolve(&request).await?;
    Ok(to_state(&token))
}

/// Render a token as data source state. The resource identity is the token id.
pub fn to_state(token: &LogShippingToken) -> Value {
    json!({
        ATTR_ID: token.id.to_string(),
        ATTR_TOKEN_ID: token.id,
        ATTR_NAME: token.name,
        ATTR_ENABLED: token.enabled,
        ATTR_TOKEN: token.token,
        ATTR_UPDATED_AT: token.updated_at,
        ATTR_UPDATED_BY: token.updated_by,
        ATTR_CREATED_AT: token.created_at,
        ATTR_CREATED_BY: token.created_by,
    })
}
