//! Wire types for the Logz.io log shipping tokens API.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of tokens requested per page when searching by name.
pub const PAGE_SIZE: i32 = 25;

/// A log shipping token as returned by the API.
///
/// The provider never modifies tokens; they are copied into data source state as-is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogShippingToken {
    /// Numeric identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Whether the token currently accepts logs.
    pub enabled: bool,
    /// The secret value.
    pub token: String,
    /// Last update, epoch seconds.
    #[serde(default)]
    pub updated_at: i64,
    /// Who last updated the token.
    #[serde(default)]
    pub updated_by: String,
    /// Creation time, epoch seconds.
    #[serde(default)]
    pub created_at: i64,
    /// Who created the token.
    #[serde(default)]
    pub created_by: String,
}

impl fmt::Debug for LogShippingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogShippingToken")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("token", &"<redacted>")
            .field("updated_at", &self.updated_at)
            .field("updated_by", &self.updated_by)
            .field("created_at", &self.created_at)
            .field("created_by", &self.created_by)
            .finish()
    }
}

/// Filter part of a token search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShippingTokensFilter {
    /// Only return tokens with this enabled state. Sent as `"true"` / `"false"`.
    #[serde(serialize_with = "bool_as_string")]
    pub enabled: bool,
}

/// Pagination part of a token search. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingTokensPagination {
    /// Page to fetch, starting at 1.
    pub page_number: i32,
    /// Tokens per page.
    pub page_size: i32,
}

/// Body of `POST /v1/log-shipping/tokens/search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetrieveLogShippingTokensRequest {
    /// Which tokens to return.
    pub filter: ShippingTokensFilter,
    /// Which page to return.
    pub pagination: ShippingTokensPagination,
}

impl RetrieveLogShippingTokensRequest {
    /// First page of tokens matching `enabled`, [`PAGE_SIZE`] per page.
    pub fn first_page(enabled: bool) -> Self {
        Self {
            filter: ShippingTokensFilter { enabled },
            pagination: ShippingTokensPagination {
                page_number: 1,
                page_size: PAGE_SIZE,
            },
        }
    }

    /// The same search, one page further.
    pub fn next_page(mut self) -> Self {
        self.pagination.page_number += 1;
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RetrieveLogShippingTokensResponse {
    /// Number of tokens matching the filter across all pages.
    pub total: i32,
    /// Tokens on this page.
    #[serde(default)]
    pub results: Vec<LogShippingToken>,
}

fn bool_as_string<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_decodes_camel_case() {
        let token: LogShippingToken = serde_json::from_value(json!({
            "id": 7,
            "name": "svc-prod",
            "enabled": true,
            "token": "s3cr3t",
            "updatedAt": 1700000000,
            "updatedBy": "alice@example.com",
            "createdAt": 1600000000,
            "createdBy": "bob@example.com"
        }))
        .unwrap();

        assert_eq!(token.id, 7);
        assert_eq!(token.name, "svc-prod");
        assert!(token.enabled);
        assert_eq!(token.updated_at, 1700000000);
        assert_eq!(token.created_by, "bob@example.com");
    }

    #[test]
    fn test_token_debug_redacts_secret() {
        let token = LogShippingToken {
            id: 1,
            name: "svc".to_string(),
            token: "s3cr3t".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", token);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_search_request_body() {
        let request = RetrieveLogShippingTokensRequest::first_page(false);
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "filter": {"enabled": "false"},
                "pagination": {"pageNumber": 1, "pageSize": 25}
            })
        );

        let next = request.next_page();
        assert_eq!(next.pagination.page_number, 2);
        assert_eq!(next.pagination.page_size, PAGE_SIZE);
    }

    #[test]
    fn test_response_without_results() {
        let page: RetrieveLogShippingTokensResponse =
            serde_json::from_value(json!({"total": 0})).unwrap();
        assert!(page.results.is_empty());
    }
}
