//! Token lookup.
//!
//! A lookup is either a direct fetch by id or a paged search by name. The id
//! path always wins: when an id is given the search is never attempted, even
//! if the fetch fails.

use tracing::{debug, info, instrument};

use crate::client::TokenSource;
use crate::error::ProviderError;
use crate::types::{LogShippingToken, RetrieveLogShippingTokensRequest};

/// Message used whenever no token matches the lookup attributes.
pub const NOT_FOUND_MESSAGE: &str = "couldn't find log shipping token with specified attributes";

/// How to locate a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    /// Fetch the token with this id.
    ById(i32),
    /// Search tokens with this enabled state for an exact name match.
    ByName {
        /// Name to match, case-sensitively.
        name: String,
        /// Enabled filter sent with every page request.
        enabled: bool,
    },
}

impl LookupRequest {
    /// Lookup by name and enabled state.
    pub fn by_name(name: impl Into<String>, enabled: bool) -> Self {
        Self::ByName {
            name: name.into(),
            enabled,
        }
    }
}

/// Resolves a [`LookupRequest`] to exactly one token.
///
/// Holds no state between calls; each `resolve` issues at most one remote
/// call at a time.
pub struct TokenResolver<S> {
    source: S,
}

impl<S: TokenSource> TokenResolver<S> {
    /// Create a resolver over the given token source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve a lookup to a token.
    ///
    /// Remote failures are returned unchanged; a name search that exhausts
    /// every page yields [`ProviderError::NotFound`].
    pub async fn resolve(&self, request: &LookupRequest) -> Result<LogShippingToken, ProviderError> {
        match request {
            LookupRequest::ById(id) => self.find_by_id(*id).await,
            LookupRequest::ByName { name, enabled } => self.find_by_name(name, *enabled).await,
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<LogShippingToken, ProviderError> {
        let token = self.source.get_log_shipping_token(id).await?;
        info!(token_id = token.id, "Found log shipping token by id");
        Ok(token)
    }

    #[instrument(skip(self))]
    async fn find_by_name(
        &self,
        name: &str,
        enabled: bool,
    ) -> Result<LogShippingToken, ProviderError> {
        let mut request = RetrieveLogShippingTokensRequest::first_page(enabled);
        let mut reported_total = None;
        let mut retrieved: i64 = 0;

        loop {
            let page = self.source.retrieve_log_shipping_tokens(&request).await?;
            let page_number = request.pagination.page_number;
            let total = *reported_total.get_or_insert(i64::from(page.total));
            let count = page.results.len();

            if let Some(token) = page.results.into_iter().find(|t| t.name == name) {
                info!(token_id = token.id, page = page_number, "Found log shipping token by name");
                return Ok(token);
            }

            retrieved += count as i64;
            debug!(page = page_number, count, retrieved, total, "No match on page");

            // An empty page means the remote total will never be reached.
            if count == 0 || retrieved >= total {
                break;
            }
            request = request.next_page();
        }

        Err(ProviderError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_token, InMemoryTokenSource, SourceCall};
    use std::sync::Arc;

    /// Thirty enabled tokens, ids 1..=30; `svc-prod-9` sits fourth on page 2.
    fn thirty_tokens() -> Vec<LogShippingToken> {
        (1..=30)
            .map(|id| {
                let name = if id == 29 {
                    "svc-prod-9".to_string()
                } else {
                    format!("token-{}", id)
                };
                sample_token(id, &name, true)
            })
            .collect()
    }

    fn resolver(
        tokens: Vec<LogShippingToken>,
    ) -> (
        TokenResolver<Arc<InMemoryTokenSource>>,
        Arc<InMemoryTokenSource>,
    ) {
        let source = Arc::new(InMemoryTokenSource::new(tokens));
        (TokenResolver::new(source.clone()), source)
    }

    #[tokio::test]
    async fn test_by_id_success() {
        let (resolver, source) = resolver(thirty_tokens());

        let token = resolver.resolve(&LookupRequest::ById(12)).await.unwrap();

        assert_eq!(token.id, 12);
        assert_eq!(source.calls(), vec![SourceCall::Get(12)]);
    }

    #[tokio::test]
    async fn test_by_id_missing_does_not_search() {
        let (resolver, source) = resolver(thirty_tokens());

        let err = resolver.resolve(&LookupRequest::ById(42)).await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err.status(), Some(404));
        assert_eq!(source.page_calls(), Vec::<i32>::new());
        assert_eq!(source.calls(), vec![SourceCall::Get(42)]);
    }

    #[tokio::test]
    async fn test_by_id_passes_non_positive_ids_through() {
        let (resolver, source) = resolver(vec![sample_token(0, "zero", true)]);

        let token = resolver.resolve(&LookupRequest::ById(0)).await.unwrap();
        assert_eq!(token.name, "zero");

        let err = resolver.resolve(&LookupRequest::ById(-3)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 404, .. }));
        assert_eq!(source.calls(), vec![SourceCall::Get(0), SourceCall::Get(-3)]);
    }

    #[tokio::test]
    async fn test_by_name_on_second_page() {
        let (resolver, source) = resolver(thirty_tokens());

        let token = resolver
            .resolve(&LookupRequest::by_name("svc-prod-9", true))
            .await
            .unwrap();

        assert_eq!(token.id, 29);
        assert_eq!(source.page_calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_by_name_stops_on_first_page_match() {
        let (resolver, source) = resolver(thirty_tokens());

        let token = resolver
            .resolve(&LookupRequest::by_name("token-3", true))
            .await
            .unwrap();

        assert_eq!(token.id, 3);
        assert_eq!(source.page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_by_name_last_page_of_many() {
        let mut tokens: Vec<_> = (1..=100)
            .map(|id| sample_token(id, &format!("token-{}", id), true))
            .collect();
        tokens.push(sample_token(101, "the-last-one", true));
        let (resolver, source) = resolver(tokens);

        let token = resolver
            .resolve(&LookupRequest::by_name("the-last-one", true))
            .await
            .unwrap();

        assert_eq!(token.id, 101);
        assert_eq!(source.page_calls(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let mut tokens: Vec<_> = (1..=30)
            .map(|id| sample_token(id, &format!("token-{}", id), true))
            .collect();
        tokens[4].name = "dup".to_string();
        tokens[6].name = "dup".to_string();
        tokens[27].name = "dup".to_string();
        let (resolver, source) = resolver(tokens);

        let token = resolver
            .resolve(&LookupRequest::by_name("dup", true))
            .await
            .unwrap();

        assert_eq!(token.id, 5);
        assert_eq!(source.page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_not_found_visits_every_page_once() {
        let tokens: Vec<_> = (1..=60)
            .map(|id| sample_token(id, &format!("token-{}", id), true))
            .collect();
        let (resolver, source) = resolver(tokens);

        let err = resolver
            .resolve(&LookupRequest::by_name("absent", true))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NotFound(ref msg) if msg == NOT_FOUND_MESSAGE));
        assert_eq!(source.page_calls(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_not_found_on_empty_store() {
        let (resolver, source) = resolver(vec![]);

        let result = resolver.resolve(&LookupRequest::by_name("any", false)).await;

        tokio_test::assert_err!(result);
        assert_eq!(source.page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_name_match_is_exact() {
        let (resolver, _source) = resolver(vec![
            sample_token(1, "Svc-Prod", true),
            sample_token(2, " svc-prod", true),
            sample_token(3, "svc-prod-x", true),
        ]);

        let result = resolver.resolve(&LookupRequest::by_name("svc-prod", true)).await;

        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_enabled_filter_is_sent() {
        let (resolver, source) = resolver(vec![
            sample_token(1, "shared", true),
            sample_token(2, "shared", false),
        ]);

        let token = resolver
            .resolve(&LookupRequest::by_name("shared", false))
            .await
            .unwrap();

        assert_eq!(token.id, 2);
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
    async fn test_page_error_surfaces_immediately() {
        let tokens: Vec<_> = (1..=60)
            .map(|id| sample_token(id, &format!("token-{}", id), true))
            .collect();
        let source = Arc::new(InMemoryTokenSource::new(tokens).fail_on_page(2));
        let resolver = TokenResolver::new(source.clone());

        let err = resolver
            .resolve(&LookupRequest::by_name("token-60", true))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(source.page_calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_overstated_total_stops_on_empty_page() {
        let source = Arc::new(
            InMemoryTokenSource::new(vec![sample_token(1, "only", true)]).with_reported_total(500),
        );
        let resolver = TokenResolver::new(source.clone());

        let result = resolver.resolve(&LookupRequest::by_name("missing", true)).await;

        assert!(matches!(result, Err(ProviderError::NotFound(_))));
        assert_eq!(source.page_calls(), vec![1, 2]);
    }
}
