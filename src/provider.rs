use std::collections::HashSet;
use std::env;

use async_trait::async_trait;
use tracking::provider::{AuthGate, TokenVerdict};

/// Bearer-token gate backed by a static allow-set.
///
/// Stands in for the identity service that issues capability tokens. The
/// tracking core only ever sees the verdict, never the credential shape.
#[derive(Debug, Clone, Default)]
pub struct BearerGate {
    tokens: HashSet<String>,
}

impl BearerGate {
    /// Reads the accepted tokens from `FLEET_API_TOKENS` (comma separated).
    /// An unset or empty variable yields a gate that rejects everything.
    #[must_use]
    pub fn from_env() -> Self {
        let tokens = env::var("FLEET_API_TOKENS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { tokens }
    }

    #[must_use]
    pub fn with_tokens(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { tokens: tokens.into_iter().map(Into::into).collect() }
    }
}

#[async_trait]
impl AuthGate for BearerGate {
    async fn verify(&self, token: &str) -> TokenVerdict {
        if self.tokens.contains(token) { TokenVerdict::Valid } else { TokenVerdict::Invalid }
    }
}
