use async_trait::async_trait;

/// Outcome of a capability token check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid,
    Invalid,
}

/// External capability checker guarding read endpoints.
///
/// The core never inspects token contents; implementations decide what a
/// valid credential looks like. Absence of a token is a transport concern
/// and never reaches the gate.
#[async_trait]
pub trait AuthGate: Send + Sync + 'static {
    async fn verify(&self, token: &str) -> TokenVerdict;
}
