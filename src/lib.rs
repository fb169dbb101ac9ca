//! HTTP boundary for the live fleet tracking service.
//!
//! Domain logic lives in the `tracking` crate; this crate wires it to axum
//! and supplies the production [`provider::BearerGate`].

pub mod http;
pub mod provider;
