//! HTTP request handlers.

pub mod endpoint;
pub mod health;
pub mod invoke;

pub use endpoint::EndpointHandler;
pub use health::{health_check, readiness_check};
pub use invoke::invoke_event;
