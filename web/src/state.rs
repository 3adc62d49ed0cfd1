//! Application state for Axum handlers.

use crate::error::AppError;
use crate::event::{TransportEvent, TransportResponse, handle_event};
use aapkaun_core::{EndpointRegistry, RequestEnvironment};
use std::fmt;
use std::sync::Arc;

/// Environment plus endpoint table, shared by every handler.
///
/// Both halves are built once at startup and only read afterwards.
pub struct ApiState<E> {
    env: Arc<E>,
    registry: Arc<EndpointRegistry<E>>,
}

impl<E> Clone for ApiState<E> {
    fn clone(&self) -> Self {
        Self {
            env: Arc::clone(&self.env),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for ApiState<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("endpoints", &self.registry.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<E: RequestEnvironment> ApiState<E> {
    /// Create the state.
    #[must_use]
    pub fn new(env: E, registry: EndpointRegistry<E>) -> Self {
        Self {
            env: Arc::new(env),
            registry: Arc::new(registry),
        }
    }

    /// Shared environment.
    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Registered endpoints.
    #[must_use]
    pub fn registry(&self) -> &EndpointRegistry<E> {
        &self.registry
    }

    /// Run the endpoint registered as `name` for one event.
    ///
    /// # Errors
    ///
    /// Returns a `NOT_FOUND` [`AppError`] when nothing is registered under
    /// `name`. Everything after that is reported inside the response.
    pub async fn dispatch(
        &self,
        name: &str,
        event: TransportEvent,
    ) -> Result<TransportResponse, AppError> {
        let endpoint = self
            .registry
            .get(name)
            .ok_or_else(|| AppError::not_found("endpoint", name))?;

        Ok(handle_event(&endpoint, &self.env, event).await)
    }
}
