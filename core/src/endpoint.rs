//! Endpoint definitions and the registration table.
//!
//! An endpoint is data, not a subtype: an auth flag, an optional schema and
//! a controller. Definitions are built once at startup, registered by name
//! in an [`EndpointRegistry`], and shared by every invocation.

use crate::context::InvocationContext;
use crate::envelope::Outcome;
use crate::error::ControllerError;
use crate::validation::Schema;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// What a controller hands back.
///
/// Only [`ControllerOutput::Outcome`] is a legal result; anything else is
/// reported by the engine as a server error.
#[derive(Debug, Clone)]
pub enum ControllerOutput {
    /// Well-formed envelope.
    Outcome(Outcome),
    /// Bare JSON value, a programming error.
    Untyped(Value),
}

impl From<Outcome> for ControllerOutput {
    fn from(outcome: Outcome) -> Self {
        Self::Outcome(outcome)
    }
}

/// Result of a controller call.
pub type ControllerResult = Result<ControllerOutput, ControllerError>;

impl Outcome {
    /// Wrap as a successful controller result.
    ///
    /// # Errors
    ///
    /// Never; the `Result` is the controller return type.
    #[allow(clippy::unnecessary_wraps)]
    pub fn into_result(self) -> ControllerResult {
        Ok(ControllerOutput::Outcome(self))
    }
}

/// Business logic behind one endpoint.
///
/// `E` is the application environment; controllers reach persistence and
/// capabilities through it rather than through globals.
pub trait Controller<E>: Send + Sync {
    /// Handle one invocation whose guard and validation already passed.
    fn call<'a>(&'a self, env: &'a E, ctx: &'a InvocationContext) -> BoxFuture<'a, ControllerResult>;
}

/// Controller backed by a closure whose future owns its data.
///
/// ```
/// use aapkaun_core::endpoint::controller_fn;
/// use aapkaun_core::{Outcome, Payload, TransportStatus};
///
/// let ping = controller_fn(|_env: &(), _ctx| async {
///     Outcome::success("Pong", Payload::new(), TransportStatus::SuccessRead).into_result()
/// });
/// # let _ = ping;
/// ```
pub struct FnController<F, Fut> {
    f: F,
    _future: PhantomData<fn() -> Fut>,
}

/// Wrap a closure as a [`Controller`].
pub const fn controller_fn<E, F, Fut>(f: F) -> FnController<F, Fut>
where
    F: Fn(&E, &InvocationContext) -> Fut + Send + Sync,
    Fut: Future<Output = ControllerResult> + Send + 'static,
{
    FnController {
        f,
        _future: PhantomData,
    }
}

impl<E, F, Fut> Controller<E> for FnController<F, Fut>
where
    F: Fn(&E, &InvocationContext) -> Fut + Send + Sync,
    Fut: Future<Output = ControllerResult> + Send + 'static,
{
    fn call<'a>(&'a self, env: &'a E, ctx: &'a InvocationContext) -> BoxFuture<'a, ControllerResult> {
        Box::pin((self.f)(env, ctx))
    }
}

/// Static configuration for one API operation.
pub struct EndpointDefinition<E> {
    name: String,
    requires_auth: bool,
    schema: Option<Schema>,
    controller: Arc<dyn Controller<E>>,
}

impl<E> EndpointDefinition<E> {
    /// Unsecured endpoint without a schema.
    pub fn new(name: impl Into<String>, controller: impl Controller<E> + 'static) -> Self {
        Self {
            name: name.into(),
            requires_auth: false,
            schema: None,
            controller: Arc::new(controller),
        }
    }

    /// Require an authenticated, unexpired caller.
    #[must_use]
    pub fn secured(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Validate input against `schema` before the controller runs.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Registration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the guard applies.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Input schema, if any.
    #[must_use]
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Controller.
    #[must_use]
    pub fn controller(&self) -> &dyn Controller<E> {
        self.controller.as_ref()
    }
}

impl<E> fmt::Debug for EndpointDefinition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDefinition")
            .field("name", &self.name)
            .field("requires_auth", &self.requires_auth)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two endpoints share a name.
    #[error("endpoint `{0}` is already registered")]
    Duplicate(String),
}

/// Name → endpoint table, complete before the first invocation.
pub struct EndpointRegistry<E> {
    endpoints: BTreeMap<String, Arc<EndpointDefinition<E>>>,
}

impl<E> Default for EndpointRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EndpointRegistry<E> {
    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            endpoints: BTreeMap::new(),
        }
    }

    /// Add an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken.
    pub fn register(&mut self, endpoint: EndpointDefinition<E>) -> Result<(), RegistryError> {
        if self.endpoints.contains_key(endpoint.name()) {
            return Err(RegistryError::Duplicate(endpoint.name().to_string()));
        }
        tracing::debug!(
            endpoint = endpoint.name(),
            secured = endpoint.requires_auth(),
            "registering endpoint"
        );
        self.endpoints
            .insert(endpoint.name().to_string(), Arc::new(endpoint));
        Ok(())
    }

    /// Builder form of [`EndpointRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken.
    pub fn with(mut self, endpoint: EndpointDefinition<E>) -> Result<Self, RegistryError> {
        self.register(endpoint)?;
        Ok(self)
    }

    /// Look an endpoint up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<EndpointDefinition<E>>> {
        self.endpoints.get(name).cloned()
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl<E> fmt::Debug for EndpointRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.endpoints.keys()).finish()
    }
}
