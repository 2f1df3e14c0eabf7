//! Aggregates several discovery clients by precedence.

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::debug;

use crate::discovery::{ReactiveDiscoveryClient, ServiceInstanceStream, ServiceNameStream};

/// A shared, type-erased discovery client.
pub type SharedClient<E> = Arc<dyn ReactiveDiscoveryClient<Error = E>>;

/// Discovery client that concatenates member streams, lowest order first.
///
/// Members are sorted once at construction; members with equal order keep
/// their insertion order. Member streams stay lazy: a member is only asked
/// for its stream once the previous member's stream is exhausted.
pub struct CompositeDiscoveryClient<E: Send + 'static> {
    clients: Vec<SharedClient<E>>,
}

impl<E: Send + 'static> CompositeDiscoveryClient<E> {
    /// Create a composite over the given clients.
    pub fn new<I>(clients: I) -> Self
    where
        I: IntoIterator<Item = SharedClient<E>>,
    {
        let mut clients: Vec<_> = clients.into_iter().collect();
        clients.sort_by_key(|client| client.get_order());
        debug!(
            members = ?clients.iter().map(|c| c.description()).collect::<Vec<_>>(),
            "composite discovery client ready"
        );
        Self { clients }
    }

    /// Members in the order they are consulted.
    pub fn clients(&self) -> &[SharedClient<E>] {
        &self.clients
    }
}

impl<E: Send + 'static> fmt::Debug for CompositeDiscoveryClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDiscoveryClient")
            .field(
                "clients",
                &self.clients.iter().map(|c| c.description()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E: Send + 'static> ReactiveDiscoveryClient for CompositeDiscoveryClient<E> {
    type Error = E;

    fn description(&self) -> &'static str {
        "Composite Reactive Discovery Client"
    }

    fn get_instances(&self, service_id: &str) -> ServiceInstanceStream<E> {
        let service_id = service_id.to_owned();
        stream::iter(self.clients.clone())
            .flat_map(move |client| client.get_instances(&service_id))
            .boxed()
    }

    fn get_services(&self) -> ServiceNameStream<E> {
        stream::iter(self.clients.clone())
            .flat_map(|client| client.get_services())
            .boxed()
    }
}
