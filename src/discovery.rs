//! Consumer-facing discovery abstraction.

use futures_util::stream::BoxStream;

use crate::instance::ServiceInstance;

/// Precedence used when a client has no explicit order.
pub const DEFAULT_ORDER: i32 = 0;

/// Lazy stream of discovered instances.
pub type ServiceInstanceStream<E> =
    BoxStream<'static, std::result::Result<Box<dyn ServiceInstance>, E>>;

/// Lazy stream of service names.
pub type ServiceNameStream<E> = BoxStream<'static, std::result::Result<String, E>>;

/// A source of service instances exposed as lazy streams.
///
/// Streams do no work until first polled, and every call returns a stream
/// that performs its own lookup.
pub trait ReactiveDiscoveryClient: Send + Sync + 'static {
    /// Error yielded by the streams.
    type Error: Send + 'static;

    /// Human-readable name of the implementation.
    fn description(&self) -> &'static str;

    /// Instances registered for `service_id`.
    fn get_instances(&self, service_id: &str) -> ServiceInstanceStream<Self::Error>;

    /// Names of services with at least one instance.
    fn get_services(&self) -> ServiceNameStream<Self::Error>;

    /// Precedence among clients (lower = consulted first).
    fn get_order(&self) -> i32 {
        DEFAULT_ORDER
    }
}
