//! Lazy discovery streams over a polling registry client.

use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, trace};

use super::instance::EurekaServiceInstance;
use crate::discovery::{
    ReactiveDiscoveryClient, ServiceInstanceStream, ServiceNameStream, DEFAULT_ORDER,
};
use crate::instance::ServiceInstance;
use crate::registry::{EurekaClientConfig, RegistryClient};

/// Lazy stream of registry-backed instances.
pub type InstanceStream<E> = BoxStream<'static, std::result::Result<EurekaServiceInstance, E>>;

/// Discovery client adapting a [`RegistryClient`] into lazy streams.
///
/// No lookup happens when a stream is created; the registry is queried once,
/// on first poll, by each stream independently. Registry errors are yielded
/// as they were returned and end the stream.
///
/// ```ignore
/// let client = EurekaReactiveDiscoveryClient::new(registry, ClientConfig::new());
/// let names: Vec<String> = client.services().try_collect().await?;
/// ```
pub struct EurekaReactiveDiscoveryClient<C, G = ()> {
    client: Arc<C>,
    config: G,
}

impl<C, G> EurekaReactiveDiscoveryClient<C, G>
where
    C: RegistryClient,
    G: EurekaClientConfig,
{
    /// Create an adapter over a registry client and its configuration.
    pub fn new(client: C, config: G) -> Self {
        Self::with_shared(Arc::new(client), config)
    }

    /// Create an adapter over a registry client that is shared elsewhere.
    pub fn with_shared(client: Arc<C>, config: G) -> Self {
        Self { client, config }
    }

    /// Human-readable name of this adapter.
    pub fn description(&self) -> &'static str {
        "Eureka Reactive Discovery Client"
    }

    /// Instances registered under `service_id`, in registry order.
    ///
    /// The id is passed to the registry as-is and the lookup asks for the
    /// full instance set, not just the caller's zone.
    pub fn instances(&self, service_id: &str) -> InstanceStream<C::Error> {
        let client = Arc::clone(&self.client);
        let service_id = service_id.to_owned();

        async_stream::try_stream! {
            trace!(%service_id, "looking up instances");
            let instances = client.instances_by_vip_address(&service_id, false)?;
            debug!(%service_id, count = instances.len(), "resolved instances");
            for info in instances {
                yield EurekaServiceInstance::new(info);
            }
        }
        .boxed()
    }

    /// Lower-cased names of applications that have at least one instance.
    ///
    /// An absent registry snapshot yields nothing.
    pub fn services(&self) -> ServiceNameStream<C::Error> {
        let client = Arc::clone(&self.client);

        async_stream::try_stream! {
            let snapshot = client.applications()?;
            match snapshot {
                Some(applications) => {
                    let registered = applications.registered_applications();
                    debug!(applications = registered.len(), "expanding registry snapshot");
                    for application in registered {
                        if application.instances().is_empty() {
                            trace!(application = application.name(), "skipping application without instances");
                            continue;
                        }
                        yield application.name().to_lowercase();
                    }
                }
                None => debug!("registry snapshot unavailable"),
            }
        }
        .boxed()
    }

    /// Configured precedence, or [`DEFAULT_ORDER`].
    pub fn order(&self) -> i32 {
        self.config.order().unwrap_or(DEFAULT_ORDER)
    }
}

impl<C, G> ReactiveDiscoveryClient for EurekaReactiveDiscoveryClient<C, G>
where
    C: RegistryClient,
    G: EurekaClientConfig,
{
    type Error = C::Error;

    fn description(&self) -> &'static str {
        EurekaReactiveDiscoveryClient::description(self)
    }

    fn get_instances(&self, service_id: &str) -> ServiceInstanceStream<Self::Error> {
        self.instances(service_id)
            .map_ok(|instance| Box::new(instance) as Box<dyn ServiceInstance>)
            .boxed()
    }

    fn get_services(&self) -> ServiceNameStream<Self::Error> {
        self.services()
    }

    fn get_order(&self) -> i32 {
        self.order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Application, Applications, ClientConfig, InMemoryRegistry, InstanceInfo};

    fn scenario_registry() -> InMemoryRegistry {
        InMemoryRegistry::with_applications(
            Applications::new()
                .with_application(
                    Application::new("ORDERS")
                        .with_instance(InstanceInfo::new("o-1", "ORDERS", "h1", 8080)),
                )
                .with_application(Application::new("EMPTY")),
        )
    }

    #[tokio::test]
    async fn services_skip_empty_applications_and_lowercase() {
        let client = EurekaReactiveDiscoveryClient::new(scenario_registry(), ());
        let names: Vec<String> = client.services().try_collect().await.unwrap();
        assert_eq!(names, ["orders"]);
    }

    #[tokio::test]
    async fn instances_map_through_facade() {
        let client = EurekaReactiveDiscoveryClient::new(scenario_registry(), ());
        let instances: Vec<EurekaServiceInstance> =
            client.instances("ORDERS").try_collect().await.unwrap();
        assert_eq!(instances.len(), 1);

        let uri = instances[0].uri().unwrap();
        assert_eq!(uri.scheme_str(), Some("http"));
        assert_eq!(uri.host(), Some("h1"));
        assert_eq!(uri.port_u16(), Some(8080));
    }

    #[tokio::test]
    async fn absent_snapshot_is_empty() {
        let client = EurekaReactiveDiscoveryClient::new(InMemoryRegistry::new(), ());
        let names: Vec<String> = client.services().try_collect().await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn unknown_service_is_empty() {
        let client = EurekaReactiveDiscoveryClient::new(scenario_registry(), ());
        let instances: Vec<_> = client.instances("PAYMENTS").try_collect().await.unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn order_prefers_explicit_config() {
        let default = EurekaReactiveDiscoveryClient::new(InMemoryRegistry::new(), ());
        assert_eq!(default.order(), DEFAULT_ORDER);

        let unset = EurekaReactiveDiscoveryClient::new(InMemoryRegistry::new(), ClientConfig::new());
        assert_eq!(unset.order(), DEFAULT_ORDER);

        let explicit = EurekaReactiveDiscoveryClient::new(
            InMemoryRegistry::new(),
            ClientConfig::new().with_order(-5),
        );
        assert_eq!(explicit.order(), -5);
        assert_eq!(explicit.get_order(), -5);
    }

    #[test]
    fn description_is_constant() {
        let client = EurekaReactiveDiscoveryClient::new(InMemoryRegistry::new(), ());
        assert_eq!(
            ReactiveDiscoveryClient::description(&client),
            "Eureka Reactive Discovery Client"
        );
    }

    #[tokio::test]
    async fn trait_streams_box_the_facade() {
        let client = EurekaReactiveDiscoveryClient::new(scenario_registry(), ());
        let instances: Vec<Box<dyn ServiceInstance>> =
            client.get_instances("ORDERS").try_collect().await.unwrap();
        assert_eq!(instances[0].service_id(), "ORDERS");

        let names: Vec<String> = client.get_services().try_collect().await.unwrap();
        assert_eq!(names, ["orders"]);
    }
}
