//! Registry-side capabilities consumed by the discovery adapter.
//!
//! - [`RegistryClient`]: lookups against the client's cached registry view
//! - [`EurekaClientConfig`]: optional precedence hint
//! - [`InMemoryRegistry`]: a snapshot-backed client for local use

pub mod memory;
pub mod model;

use std::sync::Arc;

use serde::Deserialize;

pub use memory::InMemoryRegistry;
pub use model::{
    read_instance, write_instance, Application, Applications, InstanceInfo, PortType,
    SharedInstanceInfo,
};

/// A polling registry client that keeps a locally cached view of the registry.
///
/// Network access, caching, retries and heartbeats are the implementor's
/// concern. Calls may block for as long as the implementation needs.
pub trait RegistryClient: Send + Sync + 'static {
    /// Error raised by lookups. Passed to consumers unchanged.
    type Error: Send + 'static;

    /// Instances registered under a routing address, in registry order.
    ///
    /// When `prefer_same_zone` is set, implementations may narrow the result
    /// to instances in the caller's own zone.
    fn instances_by_vip_address(
        &self,
        vip_address: &str,
        prefer_same_zone: bool,
    ) -> Result<Vec<SharedInstanceInfo>, Self::Error>;

    /// The current application snapshot, if the client has one.
    fn applications(&self) -> Result<Option<Arc<Applications>>, Self::Error>;
}

impl<T: RegistryClient> RegistryClient for Arc<T> {
    type Error = T::Error;

    fn instances_by_vip_address(
        &self,
        vip_address: &str,
        prefer_same_zone: bool,
    ) -> Result<Vec<SharedInstanceInfo>, Self::Error> {
        (**self).instances_by_vip_address(vip_address, prefer_same_zone)
    }

    fn applications(&self) -> Result<Option<Arc<Applications>>, Self::Error> {
        (**self).applications()
    }
}

/// Client configuration as seen by the discovery adapter.
///
/// Only configurations that carry an explicit precedence override
/// [`order`](EurekaClientConfig::order).
pub trait EurekaClientConfig: Send + Sync + 'static {
    /// Explicit precedence, if configured. Lower = higher precedence.
    fn order(&self) -> Option<i32> {
        None
    }
}

/// Default client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Explicit precedence among discovery clients.
    pub order: Option<i32>,
}

impl ClientConfig {
    /// Create a configuration without an explicit precedence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit precedence (lower = consulted first).
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

impl EurekaClientConfig for ClientConfig {
    fn order(&self) -> Option<i32> {
        self.order
    }
}

impl EurekaClientConfig for () {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_deserializes_with_optional_order() {
        let explicit: ClientConfig = serde_json::from_str(r#"{"order": -3}"#).unwrap();
        assert_eq!(explicit, ClientConfig::new().with_order(-3));
        assert_eq!(EurekaClientConfig::order(&explicit), Some(-3));

        let unset: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(unset, ClientConfig::new());
        assert_eq!(EurekaClientConfig::order(&unset), None);
    }
}
