//! Lazy, stream-oriented service discovery over a Eureka-style registry client.

#![deny(missing_docs)]

pub mod composite;
pub mod discovery;
pub mod error;
pub mod eureka;
pub mod instance;
pub mod registry;

// Re-export key types
pub use composite::{CompositeDiscoveryClient, SharedClient};
pub use discovery::{
    ReactiveDiscoveryClient, ServiceInstanceStream, ServiceNameStream, DEFAULT_ORDER,
};
pub use error::{Error, Result};
pub use eureka::{
    EurekaReactiveDiscoveryClient, EurekaServiceInstance, InstanceStream, MetadataView,
};
pub use instance::{service_uri, DefaultServiceInstance, ServiceInstance};
pub use registry::{
    Application, Applications, ClientConfig, EurekaClientConfig, InMemoryRegistry, InstanceInfo,
    PortType, RegistryClient, SharedInstanceInfo,
};
