//! Normalized view over one shared registry record.

use std::collections::HashMap;
use std::sync::Arc;

use http::Uri;

use crate::instance::{service_uri, ServiceInstance};
use crate::registry::{read_instance, PortType, SharedInstanceInfo};
use crate::{Error, Result};

/// A [`ServiceInstance`] backed by a live registry record.
///
/// Holds the shared record rather than a copy: port, host and metadata reads
/// reflect the registry's latest refresh for as long as the facade is alive.
#[derive(Debug, Clone)]
pub struct EurekaServiceInstance {
    instance: SharedInstanceInfo,
}

impl EurekaServiceInstance {
    /// Wrap a shared record.
    pub fn new(instance: SharedInstanceInfo) -> Self {
        Self { instance }
    }

    /// The wrapped record.
    pub fn instance_info(&self) -> &SharedInstanceInfo {
        &self.instance
    }

    /// A handle that reads the record's metadata on every access.
    ///
    /// The registry may change the metadata between two reads.
    pub fn metadata_view(&self) -> MetadataView {
        MetadataView {
            instance: Arc::clone(&self.instance),
        }
    }
}

impl TryFrom<Option<SharedInstanceInfo>> for EurekaServiceInstance {
    type Error = Error;

    fn try_from(instance: Option<SharedInstanceInfo>) -> Result<Self> {
        instance
            .map(Self::new)
            .ok_or_else(|| Error::invalid_argument("Service instance required"))
    }
}

impl ServiceInstance for EurekaServiceInstance {
    fn instance_id(&self) -> String {
        read_instance(&self.instance).instance_id.clone()
    }

    fn service_id(&self) -> String {
        read_instance(&self.instance).app_name.clone()
    }

    fn host(&self) -> String {
        read_instance(&self.instance).host_name.clone()
    }

    // Secure wins whenever it is enabled, even if the plain port is too.
    fn port(&self) -> u16 {
        let info = read_instance(&self.instance);
        if info.is_port_enabled(PortType::Secure) {
            info.secure_port
        } else {
            info.port
        }
    }

    fn is_secure(&self) -> bool {
        read_instance(&self.instance).is_port_enabled(PortType::Secure)
    }

    fn uri(&self) -> Result<Uri> {
        let info = read_instance(&self.instance);
        let secure = info.is_port_enabled(PortType::Secure);
        let port = if secure { info.secure_port } else { info.port };
        service_uri(&info.host_name, port, secure)
    }

    fn metadata(&self) -> HashMap<String, String> {
        read_instance(&self.instance).metadata.clone()
    }
}

/// Live view of a record's metadata.
#[derive(Debug, Clone)]
pub struct MetadataView {
    instance: SharedInstanceInfo,
}

impl MetadataView {
    /// Current value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        read_instance(&self.instance).metadata.get(key).cloned()
    }

    /// Whether `key` is currently present.
    pub fn contains_key(&self, key: &str) -> bool {
        read_instance(&self.instance).metadata.contains_key(key)
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        read_instance(&self.instance).metadata.len()
    }

    /// Whether there are currently no entries.
    pub fn is_empty(&self) -> bool {
        read_instance(&self.instance).metadata.is_empty()
    }

    /// Copy of the current entries.
    pub fn to_map(&self) -> HashMap<String, String> {
        read_instance(&self.instance).metadata.clone()
    }
}
