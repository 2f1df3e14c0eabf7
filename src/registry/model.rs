//! Raw registry records as held by the registry client.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

/// An instance record shared between the registry client and its readers.
///
/// The registry refreshes the record in place; readers only take read locks.
pub type SharedInstanceInfo = Arc<RwLock<InstanceInfo>>;

/// Which of an instance's two ports is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// The plain (non-TLS) port.
    Unsecure,
    /// The port serving encrypted traffic.
    Secure,
}

/// The raw registry entry for one running instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceInfo {
    /// Unique instance identifier.
    pub instance_id: String,
    /// Name of the owning application.
    pub app_name: String,
    /// Routing address; empty means "same as the application name".
    pub vip_address: String,
    /// Hostname the instance is reachable at.
    pub host_name: String,
    /// Plain port.
    pub port: u16,
    /// Secure port.
    pub secure_port: u16,
    /// Whether the plain port is enabled.
    pub port_enabled: bool,
    /// Whether the secure port is enabled.
    pub secure_port_enabled: bool,
    /// Availability zone, if the registry reports one.
    pub zone: Option<String>,
    /// Free-form string metadata.
    pub metadata: HashMap<String, String>,
}

impl InstanceInfo {
    /// Create a record with the plain port enabled and the secure port disabled.
    pub fn new(
        instance_id: impl Into<String>,
        app_name: impl Into<String>,
        host_name: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            app_name: app_name.into(),
            host_name: host_name.into(),
            port,
            port_enabled: true,
            ..Default::default()
        }
    }

    /// Enable the secure port.
    pub fn with_secure_port(mut self, secure_port: u16) -> Self {
        self.secure_port = secure_port;
        self.secure_port_enabled = true;
        self
    }

    /// Set the routing address.
    pub fn with_vip_address(mut self, vip_address: impl Into<String>) -> Self {
        self.vip_address = vip_address.into();
        self
    }

    /// Set the availability zone.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the given port is enabled.
    pub fn is_port_enabled(&self, port_type: PortType) -> bool {
        match port_type {
            PortType::Unsecure => self.port_enabled,
            PortType::Secure => self.secure_port_enabled,
        }
    }

    /// The routing address, falling back to the application name.
    pub fn effective_vip_address(&self) -> &str {
        if self.vip_address.is_empty() {
            &self.app_name
        } else {
            &self.vip_address
        }
    }

    /// Wrap the record for sharing with readers.
    pub fn into_shared(self) -> SharedInstanceInfo {
        Arc::new(RwLock::new(self))
    }
}

/// Read a shared record, reading through a poisoned lock.
pub fn read_instance(info: &SharedInstanceInfo) -> RwLockReadGuard<'_, InstanceInfo> {
    info.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write a shared record, writing through a poisoned lock.
pub fn write_instance(info: &SharedInstanceInfo) -> RwLockWriteGuard<'_, InstanceInfo> {
    info.write().unwrap_or_else(PoisonError::into_inner)
}

/// A named group of instances for one logical service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Application {
    name: String,
    #[serde(rename = "instance", with = "shared_instances", default)]
    instances: Vec<SharedInstanceInfo>,
}

impl Application {
    /// Create an application with no instances.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    /// Add an instance, returning the shared handle the registry will refresh.
    pub fn add_instance(&mut self, info: InstanceInfo) -> SharedInstanceInfo {
        let shared = info.into_shared();
        self.instances.push(Arc::clone(&shared));
        shared
    }

    /// Builder form of [`add_instance`](Application::add_instance).
    pub fn with_instance(mut self, info: InstanceInfo) -> Self {
        self.add_instance(info);
        self
    }

    /// The application name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instances in registry order.
    pub fn instances(&self) -> &[SharedInstanceInfo] {
        &self.instances
    }
}

/// Snapshot of every application known to the registry, in registry order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Applications {
    #[serde(rename = "application", default)]
    applications: Vec<Application>,
}

impl Applications {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an application, replacing any existing one with the same name in place.
    pub fn add_application(&mut self, application: Application) {
        match self
            .applications
            .iter_mut()
            .find(|existing| existing.name == application.name)
        {
            Some(existing) => *existing = application,
            None => self.applications.push(application),
        }
    }

    /// Builder form of [`add_application`](Applications::add_application).
    pub fn with_application(mut self, application: Application) -> Self {
        self.add_application(application);
        self
    }

    /// Registered applications in registry order.
    pub fn registered_applications(&self) -> &[Application] {
        &self.applications
    }

    /// Look up an application by exact name.
    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.name == name)
    }
}

mod shared_instances {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{read_instance, InstanceInfo, SharedInstanceInfo};

    pub fn serialize<S: Serializer>(
        instances: &[SharedInstanceInfo],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let owned: Vec<InstanceInfo> = instances
            .iter()
            .map(|info| read_instance(info).clone())
            .collect();
        owned.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<SharedInstanceInfo>, D::Error> {
        let owned = Vec::<InstanceInfo>::deserialize(deserializer)?;
        Ok(owned.into_iter().map(InstanceInfo::into_shared).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vip_address_falls_back_to_app_name() {
        let info = InstanceInfo::new("i-1", "ORDERS", "h1", 8080);
        assert_eq!(info.effective_vip_address(), "ORDERS");

        let info = info.with_vip_address("orders-vip");
        assert_eq!(info.effective_vip_address(), "orders-vip");
    }

    #[test]
    fn port_flags_are_independent() {
        let info = InstanceInfo::new("i-1", "ORDERS", "h1", 8080).with_secure_port(8443);
        assert!(info.is_port_enabled(PortType::Unsecure));
        assert!(info.is_port_enabled(PortType::Secure));
    }

    #[test]
    fn adding_same_application_replaces_in_place() {
        let apps = Applications::new()
            .with_application(Application::new("A"))
            .with_application(Application::new("B"))
            .with_application(
                Application::new("A").with_instance(InstanceInfo::new("a-1", "A", "h", 1)),
            );

        let names: Vec<_> = apps.registered_applications().iter().map(Application::name).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(apps.application("A").map(|a| a.instances().len()), Some(1));
    }

    #[test]
    fn snapshot_deserializes_from_json() {
        let json = r#"{
            "application": [
                {"name": "ORDERS", "instance": [
                    {"instanceId": "o-1", "appName": "ORDERS", "hostName": "h1",
                     "port": 8080, "portEnabled": true, "metadata": {"zone": "a"}}
                ]},
                {"name": "EMPTY"}
            ]
        }"#;
        let apps: Applications = serde_json::from_str(json).unwrap();
        let orders = apps.application("ORDERS").unwrap();
        let info = read_instance(&orders.instances()[0]);
        assert_eq!(info.host_name, "h1");
        assert_eq!(info.metadata.get("zone").map(String::as_str), Some("a"));
        assert!(apps.application("EMPTY").unwrap().instances().is_empty());
    }
}
