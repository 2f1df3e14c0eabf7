//! Snapshot-backed registry client.

use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use super::model::{read_instance, Applications, SharedInstanceInfo};
use super::RegistryClient;

/// A [`RegistryClient`] answering from a locally held snapshot.
///
/// Starts without a snapshot, so [`applications`](RegistryClient::applications)
/// reports none until one is installed.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    snapshot: RwLock<Option<Arc<Applications>>>,
    local_zone: Option<String>,
}

impl InMemoryRegistry {
    /// Create a registry with no snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry serving the given snapshot.
    pub fn with_applications(applications: Applications) -> Self {
        let registry = Self::new();
        registry.set_applications(applications);
        registry
    }

    /// Create a registry from a JSON-encoded snapshot.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let applications: Applications = serde_json::from_str(json)?;
        Ok(Self::with_applications(applications))
    }

    /// Set the zone used by zone-affine lookups.
    pub fn local_zone(mut self, zone: impl Into<String>) -> Self {
        self.local_zone = Some(zone.into());
        self
    }

    /// Replace the snapshot.
    pub fn set_applications(&self, applications: Applications) {
        debug!(
            applications = applications.registered_applications().len(),
            "installing registry snapshot"
        );
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(applications));
    }

    /// Drop the snapshot.
    pub fn clear(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn current(&self) -> Option<Arc<Applications>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RegistryClient for InMemoryRegistry {
    type Error = Infallible;

    fn instances_by_vip_address(
        &self,
        vip_address: &str,
        prefer_same_zone: bool,
    ) -> Result<Vec<SharedInstanceInfo>, Self::Error> {
        let Some(snapshot) = self.current() else {
            return Ok(Vec::new());
        };

        let matching: Vec<SharedInstanceInfo> = snapshot
            .registered_applications()
            .iter()
            .flat_map(|app| app.instances())
            .filter(|info| {
                read_instance(info)
                    .effective_vip_address()
                    .eq_ignore_ascii_case(vip_address)
            })
            .cloned()
            .collect();

        let zone = match (&self.local_zone, prefer_same_zone) {
            (Some(zone), true) => zone,
            _ => return Ok(matching),
        };

        let local: Vec<SharedInstanceInfo> = matching
            .iter()
            .filter(|info| read_instance(info).zone.as_deref() == Some(zone.as_str()))
            .cloned()
            .collect();

        if local.is_empty() {
            trace!(vip_address, zone = %zone, "no local-zone instances, using full set");
            Ok(matching)
        } else {
            Ok(local)
        }
    }

    fn applications(&self) -> Result<Option<Arc<Applications>>, Self::Error> {
        Ok(self.current())
    }
}
