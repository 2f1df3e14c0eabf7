//! Registry-independent view of a discovered service instance.

use std::collections::HashMap;
use std::fmt;

use http::Uri;

use crate::{Error, Result};

/// A single addressable instance of a service.
pub trait ServiceInstance: fmt::Debug + Send + Sync {
    /// Unique identifier of this instance.
    fn instance_id(&self) -> String;

    /// Identifier of the service this instance belongs to.
    fn service_id(&self) -> String;

    /// Hostname of the instance.
    fn host(&self) -> String;

    /// Port to connect to.
    fn port(&self) -> u16;

    /// Whether connections should use TLS.
    fn is_secure(&self) -> bool;

    /// URI built from scheme, host and port.
    fn uri(&self) -> Result<Uri> {
        service_uri(&self.host(), self.port(), self.is_secure())
    }

    /// Metadata as of this call.
    ///
    /// This is a copy; registry-backed instances also offer a live view, see
    /// [`EurekaServiceInstance::metadata_view`](crate::EurekaServiceInstance::metadata_view).
    fn metadata(&self) -> HashMap<String, String>;

    /// `https` for secure instances, otherwise `http`.
    fn scheme(&self) -> &'static str {
        if self.is_secure() {
            "https"
        } else {
            "http"
        }
    }
}

/// Build `scheme://host:port` for an instance.
///
/// IPv6 literals are bracketed. Fails with [`Error::InvalidState`] unless
/// the result parses and its authority is exactly `host:port`: an empty
/// host, or one carrying userinfo, a path or a query, is rejected.
pub fn service_uri(host: &str, port: u16, secure: bool) -> Result<Uri> {
    let scheme = if secure { "https" } else { "http" };
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    let text = format!("{scheme}://{host}:{port}");

    let uri = match text.parse::<Uri>() {
        Ok(uri) => uri,
        Err(source) => {
            return Err(Error::InvalidState {
                uri: text,
                source: Some(source),
            })
        }
    };

    let exact = !host.is_empty()
        && uri
            .authority()
            .is_some_and(|authority| authority.host() == host && authority.port_u16() == Some(port))
        && uri.path() == "/"
        && uri.query().is_none();
    if !exact {
        return Err(Error::InvalidState {
            uri: text,
            source: None,
        });
    }
    Ok(uri)
}

/// Plain owned [`ServiceInstance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultServiceInstance {
    instance_id: String,
    service_id: String,
    host: String,
    port: u16,
    secure: bool,
    metadata: HashMap<String, String>,
}

impl DefaultServiceInstance {
    /// Create an instance without metadata.
    pub fn new(
        instance_id: impl Into<String>,
        service_id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        secure: bool,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            service_id: service_id.into(),
            host: host.into(),
            port,
            secure,
            metadata: HashMap::new(),
        }
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

impl ServiceInstance for DefaultServiceInstance {
    fn instance_id(&self) -> String {
        self.instance_id.clone()
    }

    fn service_id(&self) -> String {
        self.service_id.clone()
    }

    fn host(&self) -> String {
        self.host.clone()
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn metadata(&self) -> HashMap<String, String> {
        self.metadata.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_security_flag() {
        let plain = service_uri("h1", 8080, false).unwrap();
        assert_eq!(plain.scheme_str(), Some("http"));
        assert_eq!(plain.host(), Some("h1"));
        assert_eq!(plain.port_u16(), Some(8080));

        let secure = service_uri("h1", 8443, true).unwrap();
        assert_eq!(secure.scheme_str(), Some("https"));
        assert_eq!(secure.port_u16(), Some(8443));
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let uri = service_uri("::1", 8080, false).unwrap();
        assert_eq!(uri.host(), Some("[::1]"));
        assert_eq!(uri.port_u16(), Some(8080));
    }

    #[test]
    fn invalid_host_is_invalid_state() {
        let err = service_uri("bad host", 80, false).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { ref uri, source: Some(_) } if uri == "http://bad host:80"
        ));

        for host in ["", "h1/x", "h1?q", "user@h1"] {
            match service_uri(host, 8080, false) {
                Err(Error::InvalidState { uri, source: None }) => {
                    assert_eq!(uri, format!("http://{host}:8080"));
                }
                other => panic!("host {host:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn default_instance_derives_uri_from_its_fields() {
        let instance = DefaultServiceInstance::new("i-1", "orders", "h1", 8443, true)
            .with_metadata(HashMap::from([("k".to_string(), "v".to_string())]));
        assert_eq!(instance.scheme(), "https");
        assert_eq!(instance.metadata().get("k").map(String::as_str), Some("v"));

        let uri = instance.uri().unwrap();
        assert_eq!(uri.scheme_str(), Some("https"));
        assert_eq!(uri.host(), Some("h1"));
        assert_eq!(uri.port_u16(), Some(8443));
    }
}
