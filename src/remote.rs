//! Remote object access over the bus.
//!
//! A [`RemoteObject`] wraps one `(service, object path, interface)` triple
//! on one bus connection and exposes the operations a caller actually
//! wants: read properties as plain values, invoke methods, list child
//! objects. Transport, framing and marshaling are zbus's job; this layer
//! only resolves the proxies lazily and translates values at the boundary.
//!
//! # Usage
//!
//! ```ignore
//! let login = RemoteObject::system(
//!     "org.freedesktop.login1",
//!     "/org/freedesktop/login1",
//!     "org.freedesktop.login1.Manager",
//! )
//! .await?;
//!
//! let props = login.props().await?;
//! let sessions = login.derive("/org/freedesktop/login1/session", "org.freedesktop.DBus.Peer")?;
//! let names = sessions.children().await?;
//! ```

use serde_json::Map;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zbus::fdo::{IntrospectableProxy, PropertiesProxy};
use zbus::names::{OwnedBusName, OwnedInterfaceName};
use zbus::zvariant::{OwnedObjectPath, Structure, StructureBuilder};
use zbus::{Connection, Proxy};

use crate::path::child_names;
use crate::value::{from_json, reply_to_json, to_json, unwrap_variant, ValueError};

/// Errors from remote object access.
///
/// Bus-side failures pass through unchanged in meaning; nothing is
/// retried or translated.
#[derive(Error, Debug)]
pub enum BusError {
    #[error("invalid service name: {0}")]
    ServiceName(#[source] zbus::names::Error),

    #[error("invalid object path: {0}")]
    ObjectPath(#[source] zbus::zvariant::Error),

    #[error("invalid interface name: {0}")]
    InterfaceName(#[source] zbus::names::Error),

    #[error("bus call failed: {0}")]
    Call(#[from] zbus::Error),

    #[error("remote peer reported: {0}")]
    Peer(#[from] zbus::fdo::Error),

    #[error("introspection document: {0}")]
    Introspection(#[from] zbus_xml::Error),

    #[error("argument translation: {0}")]
    Value(#[from] ValueError),
}

/// Proxies resolved on first use and reused for the handle's lifetime.
struct Proxies {
    object: Proxy<'static>,
    properties: PropertiesProxy<'static>,
    introspectable: IntrospectableProxy<'static>,
}

/// Handle to one remote object/interface pair on a bus connection.
///
/// Construction validates the names but performs no bus traffic beyond
/// establishing the connection; the object, properties and introspection
/// proxies are resolved on the first operation and memoized.
pub struct RemoteObject {
    connection: Connection,
    service: OwnedBusName,
    path: OwnedObjectPath,
    interface: OwnedInterfaceName,
    proxies: OnceCell<Proxies>,
}

impl RemoteObject {
    /// Create a handle on an existing connection.
    pub fn new(
        connection: Connection,
        service: &str,
        path: &str,
        interface: &str,
    ) -> Result<Self, BusError> {
        let service = OwnedBusName::try_from(service).map_err(BusError::ServiceName)?;
        let path = OwnedObjectPath::try_from(path).map_err(BusError::ObjectPath)?;
        let interface = OwnedInterfaceName::try_from(interface).map_err(BusError::InterfaceName)?;

        Ok(Self {
            connection,
            service,
            path,
            interface,
            proxies: OnceCell::new(),
        })
    }

    /// Connect to the system bus and create a handle.
    pub async fn system(service: &str, path: &str, interface: &str) -> Result<Self, BusError> {
        let connection = Connection::system().await?;
        info!(service, "connected to system bus");
        Self::new(connection, service, path, interface)
    }

    /// Connect to the session bus and create a handle.
    pub async fn session(service: &str, path: &str, interface: &str) -> Result<Self, BusError> {
        let connection = Connection::session().await?;
        info!(service, "connected to session bus");
        Self::new(connection, service, path, interface)
    }

    /// The service this handle talks to.
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// The object path this handle points at.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// The interface this handle reads properties from and calls methods on.
    pub fn interface(&self) -> &str {
        self.interface.as_str()
    }

    /// The underlying connection, for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Resolve the proxies once; later calls get the memoized set.
    async fn proxies(&self) -> Result<&Proxies, BusError> {
        self.proxies
            .get_or_try_init(|| async {
                debug!(service = %self.service, path = %self.path, "resolving proxies");
                let object = Proxy::new(
                    &self.connection,
                    self.service.clone(),
                    self.path.clone(),
                    self.interface.clone(),
                )
                .await?;
                let properties = PropertiesProxy::builder(&self.connection)
                    .destination(self.service.clone())?
                    .path(self.path.clone())?
                    .build()
                    .await?;
                let introspectable = IntrospectableProxy::builder(&self.connection)
                    .destination(self.service.clone())?
                    .path(self.path.clone())?
                    .build()
                    .await?;
                Ok(Proxies {
                    object,
                    properties,
                    introspectable,
                })
            })
            .await
    }

    /// Read all properties of the interface as plain values.
    pub async fn props(&self) -> Result<Map<String, serde_json::Value>, BusError> {
        let proxies = self.proxies().await?;
        let raw = proxies
            .properties
            .get_all(self.interface.inner().clone())
            .await?;

        let mut props = Map::new();
        for (name, value) in raw {
            props.insert(name, to_json(unwrap_variant(&value)));
        }
        Ok(props)
    }

    /// Read a single property as a plain value.
    pub async fn prop(&self, name: &str) -> Result<serde_json::Value, BusError> {
        let proxies = self.proxies().await?;
        let raw = proxies
            .properties
            .get(self.interface.inner().clone(), name)
            .await?;
        Ok(to_json(unwrap_variant(&raw)))
    }

    /// Invoke a method with statically typed arguments and reply.
    ///
    /// Marshaling in both directions is delegated to zbus.
    pub async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, BusError>
    where
        B: serde::ser::Serialize + zbus::zvariant::DynamicType,
        R: serde::de::DeserializeOwned + zbus::zvariant::Type,
    {
        let proxies = self.proxies().await?;
        debug!(method, interface = %self.interface, "calling method");
        Ok(proxies.object.call(method, body).await?)
    }

    /// Invoke a method with plain JSON scalar arguments and a plain JSON
    /// reply.
    ///
    /// For callers without static types, the CLI in particular. An empty
    /// reply comes back as `null`, a single out-value bare, several as an
    /// array. See [`crate::value::from_json`] for the argument rules.
    pub async fn call_json(
        &self,
        method: &str,
        args: &[serde_json::Value],
    ) -> Result<serde_json::Value, BusError> {
        let proxies = self.proxies().await?;
        debug!(method, args = args.len(), interface = %self.interface, "calling method");

        let reply = if args.is_empty() {
            proxies.object.call_method(method, &()).await?
        } else {
            let mut body = StructureBuilder::new();
            for arg in args {
                body.push_value(from_json(arg)?);
            }
            let body = body.build().map_err(zbus::Error::from)?;
            proxies.object.call_method(method, &body).await?
        };

        let body = reply.body();
        if body.signature().to_string().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        let fields: Structure<'_> = body.deserialize()?;
        Ok(reply_to_json(&fields))
    }

    /// List the immediate child object names below this handle's path.
    ///
    /// Introspects the object and reduces the advertised descendant paths
    /// to one level of child names. The descendant list is fetched fresh
    /// on every call.
    pub async fn children(&self) -> Result<Vec<String>, BusError> {
        let proxies = self.proxies().await?;
        let xml = proxies.introspectable.introspect().await?;

        let root = zbus_xml::Node::from_reader(xml.as_bytes())?;
        let mut nodes = Vec::new();
        collect_node_paths(self.path.as_str(), &root, &mut nodes);
        debug!(path = %self.path, descendants = nodes.len(), "introspected object");

        Ok(child_names(self.path.as_str(), &nodes))
    }

    /// Create a sibling handle for another object/interface pair on the
    /// same connection. The new handle resolves its own proxies.
    pub fn derive(&self, path: &str, interface: &str) -> Result<RemoteObject, BusError> {
        Self::new(
            self.connection.clone(),
            self.service.as_str(),
            path,
            interface,
        )
    }

    /// Shut the underlying connection down gracefully.
    ///
    /// The connection is shared with handles created via [`derive`], so
    /// those stop working too.
    ///
    /// [`derive`]: RemoteObject::derive
    pub async fn close(self) {
        debug!(service = %self.service, "closing bus connection");
        self.connection.graceful_shutdown().await;
    }
}

/// Flatten an introspection node tree into absolute descendant paths.
///
/// Child node names are path-relative per the introspection format;
/// absolute names are taken as-is.
fn collect_node_paths(base: &str, node: &zbus_xml::Node<'_>, out: &mut Vec<String>) {
    for child in node.nodes() {
        let Some(name) = child.name() else {
            continue;
        };
        let path = if name.starts_with('/') {
            name.to_string()
        } else if base == "/" {
            format!("/{name}")
        } else {
            format!("{base}/{name}")
        };
        collect_node_paths(&path, child, out);
        out.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"
        <node>
          <interface name="com.example.Frobnicator">
            <method name="Frob"/>
            <property name="Level" type="u" access="read"/>
          </interface>
          <node name="jobs">
            <node name="1"/>
            <node name="2"/>
          </node>
          <node name="units"/>
        </node>
    "#;

    #[test]
    fn test_collect_node_paths_flattens_tree() {
        let root = zbus_xml::Node::from_reader(SAMPLE_XML.as_bytes()).unwrap();
        let mut nodes = Vec::new();
        collect_node_paths("/com/example", &root, &mut nodes);
        assert_eq!(
            nodes,
            vec![
                "/com/example/jobs/1",
                "/com/example/jobs/2",
                "/com/example/jobs",
                "/com/example/units",
            ]
        );
    }

    #[test]
    fn test_collect_node_paths_from_root() {
        let root = zbus_xml::Node::from_reader(SAMPLE_XML.as_bytes()).unwrap();
        let mut nodes = Vec::new();
        collect_node_paths("/", &root, &mut nodes);
        assert_eq!(nodes, vec!["/jobs/1", "/jobs/2", "/jobs", "/units"]);
    }

    #[test]
    fn test_children_of_flattened_tree() {
        let root = zbus_xml::Node::from_reader(SAMPLE_XML.as_bytes()).unwrap();
        let mut nodes = Vec::new();
        collect_node_paths("/com/example", &root, &mut nodes);
        assert_eq!(child_names("/com/example", &nodes), vec!["jobs", "units"]);
    }
}
