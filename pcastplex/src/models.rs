//! Typed views of the plex.tv device inventory.
//!
//! Everything here is a plain value: reachability is a transient query
//! result produced by [`crate::probe`], never state stored on a model.

use serde::Deserialize;

/// One `<Device>` entry from `/devices.xml`.
#[derive(Clone, Debug, Deserialize)]
pub struct PlexDevice {
    #[serde(rename = "@name")]
    pub name: String,
    /// Comma-separated capability list (`server`, `player`, ...).
    #[serde(rename = "@provides", default)]
    pub provides: String,
    /// Owning account of a shared server; absent or empty for servers the
    /// signed-in account owns itself.
    #[serde(rename = "@sourceTitle", default)]
    pub source_title: Option<String>,
    /// Candidate endpoints, in the order plex.tv advertises them.
    #[serde(rename = "Connection", default)]
    pub connections: Vec<PlexConnection>,
}

impl PlexDevice {
    /// True when the device is a media server (the inventory also lists
    /// players and controllers).
    pub fn is_server(&self) -> bool {
        self.provides.split(',').any(|cap| cap.trim() == "server")
    }

    /// Owner shown in listings: the source account for shared servers,
    /// otherwise the signed-in username.
    pub fn owner<'a>(&'a self, username: &'a str) -> &'a str {
        match self.source_title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => username,
        }
    }
}

/// One advertised endpoint of a server.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PlexConnection {
    #[serde(rename = "@uri")]
    pub uri: String,
}

impl PlexConnection {
    /// Private-network endpoints are advertised with a plain-http scheme;
    /// public ones are https.
    pub fn is_local(&self) -> bool {
        self.uri.starts_with("http://")
    }
}

/// The (server, endpoint) pairing that survived probing.
#[derive(Clone, Debug)]
pub struct ReachableEndpoint {
    pub device: PlexDevice,
    pub connection: PlexConnection,
}

/// One row of the `plex list` report.
#[derive(Clone, Debug)]
pub struct EndpointStatus {
    pub server: String,
    pub owner: String,
    pub uri: String,
    pub reachable: bool,
}

/// Root of `/devices.xml`.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceContainer {
    #[serde(rename = "Device", default)]
    pub devices: Vec<PlexDevice>,
}
