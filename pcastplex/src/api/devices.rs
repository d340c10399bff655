//! The account's device inventory.

use tracing::debug;

use super::auth::PlexAccount;
use super::PlexApi;
use crate::error::Result;
use crate::models::{DeviceContainer, PlexDevice};

impl PlexApi {
    /// Fetch the full device inventory, servers and players alike.
    pub async fn devices(&self) -> Result<Vec<PlexDevice>> {
        let body = self.get_xml("/devices.xml").await?;
        let container: DeviceContainer = quick_xml::de::from_str(&body)?;
        debug!("device inventory holds {} entries", container.devices.len());
        Ok(container.devices)
    }
}

impl PlexAccount {
    /// The account's media servers (inventory filtered on `provides`).
    pub async fn servers(&self) -> Result<Vec<PlexDevice>> {
        let devices = self.api.devices().await?;
        Ok(devices.into_iter().filter(PlexDevice::is_server).collect())
    }
}
