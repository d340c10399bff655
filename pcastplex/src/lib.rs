//! # pcastplex - Plex account client and server scanning
//!
//! This crate talks to the plex.tv account service and answers one
//! question about the result: which of the account's media servers can
//! this host actually reach right now, and through which endpoint?
//!
//! ## Structure des modules
//!
//! ```text
//! pcastplex/
//! ├── src/
//! │   ├── lib.rs          # Module principal (ce fichier)
//! │   ├── api/
//! │   │   ├── mod.rs      # Client HTTP bas-niveau plex.tv
//! │   │   ├── auth.rs     # Sign-in
//! │   │   └── devices.rs  # Inventaire des devices
//! │   ├── models.rs       # Structures de données
//! │   ├── probe.rs        # Sonde de joignabilité + course au premier succès
//! │   ├── scan.rs         # Fan-out par serveur, agrégation
//! │   └── error.rs        # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pcastplex::{enumerate_servers, sign_in, DEFAULT_SCAN_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pcastplex::PlexError> {
//!     let account = sign_in("user@example.com", "password").await?;
//!     let reachable = enumerate_servers(&account, DEFAULT_SCAN_TIMEOUT).await?;
//!     for endpoint in reachable {
//!         println!("{} -> {}", endpoint.device.name, endpoint.connection.uri);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod probe;
pub mod scan;

pub use api::auth::{sign_in, PlexAccount};
pub use api::PlexApi;
pub use error::{PlexError, Result};
pub use models::{EndpointStatus, PlexConnection, PlexDevice, ReachableEndpoint};
pub use probe::{probe, probe_client, select_best};
pub use scan::{enumerate_servers, probe_all, DEFAULT_SCAN_TIMEOUT};
