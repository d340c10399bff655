//! Persistent PlexCast configuration.
//!
//! The configuration file is the only state that outlives a run: a small
//! YAML mapping holding the Plex authentication token, the chosen server
//! URL and the chosen Chromecast name. Downstream playback tooling reads
//! it from the working directory.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// The persisted triple. The Chromecast is referenced by display name,
/// which is the identity the discovery advertisements carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub plex_token: String,
    pub plex_url: String,
    pub chromecast_name: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Configuration {
    /// Serialise to a YAML document, without touching the filesystem.
    ///
    /// Kept separate from [`write_yaml`] so callers can report
    /// serialisation and write failures distinctly.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Write an already-serialised configuration document to `path`.
///
/// Any pre-existing file is unlinked first; no concurrent reader is
/// assumed. The file is created with mode 0664.
pub fn write_yaml(path: &Path, yaml: &str) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    fs::write(path, yaml)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o664))?;
    }
    Ok(())
}

/// Serialise and write in one step.
pub fn write(path: &Path, config: &Configuration) -> Result<(), ConfigError> {
    let yaml = config.to_yaml()?;
    write_yaml(path, &yaml)?;
    Ok(())
}

/// Read a configuration back from disk.
pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
    let yaml = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&yaml)?)
}
