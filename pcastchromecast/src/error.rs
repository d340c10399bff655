use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The mDNS browser failed to start or errored mid-run.
    #[error("mDNS browse error: {0}")]
    Browse(#[from] mdns::Error),
}
