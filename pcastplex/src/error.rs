//! Gestion des erreurs pour le client Plex

use thiserror::Error;

/// Type Result personnalisé pour pcastplex
pub type Result<T> = std::result::Result<T, PlexError>;

#[derive(Error, Debug)]
pub enum PlexError {
    /// Sign-in rejected by plex.tv (bad credentials)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// Erreur de l'API plex.tv
    #[error("plex.tv error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Servers existed but none answered within the deadline
    #[error("no reachable servers")]
    NoReachableServer,
}

impl PlexError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message.into()),
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur est une erreur de credentials (401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, PlexError::Unauthorized(_))
    }
}
