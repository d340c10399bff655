//! Couche d'accès au service de comptes plex.tv
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec plex.tv.

pub mod auth;
pub mod devices;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::error::{PlexError, Result};

/// URL de base du service de comptes
const API_BASE_URL: &str = "https://plex.tv";

/// Sent as X-Plex-Product on every request.
const PRODUCT: &str = "PlexCast";

/// Client API bas-niveau pour communiquer avec plex.tv
pub struct PlexApi {
    /// Client HTTP
    client: Client,
    base_url: String,
    /// Identifiant X-Plex-Client-Identifier, unique par invocation
    client_identifier: String,
    /// Token d'authentification utilisateur
    token: Option<String>,
}

impl PlexApi {
    /// Crée une nouvelle instance de l'API
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    /// Instance pointée sur un autre service (tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("PlexCast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_identifier: uuid::Uuid::new_v4().to_string(),
            token: None,
        })
    }

    /// Définit le token d'authentification
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Retourne le token d'authentification si disponible
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Effectue une requête GET, retourne le corps XML
    pub(crate) async fn get_xml(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    /// Effectue une requête POST avec Basic auth, retourne le corps XML
    pub(crate) async fn post_xml(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        self.send(self.client.post(&url).basic_auth(username, Some(password)))
            .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = self.plex_headers(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PlexError::from_status_code(
                status.as_u16(),
                api_error_message(&body),
            ));
        }
        Ok(body)
    }

    /// Ajoute les headers X-Plex-* attendus par le service
    fn plex_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request
            .header("X-Plex-Product", PRODUCT)
            .header("X-Plex-Version", env!("CARGO_PKG_VERSION"))
            .header("X-Plex-Client-Identifier", &self.client_identifier);
        if let Some(ref token) = self.token {
            request = request.header("X-Plex-Token", token);
        }
        request
    }
}

/// Corps d'erreur `<errors><error>…</error></errors>` renvoyé par plex.tv
#[derive(Debug, serde::Deserialize)]
struct ApiErrors {
    #[serde(rename = "error", default)]
    errors: Vec<String>,
}

/// Extrait le premier message d'erreur du corps, s'il y en a un.
fn api_error_message(body: &str) -> String {
    quick_xml::de::from_str::<ApiErrors>(body)
        .ok()
        .and_then(|parsed| parsed.errors.into_iter().next())
        .unwrap_or_else(|| "request rejected".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_reads_the_first_error() {
        let body = "<errors><error>Invalid email or password.</error></errors>";
        assert_eq!(api_error_message(body), "Invalid email or password.");
    }

    #[test]
    fn test_api_error_message_survives_garbage() {
        assert_eq!(api_error_message("not xml at all"), "request rejected");
    }
}
