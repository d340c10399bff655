//! Sign-in against the plex.tv account service.

use serde::Deserialize;
use tracing::{debug, info};

use super::PlexApi;
use crate::error::Result;

/// Response of `POST /users/sign_in.xml`: a `<user>` element whose
/// attributes include the issued token.
#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(rename = "@authToken")]
    auth_token: String,
}

/// An authenticated plex.tv account handle.
pub struct PlexAccount {
    pub(crate) api: PlexApi,
    /// Opaque token issued at sign-in.
    pub token: String,
    /// Originating username, kept for display.
    pub username: String,
}

impl PlexApi {
    /// Authenticate and store the issued token on the client.
    ///
    /// # Errors
    ///
    /// * `PlexError::Unauthorized` when the credentials are rejected
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String> {
        info!("signing in to plex.tv as {}", username);

        let body = self.post_xml("/users/sign_in.xml", username, password).await?;
        let user: UserResponse = quick_xml::de::from_str(&body)?;
        debug!("sign-in accepted for {}", username);

        self.set_token(user.auth_token.clone());
        Ok(user.auth_token)
    }
}

/// Sign in with username and password, returning an account handle.
pub async fn sign_in(username: &str, password: &str) -> Result<PlexAccount> {
    let mut api = PlexApi::new()?;
    let token = api.login(username, password).await?;

    Ok(PlexAccount {
        api,
        token,
        username: username.to_string(),
    })
}
