use std::fmt;

use crate::auth::AuthTokenSource;
use crate::error::{ClientError, CredentialError};

/// Credentials of a SharedBook product and its user.
///
/// Fixed at construction. The secret word only ever feeds the signer.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_word: String,
    auth_token: String,
    session_token: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Credentials {
    /// Build credentials, rejecting empty values.
    ///
    /// Checked in order: API key, secret word, auth token.
    pub fn new(
        api_key: impl Into<String>,
        secret_word: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        Self::from_parts(
            Some(api_key.into()),
            Some(secret_word.into()),
            Some(auth_token.into()),
        )
    }

    /// Build credentials from optional sources such as CLI flags or the environment.
    pub fn from_parts(
        api_key: Option<String>,
        secret_word: Option<String>,
        auth_token: Option<String>,
    ) -> Result<Self, CredentialError> {
        let api_key = present(api_key).ok_or(CredentialError::MissingApiKey)?;
        let secret_word = present(secret_word).ok_or(CredentialError::MissingSecretWord)?;
        let auth_token = present(auth_token).ok_or(CredentialError::MissingAuthToken)?;

        Ok(Self {
            api_key,
            secret_word,
            auth_token,
            session_token: None,
        })
    }

    /// Build credentials with an auth token fetched from `source`.
    ///
    /// The API key and secret word are validated before `source` is called.
    pub async fn bootstrap<S: AuthTokenSource + ?Sized>(
        api_key: impl Into<String>,
        secret_word: impl Into<String>,
        source: &S,
    ) -> Result<Self, ClientError> {
        let api_key = present(Some(api_key.into())).ok_or(CredentialError::MissingApiKey)?;
        let secret_word =
            present(Some(secret_word.into())).ok_or(CredentialError::MissingSecretWord)?;

        let auth_token = source.fetch_auth_token(&api_key).await?;
        Ok(Self::new(api_key, secret_word, auth_token)?)
    }

    /// Start with a session token obtained earlier for the same auth token.
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = present(Some(session_token.into()));
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_word", &"<redacted>")
            .field("auth_token", &self.auth_token)
            .field("session_token", &self.session_token)
            .finish()
    }
}
