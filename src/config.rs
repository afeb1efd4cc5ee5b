//! Command-line configuration for the `sharedbook` binary.
//!
//! Connection settings are global flags, each with an environment variable
//! fallback:
//!
//! - `SHAREDBOOK_API_KEY` - API key of the product
//! - `SHAREDBOOK_SECRET_WORD` - secret word used to sign requests
//! - `SHAREDBOOK_AUTH_TOKEN` - auth token of the user, or `auto` to log in
//! - `SHAREDBOOK_SESSION_TOKEN` - session token obtained earlier
//! - `SHAREDBOOK_BASE_URL` - service root (default: production v0.6)
//! - `SHAREDBOOK_DEVELOPMENT` - acknowledge the login bootstrap is dev-only

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::endpoints::DEFAULT_BASE_URL;
use crate::error::CredentialError;
use crate::session::Credentials;
use crate::transport::Params;

/// Auth token value that asks for one to be fetched through the login flow.
pub const AUTO_AUTH_TOKEN: &str = "auto";

/// SharedBook client - create photo books through the SharedBook API.
#[derive(Parser, Debug, Clone)]
#[command(name = "sharedbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionConfig,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials and service location shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionConfig {
    /// API key of the product.
    #[arg(long, global = true, env = "SHAREDBOOK_API_KEY")]
    pub api_key: Option<String>,

    /// Secret word used to sign requests.
    #[arg(long, global = true, env = "SHAREDBOOK_SECRET_WORD", hide_env_values = true)]
    pub secret_word: Option<String>,

    /// Auth token of the user. `auto` fetches one through the login flow.
    #[arg(long, global = true, env = "SHAREDBOOK_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Session token obtained earlier for the same auth token.
    #[arg(long, global = true, env = "SHAREDBOOK_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// Root URL of the service.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL, env = "SHAREDBOOK_BASE_URL")]
    pub base_url: String,

    /// Allow the login bootstrap without a warning.
    ///
    /// The bootstrap posts to the login page; only do this in development.
    #[arg(long, global = true, default_value_t = false, env = "SHAREDBOOK_DEVELOPMENT")]
    pub development: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the URL where a user logs in to obtain an auth token.
    LoginUrl,

    /// Print the signature of a parameter set.
    Sign(SignConfig),

    /// Check a signature against a parameter set.
    Verify(VerifyConfig),

    /// Fetch and print a session token.
    SessionToken,

    /// Create and publish a book from a JSON manifest.
    Publish(PublishConfig),
}

#[derive(Args, Debug, Clone)]
pub struct SignConfig {
    /// Parameter to sign, as `key=value`. Repeat for each parameter.
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyConfig {
    /// Signed parameter, as `key=value`. Repeat for each parameter.
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Signature to check (32 hex characters).
    #[arg(short, long)]
    pub signature: String,
}

#[derive(Args, Debug, Clone)]
pub struct PublishConfig {
    /// Path to the book manifest.
    pub manifest: PathBuf,
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter '{}': expected key=value", s))?;

    if key.is_empty() {
        return Err(format!("invalid parameter '{}': empty key", s));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Collect pairs into [`Params`]; a repeated key keeps its last value.
pub fn to_params(pairs: &[(String, String)]) -> Params {
    pairs.iter().cloned().collect()
}

impl ConnectionConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("Base URL is required. Set --base-url or SHAREDBOOK_BASE_URL".to_string());
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Base URL must use http or https, got '{}'",
                self.base_url
            ));
        }

        Ok(())
    }

    /// True when the auth token should come from the login flow.
    pub fn wants_bootstrap(&self) -> bool {
        self.auth_token
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(AUTO_AUTH_TOKEN))
    }

    /// Build credentials from the configured values.
    pub fn credentials(&self) -> Result<Credentials, CredentialError> {
        let credentials = Credentials::from_parts(
            self.api_key.clone(),
            self.secret_word.clone(),
            self.auth_token.clone(),
        )?;

        Ok(match &self.session_token {
            Some(token) => credentials.with_session_token(token.as_str()),
            None => credentials,
        })
    }

    /// Secret word alone, for commands that only sign.
    pub fn secret_word(&self) -> Result<&str, CredentialError> {
        self.secret_word
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(CredentialError::MissingSecretWord)
    }
}

// =============================================================================
// Tests
// =============================================================================
