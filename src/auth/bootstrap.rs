use async_trait::async_trait;
use tracing::{debug, warn};

use crate::endpoints::{Endpoint, Endpoints};
use crate::error::ClientError;
use crate::response;
use crate::transport::{Params, Transport};

/// Source of auth tokens for sessions started without one.
///
/// Production callers obtain the auth token through the browser login flow
/// (see [`crate::endpoints::login_url`]). Tests and development tools plug in
/// an implementation of this trait instead.
#[async_trait]
pub trait AuthTokenSource: Send + Sync {
    async fn fetch_auth_token(&self, api_key: &str) -> Result<String, ClientError>;
}

/// Fetches a throwaway auth token by posting the API key to `/auth/login`.
///
/// Meant for development only. `development` must be set explicitly; when it
/// is false the token is still fetched but a warning is logged.
pub struct LoginBootstrap<T> {
    transport: T,
    endpoints: Endpoints,
    development: bool,
}

impl<T: Transport> LoginBootstrap<T> {
    pub fn new(transport: T, endpoints: Endpoints, development: bool) -> Self {
        Self {
            transport,
            endpoints,
            development,
        }
    }

    pub fn is_development(&self) -> bool {
        self.development
    }
}

#[async_trait]
impl<T: Transport> AuthTokenSource for LoginBootstrap<T> {
    async fn fetch_auth_token(&self, api_key: &str) -> Result<String, ClientError> {
        if !self.development {
            warn!("Bootstrapping an auth token outside development mode; use the login redirect flow in production");
        }

        let url = self.endpoints.url(Endpoint::Login);
        debug!(operation = Endpoint::Login.operation(), url = %url, "Requesting auth token");

        let params = Params::new().with("apiKey", api_key);
        let body = self.transport.post_form(&url, &params).await?;

        response::parse_auth_token(&body).map_err(|e| {
            warn!(operation = e.operation, "Login response did not contain an auth token");
            e.into()
        })
    }
}
