//! Endpoint table of the SharedBook API.

/// Base URL of the production service, including the version prefix.
pub const DEFAULT_BASE_URL: &str = "http://api.sharedbook.com/v0.6";

/// Every remote call the client knows how to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    SessionToken,
    MediaSetInit,
    MediaSetPublish,
    AddComment,
    AddPhoto,
    SetFrontCoverPhoto,
    SetBackCoverPhoto,
    BmsPublish,
    BookInit,
    BookSetDedication,
    BookPublish,
    BookPreview,
}

impl Endpoint {
    /// Path below the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/auth/login",
            Endpoint::SessionToken => "/auth/getSessionToken",
            Endpoint::MediaSetInit => "/bmscreate/init",
            Endpoint::MediaSetPublish => "/bmscreate/publish",
            Endpoint::AddComment => "/bms/addComment",
            Endpoint::AddPhoto => "/bms/addPhoto",
            Endpoint::SetFrontCoverPhoto => "/bms/setFrontCoverPhoto",
            Endpoint::SetBackCoverPhoto => "/bms/setBackCoverPhoto",
            Endpoint::BmsPublish => "/bms/publish",
            Endpoint::BookInit => "/bookcreate/init",
            Endpoint::BookSetDedication => "/bookcreate/setDedication",
            Endpoint::BookPublish => "/bookcreate/publish",
            Endpoint::BookPreview => "/book/preview",
        }
    }

    /// Operation name used in logs and errors, e.g. `bms/addComment`.
    pub fn operation(self) -> &'static str {
        &self.path()[1..]
    }
}

/// Resolves endpoints against a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Login URL a web user is sent to in the redirect flow. No network call.
pub fn login_url(base_url: &str) -> String {
    Endpoints::new(base_url).url(Endpoint::Login)
}

/// Login URL of the production service.
pub fn auth_login_url() -> String {
    login_url(DEFAULT_BASE_URL)
}
