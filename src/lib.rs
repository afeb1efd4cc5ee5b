//! # SharedBook
//!
//! A client for the SharedBook photo-book API (v0.6).
//!
//! A product holds an API key and a secret word. A user grants it an auth
//! token by logging in on the SharedBook site. With those, a [`Session`]
//! drives the book-creation workflow: create a draft (media set), add
//! comments and photos, set covers, publish, create the book and fetch its
//! preview URL.
//!
//! ## Features
//!
//! - **Signed requests**: every request carries an MD5 signature over the
//!   secret word and its sorted parameters
//! - **Typed operations**: required fields are checked before any network I/O
//! - **Tolerant parsing**: ids are picked out of the service's loose XML
//! - **Pluggable transport**: [`HttpTransport`] by default, any [`Transport`]
//!   in tests
//!
//! ## Architecture
//!
//! - [`auth`] - request signing and the development login bootstrap
//! - [`session`] - credentials, operation options and the stateful session
//! - [`transport`] - parameter sets and the HTTP transport
//! - [`response`] - response body parsing
//! - [`endpoints`] - service URLs
//! - [`manifest`] - whole-book JSON manifests
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust
//! use sharedbook::{Params, RequestSigner};
//!
//! let signer = RequestSigner::new("x");
//! let mut params = Params::new()
//!     .with("apiKey", "x")
//!     .with("authToken", "x");
//! signer.sign_params(&mut params);
//!
//! assert_eq!(params.get("signature"), Some("249446f84f4e8545bbbda7c22131e6d3"));
//! ```

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod manifest;
pub mod response;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use auth::{sign, AuthTokenSource, LoginBootstrap, RequestSigner, SignatureError};
pub use config::{Cli, Command, ConnectionConfig};
pub use endpoints::{auth_login_url, login_url, Endpoint, Endpoints, DEFAULT_BASE_URL};
pub use error::{
    ClientError, ContractError, CredentialError, ResponseError, Result, TransportError,
};
pub use manifest::{BookManifest, PublishedBook};
pub use session::{
    Chapter, Chapters, CommentOptions, Cover, Credentials, DedicationOptions, PhotoDetails,
    PhotoUploadOptions, PhotoUrlOptions, Session, WorkflowState, DEFAULT_THEME,
};
pub use transport::{FilePart, HttpTransport, MultipartForm, Params, Transport};
