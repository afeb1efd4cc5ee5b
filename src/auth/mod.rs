//! Authentication: request signing and auth-token bootstrap.

mod bootstrap;
pub mod signer;

pub use bootstrap::{AuthTokenSource, LoginBootstrap};
pub use signer::{sign, RequestSigner, SignatureError, SIGNATURE_PARAM};
