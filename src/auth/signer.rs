//! Request signing for the SharedBook API.
//!
//! # Signing Scheme
//!
//! Every call carries a `signature` parameter computed from all other text
//! parameters and the product secret word:
//!
//! ```text
//! signature = md5_hex(secret_word + key1 + value1 + key2 + value2 + ...)
//! ```
//!
//! Keys are sorted by byte order before concatenation, so the signature does
//! not depend on the order parameters were added in. File parts of multipart
//! requests are a separate type and never enter the signed string. The secret
//! word itself is never sent.
//!
//! # Example
//!
//! ```rust
//! use sharedbook::auth::RequestSigner;
//! use sharedbook::transport::Params;
//!
//! let signer = RequestSigner::new("x");
//! let mut params = Params::new()
//!     .with("apiKey", "x")
//!     .with("authToken", "x")
//!     .with("sessionToken", "aabbcc")
//!     .with("bmsId", "123")
//!     .with("bookId", "321")
//!     .with("redirect", "false");
//!
//! signer.sign_params(&mut params);
//! assert_eq!(params.get("signature"), Some("5949fa652c1dba35111d978541ecb44e"));
//! assert!(signer.verify(&params).is_ok());
//! ```

use std::fmt;

use subtle::ConstantTimeEq;

use crate::transport::Params;

/// Name of the parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Signature verification failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// No `signature` parameter present
    MissingSignature,

    /// Signature is not valid hex
    InvalidSignatureFormat,

    /// Signature does not match the parameters
    InvalidSignature,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::MissingSignature => write!(f, "Missing signature parameter"),
            SignatureError::InvalidSignatureFormat => write!(f, "Invalid signature format"),
            SignatureError::InvalidSignature => write!(f, "Invalid signature"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Compute the signature of `params` under `secret_word`.
///
/// Any `signature` parameter already present is ignored. Values are signed
/// exactly as given; callers stringify numbers before inserting them.
pub fn sign(secret_word: &str, params: &Params) -> String {
    let base = signature_base(secret_word, params);
    format!("{:x}", md5::compute(base.as_bytes()))
}

fn signature_base(secret_word: &str, params: &Params) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(key, _)| *key != SIGNATURE_PARAM)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut base = String::from(secret_word);
    for (key, value) in pairs {
        base.push_str(key);
        base.push_str(value);
    }
    base
}

/// Signs parameter sets with the product secret word.
#[derive(Clone)]
pub struct RequestSigner {
    secret_word: String,
}

impl RequestSigner {
    pub fn new(secret_word: impl Into<String>) -> Self {
        Self {
            secret_word: secret_word.into(),
        }
    }

    /// Hex-encoded signature of `params`.
    pub fn sign(&self, params: &Params) -> String {
        sign(&self.secret_word, params)
    }

    /// Append the `signature` parameter.
    ///
    /// Must run after every other parameter is final. A stale signature from
    /// an earlier call is replaced and moved to the end.
    pub fn sign_params(&self, params: &mut Params) {
        params.remove(SIGNATURE_PARAM);
        let signature = self.sign(params);
        params.insert(SIGNATURE_PARAM, signature);
    }

    /// Check the `signature` parameter of a received parameter set.
    pub fn verify(&self, params: &Params) -> Result<(), SignatureError> {
        let provided = params
            .get(SIGNATURE_PARAM)
            .ok_or(SignatureError::MissingSignature)?;
        self.verify_signature(params, provided)
    }

    /// Check `signature` against `params` using a constant-time comparison.
    pub fn verify_signature(&self, params: &Params, signature: &str) -> Result<(), SignatureError> {
        let provided =
            hex::decode(signature).map_err(|_| SignatureError::InvalidSignatureFormat)?;
        let expected =
            hex::decode(self.sign(params)).map_err(|_| SignatureError::InvalidSignatureFormat)?;

        if provided.ct_eq(&expected).into() {
            Ok(())
        } else {
            Err(SignatureError::InvalidSignature)
        }
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret_word", &"<redacted>")
            .finish()
    }
}
