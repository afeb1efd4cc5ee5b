use thiserror::Error;

/// Errors raised when a session is built without the credentials it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No product API key was supplied
    #[error("Please supply product_api_key")]
    MissingApiKey,

    /// No product secret word was supplied
    #[error("Please supply product_secret_word")]
    MissingSecretWord,

    /// No auth token was supplied
    #[error("Please supply auth_token given from '/auth/login'")]
    MissingAuthToken,
}

/// A response body did not have the shape expected for the operation.
///
/// The raw body is kept so the failure can be diagnosed without re-running
/// the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected response to {operation}: {body}")]
pub struct ResponseError {
    /// Operation that produced the response
    pub operation: &'static str,

    /// Raw response body
    pub body: String,
}

impl ResponseError {
    pub fn new(operation: &'static str, body: impl Into<String>) -> Self {
        Self {
            operation,
            body: body.into(),
        }
    }
}

/// Errors raised by the transport layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The service answered with a status outside 2xx/3xx
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Local I/O error while preparing a request (e.g. reading an upload)
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The request could not be built (bad URL, bad MIME type)
    #[error("Invalid request to {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

/// The caller broke an operation's contract; raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// A required field was absent or empty
    #[error("{operation} requires {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// Cover designator other than "front" or "back"
    #[error("Only front or back cover is supported, got {0:?}")]
    InvalidCover(String),

    /// A manifest file is not valid JSON or lacks required entries
    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },
}

/// Any failure of a session operation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
