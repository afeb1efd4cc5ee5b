//! Transport layer between the session and the SharedBook service.
//!
//! The session never talks HTTP directly. It hands fully signed parameter
//! sets to a [`Transport`], which returns the raw response body. This keeps
//! the workflow logic testable against an in-memory transport.

mod http_transport;
mod params;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;

pub use http_transport::HttpTransport;
pub use params::{FilePart, MultipartForm, Params};

/// Executes requests against the remote service.
///
/// Implementations do no signing of their own. `post_form` and
/// `post_multipart` must fail with [`TransportError::Status`] when the status
/// is outside 2xx/3xx.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `params` as the query string. The body is returned
    /// whatever the status.
    async fn get(&self, url: &str, params: &Params) -> Result<String, TransportError>;

    /// POST `params` to `url` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, params: &Params) -> Result<String, TransportError>;

    /// POST the text params and the file part to `url` as `multipart/form-data`.
    async fn post_multipart(&self, url: &str, form: MultipartForm)
        -> Result<String, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        (**self).get(url, params).await
    }

    async fn post_form(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        (**self).post_form(url, params).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        form: MultipartForm,
    ) -> Result<String, TransportError> {
        (**self).post_multipart(url, form).await
    }
}
