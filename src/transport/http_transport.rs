use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{redirect, Client, Response, StatusCode};
use tracing::debug;

use super::{MultipartForm, Params, Transport};
use crate::error::TransportError;

/// reqwest-backed implementation of [`Transport`].
///
/// Redirects are not followed: the login endpoint answers with a redirect
/// page whose body carries the auth token, and every other endpoint answers
/// directly. 3xx bodies are returned like 2xx bodies. GET bodies are returned
/// whatever the status, so an error page reaches the response parser.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with its own connection pool.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Use an existing client. It should not follow redirects.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn pairs(params: &Params) -> Vec<(&str, &str)> {
        params.iter().collect()
    }
}

/// Read the body whatever the status.
async fn read_text(url: &str, response: Response) -> Result<(StatusCode, String), TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    debug!(url = url, status = status.as_u16(), "Response received");
    Ok((status, body))
}

/// Read the body, mapping statuses outside 2xx/3xx to an error.
async fn read_body(url: &str, response: Response) -> Result<String, TransportError> {
    let (status, body) = read_text(url, response).await?;

    if status.is_success() || status.is_redirection() {
        Ok(body)
    } else {
        Err(TransportError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }
}

fn connection_error(e: reqwest::Error) -> TransportError {
    TransportError::Connection(e.to_string())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .query(&Self::pairs(params))
            .send()
            .await
            .map_err(connection_error)?;

        read_text(url, response).await.map(|(_, body)| body)
    }

    async fn post_form(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        let response = self
            .client
            .post(url)
            .form(&Self::pairs(params))
            .send()
            .await
            .map_err(connection_error)?;

        read_body(url, response).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        form: MultipartForm,
    ) -> Result<String, TransportError> {
        let MultipartForm { params, file } = form;

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|e| TransportError::InvalidRequest {
                url: url.to_string(),
                message: format!("invalid MIME type {:?}: {}", file.mime, e),
            })?;

        let mut multipart = Form::new();
        for (key, value) in params.iter() {
            multipart = multipart.text(key.to_string(), value.to_string());
        }
        multipart = multipart.part(file.field, part);

        let response = self
            .client
            .post(url)
            .multipart(multipart)
            .send()
            .await
            .map_err(connection_error)?;

        read_body(url, response).await
    }
}
