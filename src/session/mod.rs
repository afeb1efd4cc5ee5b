//! Stateful client session for the SharedBook book-creation workflow.
//!
//! # Workflow
//!
//! ```text
//! session token ─► bmscreate/init ─► bmscreate/publish ─► bms/addComment
//!                  (media set id)                         bms/addPhoto
//!                                                         bms/set*CoverPhoto
//!                                                               │
//!        book/preview ◄─ bookcreate/publish ◄─ bookcreate/init ◄┘
//!        (preview url)   (book id)             bookcreate/setDedication
//! ```
//!
//! Each operation builds its parameters, adds `apiKey`, `sessionToken` and
//! `authToken`, appends the signature, hands the request to the
//! [`Transport`] and validates the body before touching the session state.
//! A failed operation leaves the state exactly as it was.
//!
//! # Concurrency
//!
//! Operations that talk to the service take `&mut self`, so one session only
//! ever has one request in flight. Share a session between tasks by wrapping
//! it in a `tokio::sync::Mutex`.
//!
//! # Example
//!
//! ```rust,no_run
//! use sharedbook::{Chapter, CommentOptions, Credentials, HttpTransport, Session};
//!
//! # async fn run() -> sharedbook::Result<()> {
//! let credentials = Credentials::new("api-key", "secret-word", "auth-token")?;
//! let mut session = Session::new(credentials, HttpTransport::new()?);
//!
//! let bms_id = session
//!     .create_media_set("My Trip", Chapter::new("Day 1", "We left early."))
//!     .await?;
//! session.publish_media_set(&bms_id).await?;
//! session
//!     .add_comment(&CommentOptions::new("Nice", "Lovely day", 1, "Joe"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod credentials;
mod options;
mod state;

use std::path::Path;

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::auth::RequestSigner;
use crate::endpoints::{Endpoint, Endpoints};
use crate::error::{ContractError, ResponseError, Result, TransportError};
use crate::response::{self, IdShape};
use crate::transport::{FilePart, MultipartForm, Params, Transport};

pub use credentials::Credentials;
pub use options::{
    Chapter, Chapters, CommentOptions, Cover, DedicationOptions, PhotoDetails, PhotoUploadOptions,
    PhotoUrlOptions,
};
pub use state::WorkflowState;

use options::require;

/// Theme the service applies when none is sent.
pub const DEFAULT_THEME: &str = "vanilla";

/// Multipart field carrying uploaded photo data.
const PHOTO_FIELD: &str = "photo";

/// Log and convert a response validation failure.
fn accept<V>(result: std::result::Result<V, ResponseError>) -> Result<V> {
    result.map_err(|e| {
        warn!(
            operation = e.operation,
            body_len = e.body.len(),
            "Response did not match the expected shape"
        );
        e.into()
    })
}

/// Read a whole upload into memory. The file handle is closed on return.
async fn read_upload(path: &Path) -> std::result::Result<Bytes, TransportError> {
    let io_error = |e: std::io::Error| TransportError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).await.map_err(io_error)?;
    Ok(Bytes::from(data))
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A SharedBook session: credentials, transport and workflow state.
pub struct Session<T> {
    transport: T,
    endpoints: Endpoints,
    credentials: Credentials,
    signer: RequestSigner,
    session_token: Option<String>,
    state: WorkflowState,
}

impl<T: Transport> Session<T> {
    /// Session against the production service.
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self::with_endpoints(credentials, transport, Endpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, transport: T, endpoints: Endpoints) -> Self {
        let signer = RequestSigner::new(credentials.secret_word());
        let session_token = credentials.session_token().map(str::to_string);

        Self {
            transport,
            endpoints,
            credentials,
            signer,
            session_token,
            state: WorkflowState::default(),
        }
    }

    /// Build a session and obtain its session token right away.
    pub async fn connect(
        credentials: Credentials,
        transport: T,
        endpoints: Endpoints,
    ) -> Result<Self> {
        let mut session = Self::with_endpoints(credentials, transport, endpoints);
        session.session_token().await?;
        Ok(session)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Session token if one has been supplied or fetched.
    pub fn cached_session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Session token for this session's auth token.
    ///
    /// The service refuses a second `getSessionToken` call for the same auth
    /// token, so the token is fetched at most once and cached.
    pub async fn session_token(&mut self) -> Result<&str> {
        let token = match self.session_token.take() {
            Some(token) => token,
            None => self.fetch_session_token().await?,
        };
        Ok(self.session_token.insert(token).as_str())
    }

    async fn fetch_session_token(&self) -> Result<String> {
        let endpoint = Endpoint::SessionToken;
        let mut params = Params::new()
            .with("apiKey", self.credentials.api_key())
            .with("authToken", self.credentials.auth_token());
        self.signer.sign_params(&mut params);

        let url = self.endpoints.url(endpoint);
        debug!(operation = endpoint.operation(), url = %url, "GET");
        let body = self.transport.get(&url, &params).await?;

        let token = accept(response::parse_session_token(&body))?;
        info!("Session token obtained");
        Ok(token)
    }

    /// Add the auth fields and the trailing signature.
    async fn authenticate(&mut self, mut params: Params) -> Result<Params> {
        let session_token = self.session_token().await?.to_string();
        params.insert("apiKey", self.credentials.api_key());
        params.insert("sessionToken", session_token);
        params.insert("authToken", self.credentials.auth_token());
        self.signer.sign_params(&mut params);
        Ok(params)
    }

    async fn get(&mut self, endpoint: Endpoint, params: Params) -> Result<String> {
        let params = self.authenticate(params).await?;
        let url = self.endpoints.url(endpoint);
        debug!(
            operation = endpoint.operation(),
            url = %url,
            params = ?params.keys().collect::<Vec<_>>(),
            "GET"
        );
        Ok(self.transport.get(&url, &params).await?)
    }

    async fn post_form(&mut self, endpoint: Endpoint, params: Params) -> Result<String> {
        let params = self.authenticate(params).await?;
        let url = self.endpoints.url(endpoint);
        debug!(
            operation = endpoint.operation(),
            url = %url,
            params = ?params.keys().collect::<Vec<_>>(),
            "POST"
        );
        Ok(self.transport.post_form(&url, &params).await?)
    }

    /// Validate `options`, read the file and post both as multipart.
    async fn upload(&mut self, endpoint: Endpoint, options: &PhotoUploadOptions) -> Result<String> {
        let operation = endpoint.operation();
        let params = options.to_params(operation, self.state.media_set_id())?;
        let data = read_upload(&options.file_path).await?;
        let params = self.authenticate(params).await?;

        let file = FilePart {
            field: PHOTO_FIELD.to_string(),
            file_name: upload_file_name(&options.file_path),
            mime: options.file_mime.clone(),
            data,
        };

        let url = self.endpoints.url(endpoint);
        debug!(
            operation,
            url = %url,
            params = ?params.keys().collect::<Vec<_>>(),
            file_size = file.data.len(),
            "POST multipart"
        );
        Ok(self
            .transport
            .post_multipart(&url, MultipartForm { params, file })
            .await?)
    }

    /// Post `bmsId` and expect the success marker.
    async fn confirm(&mut self, endpoint: Endpoint, params: Params) -> Result<()> {
        let operation = endpoint.operation();
        let body = self.post_form(endpoint, params).await?;
        accept(response::expect_ok(operation, &body))?;
        info!(operation, "Confirmed");
        Ok(())
    }

    fn media_set_params(operation: &'static str, media_set_id: &str) -> Result<Params> {
        require(operation, "bmsId", media_set_id)?;
        Ok(Params::new().with("bmsId", media_set_id))
    }

    // =========================================================================
    // Media set
    // =========================================================================

    /// Create a book draft (media set) with the default theme.
    pub async fn create_media_set(
        &mut self,
        title: &str,
        chapters: impl Into<Chapters>,
    ) -> Result<String> {
        self.create_media_set_with_theme(title, chapters, DEFAULT_THEME)
            .await
    }

    /// Create a book draft. `theme` is sent only when it differs from
    /// [`DEFAULT_THEME`].
    pub async fn create_media_set_with_theme(
        &mut self,
        title: &str,
        chapters: impl Into<Chapters>,
        theme: &str,
    ) -> Result<String> {
        let endpoint = Endpoint::MediaSetInit;
        let operation = endpoint.operation();
        let chapters = chapters.into();

        require(operation, "bookTitle", title)?;
        if chapters.is_empty() {
            return Err(ContractError::MissingField {
                operation,
                field: "chapterTitle",
            }
            .into());
        }

        let mut params = Params::new().with("bookTitle", title);
        chapters.append_to(&mut params);
        if theme != DEFAULT_THEME {
            require(operation, "theme", theme)?;
            params.insert("theme", theme);
        }

        let body = self.post_form(endpoint, params).await?;
        let id = accept(response::extract_id(operation, &body, "bms", IdShape::Numeric))?;

        info!(media_set_id = %id, "Media set created");
        self.state.media_set_id = Some(id.clone());
        Ok(id)
    }

    /// Publish a freshly created draft (`bmscreate/publish`).
    pub async fn publish_media_set(&mut self, media_set_id: &str) -> Result<()> {
        let endpoint = Endpoint::MediaSetPublish;
        let params = Self::media_set_params(endpoint.operation(), media_set_id)?;
        self.confirm(endpoint, params).await
    }

    /// Add a comment; its id is appended to [`WorkflowState::comment_ids`].
    pub async fn add_comment(&mut self, options: &CommentOptions) -> Result<String> {
        let endpoint = Endpoint::AddComment;
        let params = options.to_params(self.state.media_set_id())?;
        let body = self.post_form(endpoint, params).await?;
        let id = accept(response::extract_id(
            endpoint.operation(),
            &body,
            "comment",
            IdShape::Opaque,
        ))?;

        info!(comment_id = %id, "Comment added");
        self.state.comment_ids.push(id.clone());
        Ok(id)
    }

    /// Add a photo the service fetches from a URL.
    pub async fn add_photo_by_url(&mut self, options: &PhotoUrlOptions) -> Result<String> {
        let endpoint = Endpoint::AddPhoto;
        let params = options.to_params(self.state.media_set_id())?;
        let body = self.post_form(endpoint, params).await?;
        let id = accept(response::extract_id(
            endpoint.operation(),
            &body,
            "photo",
            IdShape::Opaque,
        ))?;

        info!(photo_id = %id, "Photo added by URL");
        self.state.photo_ids.push(id.clone());
        Ok(id)
    }

    /// Upload a photo from a local file.
    pub async fn add_photo_by_handle(&mut self, options: &PhotoUploadOptions) -> Result<String> {
        let endpoint = Endpoint::AddPhoto;
        let body = self.upload(endpoint, options).await?;
        let id = accept(response::extract_id(
            endpoint.operation(),
            &body,
            "photo",
            IdShape::Opaque,
        ))?;

        info!(photo_id = %id, "Photo uploaded");
        self.state.photo_ids.push(id.clone());
        Ok(id)
    }

    /// Upload a cover photo. A later call for the same cover replaces the id.
    pub async fn set_cover_photo(
        &mut self,
        cover: Cover,
        options: &PhotoUploadOptions,
    ) -> Result<String> {
        let endpoint = cover.endpoint();
        let body = self.upload(endpoint, options).await?;
        let id = accept(response::extract_id(
            endpoint.operation(),
            &body,
            "photo",
            IdShape::Opaque,
        ))?;

        info!(photo_id = %id, cover = ?cover, "Cover photo set");
        match cover {
            Cover::Front => self.state.front_cover_photo_id = Some(id.clone()),
            Cover::Back => self.state.back_cover_photo_id = Some(id.clone()),
        }
        Ok(id)
    }

    pub async fn set_front_cover_photo(&mut self, options: &PhotoUploadOptions) -> Result<String> {
        self.set_cover_photo(Cover::Front, options).await
    }

    pub async fn set_back_cover_photo(&mut self, options: &PhotoUploadOptions) -> Result<String> {
        self.set_cover_photo(Cover::Back, options).await
    }

    /// Publish the media set with its comments and photos (`bms/publish`).
    pub async fn publish_media_set_contents(&mut self, media_set_id: &str) -> Result<()> {
        let endpoint = Endpoint::BmsPublish;
        let params = Self::media_set_params(endpoint.operation(), media_set_id)?;
        self.confirm(endpoint, params).await
    }

    // =========================================================================
    // Book
    // =========================================================================

    pub async fn book_create_init(&mut self, media_set_id: &str) -> Result<()> {
        let endpoint = Endpoint::BookInit;
        let params = Self::media_set_params(endpoint.operation(), media_set_id)?;
        self.confirm(endpoint, params).await
    }

    pub async fn book_set_dedication(&mut self, options: &DedicationOptions) -> Result<()> {
        let endpoint = Endpoint::BookSetDedication;
        let params = options.to_params(self.state.media_set_id())?;
        self.confirm(endpoint, params).await
    }

    /// Publish the book; returns and records the book id.
    pub async fn book_create_publish(&mut self, media_set_id: &str) -> Result<String> {
        let endpoint = Endpoint::BookPublish;
        let operation = endpoint.operation();
        let params = Self::media_set_params(operation, media_set_id)?;
        let body = self.post_form(endpoint, params).await?;
        let id = accept(response::extract_id(operation, &body, "book", IdShape::Numeric))?;

        info!(book_id = %id, "Book published");
        self.state.book_id = Some(id.clone());
        Ok(id)
    }

    /// Preview URL of a published book.
    pub async fn book_preview(&mut self, media_set_id: &str, book_id: &str) -> Result<String> {
        let endpoint = Endpoint::BookPreview;
        let operation = endpoint.operation();
        require(operation, "bmsId", media_set_id)?;
        require(operation, "bookId", book_id)?;

        let params = Params::new()
            .with("bmsId", media_set_id)
            .with("bookId", book_id)
            .with("redirect", "false");
        let body = self.get(endpoint, params).await?;
        let url = accept(response::parse_preview_url(&body))?;

        info!(preview_url = %url, "Preview ready");
        self.state.preview_url = Some(url.clone());
        Ok(url)
    }
}
