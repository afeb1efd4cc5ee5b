//! Test utilities for integration tests.
//!
//! Provides a scripted transport that records every request and answers
//! from per-path queues, plus canned response bodies in the shapes the
//! SharedBook service uses.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sharedbook::error::TransportError;
use sharedbook::{Credentials, Endpoints, MultipartForm, Params, Session, Transport};

pub const TEST_API_KEY: &str = "x";
pub const TEST_SECRET_WORD: &str = "x";
pub const TEST_AUTH_TOKEN: &str = "x";
pub const TEST_SESSION_TOKEN: &str = "aabbcc";
pub const TEST_BASE_URL: &str = "http://sharedbook.test/v0.6";

// =============================================================================
// Canned bodies
// =============================================================================

pub fn session_token_body(token: &str) -> String {
    format!(
        r#"<auth.getSessionToken status="ok"><sessionToken>{}</sessionToken></auth.getSessionToken>"#,
        token
    )
}

pub fn media_set_body(id: &str) -> String {
    format!(r#"<bmscreate.init status="ok"><bms id="{}" /></bmscreate.init>"#, id)
}

pub fn comment_body(id: &str) -> String {
    format!(
        r#"<bms.addComment status="ok"><comment id="{}" chapterNumber="1" /></bms.addComment>"#,
        id
    )
}

pub fn photo_body(id: &str) -> String {
    format!(r#"<bms.addPhoto status="ok"><photo id="{}" /></bms.addPhoto>"#, id)
}

pub fn book_body(id: &str) -> String {
    format!(r#"<bookcreate.publish status="ok"><book id="{}" /></bookcreate.publish>"#, id)
}

pub fn preview_body(url: &str) -> String {
    format!(r#"<book.preview status="ok"><url>{}</url></book.preview>"#, url)
}

pub fn ok_body(operation: &str) -> String {
    format!(r#"<{} status="ok" />"#, operation)
}

pub const MALFORMED_BODY: &str = "<p>B0RKEN!</p>";

// =============================================================================
// Recording transport
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    PostForm,
    PostMultipart,
}

/// Uploaded file as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFile {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub file: Option<RecordedFile>,
}

impl RecordedRequest {
    /// Path of the request relative to [`TEST_BASE_URL`].
    pub fn path(&self) -> &str {
        self.url.strip_prefix(TEST_BASE_URL).unwrap_or(self.url.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.params.keys().collect()
    }
}

type Reply = Result<String, TransportError>;

/// A transport that answers from per-path queues and records requests.
///
/// Paths without a queued reply answer with an empty body, which every
/// operation rejects as malformed.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    request_count: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a body for the next request to `path` (e.g. `/bms/addPhoto`).
    pub fn reply(self, path: &str, body: impl Into<String>) -> Self {
        self.push(path, Ok(body.into()));
        self
    }

    /// Queue a transport failure for the next request to `path`.
    pub fn fail(self, path: &str, error: TransportError) -> Self {
        self.push(path, Err(error));
        self
    }

    /// Queue the usual session-token reply.
    pub fn with_session_token(self) -> Self {
        self.reply("/auth/getSessionToken", session_token_body(TEST_SESSION_TOKEN))
    }

    fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests to `path`, in order.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("no request was recorded")
    }

    fn answer(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        file: Option<RecordedFile>,
    ) -> Reply {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = RecordedRequest {
            method,
            url: url.to_string(),
            params: params.clone(),
            file,
        };
        let path = request.path().to_string();
        self.requests.lock().unwrap().push(request);

        self.replies
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(String::new()))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        self.answer(Method::Get, url, params, None)
    }

    async fn post_form(&self, url: &str, params: &Params) -> Result<String, TransportError> {
        self.answer(Method::PostForm, url, params, None)
    }

    async fn post_multipart(
        &self,
        url: &str,
        form: MultipartForm,
    ) -> Result<String, TransportError> {
        let file = RecordedFile {
            field: form.file.field,
            file_name: form.file.file_name,
            mime: form.file.mime,
            data: form.file.data.to_vec(),
        };
        self.answer(Method::PostMultipart, url, &form.params, Some(file))
    }
}

// =============================================================================
// Sessions
// =============================================================================

pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_API_KEY, TEST_SECRET_WORD, TEST_AUTH_TOKEN).unwrap()
}

/// Session against [`TEST_BASE_URL`] sharing `transport`'s recordings.
pub fn test_session(transport: &MockTransport) -> Session<MockTransport> {
    Session::with_endpoints(
        test_credentials(),
        transport.clone(),
        Endpoints::new(TEST_BASE_URL),
    )
}

/// Session that already holds a session token and a media-set id of `bms_id`.
pub async fn session_with_media_set(
    transport: &MockTransport,
    bms_id: &str,
) -> Session<MockTransport> {
    transport
        .clone()
        .with_session_token()
        .reply("/bmscreate/init", media_set_body(bms_id));

    let mut session = test_session(transport);
    session
        .create_media_set("title", sharedbook::Chapter::new("chapter 1", "text"))
        .await
        .unwrap();
    session
}
