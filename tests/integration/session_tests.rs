//! Session authentication integration tests.
//!
//! Tests verify:
//! - The session token is fetched once and reused
//! - Every request carries the auth fields and a trailing signature
//! - Contract violations never reach the transport
//! - Transport failures propagate unchanged

use sharedbook::error::TransportError;
use sharedbook::{
    ClientError, CommentOptions, ContractError, CredentialError, Credentials, Endpoints,
    LoginBootstrap, RequestSigner, Session,
};

use super::test_utils::{
    comment_body, media_set_body, preview_body, session_token_body, session_with_media_set,
    test_credentials, test_session, Method, MockTransport, MALFORMED_BODY, TEST_BASE_URL,
    TEST_SECRET_WORD, TEST_SESSION_TOKEN,
};

// =============================================================================
// Session token
// =============================================================================

#[tokio::test]
async fn test_session_token_single_network_call() {
    let transport = MockTransport::new().with_session_token();
    let mut session = test_session(&transport);

    let first = session.session_token().await.unwrap().to_string();
    let second = session.session_token().await.unwrap().to_string();

    assert_eq!(first, TEST_SESSION_TOKEN);
    assert_eq!(second, TEST_SESSION_TOKEN);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_session_token_fetched_lazily_once_across_operations() {
    let transport = MockTransport::new()
        .with_session_token()
        .reply("/bmscreate/init", media_set_body("1"))
        .reply("/bms/addComment", comment_body("c1"));
    let mut session = test_session(&transport);

    session
        .create_media_set("title", sharedbook::Chapter::new("chapter 1", "text"))
        .await
        .unwrap();
    session
        .add_comment(&CommentOptions::new("t", "text", 1, "Joe"))
        .await
        .unwrap();

    assert_eq!(transport.requests_to("/auth/getSessionToken").len(), 1);
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_session_token_request_shape() {
    let transport = MockTransport::new().with_session_token();
    let mut session = test_session(&transport);
    session.session_token().await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, format!("{}/auth/getSessionToken", TEST_BASE_URL));
    assert_eq!(request.keys(), vec!["apiKey", "authToken", "signature"]);
    assert_eq!(
        request.params.get("signature"),
        Some("249446f84f4e8545bbbda7c22131e6d3")
    );
}

#[tokio::test]
async fn test_supplied_session_token_skips_fetch() {
    let transport = MockTransport::new().reply("/bmscreate/init", media_set_body("5"));
    let credentials = test_credentials().with_session_token("preset");
    let mut session =
        Session::with_endpoints(credentials, transport.clone(), Endpoints::new(TEST_BASE_URL));

    session
        .create_media_set("title", sharedbook::Chapter::new("chapter 1", "text"))
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        transport.last_request().params.get("sessionToken"),
        Some("preset")
    );
}

#[tokio::test]
async fn test_malformed_session_token_response() {
    let transport = MockTransport::new().reply("/auth/getSessionToken", MALFORMED_BODY);
    let mut session = test_session(&transport);

    match session.session_token().await {
        Err(ClientError::Response(e)) => {
            assert_eq!(e.operation, "auth/getSessionToken");
            assert_eq!(e.body, MALFORMED_BODY);
        }
        other => panic!("expected a response error, got {:?}", other),
    }
    assert_eq!(session.cached_session_token(), None);
}

#[tokio::test]
async fn test_connect_fetches_token() {
    let transport = MockTransport::new().with_session_token();
    let session = Session::connect(
        test_credentials(),
        transport.clone(),
        Endpoints::new(TEST_BASE_URL),
    )
    .await
    .unwrap();

    assert_eq!(session.cached_session_token(), Some(TEST_SESSION_TOKEN));
    assert_eq!(transport.request_count(), 1);
}

// =============================================================================
// Signed requests
// =============================================================================

#[tokio::test]
async fn test_preview_request_matches_golden_signature() {
    let transport = MockTransport::new()
        .with_session_token()
        .reply("/book/preview", preview_body("http://examp.le/preview"));
    let mut session = test_session(&transport);

    session.book_preview("123", "321").await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(
        request.keys(),
        vec![
            "bmsId",
            "bookId",
            "redirect",
            "apiKey",
            "sessionToken",
            "authToken",
            "signature"
        ]
    );
    assert_eq!(
        request.params.get("signature"),
        Some("5949fa652c1dba35111d978541ecb44e")
    );
}

#[tokio::test]
async fn test_every_request_is_verifiable() {
    let transport = MockTransport::new();
    let mut session = session_with_media_set(&transport, "11235").await;
    transport
        .clone()
        .reply("/bms/addComment", comment_body("c1"))
        .reply("/bmscreate/publish", r#"<bmscreate.publish status="ok" />"#);

    session.publish_media_set("11235").await.unwrap();
    session
        .add_comment(&CommentOptions::new("t", "text", 1, "Joe"))
        .await
        .unwrap();

    let signer = RequestSigner::new(TEST_SECRET_WORD);
    for request in transport.requests() {
        assert_eq!(request.keys().last(), Some(&"signature"));
        assert!(
            signer.verify(&request.params).is_ok(),
            "bad signature on {}",
            request.path()
        );
    }
}

#[tokio::test]
async fn test_auth_fields_follow_operation_fields() {
    let transport = MockTransport::new();
    let mut session = session_with_media_set(&transport, "11235").await;
    transport
        .clone()
        .reply("/bmscreate/publish", r#"<bmscreate.publish status="ok" />"#);

    session.publish_media_set("11235").await.unwrap();

    let request = transport.last_request();
    assert_eq!(
        request.keys(),
        vec!["bmsId", "apiKey", "sessionToken", "authToken", "signature"]
    );
    assert_eq!(request.params.get("sessionToken"), Some(TEST_SESSION_TOKEN));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_contract_violation_reaches_no_transport() {
    let transport = MockTransport::new().with_session_token();
    let mut session = test_session(&transport);

    let result = session
        .add_comment(&CommentOptions::new("title", "text", 1, "Joe"))
        .await;

    match result {
        Err(ClientError::Contract(ContractError::MissingField { operation, field })) => {
            assert_eq!(operation, "bms/addComment");
            assert_eq!(field, "bmsId");
        }
        other => panic!("expected a contract error, got {:?}", other),
    }
    assert_eq!(transport.request_count(), 0);

    assert!(matches!(
        session.book_preview("", "1").await,
        Err(ClientError::Contract(_))
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let transport = MockTransport::new().with_session_token().fail(
        "/bmscreate/init",
        TransportError::Status {
            status: 500,
            url: format!("{}/bmscreate/init", TEST_BASE_URL),
            body: "Internal Server Error".to_string(),
        },
    );
    let mut session = test_session(&transport);

    let result = session
        .create_media_set("title", sharedbook::Chapter::new("chapter 1", "text"))
        .await;

    match result {
        Err(ClientError::Transport(TransportError::Status { status, body, .. })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected a transport error, got {:?}", other),
    }
    assert_eq!(session.state().media_set_id(), None);
}

#[test]
fn test_missing_credentials() {
    assert_eq!(
        Credentials::new("x", "x", "").unwrap_err(),
        CredentialError::MissingAuthToken
    );
    assert_eq!(
        CredentialError::MissingAuthToken.to_string(),
        "Please supply auth_token given from '/auth/login'"
    );
}

// =============================================================================
// Login bootstrap
// =============================================================================

const LOGIN_PAGE: &str = r#"<html><body>You are being <a href="http://examp.le/back?authToken=tok123">redirected</a>.</body></html>"#;

#[tokio::test]
async fn test_bootstrap_credentials() {
    let transport = MockTransport::new().reply("/auth/login", LOGIN_PAGE);
    let bootstrap = LoginBootstrap::new(transport.clone(), Endpoints::new(TEST_BASE_URL), true);

    let credentials = Credentials::bootstrap("key", "secret", &bootstrap)
        .await
        .unwrap();

    assert_eq!(credentials.auth_token(), "tok123");
    let request = transport.last_request();
    assert_eq!(request.method, Method::PostForm);
    assert_eq!(request.path(), "/auth/login");
    assert_eq!(request.keys(), vec!["apiKey"]);
    assert_eq!(request.params.get("apiKey"), Some("key"));
}

#[tokio::test]
async fn test_bootstrap_checks_credentials_first() {
    let transport = MockTransport::new().reply("/auth/login", LOGIN_PAGE);
    let bootstrap = LoginBootstrap::new(transport.clone(), Endpoints::new(TEST_BASE_URL), true);

    let result = Credentials::bootstrap("key", "", &bootstrap).await;
    assert!(matches!(
        result,
        Err(ClientError::Credential(CredentialError::MissingSecretWord))
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_bootstrap_outside_development_still_fetches() {
    let transport = MockTransport::new().reply("/auth/login", LOGIN_PAGE);
    let bootstrap = LoginBootstrap::new(transport.clone(), Endpoints::new(TEST_BASE_URL), false);
    assert!(!bootstrap.is_development());

    let credentials = Credentials::bootstrap("key", "secret", &bootstrap)
        .await
        .unwrap();
    assert_eq!(credentials.auth_token(), "tok123");
}

#[tokio::test]
async fn test_bootstrap_malformed_page() {
    let transport = MockTransport::new().reply("/auth/login", MALFORMED_BODY);
    let bootstrap = LoginBootstrap::new(transport, Endpoints::new(TEST_BASE_URL), true);

    let result = Credentials::bootstrap("key", "secret", &bootstrap).await;
    assert!(matches!(result, Err(ClientError::Response(_))));
}

#[tokio::test]
async fn test_session_token_body_helper_shape() {
    let transport = MockTransport::new().reply("/auth/getSessionToken", session_token_body("zz9"));
    let mut session = test_session(&transport);
    assert_eq!(session.session_token().await.unwrap(), "zz9");
}
