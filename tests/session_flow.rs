//! End-to-end session flows against a mock storefront API.

use anyhow::{anyhow, Result};
use secrecy::SecretString;
use serde_json::json;
use std::{net::TcpListener, sync::Arc, time::Duration};
use storefront::{
    api::{ApiClient, ApiConfig},
    routes::{Page, Resolution, Router},
    session::{
        mirror::{KEY_IS_AUTHENTICATED, KEY_USER},
        Credentials, SessionController, SessionError, SessionState, UserRecord,
    },
    storage::{MemoryStorage, SessionStorage},
};
use tokio::time::timeout;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn api_for(server: &MockServer) -> Result<ApiClient> {
    let config = ApiConfig::new(&server.uri())?;
    Ok(ApiClient::new(&config)?)
}

fn controller(api: &ApiClient, storage: &MemoryStorage) -> Arc<SessionController> {
    Arc::new(SessionController::new(
        Arc::new(api.clone()),
        Arc::new(storage.clone()),
    ))
}

fn ben() -> Result<Credentials> {
    Ok(Credentials::new(
        "ben@ben.com",
        SecretString::from("password".to_string()),
    )?)
}

async fn mount_sign_in(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_json(json!({ "email": "ben@ben.com", "password": "password" })))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("set-cookie", "session=abc123; Path=/; HttpOnly")
                .set_body_json(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_persists_profile_and_replays_cookie() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "session=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "email": "ben@ben.com" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);

    let user = session.sign_in(&ben()?).await?;
    assert_eq!(
        user,
        UserRecord {
            id: Some(1),
            email: "ben@ben.com".to_string(),
            name: None,
        }
    );

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(user));
    assert!(!state.loading);
    assert_eq!(state.error, None);

    assert_eq!(storage.get_item(KEY_IS_AUTHENTICATED).as_deref(), Some("true"));
    assert_eq!(
        storage.get_item(KEY_USER).as_deref(),
        Some(r#"{"id":1,"email":"ben@ben.com"}"#)
    );
    Ok(())
}

#[tokio::test]
async fn sign_in_without_profile_keeps_submitted_email() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);
    session.sign_in(&ben()?).await?;

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(UserRecord::from_email("ben@ben.com")));
    assert_eq!(
        storage.get_item(KEY_USER).as_deref(),
        Some(r#"{"email":"ben@ben.com"}"#)
    );
    Ok(())
}

#[tokio::test]
async fn rejected_sign_in_surfaces_server_message() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 401, json!({ "message": "Invalid credentials" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    storage.set_item(KEY_IS_AUTHENTICATED, "true")?;
    storage.set_item(KEY_USER, r#"{"email":"old@ben.com"}"#)?;
    let session = controller(&api_for(&server)?, &storage);

    let err = session
        .sign_in(&ben()?)
        .await
        .err()
        .ok_or_else(|| anyhow!("expected sign-in to fail"))?;
    assert!(matches!(err, SessionError::SignIn { ref message, .. } if message == "Invalid credentials"));

    let state = session.snapshot();
    assert!(!state.is_authenticated);
    assert_eq!(state.user, None);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(!state.loading);
    assert!(storage.is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_sign_in_without_message_uses_generic_text() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 401, json!({ "error": "Unauthorized" })).await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);

    let err = session
        .sign_in(&ben()?)
        .await
        .err()
        .ok_or_else(|| anyhow!("expected sign-in to fail"))?;
    assert!(matches!(err, SessionError::SignIn { ref message, .. } if message == "Login failed"));
    assert_eq!(session.snapshot().error.as_deref(), Some("Login failed"));
    Ok(())
}

#[tokio::test]
async fn sign_in_with_empty_success_body_is_accepted() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "session=abc123; Path=/; HttpOnly"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "session=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "email": "ben@ben.com" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);
    session.sign_in(&ben()?).await?;

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.error, None);
    assert_eq!(storage.get_item(KEY_IS_AUTHENTICATED).as_deref(), Some("true"));
    Ok(())
}

#[tokio::test]
async fn startup_check_with_expired_session_clears_mirror() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Unauthorized" })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    storage.set_item(KEY_IS_AUTHENTICATED, "true")?;
    storage.set_item(KEY_USER, r#"{"id":1,"email":"ben@ben.com"}"#)?;
    let session = controller(&api_for(&server)?, &storage);

    assert_eq!(
        session.restored_user(),
        Some(UserRecord {
            id: Some(1),
            email: "ben@ben.com".to_string(),
            name: None,
        })
    );

    session.initialize().await;
    session.initialize().await;

    assert_eq!(
        session.snapshot(),
        SessionState {
            is_authenticated: false,
            user: None,
            loading: false,
            error: None,
            is_initialized: true,
        }
    );
    assert!(storage.is_empty());
    Ok(())
}

#[tokio::test]
async fn sign_out_clears_local_state_whatever_the_server_says() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    for status in [200_u16, 500] {
        let server = MockServer::start().await;
        mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "email": "ben@ben.com" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/signout"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": "bye" })))
            .expect(1)
            .mount(&server)
            .await;

        let storage = MemoryStorage::new();
        let session = controller(&api_for(&server)?, &storage);
        session.sign_in(&ben()?).await?;
        session.sign_out().await;

        let state = session.snapshot();
        assert!(!state.is_authenticated, "status {status}");
        assert_eq!(state.user, None);
        assert_eq!(storage.get_item(KEY_IS_AUTHENTICATED), None);
        assert_eq!(storage.get_item(KEY_USER), None);
    }
    Ok(())
}

#[tokio::test]
async fn sign_out_survives_unreachable_server() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    // Reserve a port, then release it so nothing is listening there.
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let config = ApiConfig::new(&format!("http://127.0.0.1:{port}"))?
        .with_timeout(Duration::from_secs(2));
    let api = ApiClient::new(&config)?;

    let storage = MemoryStorage::new();
    storage.set_item(KEY_IS_AUTHENTICATED, "true")?;
    storage.set_item(KEY_USER, r#"{"email":"ben@ben.com"}"#)?;
    let session = controller(&api, &storage);

    session.sign_out().await;

    let state = session.snapshot();
    assert!(!state.is_authenticated);
    assert_eq!(state.user, None);
    assert!(storage.is_empty());
    Ok(())
}

#[tokio::test]
async fn pending_sign_out_holds_protected_navigation() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "ben@ben.com" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/signout"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "bye" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);
    session.initialize().await;
    session.sign_in(&ben()?).await?;

    let mut state = session.subscribe();
    let signing_out = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.sign_out().await }
    });

    let during = {
        let seen = timeout(WAIT, state.wait_for(|state| state.loading)).await??;
        seen.clone()
    };
    assert!(during.is_authenticated);
    assert_eq!(storage.get_item(KEY_IS_AUTHENTICATED).as_deref(), Some("true"));

    let router = Router::new(session.subscribe());
    assert_eq!(
        timeout(WAIT, router.navigate("/add-product")).await?,
        Resolution::Redirect("/signin?returnUrl=%2Fadd-product".to_string())
    );

    timeout(WAIT, signing_out).await??;
    let after = session.snapshot();
    assert!(!after.loading);
    assert!(!after.is_authenticated);
    assert!(storage.is_empty());
    Ok(())
}

#[tokio::test]
async fn protected_route_waits_for_startup_check() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);
    let router = Router::new(session.subscribe());

    let navigation = tokio::spawn(async move { router.navigate("/add-product").await });
    session.initialize().await;

    let resolution = timeout(WAIT, navigation).await??;
    assert_eq!(
        resolution,
        Resolution::Redirect("/signin?returnUrl=%2Fadd-product".to_string())
    );
    assert_eq!(
        Router::after_sign_in("/signin?returnUrl=%2Fadd-product"),
        "/add-product"
    );
    Ok(())
}

#[tokio::test]
async fn signed_in_session_opens_protected_pages() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "ben@ben.com" })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let session = controller(&api_for(&server)?, &storage);
    session.initialize().await;
    session.sign_in(&ben()?).await?;

    let router = Router::new(session.subscribe());
    assert_eq!(
        router.navigate("/product/5").await,
        Resolution::Render(Page::ProductDetails { id: 5 })
    );
    assert_eq!(
        router.navigate("/signin").await,
        Resolution::Redirect("/".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn tabs_follow_each_other_through_storage_events() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_sign_in(&server, 200, json!({ "message": "Signed in" })).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "session=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "email": "ben@ben.com" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/signout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "bye" })))
        .mount(&server)
        .await;

    // Tabs of one browser session share cookies and the storage area.
    let api = api_for(&server)?;
    let storage = MemoryStorage::new();
    let tab_a = controller(&api, &storage);
    let tab_b = controller(&api, &storage);
    let sync = Arc::clone(&tab_b).spawn_storage_sync(storage.subscribe());
    let mut tab_b_state = tab_b.subscribe();

    tab_a.sign_in(&ben()?).await?;
    timeout(WAIT, tab_b_state.wait_for(|state| state.is_authenticated)).await??;
    assert_eq!(
        tab_b.snapshot().user.map(|user| user.email),
        Some("ben@ben.com".to_string())
    );

    tab_a.sign_out().await;
    timeout(WAIT, tab_b_state.wait_for(|state| !state.is_authenticated)).await??;
    assert_eq!(tab_b.snapshot().user, None);

    sync.abort();
    Ok(())
}
