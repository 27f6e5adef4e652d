//! Auth context lifecycle, background refresh and role routing.

use std::sync::Arc;
use std::time::Duration;

use fumigation_client::session::FileStorage;
use fumigation_client::testing::{login_body, mock_user, MockTransport};
use fumigation_client::{
    ApiClient, AuthState, ClientConfig, Guarded, LoginResponse, MemoryStorage, Platform, Route,
    SessionManager, TokenStore, User, ROLE_ADMIN, ROLE_CLIENT, ROLE_TECHNICIAN,
};
use reqwest::Method;
use serde_json::json;

const LOGIN: &str = "/auth/login";
const ME: &str = "/users/me";

fn config() -> ClientConfig {
    ClientConfig::new("http://mock.local").with_refresh_interval(Duration::from_secs(600))
}

fn manager_with(transport: &MockTransport, store: Arc<TokenStore>) -> SessionManager {
    let config = config();
    let api = Arc::new(ApiClient::new(Arc::new(transport.clone()), store, &config));
    SessionManager::new(api, &config)
}

fn manager(transport: &MockTransport) -> SessionManager {
    manager_with(transport, Arc::new(TokenStore::in_memory(Platform::Web)))
}

fn technician() -> User {
    mock_user("tech@example.com", &[ROLE_TECHNICIAN])
}

fn answer(token: &str, user: &User) -> LoginResponse {
    LoginResponse {
        token: token.to_string(),
        token_type: Some("Bearer".to_string()),
        user: Some(user.clone()),
        refresh_token: None,
    }
}

#[tokio::test]
async fn login_then_logout() {
    let session = manager(&MockTransport::new());
    session.init().await;

    let user = session.login(answer("abc", &technician()), false).unwrap();

    assert_eq!(user, technician());
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("abc"));
    assert!(session.has_role(&[ROLE_TECHNICIAN]));
    assert!(!session.has_role(&[ROLE_ADMIN]));

    session.logout();

    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
    assert_eq!(session.user(), None);
    assert_eq!(session.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn login_without_user_is_rejected() {
    let session = manager(&MockTransport::new());
    let mut data = answer("abc", &technician());
    data.user = None;

    assert!(session.login(data, false).is_err());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn starts_loading_until_init() {
    let session = manager(&MockTransport::new());

    assert_eq!(session.state(), AuthState::Loading);
    assert_eq!(session.guard(&[ROLE_ADMIN], |_| ()), Guarded::Waiting);

    assert_eq!(session.init().await, AuthState::Unauthenticated);
    assert_eq!(session.guard(&[ROLE_ADMIN], |_| ()), Guarded::RedirectToLogin);
}

#[tokio::test]
async fn init_without_stored_session_skips_verification() {
    let transport = MockTransport::new();
    let session = manager(&transport);

    session.init().await;

    assert_eq!(transport.call_count(&Method::GET, ME), 0);
}

#[tokio::test]
async fn init_verifies_stored_session_and_refreshes_user() {
    let fresh = json!({"id": 1, "nombre": "Rosa", "correo": "tech@example.com", "roles": ["ROLE_TECHNICIAN", "ROLE_ADMIN"]});
    let transport = MockTransport::new().with_json(Method::GET, ME, 200, fresh);
    let store = Arc::new(TokenStore::in_memory(Platform::Mobile));
    store.set("stored", None, &technician(), true);
    let session = manager_with(&transport, store.clone());

    let state = session.init().await;

    let user = state.user().expect("should be signed in");
    assert_eq!(user.first_name, "Rosa");
    assert!(user.has_role(&[ROLE_ADMIN]));
    assert_eq!(store.user().map(|u| u.first_name), Some("Rosa".to_string()));
    assert_eq!(session.landing_route(), Route::AdminDashboard);
    assert_eq!(
        transport.authorizations(&Method::GET, ME),
        vec![Some("Bearer stored".to_string())]
    );
}

#[tokio::test]
async fn init_with_rejected_token_clears_storage() {
    let transport = MockTransport::new().with_response(Method::GET, ME, 401, "");
    let store = Arc::new(TokenStore::in_memory(Platform::Mobile));
    store.set("stale", None, &technician(), true);
    let session = manager_with(&transport, store.clone());

    assert_eq!(session.init().await, AuthState::Unauthenticated);
    assert_eq!(store.token(), None);
    assert_eq!(transport.call_count(&Method::POST, LOGIN), 0);
}

#[tokio::test]
async fn init_with_unreachable_backend_signs_out() {
    let transport = MockTransport::new().with_error(
        Method::GET,
        ME,
        fumigation_client::http::TransportError::Connection("refused".into()),
    );
    let store = Arc::new(TokenStore::in_memory(Platform::Mobile));
    store.set("stored", None, &technician(), true);
    let session = manager_with(&transport, store.clone());

    assert_eq!(session.init().await, AuthState::Unauthenticated);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn sign_in_stores_session_and_routes_by_role() {
    let client = mock_user("client@example.com", &[ROLE_CLIENT]);
    let transport =
        MockTransport::new().with_json(Method::POST, LOGIN, 200, login_body("c1", &client));
    let session = manager(&transport);
    session.init().await;

    let response = session
        .sign_in("client@example.com", "secret", false)
        .await
        .unwrap();

    assert_eq!(response.into_data(), Some(client));
    assert_eq!(session.landing_route(), Route::ClientApplications);
    assert!(session.guard(&[ROLE_CLIENT], |_| ()).is_rendered());
    match session.guard(&[ROLE_ADMIN], |_| ()) {
        Guarded::AccessDenied(denied) => assert_eq!(denied.login, Route::Login),
        other => panic!("expected denial, got {:?}", other),
    }
}

#[tokio::test]
async fn sign_in_without_user_forgets_the_password() {
    let transport =
        MockTransport::new().with_json(Method::POST, LOGIN, 200, json!({"token": "t1"}));
    let session = manager(&transport);
    session.init().await;

    assert!(session
        .sign_in("tech@example.com", "secret", false)
        .await
        .is_err());

    assert!(session.api().cached_credential().is_none());
    assert!(!session.is_authenticated());
    assert!(!session.is_refreshing());
}

#[tokio::test]
async fn failed_sign_in_leaves_state_unauthenticated() {
    let transport = MockTransport::new().with_response(Method::POST, LOGIN, 401, "");
    let session = manager(&transport);
    session.init().await;

    let response = session.sign_in("x@example.com", "bad", true).await.unwrap();

    assert_eq!(response.message(), Some("incorrect username or password"));
    assert_eq!(session.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn forced_logout_is_visible_to_the_router() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()))
        .with_response(Method::GET, "/fumigations/assigned", 401, "")
        .with_response(Method::POST, LOGIN, 401, "");
    let session = manager(&transport);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();
    let mut updates = session.subscribe();

    let response = session.api().lots().assigned().await.unwrap();

    assert!(!response.is_success());
    assert_eq!(session.state(), AuthState::Unauthenticated);
    assert_eq!(
        session.guard(&[ROLE_TECHNICIAN], |_| ()),
        Guarded::RedirectToLogin
    );
    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow(), AuthState::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn refresh_timer_renews_token_in_background() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()))
        .with_json(Method::POST, LOGIN, 200, login_body("t2", &technician()));
    let session = manager(&transport);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();
    assert!(session.is_refreshing());

    tokio::time::sleep(Duration::from_secs(601)).await;

    assert_eq!(transport.call_count(&Method::POST, LOGIN), 2);
    assert_eq!(session.token().as_deref(), Some("t2"));
    assert!(session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn refresh_failure_keeps_the_session() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()))
        .with_response(Method::POST, LOGIN, 500, "down");
    let session = manager(&transport);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(1201)).await;

    assert_eq!(transport.call_count(&Method::POST, LOGIN), 3);
    assert_eq!(session.token().as_deref(), Some("t1"));
    assert!(session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn zero_refresh_interval_disables_the_timer() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()));
    let config = config().with_refresh_interval(Duration::ZERO);
    let store = Arc::new(TokenStore::in_memory(Platform::Web));
    let api = Arc::new(ApiClient::new(Arc::new(transport.clone()), store, &config));
    let session = SessionManager::new(api, &config);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();

    assert!(!session.is_refreshing());
    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(transport.call_count(&Method::POST, LOGIN), 1);
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("t1"));
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_the_refresh_timer() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()));
    let session = manager(&transport);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();

    session.teardown();
    tokio::time::sleep(Duration::from_secs(1800)).await;

    assert_eq!(transport.call_count(&Method::POST, LOGIN), 1);
    assert!(!session.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn logout_stops_the_refresh_timer() {
    let transport = MockTransport::new()
        .with_json(Method::POST, LOGIN, 200, login_body("t1", &technician()));
    let session = manager(&transport);
    session.init().await;
    session
        .sign_in("tech@example.com", "secret", false)
        .await
        .unwrap();

    session.logout();
    tokio::time::sleep(Duration::from_secs(1800)).await;

    assert_eq!(transport.call_count(&Method::POST, LOGIN), 1);
}

#[tokio::test]
async fn remembered_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let durable = || -> Arc<TokenStore> {
        Arc::new(TokenStore::new(
            Arc::new(FileStorage::in_dir(dir.path())),
            Arc::new(MemoryStorage::new()),
            Platform::Web,
            Default::default(),
        ))
    };

    let transport = MockTransport::new().with_json(Method::GET, ME, 200, json!(technician()));
    {
        let session = manager_with(&transport, durable());
        session.init().await;
        session.login(answer("kept", &technician()), true).unwrap();
        session.teardown();
    }

    let session = manager_with(&transport, durable());
    let state = session.init().await;

    assert!(state.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("kept"));
}

#[tokio::test]
async fn unremembered_web_session_does_not_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = |scoped: Arc<MemoryStorage>| -> Arc<TokenStore> {
        Arc::new(TokenStore::new(
            Arc::new(FileStorage::in_dir(dir.path())),
            scoped,
            Platform::Web,
            Default::default(),
        ))
    };

    let transport = MockTransport::new();
    {
        let session = manager_with(&transport, store(Arc::new(MemoryStorage::new())));
        session.init().await;
        session.login(answer("tab", &technician()), false).unwrap();
        assert!(session.is_authenticated());
    }

    let session = manager_with(&transport, store(Arc::new(MemoryStorage::new())));
    assert_eq!(session.init().await, AuthState::Unauthenticated);
}
