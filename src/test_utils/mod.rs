#![allow(missing_docs)]

//! Shared fixtures for tests: in-memory databases, test servers and registered users.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, PasswordHash, User,
    app_state::DEFAULT_TOKEN_DURATION,
    build_router,
    db::initialize,
    endpoints,
    user::{NewUser, create_user},
};

pub(crate) const TEST_EMAIL: &str = "test@example.com";

/// A password strong enough to pass the strength check.
pub(crate) const TEST_PASSWORD: &str = "Qp8#vLm2!xZr7tWs";

/// The lowest cost bcrypt accepts, to keep tests fast.
const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_db_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "Etc/UTC", DEFAULT_TOKEN_DURATION)
        .expect("Could not create app state")
        .with_password_hash_cost(TEST_HASH_COST)
}

pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_app_state())).expect("Could not create test server.")
}

/// Insert a user directly into the database, skipping registration.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: email.to_owned(),
            currency: "NZD".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user")
}

/// Register a user with [TEST_EMAIL] and [TEST_PASSWORD] and return their bearer token.
pub(crate) async fn register_test_user(server: &TestServer) -> String {
    register_user_with_email(server, TEST_EMAIL).await
}

/// Register a user with `email` and [TEST_PASSWORD] and return their bearer token.
pub(crate) async fn register_user_with_email(server: &TestServer, email: &str) -> String {
    let response = server
        .post(endpoints::REGISTER)
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": TEST_PASSWORD,
            "password_confirmation": TEST_PASSWORD,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("Registration response has no token")
        .to_owned()
}
