// tests/api_tests.rs

use filmshare::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // Note: For Postgres, you must have a running database.
    // We'll read from DATABASE_URL environment variable.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        top_creator_interval_secs: 3600,
    };

    let state = AppState { pool, config };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a fresh user and returns (token, user_id).
async fn signup_user(client: &reqwest::Client, address: &str) -> (String, i64) {
    let unique = &uuid::Uuid::new_v4().to_string()[..8];
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": format!("u_{}", unique),
            "email": format!("u_{}@example.com", unique),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Signup failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse signup json");

    let token = response["token"].as_str().expect("Token not found").to_string();
    let user_id = response["user"]["id"].as_i64().expect("User id not found");
    (token, user_id)
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn signup_works_and_returns_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let unique = &uuid::Uuid::new_v4().to_string()[..8];

    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": format!("u_{}", unique),
            "email": format!("u_{}@example.com", unique),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert!(body["user"]["id"].as_i64().is_some());
    // The password hash must never be serialized
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn signup_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short and email invalid
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": "yo",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let unique = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("u_{}@example.com", unique);

    client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": format!("u_{}", unique),
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn upload_requires_auth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/films/upload", address))
        .json(&serde_json::json!({
            "title": "No token",
            "film_url": "https://cdn.example.com/f.mp4",
            "genre": "drama"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn uploaded_film_is_listed_but_not_top_ranked() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, user_id) = signup_user(&client, &address).await;

    // Upload a public film; rank stays NULL.
    let title = format!("Film {}", &uuid::Uuid::new_v4().to_string()[..8]);
    let upload = client
        .post(format!("{}/api/films/upload", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": title,
            "film_url": "https://cdn.example.com/f.mp4",
            "genre": "drama",
            "duration_secs": 420,
            "visibility": "public"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(upload.status().as_u16(), 201);
    let film: serde_json::Value = upload.json().await.unwrap();
    let film_id = film["id"].as_i64().unwrap();
    assert!(film["rank"].is_null());

    // Appears in the global listing
    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/api/films", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().any(|f| f["id"].as_i64() == Some(film_id)));

    // Appears in the uploader's listing
    let by_user: Vec<serde_json::Value> = client
        .get(format!("{}/api/films/user/{}", address, user_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(by_user.iter().any(|f| f["id"].as_i64() == Some(film_id)));

    // Never in top-films while unranked
    let top: Vec<serde_json::Value> = client
        .get(format!("{}/api/films/top-films", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(top.iter().all(|f| f["id"].as_i64() != Some(film_id)));
    assert!(top.iter().all(|f| !f["rank"].is_null()));
}

#[tokio::test]
async fn private_film_is_hidden_from_strangers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _user_id) = signup_user(&client, &address).await;

    let upload: serde_json::Value = client
        .post(format!("{}/api/films/upload", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Secret cut",
            "film_url": "https://cdn.example.com/secret.mp4",
            "genre": "drama",
            "visibility": "private"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let film_id = upload["id"].as_i64().unwrap();

    // Anonymous fetch: 404, existence is not revealed
    let anon = client
        .get(format!("{}/api/films/{}", address, film_id))
        .send()
        .await
        .unwrap();
    assert_eq!(anon.status().as_u16(), 404);

    // Owner fetch: 200
    let owner = client
        .get(format!("{}/api/films/{}", address, film_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(owner.status().as_u16(), 200);

    // Not in the public listing either
    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/api/films", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().all(|f| f["id"].as_i64() != Some(film_id)));
}

#[tokio::test]
async fn delete_film_is_owner_only() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (owner_token, _) = signup_user(&client, &address).await;
    let (stranger_token, _) = signup_user(&client, &address).await;

    let upload: serde_json::Value = client
        .post(format!("{}/api/films/upload", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({
            "title": "Mine",
            "film_url": "https://cdn.example.com/mine.mp4",
            "genre": "comedy"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let film_id = upload["id"].as_i64().unwrap();

    let forbidden = client
        .delete(format!("{}/api/films/delete/{}", address, film_id))
        .header("Authorization", format!("Bearer {}", stranger_token))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let deleted = client
        .delete(format!("{}/api/films/delete/{}", address, film_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/films/{}", address, film_id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}
