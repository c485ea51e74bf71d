// src/routes.rs

use axum::{
    Router,
    handler::Handler,
    http::Method,
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, comments, explore, films, follows, interaction, notifications, profile, series},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, films, comments, users, series, notifications).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    // Public film routes run behind the optional-auth layer: responses
    // differ for owners (private visibility) when a valid token is sent.
    let film_routes = Router::new()
        .route("/", get(films::list_films))
        .route("/top-films", get(explore::top_films))
        .route("/top-films-by-genre", get(explore::top_films_by_genre))
        .route("/genre/{genre}", get(films::list_films_by_genre))
        .route("/user/{user_id}", get(films::list_user_films))
        .route("/{film_id}", get(films::get_film))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .merge(
            Router::new()
                .route("/feed", get(explore::get_feed))
                .route("/upload", post(films::upload_film))
                .route("/{film_id}/vote", post(interaction::toggle_vote))
                .route("/{film_id}/votes", get(interaction::get_votes))
                .route("/delete/{film_id}", delete(films::delete_film))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    // Same path, split auth: reading comments is public, writing requires
    // a token, so the POST handler alone carries the auth layer.
    let comment_routes = Router::new().route(
        "/film/{film_id}",
        get(comments::list_comments).post(comments::create_comment.layer(
            middleware::from_fn_with_state(state.clone(), auth_middleware),
        )),
    );

    let user_routes = Router::new()
        .route("/{user_id}", get(profile::get_profile))
        .merge(
            Router::new()
                .route("/me", get(profile::get_me).put(profile::update_me))
                .route("/{user_id}/follow", post(follows::follow_user))
                .route("/{user_id}/unfollow", post(follows::unfollow_user))
                .route("/{user_id}/is-following", get(follows::is_following))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let series_routes = Router::new()
        .route("/{series_id}", get(series::get_series))
        .merge(
            Router::new()
                .route("/add", post(series::create_series))
                .route("/{series_id}/films", post(series::add_film_to_series))
                .route("/user/{user_id}", get(series::list_user_series))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let notification_routes = Router::new()
        .route("/", get(notifications::list_notifications))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/films", film_routes)
        .nest("/api/comments", comment_routes)
        .nest("/api/users", user_routes)
        .nest("/api/series", series_routes)
        .nest("/api/notifications", notification_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
