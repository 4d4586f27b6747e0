use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::{self, AppConfig};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{authenticate, authorize, ADMIN_ONLY};

/// Full application router: the JSON API under `/api`, plus the built
/// frontend when a static directory is configured.
pub fn app() -> Router {
    let config = config::config();

    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .fallback(api_not_found);

    let mut router = Router::new().nest("/api", api);

    if let Some(dir) = &config.api.static_dir {
        let index = ServeFile::new(format!("{}/index.html", dir.trim_end_matches('/')));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    // Json extractors cap bodies at 2MB unless told otherwise
    router
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/health", get(public::health::health_get))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/seed", post(auth::seed_post))
}

fn protected_routes() -> Router {
    use protected::{articles, auth, categories, users};

    // Any authenticated member of the organization
    let member = Router::new()
        .route("/auth/me", get(auth::me_get))
        .route("/articles", get(articles::list))
        .route("/articles/:id", get(articles::get))
        .route("/categories", get(categories::list))
        .route("/categories/:id", get(categories::get));

    let admin = Router::new()
        .route("/articles", post(articles::create))
        .route("/articles/:id", put(articles::update).delete(articles::delete))
        .route("/categories", post(categories::create))
        .route("/categories/:id", put(categories::update).delete(categories::delete))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", put(users::update).delete(users::delete))
        .route_layer(from_fn_with_state(ADMIN_ONLY, authorize));

    // authenticate wraps authorize, so the role check sees the identity
    member.merge(admin).route_layer(from_fn(authenticate))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found")
}
