use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use clinica_auth::auth_routes;

use crate::{
    handlers::{
        admin::{cache_stats, clear_cache, invalidate_cache_group},
        consultas::{
            create_consulta, delete_consulta, get_consulta, list_consultas, list_consultas_hoy,
            update_consulta,
        },
        health::livez,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api_routes = Router::new()
        .route("/consultas", get(list_consultas).post(create_consulta))
        .route("/consultas/hoy", get(list_consultas_hoy))
        .route(
            "/consultas/{id}",
            get(get_consulta)
                .put(update_consulta)
                .delete(delete_consulta),
        )
        .route("/admin/cache", get(cache_stats).delete(clear_cache))
        .route("/admin/cache/{group}", delete(invalidate_cache_group))
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
