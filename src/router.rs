use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

/// 组装全部路由
pub fn app(state: AppState) -> Router {
    // 公开路由
    let public_routes = Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/login/access-token", post(routes::login::login_access_token));

    // 需要认证的路由
    let protected_routes = Router::new()
        .route("/login/test-token", post(routes::login::test_token))
        .route(
            "/users/me",
            get(routes::user::read_me)
                .patch(routes::user::update_me)
                .delete(routes::user::delete_me),
        )
        .route("/users/me/password", patch(routes::user::update_password_me))
        .route(
            "/files/",
            post(routes::file::create_file).get(routes::file::read_files),
        )
        .route(
            "/files/{file_id}",
            get(routes::file::read_file)
                .put(routes::file::update_file)
                .delete(routes::file::delete_file),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let router = Router::new()
        .nest(
            &state.config.api_base_uri,
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .layer(from_fn(log_errors));

    // 开发模式允许所有来源
    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    router.with_state(state)
}
