mod tokens;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // User routes
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/{id}/tokens",
            get(users::list_user_tokens).post(users::create_user_token),
        )
        // Token routes
        .route("/tokens", get(tokens::list_tokens))
        .route("/tokens/{id}", delete(tokens::delete_token))
}
