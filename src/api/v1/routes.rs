/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route ごとに guard を 0 or 1 個だけ付ける (route_layer)
 * - /todos/history は /todos/{todo_id} より先に宣言する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::guards::{
    require_authenticated, require_matching_subject, require_resource_owner,
};
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{issue_token, register},
    categories::{get_category, list_categories},
    health::health,
    todos::{
        create_todo, delete_todo, get_todo, list_open_todos, list_todo_history, update_todo,
    },
    users::{delete_user, get_user, update_user},
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/token", post(issue_token))
        .route("/auth/register", post(register))
        .route(
            "/users/{user_id}",
            require_matching_subject(
                get(get_user).patch(update_user).delete(delete_user),
                "user_id",
            ),
        )
        .route("/categories", require_authenticated(get(list_categories)))
        .route(
            "/categories/{category_id}",
            require_authenticated(get(get_category)),
        )
        .route(
            "/todos",
            require_authenticated(get(list_open_todos).post(create_todo)),
        )
        .route("/todos/history", require_authenticated(get(list_todo_history)))
        .route(
            "/todos/{todo_id}",
            require_resource_owner(
                get(get_todo).patch(update_todo).delete(delete_todo),
                state.todo_owners.clone(),
                "todo_id",
            ),
        )
}
