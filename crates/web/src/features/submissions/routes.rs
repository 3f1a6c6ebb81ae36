use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use storage::Database;

use super::handlers::{
    create_submission, delete_submission, list_athletes, list_submissions, update_submission,
};
use crate::middleware::auth::{ApiKeys, require_auth};

/// Mounted under `/api/competitions/:handle`
pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/submissions", post(create_submission))
        .route("/submissions/:submission_id", put(update_submission))
        .route("/submissions/:submission_id", delete(delete_submission))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/submissions", get(list_submissions))
        .route("/athletes", get(list_athletes))
        .merge(protected)
}
