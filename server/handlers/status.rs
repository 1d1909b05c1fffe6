use serde_json::json;

use crate::routes::{json_response, HttpResponse};
use crate::state::SharedState;

/// GET /api/status
pub fn handle_status(state: &SharedState) -> HttpResponse {
    let status = state.predictor.artifacts().status();
    let ready = state.predictor.artifacts().ready().is_some();
    json_response(
        200,
        &json!({
            "ready": ready,
            "artifacts": status,
            "n_classes": status.classes.len(),
        }),
    )
}
