use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Response;
use crate::store::{append_row, scan_as, Sheet};

/// Appends one answer attempt. Rows are write-once; repeat submissions for
/// the same interaction each get their own row.
fn handle_submit_response(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let interaction_id = match require_str(req, "interactionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Present but possibly empty: notes have no payload.
    let Some(answer) = req.params.get("answer").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing answer", None);
    };
    let student_id = optional_str(req, "studentId").unwrap_or_else(|| "anon".to_string());
    let score = req.params.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let response = Response {
        id: Uuid::new_v4().to_string(),
        student_id,
        video_id,
        interaction_id,
        answer: answer.to_string(),
        score,
        submitted_at: chrono::Utc::now().to_rfc3339(),
    };
    if let Err(e) = append_row(store, Sheet::Responses, &response) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Responses" })),
        );
    }

    ok(&req.id, json!({ "success": true, "id": response.id }))
}

/// Read side of the response log, for teachers reviewing a video's answers.
fn handle_get_responses(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return ok(&req.id, json!({ "responses": [] }));
    };

    match scan_as::<Response>(store, Sheet::Responses) {
        Ok(all) => {
            let responses: Vec<Response> = all
                .into_iter()
                .filter(|r| r.video_id == video_id)
                .collect();
            ok(&req.id, json!({ "responses": responses }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submitResponse" => Some(handle_submit_response(state, req)),
        "getResponses" => Some(handle_get_responses(state, req)),
        _ => None,
    }
}
