use serde_json::json;
use uuid::Uuid;

use crate::authoring::{format_timestamp, AuthoringSession};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Interaction, InteractionKind, Video};
use crate::playback::QueuedPlayer;
use crate::store::{append_row, scan_as, Sheet};
use crate::timeline::Timeline;
use crate::youtube;

/// Opens the teacher authoring view for a video: same player-handle plumbing
/// as lesson sessions, but driving drafts instead of prompts.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let videos: Vec<Video> = match scan_as(store, Sheet::Videos) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let Some(video) = videos.into_iter().find(|v| v.id == video_id) else {
        return err(&req.id, "not_found", "Video not found", None);
    };

    let interactions: Vec<Interaction> = match scan_as(store, Sheet::Interactions) {
        Ok(all) => all
            .into_iter()
            .filter(|i: &Interaction| i.video_id == video_id)
            .collect(),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let mut timeline = Timeline::new();
    timeline.load(interactions);

    let editor = AuthoringSession::new(video_id, timeline, QueuedPlayer::default());
    let interactions = json!(editor.interactions());
    let session_id = Uuid::new_v4().to_string();
    state.editors.insert(session_id.clone(), editor);

    ok(
        &req.id,
        json!({
            "sessionId": session_id,
            "video": {
                "id": video.id,
                "url": video.url,
                "title": video.title,
                "createdAt": video.created_at,
                "youtubeId": youtube::video_id(&video.url),
            },
            "interactions": interactions,
        }),
    )
}

fn handle_tick(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let position = req.params.get("position").and_then(|v| v.as_f64());
    let duration = req.params.get("duration").and_then(|v| v.as_f64());

    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    editor.player_mut().report(position, duration);

    ok(
        &req.id,
        json!({ "commands": editor.player_mut().drain_commands() }),
    )
}

fn handle_begin_draft(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };

    let Some(draft) = editor.begin_draft() else {
        return err(&req.id, "bad_state", "player not ready", None);
    };
    let draft_json = json!(draft);
    let timecode = format_timestamp(draft.timestamp);

    ok(
        &req.id,
        json!({
            "draft": draft_json,
            "timecode": timecode,
            "commands": editor.player_mut().drain_commands(),
        }),
    )
}

/// Applies the form fields to the open draft and commits it into the
/// timeline.
fn handle_commit_draft(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    let Some(draft) = editor.draft_mut() else {
        return err(&req.id, "bad_state", "no draft in progress", None);
    };

    if let Some(question) = req.params.get("question").and_then(|v| v.as_str()) {
        draft.question = question.to_string();
    }
    if let Some(kind) = req.params.get("type").and_then(|v| v.as_str()) {
        draft.kind = match kind {
            "mc" => {
                let options = req
                    .params
                    .get("options")
                    .and_then(|v| v.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|o| o.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_else(|| match &draft.kind {
                        InteractionKind::MultipleChoice { options, .. } => options.clone(),
                        _ => Vec::new(),
                    });
                let correct_answer = req
                    .params
                    .get("correctAnswer")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as usize;
                InteractionKind::MultipleChoice {
                    options,
                    correct_answer,
                }
            }
            "open" => InteractionKind::Open,
            "note" => InteractionKind::Note,
            _ => {
                return err(
                    &req.id,
                    "bad_params",
                    "type must be \"mc\", \"open\" or \"note\"",
                    None,
                )
            }
        };
    }

    editor.commit_draft();
    ok(
        &req.id,
        json!({
            "interactions": editor.interactions(),
            "commands": editor.player_mut().drain_commands(),
        }),
    )
}

fn handle_cancel_draft(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    editor.cancel_draft();
    ok(
        &req.id,
        json!({ "commands": editor.player_mut().drain_commands() }),
    )
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let interaction_id = match require_str(req, "interactionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    editor.delete(&interaction_id);
    ok(&req.id, json!({ "interactions": editor.interactions() }))
}

fn handle_jump_to(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let interaction_id = match require_str(req, "interactionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(editor) = state.editors.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    if !editor.jump_to(&interaction_id) {
        return err(&req.id, "not_found", "interaction not found", None);
    }
    ok(
        &req.id,
        json!({ "commands": editor.player_mut().drain_commands() }),
    )
}

/// Persists the edited timeline through the same append/replace choice as
/// `saveInteractions`.
fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mode = optional_str(req, "mode").unwrap_or_else(|| "append".to_string());
    if mode != "append" && mode != "replace" {
        return err(
            &req.id,
            "bad_params",
            "mode must be \"append\" or \"replace\"",
            None,
        );
    }

    let Some(editor) = state.editors.get(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };
    let video_id = editor.video_id().to_string();
    let rows: Vec<Interaction> = editor.interactions().to_vec();

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    if mode == "replace" {
        if let Err(e) = store.retain(Sheet::Interactions, &mut |row| {
            row.get("videoId").and_then(|v| v.as_str()) != Some(video_id.as_str())
        }) {
            return err(&req.id, "db_delete_failed", e.to_string(), None);
        }
    }
    for interaction in &rows {
        if let Err(e) = append_row(store, Sheet::Interactions, interaction) {
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "sheet": "Interactions" })),
            );
        }
    }

    ok(&req.id, json!({ "success": true, "count": rows.len() }))
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let existed = state.editors.remove(&session_id).is_some();
    ok(&req.id, json!({ "closed": existed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "editor.open" => Some(handle_open(state, req)),
        "editor.tick" => Some(handle_tick(state, req)),
        "editor.beginDraft" => Some(handle_begin_draft(state, req)),
        "editor.commitDraft" => Some(handle_commit_draft(state, req)),
        "editor.cancelDraft" => Some(handle_cancel_draft(state, req)),
        "editor.deleteInteraction" => Some(handle_delete(state, req)),
        "editor.jumpTo" => Some(handle_jump_to(state, req)),
        "editor.save" => Some(handle_save(state, req)),
        "editor.close" => Some(handle_close(state, req)),
        _ => None,
    }
}
