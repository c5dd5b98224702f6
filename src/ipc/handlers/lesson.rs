use std::time::Instant;

use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Interaction, Response, Video};
use crate::playback::QueuedPlayer;
use crate::session::{LessonSession, TickOutcome};
use crate::store::{append_row, scan_as, Sheet};
use crate::timeline::Timeline;
use crate::youtube;

/// Loads a video and its timeline into a fresh session. Each open lesson
/// view holds exactly one session id and closes it on navigation.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = optional_str(req, "studentId").unwrap_or_else(|| "anon".to_string());

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

    let session = LessonSession::new(
        video_id.clone(),
        student_id,
        timeline,
        QueuedPlayer::default(),
    );
    let interactions = json!(session.timeline().as_slice());
    let session_id = Uuid::new_v4().to_string();
    state.sessions.insert(session_id.clone(), session);

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

/// One poll tick: the shell reports the player position (omitted while the
/// player is not ready) and applies the returned commands to its player.
fn handle_tick(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let position = req.params.get("position").and_then(|v| v.as_f64());
    let duration = req.params.get("duration").and_then(|v| v.as_f64());

    let Some(session) = state.sessions.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };

    session.player_mut().report(position, duration);
    let outcome = session.tick(Instant::now());
    let commands = session.player_mut().drain_commands();

    let mut result = json!({
        "phase": session.phase().name(),
        "feedback": session.feedback(),
        "commands": commands,
    });
    match outcome {
        TickOutcome::Waiting => {}
        TickOutcome::Prompted(interaction) => {
            result["prompt"] = json!(interaction);
        }
        TickOutcome::Resumed { completed_id } => {
            result["completedId"] = json!(completed_id);
        }
    }

    ok(&req.id, result)
}

fn handle_submit_answer(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Absent for notes; they carry no payload.
    let answer = req
        .params
        .get("answer")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let Some(session) = state.sessions.get_mut(&session_id) else {
        return err(&req.id, "not_found", "unknown session", None);
    };

    let attempt = match session.submit_answer(answer, Instant::now()) {
        Ok(a) => a,
        Err(e) => return err(&req.id, "bad_state", e.to_string(), None),
    };

    // Fire-and-forget: a dropped write never reaches the state machine.
    let mut response_id = None;
    if let Some(store) = state.store.as_deref_mut() {
        let row = Response {
            id: Uuid::new_v4().to_string(),
            student_id: attempt.response.student_id.clone(),
            video_id: attempt.response.video_id.clone(),
            interaction_id: attempt.response.interaction_id.clone(),
            answer: attempt.response.answer.clone(),
            score: attempt.score,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        };
        match append_row(store, Sheet::Responses, &row) {
            Ok(()) => response_id = Some(row.id),
            Err(e) => tracing::warn!(error = %e, "response write dropped"),
        }
    }

    ok(
        &req.id,
        json!({
            "feedback": attempt.feedback,
            "score": attempt.score,
            "responseId": response_id,
        }),
    )
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match require_str(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let existed = state.sessions.remove(&session_id).is_some();
    ok(&req.id, json!({ "closed": existed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lesson.open" => Some(handle_open(state, req)),
        "lesson.tick" => Some(handle_tick(state, req)),
        "lesson.submitAnswer" => Some(handle_submit_answer(state, req)),
        "lesson.close" => Some(handle_close(state, req)),
        _ => None,
    }
}
