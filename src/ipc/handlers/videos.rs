use serde_json::{json, Value};
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Interaction, Video};
use crate::store::{append_row, scan_as, Sheet};
use crate::youtube;

fn video_json(video: &Video) -> Value {
    json!({
        "id": video.id,
        "url": video.url,
        "title": video.title,
        "createdAt": video.created_at,
        "youtubeId": youtube::video_id(&video.url),
    })
}

fn handle_get_all_videos(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_deref() else {
        return ok(&req.id, json!({ "videos": [] }));
    };

    match scan_as::<Video>(store, Sheet::Videos) {
        Ok(videos) => ok(&req.id, json!({ "videos": videos })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_get_video(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return err(&req.id, "not_found", "Video not found", None);
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

    ok(
        &req.id,
        json!({ "video": video_json(&video), "interactions": interactions }),
    )
}

fn handle_create_video(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let url = match require_str(req, "url") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let title = match require_str(req, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let video = Video {
        id: Uuid::new_v4().to_string(),
        url,
        title,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    if let Err(e) = append_row(store, Sheet::Videos, &video) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Videos" })),
        );
    }

    ok(
        &req.id,
        json!({ "id": video.id, "url": video.url, "title": video.title }),
    )
}

/// Persists an interaction set for a video. `mode: "append"` (the default)
/// adds to whatever was saved before; `mode: "replace"` first drops the
/// video's existing interactions.
fn handle_save_interactions(state: &mut AppState, req: &Request) -> serde_json::Value {
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(items) = req.params.get("interactions").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing interactions", None);
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
    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let mut rows: Vec<Interaction> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Some(fields) = item.as_object() else {
            return err(
                &req.id,
                "bad_params",
                format!("interactions[{idx}] must be an object"),
                None,
            );
        };
        let mut fields = fields.clone();
        fields.insert("videoId".to_string(), json!(video_id.clone()));
        // Authoring tools may send drafts without ids; mint one per row.
        let has_id = fields
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        if !has_id {
            fields.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        }

        let interaction: Interaction = match serde_json::from_value(Value::Object(fields)) {
            Ok(v) => v,
            Err(e) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("interactions[{idx}]: {e}"),
                    None,
                )
            }
        };
        if !(interaction.timestamp >= 0.0) {
            return err(
                &req.id,
                "bad_params",
                format!("interactions[{idx}]: timestamp must be >= 0"),
                None,
            );
        }
        rows.push(interaction);
    }

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

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "getAllVideos" => Some(handle_get_all_videos(state, req)),
        "getVideo" => Some(handle_get_video(state, req)),
        "createVideo" => Some(handle_create_video(state, req)),
        "saveInteractions" => Some(handle_save_interactions(state, req)),
        _ => None,
    }
}
