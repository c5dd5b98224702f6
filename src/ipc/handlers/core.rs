use std::path::PathBuf;

use serde_json::json;

use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::MemStore;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens a workspace directory, or an ephemeral in-memory one when no path
/// is given. Switching workspaces discards any open lesson sessions.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);

    let Some(path) = path else {
        state.workspace = None;
        state.store = Some(Box::new(MemStore::default()));
        state.sessions.clear();
        state.editors.clear();
        return ok(
            &req.id,
            json!({ "workspacePath": serde_json::Value::Null, "ephemeral": true }),
        );
    };

    match db::open_store(&path) {
        Ok(store) => {
            state.workspace = Some(path.clone());
            state.store = Some(Box::new(store));
            state.sessions.clear();
            state.editors.clear();
            ok(
                &req.id,
                json!({ "workspacePath": path.to_string_lossy(), "ephemeral": false }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
