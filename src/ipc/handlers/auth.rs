use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{Role, User};
use crate::store::{append_row, scan_as, Sheet};

fn password_param(req: &Request) -> Result<String, serde_json::Value> {
    // Taken verbatim, not trimmed; only emptiness is rejected.
    match req.params.get("password").and_then(|v| v.as_str()) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(err(&req.id, "bad_params", "missing password", None)),
    }
}

fn handle_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match require_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let password = match password_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match require_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let role = match require_str(req, "role") {
        Ok(v) => match v.as_str() {
            "teacher" => Role::Teacher,
            "student" => Role::Student,
            _ => {
                return err(
                    &req.id,
                    "bad_params",
                    "role must be \"teacher\" or \"student\"",
                    None,
                )
            }
        },
        Err(resp) => return resp,
    };

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let taken = match store.find_by(Sheet::Users, &mut |row| {
        row.get("email").and_then(|v| v.as_str()) == Some(email.as_str())
    }) {
        Ok(hit) => hit.is_some(),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if taken {
        return err(&req.id, "conflict", "Email already exists", None);
    }

    let user = User {
        email,
        password,
        name,
        role,
    };
    if let Err(e) = append_row(store, Sheet::Users, &user) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Users" })),
        );
    }

    ok(
        &req.id,
        json!({ "success": true, "user": user.public_view() }),
    )
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match require_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let password = match password_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(store) = state.store.as_deref() else {
        return err(&req.id, "invalid_credentials", "Invalid credentials", None);
    };
    let users: Vec<User> = match scan_as(store, Sheet::Users) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // One message for both misses; callers cannot probe which part failed.
    match users.iter().find(|u| u.email == email) {
        Some(user) if user.password == password => ok(
            &req.id,
            json!({ "success": true, "user": user.public_view() }),
        ),
        _ => err(&req.id, "invalid_credentials", "Invalid credentials", None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "register" => Some(handle_register(state, req)),
        "login" => Some(handle_login(state, req)),
        _ => None,
    }
}
