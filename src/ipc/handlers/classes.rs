use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, require_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Assignment, Class, Enrollment, Role, User, Video};
use crate::store::{append_row, scan_as, Sheet};

fn handle_create_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match require_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let teacher_email = match require_str(req, "teacherEmail") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let description = optional_str(req, "description").unwrap_or_default();

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let class = Class {
        id: Uuid::new_v4().to_string(),
        name,
        teacher_email,
        description,
    };
    if let Err(e) = append_row(store, Sheet::Classes, &class) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Classes" })),
        );
    }

    ok(&req.id, json!({ "success": true, "classId": class.id }))
}

fn handle_get_teacher_classes(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match require_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return ok(&req.id, json!({ "classes": [] }));
    };

    match scan_as::<Class>(store, Sheet::Classes) {
        Ok(all) => {
            let classes: Vec<Class> = all
                .into_iter()
                .filter(|c| c.teacher_email == email)
                .collect();
            ok(&req.id, json!({ "classes": classes }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_get_student_classes(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match require_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return ok(&req.id, json!({ "classes": [] }));
    };

    let enrollments: Vec<Enrollment> = match scan_as(store, Sheet::Enrollments) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let enrolled: Vec<&str> = enrollments
        .iter()
        .filter(|e| e.student_email == email)
        .map(|e| e.class_id.as_str())
        .collect();

    match scan_as::<Class>(store, Sheet::Classes) {
        Ok(all) => {
            let classes: Vec<Class> = all
                .into_iter()
                .filter(|c| enrolled.contains(&c.id.as_str()))
                .collect();
            ok(&req.id, json!({ "classes": classes }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_get_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match require_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(store) = state.store.as_deref() else {
        return err(&req.id, "not_found", "Class not found", None);
    };

    let classes: Vec<Class> = match scan_as(store, Sheet::Classes) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let Some(class) = classes.into_iter().find(|c| c.id == class_id) else {
        return err(&req.id, "not_found", "Class not found", None);
    };

    let enrollments: Vec<Enrollment> = match scan_as(store, Sheet::Enrollments) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let students: Vec<&str> = enrollments
        .iter()
        .filter(|e| e.class_id == class_id)
        .map(|e| e.student_email.as_str())
        .collect();

    let assignments: Vec<Assignment> = match scan_as(store, Sheet::Assignments) {
        Ok(all) => all
            .into_iter()
            .filter(|a: &Assignment| a.class_id == class_id)
            .collect(),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let videos: Vec<Video> = match scan_as(store, Sheet::Videos) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let assignments: Vec<serde_json::Value> = assignments
        .iter()
        .map(|a| {
            let video_title = videos
                .iter()
                .find(|v| v.id == a.video_id)
                .map(|v| v.title.as_str());
            json!({
                "id": a.id,
                "videoId": a.video_id,
                "videoTitle": video_title,
                "dueDate": a.due_date,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({ "class": class, "students": students, "assignments": assignments }),
    )
}

fn handle_add_student_to_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match require_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_email = match require_str(req, "studentEmail") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let class_exists = match store.find_by(Sheet::Classes, &mut |row| {
        row.get("id").and_then(|v| v.as_str()) == Some(class_id.as_str())
    }) {
        Ok(hit) => hit.is_some(),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if !class_exists {
        return err(&req.id, "not_found", "Class not found", None);
    }

    // Only registered student accounts can be enrolled.
    let users: Vec<User> = match scan_as(store, Sheet::Users) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let is_student = users
        .iter()
        .any(|u| u.email == student_email && u.role == Role::Student);
    if !is_student {
        return err(&req.id, "not_found", "Student not found", None);
    }

    let enrollments: Vec<Enrollment> = match scan_as(store, Sheet::Enrollments) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if enrollments
        .iter()
        .any(|e| e.class_id == class_id && e.student_email == student_email)
    {
        return err(&req.id, "conflict", "Student already in class", None);
    }

    let enrollment = Enrollment {
        class_id,
        student_email,
    };
    if let Err(e) = append_row(store, Sheet::Enrollments, &enrollment) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Enrollments" })),
        );
    }

    ok(&req.id, json!({ "success": true }))
}

/// Repeat assignment of the same video to the same class reports the
/// existing row instead of duplicating or failing.
fn handle_assign_video(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match require_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let video_id = match require_str(req, "videoId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let due_date = optional_str(req, "dueDate").unwrap_or_default();

    let Some(store) = state.store.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let assignments: Vec<Assignment> = match scan_as(store, Sheet::Assignments) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Some(existing) = assignments
        .iter()
        .find(|a| a.class_id == class_id && a.video_id == video_id)
    {
        return ok(
            &req.id,
            json!({ "success": true, "id": existing.id, "alreadyAssigned": true }),
        );
    }

    let assignment = Assignment {
        id: Uuid::new_v4().to_string(),
        class_id,
        video_id,
        due_date,
    };
    if let Err(e) = append_row(store, Sheet::Assignments, &assignment) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "sheet": "Assignments" })),
        );
    }

    ok(&req.id, json!({ "success": true, "id": assignment.id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "createClass" => Some(handle_create_class(state, req)),
        "getTeacherClasses" => Some(handle_get_teacher_classes(state, req)),
        "getStudentClasses" => Some(handle_get_student_classes(state, req)),
        "getClass" => Some(handle_get_class(state, req)),
        "addStudentToClass" => Some(handle_add_student_to_class(state, req)),
        "assignVideo" => Some(handle_assign_video(state, req)),
        _ => None,
    }
}
