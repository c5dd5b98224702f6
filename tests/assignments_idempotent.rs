mod test_support;

use serde_json::json;
use test_support::{request_ok, select_ephemeral_workspace, spawn_sidecar};

#[test]
fn repeat_assignment_reports_success_without_duplicating() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_ephemeral_workspace(&mut stdin, &mut reader);

    let class = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "createClass",
        json!({ "name": "Math", "teacherEmail": "t@x.com" }),
    );
    let class_id = class["classId"].as_str().expect("classId").to_string();
    let video = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "createVideo",
        json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "title": "Fractions" }),
    );
    let video_id = video["id"].as_str().expect("id").to_string();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "assignVideo",
        json!({ "classId": class_id, "videoId": video_id }),
    );
    assert_eq!(first["success"], true);
    assert!(first.get("alreadyAssigned").is_none());
    let assignment_id = first["id"].as_str().expect("id").to_string();

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "assignVideo",
        json!({ "classId": class_id, "videoId": video_id, "dueDate": "2026-10-01" }),
    );
    assert_eq!(second["success"], true);
    assert_eq!(second["alreadyAssigned"], true);
    assert_eq!(second["id"], json!(assignment_id));

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "getClass",
        json!({ "classId": class_id }),
    );
    assert_eq!(fetched["assignments"].as_array().expect("list").len(), 1);

    // A different video still creates its own assignment.
    let other = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "createVideo",
        json!({ "url": "https://youtu.be/bbbbbbbbbbb", "title": "Decimals" }),
    );
    let other_id = other["id"].as_str().expect("id").to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "assignVideo",
        json!({ "classId": class_id, "videoId": other_id }),
    );
    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "getClass",
        json!({ "classId": class_id }),
    );
    assert_eq!(fetched["assignments"].as_array().expect("list").len(), 2);
}
