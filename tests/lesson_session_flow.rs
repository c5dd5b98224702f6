mod test_support;

use serde_json::json;
use std::thread::sleep;
use std::time::Duration;
use test_support::{request_err, request_ok, select_ephemeral_workspace, spawn_sidecar};

#[test]
fn full_watch_flow_prompts_grades_and_resumes() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_ephemeral_workspace(&mut stdin, &mut reader);

    let video = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "createVideo",
        json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "title": "Lesson" }),
    );
    let video_id = video["id"].as_str().expect("id").to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "saveInteractions",
        json!({
            "videoId": video_id,
            "interactions": [
                { "id": "a", "timestamp": 10, "type": "note", "question": "Heads up" },
                {
                    "id": "q",
                    "timestamp": 20,
                    "type": "mc",
                    "question": "Pick",
                    "options": ["red", "blue"],
                    "correctAnswer": 1
                }
            ]
        }),
    );

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "lesson.open",
        json!({ "videoId": video_id, "studentId": "s@x.com" }),
    );
    let session = opened["sessionId"].as_str().expect("sessionId").to_string();
    assert_eq!(opened["interactions"].as_array().expect("list").len(), 2);

    // Player not ready yet: the tick is a no-op.
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lesson.tick",
        json!({ "sessionId": session }),
    );
    assert_eq!(tick["phase"], "idle");
    assert!(tick.get("prompt").is_none());

    // Inside the tolerance window around the note.
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "lesson.tick",
        json!({ "sessionId": session, "position": 10.4 }),
    );
    assert_eq!(tick["phase"], "prompting");
    assert_eq!(tick["prompt"]["id"], "a");
    assert_eq!(tick["commands"][0]["kind"], "pause");

    // One interaction in flight: a further tick changes nothing.
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "lesson.tick",
        json!({ "sessionId": session, "position": 10.4 }),
    );
    assert_eq!(tick["phase"], "prompting");
    assert!(tick.get("prompt").is_none());

    // Notes pass with no payload and the attempt is persisted.
    let graded = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "lesson.submitAnswer",
        json!({ "sessionId": session }),
    );
    assert_eq!(graded["feedback"], "correct");
    assert_eq!(graded["score"], 100.0);
    assert!(graded["responseId"].as_str().is_some());

    // The grading delay has to elapse before playback resumes.
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "lesson.tick",
        json!({ "sessionId": session, "position": 10.4 }),
    );
    assert_eq!(tick["phase"], "grading");

    sleep(Duration::from_millis(1600));
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "lesson.tick",
        json!({ "sessionId": session, "position": 10.4 }),
    );
    assert_eq!(tick["phase"], "idle");
    assert_eq!(tick["completedId"], "a");
    assert_eq!(tick["commands"][0]["kind"], "play");

    // Completed ids stay quiet; the position still matches "a".
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "lesson.tick",
        json!({ "sessionId": session, "position": 10.4 }),
    );
    assert_eq!(tick["phase"], "idle");
    assert!(tick.get("prompt").is_none());

    // The multiple-choice prompt: a wrong pick keeps it open but is logged.
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "lesson.tick",
        json!({ "sessionId": session, "position": 20.1 }),
    );
    assert_eq!(tick["prompt"]["id"], "q");

    let wrong = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "lesson.submitAnswer",
        json!({ "sessionId": session, "answer": "0" }),
    );
    assert_eq!(wrong["feedback"], "incorrect");
    assert_eq!(wrong["score"], 0.0);
    assert!(wrong["responseId"].as_str().is_some());

    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "lesson.tick",
        json!({ "sessionId": session, "position": 20.1 }),
    );
    assert_eq!(tick["phase"], "prompting");

    let right = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "lesson.submitAnswer",
        json!({ "sessionId": session, "answer": "1" }),
    );
    assert_eq!(right["feedback"], "correct");

    sleep(Duration::from_millis(1600));
    let tick = request_ok(
        &mut stdin,
        &mut reader,
        "15",
        "lesson.tick",
        json!({ "sessionId": session, "position": 20.1 }),
    );
    assert_eq!(tick["completedId"], "q");

    // Three attempts were persisted: note, wrong pick, right pick.
    let responses = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "getResponses",
        json!({ "videoId": video_id }),
    );
    let responses = responses["responses"].as_array().expect("responses");
    assert_eq!(responses.len(), 3);
    assert!(responses.iter().all(|r| r["studentId"] == "s@x.com"));
    let scores: Vec<f64> = responses.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert_eq!(scores, vec![100.0, 0.0, 100.0]);

    // Teardown: the session id stops resolving.
    let closed = request_ok(
        &mut stdin,
        &mut reader,
        "17",
        "lesson.close",
        json!({ "sessionId": session }),
    );
    assert_eq!(closed["closed"], true);
    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "18",
        "lesson.tick",
        json!({ "sessionId": session, "position": 20.1 }),
    );
    assert_eq!(code, "not_found");
}

#[test]
fn submit_without_a_prompt_is_rejected() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_ephemeral_workspace(&mut stdin, &mut reader);

    let video = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "createVideo",
        json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "title": "Quiet" }),
    );
    let video_id = video["id"].as_str().expect("id").to_string();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "lesson.open",
        json!({ "videoId": video_id }),
    );
    let session = opened["sessionId"].as_str().expect("sessionId").to_string();

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "lesson.submitAnswer",
        json!({ "sessionId": session, "answer": "0" }),
    );
    assert_eq!(code, "bad_state");
}
