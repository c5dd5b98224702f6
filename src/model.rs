use serde::{Deserialize, Serialize};

/// One uploaded lesson video. Immutable after creation; there is no edit or
/// delete path anywhere in the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub url: String,
    pub title: String,
    pub created_at: String,
}

/// Kind-specific payload of an interaction. Only multiple-choice carries
/// extra fields; open-response and note are bare markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractionKind {
    #[serde(rename = "mc", rename_all = "camelCase")]
    MultipleChoice {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        correct_answer: usize,
    },
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "note")]
    Note,
}

/// A question or note anchored to a playback timestamp. Duplicate
/// (video, timestamp) pairs are allowed; nothing enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    pub video_id: String,
    pub timestamp: f64,
    pub question: String,
    #[serde(flatten)]
    pub kind: InteractionKind,
}

/// One submitted answer. Every attempt is recorded, including incorrect
/// multiple-choice tries; rows are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub student_id: String,
    pub video_id: String,
    pub interaction_id: String,
    pub answer: String,
    pub score: f64,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

/// Registered account. The email is the primary key; the credential secret
/// is stored as-is (plain text is a stated placeholder, not a contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl User {
    /// The shape handed back to clients; the credential never leaves the row
    /// store.
    pub fn public_view(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "name": self.name,
            "role": self.role,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub teacher_email: String,
    #[serde(default)]
    pub description: String,
}

/// Membership pair. Uniqueness of (class, student) is enforced at write time
/// by an existence scan, not by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub class_id: String,
    pub student_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub class_id: String,
    pub video_id: String,
    #[serde(default)]
    pub due_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interaction_wire_shape_is_tagged_by_type() {
        let mc = Interaction {
            id: "i1".into(),
            video_id: "v1".into(),
            timestamp: 12.5,
            question: "Pick one".into(),
            kind: InteractionKind::MultipleChoice {
                options: vec!["a".into(), "b".into()],
                correct_answer: 1,
            },
        };
        let wire = serde_json::to_value(&mc).expect("serialize");
        assert_eq!(wire["type"], "mc");
        assert_eq!(wire["correctAnswer"], 1);
        assert_eq!(wire["options"], json!(["a", "b"]));

        let note = Interaction {
            id: "i2".into(),
            video_id: "v1".into(),
            timestamp: 3.0,
            question: "Heads up".into(),
            kind: InteractionKind::Note,
        };
        let wire = serde_json::to_value(&note).expect("serialize");
        assert_eq!(wire["type"], "note");
        assert!(wire.get("options").is_none());
    }

    #[test]
    fn interaction_parses_without_mc_extras() {
        let parsed: Interaction = serde_json::from_value(json!({
            "id": "i3",
            "videoId": "v1",
            "timestamp": 7,
            "type": "open",
            "question": "Why?"
        }))
        .expect("parse open interaction");
        assert_eq!(parsed.kind, InteractionKind::Open);
        assert_eq!(parsed.timestamp, 7.0);

        // Multiple choice tolerates missing extras and defaults them.
        let parsed: Interaction = serde_json::from_value(json!({
            "id": "i4",
            "videoId": "v1",
            "timestamp": 0,
            "type": "mc",
            "question": "Pick"
        }))
        .expect("parse bare mc interaction");
        assert_eq!(
            parsed.kind,
            InteractionKind::MultipleChoice {
                options: vec![],
                correct_answer: 0
            }
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Teacher).unwrap(), "teacher");
        assert_eq!(serde_json::to_value(Role::Student).unwrap(), "student");
    }
}
