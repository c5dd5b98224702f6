use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::authoring::AuthoringSession;
use crate::playback::QueuedPlayer;
use crate::session::LessonSession;
use crate::store::SheetStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Box<dyn SheetStore>>,
    pub sessions: HashMap<String, LessonSession<QueuedPlayer>>,
    pub editors: HashMap<String, AuthoringSession<QueuedPlayer>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            store: None,
            sessions: HashMap::new(),
            editors: HashMap::new(),
        }
    }
}
