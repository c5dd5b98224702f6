use uuid::Uuid;

use crate::model::{Interaction, InteractionKind};
use crate::playback::PlayerHandle;
use crate::timeline::Timeline;

/// Teacher-side editing over the same player handle as playback: pause to
/// draft an interaction at the current time, commit or discard it, and jump
/// the player to existing interactions.
pub struct AuthoringSession<P: PlayerHandle> {
    video_id: String,
    timeline: Timeline,
    player: P,
    draft: Option<Interaction>,
}

impl<P: PlayerHandle> AuthoringSession<P> {
    pub fn new(video_id: impl Into<String>, timeline: Timeline, player: P) -> Self {
        Self {
            video_id: video_id.into(),
            timeline,
            player,
            draft: None,
        }
    }

    /// Pauses playback and opens a draft stamped with the current position.
    /// The draft starts as a two-option multiple choice with the first
    /// option marked correct. Returns `None` while the player is not ready.
    pub fn begin_draft(&mut self) -> Option<&Interaction> {
        let timestamp = self.player.current_time()?;
        self.player.pause();
        self.draft = Some(Interaction {
            id: Uuid::new_v4().to_string(),
            video_id: self.video_id.clone(),
            timestamp,
            question: String::new(),
            kind: InteractionKind::MultipleChoice {
                options: vec![String::new(), String::new()],
                correct_answer: 0,
            },
        });
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Interaction> {
        self.draft.as_mut()
    }

    /// Inserts the draft into the timeline and resumes playback.
    pub fn commit_draft(&mut self) -> bool {
        match self.draft.take() {
            Some(draft) => {
                self.timeline.add(draft);
                self.player.play();
                true
            }
            None => false,
        }
    }

    /// Discards the draft and resumes playback.
    pub fn cancel_draft(&mut self) {
        if self.draft.take().is_some() {
            self.player.play();
        }
    }

    pub fn delete(&mut self, id: &str) {
        self.timeline.remove(id);
    }

    /// Seeks the player to an existing interaction's timestamp.
    pub fn jump_to(&mut self, id: &str) -> bool {
        match self.timeline.get(id).map(|i| i.timestamp) {
            Some(timestamp) => {
                self.player.seek(timestamp);
                true
            }
            None => false,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn interactions(&self) -> &[Interaction] {
        self.timeline.as_slice()
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}

/// `m:ss` label used in authoring lists.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
