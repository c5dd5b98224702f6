use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::model::{Interaction, InteractionKind};
use crate::playback::PlayerHandle;
use crate::timeline::Timeline;

/// Cadence the shell is expected to drive `tick` at.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Matching window for a tick to consider an interaction due. Must stay
/// above half the poll period, or two consecutive ticks can straddle a
/// timestamp without either landing inside the window.
pub const DUE_TOLERANCE_SECS: f64 = 1.0;

/// Pause between a graded answer and playback resuming.
pub const GRADING_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Playback running (or not yet started); polling is live.
    Idle,
    /// An interaction is on screen and playback is paused.
    Prompting { interaction_id: String },
    /// Answer accepted; waiting out the feedback delay before resuming.
    Grading {
        interaction_id: String,
        resume_at: Instant,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Prompting { .. } => "prompting",
            Phase::Grading { .. } => "grading",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no interaction is awaiting an answer")]
    NotPrompting,
}

/// What a poll tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing due, player not ready, or mid-prompt/grading.
    Waiting,
    /// An interaction fired: playback paused, prompt is up.
    Prompted(Interaction),
    /// Grading delay elapsed: id completed, playback resumed.
    Resumed { completed_id: String },
}

/// The row to persist for one answer attempt. Persistence is dispatched by
/// the caller fire-and-forget; its outcome never feeds back into the state
/// machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDraft {
    pub student_id: String,
    pub video_id: String,
    pub interaction_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub feedback: Feedback,
    pub score: f64,
    pub response: ResponseDraft,
}

/// Bridges playback polling to the timeline and owns the
/// `Idle -> Prompting -> Grading -> Idle` loop, one interaction in flight at
/// a time. Each open lesson view owns exactly one session.
pub struct LessonSession<P: PlayerHandle> {
    video_id: String,
    student_id: String,
    timeline: Timeline,
    completed: HashSet<String>,
    phase: Phase,
    feedback: Option<Feedback>,
    player: P,
}

impl<P: PlayerHandle> LessonSession<P> {
    pub fn new(
        video_id: impl Into<String>,
        student_id: impl Into<String>,
        timeline: Timeline,
        player: P,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            student_id: student_id.into(),
            timeline,
            completed: HashSet::new(),
            phase: Phase::Idle,
            feedback: None,
            player,
        }
    }

    /// One poll tick. Due-lookup happens only in `Idle`; a missing playback
    /// position is treated as "not yet ready", not an error.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        match self.phase.clone() {
            Phase::Idle => {
                let Some(position) = self.player.current_time() else {
                    return TickOutcome::Waiting;
                };
                let Some(hit) = self
                    .timeline
                    .find_due(position, &self.completed, DUE_TOLERANCE_SECS)
                    .cloned()
                else {
                    return TickOutcome::Waiting;
                };
                self.player.pause();
                self.feedback = None;
                self.phase = Phase::Prompting {
                    interaction_id: hit.id.clone(),
                };
                TickOutcome::Prompted(hit)
            }
            Phase::Prompting { .. } => TickOutcome::Waiting,
            Phase::Grading {
                interaction_id,
                resume_at,
            } => {
                if now < resume_at {
                    return TickOutcome::Waiting;
                }
                self.completed.insert(interaction_id.clone());
                self.phase = Phase::Idle;
                self.feedback = None;
                self.player.play();
                TickOutcome::Resumed {
                    completed_id: interaction_id,
                }
            }
        }
    }

    /// Grades the answer for the prompted interaction. A wrong
    /// multiple-choice pick keeps the prompt up for another attempt; every
    /// other outcome schedules the resume. The returned draft must be
    /// persisted for every attempt, wrong ones included.
    pub fn submit_answer(&mut self, answer: &str, now: Instant) -> Result<Attempt, SessionError> {
        let Phase::Prompting { interaction_id } = &self.phase else {
            return Err(SessionError::NotPrompting);
        };
        let interaction_id = interaction_id.clone();

        let (feedback, score) = match self.timeline.get(&interaction_id).map(|i| &i.kind) {
            Some(InteractionKind::MultipleChoice { correct_answer, .. }) => {
                match answer.trim().parse::<usize>() {
                    Ok(picked) if picked == *correct_answer => (Feedback::Correct, 100.0),
                    _ => (Feedback::Incorrect, 0.0),
                }
            }
            // Open-response and note always pass; note needs no payload.
            _ => (Feedback::Correct, 100.0),
        };

        self.feedback = Some(feedback);
        if feedback == Feedback::Correct {
            self.phase = Phase::Grading {
                interaction_id: interaction_id.clone(),
                resume_at: now + GRADING_DELAY,
            };
        }

        Ok(Attempt {
            feedback,
            score,
            response: ResponseDraft {
                student_id: self.student_id.clone(),
                video_id: self.video_id.clone(),
                interaction_id,
                answer: answer.to_string(),
            },
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}
