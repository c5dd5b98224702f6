use serde::Serialize;

/// The slice of the embedded player widget the daemon is allowed to touch.
/// The widget itself lives in the shell; implementations either drive a real
/// player or queue directives for one.
pub trait PlayerHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// Current playback position, or `None` while the player is not ready.
    fn current_time(&self) -> Option<f64>;
    fn duration(&self) -> Option<f64>;
}

/// A directive for the shell to apply to its embedded player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlayerCommand {
    Play,
    Pause,
    Seek { seconds: f64 },
}

/// Player handle used by IPC-hosted sessions: the shell reports position and
/// duration with each tick, and collects the queued directives from the
/// response.
#[derive(Debug, Default)]
pub struct QueuedPlayer {
    position: Option<f64>,
    duration: Option<f64>,
    commands: Vec<PlayerCommand>,
}

impl QueuedPlayer {
    pub fn report(&mut self, position: Option<f64>, duration: Option<f64>) {
        self.position = position;
        if duration.is_some() {
            self.duration = duration;
        }
    }

    pub fn drain_commands(&mut self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl PlayerHandle for QueuedPlayer {
    fn play(&mut self) {
        self.commands.push(PlayerCommand::Play);
    }

    fn pause(&mut self) {
        self.commands.push(PlayerCommand::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.commands.push(PlayerCommand::Seek { seconds });
    }

    fn current_time(&self) -> Option<f64> {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}
