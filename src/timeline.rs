use std::collections::HashSet;

use crate::model::Interaction;

/// The interactions of one video, held ascending by timestamp for
/// time-driven lookup. Equal timestamps keep their arrival order; no other
/// tie-break is defined.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    interactions: Vec<Interaction>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held collection, stable-sorted by timestamp.
    pub fn load(&mut self, interactions: Vec<Interaction>) {
        self.interactions = interactions;
        self.interactions
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }

    /// Inserts while preserving order; an equal timestamp lands after the
    /// existing ones.
    pub fn add(&mut self, interaction: Interaction) {
        let at = self
            .interactions
            .partition_point(|i| i.timestamp <= interaction.timestamp);
        self.interactions.insert(at, interaction);
    }

    /// Deletes by id; absent ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        self.interactions.retain(|i| i.id != id);
    }

    pub fn get(&self, id: &str) -> Option<&Interaction> {
        self.interactions.iter().find(|i| i.id == id)
    }

    /// First interaction in timestamp order within `tolerance` seconds of
    /// `current_time` whose id has not fired yet.
    pub fn find_due(
        &self,
        current_time: f64,
        completed: &HashSet<String>,
        tolerance: f64,
    ) -> Option<&Interaction> {
        self.interactions
            .iter()
            .find(|i| !completed.contains(&i.id) && (i.timestamp - current_time).abs() < tolerance)
    }

    pub fn as_slice(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}
