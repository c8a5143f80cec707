//! Commit timing

use std::time::{Duration, Instant};

/// Timestamps of one commit, attached to the published revision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountingTelemetry {
    commit_start: Option<Instant>,
    layout_start: Option<Instant>,
    layout_end: Option<Instant>,
    commit_end: Option<Instant>,
}

impl MountingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn will_commit(&mut self) {
        self.commit_start = Some(Instant::now());
    }

    pub fn will_layout(&mut self) {
        debug_assert!(self.commit_start.is_some(), "layout started outside a commit");
        self.layout_start = Some(Instant::now());
    }

    pub fn did_layout(&mut self) {
        debug_assert!(self.layout_start.is_some(), "layout finished before it started");
        self.layout_end = Some(Instant::now());
    }

    pub fn did_commit(&mut self) {
        debug_assert!(self.commit_start.is_some(), "commit finished before it started");
        self.commit_end = Some(Instant::now());
    }

    pub fn commit_start(&self) -> Option<Instant> {
        self.commit_start
    }

    pub fn layout_start(&self) -> Option<Instant> {
        self.layout_start
    }

    pub fn layout_end(&self) -> Option<Instant> {
        self.layout_end
    }

    pub fn commit_end(&self) -> Option<Instant> {
        self.commit_end
    }

    /// Wall time from commit start to commit end
    pub fn commit_duration(&self) -> Option<Duration> {
        Some(self.commit_end?.duration_since(self.commit_start?))
    }

    /// Wall time spent in the layout collaborator
    pub fn layout_duration(&self) -> Option<Duration> {
        Some(self.layout_end?.duration_since(self.layout_start?))
    }

    /// Whether every phase has been recorded
    pub fn is_complete(&self) -> bool {
        self.commit_start.is_some()
            && self.layout_start.is_some()
            && self.layout_end.is_some()
            && self.commit_end.is_some()
    }
}
