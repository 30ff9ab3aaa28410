use std::time::Duration;

use uuid::Uuid;

use super::FlowState;
use crate::signup::reaction::{dedup_reactions, ReactionKey};

pub const CANVAS_TIMEOUT: Duration = Duration::from_secs(300);

pub const ACTION_SAVE: &str = "canvas";

pub fn canvas_prompt(display_name: &str) -> String {
    format!(
        "**Setup Canvas for {display_name}**\n\
         Please add all GvG emojis you want to use as reactions to *this* message."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasEvent {
    /// "Save & Clean Up" pressed; carries the canvas reactions at that moment.
    Save(Vec<ReactionKey>),
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasStep {
    Save(Vec<ReactionKey>),
    /// Saved with no reactions on the canvas; config stays as it was.
    NothingSelected,
    Expired,
    Ignored,
}

/// A throwaway message the admin reacts to in order to pick signup reactions.
#[derive(Debug, Clone)]
pub struct ReactionCanvas {
    pub id: Uuid,
    state: FlowState,
}

impl Default for ReactionCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactionCanvas {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), state: FlowState::Open }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn handle(&mut self, event: CanvasEvent) -> CanvasStep {
        if self.state != FlowState::Open {
            return CanvasStep::Ignored;
        }
        match event {
            CanvasEvent::Save(reactions) => {
                self.state = FlowState::Finished;
                let reactions = dedup_reactions(reactions);
                if reactions.is_empty() {
                    CanvasStep::NothingSelected
                } else {
                    CanvasStep::Save(reactions)
                }
            }
            CanvasEvent::Timeout => {
                self.state = FlowState::TimedOut;
                CanvasStep::Expired
            }
        }
    }
}
