//! Interactive flows owned by the interaction that started them.
//!
//! Each flow is a plain state machine; the command layer drives it from a
//! component collector and turns its steps into Discord edits. Component ids
//! are `f:<action>:<flow uuid>` so a collector only sees its own flow.

pub mod gvg_builder;
pub mod reaction_canvas;
pub mod role_picker;

use std::future::Future;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use uuid::Uuid;

// Flows currently driven by a collector. Components of any other flow are stale.
static LIVE_FLOWS: Lazy<DashMap<Uuid, &'static str>> = Lazy::new(DashMap::new);

/// Whether a flow still accepts input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Open,
    Finished,
    TimedOut,
}

/// Marks a flow live until dropped.
pub struct LiveFlow(Uuid);

impl LiveFlow {
    pub fn register(id: Uuid, kind: &'static str) -> Self {
        LIVE_FLOWS.insert(id, kind);
        Self(id)
    }
}

impl Drop for LiveFlow {
    fn drop(&mut self) {
        LIVE_FLOWS.remove(&self.0);
    }
}

pub fn is_live(id: Uuid) -> bool {
    LIVE_FLOWS.contains_key(&id)
}

/// Component id for `action` within flow `id`.
pub fn component_id(action: &str, id: Uuid) -> String {
    format!("f:{action}:{id}")
}

/// Split a component id into `(action, flow id)`.
pub fn parse_component_id(s: &str) -> Option<(&str, Uuid)> {
    let rest = s.strip_prefix("f:")?;
    let (action, id) = rest.split_once(':')?;
    if action.is_empty() {
        return None;
    }
    Some((action, id.parse().ok()?))
}

/// Await `flow`, then `cleanup` whether the flow succeeded or not.
pub async fn then_clean_up<T, E>(
    flow: impl Future<Output = Result<T, E>>,
    cleanup: impl Future<Output = ()>,
) -> Result<T, E> {
    let outcome = flow.await;
    cleanup.await;
    outcome
}
