use std::time::Duration;

use uuid::Uuid;

use super::FlowState;
use crate::platform::RoleInfo;

pub const ROLE_PICKER_TIMEOUT: Duration = Duration::from_secs(120);
/// Discord caps a select menu at 25 options.
pub const MAX_ROLE_OPTIONS: usize = 25;

pub const ACTION_SELECT: &str = "roles";
pub const ACTION_SAVE: &str = "save";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    /// Raw select values (role ids as strings).
    Select(Vec<String>),
    Save,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerStep {
    /// Redraw the menu with the new defaults.
    Redraw,
    Save(Vec<u64>),
    Expired,
    /// Input after the flow ended.
    Ignored,
}

/// Choose which guild roles the roster tracks.
#[derive(Debug, Clone)]
pub struct RolePicker {
    pub id: Uuid,
    options: Vec<RoleInfo>,
    selected: Vec<u64>,
    state: FlowState,
}

impl RolePicker {
    /// Offers up to 25 non-default roles, lowest position first, with the
    /// currently tracked ones preselected.
    pub fn new(guild_roles: &[RoleInfo], current: &[u64]) -> Self {
        let mut options: Vec<RoleInfo> =
            guild_roles.iter().filter(|r| !r.is_default).cloned().collect();
        options.sort_by_key(|r| (r.position, r.id));
        options.truncate(MAX_ROLE_OPTIONS);
        Self { id: Uuid::new_v4(), options, selected: current.to_vec(), state: FlowState::Open }
    }

    pub fn options(&self) -> &[RoleInfo] {
        &self.options
    }

    pub fn selected(&self) -> &[u64] {
        &self.selected
    }

    pub fn is_selected(&self, role_id: u64) -> bool {
        self.selected.contains(&role_id)
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn handle(&mut self, event: PickerEvent) -> PickerStep {
        if self.state != FlowState::Open {
            return PickerStep::Ignored;
        }
        match event {
            PickerEvent::Select(values) => {
                // Values come back in menu order; anything not offered is dropped.
                self.selected = values
                    .iter()
                    .filter_map(|v| v.parse::<u64>().ok())
                    .filter(|id| self.options.iter().any(|r| r.id == *id))
                    .collect();
                PickerStep::Redraw
            }
            PickerEvent::Save => {
                self.state = FlowState::Finished;
                PickerStep::Save(self.selected.clone())
            }
            PickerEvent::Timeout => {
                self.state = FlowState::TimedOut;
                PickerStep::Expired
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, position: u16, is_default: bool) -> RoleInfo {
        RoleInfo { id, name: format!("r{id}"), colour: "#000000".into(), position, is_default }
    }

    #[test]
    fn options_skip_everyone_and_cap_at_25() {
        let mut roles: Vec<RoleInfo> = (1..=30).map(|i| role(i, i as u16, false)).collect();
        roles.push(role(999, 0, true));
        let picker = RolePicker::new(&roles, &[]);
        assert_eq!(picker.options().len(), MAX_ROLE_OPTIONS);
        assert!(picker.options().iter().all(|r| !r.is_default));
        assert_eq!(picker.options()[0].id, 1);
    }

    #[test]
    fn current_roles_start_selected() {
        let picker = RolePicker::new(&[role(1, 1, false), role(2, 2, false)], &[2]);
        assert!(picker.is_selected(2));
        assert!(!picker.is_selected(1));
    }

    #[test]
    fn select_then_save() {
        let mut picker = RolePicker::new(&[role(1, 1, false), role(2, 2, false)], &[2]);
        let step = picker.handle(PickerEvent::Select(vec!["1".into(), "junk".into(), "77".into()]));
        assert_eq!(step, PickerStep::Redraw);
        assert_eq!(picker.handle(PickerEvent::Save), PickerStep::Save(vec![1]));
        assert_eq!(picker.state(), FlowState::Finished);
        assert_eq!(picker.handle(PickerEvent::Save), PickerStep::Ignored);
    }

    #[test]
    fn save_without_touching_keeps_current() {
        let mut picker = RolePicker::new(&[role(1, 1, false)], &[1, 5]);
        assert_eq!(picker.handle(PickerEvent::Save), PickerStep::Save(vec![1, 5]));
    }

    #[test]
    fn timeout_ends_the_flow() {
        let mut picker = RolePicker::new(&[role(1, 1, false)], &[]);
        assert_eq!(picker.handle(PickerEvent::Timeout), PickerStep::Expired);
        assert_eq!(picker.state(), FlowState::TimedOut);
        assert_eq!(picker.handle(PickerEvent::Select(vec!["1".into()])), PickerStep::Ignored);
    }
}
