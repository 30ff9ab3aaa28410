use serde::Serialize;

use crate::platform::{RoleInfo, SignupMember};

/// Number of team columns offered on the roster page.
pub const MAX_NUM_GROUPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub id: String,
    pub display_name: String,
    pub avatar_url: String,
    /// Tracked roles the member holds, in tracked order.
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GvgRole {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Everything `roster.html` renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterView {
    pub guild_name: String,
    pub roster: Vec<RosterEntry>,
    pub all_gvg_roles: Vec<GvgRole>,
    pub max_num_groups: usize,
}

// Ids go out as strings; snowflakes do not survive a trip through JS numbers.
pub fn roster_view(guild_name: String, members: &[SignupMember], roles: &[RoleInfo]) -> RosterView {
    let all_gvg_roles = roles
        .iter()
        .map(|r| GvgRole { id: r.id.to_string(), name: r.name.clone(), color: r.colour.clone() })
        .collect();

    let mut roster: Vec<RosterEntry> = members
        .iter()
        .map(|m| RosterEntry {
            id: m.id.to_string(),
            display_name: m.display_name.clone(),
            avatar_url: m.avatar_url.clone(),
            role_ids: roles
                .iter()
                .filter(|r| m.has_role(r.id))
                .map(|r| r.id.to_string())
                .collect(),
        })
        .collect();
    roster.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });

    RosterView { guild_name, roster, all_gvg_roles, max_num_groups: MAX_NUM_GROUPS }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, name: &str) -> RoleInfo {
        RoleInfo {
            id,
            name: name.into(),
            colour: "#ff0000".into(),
            position: 1,
            is_default: false,
        }
    }

    fn member(id: u64, name: &str, roles: &[u64]) -> SignupMember {
        SignupMember {
            id,
            display_name: name.into(),
            avatar_url: format!("https://cdn.example/{id}.png"),
            role_ids: roles.to_vec(),
        }
    }

    #[test]
    fn keeps_only_tracked_roles_in_tracked_order() {
        let roles = [role(20, "Healer"), role(10, "Tank")];
        let members = [member(1, "Zed", &[10, 99, 20])];
        let view = roster_view("Guild".into(), &members, &roles);
        assert_eq!(view.roster[0].role_ids, ["20", "10"]);
        assert_eq!(view.all_gvg_roles[1].name, "Tank");
        assert_eq!(view.max_num_groups, 3);
    }

    #[test]
    fn sorted_by_name_case_insensitively() {
        let members = [member(3, "bob", &[]), member(1, "Alice", &[]), member(2, "Bob", &[])];
        let view = roster_view("Guild".into(), &members, &[]);
        let names: Vec<&str> = view.roster.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob", "bob"]);
    }

    #[test]
    fn empty_signup_renders_empty_roster() {
        let view = roster_view("Guild".into(), &[], &[role(1, "Tank")]);
        assert!(view.roster.is_empty());
        assert_eq!(view.all_gvg_roles.len(), 1);
    }
}
