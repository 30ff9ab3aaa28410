use std::collections::HashMap;

use super::table::{self, Column};
use crate::platform::{RoleInfo, SignupMember};

const ROLE_LABEL_LEN: usize = 10;
const NAME_LEN: usize = 15;
const UNKNOWN_ROLE: &str = "???";
const CHECK: &str = "✅";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    pub role_id: u64,
    pub label: String,
    /// Signups holding this role.
    pub total: usize,
    /// Signups whose only tracked role is this one.
    pub exclusive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub member_id: u64,
    pub display_name: String,
    /// One flag per tracked role, in tracked order.
    pub has_role: Vec<bool>,
}

/// Role id -> name lookup for labels.
pub fn role_names(roles: &[RoleInfo]) -> HashMap<u64, String> {
    roles.iter().map(|r| (r.id, r.name.clone())).collect()
}

/// First occurrence wins.
pub fn dedup_roles(tracked: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(tracked.len());
    for id in tracked {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn role_label(role_id: u64, names: &HashMap<u64, String>) -> String {
    names
        .get(&role_id)
        .map(|n| truncate_chars(&n.to_uppercase(), ROLE_LABEL_LEN))
        .unwrap_or_else(|| UNKNOWN_ROLE.to_string())
}

pub fn summary(
    members: &[SignupMember],
    tracked: &[u64],
    names: &HashMap<u64, String>,
) -> Vec<RoleSummary> {
    let tracked = dedup_roles(tracked);
    let mut out: Vec<RoleSummary> = tracked
        .iter()
        .map(|id| RoleSummary { role_id: *id, label: role_label(*id, names), total: 0, exclusive: 0 })
        .collect();

    for member in members {
        let held: Vec<usize> = tracked
            .iter()
            .enumerate()
            .filter(|(_, id)| member.has_role(**id))
            .map(|(i, _)| i)
            .collect();
        for i in &held {
            out[*i].total += 1;
        }
        if let [only] = held.as_slice() {
            out[*only].exclusive += 1;
        }
    }
    out
}

/// Members with the most tracked roles first, then by name.
pub fn overview(members: &[SignupMember], tracked: &[u64]) -> Vec<RosterRow> {
    let tracked = dedup_roles(tracked);
    let mut rows: Vec<RosterRow> = members
        .iter()
        .map(|m| RosterRow {
            member_id: m.id,
            display_name: m.display_name.clone(),
            has_role: tracked.iter().map(|id| m.has_role(*id)).collect(),
        })
        .collect();
    rows.sort_by_cached_key(|r| {
        let missing: Vec<bool> = r.has_role.iter().map(|h| !h).collect();
        (missing, r.display_name.to_lowercase(), r.member_id)
    });
    rows
}

/// Mentions of signups holding `target`, each with the other tracked roles they hold.
pub fn members_by_role(
    members: &[SignupMember],
    target: u64,
    tracked: &[u64],
    names: &HashMap<u64, String>,
) -> Vec<String> {
    let tracked = dedup_roles(tracked);
    let mut holders: Vec<&SignupMember> = members.iter().filter(|m| m.has_role(target)).collect();
    holders.sort_by_cached_key(|m| (m.display_name.to_lowercase(), m.id));
    holders
        .into_iter()
        .map(|m| {
            let also: Vec<String> = tracked
                .iter()
                .filter(|id| **id != target && m.has_role(**id))
                .map(|id| role_label(*id, names))
                .collect();
            if also.is_empty() {
                format!("<@{}>", m.id)
            } else {
                format!("<@{}> (also: {})", m.id, also.join(", "))
            }
        })
        .collect()
}

pub fn summary_table(summary: &[RoleSummary]) -> String {
    let mut cols = vec![Column::left("Type")];
    cols.extend(summary.iter().map(|s| Column::right(s.label.clone())));
    let mut total = vec!["TOTAL".to_string()];
    total.extend(summary.iter().map(|s| s.total.to_string()));
    let mut unique = vec!["UNIQUE".to_string()];
    unique.extend(summary.iter().map(|s| s.exclusive.to_string()));
    table::render(&cols, &[total, unique])
}

pub fn overview_table(rows: &[RosterRow], labels: &[String]) -> String {
    let mut cols = vec![Column::left("User")];
    cols.extend(labels.iter().map(|l| Column::left(l.clone())));
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![truncate_chars(&r.display_name, NAME_LEN)];
            cells.extend(r.has_role.iter().map(|h| if *h { CHECK.to_string() } else { String::new() }));
            cells
        })
        .collect();
    table::render(&cols, &body)
}
