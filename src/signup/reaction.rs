use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use regex::Regex;

const VARIATION_SELECTOR: char = '\u{FE0F}';

static CUSTOM_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(?P<animated>a?):(?P<name>[A-Za-z0-9_~]+):(?P<id>\d+)>$")
        .expect("static custom emoji pattern")
});

/// Identity of a reaction.
///
/// Unicode emoji compare equal with or without the U+FE0F variation selector
/// (`❤` and `❤️` are the same signup). Custom emoji compare by id only, so a
/// renamed or animated copy of the same emoji still lands in one group. The
/// `Display` form is Discord's own: the unicode text, `<:name:id>` or
/// `<a:name:id>`; that is also what the config stores.
#[derive(Debug, Clone)]
pub enum ReactionKey {
    Unicode(String),
    Custom { id: u64, name: String, animated: bool },
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum Identity {
    Unicode(String),
    Custom(u64),
}

impl ReactionKey {
    /// Parse a stored or user-supplied reaction string.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(caps) = CUSTOM_EMOJI.captures(raw) {
            let id = caps["id"].parse().ok()?;
            return Some(Self::Custom {
                id,
                name: caps["name"].to_string(),
                animated: !caps["animated"].is_empty(),
            });
        }
        if raw.starts_with('<') {
            return None;
        }
        Some(Self::Unicode(raw.to_string()))
    }

    pub fn custom_id(&self) -> Option<u64> {
        match self {
            Self::Custom { id, .. } => Some(*id),
            Self::Unicode(_) => None,
        }
    }

    /// Human label for pickers: `:tank:` for custom emoji, the glyph otherwise.
    pub fn label(&self) -> String {
        match self {
            Self::Custom { name, .. } => format!(":{name}:"),
            Self::Unicode(s) => s.clone(),
        }
    }

    fn identity(&self) -> Identity {
        match self {
            Self::Unicode(s) => {
                Identity::Unicode(s.chars().filter(|c| *c != VARIATION_SELECTOR).collect())
            }
            Self::Custom { id, .. } => Identity::Custom(*id),
        }
    }
}

impl PartialEq for ReactionKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ReactionKey {}

impl Hash for ReactionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(s) => f.write_str(s),
            Self::Custom { id, name, animated: true } => write!(f, "<a:{name}:{id}>"),
            Self::Custom { id, name, animated: false } => write!(f, "<:{name}:{id}>"),
        }
    }
}

/// Drop later duplicates, keeping the first spelling of each reaction.
pub fn dedup_reactions(keys: impl IntoIterator<Item = ReactionKey>) -> Vec<ReactionKey> {
    let mut out: Vec<ReactionKey> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parses_custom_and_animated() {
        assert_eq!(
            ReactionKey::parse("<:tank:123>"),
            Some(ReactionKey::Custom { id: 123, name: "tank".into(), animated: false })
        );
        let anim = ReactionKey::parse("<a:dance:77>").unwrap();
        assert_eq!(anim.to_string(), "<a:dance:77>");
        assert_eq!(anim.custom_id(), Some(77));
    }

    #[test]
    fn rejects_empty_and_broken_markup() {
        assert_eq!(ReactionKey::parse("   "), None);
        assert_eq!(ReactionKey::parse("<:tank:>"), None);
    }

    #[test]
    fn custom_identity_ignores_name() {
        let a = ReactionKey::parse("<:tank:123>").unwrap();
        let b = ReactionKey::parse("<a:tank_old:123>").unwrap();
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn unicode_identity_ignores_variation_selector() {
        let plain = ReactionKey::Unicode("\u{2764}".into());
        let styled = ReactionKey::Unicode("\u{2764}\u{FE0F}".into());
        assert_eq!(plain, styled);
        assert_ne!(plain, ReactionKey::Unicode("👍".into()));
    }

    #[test]
    fn dedup_keeps_first_spelling() {
        let keys = dedup_reactions([
            ReactionKey::parse("<:tank:1>").unwrap(),
            ReactionKey::parse("❤️").unwrap(),
            ReactionKey::parse("<:renamed:1>").unwrap(),
        ]);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].to_string(), "<:tank:1>");
    }

    #[test]
    fn labels() {
        assert_eq!(ReactionKey::parse("<:heal:9>").unwrap().label(), ":heal:");
        assert_eq!(ReactionKey::parse("👍").unwrap().label(), "👍");
    }
}
