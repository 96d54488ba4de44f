//! Routing phases selected by `handle` markers.

use std::fmt;

/// Phases a `{ "handle": ... }` marker can switch the matcher into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Serve files from the deployment before continuing.
    Filesystem,
    /// Rules evaluated after a filesystem hit (annotation only).
    Hit,
    /// Rules evaluated after a filesystem miss.
    Miss,
}

impl Phase {
    /// Get the `handle` value for this phase.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Filesystem => "filesystem",
            Phase::Hit => "hit",
            Phase::Miss => "miss",
        }
    }

    /// Create from a `handle` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "filesystem" => Some(Phase::Filesystem),
            "hit" => Some(Phase::Hit),
            "miss" => Some(Phase::Miss),
            _ => None,
        }
    }

    /// Get all phases in order.
    pub fn all() -> &'static [Phase] {
        &[Phase::Filesystem, Phase::Hit, Phase::Miss]
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names_round_trip() {
        for phase in Phase::all() {
            assert_eq!(Phase::from_name(phase.name()), Some(*phase));
        }
    }

    #[test]
    fn test_unknown_phase() {
        assert_eq!(Phase::from_name("doesnotexist"), None);
        assert_eq!(Phase::from_name("Filesystem"), None);
    }
}
