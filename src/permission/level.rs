//! Ordered permission ladders.

use std::str::FromStr;

/// An ordered permission classification. The evaluator is generic over
/// this so alternative ladders (coarse allow/deny, CRUD grades) share the
/// same lookup and parsing logic.
pub trait PermissionLevel: Copy + Ord + FromStr + Send + Sync + 'static {}

impl<L> PermissionLevel for L where L: Copy + Ord + FromStr + Send + Sync + 'static {}

/// The default ladder: NONE < READ < WRITE < ADMIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermLevel {
    None,
    Read,
    Write,
    Admin,
}

impl PermLevel {
    /// True when this level grants at least `required`.
    pub fn allows(self, required: PermLevel) -> bool {
        self >= required
    }
}

/// Parse failure for a permission level literal.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl std::fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown permission level {:?}", self.0)
    }
}

impl FromStr for PermLevel {
    type Err = ParseLevelError;

    // exact symbolic match, no case folding
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(PermLevel::None),
            "READ" => Ok(PermLevel::Read),
            "WRITE" => Ok(PermLevel::Write),
            "ADMIN" => Ok(PermLevel::Admin),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

impl std::fmt::Display for PermLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PermLevel::None => "NONE",
            PermLevel::Read => "READ",
            PermLevel::Write => "WRITE",
            PermLevel::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ordered() {
        assert!(PermLevel::None < PermLevel::Read);
        assert!(PermLevel::Read < PermLevel::Write);
        assert!(PermLevel::Write < PermLevel::Admin);
    }

    #[test]
    fn allows_is_at_least() {
        assert!(PermLevel::Admin.allows(PermLevel::Read));
        assert!(PermLevel::Read.allows(PermLevel::Read));
        assert!(!PermLevel::None.allows(PermLevel::Read));
        assert!(!PermLevel::Read.allows(PermLevel::Write));
    }

    #[test]
    fn parse_is_exact_symbolic_match() {
        assert_eq!("WRITE".parse::<PermLevel>().unwrap(), PermLevel::Write);
        assert!("write".parse::<PermLevel>().is_err());
        assert!("".parse::<PermLevel>().is_err());
        assert!("EVERYTHING".parse::<PermLevel>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for level in [PermLevel::None, PermLevel::Read, PermLevel::Write, PermLevel::Admin] {
            assert_eq!(level.to_string().parse::<PermLevel>().unwrap(), level);
        }
    }
}
