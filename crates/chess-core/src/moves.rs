//! Candidate moves as the user (or an analysis line) expresses them.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use shakmaty::{Role, Square};

use crate::error::RulesError;

static UCI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-h][1-8])([a-h][1-8])([qrbn])?$").expect("UCI move pattern compiles")
});

/// A move that has not been checked against any position yet.
///
/// Built either from UCI text (`e2e4`, `e7e8q`) or from a drag between two
/// squares. A drag never carries a promotion; the oracle promotes to a queen
/// when the move needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateMove {
    from: Square,
    to: Square,
    promotion: Option<Role>,
}

impl CandidateMove {
    pub fn drag(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn from_uci(text: &str) -> Result<Self, RulesError> {
        let lowered = text.trim().to_ascii_lowercase();
        let malformed = || RulesError::MalformedMove(text.to_string());

        let caps = UCI_RE.captures(&lowered).ok_or_else(malformed)?;
        let from: Square = caps[1].parse().map_err(|_| malformed())?;
        let to: Square = caps[2].parse().map_err(|_| malformed())?;
        let promotion = match caps.get(3) {
            Some(m) => {
                let c = m.as_str().chars().next().ok_or_else(malformed)?;
                Some(Role::from_char(c).ok_or_else(malformed)?)
            }
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }

    pub(crate) fn with_promotion(self, role: Role) -> Self {
        Self {
            promotion: Some(role),
            ..self
        }
    }
}

impl FromStr for CandidateMove {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for CandidateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_move() {
        let mv = CandidateMove::from_uci("e2e4").unwrap();
        assert_eq!(mv.from(), Square::E2);
        assert_eq!(mv.to(), Square::E4);
        assert_eq!(mv.promotion(), None);
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_parse_promotion_and_case() {
        let mv: CandidateMove = "E7E8Q".parse().unwrap();
        assert_eq!(mv.promotion(), Some(Role::Queen));
        assert_eq!(mv.to_string(), "e7e8q");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "e2", "e2e9", "i2e4", "e7e8k", "e2e4 e7e5"] {
            assert!(CandidateMove::from_uci(bad).is_err(), "{bad} should be rejected");
        }
    }
}
