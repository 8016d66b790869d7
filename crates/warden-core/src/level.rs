//! The six-step trust hierarchy.
//!
//! Every moderation decision is gated on a [`TrustLevel`]. The level space
//! is a closed enumeration: values outside 1–6 are rejected at the
//! boundary by [`TrustLevel::try_from`], never clamped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordinal trust rank, 1–6. Higher strictly dominates lower for all
/// authority checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TrustLevel {
    /// Ordinary chat member. New users start here.
    Member = 1,
    /// Supporter; no moderation authority, exempt from nothing.
    Supporter = 2,
    /// Junior moderator. First rank with moderation authority.
    JuniorModerator = 3,
    /// Full moderator. First rank allowed to ban.
    Moderator = 4,
    /// Junior administrator.
    JuniorAdmin = 5,
    /// Senior administrator. The ceiling; senior identities are pinned
    /// here and cannot be demoted.
    SeniorAdmin = 6,
}

/// A requested level fell outside the closed 1–6 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("trust level must be between 1 and 6, got {0}")]
pub struct InvalidLevel(pub i64);

impl TrustLevel {
    /// The lowest rank that counts as moderation staff. At or above this
    /// level spam history is not recorded and report fan-out applies.
    pub const MODERATOR_FLOOR: TrustLevel = TrustLevel::JuniorModerator;

    /// The lowest rank allowed to issue bans.
    pub const BAN_FLOOR: TrustLevel = TrustLevel::Moderator;

    /// The lowest rank allowed to change other users' levels.
    pub const ADMIN_FLOOR: TrustLevel = TrustLevel::JuniorAdmin;

    /// Returns the numeric rank (1–6).
    pub fn rank(self) -> i64 {
        self as i64
    }

    /// Whether this level counts as moderation staff.
    pub fn is_staff(self) -> bool {
        self >= Self::MODERATOR_FLOOR
    }

    /// Human-readable title for the rank.
    pub fn title(self) -> &'static str {
        match self {
            TrustLevel::Member => "Member",
            TrustLevel::Supporter => "Supporter",
            TrustLevel::JuniorModerator => "Junior Moderator",
            TrustLevel::Moderator => "Moderator",
            TrustLevel::JuniorAdmin => "Junior Admin",
            TrustLevel::SeniorAdmin => "Senior Admin",
        }
    }

    /// Iterates all levels from highest to lowest, the order rosters are
    /// rendered in.
    pub fn descending() -> impl Iterator<Item = TrustLevel> {
        [
            TrustLevel::SeniorAdmin,
            TrustLevel::JuniorAdmin,
            TrustLevel::Moderator,
            TrustLevel::JuniorModerator,
            TrustLevel::Supporter,
            TrustLevel::Member,
        ]
        .into_iter()
    }
}

impl TryFrom<i64> for TrustLevel {
    type Error = InvalidLevel;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TrustLevel::Member),
            2 => Ok(TrustLevel::Supporter),
            3 => Ok(TrustLevel::JuniorModerator),
            4 => Ok(TrustLevel::Moderator),
            5 => Ok(TrustLevel::JuniorAdmin),
            6 => Ok(TrustLevel::SeniorAdmin),
            other => Err(InvalidLevel(other)),
        }
    }
}

impl From<TrustLevel> for i64 {
    fn from(level: TrustLevel) -> Self {
        level.rank()
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
