//! Authorization checks over the trust hierarchy.
//!
//! These are pure decision functions: they never touch storage, so the
//! caller is responsible for looking up levels (and the senior flag)
//! first. Denials are ordinary values, not errors — an unauthorized
//! request is an expected outcome, not a fault.

use thiserror::Error;

use crate::level::TrustLevel;

/// Why a level change was denied.
///
/// The gates in [`check_set_level`] are evaluated in a fixed order, so
/// the reason a caller sees is deterministic for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SetLevelDenied {
    /// Senior identities cannot have their level changed by anyone else.
    #[error("senior admins cannot have their level changed")]
    SeniorImmutable,
    /// The actor does not outrank the target.
    #[error("insufficient authority over the target user")]
    Outranked,
    /// The requested level is not strictly below the actor's own.
    #[error("cannot grant a level at or above your own")]
    AboveOwnLevel,
}

/// Whether `actor` may mute `target`.
///
/// Senior identities can never be muted by someone else. Otherwise the
/// actor must strictly outrank the target.
pub fn can_mute(
    actor: TrustLevel,
    target: TrustLevel,
    target_is_senior: bool,
    actor_is_target: bool,
) -> bool {
    if target_is_senior && !actor_is_target {
        return false;
    }
    actor > target
}

/// Whether `actor` may ban `target`.
///
/// Banning is held to a higher bar than muting: only full moderators and
/// above qualify, and seniors are untouchable outright.
pub fn can_ban(actor: TrustLevel, target: TrustLevel, target_is_senior: bool) -> bool {
    if target_is_senior {
        return false;
    }
    actor >= TrustLevel::BAN_FLOOR && actor > target
}

/// Checks whether `actor` may set `target`'s level to `requested`.
///
/// Four independent gates, in order: senior targets are immutable by
/// others; the actor must outrank the target (self-edits are exempt only
/// so the no-op case does not trip the gate); the requested level must be
/// strictly below the actor's own; range enforcement happens earlier, at
/// [`TrustLevel::try_from`], so by the time a `TrustLevel` exists it is
/// already in 1–6.
pub fn check_set_level(
    actor: TrustLevel,
    target: TrustLevel,
    requested: TrustLevel,
    target_is_senior: bool,
    actor_is_target: bool,
) -> Result<(), SetLevelDenied> {
    if target_is_senior && !actor_is_target {
        return Err(SetLevelDenied::SeniorImmutable);
    }
    if actor <= target && !actor_is_target {
        return Err(SetLevelDenied::Outranked);
    }
    if requested >= actor && !actor_is_target {
        return Err(SetLevelDenied::AboveOwnLevel);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use TrustLevel::*;

    #[test]
    fn test_mute_requires_strict_dominance() {
        assert!(can_mute(Moderator, Member, false, false));
        assert!(!can_mute(Moderator, Moderator, false, false));
        assert!(!can_mute(JuniorModerator, Moderator, false, false));
    }

    #[test]
    fn test_seniors_cannot_be_muted_by_others() {
        assert!(!can_mute(SeniorAdmin, SeniorAdmin, true, false));
        // A senior restricting themselves is allowed through the senior
        // gate, but still fails strict dominance against an equal rank.
        assert!(!can_mute(SeniorAdmin, SeniorAdmin, true, true));
    }

    #[test]
    fn test_ban_floor() {
        assert!(!can_ban(JuniorModerator, Member, false));
        assert!(can_ban(Moderator, Member, false));
        assert!(can_ban(SeniorAdmin, JuniorAdmin, false));
        assert!(!can_ban(Moderator, Moderator, false));
        assert!(!can_ban(SeniorAdmin, SeniorAdmin, true));
    }

    #[test]
    fn test_set_level_requested_at_or_above_actor_rejected() {
        let err = check_set_level(JuniorAdmin, JuniorModerator, SeniorAdmin, false, false);
        assert_eq!(err, Err(SetLevelDenied::AboveOwnLevel));
        let err = check_set_level(JuniorAdmin, JuniorModerator, JuniorAdmin, false, false);
        assert_eq!(err, Err(SetLevelDenied::AboveOwnLevel));
    }

    #[test]
    fn test_set_level_senior_target_immutable() {
        let err = check_set_level(SeniorAdmin, SeniorAdmin, Member, true, false);
        assert_eq!(err, Err(SetLevelDenied::SeniorImmutable));
    }

    #[test]
    fn test_set_level_outranked() {
        let err = check_set_level(Moderator, Moderator, Member, false, false);
        assert_eq!(err, Err(SetLevelDenied::Outranked));
        let err = check_set_level(JuniorModerator, Moderator, Member, false, false);
        assert_eq!(err, Err(SetLevelDenied::Outranked));
    }

    #[test]
    fn test_set_level_accepted() {
        assert_eq!(
            check_set_level(JuniorAdmin, Member, Supporter, false, false),
            Ok(())
        );
    }

    #[test]
    fn test_set_level_gate_order_is_deterministic() {
        // Both the senior gate and the outrank gate apply here; the
        // senior gate must win because it is checked first.
        let err = check_set_level(Member, SeniorAdmin, Member, true, false);
        assert_eq!(err, Err(SetLevelDenied::SeniorImmutable));
    }
}
