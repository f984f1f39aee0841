//! Trade participants and trust-badge derivation.

use std::fmt;

use super::ids::UserId;

/// Trust badge tier derived from a participant's trust score.
///
/// Derivation is centralized here; every surface that renders a participant
/// must go through [`TrustBadge::from_score`] so thresholds cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBadge {
    Pro,
    Premium,
    Verified,
}

impl TrustBadge {
    /// Derive the badge for a trust score in `0..=100`.
    ///
    /// Returns `None` below the lowest badge threshold.
    #[must_use]
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            95..=u8::MAX => Some(TrustBadge::Pro),
            85..=94 => Some(TrustBadge::Premium),
            70..=84 => Some(TrustBadge::Verified),
            _ => None,
        }
    }
}

impl fmt::Display for TrustBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrustBadge::Pro => "pro",
            TrustBadge::Premium => "premium",
            TrustBadge::Verified => "verified",
        };
        write!(f, "{label}")
    }
}

/// Presence indicator for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnlineStatus {
    Online,
    Away,
    #[default]
    Offline,
}

/// A marketplace participant as seen from either side of a trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    /// Trust score in `0..=100`.
    pub trust_score: u8,
    pub completed_trades: u32,
    /// Human-readable response-time hint, e.g. "replies within minutes".
    pub response_time: String,
    pub online_status: OnlineStatus,
}

impl Participant {
    /// The badge tier for this participant, if any.
    #[must_use]
    pub fn trust_badge(&self) -> Option<TrustBadge> {
        TrustBadge::from_score(self.trust_score)
    }
}
