//! Claim state machine: `pending -> approved | rejected`, both terminal.

use serde::{Deserialize, Serialize};

use crate::common::{EngineResult, ReviewEngineError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }

    /// Next status for `decision`. Terminal claims refuse every decision so a
    /// retried resolve never replays its side effects.
    pub fn apply(self, decision: ClaimDecision) -> EngineResult<ClaimStatus> {
        if self.is_terminal() {
            return Err(ReviewEngineError::InvalidState(format!(
                "claim is already {}",
                self
            )));
        }
        Ok(match decision {
            ClaimDecision::Approve => ClaimStatus::Approved,
            ClaimDecision::Reject => ClaimStatus::Rejected,
        })
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid claim status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClaimDecision {
    Approve,
    Reject,
}

impl std::str::FromStr for ClaimDecision {
    type Err = ReviewEngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "approve" => Ok(ClaimDecision::Approve),
            "reject" => Ok(ClaimDecision::Reject),
            _ => Err(ReviewEngineError::InvalidInput(format!(
                "decision must be 'approve' or 'reject', got '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ClaimDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimDecision::Approve => write!(f, "approve"),
            ClaimDecision::Reject => write!(f, "reject"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_claims_accept_either_decision() {
        assert_eq!(
            ClaimStatus::Pending.apply(ClaimDecision::Approve).unwrap(),
            ClaimStatus::Approved
        );
        assert_eq!(
            ClaimStatus::Pending.apply(ClaimDecision::Reject).unwrap(),
            ClaimStatus::Rejected
        );
    }

    #[test]
    fn terminal_claims_refuse_every_decision() {
        for status in [ClaimStatus::Approved, ClaimStatus::Rejected] {
            for decision in [ClaimDecision::Approve, ClaimDecision::Reject] {
                assert!(matches!(
                    status.apply(decision),
                    Err(ReviewEngineError::InvalidState(_))
                ));
            }
        }
    }

    #[test]
    fn unknown_decisions_are_invalid_input() {
        assert!(matches!(
            "maybe".parse::<ClaimDecision>(),
            Err(ReviewEngineError::InvalidInput(_))
        ));
        assert_eq!("reject".parse::<ClaimDecision>().unwrap(), ClaimDecision::Reject);
    }
}
