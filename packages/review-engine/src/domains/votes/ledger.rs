//! Vote transitions for a single (review, user) pair.
//!
//! A user holds zero or one vote per review. Casting the type you already hold
//! retracts it, casting the other type switches it. `plan_vote` turns the
//! current state and the requested type into the action plus the counter
//! deltas the store must apply in the same commit.

use serde::{Deserialize, Serialize};

use crate::common::{EngineResult, ReviewEngineError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Helpful,
    NotHelpful,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Helpful => "helpful",
            VoteType::NotHelpful => "not_helpful",
        }
    }

    /// Counter deltas for adding one vote of this type
    fn unit(self) -> (i32, i32) {
        match self {
            VoteType::Helpful => (1, 0),
            VoteType::NotHelpful => (0, 1),
        }
    }
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoteType {
    type Err = ReviewEngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "helpful" => Ok(VoteType::Helpful),
            "not_helpful" => Ok(VoteType::NotHelpful),
            _ => Err(ReviewEngineError::InvalidInput(format!(
                "vote type must be 'helpful' or 'not_helpful', got '{}'",
                s
            ))),
        }
    }
}

/// What a cast did to the caller's vote
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Created,
    Removed,
    Switched,
}

impl std::fmt::Display for VoteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteAction::Created => write!(f, "created"),
            VoteAction::Removed => write!(f, "removed"),
            VoteAction::Switched => write!(f, "switched"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePlan {
    pub action: VoteAction,
    /// Vote the user holds afterwards (None once removed)
    pub resulting_vote: Option<VoteType>,
    pub helpful_delta: i32,
    pub not_helpful_delta: i32,
}

pub fn plan_vote(existing: Option<VoteType>, requested: VoteType) -> VotePlan {
    let (add_helpful, add_not_helpful) = requested.unit();

    match existing {
        None => VotePlan {
            action: VoteAction::Created,
            resulting_vote: Some(requested),
            helpful_delta: add_helpful,
            not_helpful_delta: add_not_helpful,
        },
        Some(current) if current == requested => VotePlan {
            action: VoteAction::Removed,
            resulting_vote: None,
            helpful_delta: -add_helpful,
            not_helpful_delta: -add_not_helpful,
        },
        Some(current) => {
            let (old_helpful, old_not_helpful) = current.unit();
            VotePlan {
                action: VoteAction::Switched,
                resulting_vote: Some(requested),
                helpful_delta: add_helpful - old_helpful,
                not_helpful_delta: add_not_helpful - old_not_helpful,
            }
        }
    }
}
