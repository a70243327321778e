//! Typed ID definitions for every record the engine touches.
//!
//! ```rust
//! use review_engine::common::{ReviewId, UserId};
//!
//! let review_id: ReviewId = ReviewId::new();
//! let user_id: UserId = UserId::new();
//! // let wrong: ReviewId = user_id; // compile error
//! # let _ = (review_id, user_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (reviewers, claimants, owners).
pub struct User;

/// Marker type for Business listings.
pub struct Business;

/// Marker type for Review entities.
pub struct Review;

/// Marker type for helpfulness votes on a review.
pub struct ReviewVote;

/// Marker type for ownership claims on a business.
pub struct BusinessClaim;

/// Marker type for in-app notifications.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type BusinessId = Id<Business>;

pub type ReviewId = Id<Review>;

pub type VoteId = Id<ReviewVote>;

pub type ClaimId = Id<BusinessClaim>;

pub type NotificationId = Id<Notification>;
