pub mod review;

pub use review::{NewReview, RatingRow, Review, VoteCounts};
