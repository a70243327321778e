//! Integration tests for the helpfulness vote ledger.
//!
//! Covers the create / remove / switch cycle, counter agreement with the
//! vote rows, and concurrent casts against one review.

mod common;

use crate::common::{create_test_business, create_test_review, create_test_user, TestHarness};
use futures::future::join_all;
use std::time::Duration;
use review_engine::common::{ReviewEngineError, ReviewId, UserId};
use review_engine::domains::reviews::{Review, VoteCounts};
use review_engine::domains::users::UserRole;
use review_engine::domains::votes::{
    cast_vote, list_user_votes, reconcile_vote_counts, VoteAction, VoteType,
};
use test_context::test_context;

async fn review_with_voter(ctx: &TestHarness) -> (ReviewId, UserId) {
    let business_id = create_test_business(&ctx.db_pool).await.unwrap();
    let review_id = create_test_review(&ctx.deps, business_id, 4.0).await.unwrap();
    let voter = create_test_user(&ctx.db_pool, UserRole::User).await.unwrap();
    (review_id, voter)
}

async fn stored_counts(ctx: &TestHarness, review_id: ReviewId) -> VoteCounts {
    let review = Review::find_by_id(review_id, &ctx.db_pool)
        .await
        .unwrap()
        .expect("review exists");
    VoteCounts {
        helpful_count: review.helpful_count,
        not_helpful_count: review.not_helpful_count,
    }
}

async fn recounted(ctx: &TestHarness, review_id: ReviewId) -> (i64, i64) {
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE vote_type = 'helpful'),
            COUNT(*) FILTER (WHERE vote_type = 'not_helpful')
        FROM review_votes
        WHERE review_id = $1
        "#,
    )
    .bind(review_id)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap()
}

// =============================================================================
// Create / remove / switch
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn first_vote_is_created(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    let outcome = cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();

    assert_eq!(outcome.action, VoteAction::Created);
    assert_eq!(outcome.user_vote, Some(VoteType::Helpful));
    assert_eq!(outcome.helpful_count, 1);
    assert_eq!(outcome.not_helpful_count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn same_vote_twice_removes_it(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();
    let outcome = cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();

    assert_eq!(outcome.action, VoteAction::Removed);
    assert_eq!(outcome.user_vote, None);
    assert_eq!(outcome.helpful_count, 0);
    assert_eq!(outcome.not_helpful_count, 0);
    assert_eq!(recounted(ctx, review_id).await, (0, 0));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn opposite_vote_switches_counters(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();
    let outcome = cast_vote(review_id, voter, "not_helpful", &ctx.deps)
        .await
        .unwrap();

    assert_eq!(outcome.action, VoteAction::Switched);
    assert_eq!(outcome.user_vote, Some(VoteType::NotHelpful));
    assert_eq!(outcome.helpful_count, 0);
    assert_eq!(outcome.not_helpful_count, 1);
    assert_eq!(
        stored_counts(ctx, review_id).await,
        VoteCounts {
            helpful_count: 0,
            not_helpful_count: 1
        }
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn counters_match_votes_after_mixed_sequence(ctx: &TestHarness) {
    let business_id = create_test_business(&ctx.db_pool).await.unwrap();
    let review_id = create_test_review(&ctx.deps, business_id, 3.0).await.unwrap();

    let mut voters = Vec::new();
    for _ in 0..4 {
        voters.push(create_test_user(&ctx.db_pool, UserRole::User).await.unwrap());
    }

    let casts = [
        (0, "helpful"),
        (1, "helpful"),
        (2, "not_helpful"),
        (1, "not_helpful"),
        (3, "helpful"),
        (0, "helpful"),
        (2, "not_helpful"),
        (3, "not_helpful"),
    ];
    for (voter, vote_type) in casts {
        cast_vote(review_id, voters[voter], vote_type, &ctx.deps)
            .await
            .unwrap();
    }

    // voter 0: removed, voter 1: not_helpful, voter 2: removed, voter 3: not_helpful
    let counts = stored_counts(ctx, review_id).await;
    assert_eq!(
        counts,
        VoteCounts {
            helpful_count: 0,
            not_helpful_count: 2
        }
    );
    let (helpful, not_helpful) = recounted(ctx, review_id).await;
    assert_eq!(counts.helpful_count as i64, helpful);
    assert_eq!(counts.not_helpful_count as i64, not_helpful);
}

// =============================================================================
// Errors
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_review_is_not_found(ctx: &TestHarness) {
    let voter = create_test_user(&ctx.db_pool, UserRole::User).await.unwrap();

    let result = cast_vote(ReviewId::new(), voter, "helpful", &ctx.deps).await;

    assert!(matches!(result, Err(ReviewEngineError::NotFound(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_vote_type_is_invalid_input_and_writes_nothing(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    let result = cast_vote(review_id, voter, "funny", &ctx.deps).await;

    assert!(matches!(result, Err(ReviewEngineError::InvalidInput(_))));
    assert_eq!(recounted(ctx, review_id).await, (0, 0));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_from_different_users_all_count(ctx: &TestHarness) {
    let business_id = create_test_business(&ctx.db_pool).await.unwrap();
    let review_id = create_test_review(&ctx.deps, business_id, 5.0).await.unwrap();

    let mut voters = Vec::new();
    for _ in 0..10 {
        voters.push(create_test_user(&ctx.db_pool, UserRole::User).await.unwrap());
    }

    let results = join_all(
        voters
            .iter()
            .map(|voter| cast_vote(review_id, *voter, "helpful", &ctx.deps)),
    )
    .await;

    for result in results {
        assert_eq!(result.unwrap().action, VoteAction::Created);
    }
    assert_eq!(stored_counts(ctx, review_id).await.helpful_count, 10);
    assert_eq!(recounted(ctx, review_id).await, (10, 0));
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_casts_by_one_user_keep_a_single_vote(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    let results = join_all((0..3).map(|_| cast_vote(review_id, voter, "helpful", &ctx.deps))).await;

    // Serialized outcomes: created, removed, created
    let mut created = 0;
    let mut removed = 0;
    let mut failed = 0;
    for result in results {
        match result {
            Ok(outcome) if outcome.action == VoteAction::Created => created += 1,
            Ok(outcome) if outcome.action == VoteAction::Removed => removed += 1,
            Ok(outcome) => panic!("unexpected action {}", outcome.action),
            Err(e) => {
                assert!(e.is_retryable(), "unexpected error: {}", e);
                failed += 1;
            }
        }
    }

    let (helpful, not_helpful) = recounted(ctx, review_id).await;
    if failed == 0 {
        assert_eq!((created, removed), (2, 1));
        assert_eq!(helpful, 1);
    } else {
        // Every committed cast toggled the single vote once
        assert_eq!(helpful, created - removed);
        assert!((0..=1).contains(&helpful));
    }
    assert_eq!(not_helpful, 0);
    assert_eq!(stored_counts(ctx, review_id).await.helpful_count as i64, helpful);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn expired_cast_leaves_no_vote_and_can_be_retried(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;

    let expired = ctx.deps_with_timeout(Duration::ZERO);
    let result = cast_vote(review_id, voter, "helpful", &expired).await;

    assert!(matches!(result, Err(ReviewEngineError::StoreUnavailable(_))));
    assert_eq!(recounted(ctx, review_id).await, (0, 0));

    // The retry is the first cast that lands, not a toggle back off
    let retried = cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();
    assert_eq!(retried.action, VoteAction::Created);
    assert_eq!(retried.helpful_count, 1);
}

// =============================================================================
// Queries and repair
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn list_user_votes_returns_only_reviews_with_a_vote(ctx: &TestHarness) {
    let business_id = create_test_business(&ctx.db_pool).await.unwrap();
    let first = create_test_review(&ctx.deps, business_id, 4.0).await.unwrap();
    let second = create_test_review(&ctx.deps, business_id, 2.0).await.unwrap();
    let third = create_test_review(&ctx.deps, business_id, 5.0).await.unwrap();
    let voter = create_test_user(&ctx.db_pool, UserRole::User).await.unwrap();

    cast_vote(first, voter, "helpful", &ctx.deps).await.unwrap();
    cast_vote(second, voter, "not_helpful", &ctx.deps).await.unwrap();

    let votes = list_user_votes(voter, &[first, second, third], &ctx.deps)
        .await
        .unwrap();

    assert_eq!(votes.len(), 2);
    assert_eq!(votes.get(&first), Some(&VoteType::Helpful));
    assert_eq!(votes.get(&second), Some(&VoteType::NotHelpful));
    assert!(!votes.contains_key(&third));

    let none = list_user_votes(voter, &[], &ctx.deps).await.unwrap();
    assert!(none.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reconcile_repairs_drifted_counters(ctx: &TestHarness) {
    let (review_id, voter) = review_with_voter(ctx).await;
    cast_vote(review_id, voter, "helpful", &ctx.deps).await.unwrap();

    sqlx::query("UPDATE reviews SET helpful_count = 7, not_helpful_count = 3 WHERE id = $1")
        .bind(review_id)
        .execute(&ctx.db_pool)
        .await
        .unwrap();

    let counts = reconcile_vote_counts(review_id, &ctx.deps).await.unwrap();

    let expected = VoteCounts {
        helpful_count: 1,
        not_helpful_count: 0,
    };
    assert_eq!(counts, expected);
    assert_eq!(stored_counts(ctx, review_id).await, expected);
}
