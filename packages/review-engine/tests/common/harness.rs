//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared across every test in a binary. The
//! container starts and migrations run on the first test; later tests reuse it.

use anyhow::{Context, Result};
use review_engine::kernel::{NotificationDispatcher, ServerDeps, SpyNotifier};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Deadline given to engine operations under test
pub const TEST_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// How long tests wait for the notification worker
pub const NOTIFY_WAIT: Duration = Duration::from_secs(2);

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=review_engine=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test context: a fresh pool on the shared database plus engine deps
/// whose notifier is a spy.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let outcome = cast_vote(review_id, user_id, "helpful", &ctx.deps).await;
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for fixtures and direct assertions
    pub db_pool: PgPool,
    pub deps: ServerDeps,
    /// Receives every notification the engine dispatches in this test
    pub notifier: Arc<SpyNotifier>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let (notifier, dispatcher) = SpyNotifier::dispatcher();

        Ok(Self {
            deps: ServerDeps::new(db_pool.clone(), dispatcher, TEST_OPERATION_TIMEOUT),
            db_pool,
            notifier,
        })
    }

    /// Same database, different notifier
    pub fn deps_with(&self, notifications: NotificationDispatcher) -> ServerDeps {
        ServerDeps::new(self.db_pool.clone(), notifications, TEST_OPERATION_TIMEOUT)
    }

    /// Same database and notifier, different operation deadline
    pub fn deps_with_timeout(&self, operation_timeout: Duration) -> ServerDeps {
        ServerDeps::new(
            self.db_pool.clone(),
            self.deps.notifications.clone(),
            operation_timeout,
        )
    }
}
