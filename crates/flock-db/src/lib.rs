//! # flock-db
//!
//! Storage layer implementing the repository traits of `flock-core`.
//!
//! ## Overview
//!
//! - Connection pool management and embedded migrations
//! - Database models with SQLx `FromRow` derives
//! - Row ↔ entity mappers
//! - PostgreSQL repository implementations
//! - [`MemoryStore`], an in-memory backend for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flock_db::{create_pool, run_migrations, PgMemberRepository, PoolSettings};
//! use flock_core::traits::MemberRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolSettings::new("postgres://localhost/flock")).await?;
//!     run_migrations(&pool).await?;
//!     let members = PgMemberRepository::new(pool);
//!     let located = members.find_with_location(2000).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgHealthProbe, PgPool, PoolSettings};
pub use repositories::{
    PgAssignmentRepository, PgDutyRepository, PgGroupRepository, PgMemberRepository,
    PgPushSubscriptionRepository, PgReportRepository, PgSmsLogRepository, PgTerritoryRepository,
};
