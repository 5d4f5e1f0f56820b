//! Database connection pool management

mod postgres;

pub use postgres::{
    create_pool, migrations_dir, run_migrations, PgHealthProbe, PoolSettings, MIGRATIONS_DIR_ENV,
};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
