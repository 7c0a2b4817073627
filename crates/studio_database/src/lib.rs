//! PostgreSQL persistence for Studio.
//!
//! This crate provides the diesel schema, row models and repositories for
//! accounts, voice history and subscription payments, plus [`PostgresStore`],
//! the pooled async adapter that implements the `studio_interface` seams.
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_database::{create_pool, run_migrations, PostgresStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(&std::env::var("DATABASE_URL")?, 10)?;
//! run_migrations(&mut pool.get()?)?;
//! let store = PostgresStore::new(pool);
//! # Ok(())
//! # }
//! ```

mod account_repository;
mod connection;
mod models;
mod store;
mod subscription_repository;

pub mod schema;

pub use account_repository::{AccountRepository, PostgresAccountRepository};
pub use connection::{DbPool, create_pool, run_migrations};
pub use models::{
    NewPaymentRow, NewUserRow, NewVoiceHistoryRow, PaymentRow, UsageChangeset, UserRow,
    VoiceHistoryRow,
};
pub use store::PostgresStore;
pub use subscription_repository::{PostgresSubscriptionRepository, SubscriptionRepository};

use studio_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
