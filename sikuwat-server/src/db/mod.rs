//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - Every list is one query with `COUNT(*) OVER()` for the total
//! - Ownership is a `WHERE user_id = $n` predicate, never a read-then-check

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_lazy_pool, create_pool, create_pool_with_options};
pub use repos::*;
