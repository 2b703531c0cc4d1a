//! # Repository Implementations
//!
//! Each repository owns the SQL for one aggregate:
//!
//! - [`catalog`] - Brands, phone models, problems, repair prices, and the
//!   site-wide discount (read model + maintainer writes)
//! - [`order`] - The order aggregate: atomic creation, guarded lifecycle
//!   updates, explicit recalculation
//!
//! Queries are runtime-checked (`sqlx::query_as` with `FromRow` derives on
//! the core entities) and every filter parameter is an explicit method
//! argument - no implicit default scoping.

pub mod catalog;
pub mod order;
