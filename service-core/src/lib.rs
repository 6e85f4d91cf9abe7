//! service-core: Shared infrastructure for the CRM workspace crates.
pub mod error;
pub mod middleware;
pub mod observability;
