//! platform-core: shared infrastructure for the course platform frontend.
pub mod middleware;
pub mod observability;
