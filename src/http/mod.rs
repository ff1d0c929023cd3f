//! HTTP surface: router, health check and static files

pub mod routes;

pub use routes::build_router;
