pub mod backend_client;
pub mod envelope;
pub mod metrics;
pub mod session;
