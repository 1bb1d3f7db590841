pub mod access;
pub mod metrics;
pub mod session;
