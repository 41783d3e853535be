pub mod config;
pub mod errors;
pub mod session;
pub mod shutdown;
