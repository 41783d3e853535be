pub mod mock;
pub mod production;
