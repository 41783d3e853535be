pub mod scalar;
pub mod xyz;

pub use crate::types::untimed::scalar::Scalar;
pub use crate::types::untimed::xyz::XYZ;
