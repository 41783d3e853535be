pub mod channels;
pub mod clock;
pub mod device;
pub mod measurement;
pub mod sample;
pub mod untimed;

pub use channels::ChannelKind;
pub use clock::Clock;
pub use device::DeviceIdentity;
pub use measurement::Measurement;
pub use sample::Sample;
pub use untimed::{Scalar, XYZ};
