/// A single-valued reading (e.g. heart rate in BPM).
#[derive(Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Scalar(f64);

impl Scalar {
    pub fn new(data: f64) -> Self {
        Self(data)
    }

    pub fn inner(&self) -> f64 {
        self.0
    }
}

impl From<Scalar> for f64 {
    fn from(value: Scalar) -> Self {
        value.inner()
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
