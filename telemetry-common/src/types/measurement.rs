use crate::types::untimed::{Scalar, XYZ};

/// One decoded reading from a notification channel.
///
/// Channels carry different arities: 3-axis sensors produce `Triaxial`,
/// heart-rate produces `Scalar`, and the SensorTag combined movement payload
/// produces `Packed` with nine values in Gx..Gz, Ax..Az, Mx..Mz order.
///
/// # Examples
///
/// ```
/// use telemetry_common::{Measurement, XYZ};
///
/// let reading = Measurement::Triaxial(XYZ::new([1.0, 2.0, 3.0]));
/// assert_eq!(reading.values(), vec![1.0, 2.0, 3.0]);
/// assert_eq!(reading.arity(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    Triaxial(XYZ),
    Scalar(Scalar),
    Packed(Vec<f64>),
}

impl Measurement {
    /// Flattens the reading into column order.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Measurement::Triaxial(xyz) => xyz.clone().into(),
            Measurement::Scalar(scalar) => vec![scalar.inner()],
            Measurement::Packed(values) => values.clone(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Measurement::Triaxial(_) => 3,
            Measurement::Scalar(_) => 1,
            Measurement::Packed(values) => values.len(),
        }
    }
}

impl From<XYZ> for Measurement {
    fn from(value: XYZ) -> Self {
        Measurement::Triaxial(value)
    }
}

impl From<Scalar> for Measurement {
    fn from(value: Scalar) -> Self {
        Measurement::Scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_flatten_in_order() {
        let packed = Measurement::Packed(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(packed.arity(), 9);
        assert_eq!(packed.values()[3], 4.0);

        let scalar = Measurement::Scalar(Scalar::new(72.0));
        assert_eq!(scalar.values(), vec![72.0]);
    }
}
