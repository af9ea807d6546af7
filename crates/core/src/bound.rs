use crate::error::{CodecError, Result};

/// How reconstruction error is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMetric {
    /// Maximum absolute per-coordinate deviation.
    Axis,
    /// Euclidean distance.
    L2,
}

impl ErrorMetric {
    pub fn to_byte(self) -> u8 {
        match self {
            ErrorMetric::Axis => 0,
            ErrorMetric::L2 => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ErrorMetric::Axis),
            1 => Some(ErrorMetric::L2),
            _ => None,
        }
    }

    /// Deviation of `d` (a displacement vector) under this metric.
    pub fn deviation(self, d: [f64; 3]) -> f64 {
        match self {
            ErrorMetric::Axis => d[0].abs().max(d[1].abs()).max(d[2].abs()),
            ErrorMetric::L2 => (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt(),
        }
    }
}

/// Maximum permitted reconstruction deviation.
///
/// Callers speak centimetres; internally the bound is kept in metres, the unit
/// of the point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ErrorBound {
    meters: f64,
}

impl ErrorBound {
    pub fn from_cm(cm: f64) -> Result<Self> {
        Self::from_meters(cm / 100.0)
    }

    pub fn from_meters(meters: f64) -> Result<Self> {
        if !meters.is_finite() || meters < 0.0 {
            return Err(CodecError::invalid_input(format!(
                "error bound must be finite and non-negative, got {} m",
                meters
            )));
        }
        Ok(Self { meters })
    }

    pub fn zero() -> Self {
        Self { meters: 0.0 }
    }

    pub fn meters(&self) -> f64 {
        self.meters
    }

    pub fn cm(&self) -> f64 {
        self.meters * 100.0
    }
}

impl Default for ErrorBound {
    /// 10 cm.
    fn default() -> Self {
        Self { meters: 0.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cm_converts_to_meters() {
        let bound = ErrorBound::from_cm(5.0).unwrap();
        assert!((bound.meters() - 0.05).abs() < 1e-12);
        assert!((bound.cm() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(ErrorBound::from_cm(-1.0).is_err());
        assert!(ErrorBound::from_cm(f64::NAN).is_err());
        assert!(ErrorBound::from_meters(f64::INFINITY).is_err());
        assert!(ErrorBound::from_cm(0.0).is_ok());
    }

    #[test]
    fn deviation_per_metric() {
        let d = [3.0, -4.0, 0.0];
        assert_eq!(ErrorMetric::Axis.deviation(d), 4.0);
        assert_eq!(ErrorMetric::L2.deviation(d), 5.0);
    }

    #[test]
    fn metric_byte_roundtrip() {
        for metric in [ErrorMetric::Axis, ErrorMetric::L2] {
            assert_eq!(ErrorMetric::from_byte(metric.to_byte()), Some(metric));
        }
        assert_eq!(ErrorMetric::from_byte(9), None);
    }
}
