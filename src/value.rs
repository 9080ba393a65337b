use std::fmt::{self, Display};

/// Value of a computed metric, tagged by its native kind.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricValue {
    Double(f64),
    Uint64(u64),
    Int64(i64),
    /// Percentage in `0.0..=100.0`.
    Percent(f64),
    /// Bytes per second.
    Throughput(u64),
    /// Utilization level, `0` (idle) to `10` (max).
    UtilizationLevel(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Double,
    Uint64,
    Int64,
    Percent,
    Throughput,
    UtilizationLevel,
}

impl MetricValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Double(_) => ValueKind::Double,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Int64(_) => ValueKind::Int64,
            Self::Percent(_) => ValueKind::Percent,
            Self::Throughput(_) => ValueKind::Throughput,
            Self::UtilizationLevel(_) => ValueKind::UtilizationLevel,
        }
    }

    /// Lossy conversion for callers that only plot or compare values.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Double(v) | Self::Percent(v) => v,
            Self::Uint64(v) | Self::Throughput(v) => v as _,
            Self::Int64(v) => v as _,
            Self::UtilizationLevel(v) => v as _,
        }
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{}", v),
            Self::Uint64(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Percent(v) => write!(f, "{}%", v),
            Self::Throughput(v) => write!(f, "{} bytes/sec", v),
            Self::UtilizationLevel(v) => write!(f, "utilization level {}", v),
        }
    }
}
