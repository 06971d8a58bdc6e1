// Snapshot field values
//
// A reading is either a value, a known absence ("N/A"), or a failure with a
// reason ("N/A (reason)"). Absence and failure render differently so a
// missing sensor is never mistaken for a broken one.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Value(T),
    NotAvailable,
    Failed(String),
}

impl<T> Reading<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Reading::Failed(reason.into())
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Reading::Value(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reading<U> {
        match self {
            Reading::Value(v) => Reading::Value(f(v)),
            Reading::NotAvailable => Reading::NotAvailable,
            Reading::Failed(reason) => Reading::Failed(reason),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Reading<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => v.fmt(f),
            Reading::NotAvailable => f.write_str("N/A"),
            Reading::Failed(reason) => write!(f, "N/A ({})", reason),
        }
    }
}

/// Percentage, rendered with one decimal (`42.5%`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percent(pub f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Degrees Celsius (`55.2°C`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celsius(pub f32);

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Throughput in megabits per second (`45.67 Mbps`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mbps(pub f64);

impl Mbps {
    /// Bytes moved over `secs` seconds.
    pub fn from_transfer(bytes: u64, secs: f64) -> Self {
        if secs <= 0.0 {
            return Mbps(0.0);
        }
        Mbps(bytes as f64 * 8.0 / secs / 1_000_000.0)
    }
}

impl fmt::Display for Mbps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Mbps", self.0)
    }
}

/// Latency in milliseconds (`25 ms`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Millis(pub f64);

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_display() {
        assert_eq!(Reading::Value(Percent(12.0)).to_string(), "12.0%");
        assert_eq!(Reading::<Percent>::NotAvailable.to_string(), "N/A");
        assert_eq!(
            Reading::<Percent>::failed("speed test error").to_string(),
            "N/A (speed test error)"
        );
    }

    #[test]
    fn test_units() {
        assert_eq!(Celsius(55.23).to_string(), "55.2°C");
        assert_eq!(Millis(24.6).to_string(), "25 ms");
        assert_eq!(Mbps::from_transfer(10_000_000, 2.0).to_string(), "40.00 Mbps");
        assert_eq!(Mbps::from_transfer(1, 0.0), Mbps(0.0));
    }

    #[test]
    fn test_map_keeps_absence() {
        let r: Reading<u32> = Reading::NotAvailable;
        assert_eq!(r.map(|v| v * 2), Reading::NotAvailable);
        assert_eq!(Reading::Value(2).map(|v| v * 2), Reading::Value(4));
    }
}
