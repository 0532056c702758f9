//! A metric value that may be unavailable for lack of data.

use serde::{Deserialize, Serialize};

/// Either a computed value or `Undefined` when the input cannot support one
/// (for example a rate whose denominator is zero).
///
/// Serializes as the bare value or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure<T> {
    Value(T),
    Undefined,
}

impl<T> Measure<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Undefined => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Measure<U> {
        match self {
            Self::Value(v) => Measure::Value(f(v)),
            Self::Undefined => Measure::Undefined,
        }
    }
}

impl<T> From<Option<T>> for Measure<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Self::Value)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Measure<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::Undefined => f.write_str("N/A"),
        }
    }
}

/// Arithmetic mean, `Undefined` for an empty input.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Measure<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        Measure::Undefined
    } else {
        Measure::Value(sum / count as f64)
    }
}

/// `numerator / denominator` as a whole percentage, `Undefined` when the
/// denominator is zero.
pub(crate) fn percent(numerator: usize, denominator: usize) -> Measure<u8> {
    if denominator == 0 {
        return Measure::Undefined;
    }
    let pct = (numerator as f64 / denominator as f64 * 100.0).round();
    Measure::Value(pct.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_serializes_as_null() {
        let m: Measure<u8> = Measure::Undefined;
        assert_eq!(serde_json::to_string(&m).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Measure::Value(92u8)).unwrap(), "92");
    }

    #[test]
    fn display_renders_na() {
        assert_eq!(Measure::<u8>::Undefined.to_string(), "N/A");
        assert_eq!(Measure::Value(7u8).to_string(), "7");
    }

    #[test]
    fn mean_of_empty_is_undefined() {
        assert!(mean(std::iter::empty()).is_undefined());
        assert_eq!(mean([10.0, 20.0]), Measure::Value(15.0));
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent(0, 0), Measure::Undefined);
        assert_eq!(percent(2, 3), Measure::Value(67));
        assert_eq!(percent(1, 8), Measure::Value(13));
        assert_eq!(percent(5, 5), Measure::Value(100));
    }
}
