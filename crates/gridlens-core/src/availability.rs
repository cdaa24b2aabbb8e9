// Metric availability: distinguishes "computed as zero" from "not computable".

use serde::Serialize;

/// A metric that is either computed or explicitly unavailable.
///
/// Serialized as `{"status": "available", "value": ...}` or
/// `{"status": "unavailable", "value": {"reason": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Availability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }

    /// `Available` for `Some`, otherwise `Unavailable` with `reason`.
    pub fn from_option(value: Option<T>, reason: impl Into<String>) -> Self {
        match value {
            Some(v) => Availability::Available(v),
            None => Availability::unavailable(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_unavailable_serialize_differently() {
        let zero: Availability<f64> = Availability::Available(0.0);
        let missing: Availability<f64> = Availability::unavailable("no draft data");

        let zero_json = serde_json::to_value(&zero).unwrap();
        let missing_json = serde_json::to_value(&missing).unwrap();

        assert_eq!(zero_json["status"], "available");
        assert_eq!(zero_json["value"], 0.0);
        assert_eq!(missing_json["status"], "unavailable");
        assert_eq!(missing_json["value"]["reason"], "no draft data");
    }

    #[test]
    fn from_option_keeps_reason_for_none() {
        let missing: Availability<u32> = Availability::from_option(None, "gone");
        assert_eq!(missing, Availability::unavailable("gone"));
        assert_eq!(missing.value(), None);
        assert!(!missing.is_available());

        let present = Availability::from_option(Some(4), "unused");
        assert_eq!(present.value(), Some(&4));
    }
}
