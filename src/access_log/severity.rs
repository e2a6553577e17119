//! Severity selection for access-log records.

use serde::Serialize;

/// Log level assigned to an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Chooses the level for a completed request.
    ///
    /// Attached errors always win. Otherwise 200-399 is info, 400-499 is
    /// warn, and everything else (1xx included) is error.
    pub fn for_response(status: u16, has_errors: bool) -> Self {
        if has_errors {
            return Severity::Error;
        }
        match status {
            200..=399 => Severity::Info,
            400..=499 => Severity::Warn,
            _ => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Severity::for_response(199, false), Severity::Error);
        assert_eq!(Severity::for_response(200, false), Severity::Info);
        assert_eq!(Severity::for_response(399, false), Severity::Info);
        assert_eq!(Severity::for_response(400, false), Severity::Warn);
        assert_eq!(Severity::for_response(499, false), Severity::Warn);
        assert_eq!(Severity::for_response(500, false), Severity::Error);
        assert_eq!(Severity::for_response(599, false), Severity::Error);
    }

    #[test]
    fn test_errors_escalate_any_status() {
        assert_eq!(Severity::for_response(200, true), Severity::Error);
        assert_eq!(Severity::for_response(302, true), Severity::Error);
        assert_eq!(Severity::for_response(404, true), Severity::Error);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warn).unwrap(), "\"warn\"");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    proptest! {
        #[test]
        fn property_mapping_is_total_and_disjoint(status in 100u16..1000u16) {
            let level = Severity::for_response(status, false);
            let expected = if (200..400).contains(&status) {
                Severity::Info
            } else if (400..500).contains(&status) {
                Severity::Warn
            } else {
                Severity::Error
            };
            prop_assert_eq!(level, expected);
            prop_assert_eq!(Severity::for_response(status, true), Severity::Error);
        }
    }
}
