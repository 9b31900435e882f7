/// Transient view-state types (never persisted)
use crate::types::ToastId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default toast lifetime in milliseconds
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5000;

/// Window of months shown by the analytics chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReportRange {
    #[serde(rename = "1m")]
    OneMonth,
    #[default]
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
}

impl ReportRange {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1m",
            Self::SixMonths => "6m",
            Self::TwelveMonths => "12m",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::OneMonth),
            "6m" => Some(Self::SixMonths),
            "12m" => Some(Self::TwelveMonths),
            _ => None,
        }
    }

    /// Number of months covered
    #[must_use]
    pub fn months(&self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }
}

impl std::fmt::Display for ReportRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visual category of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

/// A queued notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// Whether the toast's display window has elapsed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let lifetime = Duration::milliseconds(i64::try_from(self.duration_ms).unwrap_or(i64::MAX));
        self.created_at
            .checked_add_signed(lifetime)
            .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Request to show a toast
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToast {
    pub message: String,
    #[serde(default)]
    pub kind: Option<ToastKind>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl NewToast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(ToastKind::Success),
            duration_ms: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(ToastKind::Error),
            duration_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_range_round_trips_strings() {
        for range in [
            ReportRange::OneMonth,
            ReportRange::SixMonths,
            ReportRange::TwelveMonths,
        ] {
            assert_eq!(ReportRange::from_str(range.as_str()), Some(range));
        }
        assert_eq!(ReportRange::from_str("3m"), None);
        assert_eq!(ReportRange::default().months(), 6);
    }

    #[test]
    fn report_range_serializes_short_form() {
        let json = serde_json::to_string(&ReportRange::TwelveMonths).unwrap();
        assert_eq!(json, "\"12m\"");
    }

    #[test]
    fn toast_expiry() {
        let created_at = Utc::now();
        let toast = Toast {
            id: ToastId::new("t1"),
            message: "Saved".to_string(),
            kind: ToastKind::Success,
            duration_ms: 5000,
            created_at,
        };
        assert!(!toast.is_expired(created_at + Duration::milliseconds(4999)));
        assert!(toast.is_expired(created_at + Duration::milliseconds(5000)));
    }
}
