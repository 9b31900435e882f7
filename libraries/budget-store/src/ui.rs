//! UI ephemeral state - selected date, report range, toast queue
//!
//! Owned by the presentation layer and never persisted.

use budget_core::types::{NewToast, ReportRange, Toast, ToastId, DEFAULT_TOAST_DURATION_MS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transient view state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(rename = "selectedDateISO")]
    pub selected_date_iso: String,
    pub report_range: ReportRange,
    pub toasts: Vec<Toast>,
    #[serde(skip)]
    default_toast_duration_ms: u64,
}

impl UiState {
    /// Initial state at `today`, toasts lasting `default_toast_duration_ms`
    pub fn new(today: DateTime<Utc>, default_toast_duration_ms: u64) -> Self {
        Self {
            selected_date_iso: today.format("%Y-%m-%d").to_string(),
            report_range: ReportRange::default(),
            toasts: Vec::new(),
            default_toast_duration_ms,
        }
    }

    pub fn set_selected_date(&mut self, date_iso: impl Into<String>) {
        self.selected_date_iso = date_iso.into();
    }

    pub fn set_report_range(&mut self, range: ReportRange) {
        self.report_range = range;
    }

    /// Append a toast; returns its id
    ///
    /// A missing or zero duration falls back to the configured default.
    pub fn add_toast(&mut self, toast: NewToast, now: DateTime<Utc>) -> ToastId {
        let id = ToastId::generate();
        self.toasts.push(Toast {
            id: id.clone(),
            message: toast.message,
            kind: toast.kind.unwrap_or_default(),
            duration_ms: toast
                .duration_ms
                .filter(|&ms| ms > 0)
                .unwrap_or(self.default_toast_duration_ms),
            created_at: now,
        });
        id
    }

    /// Dismiss one toast; `false` if it was already gone
    pub fn remove_toast(&mut self, id: &ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| &toast.id != id);
        self.toasts.len() != before
    }

    pub fn clear_toasts(&mut self) {
        self.toasts.clear();
    }

    /// Drop toasts whose display window has elapsed; returns how many
    pub fn expire_toasts(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|toast| !toast.is_expired(now));
        before - self.toasts.len()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(Utc::now(), DEFAULT_TOAST_DURATION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::types::ToastKind;
    use chrono::{Duration, TimeZone};

    fn ui() -> UiState {
        UiState::new(Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap(), 5000)
    }

    #[test]
    fn initial_state() {
        let ui = ui();
        assert_eq!(ui.selected_date_iso, "2024-03-05");
        assert_eq!(ui.report_range, ReportRange::SixMonths);
        assert!(ui.toasts.is_empty());
    }

    #[test]
    fn toasts_keep_insertion_order_and_defaults() {
        let mut ui = ui();
        let now = Utc::now();
        let first = ui.add_toast(NewToast::info("one"), now);
        let second = ui.add_toast(
            NewToast {
                message: "two".to_string(),
                kind: Some(ToastKind::Warning),
                duration_ms: Some(1000),
            },
            now,
        );

        assert_eq!(ui.toasts[0].id, first);
        assert_eq!(ui.toasts[0].kind, ToastKind::Info);
        assert_eq!(ui.toasts[0].duration_ms, 5000);
        assert_eq!(ui.toasts[1].id, second);
        assert_eq!(ui.toasts[1].duration_ms, 1000);
    }

    #[test]
    fn zero_duration_uses_default() {
        let mut ui = ui();
        let now = Utc::now();
        ui.add_toast(
            NewToast {
                message: "zero".to_string(),
                kind: Some(ToastKind::Success),
                duration_ms: Some(0),
            },
            now,
        );

        assert_eq!(ui.toasts[0].duration_ms, 5000);
        assert_eq!(ui.expire_toasts(now), 0);
        assert_eq!(ui.toasts.len(), 1);
    }

    #[test]
    fn toasts_are_independently_dismissible() {
        let mut ui = ui();
        let now = Utc::now();
        let first = ui.add_toast(NewToast::info("one"), now);
        let second = ui.add_toast(NewToast::info("two"), now);

        assert!(ui.remove_toast(&first));
        assert!(!ui.remove_toast(&first));
        assert_eq!(ui.toasts.len(), 1);
        assert_eq!(ui.toasts[0].id, second);

        ui.clear_toasts();
        assert!(ui.toasts.is_empty());
    }

    #[test]
    fn expire_drops_only_elapsed_toasts() {
        let mut ui = ui();
        let now = Utc::now();
        ui.add_toast(
            NewToast {
                message: "short".to_string(),
                kind: None,
                duration_ms: Some(100),
            },
            now,
        );
        ui.add_toast(NewToast::info("long"), now);

        let expired = ui.expire_toasts(now + Duration::milliseconds(200));
        assert_eq!(expired, 1);
        assert_eq!(ui.toasts[0].message, "long");
    }
}
