//! Translation of raw engine progress events into snapshots.

use crate::RawProgressEvent;
use regex::Regex;
use std::sync::LazyLock;
use ytgrab_types::{NOT_AVAILABLE, ProgressSnapshot};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid escape pattern"));

/// Removes terminal color escape sequences from `s`.
#[must_use]
pub fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE.replace_all(s, "").into_owned()
}

/// Stateful translator from engine events to [`ProgressSnapshot`]s.
///
/// The translator remembers the last percentage it parsed so a malformed
/// event repeats the previous value instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ProgressTranslator {
    last_percent: u8,
}

impl ProgressTranslator {
    /// Creates a translator starting at 0%.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_percent: 0 }
    }

    /// Translates one event.
    ///
    /// Returns `None` for events whose status is not `downloading`.
    pub fn translate(&mut self, event: &RawProgressEvent) -> Option<ProgressSnapshot> {
        if !event.is_downloading() {
            return None;
        }

        if let Some(percent) = event.percent_str.as_deref().and_then(parse_percent) {
            self.last_percent = percent;
        }

        Some(ProgressSnapshot::new(
            self.last_percent,
            display_or_na(event.speed_str.as_deref()),
            display_or_na(event.eta_str.as_deref()),
        ))
    }
}

/// Parses a display percentage such as `" 45.0%"`, truncating to `0..=100`.
fn parse_percent(raw: &str) -> Option<u8> {
    let cleaned = strip_ansi(raw);
    let value: f64 = cleaned.trim().trim_end_matches('%').trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(0.0, 100.0) as u8)
}

fn display_or_na(value: Option<&str>) -> String {
    value
        .map(|s| strip_ansi(s).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_color_escapes() {
        let mut translator = ProgressTranslator::new();
        let event = RawProgressEvent::downloading("\x1b[0;32m45.0%\x1b[0m", None, None);
        let snapshot = translator.translate(&event).unwrap();
        assert_eq!(snapshot.percent, 45);
    }

    #[test]
    fn test_truncates_fraction() {
        let mut translator = ProgressTranslator::new();
        let event = RawProgressEvent::downloading(" 99.9%", Some("2.00MiB/s"), Some("00:01"));
        let snapshot = translator.translate(&event).unwrap();
        assert_eq!(snapshot.percent, 99);
        assert_eq!(snapshot.speed, "2.00MiB/s");
        assert_eq!(snapshot.eta, "00:01");
    }

    #[test]
    fn test_malformed_percent_keeps_previous() {
        let mut translator = ProgressTranslator::new();
        translator.translate(&RawProgressEvent::downloading("30.0%", None, None));

        let snapshot = translator
            .translate(&RawProgressEvent::downloading("Unknown%", None, None))
            .unwrap();
        assert_eq!(snapshot.percent, 30);

        let mut missing = RawProgressEvent::downloading("", None, None);
        missing.percent_str = None;
        assert_eq!(translator.translate(&missing).unwrap().percent, 30);
    }

    #[test]
    fn test_clamps_out_of_range() {
        let mut translator = ProgressTranslator::new();
        let high = translator
            .translate(&RawProgressEvent::downloading("130%", None, None))
            .unwrap();
        assert_eq!(high.percent, 100);
        let low = translator
            .translate(&RawProgressEvent::downloading("-5%", None, None))
            .unwrap();
        assert_eq!(low.percent, 0);
    }

    #[test]
    fn test_decrease_is_reported() {
        let mut translator = ProgressTranslator::new();
        translator.translate(&RawProgressEvent::downloading("80%", None, None));
        let snapshot = translator
            .translate(&RawProgressEvent::downloading("10%", None, None))
            .unwrap();
        assert_eq!(snapshot.percent, 10);
    }

    #[test]
    fn test_ignores_other_statuses() {
        let mut translator = ProgressTranslator::new();
        let event = RawProgressEvent {
            status: "finished".to_string(),
            percent_str: Some("100%".to_string()),
            ..Default::default()
        };
        assert!(translator.translate(&event).is_none());
        assert_eq!(translator.last_percent, 0);
    }

    #[test]
    fn test_missing_speed_and_eta_default() {
        let mut translator = ProgressTranslator::new();
        let snapshot = translator
            .translate(&RawProgressEvent::downloading("5%", None, Some("  ")))
            .unwrap();
        assert_eq!(snapshot.speed, NOT_AVAILABLE);
        assert_eq!(snapshot.eta, NOT_AVAILABLE);
    }
}
