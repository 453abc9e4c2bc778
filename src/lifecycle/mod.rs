//! @acp:module "Lifecycle"
//! @acp:summary "Reminders for urgent and overdue tags, and comment hygiene checks"
//! @acp:domain core
//! @acp:layer service
//!
//! Both passes are read-only views over indexed tags or raw file text. The
//! current date is always passed in, so callers and tests control time.

mod validate;

pub use validate::{
    validate_text, validate_workspace, validation_filter, Severity, ValidationIssue, DEFAULT_MAX_FILES,
    VALIDATED_EXTENSIONS,
};

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::index::{TagIndex, TagInfo};

/// Tag that is always due
pub const URGENT_TAG: &str = "URGENT";

/// Tag whose ISO date makes it overdue once old enough
pub const DATED_TAG: &str = "TODO";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("date regex"));

/// @acp:summary "Why a tag needs attention"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum ReminderReason {
    Urgent,
    Overdue { since: NaiveDate, days: i64 },
}

/// @acp:summary "An indexed tag that needs attention"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(flatten)]
    pub reason: ReminderReason,
    pub tag: TagInfo,
}

/// First ISO date (`YYYY-MM-DD`) on the line that is a real calendar date.
pub fn line_date(line: &str) -> Option<NaiveDate> {
    DATE_PATTERN
        .captures_iter(line)
        .find_map(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
}

/// @acp:summary "Collect urgent tags and TODOs dated more than `threshold_days` ago"
///
/// Every `URGENT` tag is reported. A `TODO` is reported when its line carries
/// a date strictly more than `threshold_days` whole days before `today`.
/// Urgent tags come first, each group in index order.
pub fn reminders(index: &TagIndex, threshold_days: u32, today: NaiveDate) -> Vec<Reminder> {
    let mut due: Vec<Reminder> = index
        .get(URGENT_TAG)
        .iter()
        .map(|info| Reminder {
            reason: ReminderReason::Urgent,
            tag: info.clone(),
        })
        .collect();

    for info in index.get(DATED_TAG) {
        let Some(since) = line_date(&info.full_line) else {
            continue;
        };
        let days = (today - since).num_days();
        if days > i64::from(threshold_days) {
            due.push(Reminder {
                reason: ReminderReason::Overdue { since, days },
                tag: info.clone(),
            });
        }
    }

    tracing::debug!("{} reminders due", due.len());
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn info(tag: &str, line: usize, full_line: &str) -> TagInfo {
        TagInfo {
            tag_name: tag.into(),
            file_path: "src/a.rs".into(),
            line,
            column: 3,
            text: tag.into(),
            full_line: full_line.into(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_line_date_skips_impossible_dates() {
        assert_eq!(line_date("// TODO 2024-13-40 then 2024-02-29"), Some(date("2024-02-29")));
        assert_eq!(line_date("// TODO soon"), None);
    }

    #[test]
    fn test_urgent_and_overdue() {
        let index = TagIndex::from_infos(vec![
            info("URGENT", 0, "// URGENT: prod is down"),
            info("TODO", 1, "// TODO(2024-01-01): stale"),
            info("TODO", 2, "// TODO(2024-01-08): exactly at threshold"),
            info("TODO", 3, "// TODO: undated"),
            info("FIXME", 4, "// FIXME 2020-01-01: not a dated tag"),
        ]);
        let due = reminders(&index, 7, date("2024-01-15"));

        let summary: Vec<(usize, ReminderReason)> = due.iter().map(|r| (r.tag.line, r.reason)).collect();
        assert_eq!(
            summary,
            vec![
                (0, ReminderReason::Urgent),
                (
                    1,
                    ReminderReason::Overdue {
                        since: date("2024-01-01"),
                        days: 14
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_future_dates_are_not_overdue() {
        let index = TagIndex::from_infos(vec![info("TODO", 0, "// TODO by 2030-06-01")]);
        assert!(reminders(&index, 0, date("2024-01-01")).is_empty());
    }

    #[test]
    fn test_reminder_json_shape() {
        let reminder = Reminder {
            reason: ReminderReason::Overdue {
                since: date("2024-01-01"),
                days: 14,
            },
            tag: info("TODO", 1, "// TODO(2024-01-01)"),
        };
        let value = serde_json::to_value(&reminder).unwrap();
        assert_eq!(value["reason"], "overdue");
        assert_eq!(value["since"], "2024-01-01");
        assert_eq!(value["days"], 14);
        assert_eq!(value["tag"]["tagName"], "TODO");
    }
}
