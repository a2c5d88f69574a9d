//! iCalendar export: one all-day event per goal deadline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::Goal;
use crate::domain::ports::GoalRepository;
use crate::services::goal_service::GoalService;

const PRODUCT_ID: &str = "-//Mango//Goal Tree//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Which goals become calendar events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcsScope {
    /// Goals without sub-goals only
    #[default]
    Leaves,
    /// Every goal, in post order
    All,
}

impl IcsScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leaves => "leaves",
            Self::All => "all",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "leaves" => Some(Self::Leaves),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Render the goals selected by `scope` as an iCalendar document.
pub async fn export_ics<R: GoalRepository>(service: &GoalService<R>, scope: IcsScope) -> DomainResult<String> {
    let goals = match scope {
        IcsScope::Leaves => service.collect_leaves().await?,
        IcsScope::All => service.collect_all_post_order().await?,
    };
    debug!(scope = scope.as_str(), goals = goals.len(), "exporting calendar");
    Ok(render_calendar(&goals, Utc::now()))
}

/// Build the calendar text. Goals without a deadline are skipped.
pub fn render_calendar(goals: &[Goal], stamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODUCT_ID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");

    for goal in goals {
        let Some(deadline) = goal.deadline else {
            continue;
        };
        // All-day events end exclusively on the following day
        let end = deadline.succ_opt().unwrap_or(deadline);

        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}@mango", goal.id));
        push_line(&mut out, &format!("DTSTAMP:{dtstamp}"));
        push_line(&mut out, &format!("DTSTART;VALUE=DATE:{}", deadline.format("%Y%m%d")));
        push_line(&mut out, &format!("DTEND;VALUE=DATE:{}", end.format("%Y%m%d")));
        push_line(&mut out, &format!("CREATED:{}T000000Z", goal.created_on.format("%Y%m%d")));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&goal.name)));
        push_line(&mut out, &format!("DESCRIPTION:{}", escape_text(&goal.description)));
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Append a content line, folded at 75 octets, terminated by CRLF.
fn push_line(out: &mut String, line: &str) {
    let mut octets = 0;
    for c in line.chars() {
        if octets + c.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // The leading space counts towards the continuation line
            octets = 1;
        }
        out.push(c);
        octets += c.len_utf8();
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryGoalRepository, InMemoryImageStore};
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Arc;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 4, 2, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_render_event() {
        let mut goal = Goal::new("Paint, fence; now", "Line one\nline two")
            .with_deadline(NaiveDate::from_ymd_opt(2030, 12, 31).unwrap());
        goal.created_on = NaiveDate::from_ymd_opt(2030, 1, 5).unwrap();

        let ics = render_calendar(std::slice::from_ref(&goal), stamp());
        let lines: Vec<&str> = ics.split("\r\n").collect();

        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert!(lines.contains(&"VERSION:2.0"));
        assert!(lines.contains(&"DTSTAMP:20300402T083000Z"));
        assert!(lines.contains(&"DTSTART;VALUE=DATE:20301231"));
        assert!(lines.contains(&"DTEND;VALUE=DATE:20310101"));
        assert!(lines.contains(&"CREATED:20300105T000000Z"));
        assert!(lines.contains(&"SUMMARY:Paint\\, fence\\; now"));
        assert!(lines.contains(&"DESCRIPTION:Line one\\nline two"));
        assert!(lines.contains(&format!("UID:{}@mango", goal.id).as_str()));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_goals_without_deadline_are_skipped() {
        let ics = render_calendar(&[Goal::new("Someday", "")], stamp());
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[test]
    fn test_long_lines_are_folded() {
        let goal = Goal::new("x".repeat(200), "").with_deadline(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let ics = render_calendar(&[goal], stamp());

        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "{line}");
        }
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{}", "x".repeat(200))));
    }

    #[test]
    fn test_folding_respects_char_boundaries() {
        let mut out = String::new();
        push_line(&mut out, &"é".repeat(60));
        for line in out.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS);
        }
    }

    #[tokio::test]
    async fn test_export_scope() {
        let service = GoalService::new(Arc::new(InMemoryGoalRepository::new()), Arc::new(InMemoryImageStore::new()));
        let due = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let root = service.insert(Goal::new("Parent", "").with_deadline(due), None).await.unwrap();
        service.insert(Goal::new("Child", "").with_deadline(due), Some(root)).await.unwrap();

        let leaves = export_ics(&service, IcsScope::Leaves).await.unwrap();
        assert_eq!(leaves.matches("BEGIN:VEVENT").count(), 1);
        assert!(leaves.contains("SUMMARY:Child"));

        let all = export_ics(&service, IcsScope::All).await.unwrap();
        assert_eq!(all.matches("BEGIN:VEVENT").count(), 2);
        let child_at = all.find("SUMMARY:Child").unwrap();
        let parent_at = all.find("SUMMARY:Parent").unwrap();
        assert!(child_at < parent_at);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(IcsScope::from_str("ALL"), Some(IcsScope::All));
        assert_eq!(IcsScope::from_str("leaves"), Some(IcsScope::Leaves));
        assert_eq!(IcsScope::from_str("roots"), None);
    }
}
