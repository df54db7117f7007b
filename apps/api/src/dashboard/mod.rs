// Dashboard: a read-only summary of the caller's profile.

pub mod handlers;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::profile::SavedJob;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayActivity {
    pub day: String,
    pub saved: usize,
}

/// Saved jobs per UTC day for the 7 days ending `today`, oldest first.
pub fn weekly_activity(saved_jobs: &[SavedJob], today: NaiveDate) -> Vec<DayActivity> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let saved = saved_jobs
                .iter()
                .filter(|j| j.date_saved.date_naive() == date)
                .count();
            DayActivity {
                day: date.weekday().to_string(),
                saved,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn saved_on(y: i32, m: u32, d: u32, h: u32) -> SavedJob {
        SavedJob {
            id: Uuid::new_v4(),
            title: "Engineer".into(),
            company: "Acme".into(),
            url: None,
            description: None,
            date_saved: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_seven_buckets_ending_today() {
        // 2026-10-14 is a Wednesday.
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let days: Vec<String> = weekly_activity(&[], today)
            .into_iter()
            .map(|d| d.day)
            .collect();
        assert_eq!(days, vec!["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);
    }

    #[test]
    fn test_counts_jobs_inside_window_only() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let jobs = vec![
            saved_on(2026, 10, 14, 1),
            saved_on(2026, 10, 14, 23),
            saved_on(2026, 10, 8, 12),
            // Same weekday one week earlier: outside the window.
            saved_on(2026, 10, 7, 12),
        ];
        let activity = weekly_activity(&jobs, today);
        assert_eq!(activity[6], DayActivity { day: "Wed".into(), saved: 2 });
        assert_eq!(activity[0], DayActivity { day: "Thu".into(), saved: 1 });
        assert_eq!(activity.iter().map(|d| d.saved).sum::<usize>(), 3);
    }
}
