use crate::types::Task;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use colored::*;
use terminal_size::{Width, terminal_size};
use textwrap::wrap;

const WRAP_COLUMN: usize = 80;
const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

/// `list` output: a header followed by one `<id>\t<title>` row per task.
pub fn format_task_list(tasks: &[Task]) -> String {
    let mut out = "task id\ttitle".dimmed().to_string();
    for task in tasks {
        out.push('\n');
        out.push_str(&format!("{}\t{}", task.task_id, task.title));
    }
    out
}

/// `show` output: one framed block per task.
pub fn format_task_details(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "no pending tasks".dimmed().to_string();
    }

    let heavy = "=".repeat(WRAP_COLUMN);
    let light = "-".repeat(WRAP_COLUMN);
    let width = wrap_width();

    let mut out = String::new();
    for task in tasks {
        out.push_str(&format!("{}\n", heavy.dimmed()));
        let state = if task.done { " (done)" } else { "" };
        out.push_str(&format!(
            "Title: {} [Task ID:{}]{}\n",
            task.title.bold(),
            task.task_id,
            state.bright_green()
        ));
        out.push_str(&format!(
            "Create: {}\tLast Update: {}\n",
            format_timestamp(task.create_at),
            format_timestamp(task.update_at)
        ));
        out.push_str(&format!("{}\n", light.dimmed()));
        for line in wrap(task.description.trim_end(), width) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{}\n", heavy.dimmed()));
    }
    out
}

// Stored instants are UTC; the user reads wall-clock time.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    let local = dt.with_timezone(&Local).naive_local();
    format!(
        "{} {}",
        local.format(TIMESTAMP_DISPLAY),
        format!("({})", pretty_time(local)).dimmed()
    )
}

fn pretty_time(dt: NaiveDateTime) -> String {
    pretty_time_from(dt, Local::now().naive_local())
}

fn pretty_time_from(dt: NaiveDateTime, now: NaiveDateTime) -> String {
    let secs = (dt - now).num_seconds();
    let future = secs > 0;
    let abs_secs = secs.abs();

    if abs_secs < 60 {
        return "just now".into();
    }

    if abs_secs < 86_400 {
        let mins = abs_secs / 60;
        let hours = mins / 60;
        let minutes = mins % 60;

        let mut parts = Vec::new();
        if hours > 0 {
            parts.push(format!("{}h", hours));
        }
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }

        let phrase = parts.join(" ");
        return if future {
            format!("in {}", phrase)
        } else {
            format!("{} ago", phrase)
        };
    }

    let diff_days = (dt.date() - now.date()).num_days();

    match diff_days {
        -1 => format!("yesterday at {}", dt.format("%H:%M")),
        1 => format!("tomorrow at {}", dt.format("%H:%M")),
        -6..=6 => dt.format("%A at %H:%M").to_string(),
        _ => dt.format("%Y-%m-%d").to_string(),
    }
}

fn wrap_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(WRAP_COLUMN)
        .min(WRAP_COLUMN)
        .max(20)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskId;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn utc_of_local(dt: NaiveDateTime) -> DateTime<Utc> {
        Local
            .from_local_datetime(&dt)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn task(id: i64, title: &str, description: &str) -> Task {
        Task {
            task_id: TaskId(id),
            title: title.into(),
            description: description.into(),
            create_at: utc_of_local(at(9, 0)),
            update_at: utc_of_local(at(9, 30)),
            done: false,
        }
    }

    #[test]
    fn list_rows_are_tab_separated() {
        let out = format_task_list(&[task(1, "Buy milk", ""), task(3, "Call mom", "")]);
        let rows: Vec<_> = out.lines().skip(1).collect();
        assert_eq!(rows, vec!["1\tBuy milk", "3\tCall mom"]);
    }

    #[test]
    fn empty_list_is_only_the_header() {
        let out = format_task_list(&[]);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("task id\ttitle"));
    }

    #[test]
    fn details_block_contains_every_field() {
        let out = format_task_details(&[task(2, "Write report", "# Write report\n\nintro\n\n")]);
        assert!(out.contains("[Task ID:2]"));
        assert!(!out.contains("(done)"));
        assert!(out.contains("Write report"));
        assert!(out.contains("Create: 2026-10-18 09:00:00"));
        assert!(out.contains("Last Update: 2026-10-18 09:30:00"));
        assert!(out.contains("intro\n"));
        assert!(out.contains(&"=".repeat(80)));
        assert!(out.contains(&"-".repeat(80)));
    }

    #[test]
    fn timestamps_render_in_local_time() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 18, 3, 15, 0).unwrap();
        let mut t = task(4, "Night shift", "");
        t.create_at = instant;

        let expected = instant.with_timezone(&Local).format(TIMESTAMP_DISPLAY).to_string();
        let out = format_task_details(&[t]);
        assert!(out.contains(&format!("Create: {expected}")));
    }

    #[test]
    fn completed_tasks_are_marked() {
        let mut finished = task(5, "Ship it", "");
        finished.done = true;
        assert!(format_task_details(&[finished]).contains("(done)"));
    }

    #[test]
    fn relative_times() {
        let now = at(12, 0);
        assert_eq!(pretty_time_from(now, now), "just now");
        assert_eq!(pretty_time_from(at(9, 55), now), "2h 5m ago");
        assert_eq!(pretty_time_from(at(11, 30), now), "30m ago");
        assert_eq!(pretty_time_from(at(14, 0), now), "in 2h");
        assert_eq!(
            pretty_time_from(now - Duration::days(1) - Duration::hours(2), now),
            "yesterday at 10:00"
        );
        assert_eq!(
            pretty_time_from(now - Duration::days(30), now),
            "2026-09-18"
        );
    }
}
