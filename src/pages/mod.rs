//! One module per screen. Each `run` reads commands until the user
//! navigates away and returns where to go next.

pub mod auth;
pub mod dashboard;
pub mod exercises;
pub mod history;
pub mod stats;
pub mod templates;
pub mod workout;

use chrono::NaiveDate;

use liftlog_core::commands::history::WorkoutSummary;
use liftlog_core::service::Exercise;

use crate::app::NAV_HELP;
use crate::input::Input;

/// `62.5` stays as is, `100.0` prints as `100`.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{}", weight)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%a %-d %b %Y").to_string()
}

pub fn describe(summary: &WorkoutSummary) -> String {
    format!(
        "{}: {} exercises, {} sets, {} kg",
        format_date(summary.date),
        summary.exercise_count,
        summary.set_count,
        summary.volume
    )
}

pub fn print_catalog(catalog: &[Exercise]) {
    if catalog.is_empty() {
        println!("  No exercises yet.");
        return;
    }
    for (i, exercise) in catalog.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, exercise.name);
    }
}

pub fn print_help(commands: &[(&str, &str)]) {
    for (usage, what) in commands {
        println!("  {:<24} {}", usage, what);
    }
    println!("  Go to: {}", NAV_HELP);
}

/// The first `N` whitespace-separated arguments; the last one takes the
/// rest of the line. Missing arguments are empty.
pub fn parse_args<const N: usize>(rest: &str) -> [&str; N] {
    let mut args = [""; N];
    let mut remaining = rest.trim();
    for (i, slot) in args.iter_mut().enumerate() {
        if i + 1 == N {
            *slot = remaining;
            break;
        }
        let (head, tail) = remaining
            .split_once(char::is_whitespace)
            .unwrap_or((remaining, ""));
        *slot = head;
        remaining = tail.trim_start();
    }
    args
}

/// Ask a yes/no question; anything but `y` is no.
pub async fn confirm(input: &mut Input, question: &str) -> anyhow::Result<bool> {
    let answer = input.prompt(&format!("{} (y/N)", question)).await?;
    Ok(matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes")))
}
