use liftlog_core::commands::exercises;
use liftlog_core::commands::stats::{self, DEFAULT_STATS_LIMIT};
use liftlog_core::service::{Exercise, User};

use super::{format_weight, print_catalog, print_help};
use crate::app::Route;
use crate::context::AppContext;
use crate::input::{parse_position, Input};

const COMMANDS: &[(&str, &str)] = &[
    ("<n>", "show progress for exercise n"),
    ("(enter)", "list exercises"),
];

pub async fn run(ctx: &AppContext, input: &mut Input, user: &User) -> anyhow::Result<Route> {
    let catalog = ctx
        .ok(exercises::list(ctx.service.as_ref(), &user.id).await)
        .unwrap_or_default();
    println!();
    println!("Progress by exercise");
    print_catalog(&catalog);

    loop {
        let Some(line) = input.prompt("stats").await? else {
            return Ok(Route::Quit);
        };
        if let Some(route) = Route::parse(&line) {
            return Ok(route);
        }
        if line.is_empty() {
            print_catalog(&catalog);
            continue;
        }
        match parse_position(&line).and_then(|i| catalog.get(i)) {
            Some(exercise) => show(ctx, user, exercise).await,
            None => print_help(COMMANDS),
        }
    }
}

async fn show(ctx: &AppContext, user: &User, exercise: &Exercise) {
    let Some(series) = ctx.ok(
        stats::series(ctx.service.as_ref(), &user.id, &exercise.id, DEFAULT_STATS_LIMIT).await,
    ) else {
        return;
    };

    println!();
    println!("{}", exercise.name);
    if series.is_empty() {
        println!("  Nothing logged for this exercise yet.");
        return;
    }

    println!("  {:<12} {:>10} {:>6} {:>5}", "date", "max kg", "reps", "sets");
    for point in &series {
        println!(
            "  {:<12} {:>10} {:>6} {:>5}",
            point.date.format("%Y-%m-%d").to_string(),
            format_weight(point.max_weight),
            point.total_reps,
            point.total_sets
        );
    }

    match stats::progress(&series) {
        Some(progress) => {
            println!(
                "  Weight {:+} kg ({:+}%), reps {:+} ({:+}%) over {} workouts",
                progress.weight_change,
                progress.weight_percent,
                progress.reps_change,
                progress.reps_percent,
                series.len()
            );
        }
        None => println!("  Log one more workout to see progress."),
    }
}
