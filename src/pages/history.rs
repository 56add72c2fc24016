use liftlog_core::commands::history::{self, WorkoutSummary, DEFAULT_HISTORY_LIMIT};
use liftlog_core::service::{User, WorkoutRecord};

use super::{confirm, describe, print_help};
use crate::app::Route;
use crate::context::AppContext;
use crate::input::{parse_position, split_command, Input};

const COMMANDS: &[(&str, &str)] = &[
    ("(enter)", "refresh"),
    ("open <n>", "open workout n for editing"),
    ("delete <n>", "delete workout n"),
];

pub async fn run(ctx: &AppContext, input: &mut Input, user: &User) -> anyhow::Result<Route> {
    let mut workouts = load(ctx, user).await;
    render(&workouts);

    loop {
        let Some(line) = input.prompt("history").await? else {
            return Ok(Route::Quit);
        };
        if let Some(route) = Route::parse(&line) {
            return Ok(route);
        }

        let (verb, rest) = split_command(&line);
        let picked = parse_position(rest).and_then(|i| workouts.get(i)).cloned();
        match (verb, picked) {
            ("", _) => {
                workouts = load(ctx, user).await;
                render(&workouts);
            }
            ("open", Some(workout)) => return Ok(Route::Workout(workout.date)),
            ("delete", Some(workout)) => {
                let Some(id) = workout.id.as_deref() else {
                    continue;
                };
                let question = format!("Delete the workout from {}?", workout.date);
                if confirm(input, &question).await?
                    && ctx
                        .ok(history::delete(ctx.service.as_ref(), id).await)
                        .is_some()
                {
                    ctx.success("Workout deleted");
                    workouts.retain(|w| w.id != workout.id);
                    render(&workouts);
                }
            }
            ("open" | "delete", None) => println!("  No workout {}", rest),
            _ => print_help(COMMANDS),
        }
    }
}

async fn load(ctx: &AppContext, user: &User) -> Vec<WorkoutRecord> {
    ctx.ok(history::recent(ctx.service.as_ref(), &user.id, DEFAULT_HISTORY_LIMIT).await)
        .unwrap_or_default()
}

fn render(workouts: &[WorkoutRecord]) {
    println!();
    if workouts.is_empty() {
        println!("No workouts yet.");
        return;
    }

    let mut position = 0;
    for (month, members) in history::group_by_month(workouts) {
        println!("{}", month);
        for workout in members {
            position += 1;
            println!("  {:>2}. {}", position, describe(&WorkoutSummary::from(workout)));
            for entry in &workout.exercises {
                println!("        {} ({} sets)", entry.exercise_name, entry.sets.len());
            }
        }
    }
}
