use liftlog_core::commands::exercises;
use liftlog_core::service::{Exercise, User};

use super::{confirm, print_catalog, print_help};
use crate::app::Route;
use crate::context::AppContext;
use crate::input::{parse_position, split_command, Input};

const COMMANDS: &[(&str, &str)] = &[
    ("add <name>", "create an exercise"),
    ("delete <n>", "delete exercise n (past workouts keep it)"),
];

pub async fn run(ctx: &AppContext, input: &mut Input, user: &User) -> anyhow::Result<Route> {
    let mut catalog = load(ctx, user).await;
    render(&catalog);

    loop {
        let Some(line) = input.prompt("exercises").await? else {
            return Ok(Route::Quit);
        };
        if let Some(route) = Route::parse(&line) {
            return Ok(route);
        }

        let (verb, rest) = split_command(&line);
        match verb {
            "" => {
                catalog = load(ctx, user).await;
                render(&catalog);
            }
            "add" => {
                let created =
                    ctx.ok(exercises::create(ctx.service.as_ref(), &user.id, &catalog, rest).await);
                if let Some(exercise) = created {
                    ctx.success(format!("{} created", exercise.name));
                    catalog.push(exercise);
                    render(&catalog);
                }
            }
            "delete" => {
                let Some(exercise) = parse_position(rest).and_then(|i| catalog.get(i)).cloned()
                else {
                    println!("  No exercise {}", rest);
                    continue;
                };
                if confirm(input, &format!("Delete {}?", exercise.name)).await?
                    && ctx
                        .ok(exercises::delete(ctx.service.as_ref(), &exercise.id).await)
                        .is_some()
                {
                    ctx.success(format!("{} deleted", exercise.name));
                    catalog.retain(|e| e.id != exercise.id);
                    render(&catalog);
                }
            }
            _ => print_help(COMMANDS),
        }
    }
}

async fn load(ctx: &AppContext, user: &User) -> Vec<Exercise> {
    ctx.ok(exercises::list(ctx.service.as_ref(), &user.id).await)
        .unwrap_or_default()
}

fn render(catalog: &[Exercise]) {
    println!();
    println!("Exercises");
    print_catalog(catalog);
}
