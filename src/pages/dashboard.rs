use liftlog_core::commands::{auth, history};
use liftlog_core::service::User;

use super::{describe, print_help};
use crate::app::{today, Route};
use crate::context::AppContext;
use crate::input::Input;

const COMMANDS: &[(&str, &str)] = &[
    ("(enter)", "refresh"),
    ("logout", "forget this user on this device"),
];

pub async fn run(ctx: &AppContext, input: &mut Input, user: &User) -> anyhow::Result<Route> {
    render(ctx, user).await;

    loop {
        let Some(line) = input.prompt("home").await? else {
            return Ok(Route::Quit);
        };
        if let Some(route) = Route::parse(&line) {
            return Ok(route);
        }
        match line.as_str() {
            "" => render(ctx, user).await,
            "logout" => {
                if ctx.ok(auth::logout(&ctx.prefs)).is_some() {
                    return Ok(Route::Auth);
                }
            }
            _ => print_help(COMMANDS),
        }
    }
}

async fn render(ctx: &AppContext, user: &User) {
    println!();
    println!("Hi, {}!", user.name);

    let Some(dashboard) = ctx.ok(history::dashboard(ctx.service.as_ref(), &user.id, today()).await)
    else {
        return;
    };

    match &dashboard.today {
        Some(summary) => println!("  Today      {}", describe(summary)),
        None => println!("  Today      nothing logged yet. Type `workout` to start."),
    }
    if !dashboard.recent.is_empty() {
        println!("  Recent");
        for summary in &dashboard.recent {
            println!("    {}", describe(summary));
        }
    }
}
