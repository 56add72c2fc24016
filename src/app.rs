use chrono::{Local, NaiveDate};
use tracing::info;

use liftlog_core::commands::auth;
use liftlog_core::service::User;

use crate::context::AppContext;
use crate::input::{split_command, Input};
use crate::pages;

/// Screens of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Auth,
    Dashboard,
    Workout(NaiveDate),
    History,
    Stats,
    Exercises,
    Templates,
    Quit,
}

impl Route {
    /// Navigation commands understood on every screen.
    pub fn parse(line: &str) -> Option<Route> {
        let (verb, rest) = split_command(line);
        let route = match verb {
            "home" | "dashboard" => Route::Dashboard,
            "workout" | "today" if rest.is_empty() => Route::Workout(today()),
            "workout" => Route::Workout(rest.parse().ok()?),
            "history" => Route::History,
            "stats" => Route::Stats,
            "exercises" => Route::Exercises,
            "templates" => Route::Templates,
            "quit" | "exit" => Route::Quit,
            _ => return None,
        };
        Some(route)
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub const NAV_HELP: &str =
    "home | workout [YYYY-MM-DD] | history | stats | exercises | templates | quit";

/// Where to go right after login.
fn landing(date: Option<NaiveDate>) -> Route {
    date.map(Route::Workout).unwrap_or(Route::Dashboard)
}

pub async fn run(
    ctx: AppContext,
    name: Option<String>,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let mut input = Input::stdin();

    let mut user: Option<User> = match name {
        Some(name) => ctx.ok(auth::login(ctx.service.as_ref(), &ctx.prefs, &name).await),
        None => auth::restore(ctx.service.as_ref(), &ctx.prefs).await,
    };
    let mut route = if user.is_some() {
        landing(date)
    } else {
        Route::Auth
    };

    loop {
        match route {
            Route::Quit => break,
            Route::Auth => user = None,
            _ => {}
        }

        let current = match user.clone() {
            Some(current) => current,
            None => {
                user = pages::auth::run(&ctx, &mut input).await?;
                route = if user.is_some() {
                    landing(date)
                } else {
                    Route::Quit
                };
                continue;
            }
        };

        info!("Showing {:?} for {}", route, current.name);
        route = match route {
            Route::Dashboard => pages::dashboard::run(&ctx, &mut input, &current).await?,
            Route::Workout(date) => pages::workout::run(&ctx, &mut input, &current, date).await?,
            Route::History => pages::history::run(&ctx, &mut input, &current).await?,
            Route::Stats => pages::stats::run(&ctx, &mut input, &current).await?,
            Route::Exercises => pages::exercises::run(&ctx, &mut input, &current).await?,
            Route::Templates => pages::templates::run(&ctx, &mut input, &current).await?,
            // Handled at the top of the loop
            other => other,
        };
    }

    println!("Bye!");
    Ok(())
}
