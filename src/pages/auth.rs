use liftlog_core::commands::auth;
use liftlog_core::service::User;

use crate::context::AppContext;
use crate::input::Input;

/// Ask for a name until login succeeds. `None` when input ends.
pub async fn run(ctx: &AppContext, input: &mut Input) -> anyhow::Result<Option<User>> {
    println!();
    println!("LiftLog");
    println!("Enter your name to start.");

    loop {
        let Some(name) = input.prompt("name").await? else {
            return Ok(None);
        };
        if let Some(user) = ctx.ok(auth::login(ctx.service.as_ref(), &ctx.prefs, &name).await) {
            ctx.success(format!("Welcome, {}!", user.name));
            return Ok(Some(user));
        }
    }
}
