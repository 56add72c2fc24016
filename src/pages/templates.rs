use liftlog_core::commands::exercises;
use liftlog_core::commands::templates::{self, TemplateDraft};
use liftlog_core::service::{Exercise, Template, User};

use super::{confirm, print_catalog, print_help};
use crate::app::{today, Route};
use crate::context::AppContext;
use crate::input::{parse_position, split_command, Input};

const COMMANDS: &[(&str, &str)] = &[
    ("new", "create a template"),
    ("edit <n>", "edit template n"),
    ("delete <n>", "delete template n"),
    ("start <n>", "start today's workout from template n"),
];

const DRAFT_COMMANDS: &[(&str, &str)] = &[
    ("name <text>", "set the template name"),
    ("catalog", "list exercises"),
    ("add <n>", "add catalog exercise n"),
    ("new <name>", "create an exercise and add it"),
    ("rm <n>", "remove exercise n from the template"),
    ("save", "save the template"),
    ("cancel", "discard changes"),
];

pub async fn run(ctx: &AppContext, input: &mut Input, user: &User) -> anyhow::Result<Route> {
    let mut list = load(ctx, user).await;
    render(&list);

    loop {
        let Some(line) = input.prompt("templates").await? else {
            return Ok(Route::Quit);
        };
        if let Some(route) = Route::parse(&line) {
            return Ok(route);
        }

        let (verb, rest) = split_command(&line);
        let picked = parse_position(rest).and_then(|i| list.get(i)).cloned();
        match (verb, picked) {
            ("", _) => render(&list),
            ("new", _) => {
                if edit(ctx, input, user, TemplateDraft::new(), None).await? {
                    list = load(ctx, user).await;
                    render(&list);
                }
            }
            ("edit", Some(template)) => {
                let draft = TemplateDraft::from_template(&template);
                if edit(ctx, input, user, draft, Some(&template.id)).await? {
                    list = load(ctx, user).await;
                    render(&list);
                }
            }
            ("delete", Some(template)) => {
                if confirm(input, &format!("Delete template {}?", template.name)).await?
                    && ctx
                        .ok(templates::delete(ctx.service.as_ref(), &template.id).await)
                        .is_some()
                {
                    ctx.success("Template deleted");
                    list.retain(|t| t.id != template.id);
                    render(&list);
                }
            }
            ("start", Some(template)) => {
                let date = today();
                let started = ctx.ok(
                    templates::start_workout(ctx.service.as_ref(), &user.id, &template, date).await,
                );
                if started.is_some() {
                    ctx.success(format!("Workout \"{}\" started!", template.name));
                    return Ok(Route::Workout(date));
                }
            }
            ("edit" | "delete" | "start", None) => println!("  No template {}", rest),
            _ => print_help(COMMANDS),
        }
    }
}

/// Edit `draft` until it is saved or abandoned. Returns whether it was saved.
async fn edit(
    ctx: &AppContext,
    input: &mut Input,
    user: &User,
    mut draft: TemplateDraft,
    editing: Option<&str>,
) -> anyhow::Result<bool> {
    let mut catalog = ctx
        .ok(exercises::list(ctx.service.as_ref(), &user.id).await)
        .unwrap_or_default();
    render_draft(&draft);

    loop {
        let Some(line) = input.prompt("template").await? else {
            return Ok(false);
        };
        let (verb, rest) = split_command(&line);
        match verb {
            "" => render_draft(&draft),
            "name" => {
                draft.name = rest.to_string();
                render_draft(&draft);
            }
            "catalog" => print_catalog(&catalog),
            "add" => match parse_position(rest).and_then(|i| catalog.get(i)) {
                Some(exercise) => add(ctx, &mut draft, exercise),
                None => println!("  Pick a number from `catalog`"),
            },
            "new" => {
                let created =
                    ctx.ok(exercises::create(ctx.service.as_ref(), &user.id, &catalog, rest).await);
                if let Some(exercise) = created {
                    ctx.success(format!("{} created", exercise.name));
                    add(ctx, &mut draft, &exercise);
                    catalog.push(exercise);
                }
            }
            "rm" => {
                let id = parse_position(rest)
                    .and_then(|i| draft.exercises.get(i))
                    .map(|e| e.exercise_id.clone());
                match id {
                    Some(id) => {
                        draft.remove_exercise(&id);
                        render_draft(&draft);
                    }
                    None => println!("  No exercise {} in this template", rest),
                }
            }
            "save" => {
                let saved = ctx.ok(
                    templates::save(ctx.service.as_ref(), &user.id, &draft, editing).await,
                );
                if saved.is_some() {
                    ctx.success(if editing.is_some() {
                        "Template updated"
                    } else {
                        "Template created"
                    });
                    return Ok(true);
                }
            }
            "cancel" => return Ok(false),
            _ => print_help(DRAFT_COMMANDS),
        }
    }
}

fn add(ctx: &AppContext, draft: &mut TemplateDraft, exercise: &Exercise) {
    if ctx.ok(draft.add_exercise(exercise)).is_some() {
        render_draft(draft);
    }
}

async fn load(ctx: &AppContext, user: &User) -> Vec<Template> {
    ctx.ok(templates::list(ctx.service.as_ref(), &user.id).await)
        .unwrap_or_default()
}

fn render(list: &[Template]) {
    println!();
    println!("Templates");
    if list.is_empty() {
        println!("  No templates yet. `new` creates one.");
    }
    for (i, template) in list.iter().enumerate() {
        let names: Vec<&str> = template
            .exercises
            .iter()
            .map(|e| e.exercise_name.as_str())
            .collect();
        println!("  {:>2}. {}: {}", i + 1, template.name, names.join(", "));
    }
}

fn render_draft(draft: &TemplateDraft) {
    let name = if draft.name.trim().is_empty() {
        "(unnamed)"
    } else {
        draft.name.as_str()
    };
    println!("  Template {}", name);
    for (i, exercise) in draft.exercises.iter().enumerate() {
        println!("    {}. {}", i + 1, exercise.exercise_name);
    }
}
