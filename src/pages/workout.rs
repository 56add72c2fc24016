use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use liftlog_core::service::User;
use liftlog_core::session::{EditableSet, SetField};
use liftlog_core::timer::{format_clock, RestDuration, TimerPhase};
use liftlog_core::{RestTimerDriver, SessionEditor};

use super::{format_date, parse_args, print_catalog, print_help};
use crate::app::Route;
use crate::context::AppContext;
use crate::input::{parse_position, split_command, Input};

const COMMANDS: &[(&str, &str)] = &[
    ("catalog", "list exercises you can add"),
    ("add <n>", "add catalog exercise n"),
    ("new <name>", "create an exercise and add it"),
    ("rm <n>", "remove exercise n and its sets"),
    ("set <n>", "add a set to exercise n"),
    ("unset <n> <k>", "remove set k of exercise n"),
    ("w <n> <k> [kg]", "edit weight of set k"),
    ("r <n> <k> [reps]", "edit reps of set k"),
    ("ok", "save field edits"),
    ("rest", "start the rest timer"),
    ("pause | resume", "pause or resume the rest timer"),
    ("reset", "stop the rest timer"),
    ("duration [seconds]", "show or set the rest length"),
];

struct WorkoutPage<'a> {
    ctx: &'a AppContext,
    editor: SessionEditor,
    timer: Arc<RestTimerDriver>,
}

pub async fn run(
    ctx: &AppContext,
    input: &mut Input,
    user: &User,
    date: NaiveDate,
) -> anyhow::Result<Route> {
    let timer = ctx.rest_timer();
    let editor = SessionEditor::open(
        &user.id,
        date,
        ctx.service.clone(),
        timer.clone(),
        ctx.notifier.clone(),
    )
    .await;
    let mut page = WorkoutPage {
        ctx,
        editor,
        timer,
    };
    page.render();

    let next = loop {
        let Some(line) = input.prompt(&page.prompt_label()).await? else {
            break Route::Quit;
        };
        let (verb, rest) = split_command(&line);

        // Any command other than a field edit ends the edit, like leaving an input.
        if page.editor.has_uncommitted_edits() && !matches!(verb, "w" | "r") {
            page.commit();
        }
        if let Some(route) = Route::parse(&line) {
            break route;
        }
        page.handle(verb, rest).await;
    };

    // Pending edits are committed and in-flight saves finish before the
    // caller can exit the runtime.
    page.timer.shutdown();
    page.editor.close().await;
    Ok(next)
}

impl WorkoutPage<'_> {
    fn prompt_label(&self) -> String {
        let timer = self.timer.snapshot();
        match timer.phase {
            TimerPhase::Running => format!("workout [rest {}]", format_clock(timer.remaining)),
            TimerPhase::Paused => format!("workout [paused {}]", format_clock(timer.remaining)),
            TimerPhase::Idle => "workout".to_string(),
        }
    }

    fn commit(&mut self) {
        self.editor.commit_set_edits();
    }

    fn exercise_id(&self, raw: &str) -> Option<String> {
        let entry = parse_position(raw).and_then(|i| self.editor.session().entries.get(i));
        if entry.is_none() {
            println!("  No exercise {} in this workout", raw);
        }
        entry.map(|e| e.exercise_id.clone())
    }

    async fn handle(&mut self, verb: &str, rest: &str) {
        match verb {
            "" => self.render(),
            "catalog" => print_catalog(self.editor.catalog()),
            "add" => {
                let exercise = parse_position(rest).and_then(|i| self.editor.catalog().get(i)).cloned();
                match exercise {
                    Some(exercise) => {
                        if self.editor.add_exercise(&exercise).is_ok() {
                            self.render();
                        }
                    }
                    None => println!("  Pick a number from `catalog`"),
                }
            }
            "new" => {
                if self.editor.create_and_add_exercise(rest).await.is_ok() {
                    self.render();
                }
            }
            "rm" => {
                if let Some(id) = self.exercise_id(rest) {
                    self.editor.remove_exercise(&id);
                    self.render();
                }
            }
            "set" => {
                if let Some(id) = self.exercise_id(rest) {
                    if self.editor.add_set(&id).is_ok() {
                        self.render();
                    }
                }
            }
            "unset" => {
                let [n, k] = parse_args::<2>(rest);
                if let (Some(id), Some(index)) = (self.exercise_id(n), parse_position(k)) {
                    if self.editor.remove_set(&id, index).is_ok() {
                        self.render();
                    }
                }
            }
            "w" | "r" => self.edit_field(verb, rest),
            "ok" => self.render(),
            "rest" if self.editor.session().set_count() == 0 => {
                println!("  Log a set first")
            }
            "rest" => self.editor.start_rest(),
            "pause" => self.timer.pause(),
            "resume" => self.timer.resume(),
            "reset" | "stop" => self.timer.reset(),
            "duration" => self.duration(rest),
            _ => print_help(COMMANDS),
        }
    }

    fn edit_field(&mut self, verb: &str, rest: &str) {
        let field = if verb == "w" {
            SetField::Weight
        } else {
            SetField::Reps
        };
        let [n, k, value] = parse_args::<3>(rest);
        let (Some(id), Some(index)) = (self.exercise_id(n), parse_position(k)) else {
            return;
        };
        if self
            .editor
            .update_set_field(&id, index, field, value)
            .is_ok()
        {
            debug!("Edited {} of set {} in {}", field.label(), index + 1, id);
        }
    }

    fn duration(&self, rest: &str) {
        if rest.is_empty() {
            let presets: Vec<String> = RestDuration::PRESETS
                .iter()
                .map(|s| format_clock(*s))
                .collect();
            println!(
                "  Rest length {} (presets: {})",
                format_clock(self.timer.configured().seconds()),
                presets.join(", ")
            );
            return;
        }
        match rest.parse::<i64>() {
            Ok(seconds) => {
                if let Some(duration) = self.ctx.ok(self.timer.set_configured_duration(seconds)) {
                    self.ctx.info(format!(
                        "Rest length set to {}",
                        format_clock(duration.seconds())
                    ));
                }
            }
            Err(_) => println!("  Give the rest length in seconds, e.g. `duration 120`"),
        }
    }

    fn render(&self) {
        let session = self.editor.session();
        println!();
        println!("Workout for {}", format_date(session.date));
        if session.is_empty() {
            println!("  No exercises yet. `catalog` lists them, `add <n>` adds one.");
        }
        for (i, entry) in session.entries.iter().enumerate() {
            println!("  {}. {}", i + 1, entry.exercise_name);
            if entry.sets.is_empty() {
                println!("       no sets yet, `set {}` adds one", i + 1);
            }
            for (k, set) in entry.sets.iter().enumerate() {
                println!("       {}) {}", k + 1, describe_set(set));
            }
        }
    }
}

fn describe_set(set: &EditableSet) -> String {
    let show = |text: String| if text.is_empty() { "_".to_string() } else { text };
    format!(
        "{} kg x {}",
        show(set.weight.to_string()),
        show(set.reps.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::session::FieldValue;

    #[test]
    fn test_describe_set_marks_empty_fields() {
        let set = EditableSet {
            weight: FieldValue::Value(62.5),
            reps: FieldValue::Empty,
        };
        assert_eq!(describe_set(&set), "62.5 kg x _");

        let set = EditableSet {
            weight: FieldValue::Partial("-".to_string()),
            reps: FieldValue::Value(8.0),
        };
        assert_eq!(describe_set(&set), "- kg x 8");
    }
}
