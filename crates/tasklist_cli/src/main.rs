mod cli;

use clap::{CommandFactory, Parser};
use cli::{Cli, Command, parse_id};
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::config::{self, Palette};
use tasklist_core::error::AppError;
use tasklist_core::model::{Filter, Task};
use tasklist_core::storage::json_store;
use tasklist_core::store::TaskStore;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Tabled)]
struct TaskRow {
    id: i64,
    done: &'static str,
    text: String,
    created: String,
}

fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id,
        done: if task.completed { "x" } else { " " },
        text: task.text.clone(),
        created: format_created(&task.created_at),
    }
}

fn format_created(raw: &str) -> String {
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|created| created.format(&format).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn print_tasks_plain(store: &TaskStore, palette: &Palette) {
    let visible = store.visible_tasks();
    if visible.is_empty() {
        let message = match store.filter() {
            Filter::All => "Your task list is empty. Start adding tasks!".to_string(),
            other => format!("No {} tasks found.", other.label()),
        };
        println!("{}", palette.mutedize(&message));
    } else {
        let mut table = Table::new(visible.iter().map(task_row));
        table.with(Style::psql());
        println!("{table}");
    }

    let (completed, total) = store.completion_summary();
    if total > 0 {
        let summary = format!("{completed} of {total} completed");
        println!("{}", palette.accentize(&summary));
    }
}

fn print_tasks_json(tasks: &[Task]) -> Result<(), AppError> {
    let payload =
        serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{payload}");
    Ok(())
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    let payload =
        serde_json::to_string(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{payload}");
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(store: &mut TaskStore, cli: Cli, palette: &Palette) -> Result<(), AppError> {
    match cli.command {
        Command::Add { text } => {
            let text = text.unwrap_or_default();
            let task = store
                .create_task(&text)
                .ok_or_else(|| AppError::invalid_input("text is required"))?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.text, task.id);
            }
        }
        Command::Toggle { id } => {
            let id = parse_id(&id)?;
            let task = store
                .toggle_completed(id)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                let state = if task.completed { "completed" } else { "active" };
                println!("Toggled task: {} ({}) is now {}", task.text, task.id, state);
            }
        }
        Command::Delete { id } => {
            let id = parse_id(&id)?;
            let task = store
                .delete_task(id)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.text, task.id);
            }
        }
        Command::Edit { id, new_text } => {
            let id = parse_id(&id)?;
            let new_text = match new_text {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("new text is required")),
            };

            store
                .begin_edit(id)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            let task = store
                .commit_edit(id, &new_text)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.text, task.id);
            }
        }
        Command::Clear => {
            let removed = store.clear_completed();
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": removed }));
            } else {
                println!("Cleared {removed} completed task(s)");
            }
        }
        Command::List { filter } => {
            if let Some(selected) = filter {
                store.set_filter(selected.into());
            }

            if cli.json {
                print_tasks_json(&store.visible_tasks())?;
            } else {
                print_tasks_plain(store, palette);
            }
        }
    }

    Ok(())
}

fn run_edit_session(
    store: &mut TaskStore,
    stdin_lock: &mut impl BufRead,
    raw_id: &str,
) -> Result<(), AppError> {
    let id = parse_id(raw_id)?;
    let current = store
        .begin_edit(id)
        .ok_or_else(|| AppError::invalid_input("task not found"))?
        .to_string();

    println!("Editing \"{current}\". Enter new text (blank or 'cancel' keeps it):");

    let mut reply = String::new();
    let bytes = stdin_lock
        .read_line(&mut reply)
        .map_err(|err| AppError::io(err.to_string()))?;
    let reply = reply.trim();

    if bytes == 0 || reply.is_empty() || reply.eq_ignore_ascii_case("cancel") {
        store.cancel_edit();
        println!("Kept task text: {current}");
        return Ok(());
    }

    match store.commit_edit(id, reply) {
        Some(task) => println!("Updated task: {} ({})", task.text, task.id),
        None => println!("Kept task text: {current}"),
    }

    Ok(())
}

fn run_interactive(store: &mut TaskStore, palette: &Palette) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        // `edit ID` with no replacement text runs as a session here.
        let result = match cli.command {
            Command::Edit {
                ref id,
                new_text: None,
            } => {
                let raw_id = id.clone();
                run_edit_session(store, &mut stdin_lock, &raw_id)
            }
            _ => run_command(store, cli, palette),
        };

        if let Err(err) = result {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run() -> Result<(), AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: {}", err);
    }
    let palette = config::palette_for_theme(loaded.config.theme.as_deref());

    let path = json_store::store_path()?;
    let mut store = TaskStore::open(path);
    if let Some(filter) = loaded.config.default_filter {
        store.set_filter(filter);
    }

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        return run_interactive(&mut store, &palette);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };
    run_command(&mut store, cli, &palette)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
