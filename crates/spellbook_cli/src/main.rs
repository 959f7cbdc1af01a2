mod cli;

use clap::{CommandFactory, Parser};
use cli::{Cli, Command};
use spellbook_core::error::AppError;
use spellbook_core::model::Task;
use spellbook_core::query::{self, SortMode, Summary};
use spellbook_core::{config, import, task_api};
use std::io::{self, BufRead, Write};
use tracing::warn;

fn status_label(completed: bool) -> &'static str {
    if completed { "completed" } else { "pending" }
}

fn print_tasks_plain(tasks: &[Task]) {
    for task in tasks {
        println!(
            "{} | {} | {} | {}",
            task.id,
            task.text,
            status_label(task.completed),
            task.created_at
        );
    }
}

fn print_summary_plain(summary: &Summary) {
    println!("Total tasks: {}", summary.total);
    println!("Completed tasks: {}", summary.completed);
    println!("Pending tasks: {}", summary.pending);
}

fn print_task_json(task: &Task) {
    let json = serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "created_at": task.created_at,
    });
    println!("{}", json);
}

fn print_list_json(tasks: &[Task], summary: &Summary) {
    let json = serde_json::json!({
        "tasks": tasks,
        "summary": summary,
    });
    println!("{}", json);
}

fn load_config() -> config::Config {
    let load = config::load_config_with_fallback();
    if let Some(err) = load.error {
        warn!("ignoring unusable config: {err}");
    }
    load.config
}

/// Reads one line from stdin for the clear-all gate. Anything but an
/// explicit yes counts as no.
fn confirm_clear() -> Result<bool, AppError> {
    eprint!("Remove all tasks? [y/N] ");
    io::stderr().flush().map_err(|err| AppError::io(err.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
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

fn run_command(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Add { text } => {
            // Blank input adds nothing and is not an error.
            let Some(task) = task_api::add_task(text.as_deref().unwrap_or(""))? else {
                return Ok(());
            };
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Added task: {} (#{})", task.text, task.id);
            }
        }
        Command::Toggle { id } => {
            let Some(task) = task_api::toggle_task(id)? else {
                return Ok(());
            };
            if cli.json {
                print_task_json(&task);
            } else {
                println!(
                    "Task #{} is now {}: {}",
                    task.id,
                    status_label(task.completed),
                    task.text
                );
            }
        }
        Command::Delete { id } => {
            let Some(task) = task_api::delete_task(id)? else {
                return Ok(());
            };
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Deleted task: {} (#{})", task.text, task.id);
            }
        }
        Command::MarkAll => {
            let marked = task_api::mark_all_completed()?;
            if cli.json {
                println!("{}", serde_json::json!({ "marked": marked }));
            } else {
                println!("Marked {marked} tasks as completed");
            }
        }
        Command::RemoveCompleted => {
            let removed = task_api::remove_completed()?;
            if cli.json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("Removed {removed} completed tasks");
            }
        }
        Command::Clear { yes } => {
            let confirmed = yes || confirm_clear()?;
            let removed = task_api::clear_all(confirmed)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "confirmed": confirmed, "removed": removed })
                );
            } else if confirmed {
                println!("Removed {removed} tasks");
            } else {
                println!("Aborted, nothing removed");
            }
        }
        Command::List { sort, search } => {
            let mode = sort.map(SortMode::from).unwrap_or_else(|| {
                load_config().default_sort_mode().unwrap_or_default()
            });
            let view = task_api::list_tasks_lenient()?;
            if let Some(err) = view.load_error {
                warn!("store could not be read, starting empty: {err}");
            }
            let visible =
                query::visible_tasks(&view.tasks, search.as_deref().unwrap_or(""), mode)?;
            let summary = query::summarize(&view.tasks);
            if cli.json {
                print_list_json(&visible, &summary);
            } else {
                print_tasks_plain(&visible);
                print_summary_plain(&summary);
            }
        }
        Command::Stats => {
            let view = task_api::list_tasks_lenient()?;
            if let Some(err) = view.load_error {
                warn!("store could not be read, starting empty: {err}");
            }
            let summary = query::summarize(&view.tasks);
            if cli.json {
                println!("{}", serde_json::to_string(&summary).unwrap_or_default());
            } else {
                print_summary_plain(&summary);
            }
        }
        Command::Import { url } => {
            let config = load_config();
            let url = url
                .or(config.demo_url)
                .unwrap_or_else(|| import::DEFAULT_DEMO_URL.to_string());
            let imported = import::import_demo_tasks(&url)?;
            if cli.json {
                println!("{}", serde_json::json!({ "imported": imported }));
            } else {
                println!("Imported {} demo tasks", imported.len());
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
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
        argv.push("spellbook".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SPELLBOOK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                print!("{err}");
                return;
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
