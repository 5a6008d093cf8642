//! Interactive chat loop.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Plain lines are sent as messages; lines starting with `/` are commands.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use chatdeck_app::{App, ChatEvent, DeleteOutcome, Route, RouteDecision, SubmitError};

use crate::auth_cmd;
use crate::helpers::{self, Transcript};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    New,
    Sessions,
    Open(String),
    Delete(String),
    Logout,
    Send(String),
    Unknown(String),
}

/// Classify one line of input. Blank lines yield `None`.
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if EXIT_COMMANDS.contains(&trimmed.to_lowercase().as_str()) {
        return Some(Command::Exit);
    }
    if !trimmed.starts_with('/') {
        return Some(Command::Send(input.to_string()));
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (trimmed, ""),
    };
    let command = match (cmd.to_lowercase().as_str(), arg) {
        ("/help" | "/?", _) => Command::Help,
        ("/new", _) => Command::New,
        ("/sessions" | "/ls", _) => Command::Sessions,
        ("/open", key) if !key.is_empty() => Command::Open(key.to_string()),
        ("/delete" | "/rm", key) if !key.is_empty() => Command::Delete(key.to_string()),
        ("/logout", _) => Command::Logout,
        _ => Command::Unknown(trimmed.to_string()),
    };
    Some(command)
}

/// Run the interactive loop.
pub async fn run(mut app: App) -> Result<()> {
    let mut editor = create_editor()?;

    if app.start().await == RouteDecision::Loading {
        debug!("auth state still pending after start");
    }
    if let Some(notice) = app.shell.take_notice() {
        helpers::print_notice(&notice);
    }

    'outer: loop {
        if !auth_cmd::gate(&mut app, &mut editor).await? {
            break;
        }

        helpers::print_banner(app.context().auth().status().username());
        let mut transcript = Transcript::new();

        loop {
            let input = match editor.readline("You: ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break 'outer,
                Err(e) => {
                    eprintln!("Input error: {e}");
                    break 'outer;
                }
            };

            let Some(command) = parse_command(&input) else {
                continue;
            };
            let _ = editor.add_history_entry(&input);

            match command {
                Command::Exit => {
                    println!("\nGoodbye! 👋");
                    break 'outer;
                }
                Command::Help => helpers::print_help(),
                Command::New => {
                    let selection = app.sidebar.select_new_chat();
                    app.select(selection).await;
                    transcript.reset();
                    app.chat.take_events();
                    println!("{}", "New chat.".dimmed());
                }
                Command::Sessions => {
                    app.sidebar.list_sessions().await;
                    helpers::print_sessions(app.sidebar.sessions(), app.chat.session_id());
                }
                Command::Open(key) => open(&mut app, &mut transcript, &key).await,
                Command::Delete(key) => delete(&mut app, &mut editor, &mut transcript, &key).await?,
                Command::Logout => {
                    app.logout().await;
                    println!("Logged out.");
                    continue 'outer;
                }
                Command::Send(text) => send(&mut app, &mut transcript, text).await,
                Command::Unknown(cmd) => {
                    println!("{} {}", "Unknown command:".yellow(), cmd);
                }
            }

            // The backend may have rejected the token mid-conversation.
            if app.shell.refresh() != RouteDecision::Render(Route::Chat) {
                helpers::print_notice("Your session has expired. Please log in again.");
                continue 'outer;
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

async fn send(app: &mut App, transcript: &mut Transcript, text: String) {
    app.chat.set_input(text);
    let pending = match app.chat.begin_send() {
        Ok(p) => p,
        Err(SubmitError::Empty) => return,
        Err(e @ SubmitError::Busy) => {
            helpers::print_notice(&e.to_string());
            return;
        }
    };
    render_events(app, transcript);

    let result = app.chat.dispatch(&pending).await;
    app.chat.finish_send(pending, result);
    render_events(app, transcript);
}

fn render_events(app: &mut App, transcript: &mut Transcript) {
    for event in app.chat.take_events() {
        match event {
            ChatEvent::ScrollToLatest => transcript.print_new(app.chat.messages(), false),
            ChatEvent::Loading(true) => helpers::print_thinking(),
            ChatEvent::Loading(false) => helpers::clear_thinking(),
            ChatEvent::SessionAdopted(id) => debug!(session = %id, "new chat saved"),
        }
    }
}

async fn open(app: &mut App, transcript: &mut Transcript, key: &str) {
    if app.sidebar.sessions().is_empty() {
        app.sidebar.list_sessions().await;
    }
    let Some(id) = app.sidebar.find(key).map(|s| s.id.clone()) else {
        helpers::print_notice(&format!("No chat matches '{key}'. Try /sessions."));
        return;
    };

    let selection = app.sidebar.select_session(id);
    let loaded = app.select(selection).await;
    app.chat.take_events();
    transcript.reset();
    if !loaded {
        helpers::print_notice("Could not load this chat's history.");
    }
    transcript.print_new(app.chat.messages(), true);
}

async fn delete(
    app: &mut App,
    editor: &mut DefaultEditor,
    transcript: &mut Transcript,
    key: &str,
) -> Result<()> {
    if app.sidebar.sessions().is_empty() {
        app.sidebar.list_sessions().await;
    }
    let Some(id) = app.sidebar.find(key).map(|s| s.id.clone()) else {
        helpers::print_notice(&format!("No chat matches '{key}'. Try /sessions."));
        return Ok(());
    };
    app.sidebar.request_delete(&id);

    println!("Delete this chat session? This action cannot be undone.");
    let answer = match editor.readline("[y/N] ") {
        Ok(line) => line,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => String::new(),
        Err(e) => return Err(e.into()),
    };
    if !is_yes(&answer) {
        app.sidebar.cancel_delete();
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    match app.confirm_delete().await {
        DeleteOutcome::Deleted { selection, .. } => {
            println!("{} chat deleted", "✓".green());
            if selection.is_some() {
                app.chat.take_events();
                transcript.reset();
                println!("{}", "New chat.".dimmed());
            }
        }
        DeleteOutcome::Failed { notice, .. } => helpers::print_notice(&notice),
        DeleteOutcome::NothingPending => {}
    }
    Ok(())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<DefaultEditor> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut DefaultEditor) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    chatdeck_core::utils::get_history_path().join("chat_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert_eq!(parse_command("exit"), Some(Command::Exit));
        assert_eq!(parse_command("EXIT"), Some(Command::Exit));
        assert_eq!(parse_command("/quit"), Some(Command::Exit));
        assert_eq!(parse_command(":q"), Some(Command::Exit));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn plain_text_is_sent_verbatim() {
        assert_eq!(
            parse_command("  hello there "),
            Some(Command::Send("  hello there ".into()))
        );
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_command("/new"), Some(Command::New));
        assert_eq!(parse_command("/ls"), Some(Command::Sessions));
        assert_eq!(parse_command("/open 2"), Some(Command::Open("2".into())));
        assert_eq!(
            parse_command("/delete  665f1c "),
            Some(Command::Delete("665f1c".into()))
        );
        assert_eq!(parse_command("/logout"), Some(Command::Logout));
        assert_eq!(parse_command("/open"), Some(Command::Unknown("/open".into())));
        assert_eq!(parse_command("/dance"), Some(Command::Unknown("/dance".into())));
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".chatdeck"));
        assert!(path.to_string_lossy().contains("chat_history"));
    }
}
