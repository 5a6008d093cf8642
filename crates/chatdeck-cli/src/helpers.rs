//! Shared CLI helpers: message and session rendering, banners.

use colored::Colorize;

use chatdeck_core::utils::{local_date, local_time, truncate_string};
use chatdeck_core::{Message, Sender, Session};

/// Keeps track of how much of the transcript has been printed.
#[derive(Debug, Default)]
pub struct Transcript {
    shown: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what was printed (after switching conversations).
    pub fn reset(&mut self) {
        self.shown = 0;
    }

    /// Messages not printed yet. User turns are skipped when `echo_user` is
    /// false, since the terminal already shows what was typed.
    pub fn unseen<'a>(&mut self, messages: &'a [Message], echo_user: bool) -> Vec<&'a Message> {
        if messages.len() < self.shown {
            self.shown = 0;
        }
        let fresh = messages[self.shown..]
            .iter()
            .filter(|m| echo_user || !m.is_user())
            .collect();
        self.shown = messages.len();
        fresh
    }

    pub fn print_new(&mut self, messages: &[Message], echo_user: bool) {
        for message in self.unseen(messages, echo_user) {
            print_message(message);
        }
    }
}

pub fn print_message(message: &Message) {
    let time = local_time(&message.timestamp).dimmed();
    match message.sender {
        Sender::User => println!("{} {}  {}", "You".green().bold(), time, message.text),
        Sender::Bot => {
            println!();
            println!("{} {}", "Bot".cyan().bold(), time);
            if message.text.is_empty() {
                println!("{}", "(no response)".dimmed());
            } else {
                println!("{}", message.text);
            }
            println!();
        }
    }
}

/// One sidebar row: `1. 2024-06-04 09:00:00  665f1c2...`.
pub fn session_line(index: usize, session: &Session, active: bool) -> String {
    format!(
        "{} {:>2}. {} {}  {}",
        if active { "▶" } else { " " },
        index + 1,
        local_date(&session.created_at),
        local_time(&session.created_at),
        truncate_string(&session.id, 12),
    )
}

pub fn print_sessions(sessions: &[Session], active: Option<&str>) {
    println!();
    if sessions.is_empty() {
        println!("{}", "  No chat sessions yet.".dimmed());
    }
    for (i, session) in sessions.iter().enumerate() {
        let is_active = active == Some(session.id.as_str());
        let line = session_line(i, session, is_active);
        if is_active {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(username: Option<&str>) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "💬 Chatdeck".cyan().bold(), version.dimmed());
    if let Some(name) = username {
        println!("Logged in as {}", name.bold());
    }
    println!(
        "{}",
        "Type a message, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

pub fn print_help() {
    println!();
    for (cmd, what) in [
        ("/new", "start a new chat"),
        ("/sessions", "list your chats"),
        ("/open <n|id>", "switch to a chat"),
        ("/delete <n|id>", "delete a chat"),
        ("/logout", "log out"),
        ("exit", "quit"),
    ] {
        println!("  {:<16} {}", cmd.bold(), what.dimmed());
    }
    println!();
}

pub fn print_notice(text: &str) {
    eprintln!("{} {}", "!".red().bold(), text);
}

/// Print a "thinking" placeholder while a reply is pending.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
