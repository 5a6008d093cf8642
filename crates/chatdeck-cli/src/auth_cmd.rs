//! Login and registration prompts.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use chatdeck_app::{App, LoginForm, RegisterForm, Route};

use crate::helpers;

/// Read one line. `None` on Ctrl-C / Ctrl-D.
fn ask(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ask_or(editor: &mut DefaultEditor, prompt: &str, given: Option<String>) -> Result<Option<String>> {
    match given {
        Some(value) => Ok(Some(value)),
        None => ask(editor, prompt),
    }
}

/// `chatdeck login`.
pub async fn login(app: &mut App, username: Option<String>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    if login_prompt(app, &mut editor, username).await? {
        println!("{} logged in", "✓".green());
    }
    Ok(())
}

/// `chatdeck register`.
pub async fn register(app: &mut App, username: Option<String>, email: Option<String>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    if register_prompt(app, &mut editor, username, email).await? {
        println!("{} account created, logged in", "✓".green());
    }
    Ok(())
}

/// Ask for credentials and log in. Returns `false` if the user gave up.
pub async fn login_prompt(
    app: &mut App,
    editor: &mut DefaultEditor,
    username: Option<String>,
) -> Result<bool> {
    let Some(username) = ask_or(editor, "Username: ", username)? else {
        return Ok(false);
    };
    let Some(password) = ask(editor, "Password: ")? else {
        return Ok(false);
    };

    match app.shell.login(&LoginForm::new(username, password)).await {
        Ok(route) => {
            app.go(route).await;
            Ok(true)
        }
        Err(e) => {
            helpers::print_notice(&e.to_string());
            Ok(false)
        }
    }
}

/// Ask for account details, register and log in.
pub async fn register_prompt(
    app: &mut App,
    editor: &mut DefaultEditor,
    username: Option<String>,
    email: Option<String>,
) -> Result<bool> {
    let Some(username) = ask_or(editor, "Username: ", username)? else {
        return Ok(false);
    };
    let Some(email) = ask_or(editor, "E-mail: ", email)? else {
        return Ok(false);
    };
    let Some(password) = ask(editor, "Password: ")? else {
        return Ok(false);
    };
    let Some(confirm) = ask(editor, "Repeat password: ")? else {
        return Ok(false);
    };

    let form = RegisterForm {
        username,
        email,
        password,
        confirm_password: Some(confirm),
    };
    match app.shell.register(&form).await {
        Ok(route) => {
            app.go(route).await;
            Ok(true)
        }
        Err(e) => {
            helpers::print_notice(&e.to_string());
            Ok(false)
        }
    }
}

/// What the user picked on the login screen.
#[derive(Debug, PartialEq, Eq)]
pub enum GateChoice {
    Login,
    Register,
    Quit,
}

pub fn parse_gate_choice(input: &str) -> Option<GateChoice> {
    match input.trim().to_lowercase().as_str() {
        "" | "l" | "login" => Some(GateChoice::Login),
        "r" | "register" => Some(GateChoice::Register),
        "q" | "quit" | "exit" => Some(GateChoice::Quit),
        _ => None,
    }
}

/// Keep asking until the user is logged in. Returns `false` on quit.
pub async fn gate(app: &mut App, editor: &mut DefaultEditor) -> Result<bool> {
    while app.shell.route() != Some(Route::Chat) {
        println!("{}", "Not logged in.".yellow());
        let Some(answer) = ask(editor, "[L]ogin, [r]egister or [q]uit? ")? else {
            return Ok(false);
        };
        match parse_gate_choice(&answer) {
            Some(GateChoice::Login) => {
                login_prompt(app, editor, None).await?;
            }
            Some(GateChoice::Register) => {
                register_prompt(app, editor, None, None).await?;
            }
            Some(GateChoice::Quit) => return Ok(false),
            None => println!("{}", "Please answer l, r or q.".dimmed()),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_choices() {
        assert_eq!(parse_gate_choice(""), Some(GateChoice::Login));
        assert_eq!(parse_gate_choice(" R "), Some(GateChoice::Register));
        assert_eq!(parse_gate_choice("quit"), Some(GateChoice::Quit));
        assert_eq!(parse_gate_choice("maybe"), None);
    }
}
