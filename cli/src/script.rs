//! Script format for the `play` command.
//!
//! One command per line; `#` starts a comment line. Text arguments keep
//! their inner spaces: everything after the first space is the argument.
//!
//! ```text
//! type hello
//! wait 300
//! left 2
//! type XY
//! compose ni
//! compose nihao
//! commit 你好
//! backspace 3
//! force reset text
//! ```

use anyhow::{anyhow, bail, Context, Result};

/// One scripted host action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert text at the caret
    Type(String),
    /// Delete graphemes before the caret
    Backspace(usize),
    Left(usize),
    Right(usize),
    Home,
    End,
    /// Set (or replace) the marked input-method candidate
    Compose(String),
    /// Replace the marked candidate with committed text
    Commit(String),
    /// Programmatic text change
    Force(String),
    /// Cancel the running reveal
    Cancel,
    /// Let time pass (milliseconds)
    Wait(u64),
}

fn count_arg(arg: &str) -> Result<usize> {
    if arg.is_empty() {
        return Ok(1);
    }
    arg.trim()
        .parse()
        .map_err(|_| anyhow!("expected a count, got `{arg}`"))
}

/// Parse a single line. Blank and comment lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let line = line.trim_start();
    let (name, arg) = match line.split_once(' ') {
        Some((name, arg)) => (name, arg),
        None => (line, ""),
    };

    let command = match name {
        "type" => Command::Type(arg.to_string()),
        "backspace" => Command::Backspace(count_arg(arg)?),
        "left" => Command::Left(count_arg(arg)?),
        "right" => Command::Right(count_arg(arg)?),
        "home" => Command::Home,
        "end" => Command::End,
        "compose" => Command::Compose(arg.to_string()),
        "commit" => Command::Commit(arg.to_string()),
        "force" => Command::Force(arg.to_string()),
        "cancel" => Command::Cancel,
        "wait" => Command::Wait(
            arg.trim()
                .parse()
                .map_err(|_| anyhow!("expected milliseconds, got `{arg}`"))?,
        ),
        other => bail!("unknown command `{other}`"),
    };
    Ok(Some(command))
}

/// Parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let parsed = parse_line(line).with_context(|| format!("line {}", idx + 1))?;
        if let Some(command) = parsed {
            commands.push(command);
        }
    }
    Ok(commands)
}
