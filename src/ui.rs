use anyhow::{Context, Result};

#[macro_export]
macro_rules! warning {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).yellow());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).yellow());
    }};
}

#[macro_export]
macro_rules! error {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).red());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).red());
    }};
}

#[macro_export]
macro_rules! status {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!($fmt $(, $($arg)*)?).green());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!("{}", $expr).green());
    }};
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    // format string literal (with or without inline formatting or args)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// single-key choice between options, keyed by each option's first letter
/// enter picks the first option; esc and ctrl-c exit
pub fn prompt(options: &[&str]) -> Result<String> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode},
    };
    use std::io::{self, Write};

    // validate options are not empty (programming error if violated)
    debug_assert!(!options.is_empty(), "prompt requires at least one option");
    debug_assert!(
        options.iter().all(|opt| !opt.is_empty()),
        "prompt options cannot be empty strings"
    );

    // build prompt string like "[a]dd/[e]dit/[q]uit"
    let prompt_parts: Vec<String> = options
        .iter()
        .map(|opt| {
            let mut chars = opt.chars();
            let first = chars.next().unwrap_or(' ');
            format!("[{first}]{}", chars.as_str())
        })
        .collect();

    // build valid characters (first char of each option, lowercased)
    let valid_chars: Vec<char> = options
        .iter()
        .map(|opt| opt.chars().next().map_or(' ', |c| c.to_ascii_lowercase()))
        .collect();

    // print the prompt
    print!("{} ? ", prompt_parts.join("/"));
    let _ = io::stdout().flush();

    // enable raw mode for single-character input
    enable_raw_mode().context("this command requires an interactive terminal")?;

    loop {
        // read a key event
        if let Ok(Event::Key(KeyEvent {
            code, modifiers, ..
        })) = event::read()
        {
            match code {
                // handle esc
                KeyCode::Esc => {
                    disable_raw_mode().ok();
                    info!("^C");
                    std::process::exit(1);
                }
                // handle ctrl-c
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    disable_raw_mode().ok();
                    info!("^C");
                    std::process::exit(1);
                }
                // handle enter (use first option as default)
                KeyCode::Enter => {
                    disable_raw_mode().ok();
                    info!(options[0]);
                    break Ok(valid_chars[0].to_string());
                }
                // handle valid character input
                KeyCode::Char(c) => {
                    let lower = c.to_ascii_lowercase();
                    if let Some(idx) = valid_chars.iter().position(|&ch| ch == lower) {
                        disable_raw_mode().ok();
                        info!(options[idx]);
                        break Ok(lower.to_string());
                    }
                }
                _ => {}
            }
        }
    }
}

/// read one line with `initial` pre-filled; None when the user cancels
pub fn edit_one_line(label: &str, initial: &str) -> Result<Option<String>> {
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;

    match editor.readline_with_initial(&format!("{label}? "), (initial, "")) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            info!("^C");
            Ok(None)
        }
        Err(e) => Err(e).context("failed to read input"),
    }
}

/// edit `text` in $EDITOR; None when the editor exits with an error
pub fn edit_multi_line(text: &str) -> Result<Option<String>> {
    let editor = std::env::var("EDITOR").context("EDITOR not set")?;
    run_editor(&editor, text)
}

fn run_editor(editor: &str, text: &str) -> Result<Option<String>> {
    use std::fs;
    use std::io::Write;
    use std::process::Command;
    use tempfile::Builder;

    // created 0600 and removed on drop
    let mut temp_file = Builder::new()
        .prefix("kv-edit-")
        .suffix(".tmp")
        .tempfile()
        .context("failed to create temporary file")?;

    temp_file
        .write_all(text.as_bytes())
        .context("failed to write to temporary file")?;
    temp_file
        .flush()
        .context("failed to flush temporary file")?;

    let temp_path = temp_file.path().to_owned();

    // run the editor via shell to properly handle arguments in EDITOR
    let quoted_path = shlex::try_quote(&temp_path.to_string_lossy())
        .context("temporary path cannot be quoted")?
        .into_owned();
    let editor_command = format!("{editor} {quoted_path}");

    let status = Command::new("sh")
        .arg("-c")
        .arg(&editor_command)
        .status()
        .with_context(|| format!("failed to run editor: {editor}"))?;

    if !status.success() {
        return Ok(None);
    }

    let edited = fs::read_to_string(&temp_path).context("failed to read edited value")?;
    Ok(Some(strip_final_newline(text, &edited).to_string()))
}

/// editors append a newline on save; drop exactly one, unless the value
/// already ended with one
fn strip_final_newline<'a>(original: &str, edited: &'a str) -> &'a str {
    if original.ends_with('\n') {
        return edited;
    }
    edited
        .strip_suffix("\r\n")
        .or_else(|| edited.strip_suffix('\n'))
        .unwrap_or(edited)
}

/// run `f` while a spinner is shown
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = f();

    spinner.finish_and_clear();
    result
}
