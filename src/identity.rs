use crate::config::Config;
use crate::constants::{TOKEN_COMMAND_TIMEOUT_SECS, TOKEN_ENV};
use crate::warning;
use anyhow::{Result, bail};
use serde::Serialize;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// author metadata attached to every update mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// resolve the commit author
/// config overrides first, then the user's git identity, then $USER
pub fn resolve_author(config: &Config) -> Author {
    let (git_name, git_email) = git_identity();
    author_from(config, git_name, git_email, std::env::var("USER").ok())
}

fn author_from(
    config: &Config,
    git_name: Option<String>,
    git_email: Option<String>,
    user: Option<String>,
) -> Author {
    let name = config
        .author_name
        .clone()
        .or(git_name)
        .or(user)
        .unwrap_or_else(|| String::from("unknown"));

    let email = config.author_email.clone().or(git_email);

    Author { name, email }
}

/// read user.name and user.email from the global git configuration;
/// either may be missing independently
fn git_identity() -> (Option<String>, Option<String>) {
    let Ok(config) = git2::Config::open_default() else {
        return (None, None);
    };
    (
        config.get_string("user.name").ok(),
        config.get_string("user.email").ok(),
    )
}

/// resolve the bearer token: $KV_EDIT_TOKEN, else the configured token
/// command, else no token
pub fn resolve_token(config: &Config) -> Result<Option<String>> {
    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.trim().is_empty()
    {
        return Ok(Some(token.trim().to_string()));
    }

    match &config.token_command {
        Some(command) => {
            let timeout = Duration::from_secs(TOKEN_COMMAND_TIMEOUT_SECS);
            run_token_command(command, timeout).map(Some)
        }
        None => Ok(None),
    }
}

/// run a shell command and return its trimmed stdout, killing it if it
/// runs longer than `timeout`
pub fn run_token_command(command: &str, timeout: Duration) -> Result<String> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to spawn token command: {e}"))?;

    let Some(stdout) = child.stdout.take() else {
        bail!("failed to capture token command stdout");
    };
    let Some(stderr) = child.stderr.take() else {
        bail!("failed to capture token command stderr");
    };

    // drain both pipes while waiting so a chatty command cannot fill them
    let stdout_reader = thread::spawn(move || read_pipe(stdout, "stdout"));
    let stderr_reader = thread::spawn(move || read_pipe(stderr, "stderr"));

    match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            let stdout_data = stdout_reader.join().unwrap_or_default();
            let stderr_data = stderr_reader.join().unwrap_or_default();

            if !status.success() {
                let stderr_text = String::from_utf8_lossy(&stderr_data);
                bail!(
                    "token command failed ({status}): {}",
                    stderr_text.trim()
                );
            }

            let token = String::from_utf8_lossy(&stdout_data).trim().to_string();
            if token.is_empty() {
                bail!("token command produced no output");
            }
            Ok(token)
        }
        Ok(None) => {
            if let Err(e) = child.kill() {
                warning!("failed to kill token command: {}", e);
            }
            let _ = child.wait();
            bail!("token command timed out after {}s", timeout.as_secs())
        }
        Err(e) => bail!("failed to wait for token command: {e}"),
    }
}

fn read_pipe(mut pipe: impl Read, name: &str) -> Vec<u8> {
    let mut data = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut data) {
        warning!("failed to read token command {}: {}", name, e);
    }
    data
}
