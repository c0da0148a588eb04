mod api;
mod batch;
mod cli;
mod config;
mod constants;
mod context;
mod identity;
mod resource;
mod staging;
mod ui;
mod view;

use crate::api::{Backend, GraphqlBackend};
use crate::cli::Cli;
use crate::config::{Config, Settings};
use crate::context::AppContext;
use crate::resource::ResourceRef;
use crate::staging::{CommitOutcome, EditSession};
use crate::view::{changes_label, count_label};
use anyhow::{Result, bail};
use std::io::IsTerminal;

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Config::load()?;
    let settings = Settings::resolve(cli.endpoint.as_deref(), cli.namespace.as_deref(), &config)?;
    let token = identity::resolve_token(&config)?;
    let author = identity::resolve_author(&config);

    let backend = GraphqlBackend::new(&settings.endpoint, token, settings.timeout)
        .with_debug(cli.debug_request, cli.debug_response);
    let resource = ResourceRef {
        kind: cli.kind,
        name: cli.name.clone(),
        namespace: settings.namespace.clone(),
    };

    if cli.is_batch() {
        return batch::run(
            &backend,
            &resource,
            &author,
            &cli.sets,
            &cli.unsets,
            cli.dry_run,
            cli.masked(),
        );
    }
    if cli.dry_run {
        bail!("--dry-run requires --set or --unset");
    }

    // sanity checks
    if !std::io::stdin().is_terminal()
        || !std::io::stdout().is_terminal()
        || !std::io::stderr().is_terminal()
    {
        bail!("interactive terminal required (use --set/--unset to edit without one)");
    }

    status!("loading {}...", resource);
    let snapshot = ui::with_spinner("loading", || backend.fetch(&resource))?;
    let mut ctx = AppContext::new(EditSession::load(snapshot), author, cli.masked());

    edit_loop(&mut ctx, &backend)
}

enum UserAction {
    Continue,
    Quit,
}

fn edit_loop(ctx: &mut AppContext, backend: &dyn Backend) -> Result<()> {
    loop {
        display_session(ctx);

        // save and friends only make sense with something staged
        let mut options = vec!["add", "edit", "delete", "restore"];
        if ctx.session.has_changes() {
            options.extend(["changes", "undo all", "save"]);
        }
        options.push("quit");

        let action = ui::prompt(&options)?;
        match handle_user_action(&action, ctx, backend)? {
            UserAction::Continue => {}
            UserAction::Quit => break,
        }
    }

    Ok(())
}

/// print the staged entries with their change markers
fn display_session(ctx: &AppContext) {
    let session = &ctx.session;

    info!();
    status!(
        "{}: {}, {}",
        session.snapshot().resource,
        count_label(session.len(), "key"),
        changes_label(session.changes_count())
    );
    if session.is_empty() {
        info!("(no keys, add one to get started)");
    }
    for line in view::entry_lines(session, ctx.masked) {
        print_marked(&line);
    }
    info!();
}

fn print_marked(line: &str) {
    use colored::Colorize;

    match line.chars().next() {
        Some('+') => info!(line.green()),
        Some('-') => info!(line.red()),
        Some('~') => info!(line.yellow()),
        _ => info!(line),
    }
}

/// handle user action and return what to do next
fn handle_user_action(
    action: &str,
    ctx: &mut AppContext,
    backend: &dyn Backend,
) -> Result<UserAction> {
    match action {
        "a" => add_entry(ctx)?,
        "e" => edit_entry(ctx)?,
        "d" => {
            if let Some(key) = pick_key(ctx, "key to delete")? {
                ctx.session.delete(&key)?;
            }
        }
        "r" => {
            if let Some(key) = ui::edit_one_line("key to restore", "")? {
                let key = key.trim();
                if !key.is_empty() && !ctx.session.restore(key) {
                    warning!("nothing to restore for {}", key);
                }
            }
        }
        "c" => {
            info!();
            for line in view::change_lines(&ctx.session, ctx.masked) {
                print_marked(&line);
            }
        }
        "u" => {
            ctx.session.discard();
            status!("discarded all pending changes");
        }
        "s" => save(ctx, backend),
        "q" => return confirm_quit(ctx),
        _ => {}
    }

    Ok(UserAction::Continue)
}

/// ask for an existing key; None if cancelled or unknown
fn pick_key(ctx: &AppContext, label: &str) -> Result<Option<String>> {
    let Some(key) = ui::edit_one_line(label, "")? else {
        return Ok(None);
    };
    let key = key.trim();
    if key.is_empty() {
        return Ok(None);
    }
    if ctx.session.get(key).is_none() {
        error!("no such key: {}", key);
        return Ok(None);
    }
    Ok(Some(key.to_string()))
}

fn add_entry(ctx: &mut AppContext) -> Result<()> {
    let Some(key) = ui::edit_one_line("new key", "")? else {
        return Ok(());
    };
    let key = key.trim();

    // reject bad keys before anything is staged
    if let Err(e) = ctx.session.check_new_key(key) {
        error!("{}", e);
        return Ok(());
    }

    if let Some(value) = ui::edit_one_line("value", "")? {
        ctx.session.add(key, &value)?;
    }
    Ok(())
}

fn edit_entry(ctx: &mut AppContext) -> Result<()> {
    let Some(key) = pick_key(ctx, "key to edit")? else {
        return Ok(());
    };
    let current = ctx
        .session
        .get(&key)
        .map(|entry| entry.current().to_string())
        .unwrap_or_default();

    // masked values are never pre-filled
    let initial = if ctx.masked { "" } else { current.as_str() };
    let value = if current.contains('\n') {
        ui::edit_multi_line(initial)
    } else {
        ui::edit_one_line("value", initial)
    };

    if let Some(value) = accepted_value(value, ctx.masked) {
        ctx.session.edit(&key, &value)?;
    }
    Ok(())
}

/// the value to stage from a value editor, or None to leave the entry alone
///
/// editor failures are reported and the session carries on. masked prompts
/// start empty, so an empty answer there keeps the current value
fn accepted_value(value: Result<Option<String>>, masked: bool) -> Option<String> {
    match value {
        Ok(value) => value.filter(|v| !(masked && v.is_empty())),
        Err(e) => {
            error!("{:#}", e);
            None
        }
    }
}

/// commit the staged changes; failures keep the draft for a retry
fn save(ctx: &mut AppContext, backend: &dyn Backend) {
    let AppContext {
        session, author, ..
    } = ctx;
    let resource = session.snapshot().resource.clone();

    let result = ui::with_spinner("saving", || session.commit(backend, author));

    match result {
        Ok(CommitOutcome::NothingToCommit) => status!("nothing to save"),
        Ok(CommitOutcome::Committed { changes }) => {
            status!("saved {} to {}", count_label(changes, "change"), resource);
        }
        Ok(CommitOutcome::CommittedUnverified {
            changes,
            reload_error,
        }) => {
            status!("saved {} to {}", count_label(changes, "change"), resource);
            warning!("could not reload {}: {:#}", resource, reload_error);
        }
        Err(e) => {
            error!("{:#}", e);
            warning!("changes are still staged, save again to retry");
        }
    }
}

fn confirm_quit(ctx: &AppContext) -> Result<UserAction> {
    if !ctx.session.has_changes() {
        return Ok(UserAction::Quit);
    }

    warning!(
        "{} will be lost, quit anyway?",
        changes_label(ctx.session.changes_count())
    );
    if ui::prompt(&["no", "yes"])? == "y" {
        Ok(UserAction::Quit)
    } else {
        Ok(UserAction::Continue)
    }
}
