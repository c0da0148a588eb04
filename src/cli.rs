use crate::resource::ResourceKind;
use clap::Parser;

/// kv-edit: stage edits to a secret or config and save them in one update
#[derive(Parser, Debug)]
#[command(
    name = "kv-edit",
    about,
    long_about = None,
    disable_version_flag = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// kind of resource to edit
    #[arg(value_enum)]
    pub kind: ResourceKind,

    /// resource name
    pub name: String,

    /// namespace of the resource
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// GraphQL endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// set a key without the interactive editor (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub sets: Vec<(String, String)>,

    /// remove a key without the interactive editor (repeatable)
    #[arg(long = "unset", value_name = "KEY")]
    pub unsets: Vec<String>,

    /// print the payload instead of saving (with --set/--unset)
    #[arg(long)]
    pub dry_run: bool,

    /// show secret values in clear text
    #[arg(long)]
    pub reveal: bool,

    /// print GraphQL requests
    #[arg(long)]
    pub debug_request: bool,

    /// print GraphQL responses
    #[arg(long)]
    pub debug_response: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn is_batch(&self) -> bool {
        !self.sets.is_empty() || !self.unsets.is_empty()
    }

    /// whether values of this resource should be masked in output
    pub fn masked(&self) -> bool {
        self.kind.masks_values() && !self.reveal
    }
}

/// parse `KEY=VALUE`, splitting on the first '='
fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(String::from("key cannot be empty")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}
