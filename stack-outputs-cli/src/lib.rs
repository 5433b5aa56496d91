//! Command-line front end for `stack-outputs`.
//!
//! Stacks are read from a state directory laid out as:
//!
//! ```text
//! <state-dir>/
//!   current            name of the stack used when --stack is omitted
//!   stacks/<name>.json serialized deployment
//! ```

mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stack_outputs::{OutputRequest, TracingAuditSink};
use tracing_subscriber::EnvFilter;

pub use state::{StateDir, crypter_for};

#[derive(Debug, Parser)]
#[command(name = "stack-output")]
#[command(about = "Show a stack's output properties", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Show only this output property.
    pub property_name: Option<String>,

    /// Emit output as JSON.
    #[arg(short, long)]
    pub json: bool,

    /// The name of the stack to operate on. Defaults to the current stack.
    #[arg(short, long)]
    pub stack: Option<String>,

    /// Display secret outputs as plaintext.
    #[arg(long)]
    pub show_secrets: bool,

    /// Directory holding `stacks/<name>.json` deployments and the `current`
    /// stack file.
    #[arg(long, env = "STACK_OUTPUT_STATE_DIR", default_value = ".stack-state")]
    pub state_dir: PathBuf,
}

impl Cli {
    fn request(&self, stack: String) -> OutputRequest {
        let mut request = OutputRequest::new(stack)
            .with_reveal(self.show_secrets)
            .with_json(self.json);
        if let Some(name) = &self.property_name {
            request = request.with_selector(name.clone());
        }
        request
    }
}

/// Runs one invocation and returns what should be written to stdout.
pub fn run(cli: &Cli) -> Result<String> {
    let state = StateDir::new(&cli.state_dir);
    let stack = state.resolve_stack(cli.stack.as_deref())?;
    let snapshot = state.load(&stack)?;
    tracing::debug!(%stack, resources = snapshot.resources.len(), "loaded stack");

    let crypter = crypter_for(&snapshot, cli.show_secrets)?;
    let request = cli.request(stack);
    stack_outputs::run(&request, &snapshot, &*crypter, &TracingAuditSink)
        .with_context(|| format!("reading outputs of stack '{}'", request.stack))
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `warn` so disclosure events are always visible.
pub fn setup_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
