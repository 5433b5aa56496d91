//! File-backed stack state.

use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use stack_outputs::{Base64Crypter, Crypter, RefusingCrypter, Snapshot};

const CURRENT_FILE: &str = "current";
const STACKS_DIR: &str = "stacks";

/// A directory holding serialized deployments, one per stack.
#[derive(Clone, Debug)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns `explicit`, or the stack named in the `current` file.
    pub fn resolve_stack(&self, explicit: Option<&str>) -> Result<String> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => {
                let path = self.root.join(CURRENT_FILE);
                let contents = fs::read_to_string(&path).with_context(|| {
                    format!(
                        "no stack selected; pass --stack or write a stack name to {}",
                        path.display()
                    )
                })?;
                contents.trim().to_string()
            }
        };
        validate_stack_name(&name)?;
        Ok(name)
    }

    /// Path of the deployment file for `stack`.
    pub fn stack_path(&self, stack: &str) -> PathBuf {
        self.root.join(STACKS_DIR).join(format!("{stack}.json"))
    }

    pub fn load(&self, stack: &str) -> Result<Snapshot> {
        let path = self.stack_path(stack);
        let file = File::open(&path)
            .with_context(|| format!("stack '{stack}' not found at {}", path.display()))?;
        Snapshot::from_reader(BufReader::new(file))
            .with_context(|| format!("reading deployment {}", path.display()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn validate_stack_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("stack name must not be empty");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        || name.starts_with('.')
    {
        bail!("invalid stack name '{name}'");
    }
    Ok(())
}

/// Picks the crypter for `snapshot`'s secrets provider.
///
/// Hidden requests never decrypt, so the provider is only consulted when
/// `reveal` is set.
pub fn crypter_for(snapshot: &Snapshot, reveal: bool) -> Result<Box<dyn Crypter>> {
    if !reveal {
        return Ok(Box::new(RefusingCrypter));
    }
    match snapshot.secrets_providers.as_ref().map(|p| p.kind.as_str()) {
        None => Ok(Box::new(RefusingCrypter)),
        Some(Base64Crypter::PROVIDER) => Ok(Box::new(Base64Crypter)),
        Some(other) => bail!("unsupported secrets provider '{other}'"),
    }
}
