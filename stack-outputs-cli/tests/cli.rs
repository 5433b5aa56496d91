use std::{fs, path::Path};

use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::{Value as JsonValue, json};
use stack_outputs::Base64Crypter;
use tempfile::TempDir;

const SIG: &str = "4dabf18193072939515e22adb298388d";
const SECRET_SIG: &str = "1b47061264138c4ac30d75fd1eb44270";

fn stack_output(state_dir: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("stack-output")?;
    cmd.env("STACK_OUTPUT_STATE_DIR", state_dir);
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_stack(state_dir: &Path, name: &str, provider: Option<&str>, outputs: JsonValue) -> Result<()> {
    let mut deployment = json!({
        "resources": [{
            "urn": format!("urn:pulumi:{name}::web::pulumi:pulumi:Stack::web-{name}"),
            "type": "pulumi:pulumi:Stack",
            "outputs": outputs,
        }],
    });
    if let Some(kind) = provider {
        deployment["secrets_providers"] = json!({"type": kind});
    }
    let stacks = state_dir.join("stacks");
    fs::create_dir_all(&stacks)?;
    fs::write(
        stacks.join(format!("{name}.json")),
        serde_json::to_string(&json!({"version": 3, "deployment": deployment}))?,
    )?;
    Ok(())
}

/// A `dev` stack with one plaintext secret and one encrypted secret, selected
/// as the current stack.
fn web_stack() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let encrypted = Base64Crypter.encrypt(&json!("hunter2").to_string());
    write_stack(
        dir.path(),
        "dev",
        Some("b64"),
        json!({
            "url": "https://x",
            "password": {SIG: SECRET_SIG, "plaintext": "\"p@ss\""},
            "dbPassword": {SIG: SECRET_SIG, "ciphertext": encrypted},
        }),
    )?;
    fs::write(dir.path().join("current"), "dev\n")?;
    Ok(dir)
}

#[test]
fn lists_outputs_with_secrets_hidden() -> Result<()> {
    let dir = web_stack()?;
    let output = stack_output(dir.path())?.output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "Current stack outputs (3):\n    OUTPUT      VALUE\n    dbPassword  [secret]\n    password    [secret]\n    url         https://x\n"
    );
    Ok(())
}

#[test]
fn json_output_reveals_secrets_on_request() -> Result<()> {
    let dir = web_stack()?;
    let output = stack_output(dir.path())?
        .args(["--json", "--show-secrets"])
        .output()?;
    assert!(output.status.success());
    let parsed: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        parsed,
        json!({"url": "https://x", "password": "p@ss", "dbPassword": "hunter2"})
    );
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("secret values were displayed in plaintext"));
    assert!(!stderr.contains("hunter2"));
    Ok(())
}

#[test]
fn hidden_request_is_not_audited() -> Result<()> {
    let dir = web_stack()?;
    stack_output(dir.path())?
        .arg("--json")
        .assert()
        .success()
        .stdout(contains("[secret]").and(contains("hunter2").not()))
        .stderr(contains("displayed in plaintext").not());
    Ok(())
}

#[test]
fn single_property_is_printed_raw() -> Result<()> {
    let dir = web_stack()?;
    stack_output(dir.path())?
        .arg("url")
        .assert()
        .success()
        .stdout("https://x\n");
    stack_output(dir.path())?
        .args(["dbPassword", "--show-secrets"])
        .assert()
        .success()
        .stdout("hunter2\n");
    Ok(())
}

#[test]
fn explicit_stack_overrides_current() -> Result<()> {
    let dir = web_stack()?;
    write_stack(dir.path(), "prod", None, json!({"url": "https://prod"}))?;
    stack_output(dir.path())?
        .args(["--stack", "prod", "url"])
        .assert()
        .success()
        .stdout("https://prod\n");
    Ok(())
}

#[test]
fn state_dir_flag_overrides_environment() -> Result<()> {
    let dir = web_stack()?;
    let elsewhere = TempDir::new()?;
    stack_output(elsewhere.path())?
        .arg("--state-dir")
        .arg(dir.path())
        .arg("url")
        .assert()
        .success()
        .stdout("https://x\n");
    Ok(())
}

#[test]
fn missing_property_fails() -> Result<()> {
    let dir = web_stack()?;
    stack_output(dir.path())?
        .arg("missing")
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains(
            "error: reading outputs of stack 'dev': current stack does not have output property 'missing'",
        ));
    Ok(())
}

#[test]
fn revealing_without_provider_fails_without_leaking() -> Result<()> {
    let dir = TempDir::new()?;
    let encrypted = Base64Crypter.encrypt(&json!("hunter2").to_string());
    write_stack(
        dir.path(),
        "dev",
        None,
        json!({"dbPassword": {SIG: SECRET_SIG, "ciphertext": encrypted}}),
    )?;
    let output = stack_output(dir.path())?
        .args(["--stack", "dev", "--show-secrets"])
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("decrypting output 'dbPassword'"), "{stderr}");
    assert_eq!(stderr.matches("secrets cannot be decrypted").count(), 1, "{stderr}");
    assert!(!stderr.contains("hunter2"));
    assert!(!stderr.contains(&encrypted));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn unsupported_provider_only_blocks_reveal() -> Result<()> {
    let dir = TempDir::new()?;
    write_stack(dir.path(), "dev", Some("awskms"), json!({"url": "https://x"}))?;
    stack_output(dir.path())?
        .args(["--stack", "dev", "url"])
        .assert()
        .success()
        .stdout("https://x\n");
    stack_output(dir.path())?
        .args(["--stack", "dev", "--show-secrets"])
        .assert()
        .failure()
        .stderr(contains("unsupported secrets provider 'awskms'"));
    Ok(())
}

#[test]
fn missing_stack_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    stack_output(dir.path())?
        .args(["--stack", "nope"])
        .assert()
        .failure()
        .stderr(contains("stack 'nope' not found"));
    stack_output(dir.path())?
        .assert()
        .failure()
        .stderr(contains("no stack selected"));
    Ok(())
}

#[test]
fn empty_stack_lists_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let stacks = dir.path().join("stacks");
    fs::create_dir_all(&stacks)?;
    fs::write(stacks.join("fresh.json"), r#"{"version": 3}"#)?;
    stack_output(dir.path())?
        .args(["-s", "fresh"])
        .assert()
        .success()
        .stdout("Current stack outputs (0):\n    No output values currently in this stack\n");
    Ok(())
}

#[test]
fn help_describes_every_option() -> Result<()> {
    let dir = TempDir::new()?;
    stack_output(dir.path())?
        .arg("--help")
        .assert()
        .success()
        .stdout(
            contains("--state-dir")
                .and(contains("Directory holding"))
                .and(contains("--show-secrets"))
                .and(contains("Display secret outputs as plaintext")),
        );
    Ok(())
}
