//! Shared integration-test harness for running the `privchain` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Helpers for invoking the `privchain` binary as a child process.
pub struct PrivChainProcess;

impl PrivChainProcess {
    /// Runs `privchain` with `args` and `--quiet`, returning its output.
    ///
    /// Catalog and logging environment variables are cleared so the
    /// built-in catalog is used unless a test passes `--catalog`.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_privchain"))
            .args(args)
            .arg("--quiet")
            .env_remove("PRIVCHAIN_CATALOG")
            .env_remove("PRIVCHAIN_LOG_LEVEL")
            .output()
            .expect("failed to spawn privchain")
    }
}

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Stdout as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
