//! Host probes used by the environment check.

use std::process::Command;
use tracing::debug;

/// Outcome of running one probe command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    pub success: bool,
    pub output: String,
}

impl ProbeOutput {
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Read-only view of the learner's machine.
///
/// Implementations never fail: a missing program is a `success: false`
/// outcome, not an error.
pub trait Probe {
    /// Run a program with arguments and capture its output
    fn run(&self, program: &str, args: &[&str]) -> ProbeOutput;

    /// Look up an environment variable, treating blank values as unset
    fn env_var(&self, name: &str) -> Option<String>;
}

/// Probe backed by real processes and the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl Probe for SystemProbe {
    fn run(&self, program: &str, args: &[&str]) -> ProbeOutput {
        let result = Command::new(program).args(args).output();
        match result {
            Ok(output) => {
                // Older Pythons print --version to stderr
                let mut text = String::from_utf8_lossy(&output.stdout).to_string();
                if text.trim().is_empty() {
                    text = String::from_utf8_lossy(&output.stderr).to_string();
                }
                debug!(
                    "probe {} {:?}: status={}, output={}",
                    program,
                    args,
                    output.status,
                    text.trim()
                );
                ProbeOutput {
                    success: output.status.success(),
                    output: text,
                }
            }
            Err(e) => {
                debug!("probe {} {:?} failed to start: {}", program, args, e);
                ProbeOutput::failed(e.to_string())
            }
        }
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}
