use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::BackendConfig;
use crate::protocol::Usage;

/// The `--model` flag understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFlag {
    Opus,
    Sonnet,
    Haiku,
}

impl ModelFlag {
    #[must_use]
    pub fn as_flag(self) -> &'static str {
        match self {
            ModelFlag::Opus => "opus",
            ModelFlag::Sonnet => "sonnet",
            ModelFlag::Haiku => "haiku",
        }
    }
}

impl fmt::Display for ModelFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Map a requested model name to a CLI `--model` flag.
///
/// Case-insensitive substring match against the three known tiers;
/// anything unrecognized falls back to `sonnet`.
#[must_use]
pub fn resolve_model_flag(model_name: &str) -> ModelFlag {
    let lower = model_name.to_lowercase();
    if lower.contains("opus") {
        ModelFlag::Opus
    } else if lower.contains("sonnet") {
        ModelFlag::Sonnet
    } else if lower.contains("haiku") {
        ModelFlag::Haiku
    } else {
        ModelFlag::Sonnet
    }
}

/// Outcome of one backend invocation. Failures are values, not errors:
/// nothing downstream may assume the backend is well-behaved.
#[derive(Debug, Clone)]
pub enum BackendResult {
    Reply { text: String, usage: Usage },
    Failure { message: String },
}

/// Wire shape of the CLI's `--output-format json` reply.
#[derive(Debug, Deserialize)]
struct CliReply {
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: String,
    #[serde(default)]
    usage: Usage,
}

/// Invokes the headless CLI, one subprocess per request.
#[derive(Debug, Clone)]
pub struct CliBackend {
    command: String,
    timeout: Option<Duration>,
}

impl CliBackend {
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Run the CLI with the compiled prompt on stdin and parse its JSON
    /// reply.
    ///
    /// Never returns an error: spawn failures, non-zero exits, timeouts
    /// and unparsable output all surface as [`BackendResult::Failure`].
    pub async fn invoke(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        model: ModelFlag,
    ) -> BackendResult {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-p")
            .args(["--tools", ""])
            .args(["--output-format", "json"])
            .args(["--model", model.as_flag()]);
        if let Some(system_prompt) = system_prompt {
            cmd.args(["--system-prompt", system_prompt]);
        }
        // The CLI refuses to start nested inside one of its own sessions.
        cmd.env_remove("CLAUDECODE");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let run = run_child(cmd, prompt);
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(output) => output,
                Err(_) => {
                    return BackendResult::Failure {
                        message: format!(
                            "{} timed out after {}s",
                            self.command,
                            limit.as_secs()
                        ),
                    }
                }
            },
            None => run.await,
        };

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                return BackendResult::Failure {
                    message: format!("failed to run {}: {err}", self.command),
                }
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return BackendResult::Failure {
                message: format!("{} error: {stderr}", self.command),
            };
        }

        match serde_json::from_slice::<CliReply>(&output.stdout) {
            Ok(reply) if reply.is_error => BackendResult::Failure {
                message: reply.result,
            },
            Ok(reply) => BackendResult::Reply {
                text: reply.result,
                usage: reply.usage,
            },
            Err(_) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                BackendResult::Failure {
                    message: format!(
                        "invalid JSON from {}: {}",
                        self.command,
                        truncate_chars(&stdout, 500)
                    ),
                }
            }
        }
    }
}

async fn run_child(mut cmd: Command, prompt: &str) -> std::io::Result<std::process::Output> {
    let mut child = cmd.spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prompt.as_bytes()).await?;
        // Dropping stdin closes the pipe so the CLI sees end of input.
    }
    child.wait_with_output().await
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
