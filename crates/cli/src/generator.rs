use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{sleep, timeout};

use crate::config::GeneratorConfig;

const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "rate_limit", "too many requests", "429", "quota"];
const STDERR_EXCERPT_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No generator configured; set [generator].command in the config file")]
    NotConfigured,

    #[error("Failed to start generator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generator rate limited: {0}")]
    RateLimited(String),

    #[error("Generator exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Generator returned an empty response")]
    EmptyResponse,
}

impl GenerationError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GenerationError::RateLimited(_))
    }
}

/// Source of model output for a rendered prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Runs an external program: prompt on stdin, response on stdout
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    pub fn from_config(cfg: &GeneratorConfig) -> Result<Self, GenerationError> {
        let (program, args) = cfg
            .command
            .split_first()
            .filter(|(program, _)| !program.trim().is_empty())
            .ok_or(GenerationError::NotConfigured)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: cfg.timeout(),
        })
    }
}

#[async_trait]
impl TextGenerator for CommandGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        log::debug!(
            "Running generator {} ({} prompt bytes)",
            self.program,
            prompt.len()
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed while stdout is drained; large prompts would otherwise deadlock.
        let writer = child.stdin.take().map(|mut stdin| {
            let payload = prompt.as_bytes().to_vec();
            tokio::spawn(async move {
                let result = stdin.write_all(&payload).await;
                drop(stdin);
                result
            })
        });

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(err)) if err.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(GenerationError::Io(err));
                }
                _ => {}
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let excerpt = excerpt(&stderr);
            if mentions_rate_limit(&stderr) {
                return Err(GenerationError::RateLimited(excerpt));
            }
            return Err(GenerationError::Failed {
                status: output.status.to_string(),
                stderr: excerpt,
            });
        }

        let response = String::from_utf8_lossy(&output.stdout).into_owned();
        if response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(response)
    }
}

/// Backoff schedule for rate-limited generations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(cfg: &GeneratorConfig) -> Self {
        Self {
            attempts: cfg.rate_limit_retries.max(1),
            initial_delay: cfg.initial_backoff(),
        }
    }

    /// Delay before attempt `n + 1`, doubling each time
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

/// Generate, retrying only on rate limits. No sleep follows the final attempt.
pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, GenerationError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match generator.generate(prompt).await {
            Err(err) if err.is_rate_limit() && attempt < attempts => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    "Rate limited (attempt {attempt}/{attempts}), retrying in {:.1}s",
                    delay.as_secs_f64()
                );
                sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn mentions_rate_limit(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= STDERR_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(STDERR_EXCERPT_CHARS).collect();
    out.push('…');
    out
}
