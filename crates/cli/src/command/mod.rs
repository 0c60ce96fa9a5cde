mod apply;
mod ask;
mod context;
mod edit;

pub(crate) use apply::{run_apply, run_refactor};
pub(crate) use ask::run_ask;
pub(crate) use context::run_context;
pub(crate) use edit::run_edit;
pub(crate) use generate_test::run_generate_test;

use crate::config::{Config, ConfigSource};
use crate::generator::{
    generate_with_retry, CommandGenerator, GenerationError, RetryPolicy, TextGenerator,
};
use anyhow::{Context as AnyhowContext, Result};
use context_changes::{ApplyOptions, MutationExecutor};
use context_scanner::{ContextAssembler, ContextSnapshot};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs: project root, effective config, and an optional generator
pub struct CommandContext {
    root: PathBuf,
    config: Config,
    config_source: ConfigSource,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CommandContext {
    pub fn new(root: PathBuf, config: Config, config_source: ConfigSource) -> Self {
        let generator = match CommandGenerator::from_config(&config.generator) {
            Ok(generator) => Some(Arc::new(generator) as Arc<dyn TextGenerator>),
            Err(err) => {
                log::debug!("Generator unavailable: {err}");
                None
            }
        };
        Self {
            root,
            config,
            config_source,
            generator,
        }
    }

    #[cfg(test)]
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_source(&self) -> &ConfigSource {
        &self.config_source
    }

    pub fn generator(&self) -> Result<&dyn TextGenerator, GenerationError> {
        self.generator
            .as_deref()
            .ok_or(GenerationError::NotConfigured)
    }

    pub fn assemble(&self) -> Result<ContextSnapshot> {
        let snapshot = ContextAssembler::new(&self.root, self.config.exclusions.clone())
            .assemble()
            .with_context(|| format!("Failed to assemble context from {}", self.root.display()))?;
        log::info!(
            "Context: {} files, {} bytes",
            snapshot.len(),
            snapshot.stats().admitted_bytes
        );
        Ok(snapshot)
    }

    pub fn executor(&self, options: ApplyOptions) -> MutationExecutor {
        MutationExecutor::new(&self.root, options)
    }

    /// Send one prompt to the generator with rate-limit retries and a spinner
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let generator = self.generator()?;
        let policy = RetryPolicy::from_config(&self.config.generator);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for generator");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = generate_with_retry(generator, prompt, policy).await;
        spinner.finish_and_clear();
        Ok(result?)
    }

    /// Saved response text, from a file or `-` for stdin
    pub fn read_response(&self, source: &Path) -> Result<String> {
        if source == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read response from stdin")?;
            return Ok(buf);
        }
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read response file {}", source.display()))
    }

    /// Saved response when given, otherwise a fresh generation for `prompt`
    pub async fn response_for(
        &self,
        response_file: Option<&Path>,
        prompt: impl FnOnce() -> Result<String>,
    ) -> Result<String> {
        match response_file {
            Some(path) => self.read_response(path),
            None => {
                let prompt = prompt()?;
                self.generate(&prompt).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    fn ctx(temp: &TempDir) -> CommandContext {
        CommandContext::new(
            temp.path().to_path_buf(),
            Config::default(),
            ConfigSource::Defaults,
        )
    }

    #[test]
    fn generator_is_a_capability() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(&temp);
        assert!(matches!(
            ctx.generator(),
            Err(GenerationError::NotConfigured)
        ));

        let ctx = ctx.with_generator(Arc::new(Canned("ok")));
        assert!(ctx.generator().is_ok());
    }

    #[tokio::test]
    async fn saved_response_skips_generation() {
        let temp = TempDir::new().unwrap();
        let saved = temp.path().join("response.txt");
        std::fs::write(&saved, "FILE: a.py\n```\nx\n```\n").unwrap();

        let ctx = ctx(&temp);
        let text = ctx
            .response_for(Some(&saved), || panic!("prompt must not be built"))
            .await
            .unwrap();
        assert_eq!(text, "FILE: a.py\n```\nx\n```\n");
    }

    #[tokio::test]
    async fn fresh_response_uses_generator() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(&temp).with_generator(Arc::new(Canned("answer")));
        let text = ctx
            .response_for(None, || Ok("question".to_string()))
            .await
            .unwrap();
        assert_eq!(text, "answer");
    }
}
