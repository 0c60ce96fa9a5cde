use anyhow::Result;

use super::CommandContext;

/// Question about the codebase; the response is returned verbatim.
pub(crate) async fn run_ask(ctx: &CommandContext, prompt: &str) -> Result<String> {
    // Fail on a missing generator before walking the tree.
    ctx.generator()?;
    let snapshot = ctx.assemble()?;
    ctx.generate(&snapshot.render_prompt(prompt)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigSource};
    use crate::generator::{GenerationError, TextGenerator};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("It prints hello.".to_string())
        }
    }

    #[tokio::test]
    async fn sends_context_and_question() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("main.py"), "print('hello')\n").unwrap();

        let recorder = Arc::new(Recorder::default());
        let ctx = CommandContext::new(
            temp.path().to_path_buf(),
            Config::default(),
            ConfigSource::Defaults,
        )
        .with_generator(recorder.clone());

        let answer = run_ask(&ctx, "What does it print?").await.unwrap();
        assert_eq!(answer, "It prints hello.");

        let prompts = recorder.prompts.lock().unwrap();
        assert_eq!(
            prompts.as_slice(),
            &["Codebase Context:\nFile: main.py\nprint('hello')\n\n\nUser Prompt: What does it print?".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_generator_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ctx = CommandContext::new(
            temp.path().to_path_buf(),
            Config::default(),
            ConfigSource::Defaults,
        );
        let err = run_ask(&ctx, "anything").await.unwrap_err();
        assert!(err.to_string().contains("No generator configured"));
    }
}
