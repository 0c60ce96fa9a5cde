use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use command::CommandContext;
use config::{Config, ConfigSource};
use flags::ApplyFlags;
use std::fs;
use std::io;
use std::path::PathBuf;

mod command;
mod config;
mod confirm;
mod flags;
mod generator;
mod prompts;
mod render;

pub(crate) fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "context-patch")]
#[command(about = "Feed a codebase to a text generator and apply the files it proposes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root to read context from and write changes into
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (overrides CONTEXT_PATCH_CONFIG and discovered files)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the files that would be sent as context
    Context(ContextArgs),

    /// Ask a question about the codebase
    Ask(AskArgs),

    /// Rewrite a single existing file
    Edit(EditArgs),

    /// Generate a test file for an existing source file
    #[command(name = "generate-test")]
    GenerateTest(GenerateTestArgs),

    /// Change several files at once from one instruction
    Refactor(RefactorArgs),

    /// Apply a saved response containing FILE blocks
    Apply(ApplyArgs),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct ContextArgs {
    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Print the rendered context instead of the file listing
    #[arg(long, conflicts_with = "json")]
    full: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question to send along with the codebase
    prompt: String,
}

#[derive(Args)]
struct EditArgs {
    /// File to rewrite, relative to the project root
    file: String,

    /// What to change
    prompt: String,

    /// Use a saved response instead of calling the generator
    #[arg(long)]
    response_file: Option<PathBuf>,

    #[command(flatten)]
    apply: ApplyFlags,
}

#[derive(Args)]
struct GenerateTestArgs {
    /// Source file to test, relative to the project root
    file: String,

    /// Test framework named in the request
    #[arg(long, default_value = "pytest")]
    framework: String,

    /// Use a saved response instead of calling the generator
    #[arg(long)]
    response_file: Option<PathBuf>,

    #[command(flatten)]
    apply: ApplyFlags,
}

#[derive(Args)]
struct RefactorArgs {
    /// Description of the change
    prompt: String,

    /// Use a saved response instead of calling the generator
    #[arg(long)]
    response_file: Option<PathBuf>,

    #[command(flatten)]
    apply: ApplyFlags,

    /// Output the apply report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ApplyArgs {
    /// Response file, or `-` for stdin
    response: PathBuf,

    #[command(flatten)]
    apply: ApplyFlags,

    /// Output the apply report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Context(args) => args.json,
        Commands::Refactor(args) => args.json,
        Commands::Apply(args) => args.json,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let root = fs::canonicalize(&cli.root)
        .with_context(|| format!("Project root {} is not accessible", cli.root.display()))?;
    let (config, source) = Config::load(cli.config.as_deref(), &root)?;
    if let ConfigSource::File(path) = &source {
        log::debug!("Using config {}", path.display());
    }
    let ctx = CommandContext::new(root, config, source);

    match cli.command {
        Commands::Context(args) => {
            print_stdout(command::run_context(&ctx, args.json, args.full)?.trim_end())?
        }
        Commands::Ask(args) => print_stdout(command::run_ask(&ctx, &args.prompt).await?.trim_end())?,
        Commands::Edit(args) => {
            command::run_edit(
                &ctx,
                &args.file,
                &args.prompt,
                args.response_file.as_deref(),
                args.apply,
            )
            .await?;
        }
        Commands::GenerateTest(args) => {
            command::run_generate_test(
                &ctx,
                &args.file,
                &args.framework,
                args.response_file.as_deref(),
                args.apply,
            )
            .await?;
        }
        Commands::Refactor(args) => {
            command::run_refactor(
                &ctx,
                &args.prompt,
                args.response_file.as_deref(),
                args.apply,
                args.json,
            )
            .await?;
        }
        Commands::Apply(args) => {
            command::run_apply(&ctx, &args.response, args.apply, args.json)?;
        }
        Commands::Config => run_config(&ctx)?,
    }

    Ok(())
}

fn run_config(ctx: &CommandContext) -> Result<()> {
    match ctx.config_source() {
        ConfigSource::File(path) => eprintln!("# loaded from {}", path.display()),
        ConfigSource::Defaults => eprintln!("# built-in defaults"),
    }
    print_stdout(ctx.config().to_toml()?.trim_end())
}
