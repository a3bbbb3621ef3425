use clap::{Parser, Subcommand};
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use architect::config::Config;
use architect::generator::{GenerationRequest, Generator};
use architect::llm::AnthropicClient;
use architect::runner::LoopController;
use architect::sanitize::InputSanitizer;
use architect::server::{self, AppState};
use architect::tokens::{DesignTokenSet, DesignTokenStore};

/// Architect - guided component generation with a bounded correction loop
#[derive(Parser, Debug)]
#[command(name = "architect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a component from a description
    Generate {
        /// Description of the component to build
        #[arg(short, long)]
        prompt: String,

        /// File holding a previously generated component to refine
        #[arg(long)]
        previous_code: Option<PathBuf>,

        /// Write the generated component here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the HTTP API for the preview UI
    Serve {
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the assembled prompt without calling the model
    Prompt {
        /// Description of the component to build
        #[arg(short, long)]
        prompt: String,
    },
}

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("architect")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("architect.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn load_tokens(config: &Config) -> Result<Arc<DesignTokenSet>> {
    match &config.tokens.path {
        Some(path) => {
            DesignTokenStore::load(path).context(format!("Failed to load design tokens from {}", path.display()))
        }
        None => Ok(DesignTokenStore::default_set()),
    }
}

fn build_state(config: &Config) -> Result<AppState> {
    let tokens = load_tokens(config)?;
    let client = AnthropicClient::new(config.anthropic()).context("Failed to create model client")?;
    let generator = Generator::new(Arc::new(client), config.sampling());

    Ok(AppState {
        controller: Arc::new(LoopController::new(generator, config.loop_config())),
        sanitizer: InputSanitizer::new(config.sanitizer.policy),
        tokens,
    })
}

async fn handle_generate(
    config: &Config,
    prompt: &str,
    previous_code: Option<&PathBuf>,
    output: Option<&PathBuf>,
    verbose: bool,
) -> Result<()> {
    let state = build_state(config)?;

    let previous_code = previous_code
        .map(|path| fs::read_to_string(path).context(format!("Failed to read {}", path.display())))
        .transpose()?;

    let sanitized = state.sanitizer.sanitize(prompt)?;
    if sanitized.risk_flagged() {
        println!(
            "{} suspicious phrases in request: {}",
            "warning:".yellow(),
            sanitized.matched_phrases().join(", ")
        );
    }

    let request = GenerationRequest {
        user_prompt: sanitized,
        previous_code,
        tokens: state.tokens.clone(),
    };

    let result = state.controller.run(request).await?;

    if verbose {
        for line in &result.logs {
            println!("{}", line.dimmed());
        }
    }

    if result.success {
        println!(
            "{} component passed validation in {} iteration(s)",
            "ok:".green(),
            result.iterations
        );
    } else {
        println!(
            "{} validation still failing after {} iteration(s), emitting last candidate",
            "warning:".yellow(),
            result.iterations
        );
    }

    match output {
        Some(path) => {
            fs::write(path, &result.code).context(format!("Failed to write {}", path.display()))?;
            println!("component written to {}", path.display());
        }
        None => println!("\n{}", result.code),
    }

    Ok(())
}

async fn handle_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let state = build_state(config)?;
    let port = port.unwrap_or(config.server.port);

    println!("{} http://{}:{}", "serving on".cyan(), config.server.host, port);
    server::serve(state, &config.server.host, port).await?;
    Ok(())
}

fn handle_prompt(config: &Config, prompt: &str) -> Result<()> {
    let tokens = load_tokens(config)?;
    let sanitizer = InputSanitizer::new(config.sanitizer.policy);
    let sanitized = sanitizer.sanitize(prompt)?;

    // The prompt dump never talks to the provider, so a scripted client
    // stands in for it.
    let client = Arc::new(architect::llm::MockModelClient::new(vec![]));
    let generator = Generator::new(client, config.sampling());

    let request = GenerationRequest {
        user_prompt: sanitized,
        previous_code: None,
        tokens,
    };
    println!("{}", generator.assemble_prompt(&request, None));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref())?;

    info!("Starting application");

    match &cli.command {
        Commands::Generate {
            prompt,
            previous_code,
            output,
        } => handle_generate(&config, prompt, previous_code.as_ref(), output.as_ref(), cli.verbose).await,
        Commands::Serve { port } => handle_serve(&config, *port).await,
        Commands::Prompt { prompt } => handle_prompt(&config, prompt),
    }
}
