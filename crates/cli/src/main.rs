//! pagechat command-line interface.
//!
//! `pagechat load` extracts one page and prints it. `pagechat chat` loads a
//! page and answers questions about it from stdin. Logs go to stderr.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use pagechat_client::{Extractor, GeminiClient, LoadOptions, ask_session};
use pagechat_core::{AppConfig, ChatSession, Error, PageOutcome};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagechat")]
#[command(about = "Extract readable text from web pages and ask questions about it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a page and print its text
    Load {
        /// Page URL; https is assumed when no scheme is given
        url: String,

        #[command(flatten)]
        load: LoadArgs,

        /// Print the tagged JSON outcome instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Load a page, then answer questions about it read from stdin
    Chat {
        /// Page URL; https is assumed when no scheme is given
        url: String,

        #[command(flatten)]
        load: LoadArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct LoadArgs {
    /// Require headless rendering
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_render")]
    render: bool,

    /// Skip headless rendering and fetch statically
    #[arg(long, action = ArgAction::SetTrue)]
    no_render: bool,

    /// Page-load bound for headless rendering in milliseconds
    #[arg(long, env = "PAGECHAT_PAGE_LOAD_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

impl LoadArgs {
    fn render(&self) -> Option<bool> {
        match (self.render, self.no_render) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn options(&self, extractor: &Extractor) -> Result<LoadOptions, Error> {
        LoadOptions::from_request(self.render(), self.timeout_ms, extractor.dynamic_available())
    }
}

const CHAT_HELP: &str = "Ask a question about the page. Commands: /clear (forget history), /reload (re-extract), /quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    let extractor = Extractor::from_config(&config)?;
    tracing::debug!(dynamic_rendering = extractor.dynamic_available(), "extractor ready");

    match cli.command {
        Commands::Load { url, load, json } => run_load(&extractor, &url, load, json).await,
        Commands::Chat { url, load } => run_chat(&config, &extractor, &url, load).await,
    }
}

async fn run_load(extractor: &Extractor, url: &str, args: LoadArgs, json: bool) -> Result<()> {
    let opts = args.options(extractor)?;
    let outcome = extractor.load_outcome(url, &opts).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if !outcome.is_success() {
            bail!("extraction failed");
        }
        return Ok(());
    }

    match outcome {
        PageOutcome::Success(page) => {
            eprintln!(
                "[{}{}] {} chars, {} words",
                page.method,
                if page.fallback { ", fallback" } else { "" },
                page.stats.char_count,
                page.stats.word_count
            );
            println!("{}", page.text);
            Ok(())
        }
        PageOutcome::Error { kind, message } => bail!("{kind}: {message}"),
    }
}

async fn run_chat(config: &AppConfig, extractor: &Extractor, url: &str, args: LoadArgs) -> Result<()> {
    let model = GeminiClient::from_app_config(config)?;
    let opts = args.options(extractor)?;

    let mut session = ChatSession::new();
    let page = extractor.load(url, &opts).await?;
    eprintln!("Loaded \"{}\" ({}, {} chars)", page.title, page.method, page.stats.char_count);
    session.load(page);
    eprintln!("{CHAT_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                eprintln!("History cleared.");
            }
            "/reload" => match extractor.load(url, &opts).await {
                Ok(page) => {
                    eprintln!("Reloaded ({}, {} chars); history cleared.", page.method, page.stats.char_count);
                    session.load(page);
                }
                Err(e) => {
                    tracing::warn!(url, "reload failed: {e}");
                    eprintln!("{e}");
                }
            },
            "/help" => eprintln!("{CHAT_HELP}"),
            question => match ask_session(&model, &mut session, question, config.max_prompt_chars).await {
                Ok(answer) => println!("{answer}\n"),
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    Ok(())
}
