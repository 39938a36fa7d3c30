//! CLI binary for docscout.
//!
//! Output goes to stdout; tracing goes to stderr so the output can be piped
//! straight into a prompt.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docscout::tools::documentation::FALLBACK_LABEL;
use docscout::{DocscoutConfig, build_registry};
use docscout_search::{AnswerSource, DocumentationResolver, Query, ResearchPipeline};
use tracing_subscriber::EnvFilter;

/// docscout: search the web and fetch live documentation for coding agents.
#[derive(Parser)]
#[command(name = "docscout", version, about)]
struct Cli {
    /// Path to TOML configuration file (default: ~/.config/docscout/config.toml
    /// when it exists).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// List search results as markdown.
    Search {
        /// Search query.
        query: String,
        /// Number of results (1-20).
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Search language hint, e.g. "en".
        #[arg(long)]
        lang: Option<String>,
    },

    /// Search, fetch every result page and print the extracted text.
    Content {
        /// Search query.
        query: String,
        /// Number of pages (1-20).
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Search language hint, e.g. "en".
        #[arg(long)]
        lang: Option<String>,
    },

    /// Look up documentation for a library and topic.
    Docs {
        /// Library or framework name.
        library: String,
        /// Function, class or concept.
        topic: String,
        /// Number of pages to consult (1-20).
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },

    /// Run an agent tool with JSON arguments.
    Tool {
        /// Tool name, e.g. "web_search".
        name: String,
        /// Arguments as a JSON object.
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Print the JSON schemas of the agent tools.
    Schemas,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docscout=info,docscout_search=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Search { query, count, lang } => {
            let pipeline = ResearchPipeline::from_config(&config.pipeline)?;
            println!("{}", pipeline.search(&build_query(query, count, lang)).await?);
        }
        Command::Content { query, count, lang } => {
            let pipeline = ResearchPipeline::from_config(&config.pipeline)?;
            let text = pipeline
                .get_content_for_llm(&build_query(query, count, lang))
                .await?;
            println!("{text}");
        }
        Command::Docs {
            library,
            topic,
            count,
        } => {
            let resolver = DocumentationResolver::from_config(&config.pipeline)?;
            let answer = resolver.resolve_documentation(&library, &topic, count).await?;
            tracing::info!(source = %answer.source, results = answer.result_count, "documentation resolved");
            if answer.source == AnswerSource::FallbackModel {
                println!("{FALLBACK_LABEL}\n");
            }
            println!("{}", answer.formatted_content);
        }
        Command::Tool { name, args } => {
            let args: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| anyhow::anyhow!("tool arguments are not valid JSON: {e}"))?;
            let registry = build_registry(&config)?;
            let result = registry.execute(&name, args).await?;
            if !result.success {
                anyhow::bail!(
                    "{name} failed: {}",
                    result.error.unwrap_or_else(|| "unknown error".into())
                );
            }
            println!("{}", result.content);
        }
        Command::Schemas => {
            let registry = build_registry(&config)?;
            let schemas = serde_json::Value::Array(registry.schemas_for_api());
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<DocscoutConfig> {
    let mut config = match path {
        Some(path) => DocscoutConfig::from_file(path)?,
        None => {
            let default = DocscoutConfig::default_config_path();
            if default.is_file() {
                tracing::debug!(path = %default.display(), "loading default config");
                DocscoutConfig::from_file(&default)?
            } else {
                DocscoutConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}

fn build_query(text: String, count: Option<usize>, lang: Option<String>) -> Query {
    let mut query = Query::new(text);
    if let Some(count) = count {
        query = query.with_count(count);
    }
    if let Some(lang) = lang {
        query = query.with_language(lang);
    }
    query
}
