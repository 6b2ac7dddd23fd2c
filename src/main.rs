use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use scout::api::{self, AppState};
use scout::client::{
    AlgorithmSelector, Endpoint, SearchController, SearchForm, Shell, TerminalSurface, Theme,
};
use scout::config::CONFIG;
use scout::db::{Database, DocumentRepo, DocumentStore};
use scout::indexer::{Indexer, load_corpus};
use scout::preferences::Preferences;
use scout::query_engine::{Algorithm, QueryEngine};

#[derive(Parser)]
#[command(name = "scout", about = "Local document search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP search server
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
        /// Serve the text files under this directory from memory instead of MongoDB
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Directory with the static web UI
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Index text files (a file or a directory) into MongoDB
    Index { paths: Vec<PathBuf> },
    /// Send one search to a running server and print the results
    Search {
        query: String,
        #[arg(short, long, default_value = "BM")]
        algorithm: String,
        #[arg(short, long, default_value = "results")]
        endpoint: Endpoint,
        #[arg(long)]
        server: Option<String>,
    },
    /// List every document known to a running server
    Documents {
        #[arg(long)]
        server: Option<String>,
    },
    /// Interactive search prompt
    Shell {
        #[arg(short, long, default_value = "BM")]
        algorithm: Algorithm,
        #[arg(short, long, default_value = "results")]
        endpoint: Endpoint,
        #[arg(long)]
        server: Option<String>,
    },
    /// Turn the night theme on or off
    Theme { mode: ThemeMode },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ThemeMode {
    Night,
    Day,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber (also picks up records from the log crate)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            bind,
            corpus,
            static_dir,
        } => {
            let store: Arc<dyn DocumentStore> = match corpus {
                Some(path) => {
                    let (store, report) = load_corpus(&path).await?;
                    log::info!(
                        "serving {} documents from {} ({} skipped, {} failed)",
                        report.indexed,
                        path.display(),
                        report.skipped,
                        report.failed
                    );
                    store as Arc<dyn DocumentStore>
                }
                None => Arc::new(connect_repo().await?),
            };
            let engine = Arc::new(QueryEngine::new(CONFIG.vector_weighting));
            let bind = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
            let static_dir = static_dir.unwrap_or_else(|| CONFIG.static_dir.clone());
            api::serve(&bind, AppState::new(engine, store), &static_dir).await?;
        }
        Command::Index { paths } => {
            if paths.is_empty() {
                anyhow::bail!("nothing to index, pass at least one file or directory");
            }
            let indexer = Indexer::new(Arc::new(connect_repo().await?));
            for path in paths {
                let report = indexer.index_path(&path).await?;
                println!(
                    "{}: {} indexed, {} skipped, {} failed",
                    path.display(),
                    report.indexed,
                    report.skipped,
                    report.failed
                );
            }
        }
        Command::Search {
            query,
            algorithm,
            endpoint,
            server,
        } => {
            let controller = SearchController::new(server_url(server), endpoint);
            let mut surface = TerminalSurface::new(std::io::stdout(), stored_theme());
            controller
                .submit(&SearchForm::new(query, algorithm), &mut surface)
                .await;
        }
        Command::Documents { server } => {
            let controller = SearchController::new(server_url(server), Endpoint::Documents);
            let mut surface = TerminalSurface::new(std::io::stdout(), stored_theme());
            controller
                .submit(&SearchForm::new("", Algorithm::Boolean.code()), &mut surface)
                .await;
        }
        Command::Shell {
            algorithm,
            endpoint,
            server,
        } => {
            let controller = SearchController::new(server_url(server), endpoint);
            let mut shell = Shell::new(
                controller,
                AlgorithmSelector::new(algorithm),
                std::io::stdout(),
                Preferences::default_path(),
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell.run(stdin).await?;
        }
        Command::Theme { mode } => {
            let path = Preferences::default_path();
            let prefs = Preferences {
                night_theme: matches!(mode, ThemeMode::Night),
            };
            prefs.save(&path)?;
            println!("saved theme preference to {}", path.display());
        }
    }
    Ok(())
}

async fn connect_repo() -> Result<DocumentRepo> {
    let db = Database::from_config()
        .await
        .context("MongoDB is required here, or use `serve --corpus <dir>`")?;
    let repo = DocumentRepo::new(&db);
    repo.ensure_indexes().await?;
    log::info!("{} documents in the index", repo.count().await?);
    Ok(repo)
}

fn server_url(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| CONFIG.server_url.clone())
}

fn stored_theme() -> Theme {
    Theme::from_preferences(&Preferences::load(&Preferences::default_path()))
}
