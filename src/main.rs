use std::path::PathBuf;
use std::sync::Arc;

use resumatch::cli::{Cli, Commands, ConfigAction};
use resumatch::config::Config;
use resumatch::corpus::{Corpus, DirectorySource};
use resumatch::embedding::{EmbeddingProvider, FastEmbedProvider};
use resumatch::error::{Result, ResumatchError};
use resumatch::eval::{evaluate, LabeledQuery, Metrics};
use resumatch::index::IndexStore;
use resumatch::search::SemanticSearcher;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Search {
            jd,
            file,
            limit,
            corpus,
            json,
        } => {
            cmd_search(cli.config, jd, file, limit, corpus, json)?;
        }
        Commands::Refresh { corpus } => {
            cmd_refresh(cli.config, corpus)?;
        }
        Commands::Evaluate {
            fixture,
            limit,
            corpus,
            json,
        } => {
            cmd_evaluate(cli.config, fixture, limit, corpus, json)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "resumatch=debug"
    } else {
        "resumatch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_search(
    config_path: Option<PathBuf>,
    jd: Option<String>,
    file: Option<PathBuf>,
    limit: Option<usize>,
    corpus_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let jd_text = job_description(jd, file)?;
    let limit = limit.unwrap_or(config.search.default_limit);
    let source = DirectorySource::new(corpus_dir.unwrap_or_else(|| config.corpus.source_dir.clone()));

    let searcher = make_searcher(&config)?;
    let results = searcher.query(&source, &jd_text, limit)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&results).map_err(|e| ResumatchError::Json {
                source: e,
                context: "Failed to serialize search results".to_string(),
            })?;
        println!("{}", rendered);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matching resumes found.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>2}. {} (score: {:.4})",
            rank + 1,
            result.id,
            result.score
        );
        if !result.snippet.is_empty() {
            println!("    {}", result.snippet);
        }
    }

    Ok(())
}

fn cmd_refresh(config_path: Option<PathBuf>, corpus_dir: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let source = DirectorySource::new(corpus_dir.unwrap_or_else(|| config.corpus.source_dir.clone()));

    let corpus = Corpus::from_source(&source)?;
    let searcher = make_searcher(&config)?;
    let (index, handle) = searcher.refresh(&corpus)?;

    println!(
        "✓ Index refreshed: {} documents ({}D) at {}",
        index.len(),
        index.dimension(),
        handle.path.display()
    );

    Ok(())
}

fn cmd_evaluate(
    config_path: Option<PathBuf>,
    fixture: PathBuf,
    limit: Option<usize>,
    corpus_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let limit = limit.unwrap_or(config.search.default_limit);

    let content = std::fs::read_to_string(&fixture).map_err(|e| ResumatchError::Io {
        source: e,
        context: format!("Failed to read evaluation fixture: {:?}", fixture),
    })?;
    let labeled: Vec<LabeledQuery> =
        serde_json::from_str(&content).map_err(|e| ResumatchError::Json {
            source: e,
            context: format!("Failed to parse evaluation fixture: {:?}", fixture),
        })?;

    let queries: Vec<String> = labeled.iter().map(|l| l.query.clone()).collect();
    let expected: Vec<Vec<String>> = labeled.iter().map(|l| l.expected.clone()).collect();

    let source = DirectorySource::new(corpus_dir.unwrap_or_else(|| config.corpus.source_dir.clone()));
    let corpus = Corpus::from_source(&source)?;

    let searcher = make_searcher(&config)?;
    let (index, _handle) = searcher.get_or_build(&corpus)?;
    let mut runner = searcher.bind(&corpus, index, limit);

    let metrics = evaluate(&queries, &expected, &mut runner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics.to_json()).map_err(
            |e| ResumatchError::Json {
                source: e,
                context: "Failed to serialize metrics".to_string(),
            },
        )?);
        return Ok(());
    }

    println!("Evaluation over {} queries (k={})", queries.len(), limit);
    print_metrics(&metrics);

    Ok(())
}

fn print_metrics(metrics: &Metrics) {
    println!("  precision: {}", format_metric(metrics.precision));
    println!("  recall:    {}", format_metric(metrics.recall));
    println!("  f1:        {}", format_metric(metrics.f1));
    println!("  mrr:       {}", format_metric(metrics.mrr));
}

fn format_metric(value: f64) -> String {
    if value.is_finite() {
        format!("{:.4}", value)
    } else {
        "n/a".to_string()
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| ResumatchError::Json {
                    source: e,
                    context: "Failed to serialize config".to_string(),
                })?;
            println!("{}", json);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ResumatchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            Config::load(&path)?;
            println!("✓ Configuration is valid");
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'resumatch config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        return Ok(config);
    }

    Config::load(&path)
}

fn make_searcher(config: &Config) -> Result<SemanticSearcher> {
    let provider = FastEmbedProvider::new(&config.embedding.model)?;
    if provider.dimension() != config.embedding.dimension {
        tracing::warn!(
            "Configured dimension {} does not match model dimension {}; using the model's",
            config.embedding.dimension,
            provider.dimension()
        );
    }
    Ok(SemanticSearcher::new(
        Arc::new(provider),
        IndexStore::new(config.index.path.clone()),
        config.search.clone(),
    ))
}

fn job_description(jd: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (jd, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| ResumatchError::Io {
            source: e,
            context: format!("Failed to read job description file: {:?}", path),
        }),
        (None, None) => Err(ResumatchError::InvalidInput(
            "No job description provided: pass it inline or with --file".to_string(),
        )),
    }
}
