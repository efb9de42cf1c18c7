mod cli;
mod web;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use faqroute_core::{
    decide, evaluate_cases, parse_cases, Category, Decision, FaqStore, FileConfig, Pipeline,
    Resolution, RetrievalParams, Settings,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, OutputFormat};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn load_file_config(cli: &Cli) -> Result<FileConfig> {
    match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            FileConfig::load(path).with_context(|| format!("read {}", path.display()))
        }
        None => match FileConfig::default_path() {
            Some(path) => {
                FileConfig::load(&path).with_context(|| format!("read {}", path.display()))
            }
            None => Ok(FileConfig::default()),
        },
    }
}

/// Flags over file values; the merged result is range-checked.
fn retrieval_params(cli: &Cli, file: &FileConfig) -> Result<RetrievalParams> {
    let base = file.retrieval();
    let params = RetrievalParams {
        threshold: cli.threshold.unwrap_or(base.threshold),
        boost: cli.boost.unwrap_or(base.boost),
    };
    params.validate()?;
    Ok(params)
}

fn data_dir(cli: &Cli, file: &FileConfig) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| file.data_dir())
}

/// Flags win over environment, environment over the config file.
fn settings(cli: &Cli, file: &FileConfig) -> Result<Settings> {
    let mut settings = Settings::from_env(file)?;
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
        if file.fallback_model.is_none() {
            settings.fallback_model = model.clone();
        }
    }
    settings.data_dir = data_dir(cli, file);
    settings.retrieval = retrieval_params(cli, file)?;
    Ok(settings)
}

fn print_resolution(resolution: &Resolution, format: OutputFormat, trace: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(resolution)?);
        }
        OutputFormat::Text => {
            println!("Category: {}", resolution.category);
            println!();
            println!("{}", resolution.answer);
            if trace {
                println!();
                println!("Trace:");
                print!("{}", resolution.trace);
            }
        }
    }
    Ok(())
}

async fn run_ask(
    cli: &Cli,
    file: &FileConfig,
    question: &str,
    format: OutputFormat,
    trace: bool,
    timeout: Option<Duration>,
) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Please enter a question to proceed.");
    }

    let settings = settings(cli, file)?;
    let pipeline = Pipeline::from_settings(&settings).context("build pipeline")?;

    let resolution = match timeout {
        Some(limit) => tokio::time::timeout(limit, pipeline.resolve(question))
            .await
            .map_err(|_| anyhow!("no answer within {}", humantime::format_duration(limit)))?,
        None => pipeline.resolve(question).await,
    };

    print_resolution(&resolution, format, trace)
}

async fn run_match(cli: &Cli, file: &FileConfig, category: Category, question: &str) -> Result<()> {
    let store = FaqStore::new(data_dir(cli, file));
    let params = retrieval_params(cli, file)?;
    let entries = match store.load(category).await? {
        Some(entries) => entries,
        None => {
            eprintln!("no store at {}", store.path_for(category).display());
            Vec::new()
        }
    };
    let result = decide(question, &entries, params);

    println!(
        "category={} decision={:?} score={:.4} threshold={:.2} line={}",
        category,
        result.decision,
        result.score,
        params.threshold,
        result
            .entry_line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "null".to_string())
    );
    if let Some(q) = &result.question {
        println!("question={q}");
    }
    if result.decision == Decision::Hit {
        println!("answer={}", result.answer.as_deref().unwrap_or(""));
    }
    Ok(())
}

fn read_cases(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("open {}", path.display()))
}

async fn run_eval(cli: &Cli, file: &FileConfig, cases: &Path, min_pass_rate: f32) -> Result<()> {
    let run_id = format!("eval-{}", chrono::Utc::now().timestamp_millis());
    let params = retrieval_params(cli, file)?;
    let store = FaqStore::new(data_dir(cli, file));
    let cases = parse_cases(&read_cases(cases)?).context("parse eval cases json")?;

    let summary = evaluate_cases(&store, &cases, params).await?;

    println!(
        "run_id={} threshold={:.2} boost={:.2} total={} passed={} failed={} pass_rate={:.4} required={:.4} meets_threshold={}",
        run_id,
        params.threshold,
        params.boost,
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate,
        min_pass_rate,
        summary.pass_rate >= min_pass_rate
    );

    for o in &summary.outcomes {
        println!(
            "case={} passed={} decision={:?} line={} score={:.4} latency={:.3}ms",
            o.case_id,
            o.passed,
            o.actual_decision,
            o.actual_line
                .map(|l| l.to_string())
                .unwrap_or_else(|| "null".to_string()),
            o.score,
            o.latency_ms
        );
    }
    Ok(())
}

async fn run_serve(cli: &Cli, file: &FileConfig, addr: std::net::SocketAddr) -> Result<()> {
    let settings = settings(cli, file)?;
    let pipeline = Pipeline::from_settings(&settings).context("build pipeline")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    eprintln!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, web::router(pipeline))
        .await
        .context("http server failed")
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.validate().map_err(|msg| anyhow!(msg))?;

    let file = load_file_config(&cli)?;

    match &cli.command {
        Commands::Ask {
            question,
            format,
            trace,
            timeout,
        } => {
            let timeout = timeout.as_ref().map(|t| *t.as_ref());
            run_ask(&cli, &file, question, *format, *trace, timeout).await
        }
        Commands::Match { category, question } => {
            run_match(&cli, &file, *category, question).await
        }
        Commands::Eval {
            cases,
            min_pass_rate,
        } => run_eval(&cli, &file, cases, *min_pass_rate).await,
        Commands::Serve { addr } => run_serve(&cli, &file, *addr).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
