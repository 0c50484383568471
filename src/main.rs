//! Flowlab CLI - agent workflow runner

use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use flowlab::error::{FixSuggestion, FlowError};
use flowlab::provider::{create_provider, OpenAiProvider};
use flowlab::run::{Run, RunStatus, StepStatus};
use flowlab::service::Orchestrator;
use flowlab::store::ToolStore;
use flowlab::tool::HttpToolInvoker;
use flowlab::validate::validate;
use flowlab::workflow::Workflow;
use flowlab::Config;

#[derive(Parser)]
#[command(name = "flowlab")]
#[command(about = "Flowlab - agent workflow runner for local LLM endpoints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a stored workflow against an input
    Run {
        /// Workflow id (see `flowlab list`)
        id: u64,

        /// Input text for the run
        #[arg(short, long)]
        input: String,

        /// Override the provider (openai, mock)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the default model
        #[arg(short, long)]
        model: Option<String>,

        /// Override the step budget
        #[arg(long)]
        step_limit: Option<usize>,
    },

    /// Validate a workflow JSON file
    Validate {
        /// Path to the workflow file
        file: String,
    },

    /// Validate and store a workflow JSON file
    Import {
        /// Path to the workflow file
        file: String,
    },

    /// List stored workflows
    List,

    /// List recorded runs
    Runs {
        /// Only runs of this workflow
        #[arg(long)]
        workflow: Option<u64>,
    },

    /// List models exposed by the LLM server
    Models,
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            id,
            input,
            provider,
            model,
            step_limit,
        } => run_workflow(id, input, provider, model, step_limit).await,
        Commands::Validate { file } => validate_file(&file),
        Commands::Import { file } => import_file(&file),
        Commands::List => list_workflows(),
        Commands::Runs { workflow } => list_runs(workflow),
        Commands::Models => list_models().await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn build_orchestrator(
    config: &Config,
    provider_name: Option<&str>,
) -> Result<Orchestrator, FlowError> {
    let provider = create_provider(provider_name.unwrap_or("openai"), config)?;
    let tools = Arc::new(HttpToolInvoker::new(ToolStore::new(&config.data_dir)));
    Ok(Orchestrator::new(config, provider, tools))
}

async fn run_workflow(
    id: u64,
    input: String,
    provider: Option<String>,
    model: Option<String>,
    step_limit: Option<usize>,
) -> Result<(), FlowError> {
    let mut config = Config::from_env();
    if let Some(m) = model {
        config.model = Some(m);
    }
    if let Some(limit) = step_limit {
        config.step_limit = limit;
    }

    let orchestrator = build_orchestrator(&config, provider.as_deref())?;

    println!(
        "{} Running workflow {} (provider: {})",
        "→".cyan(),
        id.to_string().cyan().bold(),
        provider.as_deref().unwrap_or("openai").cyan()
    );

    let run = orchestrator
        .run_workflow(id, &Value::String(input))
        .await?;
    print_run(&run);
    Ok(())
}

fn print_run(run: &Run) {
    for step in &run.steps {
        match step.status {
            StepStatus::Completed => {
                let output = step.output.as_deref().unwrap_or("");
                println!(
                    "  {} {} [{}] {} ({} ms)",
                    "✓".green(),
                    step.node_id,
                    step.node_type,
                    truncate(output, 80),
                    step.latency_ms
                );
            }
            StepStatus::Error => {
                println!(
                    "  {} {} [{}] {}",
                    "✗".red(),
                    step.node_id,
                    step.node_type,
                    step.error.as_deref().unwrap_or("unknown error").red()
                );
            }
        }
    }

    match run.status {
        RunStatus::Completed => {
            println!("{} Run {} completed ({} ms)", "✓".green().bold(), run.id, run.total_latency_ms);
            if let Some(output) = &run.final_output {
                println!("{}", "Output:".cyan().bold());
                println!("{}", output);
            }
        }
        RunStatus::Failed => {
            let message = run
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("unknown error");
            println!("{} Run {} failed: {}", "✗".red().bold(), run.id, message);
        }
        RunStatus::Running => {}
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn read_workflow(file: &str) -> Result<Workflow, FlowError> {
    let raw = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&raw)?)
}

fn validate_file(file: &str) -> Result<(), FlowError> {
    let workflow = read_workflow(file)?;
    let report = validate(&workflow);

    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
        if let Some(suggestion) = warning.suggestion() {
            println!("    {} {}", "Fix:".yellow(), suggestion);
        }
    }

    if !report.is_valid() {
        for error in &report.errors {
            println!("  {} {}", "error:".red(), error);
            if let Some(suggestion) = error.suggestion() {
                println!("    {} {}", "Fix:".yellow(), suggestion);
            }
        }
        return Err(FlowError::InvalidWorkflow(format!(
            "{} error(s) in {}",
            report.errors.len(),
            file
        )));
    }

    println!("{} Workflow '{}' is valid", "✓".green(), workflow.name);
    println!("  Nodes: {}", report.node_count);
    println!("  Edges: {}", report.edge_count);
    Ok(())
}

fn import_file(file: &str) -> Result<(), FlowError> {
    let workflow = read_workflow(file)?;
    let config = Config::from_env();
    // Provider choice is irrelevant for imports; mock avoids touching env
    let orchestrator = build_orchestrator(&config, Some("mock"))?;
    let stored = orchestrator.import_workflow(workflow)?;
    println!(
        "{} Imported '{}' as workflow {}",
        "✓".green(),
        stored.name,
        stored.id.to_string().bold()
    );
    Ok(())
}

fn list_workflows() -> Result<(), FlowError> {
    let config = Config::from_env();
    let orchestrator = build_orchestrator(&config, Some("mock"))?;
    let workflows = orchestrator.workflows().list();

    if workflows.is_empty() {
        println!("No workflows stored. Add one with `flowlab import <file>`.");
        return Ok(());
    }

    for workflow in workflows {
        println!(
            "  {} {} ({} nodes, {} edges)",
            workflow.id.to_string().bold(),
            workflow.name,
            workflow.nodes.len(),
            workflow.edges.len()
        );
    }
    Ok(())
}

fn list_runs(workflow: Option<u64>) -> Result<(), FlowError> {
    let config = Config::from_env();
    let orchestrator = build_orchestrator(&config, Some("mock"))?;
    let runs = match workflow {
        Some(id) => orchestrator.runs().list_by_workflow(id),
        None => orchestrator.runs().list(),
    };

    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    for run in runs {
        let status = match run.status {
            RunStatus::Completed => "completed".green(),
            RunStatus::Failed => "failed".red(),
            RunStatus::Running => "running".yellow(),
        };
        println!(
            "  {} {} [{}] {} steps, {} ms",
            run.id.to_string().bold(),
            run.workflow_name,
            status,
            run.steps.len(),
            run.total_latency_ms
        );
    }
    Ok(())
}

async fn list_models() -> Result<(), FlowError> {
    let config = Config::from_env();
    let provider = OpenAiProvider::new(&config);
    let models = provider
        .list_models()
        .await
        .map_err(|e| FlowError::Provider(e.to_string()))?;

    if models.is_empty() {
        println!("No models reported by {}", config.base_url);
        return Ok(());
    }

    for model in models {
        println!("  {}", model);
    }
    Ok(())
}
