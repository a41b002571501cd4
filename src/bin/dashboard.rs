//! Command-line dashboard for the GitHub bot backend.
//!
//! Talks to the backend through the edge router (or directly) using the same
//! typed client and query cache as any other consumer.
//!
//! # Usage
//!
//! ```bash
//! # Overall numbers
//! cargo run --bin dashboard -- stats
//!
//! # Follow a research run until it finishes
//! cargo run --bin dashboard -- research watch
//!
//! # Queue a command without the confirmation prompt
//! cargo run --bin dashboard -- commands execute "/colby help" octo/hello --yes
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_API_URL`: API base URL (default `http://127.0.0.1:8787/api`)
//! - `RUST_LOG`: log filter for diagnostics on stderr (default `warn`)

use dashboard_edge::client::api::DEFAULT_BASE_URL;
use dashboard_edge::client::types::{
    BestPractice, Command, Operation, PracticeDecision, PracticeStatus, Repository, ResearchState,
    ResearchStatus, RunStatus, StatsResponse,
};
use dashboard_edge::client::{
    ApiClient, ApiError, BestPracticeFilters, CommandFilters, Dashboard, ResearchFilters,
    ViewState,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

/// CLI for the GitHub bot dashboard.
#[derive(Parser)]
#[command(name = "dashboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API base URL
    #[arg(
        long,
        env = "DASHBOARD_API_URL",
        default_value = DEFAULT_BASE_URL,
        global = true
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend health
    Health,

    /// Show overall statistics
    Stats,

    /// Research runs and results
    Research {
        #[command(subcommand)]
        action: ResearchAction,
    },

    /// `/colby` commands
    Commands {
        #[command(subcommand)]
        action: CommandAction,
    },

    /// Best-practice review
    Practices {
        #[command(subcommand)]
        action: PracticeAction,
    },

    /// Long-running operations
    Operations {
        #[command(subcommand)]
        action: OperationAction,
    },

    /// Repository details
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
}

#[derive(Subcommand)]
enum ResearchAction {
    /// Show the current research status
    Status,

    /// List research results
    Results {
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long)]
        max_score: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        technology: Option<String>,
        #[command(flatten)]
        page: Page,
    },

    /// Start a research run
    Start,

    /// Stop the running research
    Stop {
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Follow research progress until it finishes
    Watch,
}

#[derive(Subcommand)]
enum CommandAction {
    /// List commands
    List {
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: Page,
    },

    /// Show one command
    Show { id: String },

    /// Queue a command against a repository
    Execute {
        /// Command text, e.g. "/colby help"
        command: String,
        /// Repository full name, e.g. "octo/hello"
        repository: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PracticeAction {
    /// List best practices
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        technology: Option<String>,
        #[command(flatten)]
        page: Page,
    },

    /// Show one best practice
    Show { id: String },

    /// Approve a best practice
    Approve { id: String },

    /// Reject a best practice
    Reject {
        id: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum OperationAction {
    /// List operations
    List,

    /// Show one operation
    Show { id: String },

    /// Cancel an operation
    Cancel {
        id: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Follow operations until interrupted
    Watch,
}

#[derive(Subcommand)]
enum RepoAction {
    /// Show a repository
    Show { id: String },

    /// Show the analysis of a repository
    Analysis { id: String },
}

/// Paging flags shared by the list commands.
#[derive(Args)]
struct Page {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    offset: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api = ApiClient::new(&cli.api_url).context("Invalid --api-url")?;
    let dashboard = Dashboard::new(api);
    let mut view = ViewState::new();

    view.set_loading(true);
    let result = match cli.command {
        Commands::Health => handle_health(&dashboard).await,
        Commands::Stats => handle_stats(&dashboard, &mut view).await,
        Commands::Research { action } => handle_research(action, &dashboard, &mut view).await,
        Commands::Commands { action } => handle_commands(action, &dashboard).await,
        Commands::Practices { action } => handle_practices(action, &dashboard).await,
        Commands::Operations { action } => handle_operations(action, &dashboard).await,
        Commands::Repo { action } => handle_repo(action, &dashboard).await,
    };
    view.set_loading(false);

    if let Err(e) = &result
        && let Some(api_error) = e.downcast_ref::<ApiError>()
    {
        view.record_error(api_error);
        if let Some(message) = &view.error {
            eprintln!("{} {}", "❌".red(), message.red().bold());
        }
        if api_error.status != 0 {
            eprintln!("   HTTP status {}", api_error.status.to_string().bright_black());
        }
        std::process::exit(1);
    }

    result
}

/// Asks before a destructive action unless `--yes` was passed.
fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
    }
    Ok(confirmed)
}

fn blank(value: Option<&str>) -> ColoredString {
    value.unwrap_or("-").bright_black()
}

fn run_status(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Pending => "PENDING".yellow(),
        RunStatus::Running => "RUNNING".bright_cyan(),
        RunStatus::Completed => "COMPLETED".green(),
        RunStatus::Failed => "FAILED".red(),
        RunStatus::Unknown => "UNKNOWN".bright_black(),
    }
}

fn practice_status(status: PracticeStatus) -> ColoredString {
    match status {
        PracticeStatus::Pending => "PENDING".yellow(),
        PracticeStatus::Approved => "APPROVED".green(),
        PracticeStatus::Rejected => "REJECTED".red(),
        PracticeStatus::Unknown => "UNKNOWN".bright_black(),
    }
}

fn research_state(state: ResearchState) -> ColoredString {
    match state {
        ResearchState::Idle => "IDLE".bright_black(),
        ResearchState::Running => "RUNNING".bright_cyan(),
        ResearchState::Completed => "COMPLETED".green(),
        ResearchState::Error => "ERROR".red(),
        ResearchState::Unknown => "UNKNOWN".bright_black(),
    }
}

fn total(count: usize, of: u64) {
    println!();
    println!(
        "  Showing {} of {}",
        count.to_string().bright_white().bold(),
        of.to_string().bright_white().bold()
    );
    println!();
}

async fn handle_health(dashboard: &Dashboard) -> Result<()> {
    let health = dashboard.health().await?;

    if health.ok {
        println!("{}", "✅ Backend is healthy".green().bold());
    } else {
        println!("{}", "⚠️  Backend reports unhealthy".yellow().bold());
    }
    println!("  API: {}", dashboard.api().base_url().as_str().cyan());

    Ok(())
}

async fn handle_stats(dashboard: &Dashboard, view: &mut ViewState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    view.set_stats(dashboard.stats().await?);
    if let Some(stats) = &view.stats {
        print_stats(stats);
    }
    if let Some(at) = view.last_updated {
        println!();
        println!(
            "  Updated: {}",
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string().bright_black()
        );
    }
    println!();

    Ok(())
}

fn print_stats(stats: &StatsResponse) {
    let rows = [
        ("Projects", stats.projects),
        ("Repositories", stats.repositories),
        ("Analyses", stats.analyses),
        ("Commands", stats.commands),
        ("Best practices", stats.practices),
        ("Operations", stats.operations),
    ];

    for (label, value) in rows {
        println!(
            "  {:<16} {}",
            format!("{label}:").bright_white(),
            value.to_string().cyan().bold()
        );
    }
}

async fn handle_research(action: ResearchAction, dashboard: &Dashboard, view: &mut ViewState) -> Result<()> {
    match action {
        ResearchAction::Status => {
            let status = dashboard.research_status().await?;
            print_research_status(&status);
            view.set_research_status(status);
        }
        ResearchAction::Results {
            min_score,
            max_score,
            category,
            technology,
            page,
        } => {
            let filters = ResearchFilters {
                min_score,
                max_score,
                category,
                technology,
                limit: page.limit,
                offset: page.offset,
            };
            list_research_results(dashboard, &filters).await?;
        }
        ResearchAction::Start => {
            let response = dashboard.start_research().await?;
            println!("{} {}", "🚀".green(), response.message.green().bold());
        }
        ResearchAction::Stop { yes } => {
            if confirm("Stop the running research?", yes)? {
                let response = dashboard.stop_research().await?;
                println!("{} {}", "⏹️".yellow(), response.message.yellow().bold());
            }
        }
        ResearchAction::Watch => watch_research(dashboard, view).await?,
    }

    Ok(())
}

fn print_research_status(status: &ResearchStatus) {
    println!("{}", "🔬 Research".bright_blue().bold());
    println!();
    println!("  Status:    {}", research_state(status.status));
    println!("  Progress:  {}", format!("{:.0}%", status.progress).cyan().bold());
    println!("  Operation: {}", status.current_operation.bright_white());
    println!("  Started:   {}", blank(status.started_at.as_deref()));
    println!("  Completed: {}", blank(status.completed_at.as_deref()));
    println!();
}

async fn list_research_results(dashboard: &Dashboard, filters: &ResearchFilters) -> Result<()> {
    println!("{}", "📚 Research Results".bright_blue().bold());
    println!();

    let results = dashboard.research_results(filters).await?;
    if results.results.is_empty() {
        println!("{}", "  No repositories found".yellow());
        return Ok(());
    }

    println!(
        "  {:<6} {:<40} {:<16} {}",
        "Score".bright_white().bold(),
        "Repository".bright_white().bold(),
        "Category".bright_white().bold(),
        "Stack".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for repo in &results.results {
        println!(
            "  {:<6} {:<40} {:<16} {}",
            format!("{:.1}", repo.score).cyan(),
            repo.full_name.bright_white(),
            repo.category.bright_black(),
            repo.technology_stack.join(", ").bright_black()
        );
    }

    total(results.results.len(), results.total_projects);
    Ok(())
}

/// Polls research status and redraws until the run ends or Ctrl+C.
async fn watch_research(dashboard: &Dashboard, view: &mut ViewState) -> Result<()> {
    let mut subscription = dashboard.watch_research_status();
    println!("{}", "👀 Watching research (Ctrl+C to stop)".bright_blue().bold());
    println!();

    loop {
        tokio::select! {
            changed = subscription.changed() => {
                if !changed {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        let snapshot = subscription.snapshot();
        if let Some(error) = &snapshot.error {
            view.record_error(error);
            println!("  {} {}", "⚠️".yellow(), error.message.yellow());
            continue;
        }
        view.clear_error();

        if let Some(status) = snapshot.data {
            println!(
                "  [{}] {} {:>4} {}",
                snapshot
                    .updated_at
                    .map(|at| at.format("%H:%M:%S").to_string())
                    .unwrap_or_default()
                    .bright_black(),
                research_state(status.status),
                format!("{:.0}%", status.progress).cyan(),
                status.current_operation.bright_white()
            );

            let finished = matches!(status.status, ResearchState::Completed | ResearchState::Error);
            view.set_research_status(status);
            if finished {
                break;
            }
        }
    }

    println!();
    Ok(())
}

async fn handle_commands(action: CommandAction, dashboard: &Dashboard) -> Result<()> {
    match action {
        CommandAction::List {
            repo,
            author,
            status,
            page,
        } => {
            let filters = CommandFilters {
                repo,
                author,
                status,
                limit: page.limit,
                offset: page.offset,
            };
            list_commands(dashboard, &filters).await?;
        }
        CommandAction::Show { id } => {
            let command = dashboard.command(&id).await?.context("Command id must not be empty")?;
            print_command(&command);
        }
        CommandAction::Execute {
            command,
            repository,
            yes,
        } => {
            println!("  Command:    {}", command.cyan());
            println!("  Repository: {}", repository.cyan());
            println!();

            if confirm("Execute this command?", yes)? {
                let response = dashboard.execute_command(&command, &repository).await?;
                println!("{}", "✅ Command queued".green().bold());
                println!("  {}", response.message);
                println!("  ID: {}", response.command_id.bright_yellow());
            }
        }
    }

    Ok(())
}

async fn list_commands(dashboard: &Dashboard, filters: &CommandFilters) -> Result<()> {
    println!("{}", "⚙️  Commands".bright_blue().bold());
    println!();

    let response = dashboard.commands(filters).await?;
    if response.commands.is_empty() {
        println!("{}", "  No commands found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<28} {:<16} {:<10} {}",
        "ID".bright_white().bold(),
        "Repository".bright_white().bold(),
        "Author".bright_white().bold(),
        "Status".bright_white().bold(),
        "Command".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for command in &response.commands {
        println!(
            "  {:<12} {:<28} {:<16} {:<10} {}",
            command.id.bright_black(),
            command.repository.cyan(),
            command.author,
            run_status(command.status),
            command.command
        );
    }

    total(response.commands.len(), response.total);
    Ok(())
}

fn print_command(command: &Command) {
    println!("{}", "⚙️  Command".bright_blue().bold());
    println!();
    println!("  ID:         {}", command.id.bright_black());
    println!("  Command:    {}", command.command.cyan());
    println!("  Repository: {}", command.repository.cyan());
    println!("  Author:     {}", command.author);
    println!("  Status:     {}", run_status(command.status));
    println!("  Created:    {}", command.created_at.bright_black());
    println!("  Started:    {}", blank(command.started_at.as_deref()));
    println!("  Completed:  {}", blank(command.completed_at.as_deref()));
    if let Some(seconds) = command.execution_time {
        println!("  Took:       {}", format!("{seconds:.2}s").bright_black());
    }
    if let Some(result) = &command.result {
        println!();
        println!("{}", "Result:".bright_white().bold());
        println!("{result}");
    }
    if let Some(error) = &command.error {
        println!();
        println!("{} {}", "Error:".red().bold(), error.red());
    }
    println!();
}

async fn handle_practices(action: PracticeAction, dashboard: &Dashboard) -> Result<()> {
    match action {
        PracticeAction::List {
            category,
            status,
            technology,
            page,
        } => {
            let filters = BestPracticeFilters {
                category,
                status,
                technology,
                limit: page.limit,
                offset: page.offset,
            };
            list_practices(dashboard, &filters).await?;
        }
        PracticeAction::Show { id } => {
            let practice = dashboard
                .best_practice(&id)
                .await?
                .context("Best practice id must not be empty")?;
            print_practice(&practice);
        }
        PracticeAction::Approve { id } => {
            let response = dashboard
                .update_best_practice_status(&id, PracticeDecision::Approved)
                .await?;
            println!("{} {}", "✅".green(), response.message.green().bold());
        }
        PracticeAction::Reject { id, yes } => {
            if confirm(&format!("Reject best practice {id}?"), yes)? {
                let response = dashboard
                    .update_best_practice_status(&id, PracticeDecision::Rejected)
                    .await?;
                println!("{} {}", "🚫".red(), response.message.red().bold());
            }
        }
    }

    Ok(())
}

async fn list_practices(dashboard: &Dashboard, filters: &BestPracticeFilters) -> Result<()> {
    println!("{}", "📋 Best Practices".bright_blue().bold());
    println!();

    let response = dashboard.best_practices(filters).await?;
    if response.practices.is_empty() {
        println!("{}", "  No best practices found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<10} {:<16} {:<16} {}",
        "ID".bright_white().bold(),
        "Status".bright_white().bold(),
        "Category".bright_white().bold(),
        "Technology".bright_white().bold(),
        "Title".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for practice in &response.practices {
        println!(
            "  {:<12} {:<10} {:<16} {:<16} {}",
            practice.id.bright_black(),
            practice_status(practice.status),
            practice.category.cyan(),
            practice.technology.cyan(),
            practice.title
        );
    }

    total(response.practices.len(), response.total);
    Ok(())
}

fn print_practice(practice: &BestPractice) {
    println!("{}", practice.title.bright_blue().bold());
    println!();
    println!("  ID:         {}", practice.id.bright_black());
    println!("  Status:     {}", practice_status(practice.status));
    println!("  Category:   {}", practice.category.cyan());
    println!("  Technology: {}", practice.technology.cyan());
    if !practice.tags.is_empty() {
        println!("  Tags:       {}", practice.tags.join(", ").bright_black());
    }
    println!();
    println!("{}", practice.description);

    if let Some(guide) = &practice.implementation_guide {
        println!();
        println!("{}", "Implementation guide:".bright_white().bold());
        println!("{guide}");
    }
    if let Some(examples) = &practice.examples {
        println!();
        println!("{}", "Examples:".bright_white().bold());
        for example in examples {
            println!("  - {example}");
        }
    }
    println!();
}

async fn handle_operations(action: OperationAction, dashboard: &Dashboard) -> Result<()> {
    match action {
        OperationAction::List => {
            println!("{}", "🔄 Operations".bright_blue().bold());
            println!();
            let response = dashboard.operations().await?;
            print_operations(&response.operations);
            total(response.operations.len(), response.total);
        }
        OperationAction::Show { id } => {
            let operation = dashboard
                .operation(&id)
                .await?
                .context("Operation id must not be empty")?;
            print_operation(&operation);
        }
        OperationAction::Cancel { id, yes } => {
            if confirm(&format!("Cancel operation {id}?"), yes)? {
                let response = dashboard.cancel_operation(&id).await?;
                println!("{} {}", "⏹️".yellow(), response.message.yellow().bold());
            }
        }
        OperationAction::Watch => {
            let mut subscription = dashboard.watch_operations();
            println!("{}", "👀 Watching operations (Ctrl+C to stop)".bright_blue().bold());

            loop {
                tokio::select! {
                    changed = subscription.changed() => {
                        if !changed {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }

                let snapshot = subscription.snapshot();
                println!();
                match (&snapshot.data, &snapshot.error) {
                    (_, Some(error)) => println!("  {} {}", "⚠️".yellow(), error.message.yellow()),
                    (Some(response), None) => {
                        print_operations(&response.operations);
                        let active = response
                            .operations
                            .iter()
                            .filter(|operation| !operation.status.is_finished())
                            .count();
                        println!("  {} active", active.to_string().cyan().bold());
                    }
                    (None, None) => {}
                }
            }
        }
    }

    Ok(())
}

fn print_operations(operations: &[Operation]) {
    if operations.is_empty() {
        println!("{}", "  No operations found".yellow());
        return;
    }

    println!(
        "  {:<14} {:<10} {:<10} {:>8} {}",
        "ID".bright_white().bold(),
        "Type".bright_white().bold(),
        "Status".bright_white().bold(),
        "Progress".bright_white().bold(),
        "Started".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for operation in operations {
        println!(
            "  {:<14} {:<10} {:<10} {:>8} {}",
            operation.id.bright_black(),
            format!("{:?}", operation.kind).to_lowercase(),
            run_status(operation.status),
            format!("{:.0}%", operation.progress).cyan(),
            operation.started_at.bright_black()
        );
    }
}

fn print_operation(operation: &Operation) {
    println!("{}", "🔄 Operation".bright_blue().bold());
    println!();
    println!("  ID:        {}", operation.id.bright_black());
    println!("  Type:      {}", format!("{:?}", operation.kind).to_lowercase());
    println!("  Status:    {}", run_status(operation.status));
    println!("  Progress:  {}", format!("{:.0}%", operation.progress).cyan().bold());
    println!("  Started:   {}", operation.started_at.bright_black());
    println!("  Completed: {}", blank(operation.completed_at.as_deref()));
    if let Some(error) = &operation.error {
        println!("  {} {}", "Error:".red().bold(), error.red());
    }
    if let Some(metadata) = &operation.metadata {
        println!();
        println!("{}", "Metadata:".bright_white().bold());
        for (key, value) in metadata {
            println!("  {}: {}", key.bright_white(), value);
        }
    }
    println!();
}

async fn handle_repo(action: RepoAction, dashboard: &Dashboard) -> Result<()> {
    match action {
        RepoAction::Show { id } => {
            let repo = dashboard
                .repository(&id)
                .await?
                .context("Repository id must not be empty")?;
            print_repository(&repo);
        }
        RepoAction::Analysis { id } => {
            let analysis = dashboard
                .repository_analysis(&id)
                .await?
                .context("Repository id must not be empty")?;
            println!("{}", "🧠 Analysis".bright_blue().bold());
            println!();
            println!("{}", analysis.analysis);
            if !analysis.details.is_null() {
                println!();
                println!("{}", "Details:".bright_white().bold());
                println!("{}", serde_json::to_string_pretty(&analysis.details)?);
            }
            println!();
        }
    }

    Ok(())
}

fn print_repository(repo: &Repository) {
    println!("{}", repo.full_name.bright_blue().bold());
    println!();
    if let Some(description) = &repo.description {
        println!("  {description}");
        println!();
    }
    println!("  URL:      {}", repo.html_url.cyan());
    println!("  Score:    {}", format!("{:.1}", repo.score).cyan().bold());
    println!("  Category: {}", repo.category);
    println!("  Stack:    {}", repo.technology_stack.join(", ").bright_black());
    println!("  Analyzed: {}", repo.last_analyzed.bright_black());
    if let Some(summary) = &repo.ai_summary {
        println!();
        println!("{}", "Summary:".bright_white().bold());
        println!("{summary}");
    }
    println!();
}
