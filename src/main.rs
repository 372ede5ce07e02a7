mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedback_triage::config::TriageConfig;
use feedback_triage::dispatch::{
    dispatch_report, ensure_configured, parse_recipients, DispatchProgress, SendGridClient,
};
use feedback_triage::error::SourceError;
use feedback_triage::report::{export::priority_csv, html::render_html, render_report};
use feedback_triage::{
    analyze, format_float, load_feedback, now, parse_sentiment_filter, LoadedFeedback, TriageRun,
};

#[derive(Parser)]
#[command(name = "feedback-triage", about = "Customer feedback prioritizer")]
struct Cli {
    /// Path to the TOML config (defaults to $TRIAGE_CONFIG_PATH or config/triage.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Rank feedback categories and print recommendations
    Report(ReportArgs),
    /// Rank feedback and e-mail the report
    Send(SendArgs),
    /// Serve reports over HTTP
    Serve(ServeArgs),
    /// Write the default config file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct PipelineArgs {
    /// Feedback CSV with Category, Sentiment and Date columns
    #[arg(long)]
    source: Option<PathBuf>,
    /// Seed for synthesized sentiments and dates
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ranked categories to show (5-20)
    #[arg(long)]
    top_n: Option<usize>,
    /// Only score these sentiments, e.g. --sentiment negative,neutral
    #[arg(long, value_delimiter = ',')]
    sentiment: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct ReportArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Write the ranked table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write the rendered e-mail body as HTML
    #[arg(long)]
    html: Option<PathBuf>,
    /// Print the full run as JSON instead of text
    #[arg(long)]
    json: bool,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct SendArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Recipient addresses; newline, comma or semicolon separated
    #[arg(long)]
    to: Vec<String>,
    /// File with one recipient per line
    #[arg(long)]
    to_file: Option<PathBuf>,
    #[arg(long)]
    sender: Option<String>,
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8790)]
    port: u16,
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/triage.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Report(ReportArgs::default()));

    match command {
        Command::Report(args) => {
            let config = load_config(cli.config, &args.pipeline)?;
            run_report(args, config)
        }
        Command::Send(args) => {
            let config = load_config(cli.config, &args.pipeline)?;
            run_send(args, config).await
        }
        Command::Serve(args) => {
            let config = load_config(cli.config, &PipelineArgs::default())?;
            server::serve(args, config).await
        }
        Command::InitConfig(args) => run_init_config(args),
    }
}

fn load_config(path: Option<PathBuf>, args: &PipelineArgs) -> Result<TriageConfig, String> {
    let (mut config, _) = TriageConfig::load(path).map_err(|err| err.to_string())?;
    if let Some(source) = args.source.clone() {
        config.source.path = source;
    }
    if let Some(seed) = args.seed {
        config.synthesis.seed = Some(seed);
    }
    if let Some(top_n) = args.top_n {
        config.report.top_n = top_n;
    }
    if !args.sentiment.is_empty() {
        config.report.sentiments = parse_sentiment_filter(args.sentiment.iter().map(String::as_str))?;
    }
    Ok(config)
}

fn load_or_explain(config: &TriageConfig, details: bool) -> Option<(LoadedFeedback, TriageRun)> {
    let now = now();
    let loaded = load_feedback(config, now);

    match &loaded.source_error {
        Some(SourceError::SourceNotFound(path)) => {
            eprintln!(
                "Warning: feedback source not found: {}. Provide a CSV with columns Category, Sentiment, Date.",
                path.display()
            );
            return None;
        }
        Some(err) => {
            eprintln!("Warning: {}", err);
            return None;
        }
        None => {}
    }

    if loaded.is_degraded() {
        eprintln!("Note: source was malformed; rows were recovered positionally.");
    }
    if details {
        println!(
            "Source: {} (parse: {}, fingerprint {})",
            config.source.path.display(),
            loaded.tier.map(|tier| tier.label()).unwrap_or("none"),
            loaded.fingerprint.as_deref().unwrap_or("-")
        );
        println!(
            "Synthesized: {} sentiments, {} dates; dropped {} rows without a category",
            loaded.synthesis.sentiments, loaded.synthesis.dates, loaded.synthesis.dropped_rows
        );
    }

    if loaded.records.is_empty() {
        eprintln!(
            "Warning: {} contains no usable feedback rows.",
            config.source.path.display()
        );
        return None;
    }

    let run = analyze(&loaded.records, config, now);
    Some((loaded, run))
}

fn run_report(args: ReportArgs, config: TriageConfig) -> Result<(), String> {
    let (_, run) = match load_or_explain(&config, args.details && !args.json) {
        Some(result) => result,
        None => return Ok(()),
    };
    let table_len = config.report.table_len().min(run.priorities.len());

    if let Some(path) = args.csv.as_ref() {
        let payload = priority_csv(&run.priorities[..table_len])
            .map_err(|err| format!("failed to export CSV: {}", err))?;
        write_file(path, &payload)?;
    }
    if let Some(path) = args.html.as_ref() {
        write_file(path, render_html(&run).as_bytes())?;
    }

    if args.json {
        let payload = serde_json::to_string_pretty(&run)
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    print_run(&run, table_len);
    Ok(())
}

fn print_run(run: &TriageRun, table_len: usize) {
    println!(
        "Total feedback: {} | Critical issues: {} | Categories: {} | Avg priority score: {}",
        run.total_feedback,
        run.critical_count(),
        run.priorities.len(),
        format_float(run.average_priority(), 1)
    );

    println!(
        "\n{:>3}  {:<28} {:>9} {:>9} {:>9} {:>9}  {}",
        "#", "Category", "Mentions", "Negative", "Neg %", "Score", "Urgency"
    );
    for (idx, row) in run.priorities.iter().take(table_len).enumerate() {
        println!(
            "{:>3}  {:<28} {:>9} {:>9} {:>9} {:>9}  {}",
            idx + 1,
            row.category,
            row.frequency,
            row.negative_count,
            format_float(row.sentiment_score, 1),
            format_float(row.priority_score, 1),
            row.urgency.label()
        );
    }

    println!("\n{}", run.insights.executive_summary);

    if !run.insights.action_items.is_empty() {
        println!("\nRecommended actions:");
        for (idx, action) in run.insights.action_items.iter().enumerate() {
            println!("{}. [{}] {}", idx + 1, action.priority.label(), action.issue);
            println!("   Recommendation: {}", action.recommendation);
            println!("   Impact: {}", action.estimated_impact);
        }
    }
}

async fn run_send(args: SendArgs, mut config: TriageConfig) -> Result<(), String> {
    if let Some(sender) = args.sender.clone() {
        config.dispatch.sender = Some(sender);
    }

    let mut recipient_text = args.to.join("\n");
    if let Some(path) = args.to_file.as_ref() {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read recipients: {}", err))?;
        recipient_text.push('\n');
        recipient_text.push_str(&contents);
    }
    let recipients = parse_recipients(&recipient_text);

    ensure_configured(
        config.dispatch.sender.as_deref(),
        args.api_key.as_deref(),
        &recipients,
    )
    .map_err(|err| err.to_string())?;
    let client =
        SendGridClient::from_config(&config.dispatch, args.api_key.clone()).map_err(|err| err.to_string())?;

    let (_, run) = match load_or_explain(&config, false) {
        Some(result) => result,
        None => return Ok(()),
    };
    let report = render_report(&run).map_err(|err| format!("failed to render report: {}", err))?;

    let outcome = dispatch_report(&client, &report, &recipients, |progress| {
        if let DispatchProgress::Sending {
            recipient,
            index,
            total,
        } = progress
        {
            println!("[{}/{}] Sending to {}...", index + 1, total, recipient);
        }
    })
    .await
    .map_err(|err| err.to_string())?;

    if outcome.all_delivered() {
        println!(
            "Successfully sent report to {} recipient(s) from {}.",
            outcome.success_count,
            client.sender()
        );
    } else if !outcome.none_delivered() {
        println!(
            "Sent to {}/{} recipients.",
            outcome.success_count, outcome.attempted
        );
    } else {
        println!("Failed to send emails. Check the SendGrid API key and sender address.");
    }
    for failure in &outcome.failures {
        eprintln!("  {}", failure);
    }

    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        ));
    }
    TriageConfig::default()
        .write(&args.path)
        .map_err(|err| err.to_string())?;
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn write_file(path: &Path, payload: &[u8]) -> Result<(), String> {
    std::fs::write(path, payload).map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feedback_triage=info,warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
