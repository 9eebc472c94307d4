mod echo;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use aeo_audit_core::{
    AnalysisRecord, AuditConfig, AuditReport, Auditor, CitationChecker, JsonConfig, MarkdownConfig,
    RecommendationInput, Recommender, TextConfig, convert_to_json, convert_to_markdown, convert_to_text,
};
use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

use echo::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Invalid format: {}. Valid options: text, json, markdown", s)),
        }
    }
}

/// Audit how ready a web page is to be cited by AI answer engines
#[derive(Parser, Debug)]
#[command(name = "aeo-audit")]
#[command(version = VERSION)]
#[command(about = "Audit how ready a web page is to be cited by AI answer engines", long_about = None)]
struct Args {
    /// URL to audit, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report format (text, json, markdown)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Page URL to record when reading a file or stdin
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Words in the leading content window
    #[arg(long, default_value = "500", value_name = "WORDS")]
    window: usize,

    /// OpenAI API key for query generation and recommendations
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, value_name = "KEY")]
    openai_key: Option<String>,

    /// Perplexity API key for citation checks
    #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true, value_name = "KEY")]
    perplexity_key: Option<String>,

    /// Check whether answer engines cite the page for the generated queries
    #[arg(long)]
    check_citations: bool,

    /// Ask for improvement recommendations
    #[arg(long)]
    recommend: bool,

    /// Include the leading content window in the report
    #[arg(long)]
    preview: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where the markup comes from.
enum Input {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl Input {
    fn classify(input: &str) -> Self {
        if input == "-" {
            return Input::Stdin;
        }
        let is_web_url = Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !is_web_url && Path::new(input).is_file() {
            Input::File(PathBuf::from(input))
        } else {
            Input::Url(input.to_string())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("aeo_audit_core=debug"),
        Err(_) => return,
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn render(report: &AuditReport, args: &Args) -> anyhow::Result<String> {
    let output = match args.format {
        OutputFormat::Text => convert_to_text(report, &TextConfig { include_preview: args.preview }),
        OutputFormat::Json => {
            let mut json = convert_to_json(report, &JsonConfig { pretty: true }).context("Failed to render JSON")?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => convert_to_markdown(report, &MarkdownConfig { include_preview: args.preview }),
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let total_steps = 2 + usize::from(args.check_citations) + usize::from(args.recommend);
    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::new();

    let mut builder = AuditConfig::builder().window_words(args.window).fetch_timeout(args.timeout);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.as_str());
    }
    let auditor = Auditor::with_config(builder.build()).with_openai_key(args.openai_key.as_deref());

    if args.verbose && args.openai_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        print_warning("No OpenAI key, using rule-based queries");
    }

    let step = Instant::now();
    let record = match Input::classify(&args.input) {
        Input::Stdin => {
            if args.verbose {
                print_step(1, total_steps, "Reading from stdin");
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
            if args.verbose {
                eprintln!("  {} {}\n", "Size:".dimmed(), format_size(buffer.len()).bright_white());
            }
            auditor.analyze_html(args.url.as_deref().unwrap_or("stdin"), &buffer).await
        }
        Input::File(path) => {
            if args.verbose {
                print_step(1, total_steps, &format!("Reading from file {}", path.display().bright_white()));
            }
            let html =
                fs::read_to_string(&path).with_context(|| format!("Failed to read file: {}", path.display()))?;
            if args.verbose {
                eprintln!("  {} {}\n", "Size:".dimmed(), format_size(html.len()).bright_white());
            }
            let source = args.url.clone().unwrap_or_else(|| path.display().to_string());
            auditor.analyze_html(&source, &html).await
        }
        Input::Url(url) => {
            if args.verbose {
                print_step(1, total_steps, &format!("Fetching and analyzing {}", url.bright_white().underline()));
            }
            auditor.analyze(&url).await
        }
    };
    timings.push(("Analysis".to_string(), step.elapsed()));

    let analysis = match &record {
        AnalysisRecord::Success(analysis) => analysis,
        AnalysisRecord::Failure { error_message, .. } => {
            let report = AuditReport::new(record.clone());
            if args.format == OutputFormat::Json {
                print!("{}", render(&report, &args)?);
                io::stdout().flush().context("Failed to flush stdout")?;
            }
            print_error(error_message);
            std::process::exit(1);
        }
    };

    if args.verbose {
        print_analysis_details(analysis);
    }

    let mut current_step = 1;

    let citations = if args.check_citations {
        current_step += 1;
        if args.verbose {
            print_step(current_step, total_steps, "Checking citations");
        }
        let step = Instant::now();
        let outcome = match CitationChecker::new(args.perplexity_key.as_deref().unwrap_or_default()) {
            Ok(checker) => Ok(checker.check_all(&analysis.generated_queries, &analysis.source_url).await),
            Err(err) => {
                print_warning(&format!("Citations not checked: {}", err));
                Err(err)
            }
        };
        timings.push(("Citations".to_string(), step.elapsed()));
        Some(outcome)
    } else {
        None
    };

    let recommendations = if args.recommend {
        current_step += 1;
        if args.verbose {
            print_step(current_step, total_steps, "Generating recommendations");
        }
        let step = Instant::now();
        let checked = citations.as_ref().and_then(|outcome| outcome.as_deref().ok());
        let input = RecommendationInput::from_analysis(analysis, checked);
        let outcome = Recommender::new(args.openai_key.clone()).recommend(&input).await;
        if let Err(err) = &outcome {
            print_warning(&format!("Recommendations unavailable: {}", err));
        }
        timings.push(("Recommendations".to_string(), step.elapsed()));
        Some(outcome)
    } else {
        None
    };

    let mut report = AuditReport::new(record);
    report = match citations {
        Some(Ok(results)) => report.with_citations(results),
        Some(Err(err)) => report.with_citations_error(&err),
        None => report,
    };
    report = match recommendations {
        Some(Ok(recommendations)) => report.with_recommendations(recommendations),
        Some(Err(err)) => report.with_recommendations_error(&err),
        None => report,
    };

    let output = render(&report, &args)?;

    if args.verbose {
        print_step(total_steps, total_steps, "Writing report");
        eprintln!("  {} {}\n", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
        print_timing_summary(started.elapsed(), &timings);
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Report written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
