//! passiondsa-cli — terminal presenter.
//!
//! Picks an interest and a concept, asks the API for an explanation and
//! prints it. If the API cannot be reached the local explanation is shown
//! with a notice. For Stack and Queue, `--visualize N` pushes N demo items
//! and pops one to show the ordering.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use passiondsa::error::AppError;
use passiondsa::explain::{Concept, Interest};
use passiondsa::logger;
use passiondsa::presenter::render::render;
use passiondsa::presenter::selection::Selection;
use passiondsa::presenter::visualizer::{VisualKind, Visualizer};
use passiondsa::presenter::{DEFAULT_API_URL, ExplainClient, Presenter};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    let args = parse_cli_args()?;
    logger::init(args.log_level.unwrap_or("error"), args.log_level.is_some())?;

    let mut selection = Selection::default();
    selection.pick_interest(args.interest);
    selection
        .pick_concept(args.concept)
        .map_err(|e| AppError::Config(e.to_string()))?;
    let Some((interest, concept)) = selection.request() else {
        return Err(AppError::Config("interest and concept are both required".into()));
    };

    let client = ExplainClient::new(&args.api_url, Some(Duration::from_secs(args.timeout_secs)))
        .map_err(|e| AppError::Config(e.to_string()))?;
    debug!(endpoint = %client.endpoint(), "presenter ready");
    let presenter = Presenter::new(client);

    // Cancelled on Ctrl-C; the pending request is abandoned.
    let cancel = CancellationToken::new();
    let ctrlc_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc_token.cancel();
        }
    });

    println!("Generating a personalized explanation…");
    let Some(presentation) = presenter.present(interest, concept, &cancel).await else {
        eprintln!("cancelled");
        return Ok(());
    };
    println!();
    print!("{}", render(&presentation));

    match VisualKind::for_concept(concept) {
        Some(kind) if args.visualize > 0 => {
            let mut v = Visualizer::new(kind, Some(interest));
            println!();
            for _ in 0..args.visualize {
                let label = v.push().to_string();
                println!("{:<8} {label:<10} {}", kind.push_label(), v.render());
            }
            if let Some(label) = v.pop() {
                println!("{:<8} {label:<10} {}", kind.pop_label(), v.render());
            }
            println!("{}", kind.hint());
        }
        Some(_) => {}
        None if args.visualize > 0 => println!("\nVisual coming soon for {concept}."),
        None => {}
    }

    Ok(())
}

struct CliArgs {
    interest: Interest,
    concept: Concept,
    api_url: String,
    timeout_secs: u64,
    visualize: usize,
    log_level: Option<&'static str>,
}

fn usage() {
    println!("Usage: passiondsa-cli [OPTIONS] <INTEREST> <CONCEPT>");
    println!();
    println!("Interests: Dance, Poetry, Cooking, Sports, Gaming, Music");
    println!("Concepts:  Stack, Queue, \"Hash Map\", \"Binary Search\", Recursion, Graph");
    println!();
    println!("Options:");
    println!("  -h, --help                 Print help");
    println!("  --api <URL>                API prefix (default: $PASSIONDSA_API_URL or {DEFAULT_API_URL})");
    println!("  --timeout <SECS>           Request timeout (default: {DEFAULT_TIMEOUT_SECS})");
    println!("  --visualize <N>            Push N demo items (Stack/Queue only)");
    println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
}

fn parse_cli_args() -> Result<CliArgs, AppError> {
    let mut verbosity = 0u8;
    let mut api_url = std::env::var("PASSIONDSA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let mut timeout_secs = DEFAULT_TIMEOUT_SECS;
    let mut visualize = 0usize;
    let mut positional = Vec::new();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                usage();
                std::process::exit(0);
            }
            "--api" => api_url = required_value(&mut iter, "--api")?,
            "--timeout" => {
                let raw = required_value(&mut iter, "--timeout")?;
                timeout_secs = raw
                    .parse()
                    .map_err(|e| AppError::Config(format!("invalid --timeout '{raw}': {e}")))?;
            }
            "--visualize" => {
                let raw = required_value(&mut iter, "--visualize")?;
                visualize = raw
                    .parse()
                    .map_err(|e| AppError::Config(format!("invalid --visualize '{raw}': {e}")))?;
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => positional.push(arg),
        }
    }

    let [interest, concept] = <[String; 2]>::try_from(positional).map_err(|_| {
        usage();
        AppError::Config("expected <INTEREST> <CONCEPT>".into())
    })?;

    Ok(CliArgs {
        interest: interest.parse().map_err(|e| AppError::Config(format!("{e}")))?,
        concept: concept.parse().map_err(|e| AppError::Config(format!("{e}")))?,
        api_url,
        timeout_secs,
        visualize,
        log_level: logger::level_for_verbosity(verbosity),
    })
}

fn required_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, AppError> {
    iter.next()
        .ok_or_else(|| AppError::Config(format!("{flag} requires a value")))
}
