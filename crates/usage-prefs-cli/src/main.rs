//! usage-prefs
//!
//! Evaluates content usage preferences from expressions, HTTP header fields
//! and `robots.txt` files against one or more usages.
//!
//! # Usage
//!
//! ```bash
//! usage-prefs --expr 'tdm=y, genai=n' --usage genai --usage search
//! usage-prefs --robots robots.txt --user-agent ExampleBot --path /a.jpg --usage ai
//! ```
//!
//! The exit status is 0 when every usage is allowed, 1 when any is denied and
//! 2 on errors.

mod config;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser as _;
use serde_json::json;
use tracing::{debug, info};
use usage_prefs::header::expression_from_field;
use usage_prefs::robots::Robots;
use usage_prefs::{
    resolve_detailed, Decision, Hierarchy, ParseSummary, Parser, PreferenceRecord, TriState,
};

use crate::config::{Config, DefaultDecision};

#[derive(clap::Parser, Debug)]
#[command(name = "usage-prefs")]
#[command(about = "Evaluate content usage preferences")]
struct Args {
    /// Preference expression, e.g. `tdm=y, genai=n` (repeatable)
    #[arg(short, long = "expr", value_name = "EXPR")]
    exprs: Vec<String>,

    /// Structured-field header value (repeatable)
    #[arg(long = "header", value_name = "FIELD")]
    headers: Vec<String>,

    /// robots.txt file to read preferences from
    #[arg(long, value_name = "FILE", requires_all = ["user_agent", "path"])]
    robots: Option<PathBuf>,

    /// Crawler user agent for robots.txt group selection
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Path whose robots.txt preferences apply
    #[arg(long, value_name = "PATH")]
    path: Option<String>,

    /// Usage label to evaluate (repeatable)
    #[arg(short, long = "usage", value_name = "LABEL", required = true)]
    usages: Vec<String>,

    /// TOML file with custom labels and defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default for labels the configuration leaves open
    #[arg(long, value_enum)]
    default: Option<DefaultDecision>,

    /// Processing budget per expression, in bytes
    #[arg(long, value_name = "N", conflicts_with = "no_budget")]
    budget: Option<usize>,

    /// Process expressions of any length
    #[arg(long)]
    no_budget: bool,

    /// Print a JSON report instead of one line per usage
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn budget(&self) -> Option<usize> {
        if self.no_budget {
            None
        } else {
            Some(self.budget.unwrap_or(usage_prefs::tokenizer::DEFAULT_BUDGET))
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        "usage_prefs=trace,usage_prefs_cli=trace"
    } else {
        "usage_prefs=warn,usage_prefs_cli=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(Decision::Allowed) => ExitCode::SUCCESS,
        Ok(Decision::Denied) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<Decision> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let hierarchy = config.hierarchy()?;
    let policy = config.policy(&hierarchy, args.default)?;

    let closures = args
        .usages
        .iter()
        .map(|usage| match hierarchy.closure_for(usage) {
            Some(closure) => Ok((usage.as_str(), closure)),
            None => bail!("unknown usage label `{usage}`"),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut record = PreferenceRecord::new(&hierarchy);
    let mut summary = ParseSummary::default();
    let admitted = collect(args, &hierarchy, &mut record, &mut summary)?;

    let resolutions: Vec<_> = closures
        .iter()
        .map(|(usage, closure)| {
            let resolution = resolve_detailed(&record, closure, &hierarchy, &policy);
            let decision = if admitted {
                resolution.decision()
            } else {
                Decision::Denied
            };
            (*usage, decision, resolution)
        })
        .collect();

    let overall = if resolutions.iter().all(|(_, d, _)| d.is_allowed()) {
        Decision::Allowed
    } else {
        Decision::Denied
    };

    if args.json {
        let usages: Vec<_> = resolutions
            .iter()
            .map(|(usage, decision, resolution)| {
                let effective: serde_json::Map<_, _> = resolution
                    .effective()
                    .iter()
                    .map(|&(id, state)| (hierarchy.name(id).to_string(), json!(state_str(state))))
                    .collect();
                let deciding: Vec<_> = resolution
                    .deciding()
                    .iter()
                    .map(|&id| hierarchy.name(id))
                    .collect();
                json!({
                    "usage": usage,
                    "decision": decision.to_string(),
                    "deciding": deciding,
                    "effective": effective,
                })
            })
            .collect();
        let report = json!({
            "decision": overall.to_string(),
            "admitted": admitted,
            "parse": {
                "applied": summary.applied,
                "unknown_label": summary.unknown_label,
                "filtered": summary.filtered,
                "invalid_value": summary.invalid_value,
                "truncated": summary.truncated,
            },
            "usages": usages,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if !admitted {
            println!("path not admitted by robots.txt");
        }
        for (usage, decision, _) in &resolutions {
            println!("{usage}: {decision}");
        }
    }

    info!(decision = %overall, "evaluated {} usage(s)", resolutions.len());
    Ok(overall)
}

/// Parses every preference source into `record`. Returns `false` if the
/// robots.txt file does not admit the path.
fn collect(
    args: &Args,
    hierarchy: &Hierarchy,
    record: &mut PreferenceRecord,
    summary: &mut ParseSummary,
) -> Result<bool> {
    let parser = Parser::new(hierarchy).with_budget(args.budget());

    for expr in &args.exprs {
        let s = parser.parse(expr, record);
        debug!(expr = expr.as_str(), applied = s.applied, "parsed expression");
        *summary += s;
    }

    for field in &args.headers {
        let expr = expression_from_field(field);
        let s = parser.parse(&expr, record);
        debug!(
            field = field.as_str(),
            expr = expr.as_str(),
            applied = s.applied,
            "parsed header field"
        );
        *summary += s;
    }

    if let Some(path) = &args.robots {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let robots = Robots::parse(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?;
        let user_agent = args.user_agent.as_deref().unwrap_or("*");
        let url_path = args.path.as_deref().unwrap_or("/");
        match robots.preferences_with(&parser, user_agent, url_path) {
            Some((found, s)) => {
                debug!(user_agent, path = url_path, applied = s.applied, "read robots.txt");
                *summary += s;
                record.merge(&found);
            }
            None => {
                info!(user_agent, path = url_path, "crawling not admitted");
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn state_str(state: TriState) -> &'static str {
    match state {
        TriState::Yes => "y",
        TriState::No => "n",
        TriState::Unknown => "unknown",
    }
}
