use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use lingo_match::report::Meta;
use lingo_match::{
    aggregate_reports, compute_case_report, GradingCase, MatchConfig, Report, SharedCharRule,
    TranslationMatcher, TranslationMatcherBuilder,
};
use tracing_subscriber::EnvFilter;

#[path = "translate_report/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "translate_report/summary_report_formatter.rs"]
mod summary_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SharedCharChoice {
    Strict,
    Lenient,
}

impl SharedCharChoice {
    fn rule(self) -> SharedCharRule {
        match self {
            Self::Strict => SharedCharRule::STRICT,
            Self::Lenient => SharedCharRule::LENIENT,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "translate_report")]
#[command(about = "Grade recorded translation attempts and report matcher accuracy")]
struct Args {
    #[arg(
        long,
        env = "LINGO_REPORT_CASES_FILE",
        default_value = "test-data/translate_cases.json"
    )]
    cases_file: PathBuf,
    #[arg(long, env = "LINGO_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "LINGO_REPORT_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the shared-character rule from `--config`.
    #[arg(long, env = "LINGO_REPORT_SHARED_CHAR_RULE", value_enum)]
    shared_char_rule: Option<SharedCharChoice>,
    /// Only grade cases whose language code matches.
    #[arg(long, env = "LINGO_REPORT_LANGUAGE")]
    language: Option<String>,
    #[arg(long, env = "LINGO_REPORT_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "LINGO_REPORT_OFFSET", default_value_t = 0)]
    offset: usize,
    #[arg(
        long,
        env = "LINGO_REPORT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases_file = resolve_path(&repo_root, &args.cases_file);
    let mut cases = load_cases(&cases_file)?;

    if let Some(language) = args.language.as_deref() {
        cases.retain(|case| case.language.eq_ignore_ascii_case(language));
    }
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying filters/offset/limit.".to_string());
    }
    tracing::info!(
        cases = cases.len(),
        source = %cases_file.display(),
        "translate_report: cases selected"
    );

    let matcher = build_matcher(&repo_root, args.config.as_ref(), args.shared_char_rule)?;

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut case_reports = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        let report = compute_case_report(case, &matcher)
            .map_err(|err| format!("{}: grading failed: {err}", case.id))?;
        case_reports.push(report);
        progress.inc(1);
    }
    progress.finish_with_message("grading pass complete");

    let aggregates = aggregate_reports(&case_reports);
    let config = matcher.config();
    let report = Report {
        schema_version: lingo_match::report::REPORT_SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            shared_char_threshold: config.shared_char.threshold as f32,
            shared_char_multiplier: config.shared_char.multiplier as f32,
            match_threshold: config.match_threshold as f32,
            case_count: case_reports.len(),
        },
        cases: case_reports,
        aggregates,
    };

    match args.output_format {
        OutputFormat::Json => {
            let out_path = resolve_out_path(&repo_root, args.out.as_ref());
            json_report_formatter::write_report(&out_path, &report)?;
            tracing::info!(path = %out_path.display(), "translate_report: report written");
            println!("{}", out_path.display());
        }
        OutputFormat::Summary => {
            print!("{}", summary_report_formatter::render_summary(&report));
        }
    }
    Ok(())
}

fn build_matcher(
    repo_root: &Path,
    config_path: Option<&PathBuf>,
    shared_char_rule: Option<SharedCharChoice>,
) -> Result<TranslationMatcher, String> {
    let mut config = match config_path {
        Some(path) => {
            let path = resolve_path(repo_root, path);
            require_path_exists(&path, "Missing --config path.")?;
            MatchConfig::load(&path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?
        }
        None => MatchConfig::default(),
    };
    if let Some(choice) = shared_char_rule {
        config = config.with_shared_char_rule(choice.rule());
    }

    TranslationMatcherBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build TranslationMatcher: {err}"))
}

fn load_cases(path: &Path) -> Result<Vec<GradingCase>, String> {
    require_path_exists(path, "Missing --cases-file path.")?;
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases file '{}': {err}", path.display()))?;
    let cases: Vec<GradingCase> = serde_json::from_str(&contents)
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))?;
    if cases.is_empty() {
        return Err(format!("No cases found in '{}'.", path.display()));
    }
    Ok(cases)
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("translate_reports")
        .join(format!("translate-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
