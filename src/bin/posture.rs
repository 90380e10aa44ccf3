//! Posture CLI - Command-line interface for the posture engine
//!
//! Commands:
//! - score: Score detection records (stateless)
//! - fold: Score detection records and fold them into one user's aggregate
//! - profile: Level, progress and percentile rank for an aggregate
//! - leaderboard: Rank a list of users
//! - validate: Validate detection records
//! - doctor: Diagnose configuration and state files
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use posture_engine::config::EngineConfig;
use posture_engine::encoder::ReportEncoder;
use posture_engine::pipeline::PostureProcessor;
use posture_engine::ranking::{build_leaderboard, LeaderboardSort};
use posture_engine::schema::{DetectionAdapter, DetectionRecord, SCHEMA_VERSION};
use posture_engine::scoring::SessionScorer;
use posture_engine::types::{LeaderboardMember, UserAggregate};
use posture_engine::{EngineError, ENGINE_VERSION, PRODUCER_NAME};

/// Posture - scoring and leveling for posture detection sessions
#[derive(Parser)]
#[command(name = "posture")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score posture detection sessions and compute levels", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score detection records without any user state
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Score detection records in order and fold them into one user's aggregate
    Fold {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Load the starting aggregate from file
        #[arg(long)]
        load_aggregate: Option<PathBuf>,

        /// Save the final aggregate to file
        #[arg(long)]
        save_aggregate: Option<PathBuf>,
    },

    /// Compute level, progress and percentile rank for an aggregate
    Profile {
        /// Aggregate file (JSON)
        #[arg(short, long)]
        aggregate: PathBuf,

        /// Population all-time scores (JSON array of numbers)
        #[arg(short, long)]
        population: Option<PathBuf>,
    },

    /// Rank a list of users by level or by score
    Leaderboard {
        /// Members file (JSON array, use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Sort key
        #[arg(long, value_enum, default_value = "level")]
        sort: SortKey,
    },

    /// Validate detection records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and state files
    Doctor {
        /// Check an aggregate file
        #[arg(long)]
        aggregate: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    /// Level, then progress within the level
    Level,
    /// All-time score
    Score,
}

impl From<SortKey> for LeaderboardSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Level => LeaderboardSort::Level,
            SortKey::Score => LeaderboardSort::Score,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (posture.detection.v1)
    Input,
    /// Output report schema
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose { "debug" } else { "info" })
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PostureCliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
        } => cmd_score(&input, &output, input_format, output_format),

        Commands::Fold {
            input,
            output,
            input_format,
            output_format,
            load_aggregate,
            save_aggregate,
        } => cmd_fold(
            &load_config(config_path)?,
            &input,
            &output,
            input_format,
            output_format,
            load_aggregate.as_deref(),
            save_aggregate.as_deref(),
        ),

        Commands::Profile {
            aggregate,
            population,
        } => cmd_profile(&load_config(config_path)?, &aggregate, population.as_deref()),

        Commands::Leaderboard { input, sort } => {
            cmd_leaderboard(&load_config(config_path)?, &input, sort.into())
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { aggregate, json } => cmd_doctor(config_path, aggregate.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), PostureCliError> {
    let records = read_records(input, &input_format)?;
    let encoder = ReportEncoder::new();

    let mut reports = Vec::with_capacity(records.len());
    for record in &records {
        let session = DetectionAdapter::to_session(record)?;
        let scored = SessionScorer::score(session);
        reports.push(encoder.encode_detection(record.detection_id, &scored, None));
    }

    tracing::info!(records = reports.len(), "scored detection records");
    write_output(output, &format_output(&reports, &output_format)?)
}

fn cmd_fold(
    config: &EngineConfig,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    load_aggregate: Option<&Path>,
    save_aggregate: Option<&Path>,
) -> Result<(), PostureCliError> {
    let records = read_records(input, &input_format)?;
    let mut processor = PostureProcessor::with_config(config);

    if let Some(path) = load_aggregate {
        let json = fs::read_to_string(path)?;
        processor.load_aggregate(&json)?;
    }

    let mut reports = Vec::with_capacity(records.len());
    for record in &records {
        reports.push(processor.process_record(record)?);
    }

    let aggregate = processor.aggregate();
    tracing::info!(
        records = reports.len(),
        all_time_score = aggregate.all_time_score,
        total_prediction_count = aggregate.total_prediction_count,
        total_detection_time = %aggregate.total_detection_time,
        "folded detection records"
    );

    if let Some(path) = save_aggregate {
        fs::write(path, processor.save_aggregate()?)?;
    }

    write_output(output, &format_output(&reports, &output_format)?)
}

fn cmd_profile(
    config: &EngineConfig,
    aggregate: &Path,
    population: Option<&Path>,
) -> Result<(), PostureCliError> {
    let mut processor = PostureProcessor::with_config(config);
    processor.load_aggregate(&fs::read_to_string(aggregate)?)?;

    let population: Vec<f64> = match population {
        Some(path) => serde_json::from_str(&read_input(path)?)?,
        None => Vec::new(),
    };

    println!("{}", processor.profile_json(&population)?);
    Ok(())
}

fn cmd_leaderboard(
    config: &EngineConfig,
    input: &Path,
    sort: LeaderboardSort,
) -> Result<(), PostureCliError> {
    let members: Vec<LeaderboardMember> = serde_json::from_str(&read_input(input)?)?;
    let entries = build_leaderboard(&members, &config.level_scale(), sort);

    let encoder = ReportEncoder::new();
    println!("{}", encoder.to_json(&encoder.encode_leaderboard(sort, entries))?);
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), PostureCliError> {
    let records = read_records(input, &input_format)?;
    let failures = DetectionAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - failures.len(),
        invalid_records: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                detection_id: f.detection_id,
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                let id = err
                    .detection_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  - Detection {} (index {}): {}", id, err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(PostureCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    config: Option<&Path>,
    aggregate: Option<&Path>,
    json: bool,
) -> Result<(), PostureCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck::ok("engine_version", format!("Engine version {ENGINE_VERSION}")),
        DoctorCheck::ok("schema_version", format!("Input schema: {SCHEMA_VERSION}")),
    ];

    checks.push(config_check(config));

    if let Some(path) = aggregate {
        let check = if !path.exists() {
            DoctorCheck::warning("aggregate", "Aggregate file does not exist".to_string())
        } else {
            match fs::read_to_string(path) {
                Ok(content) => match UserAggregate::from_json(&content) {
                    Ok(agg) => DoctorCheck::ok(
                        "aggregate",
                        format!(
                            "Aggregate valid ({} predictions, {} detected)",
                            agg.total_prediction_count, agg.total_detection_time
                        ),
                    ),
                    Err(e) => DoctorCheck::error("aggregate", format!("Invalid aggregate JSON: {e}")),
                },
                Err(e) => DoctorCheck::error("aggregate", format!("Cannot read aggregate file: {e}")),
            }
        };
        checks.push(check);
    }

    checks.push(if atty::is(atty::Stream::Stdin) {
        DoctorCheck::ok("stdin", "stdin is a TTY (interactive mode)".to_string())
    } else {
        DoctorCheck::ok("stdin", "stdin is a pipe (ready for '-i -')".to_string())
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Posture Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error)) {
        Err(PostureCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), PostureCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {SCHEMA_VERSION}");
                println!();
                println!("One detection record per monitoring session:");
                println!();
                println!("- DetectionID: optional integer, echoed in the report");
                println!("- StartTime, EndTime: RFC 3339 timestamps (no offset means UTC)");
                println!("- TotalTime: elapsed time as HH:MM:SS");
                println!("- TotalPredictions: classifications made per body part (> 0)");
                println!("- Torso: {{ BackwardCount, ForwardCount, NeutralCount, AmbiguousCount }}");
                println!("- Feet: {{ AnkleOnKneeCount, FlatCount, AmbiguousCount }}");
                println!("- Head: {{ BowedCount, NeutralCount, TiltBackCount, AmbiguousCount }}");
                println!("- Shoulder: {{ HunchedCount, NeutralCount, ShrugCount, AmbiguousCount }}");
                println!("- Neck: {{ ForwardCount, NeutralCount, AmbiguousCount }}");
                println!();
                println!("Correct categories: NeutralCount, and FlatCount for Feet.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: detection, profile and leaderboard reports");
                println!();
                println!("- report_version: Report schema version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- computed_at_utc: RFC 3339 timestamp");
                println!("- detection: the record with PartialScore per body part and Score");
                println!("- aggregate: {{ all_time_score, total_prediction_count, total_detection_time }}");
                println!("- stats: {{ level, level_progress, percentile_rank }}");
                println!("- entries: [{{ user_id, user_name, photo_url, rank, level, progress, all_time_score }}]");
            }
        }
    }

    Ok(())
}

// Helper functions

fn load_config(path: Option<&Path>) -> Result<EngineConfig, PostureCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_path(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn config_check(path: Option<&Path>) -> DoctorCheck {
    match path {
        Some(path) => match EngineConfig::from_path(path) {
            Ok(config) => DoctorCheck::ok(
                "config",
                format!("Config valid (thresholds {:?})", config.level_thresholds),
            ),
            Err(e) => DoctorCheck::error("config", format!("Invalid config: {e}")),
        },
        None => DoctorCheck::ok("config", "Using default level thresholds".to_string()),
    }
}

fn read_input(input: &Path) -> Result<String, PostureCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<DetectionRecord>, PostureCliError> {
    let data = read_input(input)?;
    let records = match format {
        InputFormat::Ndjson => DetectionAdapter::parse_ndjson(&data)?,
        InputFormat::Json => DetectionAdapter::parse_array(&data)?,
    };

    if records.is_empty() {
        return Err(PostureCliError::NoRecords);
    }
    tracing::debug!(records = records.len(), "parsed detection records");
    Ok(records)
}

fn write_output(output: &Path, data: &str) -> Result<(), PostureCliError> {
    if output.to_string_lossy() == "-" {
        print!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: Serialize>(reports: &[T], format: &OutputFormat) -> Result<String, PostureCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)? + "\n"),
    }
}

fn get_input_json_schema() -> String {
    let counts = |fields: &[&str]| {
        let properties: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|f| (f.to_string(), serde_json::json!({ "type": "integer", "minimum": 0 })))
            .collect();
        serde_json::json!({ "type": "object", "properties": properties })
    };

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Posture detection session record",
        "type": "object",
        "required": ["StartTime", "EndTime", "TotalTime", "TotalPredictions", "Torso", "Feet", "Head", "Shoulder", "Neck"],
        "properties": {
            "DetectionID": { "type": "integer" },
            "StartTime": { "type": "string", "format": "date-time" },
            "EndTime": { "type": "string", "format": "date-time" },
            "TotalTime": { "type": "string", "pattern": "^\\d{2,}:[0-5]\\d:[0-5]\\d(\\.\\d+)?$" },
            "TotalPredictions": { "type": "integer", "minimum": 1 },
            "Torso": counts(&["BackwardCount", "ForwardCount", "NeutralCount", "AmbiguousCount"]),
            "Feet": counts(&["AnkleOnKneeCount", "FlatCount", "AmbiguousCount"]),
            "Head": counts(&["BowedCount", "NeutralCount", "TiltBackCount", "AmbiguousCount"]),
            "Shoulder": counts(&["HunchedCount", "NeutralCount", "ShrugCount", "AmbiguousCount"]),
            "Neck": counts(&["ForwardCount", "NeutralCount", "AmbiguousCount"])
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "posture.report",
        "description": "Posture engine report envelope",
        "type": "object",
        "required": ["report_version", "producer", "computed_at_utc"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "detection": { "type": "object" },
            "aggregate": {
                "type": "object",
                "properties": {
                    "all_time_score": { "type": "number" },
                    "total_prediction_count": { "type": "integer" },
                    "total_detection_time": { "type": "string" }
                }
            },
            "stats": {
                "type": "object",
                "properties": {
                    "level": { "type": "integer" },
                    "level_progress": { "type": "number" },
                    "percentile_rank": { "type": "number" }
                }
            },
            "sort": { "type": "string", "enum": ["level", "score"] },
            "entries": { "type": "array", "items": { "type": "object" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum PostureCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PostureCliError {
    fn from(e: io::Error) -> Self {
        PostureCliError::Io(e)
    }
}

impl From<EngineError> for PostureCliError {
    fn from(e: EngineError) -> Self {
        PostureCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PostureCliError {
    fn from(e: serde_json::Error) -> Self {
        PostureCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PostureCliError> for CliError {
    fn from(e: PostureCliError) -> Self {
        match e {
            PostureCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PostureCliError::Engine(e) => {
                let (code, hint) = match &e {
                    EngineError::InvalidDetection(_) => {
                        ("VALIDATION_ERROR", "Run 'posture validate' for details")
                    }
                    EngineError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Thresholds must be non-empty, positive and strictly ascending")
                    }
                    EngineError::InvalidSortKey(_) => ("SORT_KEY_ERROR", "Use 'level' or 'score'"),
                    EngineError::InvalidDuration(_) => ("DURATION_ERROR", "TotalTime must be HH:MM:SS"),
                    _ => ("PARSE_ERROR", "Ensure input matches the posture.detection.v1 schema"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PostureCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PostureCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No detection records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PostureCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} records failed validation"),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PostureCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    detection_id: Option<i64>,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        }
    }

    fn warning(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message,
        }
    }

    fn error(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message,
        }
    }
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("posture-{}-{name}", std::process::id()));
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_config_check_reports_invalid_thresholds() {
        let path = write_config("bad.json", r#"{"level_thresholds": [60, 30]}"#);
        let check = config_check(Some(&path));
        fs::remove_file(&path).unwrap();

        assert!(matches!(check.status, CheckStatus::Error));
        assert!(check.message.starts_with("Invalid config"));
    }

    #[test]
    fn test_config_check_accepts_valid_or_missing_config() {
        let path = write_config("good.json", r#"{"level_thresholds": [10, 40]}"#);
        let check = config_check(Some(&path));
        fs::remove_file(&path).unwrap();
        assert!(matches!(check.status, CheckStatus::Ok));

        assert!(matches!(config_check(None).status, CheckStatus::Ok));
    }

    #[test]
    fn test_load_config_surfaces_invalid_thresholds() {
        let path = write_config("load-bad.json", r#"{"level_thresholds": []}"#);
        let result = load_config(Some(&path));
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(PostureCliError::Engine(EngineError::InvalidConfig(_)))
        ));
        assert!(load_config(None).is_ok());
    }
}
