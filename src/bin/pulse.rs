//! Pulse CLI - Command-line interface for Synheart Pulse
//!
//! Commands:
//! - analyze: Run the HRV pipeline over telemetry batches
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use synheart_pulse::adapter::parse_batch;
use synheart_pulse::encoder::{PulseEncoder, PULSE_SCHEMA_VERSION};
use synheart_pulse::pipeline::{analyze, analyze_batch, DEFAULT_SAMPLING_RATE_HZ};
use synheart_pulse::types::PulsePayload;
use synheart_pulse::{PRODUCER_NAME, PULSE_VERSION};

/// Pulse - On-device HRV analysis engine for PPG pulse waveforms
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "Synheart AI Inc")]
#[command(version = PULSE_VERSION)]
#[command(about = "Analyze PPG telemetry into HRV and stress metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HRV pipeline over telemetry batches
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Device ID used when the batch envelope carries none
        #[arg(long, default_value = "unknown")]
        device_id: String,

        /// Sampling rate override in Hz (defaults to the envelope value,
        /// then 100)
        #[arg(long)]
        sampling_rate: Option<f64>,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single batch (object or array of samples)
    Json,
    /// Newline-delimited JSON (one batch per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one payload per line)
    Ndjson,
    /// JSON array of payloads
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            device_id,
            sampling_rate,
        } => cmd_analyze(
            &input,
            &output,
            input_format,
            output_format,
            &device_id,
            sampling_rate,
        ),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_analyze(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    device_id: &str,
    sampling_rate: Option<f64>,
) -> Result<(), PulseCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Split into batch documents
    let batch_docs: Vec<&str> = match input_format {
        InputFormat::Json => vec![input_data.as_str()],
        InputFormat::Ndjson => input_data
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect(),
    };

    if batch_docs.is_empty() {
        return Err(PulseCliError::NoBatches);
    }

    // Run the pipeline over each batch
    let encoder = PulseEncoder::new();
    let mut payloads: Vec<PulsePayload> = Vec::new();

    for doc in batch_docs {
        let batch = parse_batch(doc)?;

        let rate = sampling_rate
            .or(batch.sampling_rate_hz)
            .unwrap_or(DEFAULT_SAMPLING_RATE_HZ);
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PulseCliError::InvalidRate(rate));
        }

        let resolved_device = batch
            .device_id
            .clone()
            .unwrap_or_else(|| device_id.to_string());
        let observed_at = batch
            .samples
            .iter()
            .rev()
            .find_map(|s| s.recorded_at)
            .unwrap_or_else(Utc::now);

        let analysis = analyze_batch(&batch.samples, rate);
        payloads.push(encoder.encode(&analysis, &resolved_device, observed_at)?);
    }

    // Write output
    let formatted = format_output(&payloads, &output_format)?;
    if output.to_string_lossy() == "-" {
        io::stdout().write_all(formatted.as_bytes())?;
    } else {
        fs::write(output, formatted)?;
    }

    Ok(())
}

fn format_output(
    payloads: &[PulsePayload],
    format: &OutputFormat,
) -> Result<String, PulseCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for payload in payloads {
                lines.push(serde_json::to_string(payload)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}

fn cmd_doctor(json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check Pulse version
    checks.push(DoctorCheck {
        name: "pulse_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Pulse version {}", PULSE_VERSION),
    });

    // Check payload schema version
    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Payload schema: {}", PULSE_SCHEMA_VERSION),
    });

    // Self-check: the pipeline must recover a clean 80 bpm waveform
    let waveform: Vec<f64> = (0..600)
        .map(|i| {
            let t = i as f64 / 100.0;
            512.0 + 100.0 * (2.0 * std::f64::consts::PI * (80.0 / 60.0) * t).sin()
        })
        .collect();
    let analysis = analyze(&waveform, DEFAULT_SAMPLING_RATE_HZ);
    let self_check = match analysis.metrics {
        Some(metrics) if (metrics.bpm - 80.0).abs() < 5.0 => DoctorCheck {
            name: "pipeline_self_check".to_string(),
            status: CheckStatus::Ok,
            message: format!("Synthetic 80 bpm waveform analyzed at {:.1} bpm", metrics.bpm),
        },
        Some(metrics) => DoctorCheck {
            name: "pipeline_self_check".to_string(),
            status: CheckStatus::Error,
            message: format!("Synthetic 80 bpm waveform read as {:.1} bpm", metrics.bpm),
        },
        None => DoctorCheck {
            name: "pipeline_self_check".to_string(),
            status: CheckStatus::Error,
            message: "Pipeline produced no metrics for the synthetic waveform".to_string(),
        },
    };
    checks.push(self_check);

    // Check stdin is available (for piped batches)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Compute(synheart_pulse::ComputeError),
    Json(serde_json::Error),
    NoBatches,
    InvalidRate(f64),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<synheart_pulse::ComputeError> for PulseCliError {
    fn from(e: synheart_pulse::ComputeError) -> Self {
        PulseCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a telemetry batch JSON".to_string()),
            },
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoBatches => CliError {
                code: "NO_BATCHES".to_string(),
                message: "No batches found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PulseCliError::InvalidRate(rate) => CliError {
                code: "INVALID_RATE".to_string(),
                message: format!("Invalid sampling rate: {} Hz", rate),
                hint: Some("Sampling rate must be a positive number".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
