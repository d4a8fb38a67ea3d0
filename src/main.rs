//! CWT Verdict CLI - inspect and report CWT claims validation outcomes
//!
//! Application Layer - the CLI coordinates user interactions with library services
//! - Translates user commands to loader and formatter calls
//! - Handles external concerns like file I/O, process exit codes, and terminal output

use clap::{Parser, Subcommand, ValueEnum};
use cwt_verdict::{
    decode_record, OutputFormat, VerdictConfig, VerdictError, VerdictInspector, VerdictResult,
    WireOutcome,
};
use std::path::{Path, PathBuf};
use std::process;

/// CWT Verdict - typed outcomes for CWT claims validation
#[derive(Parser)]
#[command(name = "cwt-verdict")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and report CWT claims validation outcomes")]
#[command(long_about = "CWT Verdict reads success/failure records produced by CWT claims validators, checks that each record is well formed, and reports failures grouped by the violated section.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check outcome records and report failures
    Check {
        /// Files or directories holding .json / .jsonl records
        paths: Vec<PathBuf>,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,

        /// Maximum number of failures to report
        #[arg(long)]
        max_failures: Option<usize>,

        /// Leave passing outcomes out of the output
        #[arg(long)]
        only_failures: bool,

        /// Record unreadable files as malformed instead of aborting
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Describe a single outcome record
    Explain {
        /// File holding one JSON record
        file: PathBuf,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

/// Options of the `check` command after argument parsing
struct CheckArgs {
    paths: Vec<PathBuf>,
    format: Option<OutputFormatArg>,
    max_failures: Option<usize>,
    only_failures: bool,
    continue_on_error: bool,
    use_colors: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> VerdictResult<i32> {
    match cli.command {
        Commands::Check {
            paths,
            format,
            max_failures,
            only_failures,
            continue_on_error,
        } => {
            let args = CheckArgs {
                paths,
                format,
                max_failures,
                only_failures,
                continue_on_error,
                use_colors: !cli.no_color,
            };
            run_check(cli.config, args).await
        }
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
        Commands::Explain { file } => run_explain(&file).await,
    }
}

fn load_config(config_path: Option<PathBuf>) -> VerdictResult<VerdictConfig> {
    match config_path {
        Some(path) => VerdictConfig::load_from_file(path),
        None => VerdictConfig::discover("."),
    }
}

async fn run_check(config_path: Option<PathBuf>, args: CheckArgs) -> VerdictResult<i32> {
    let mut config = load_config(config_path)?;

    // Command line flags override the configuration
    if let Some(max) = args.max_failures {
        config.report.max_failures = Some(max);
    }
    config.report.only_failures |= args.only_failures;
    config.report.use_colors &= args.use_colors;
    config.loader.continue_on_error |= args.continue_on_error;

    let format = match args.format {
        Some(format) => format.into(),
        None => config.report.output_format()?,
    };

    let inspector = VerdictInspector::new_with_config(config)?;

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };

    let report = inspector.inspect(&paths).await?;
    let formatted = inspector.format_report(&report, format)?;
    print!("{}", formatted);

    if report.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn run_validate_config(config_file: Option<PathBuf>) -> VerdictResult<i32> {
    let path = config_file.unwrap_or_else(|| PathBuf::from("cwt_verdict.yaml"));

    match VerdictConfig::load_from_file(&path) {
        Ok(config) => {
            println!("✅ Configuration is valid: {}", path.display());
            println!("   Format: {}", config.report.format);
            println!("   Extensions: {}", config.loader.extensions.join(", "));
            println!("   Fingerprint: {}", config.fingerprint());
            Ok(0)
        }
        Err(e) => {
            eprintln!("❌ Configuration is invalid: {}", e);
            Ok(1)
        }
    }
}

async fn run_explain(file: &Path) -> VerdictResult<i32> {
    let content = tokio::fs::read_to_string(file).await?;

    let outcome = match decode_record(&content) {
        Ok(outcome) => outcome,
        Err(e @ VerdictError::Contract { .. }) | Err(e @ VerdictError::Decode { .. }) => {
            println!("❌ Malformed record: {}", e);
            return Ok(1);
        }
        Err(e) => return Err(e),
    };

    println!("{}", describe_outcome(&outcome));
    Ok(0)
}

fn describe_outcome(outcome: &WireOutcome) -> String {
    let kind = match outcome {
        WireOutcome::Check(_) => "check result",
        WireOutcome::Claims(_) => "claims result",
    };

    let mut lines = Vec::new();
    match outcome.as_check().into_violates() {
        None => lines.push(format!("✅ Successful {kind}")),
        Some(violates) => {
            lines.push(format!("❌ Failed {kind}"));
            lines.push(format!("   Message: {}", violates.message));
            lines.push(format!("   Section: {}", violates.section));
            lines.push(format!("   Link:    {}", violates.link));
        }
    }

    if let Some(claims) = outcome.cwt_claims() {
        let text_claims = [
            ("iss", &claims.iss),
            ("sub", &claims.sub),
            ("aud", &claims.aud),
            ("cti", &claims.cti),
        ];
        for (name, value) in text_claims {
            if let Some(value) = value {
                lines.push(format!("   {name}: {value}"));
            }
        }

        let date_claims = [
            ("exp", claims.exp, claims.expires_at()),
            ("nbf", claims.nbf, claims.not_before()),
            ("iat", claims.iat, claims.issued_at()),
        ];
        for (name, raw, date) in date_claims {
            match (raw, date) {
                (Some(_), Some(date)) => {
                    lines.push(format!("   {name}: {}", date.format("%Y-%m-%d %H:%M:%S UTC")))
                }
                (Some(raw), None) => lines.push(format!("   {name}: {raw} (out of range)")),
                _ => {}
            }
        }

        for name in claims.extra_claims().keys() {
            lines.push(format!("   {name}: <claim>"));
        }
    }

    lines.join("\n")
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FAILURE: &str = r#"{"success":false,"violates":{"message":"Missing issuer","section":"4.1","link":"https://example/spec#4.1"}}"#;

    fn check_args(paths: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            paths,
            format: Some(OutputFormatArg::Json),
            max_failures: None,
            only_failures: false,
            continue_on_error: false,
            use_colors: false,
        }
    }

    #[tokio::test]
    async fn test_check_command_exit_codes() {
        let temp_dir = TempDir::new().unwrap();
        let clean = temp_dir.path().join("clean.json");
        let failing = temp_dir.path().join("failing.json");
        fs::write(&clean, r#"{"success":true,"violates":null}"#).unwrap();
        fs::write(&failing, FAILURE).unwrap();

        let config = temp_dir.path().join("config.yaml");
        fs::write(&config, "version: \"1.0\"\n").unwrap();

        let result = run_check(Some(config.clone()), check_args(vec![clean])).await;
        assert_eq!(result.unwrap(), 0);

        let result = run_check(Some(config), check_args(vec![failing])).await;
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("cwt_verdict.yaml");

        let yaml = serde_yaml::to_string(&VerdictConfig::default()).unwrap();
        fs::write(&config_file, yaml).unwrap();
        assert_eq!(run_validate_config(Some(config_file.clone())).unwrap(), 0);

        fs::write(&config_file, "version: \"3\"\n").unwrap();
        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_explain() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.json");
        let bad = temp_dir.path().join("bad.json");
        fs::write(&good, FAILURE).unwrap();
        fs::write(&bad, r#"{"success":false,"violates":null,"cwtClaims":null}"#).unwrap();

        assert_eq!(run_explain(&good).await.unwrap(), 0);
        assert_eq!(run_explain(&bad).await.unwrap(), 1);
        assert!(run_explain(&temp_dir.path().join("missing.json")).await.is_err());
    }

    #[test]
    fn test_describe_claims_outcome() {
        let outcome = decode_record(
            r#"{"success":true,"violates":null,"cwtClaims":{"iss":"DE","exp":1444064944,"hcert":{}}}"#,
        )
        .unwrap();

        let text = describe_outcome(&outcome);
        assert!(text.contains("Successful claims result"));
        assert!(text.contains("iss: DE"));
        assert!(text.contains("exp: 2015-10-05 17:09:04 UTC"));
        assert!(text.contains("hcert: <claim>"));
    }
}
