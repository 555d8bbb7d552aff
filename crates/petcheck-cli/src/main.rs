//! petcheck CLI - black-box contract checks for a deployed Pet Store API

mod storage;

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use petcheck_core::{
    CaseStatus, Config, Failure, FailureKind, IdStrategy, SchemaKind, Severity, Suite,
    SuiteReport, Verdict, VerdictPolicy,
};
use petcheck_runner::{PetStoreClient, RunnerError, SuiteRunner};

const CONFIG_FILE: &str = ".petcheck.toml";

#[derive(Parser)]
#[command(name = "petcheck")]
#[command(about = "Black-box contract checks for a deployed Pet Store API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Strict mode (warnings become errors). Use --strict false to disable.
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    strict: bool,

    /// Verbose output (info-level logs unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run contract cases against the server
    Run {
        /// Only this suite
        #[arg(short, long)]
        suite: Option<SuiteArg>,

        /// Only cases whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Output directory for report and reproductions
        #[arg(short, long, default_value = ".petcheck")]
        output_dir: String,

        /// Stop on first failed or errored case
        #[arg(long)]
        stop_on_failure: bool,

        #[command(flatten)]
        judging: JudgingArgs,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// List cases without sending requests
    List {
        /// Only this suite
        #[arg(short, long)]
        suite: Option<SuiteArg>,
    },

    /// Initialize config file
    Init,

    /// Export a JSON Schema (resource shapes or the report format)
    Schema {
        #[arg(default_value = "report")]
        kind: SchemaArg,
    },

    /// Show effective config and check the server is reachable
    Doctor {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Where to send requests; flags override file and environment.
#[derive(Args)]
struct TargetArgs {
    /// Config file (default: .petcheck.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    scheme: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Use the fixed literal ids instead of run-scoped ones
    #[arg(long)]
    literal_ids: bool,

    /// Seed for the run-scoped id sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Delete created pets and orders after each case
    #[arg(long)]
    teardown: bool,
}

impl TargetArgs {
    /// File (or defaults), then `PETCHECK_*` environment, then flags.
    fn resolve(self) -> Result<Config> {
        let cfg = self.load()?.with_env()?;
        Ok(self.apply(cfg))
    }

    fn load(&self) -> Result<Config> {
        Ok(match &self.config {
            Some(path) => Config::load(Path::new(path))?,
            None => Config::load_default()?,
        })
    }

    fn apply(self, mut cfg: Config) -> Config {
        if let Some(scheme) = self.scheme {
            cfg.scheme = scheme;
        }
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if self.literal_ids {
            cfg.ids = IdStrategy::Literal;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.teardown {
            cfg.teardown = true;
        }
        cfg
    }
}

/// Which failures count toward the verdict.
#[derive(Args)]
struct JudgingArgs {
    /// Drop failures of this kind before judging (repeatable), e.g. schema_violation
    #[arg(long = "ignore-kind", value_name = "KIND")]
    ignore_kinds: Vec<FailureKind>,

    /// Drop failures below this severity (info, warning, error, critical)
    #[arg(long, default_value = "warning")]
    min_severity: Severity,
}

impl JudgingArgs {
    fn policy(self, strict: bool) -> VerdictPolicy {
        let base = if strict {
            VerdictPolicy::default()
        } else {
            VerdictPolicy::lenient()
        };
        VerdictPolicy {
            ignore_kinds: self.ignore_kinds,
            min_severity: self.min_severity,
            ..base
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    Pet,
    Store,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Pet => Suite::Pet,
            SuiteArg::Store => Suite::Store,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaArg {
    Pet,
    Order,
    Inventory,
    Report,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn suites(suite: Option<SuiteArg>) -> Vec<Suite> {
    suite.map(|s| vec![s.into()]).unwrap_or_default()
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            suite,
            filter,
            output_dir,
            stop_on_failure,
            judging,
            target,
        } => {
            let cfg = target.resolve()?;
            let policy = judging.policy(cli.strict);

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url());
                if !cfg.headers.is_empty() {
                    eprintln!("  headers:  {} configured", cfg.headers.len());
                }
                eprintln!("  ids:      {:?}", cfg.ids);
                eprintln!();
            }

            let runner = SuiteRunner::from_config(&cfg)
                .with_suites(suites(suite))
                .with_filter(filter)
                .with_stop_on_failure(stop_on_failure);

            let run_start = Instant::now();
            let report = match runner.run() {
                Ok(report) => report,
                Err(RunnerError::NoCases) => {
                    eprintln!("Error: No cases match the selection. See `petcheck list`.");
                    return Ok(3);
                }
                Err(e) => return Err(e.into()),
            };
            let duration_secs = run_start.elapsed().as_secs_f64();

            let (filtered, verdict) = judge(&policy, &report);

            match cli.output {
                OutputFormat::Terminal => print_terminal(&report, &verdict, duration_secs),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": verdict.status.to_string(),
                            "exit_code": verdict.exit_code,
                            "reason": verdict.reason,
                        },
                        "report": report,
                        "failures": filtered,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            let artifacts = storage::RunArtifacts {
                config: &cfg,
                report: &report,
                failures: &filtered,
                verdict: &verdict,
                duration_secs,
            };
            match storage::save_run(Path::new(&output_dir), &artifacts) {
                Ok(Some(path)) if cli.output == OutputFormat::Terminal => {
                    println!("Reproductions: {}", path.display());
                }
                Ok(_) => {}
                Err(e) => eprintln!("Warning: failed to write run artifacts: {e}"),
            }

            Ok(verdict.exit_code)
        }

        Commands::List { suite } => {
            let runner = SuiteRunner::from_config(&Config::default()).with_suites(suites(suite));
            let cases = runner.plan();
            match cli.output {
                OutputFormat::Json => {
                    let list: Vec<_> = cases
                        .iter()
                        .map(|c| {
                            serde_json::json!({
                                "suite": c.suite,
                                "name": c.name,
                                "title": c.title,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&list)?);
                }
                OutputFormat::Terminal => {
                    for case in &cases {
                        println!("{:<6} {:<36} {}", case.suite, case.name, case.title);
                    }
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - scheme/host/port: server to test");
            println!("  - ids: run_scoped or literal");
            println!("  - headers: extra request headers");
            Ok(0)
        }

        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaArg::Report => petcheck_core::report::generate_schema(),
                SchemaArg::Pet => serde_json::to_string_pretty(SchemaKind::Pet.document())?,
                SchemaArg::Order => serde_json::to_string_pretty(SchemaKind::Order.document())?,
                SchemaArg::Inventory => {
                    serde_json::to_string_pretty(SchemaKind::Inventory.document())?
                }
            };
            println!("{schema}");
            Ok(0)
        }

        Commands::Doctor { target } => doctor(target),
    }
}

/// Failures that survive `policy`, and the verdict they lead to.
fn judge(policy: &VerdictPolicy, report: &SuiteReport) -> (Vec<Failure>, Verdict) {
    let filtered = policy.filter(report.failures());
    let verdict = policy.verdict(&filtered, report.total, report.passed, report.errored);
    (filtered, verdict)
}

fn status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Passed => "PASS",
        CaseStatus::Failed => "FAIL",
        CaseStatus::Errored => "ERR ",
    }
}

fn print_terminal(report: &SuiteReport, verdict: &Verdict, duration_secs: f64) {
    for case in &report.cases {
        println!(
            "{} {:<6} {} ({:.2}s)",
            status_label(case.status),
            case.suite,
            case.name,
            case.elapsed
        );
        if case.status == CaseStatus::Passed {
            continue;
        }
        for step in &case.steps {
            println!("       - {} [{:?}]", step.label, step.status);
        }
        for f in &case.failures {
            println!("       [{}] {}: {f}", f.severity, f.step);
        }
    }

    println!("\n{}: {}", verdict.status, verdict.reason);
    println!(
        "  Cases: {} total, {} passed, {} failed, {} errored",
        report.total, report.passed, report.failed, report.errored
    );
    if report.stopped_early {
        println!("  Stopped early (--stop-on-failure)");
    }
    println!("  Duration: {duration_secs:.2}s");
    println!("  Exit code: {}", verdict.exit_code);
}

fn doctor(target: TargetArgs) -> Result<i32> {
    println!("petcheck doctor");
    println!("===============\n");

    let file_ok = Path::new(CONFIG_FILE).exists();
    println!(
        "[{}] Config file ({CONFIG_FILE})",
        if file_ok { "OK" } else { "--" }
    );

    let cfg = match target.resolve() {
        Ok(cfg) => {
            println!("[OK] Config valid");
            cfg
        }
        Err(e) => {
            println!("[NG] Config: {e:#}");
            return Ok(3);
        }
    };
    println!("     base_url: {}", cfg.base_url());
    println!("     ids:      {:?}", cfg.ids);
    println!("     teardown: {}", cfg.teardown);

    let client = PetStoreClient::from_config(&cfg)?;
    let reachable = match client.get_inventory() {
        Ok(resp) => {
            println!(
                "[{}] GET /store/inventory -> {} ({} ms)",
                if resp.status == 200 { "OK" } else { "NG" },
                resp.status,
                resp.elapsed.as_millis()
            );
            resp.status == 200
        }
        Err(e) => {
            println!("[NG] {e}");
            false
        }
    };

    if !file_ok {
        println!("\nCreate config file:");
        println!("  petcheck init");
    }

    if reachable {
        println!("\nReady to run!");
        Ok(0)
    } else {
        println!("\nServer is not answering as expected.");
        Ok(2)
    }
}
