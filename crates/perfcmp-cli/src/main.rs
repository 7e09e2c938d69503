//! perfcmp - load-test comparison charts
//!
//! The `perfcmp` command validates k6 result documents and renders one
//! comparison chart per complete comparison set.
//!
//! ## Commands
//!
//! - `single`: four concurrency strategies per isolation profile
//! - `repeatable`: atomic vs separated aggregates across RC and RR
//! - `single-student`: atomic vs separated for one student, spread and conflict

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use perfcmp_core::{
    run_report, ChartRenderer, JsonChartRenderer, MarkdownChartRenderer, OutputTarget,
    ReportKind, ReportRequest, SetSelector,
};

#[derive(Parser)]
#[command(name = "perfcmp")]
#[command(author = "perfcmp maintainers")]
#[command(version = perfcmp_core::VERSION)]
#[command(about = "Validated comparison charts for k6 load-test results", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare four strategies per isolation profile
    Single {
        /// Directory holding `<profile>-<strategy>.summary.json` files
        #[arg(long, env = "PERFCMP_ROOT", default_value = "performance/k6/results/single")]
        root: PathBuf,

        /// Directory receiving one chart per profile
        #[arg(
            long,
            env = "PERFCMP_OUTPUT_DIR",
            default_value = "performance/k6/results/single/plots"
        )]
        output_dir: PathBuf,

        /// Profile to render
        #[arg(long, default_value = "all", value_parser = ["read-committed", "repeatable-read", "all"])]
        set: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Compare repeated-run aggregates across RC and RR
    Repeatable {
        /// Directory holding `<profile>/<scenario>.aggregate.json` files
        #[arg(
            long,
            env = "PERFCMP_ROOT",
            default_value = "performance/k6/results/repeatable/aggregated"
        )]
        root: PathBuf,

        /// Output file; its extension is replaced by the renderer's
        #[arg(
            long,
            default_value = "performance/k6/results/repeatable/plots/repeatable-rc-rr-atomic-vs-separated.png"
        )]
        output: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Compare atomic vs separated for a single student
    SingleStudent {
        /// Directory holding the single-student summary files
        #[arg(
            long,
            env = "PERFCMP_ROOT",
            default_value = "performance/k6/results/single-student"
        )]
        root: PathBuf,

        /// Directory receiving one chart per workload
        #[arg(
            long,
            env = "PERFCMP_OUTPUT_DIR",
            default_value = "performance/k6/results/single-student/plots"
        )]
        output_dir: PathBuf,

        /// Workload to render
        #[arg(long, default_value = "all", value_parser = ["spread", "conflict", "all"])]
        set: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Chart resolution in dots per inch
    #[arg(long, env = "PERFCMP_DPI", default_value_t = 160, allow_negative_numbers = true)]
    dpi: i64,

    /// Artifact format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Abort on any missing result file (`true`) or skip incomplete sets (`false`)
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    strict_missing: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

impl Format {
    fn renderer(self) -> Box<dyn ChartRenderer> {
        match self {
            Format::Json => Box::new(JsonChartRenderer),
            Format::Markdown => Box::new(MarkdownChartRenderer),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    perfcmp_core::init_tracing(cli.json, level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[FATAL] {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let (request, format) = match command {
        Commands::Single {
            root,
            output_dir,
            set,
            common,
        } => build_request(
            ReportKind::Single,
            root,
            OutputTarget::Directory(output_dir),
            SetSelector::parse(&set),
            common,
        ),
        Commands::Repeatable {
            root,
            output,
            common,
        } => build_request(
            ReportKind::Repeatable,
            root,
            OutputTarget::File(output),
            SetSelector::All,
            common,
        ),
        Commands::SingleStudent {
            root,
            output_dir,
            set,
            common,
        } => build_request(
            ReportKind::SingleStudent,
            root,
            OutputTarget::Directory(output_dir),
            SetSelector::parse(&set),
            common,
        ),
    };

    let outcome = run_report(&request, format.renderer().as_ref())?;
    for chart in &outcome.rendered {
        println!("{}", chart.path.display());
    }
    Ok(())
}

fn build_request(
    kind: ReportKind,
    root: PathBuf,
    output: OutputTarget,
    selector: SetSelector,
    common: CommonArgs,
) -> (ReportRequest, Format) {
    let mut request = ReportRequest::new(kind, root, output)
        .with_dpi(common.dpi)
        .with_selector(selector);
    request.strict_missing = common.strict_missing;
    (request, common.format)
}
