use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use checkreport_core::{
    build_report, render_raw_checks, render_report, render_summary, render_timing, summarize,
    CheckStore, CheckerFilter, MemoryStore, PathFormatter, RenderContext, RenderOptions, ReportPlan,
    SourceCache, StatusFilter, Verbosity, DEFAULT_ANALYSES_FILTER, DEFAULT_AUTO_THRESHOLD,
    DEFAULT_MAX_CALL_DEPTH, DEFAULT_STATUS_FILTER,
};
use checkreport_types::{ConfigFile, ReportFormat, StoreDump, STORE_SCHEMA_V1};

mod config_loader;
mod env_expand;

use config_loader::resolve_config;
use env_expand::expand_env_vars;

#[derive(Parser, Debug)]
#[command(name = "checkreport")]
#[command(about = "Render analyzer check results as a diagnostic report", long_about = None)]
struct Cli {
    /// Result store written by the analyzer (JSON).
    store: PathBuf,

    /// Report format. Defaults to the config file, else `auto`.
    #[arg(long, short = 'f', value_enum)]
    format: Option<FormatArg>,

    /// Write the report into a file instead of stdout.
    #[arg(long = "report-file", short = 'o')]
    report_file: Option<PathBuf>,

    /// Statuses to display (repeatable), e.g. `error,warning` or `*,-unreachable`.
    #[arg(long, action = clap::ArgAction::Append)]
    status_filter: Vec<String>,

    /// Analyses to display (repeatable), e.g. `*` or `boa,nullity`.
    #[arg(long, action = clap::ArgAction::Append)]
    analyses_filter: Vec<String>,

    /// Report verbosity, 1 to 4.
    #[arg(long, short = 'r', value_parser = clap::value_parser!(u8).range(1..=4))]
    report_verbosity: Option<u8>,

    /// Display timing results.
    #[arg(long, short = 't', value_enum, default_value_t = Detail::No)]
    times: Detail,

    /// Display the analysis summary.
    #[arg(long, short = 's', value_enum, default_value_t = Detail::No)]
    summary: Detail,

    /// Display every check before aggregation.
    #[arg(long)]
    display_raw_checks: bool,

    /// Maximum call frames shown per calling context in the text report.
    #[arg(long)]
    max_call_depth: Option<usize>,

    /// Path to a config file. If omitted, uses ./checkreport.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Sarif,
    Csv,
    Junit,
    Auto,
    No,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Sarif => ReportFormat::Sarif,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Junit => ReportFormat::Junit,
            FormatArg::Auto => ReportFormat::Auto,
            FormatArg::No => ReportFormat::No,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Detail {
    No,
    Short,
    Full,
}

/// Effective settings after merging flags, config file and built-ins.
#[derive(Debug)]
struct Settings {
    format: ReportFormat,
    plan: ReportPlan,
    options: RenderOptions,
}

#[cfg(not(test))]
fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose, cli.debug);

    let cwd = std::env::current_dir().context("get current directory")?;
    let config = resolve_config(cli.config.as_deref(), &cwd, |text| {
        expand_env_vars(text).map(|s| s.into_owned())
    })?;
    let settings = resolve_settings(&cli, &config)?;

    let store = load_store(&cli.store)?;
    let output = render_output(&cli, &settings, &store)?;

    if let Some(path) = &cli.report_file {
        print!("{}", output.preamble);
        write_text(path, &output.report)?;
        info!("Wrote report to '{}'", path.display());
    } else {
        print!("{}{}", output.preamble, output.report);
    }
    Ok(0)
}

/// Initialize tracing/logging based on CLI flags.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

/// Flag beats config file beats built-in default.
fn resolve_settings(cli: &Cli, config: &ConfigFile) -> Result<Settings> {
    let defaults = &config.defaults;

    let format = cli
        .format
        .map(ReportFormat::from)
        .or(defaults.format)
        .unwrap_or(ReportFormat::Auto);

    let status_expression = filter_expression(
        &cli.status_filter,
        defaults.status_filter.as_deref(),
        DEFAULT_STATUS_FILTER,
    );
    let analyses_expression = filter_expression(
        &cli.analyses_filter,
        defaults.analyses_filter.as_deref(),
        DEFAULT_ANALYSES_FILTER,
    );
    let plan = ReportPlan {
        status_filter: StatusFilter::parse(&status_expression)
            .with_context(|| format!("parse status filter '{status_expression}'"))?,
        checker_filter: CheckerFilter::parse(&analyses_expression)
            .with_context(|| format!("parse analyses filter '{analyses_expression}'"))?,
    };

    let level = cli.report_verbosity.or(defaults.verbosity).unwrap_or(1);
    let verbosity = Verbosity::new(level).ok_or_else(|| {
        anyhow!(
            "report verbosity must be between {} and {}, got {level}",
            Verbosity::MIN,
            Verbosity::MAX
        )
    })?;

    let options = RenderOptions {
        verbosity,
        max_call_depth: cli
            .max_call_depth
            .or(defaults.max_call_depth)
            .unwrap_or(DEFAULT_MAX_CALL_DEPTH),
        auto_threshold: defaults.auto_threshold.unwrap_or(DEFAULT_AUTO_THRESHOLD),
    };

    debug!(
        report_format = format.as_str(),
        status = %status_expression,
        analyses = %analyses_expression,
        verbosity = level,
        "resolved settings"
    );
    Ok(Settings {
        format,
        plan,
        options,
    })
}

/// Repeated flags are joined as one expression, applied in order.
fn filter_expression(flags: &[String], configured: Option<&str>, built_in: &str) -> String {
    if !flags.is_empty() {
        flags.join(",")
    } else {
        configured.unwrap_or(built_in).to_string()
    }
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read store '{}'", path.display()))?;
    let dump: StoreDump = serde_json::from_str(&text)
        .with_context(|| format!("parse store '{}'", path.display()))?;
    if dump.schema != STORE_SCHEMA_V1 {
        bail!(
            "unsupported store schema '{}' in '{}' (expected '{}')",
            dump.schema,
            path.display(),
            STORE_SCHEMA_V1
        );
    }
    let store = MemoryStore::from_dump(dump, path.display().to_string())
        .with_context(|| format!("load store '{}'", path.display()))?;
    Ok(store)
}

/// Text written before the report (timing, summary, raw checks), and the
/// report itself.
#[derive(Debug, Default)]
struct Output {
    preamble: String,
    report: String,
}

fn render_output(cli: &Cli, settings: &Settings, store: &MemoryStore) -> Result<Output> {
    let ctx = RenderContext::new(settings.options, PathFormatter::new(), SourceCache::new());
    let mut blocks: Vec<String> = Vec::new();

    if cli.times != Detail::No {
        blocks.push(render_timing(store.timing_records(), cli.times == Detail::Full));
    }
    if cli.summary != Detail::No {
        let summary = summarize(store).context("summarize results")?;
        blocks.push(render_summary(&summary, cli.summary == Detail::Full));
    }
    if cli.display_raw_checks {
        blocks.push(render_raw_checks(store, &ctx).context("render raw checks")?);
    }

    let mut output = Output {
        preamble: blocks.join("\n"),
        report: String::new(),
    };
    if settings.format == ReportFormat::No {
        return Ok(output);
    }

    let report = build_report(store, &settings.plan).context("build report")?;
    info!(
        entries = report.len(),
        report_format = settings.format.as_str(),
        "rendering report"
    );
    output.report = render_report(settings.format, &report, &ctx)
        .with_context(|| format!("render {} report", settings.format.as_str()))?;
    if !output.preamble.is_empty() && cli.report_file.is_none() {
        output.preamble.push('\n');
    }
    Ok(output)
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }

    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkreport_testkit::{sample_configs, sample_stores};
    use checkreport_types::Defaults;
    use tempfile::TempDir;

    /// Helper to write a store dump into a temp dir.
    fn write_store(dir: &Path, dump: &StoreDump) -> PathBuf {
        let path = dir.join("output.json");
        std::fs::write(&path, serde_json::to_string(dump).unwrap()).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["checkreport"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&["-f", "json", "-r", "3", "--status-filter", "error", "store.json"]);
        let settings = resolve_settings(&cli, &sample_configs::partial()).unwrap();
        assert_eq!(settings.format, ReportFormat::Json);
        assert_eq!(settings.options.verbosity.level(), 3);
        assert!(settings.plan.status_filter.contains(checkreport_types::Status::Error));
    }

    #[test]
    fn config_fills_missing_flags() {
        let cli = parse(&["store.json"]);
        let settings = resolve_settings(&cli, &sample_configs::partial()).unwrap();
        assert_eq!(settings.format, ReportFormat::Csv);
        assert!(!settings.plan.status_filter.contains(checkreport_types::Status::Warning));
        assert_eq!(settings.options.verbosity.level(), 1);
        assert_eq!(settings.options.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn built_ins_apply_without_config_values() {
        let cli = parse(&["store.json"]);
        let empty = ConfigFile {
            defaults: Defaults {
                format: None,
                verbosity: None,
                status_filter: None,
                analyses_filter: None,
                max_call_depth: None,
                auto_threshold: None,
            },
        };
        let settings = resolve_settings(&cli, &empty).unwrap();
        assert_eq!(settings.format, ReportFormat::Auto);
        assert_eq!(settings.plan.status_filter, StatusFilter::default());
        assert_eq!(settings.options.auto_threshold, DEFAULT_AUTO_THRESHOLD);
    }

    #[test]
    fn repeated_filters_are_joined_in_order() {
        assert_eq!(
            filter_expression(&["*".to_string(), "-ok".to_string()], Some("error"), "x"),
            "*,-ok"
        );
        assert_eq!(filter_expression(&[], Some("error"), "x"), "error");
        assert_eq!(filter_expression(&[], None, "x"), "x");
    }

    #[test]
    fn unknown_filter_choice_is_an_error() {
        let cli = parse(&["--analyses-filter", "bogus", "store.json"]);
        let err = resolve_settings(&cli, &ConfigFile::default()).unwrap_err();
        assert!(format!("{err:#}").contains("bogus"));
    }

    #[test]
    fn out_of_range_config_verbosity_is_an_error() {
        let mut config = ConfigFile::default();
        config.defaults.verbosity = Some(9);
        let err = resolve_settings(&parse(&["store.json"]), &config).unwrap_err();
        assert!(err.to_string().contains("between 1 and 4"));
    }

    #[test]
    fn load_store_rejects_other_schema() {
        let dir = TempDir::new().unwrap();
        let mut dump = sample_stores::empty();
        dump.schema = "other.v9".to_string();
        let path = write_store(dir.path(), &dump);
        let err = load_store(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported store schema"));
    }

    #[test]
    fn preamble_blocks_are_separated_by_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_store(dir.path(), &sample_stores::mixed());
        let store = load_store(&path).unwrap();
        let cli = parse(&["-t", "short", "-s", "short", "-f", "no", path.to_str().unwrap()]);
        let settings = resolve_settings(&cli, &ConfigFile::default()).unwrap();

        let output = render_output(&cli, &settings, &store).unwrap();
        assert!(output.preamble.starts_with("# Time stats:\n"));
        assert!(output.preamble.contains("\n\n# Summary:\n"));
        assert!(output.report.is_empty());
    }

    #[test]
    fn run_with_args_writes_report_file() {
        let dir = TempDir::new().unwrap();
        let store = write_store(dir.path(), &sample_stores::null_deref_two_contexts());
        let out = dir.path().join("nested/report.csv");

        let code = run_with_args([
            "checkreport",
            "--format",
            "csv",
            "-o",
            out.to_str().unwrap(),
            store.to_str().unwrap(),
        ])
        .expect("run csv");
        assert_eq!(code, 0);

        let csv = std::fs::read_to_string(&out).unwrap();
        assert!(csv.starts_with("file,function,line,column"));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn run_with_args_fails_on_missing_store() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        let err = run_with_args(["checkreport", missing.to_str().unwrap()]).unwrap_err();
        assert!(format!("{err:#}").contains("read store"));
    }

    #[test]
    fn write_text_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.txt");
        write_text(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
