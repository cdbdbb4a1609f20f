use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use scene_tracker_core::{
    FieldInclude, Record, TrackerSchema, default_scene_schema, default_tracker, example_trackers,
    reconcile_tracker, schema_prompt, update_tracker, validate_schema,
};
use scene_tracker_template::render;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Json,
    Yaml,
}

/// CLI-specific field filter enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliInclude {
    Dynamic,
    Static,
    All,
}

impl From<CliInclude> for FieldInclude {
    fn from(include: CliInclude) -> Self {
        match include {
            CliInclude::Dynamic => Self::Dynamic,
            CliInclude::Static => Self::Static,
            CliInclude::All => Self::All,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "scene-tracker")]
#[command(about = "Scene tracker reconciliation and rendering")]
struct Cli {
    /// Log engine debug events to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more schema files.
    Validate(ValidateArgs),
    /// Print the schema's default tracker.
    Default(DefaultArgs),
    /// Print the schema's example-tracker set.
    Examples(ExamplesArgs),
    /// Coerce a tracker file into schema shape.
    Reconcile(ReconcileArgs),
    /// Merge an updated tracker into an original one.
    Merge(MergeArgs),
    /// Render a tracker through a display template.
    Render(RenderArgs),
    /// Print the schema flattened into field-prompt text.
    Prompt(PromptArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema files (JSON or YAML).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct DefaultArgs {
    /// Schema file; the bundled scene schema when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Which fields to include.
    #[arg(long, default_value = "all")]
    include: CliInclude,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliFormat,
}

#[derive(Debug, Args)]
struct ExamplesArgs {
    /// Schema file; the bundled scene schema when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Which fields to include.
    #[arg(long, default_value = "all")]
    include: CliInclude,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliFormat,
}

#[derive(Debug, Args)]
struct ReconcileArgs {
    /// Schema file; the bundled scene schema when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Tracker record file (JSON or YAML).
    #[arg(long)]
    input: PathBuf,
    /// Which fields to include.
    #[arg(long, default_value = "all")]
    include: CliInclude,
    /// Drop unclaimed data instead of keeping it under _extraFields.
    #[arg(long)]
    no_extras: bool,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliFormat,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Schema file; the bundled scene schema when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Previously reconciled tracker file.
    #[arg(long)]
    original: PathBuf,
    /// Updated, possibly partial, tracker file.
    #[arg(long)]
    updated: PathBuf,
    /// Take _extraFields verbatim from the updated tracker.
    #[arg(long)]
    updated_extras_win: bool,
    /// Drop unclaimed data instead of keeping it under _extraFields.
    #[arg(long)]
    no_extras: bool,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliFormat,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Template file; the bundled scene template when omitted.
    #[arg(long)]
    template: Option<PathBuf>,
    /// Tracker record file (JSON or YAML).
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct PromptArgs {
    /// Schema file; the bundled scene schema when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Which fields to include.
    #[arg(long, default_value = "dynamic")]
    include: CliInclude,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Default(args) => run_default(args),
        Command::Examples(args) => run_examples(args),
        Command::Reconcile(args) => run_reconcile(args),
        Command::Merge(args) => run_merge(args),
        Command::Render(args) => run_render(args),
        Command::Prompt(args) => run_prompt(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failed = 0usize;

    for path in &args.inputs {
        let schema = load_schema_file(path)?;
        let errors = validate_schema(&schema);
        if errors.is_empty() {
            println!("{}: OK ({} fields)", path.display(), schema.len());
        } else {
            failed += 1;
            println!("{}: {} error(s)", path.display(), errors.len());
            for error in errors {
                println!("  - {error}");
            }
        }
    }

    if failed > 0 {
        Err(format!("{failed} schema file(s) failed validation"))
    } else {
        Ok(())
    }
}

fn run_default(args: DefaultArgs) -> Result<(), String> {
    let schema = load_schema(args.schema.as_deref())?;
    let tracker = default_tracker(&schema, args.include.into());
    println!("{}", format_record(&tracker, args.format)?);
    Ok(())
}

fn run_examples(args: ExamplesArgs) -> Result<(), String> {
    let schema = load_schema(args.schema.as_deref())?;
    let examples = example_trackers(&schema, args.include.into());

    match args.format {
        CliFormat::Json => {
            let rendered = serde_json::to_string_pretty(&examples)
                .map_err(|err| format!("Failed to encode examples: {err}"))?;
            println!("{rendered}");
        }
        CliFormat::Yaml => {
            for example in &examples {
                print!("---\n{}", format_record(example, CliFormat::Yaml)?);
            }
        }
    }
    Ok(())
}

fn run_reconcile(args: ReconcileArgs) -> Result<(), String> {
    let schema = load_schema(args.schema.as_deref())?;
    let record = load_record_file(&args.input)?;
    let tracker = reconcile_tracker(&record, &schema, args.include.into(), !args.no_extras);
    println!("{}", format_record(&tracker, args.format)?);
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let schema = load_schema(args.schema.as_deref())?;
    let original = load_record_file(&args.original)?;
    let updated = load_record_file(&args.updated)?;
    let merged = update_tracker(
        &original,
        &updated,
        &schema,
        !args.no_extras,
        args.updated_extras_win,
    );
    println!("{}", format_record(&merged, args.format)?);
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<(), String> {
    let template = match &args.template {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        None => scene_tracker_core::DEFAULT_SCENE_TEMPLATE.to_string(),
    };
    let record = load_record_file(&args.input)?;

    let text = render(&template, &record).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_prompt(args: PromptArgs) -> Result<(), String> {
    let schema = load_schema(args.schema.as_deref())?;
    println!("{}", schema_prompt(&schema, args.include.into()));
    Ok(())
}

fn load_schema(path: Option<&Path>) -> Result<TrackerSchema, String> {
    match path {
        Some(path) => load_schema_file(path),
        None => Ok(default_scene_schema()),
    }
}

fn load_schema_file(path: &Path) -> Result<TrackerSchema, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    decode(path, &raw)
}

fn load_record_file(path: &Path) -> Result<Record, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    decode(path, &raw)
}

/// Decodes a file as YAML or JSON based on its extension.
fn decode<T: serde::de::DeserializeOwned>(path: &Path, raw: &str) -> Result<T, String> {
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(raw).map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    } else {
        serde_json::from_str(raw).map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    }
}

fn format_record(record: &Record, format: CliFormat) -> Result<String, String> {
    match format {
        CliFormat::Json => serde_json::to_string_pretty(record)
            .map_err(|err| format!("Failed to encode output: {err}")),
        CliFormat::Yaml => {
            serde_yaml::to_string(record).map_err(|err| format!("Failed to encode output: {err}"))
        }
    }
}
