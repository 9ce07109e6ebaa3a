//! Command-line interface for `gombare-core`.
//!
//! `check` resolves an identification schema and prints it back with its
//! defaults filled in; `keys` prints the ID key of every element of one array
//! of a JSON or YAML document. Single-dash long flags (`-idparams`, `-fast`,
//! `-silent`) are accepted for compatibility with the original tool.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use gombare_core::{Aggregation, IdentificationParameter, KeyBuilder, KeyOptions, Node, Object, ResolvedSchema};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gombare",
    version,
    about = "Compute schema-driven identity keys for the elements of JSON and YAML arrays."
)]
struct Cli {
    /// Only report errors on STDERR.
    #[arg(long = "silent", global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the identification schema and print it with its defaults.
    Check(SchemaArgs),
    /// Print the ID key of every element of an array.
    Keys(KeysArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Identification schema: inline JSON, or the path to a JSON or YAML file.
    #[arg(long = "idparams")]
    idparams: String,
}

#[derive(Debug, Args)]
struct KeysArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Dot-separated path of the array to key; the document root when omitted.
    #[arg(long = "at")]
    at: Option<String>,

    /// Read the document as YAML instead of JSON.
    #[arg(long = "yaml")]
    yaml: bool,

    /// Join array fragments in document order instead of sorting them.
    #[arg(long = "document-order")]
    document_order: bool,

    /// Skip the uniqueness verification of the produced keys.
    #[arg(long = "fast")]
    fast: bool,

    /// The document to read.
    file: PathBuf,
}

#[derive(Debug, Serialize)]
struct KeyEntry {
    index: usize,
    key: String,
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse_from(canonicalize_args(std::env::args_os()));
    init_tracing(cli.silent);

    match &cli.command {
        Command::Check(args) => run_check(args),
        Command::Keys(args) => run_keys(args),
    }
}

fn init_tracing(silent: bool) {
    let default_level = if silent { "error" } else { "warn" };
    let filter = if silent {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(filter).init();
}

fn run_check(args: &SchemaArgs) -> Result<()> {
    let schema = load_schema(&args.idparams)?;
    write_json(&schema.to_parameter(schema.root()))
}

fn run_keys(args: &KeysArgs) -> Result<()> {
    let schema = load_schema(&args.schema.idparams)?;
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let document = parse_node(&text, args.yaml).context("failed to parse document")?;

    let segments = split_path(args.at.as_deref());
    let param = schema.lookup(segments.iter().copied()).ok_or_else(|| {
        anyhow!("no identification parameter is registered '_for' the path '{}'", segments.join("."))
    })?;

    let detached = Object::new();
    let (container, elements) = locate_array(&document, &segments, &detached)?;

    let aggregation = if args.document_order { Aggregation::Document } else { Aggregation::Sorted };
    let options = KeyOptions::default().with_aggregation(aggregation).with_verify_unique(!args.fast);
    let keys = KeyBuilder::with_options(&schema, options)
        .key_elements(param, container, elements)
        .with_context(|| format!("failed to build the ID keys of {}", args.file.display()))?;
    info!(count = keys.len(), path = %segments.join("."), "built ID keys");

    let entries: Vec<KeyEntry> =
        keys.into_iter().enumerate().map(|(index, key)| KeyEntry { index, key }).collect();
    write_json(&entries)
}

fn load_schema(raw: &str) -> Result<ResolvedSchema> {
    let path = Path::new(raw);
    let decoded = if path.is_file() {
        let text =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        debug!(path = %path.display(), "loading identification schema from file");
        if is_yaml_path(path) {
            IdentificationParameter::from_yaml_str(&text)
        } else {
            IdentificationParameter::from_json_str(&text)
        }
    } else {
        IdentificationParameter::from_json_str(raw)
    };

    let param = decoded.context("failed to load the identification schema")?;
    param.resolve().context("failed to resolve the identification schema")
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn parse_node(input: &str, yaml: bool) -> Result<Node> {
    if yaml {
        Node::from_yaml_str(input).map_err(|err| anyhow!(err))
    } else {
        Node::from_json_str(input).map_err(|err| anyhow!(err))
    }
}

fn split_path(raw: Option<&str>) -> Vec<&str> {
    raw.map(|path| path.split('.').filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default()
}

fn locate_array<'a>(
    document: &'a Node,
    segments: &[&str],
    detached: &'a Object,
) -> Result<(&'a Object, &'a [Node])> {
    let Some((last, parents)) = segments.split_last() else {
        let elements = document.as_array().ok_or_else(|| {
            anyhow!("the document root is {}, not an array; use --at to point at one", document.kind())
        })?;
        return Ok((detached, elements));
    };
    let container = document
        .pointer(parents.iter().copied())
        .and_then(Node::as_object)
        .ok_or_else(|| anyhow!("no object found at '{}'", parents.join(".")))?;
    let elements = container
        .get(*last)
        .and_then(Node::as_array)
        .ok_or_else(|| anyhow!("no array found at '{}'", segments.join(".")))?;
    Ok((container, elements))
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut stdout, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer).context("failed to serialize output")?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

fn canonicalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut canonicalized = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 {
            canonicalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => canonicalized.push(OsString::from("--help")),
            Some("-version") => canonicalized.push(OsString::from("--version")),
            Some("-silent") => canonicalized.push(OsString::from("--silent")),
            Some("-fast") => canonicalized.push(OsString::from("--fast")),
            Some("-yaml") => canonicalized.push(OsString::from("--yaml")),
            Some("-idparams") => canonicalized.push(OsString::from("--idparams")),
            Some("-at") => canonicalized.push(OsString::from("--at")),
            Some(other) if other.starts_with("-idparams=") => {
                canonicalized.push(OsString::from("--idparams"));
                canonicalized.push(OsString::from(other.trim_start_matches("-idparams=")));
            }
            Some(other) if other.starts_with("-at=") => {
                canonicalized.push(OsString::from("--at"));
                canonicalized.push(OsString::from(other.trim_start_matches("-at=")));
            }
            _ => canonicalized.push(arg),
        }
    }
    canonicalized
}
