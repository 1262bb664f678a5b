//! Charter CLI - run queries against JSON datasets from the command line

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};

use charter_query::{compile_query, execute, QueryError, QueryOptions};
use charter_schema::{ResourceDef, SchemaDoc, SchemaSet};
use charter_syntax::Span;

#[derive(Parser)]
#[command(name = "charter")]
#[command(about = "Charter query engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter expression and output the AST as JSON
    Parse {
        /// Filter expression text, e.g. "Age gt 3 and Name eq 'Rex'"
        filter: String,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Run a query URL against a schema and dataset
    Query {
        /// Schema description file (JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Dataset file: a JSON object keyed by collection name
        #[arg(short, long)]
        data: PathBuf,
        /// Query URL, e.g. "/dogs?$filter=Age gt 3&$top=5"
        url: String,
        /// Pretty print the result envelope
        #[arg(short, long)]
        pretty: bool,
    },
    /// Interactive query session over a schema and dataset
    Repl {
        /// Schema description file (JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Dataset file: a JSON object keyed by collection name
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn main() {
    // Logs go to stderr; stdout carries only the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { filter, pretty } => cmd_parse(&filter, pretty),
        Commands::Query {
            schema,
            data,
            url,
            pretty,
        } => cmd_query(&schema, &data, &url, pretty),
        Commands::Repl { schema, data } => cmd_repl(&schema, &data),
    }
}

fn cmd_parse(filter: &str, pretty: bool) {
    match charter_parser::parse_filter(filter) {
        Ok(ast) => {
            let json = if pretty {
                serde_json::to_string_pretty(&ast).unwrap()
            } else {
                serde_json::to_string(&ast).unwrap()
            };
            println!("{}", json);
        }
        Err(e) => {
            report_span_error(filter, &e.to_string(), e.span());
            std::process::exit(1);
        }
    }
}

fn cmd_query(schema_path: &Path, data_path: &Path, url: &str, pretty: bool) {
    let bench = load_workbench(schema_path, data_path);
    match run_url(&bench, url) {
        Some(envelope) => {
            let json = if pretty {
                serde_json::to_string_pretty(&envelope).unwrap()
            } else {
                serde_json::to_string(&envelope).unwrap()
            };
            println!("{}", json);
        }
        None => std::process::exit(1),
    }
}

fn cmd_repl(schema_path: &Path, data_path: &Path) {
    use rustyline::DefaultEditor;

    let bench = load_workbench(schema_path, data_path);

    println!("Charter query REPL");
    println!("Enter a query URL like /dogs?$filter=Age gt 3");
    println!("Type :help for commands, :quit to exit");
    println!();

    let mut rl = DefaultEditor::new().expect("Failed to create line editor");

    loop {
        let readline = rl.readline("charter> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if let Some(command) = trimmed.strip_prefix(':') {
                    match command.trim() {
                        "quit" | "q" => break,
                        "help" | "h" => {
                            println!("Commands:");
                            println!("  :resources    - List queryable collections");
                            println!("  :help         - Show this help");
                            println!("  :quit         - Exit");
                            println!();
                            println!("Anything else runs as a query URL, for example:");
                            println!("  /dogs?$filter=Age gt 3&$orderby=Name&$top=5");
                        }
                        "resources" | "r" => {
                            for def in bench.schema.resources() {
                                let key = def.plural_name.to_ascii_lowercase();
                                let count =
                                    bench.collections.get(&key).map(Vec::len).unwrap_or(0);
                                println!("  /{}  ({}, {} items)", key, def.name, count);
                            }
                        }
                        _ => println!("Unknown command. Type :help for help."),
                    }
                } else if let Some(envelope) = run_url(&bench, trimmed) {
                    println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
                }
            }
            Err(_) => break,
        }
    }

    println!("Goodbye!");
}

/// A loaded schema plus its dataset, collections keyed by lowercased
/// plural name.
struct Workbench {
    schema: SchemaSet,
    collections: BTreeMap<String, Vec<serde_json::Value>>,
}

fn load_workbench(schema_path: &Path, data_path: &Path) -> Workbench {
    Workbench {
        schema: load_schema(schema_path),
        collections: load_collections(data_path),
    }
}

fn load_schema(path: &Path) -> SchemaSet {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    let doc: SchemaDoc = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error parsing schema {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match doc.build() {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Invalid schema {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn load_collections(path: &Path) -> BTreeMap<String, Vec<serde_json::Value>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error parsing dataset {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    let serde_json::Value::Object(map) = value else {
        eprintln!(
            "Dataset {} must be a JSON object keyed by collection name",
            path.display()
        );
        std::process::exit(1);
    };
    let mut collections = BTreeMap::new();
    for (key, value) in map {
        let serde_json::Value::Array(items) = value else {
            eprintln!("Collection '{}' in {} must be an array", key, path.display());
            std::process::exit(1);
        };
        collections.insert(key.to_ascii_lowercase(), items);
    }
    collections
}

/// Picks the resource collection a URL addresses: the last path segment
/// before the query string, matched against plural names.
fn resolve_collection<'a>(schema: &'a SchemaSet, url: &str) -> Option<&'a ResourceDef> {
    let path = url.split('?').next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    schema
        .resources()
        .find(|def| def.plural_name.eq_ignore_ascii_case(segment))
}

/// Runs one query URL against the loaded data and renders the envelope.
/// Failures are reported to stderr, with span labels when the failing
/// stage has one.
fn run_url(bench: &Workbench, url: &str) -> Option<serde_json::Value> {
    let options = match QueryOptions::from_url(url) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return None;
        }
    };

    let root = match resolve_collection(&bench.schema, url) {
        Some(def) => def,
        None => {
            let known: Vec<String> = bench
                .schema
                .resources()
                .map(|def| format!("/{}", def.plural_name.to_ascii_lowercase()))
                .collect();
            eprintln!("No collection matches '{}'", url.split('?').next().unwrap_or(url));
            eprintln!("Known collections: {}", known.join(", "));
            return None;
        }
    };

    let plan = match compile_query(&bench.schema, root, &options) {
        Ok(plan) => plan,
        Err(error) => {
            report_query_error(&bench.schema, root, &options, &error);
            return None;
        }
    };

    let empty = Vec::new();
    let items = bench
        .collections
        .get(&root.plural_name.to_ascii_lowercase())
        .unwrap_or(&empty);

    match execute(&bench.schema, &plan, items) {
        Ok(result) => match serde_json::to_value(result.envelope()) {
            Ok(json) => Some(json),
            Err(e) => {
                eprintln!("Error rendering envelope: {}", e);
                None
            }
        },
        Err(error) => {
            eprintln!("Error [{}]: {}", error.code(), error);
            None
        }
    }
}

fn report_query_error(
    schema: &SchemaSet,
    root: &ResourceDef,
    options: &QueryOptions,
    error: &QueryError,
) {
    let span = match error {
        QueryError::Parse(e) => Some(e.span()),
        QueryError::Bind(e) => Some(e.span()),
        _ => None,
    };
    match (span, failing_text(schema, root, options)) {
        (Some(span), Some(text)) => report_span_error(text, &error.to_string(), span),
        _ => eprintln!("Error [{}]: {}", error.code(), error),
    }
}

/// Spans are relative to one of the text options, not the URL. Recheck
/// them in compile order to recover which text the error labels.
fn failing_text<'a>(
    schema: &SchemaSet,
    root: &ResourceDef,
    options: &'a QueryOptions,
) -> Option<&'a str> {
    if let Some(filter) = options.filter.as_deref() {
        let broken = match charter_parser::parse_filter(filter) {
            Ok(node) => charter_binder::bind_predicate(schema, root, &node).is_err(),
            Err(_) => true,
        };
        if broken {
            return Some(filter);
        }
    }
    if let Some(order) = options.order_by.as_deref() {
        let broken = match charter_parser::parse_order_by(order) {
            Ok(clauses) => charter_binder::bind_order_by(schema, root, &clauses).is_err(),
            Err(_) => true,
        };
        if broken {
            return Some(order);
        }
    }
    None
}

fn report_span_error(text: &str, message: &str, span: Span) {
    let id = "query".to_string();
    Report::build(ReportKind::Error, id.clone(), span.start)
        .with_message(message)
        .with_label(
            Label::new((id.clone(), span.start..span.end))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((id, Source::from(text)))
        .unwrap();
}
