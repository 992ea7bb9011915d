use clap::{Parser, Subcommand, ValueEnum};
use mapflow::mapping::MappingKind;
use mapflow::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindCli {
    Request,
    Response,
    Fault,
}

impl From<KindCli> for MessageKind {
    fn from(kind: KindCli) -> Self {
        match kind {
            KindCli::Request => MessageKind::Request,
            KindCli::Response => MessageKind::Response,
            KindCli::Fault => MessageKind::Fault,
        }
    }
}

/// Inspect message structures and build field mappings between them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the part of a combined XML structure that belongs to one message kind
    Filter {
        /// Path to the XML structure
        path: String,
        #[arg(short, long, value_enum, default_value = "request")]
        kind: KindCli,
    },
    /// Print the field tree of an XML sample or JSON schema
    Tree {
        /// Path to the structure document
        path: String,
        #[arg(short, long, value_enum, default_value = "request")]
        kind: KindCli,
    },
    /// Map a source structure onto a target structure by field name
    Automap {
        /// Path to the source structure
        source: String,
        /// Path to the target structure
        target: String,
        #[arg(short, long, value_enum, default_value = "request")]
        kind: KindCli,
        /// Pick the first same-named target even if another one has the same type
        #[arg(long)]
        ignore_types: bool,
        /// Only match leaf fields
        #[arg(long)]
        leaves_only: bool,
        /// Write the exported mappings to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Summarize an exported mapping file
    Mappings {
        /// Path to the mapping export
        path: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Filter { path, kind } => run_filter(&path, kind.into()),
        Command::Tree { path, kind } => run_tree(&path, kind.into()),
        Command::Automap {
            source,
            target,
            kind,
            ignore_types,
            leaves_only,
            output,
        } => {
            let options = MatchOptions {
                prefer_same_type: !ignore_types,
                include_structural: !leaves_only,
            };
            run_automap(&source, &target, kind.into(), options, output)
        }
        Command::Mappings { path } => run_mappings(&path),
    }
}

fn run_filter(path: &str, kind: MessageKind) {
    let xml = read_file(path);
    println!("{}", filter_xml_by_message_type(&xml, kind));
}

fn run_tree(path: &str, kind: MessageKind) {
    let mut workspace = MappingWorkspace::new(kind);
    let document = read_file(path);
    let tree = workspace
        .load_source(&document)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)));
    for root in tree {
        print_node(root, 0);
    }
}

fn print_node(node: &FieldNode, depth: usize) {
    println!("{}{} ({})", "  ".repeat(depth), node.name, node.field_type);
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn run_automap(
    source_path: &str,
    target_path: &str,
    kind: MessageKind,
    options: MatchOptions,
    output: Option<String>,
) {
    let start = Instant::now();
    let mut workspace = MappingWorkspace::new(kind).with_match_options(options);

    let source = read_file(source_path);
    workspace.load_source(&source).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to parse source '{}': {}", source_path, e))
    });
    let target = read_file(target_path);
    workspace.load_target(&target).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to parse target '{}': {}", target_path, e))
    });

    let before = workspace.mappings().len();
    let report = workspace
        .auto_map(None)
        .unwrap_or_else(|e| exit_with_error(&format!("Auto-map failed: {}", e)));
    let json = workspace
        .mappings()
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Export failed: {}", e)));

    match output {
        Some(path) => fs::write(&path, json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", path, e))
        }),
        None => println!("{}", json),
    }

    eprintln!("\n--- Auto-map Summary ---");
    eprintln!("Message kind:   {}", kind);
    eprintln!("Status:         {:?}", report.status);
    eprintln!("Proposed:       {}", report.created());
    eprintln!("Added:          {}", workspace.mappings().len() - before);
    eprintln!("Elapsed:        {:?}", start.elapsed());
}

fn run_mappings(path: &str) {
    let json = read_file(path);
    let set = MappingSet::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));

    for mapping in &set {
        let kind = match mapping.kind() {
            MappingKind::Direct => "direct".to_string(),
            MappingKind::Node { .. } => "node".to_string(),
            MappingKind::VisualFlow => "flow".to_string(),
            MappingKind::Function(function) => format!("fn {}", function.function_name),
        };
        println!(
            "{:<10} {} <- [{}]",
            kind,
            mapping.target_path,
            mapping.source_paths.join(", ")
        );
    }
    println!("\n{} mappings", set.len());
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
