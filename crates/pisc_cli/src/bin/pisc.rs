use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use pisc_core::schema::{Schema, TableSchema};
use pisc_entry::{
    wire::{TableEntry, UpdateType, WriteRequest},
    EntryContext, EntryDecoder, RequestAssembler,
};
use pisc_io::{BfRtSchemaLoader, SchemaLoader};

#[derive(Parser)]
#[command(name = "pisc", version)]
#[command(about = "Build and inspect match-action table entries", long_about = None)]
struct Cli {
    /// BfRt JSON description of the device pipeline
    #[arg(short, long, env = "PISC_SCHEMA")]
    schema: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FlowArgs {
    table: String,
    action: String,

    /// Match key values in schema order, e.g. "10.0.0.0/8,0x0800/0xffff"
    #[arg(short = 'm', long = "match-keys", value_delimiter = ',')]
    keys: Vec<String>,

    /// Action parameter values in schema order
    #[arg(short = 'a', long = "action-values", value_delimiter = ',')]
    values: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the INSERT request of a new entry
    SetFlow(FlowArgs),

    /// Print the MODIFY request of an existing entry
    ModFlow(FlowArgs),

    /// Print DELETE requests, for one key or for entries of a read response
    DelFlow(DelFlowArgs),

    /// Print the entries of a read response with schema names
    Dump {
        table: String,

        /// Read response of the table, a JSON list of entries
        #[arg(long)]
        entries: PathBuf,

        /// Only print the number of entries
        #[arg(short, long)]
        count: bool,
    },

    /// Print the keys, actions and data fields of a table
    Info {
        table: String,

        /// Print the table schema as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the names of all tables
    Table,
}

#[derive(Args)]
struct DelFlowArgs {
    /// Table to delete from, not used by --reset
    #[arg(required_unless_present = "reset")]
    table: Option<String>,

    /// Match key values of the entry to delete
    #[arg(short = 'm', long = "match-keys", value_delimiter = ',', conflicts_with = "entries")]
    keys: Vec<String>,

    /// Read response, a JSON list of entries
    #[arg(long)]
    entries: Option<PathBuf>,

    /// Delete every entry of the table
    #[arg(short, long, requires = "entries", conflicts_with = "entry")]
    all: bool,

    /// Delete the entries with these numbers, as printed by `dump`
    #[arg(short, long, value_delimiter = ',', requires = "entries")]
    entry: Vec<usize>,

    /// Delete every entry of the ingress and egress tables found in the read response
    #[arg(short, long, requires = "entries", conflicts_with_all = ["table", "all", "entry"])]
    reset: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Literals are whitespace-insensitive, "10.0.0.1 / 255.0.0.0" is "10.0.0.1/255.0.0.0". Empty
/// literals are kept so they fail at their own position.
fn normalize(literals: Vec<String>) -> Vec<String> {
    literals
        .into_iter()
        .map(|l| l.split_whitespace().collect::<String>())
        .collect()
}

fn find_table<'s>(schema: &'s Schema, name: &str) -> Result<&'s TableSchema> {
    schema
        .table(name)
        .ok_or_else(|| anyhow!("table {name} not found (or ambiguous)"))
}

fn read_response(path: &Path) -> Result<Vec<TableEntry>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("decode entries from {}", path.display()))
}

fn read_entries(path: &Path, table: &TableSchema) -> Result<Vec<TableEntry>> {
    let entries = read_response(path)?;
    let total = entries.len();
    let entries: Vec<_> = entries
        .into_iter()
        .filter(|e| e.table_id == table.id)
        .collect();
    if entries.len() != total {
        warn!(
            table = %table.name,
            skipped = total - entries.len(),
            "entries of other tables skipped"
        );
    }
    Ok(entries)
}

fn print_request(req: &WriteRequest) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(req)?);
    Ok(())
}

fn flow(schema: &Schema, update_type: UpdateType, args: FlowArgs) -> Result<()> {
    let table = find_table(schema, &args.table)?;
    let action = table
        .action(&args.action)
        .ok_or_else(|| anyhow!("action {} not found in table {}", args.action, table.name))?;
    let ctx = EntryContext::new(table).with_action(action);
    let keys = normalize(args.keys);
    let values = normalize(args.values);
    let req = RequestAssembler::write_request(&ctx, update_type, &keys, &values)
        .with_context(|| format!("build {update_type:?} request for table {}", table.name))?;
    print_request(&req)
}

fn del_flow(schema: &Schema, args: DelFlowArgs) -> Result<()> {
    if args.reset {
        let path = args.entries.context("--reset needs --entries")?;
        let req = WriteRequest::reset(schema, &read_response(&path)?);
        debug!(updates = req.len(), "reset request built");
        return print_request(&req);
    }

    let name = args.table.context("missing table name")?;
    let table = find_table(schema, &name)?;
    let Some(path) = args.entries else {
        let ctx = EntryContext::new(table);
        let keys = normalize(args.keys);
        let none: Vec<String> = vec![];
        let req = RequestAssembler::write_request(&ctx, UpdateType::Delete, &keys, &none)
            .with_context(|| format!("build DELETE request for table {}", table.name))?;
        return print_request(&req);
    };

    let entries = read_entries(&path, table)?;
    let req = if args.all {
        WriteRequest::delete_all(table.id, &entries)
    } else if !args.entry.is_empty() {
        let (req, missing) = WriteRequest::delete_positions(table.id, &entries, &args.entry);
        for pos in missing {
            eprintln!("Entry number {pos} not found");
        }
        req
    } else {
        bail!("--entries needs --all or --entry");
    };
    debug!(table = %table.name, updates = req.len(), "delete request built");
    print_request(&req)
}

fn dump(schema: &Schema, table: &str, path: PathBuf, count: bool) -> Result<()> {
    let table = find_table(schema, table)?;
    let entries = read_entries(&path, table)?;
    if count {
        println!("Table \"{}\" has {} entries", table.name, entries.len());
        return Ok(());
    }
    for (idx, entry) in entries.iter().enumerate() {
        println!("Entry {idx}");
        print!("{}", EntryDecoder::decode(entry, table));
        println!();
    }
    println!("{} entries in table {}", entries.len(), table.name);
    Ok(())
}

fn info(schema: &Schema, table: &str, json: bool) -> Result<()> {
    let t = find_table(schema, table)?;
    if json {
        println!("{}", serde_json::to_string_pretty(t)?);
        return Ok(());
    }
    println!("Table {} (id {}, {}, size {})", t.name, t.id, t.table_type, t.size);
    println!("Keys");
    for k in &t.keys {
        let kind = k.match_kind.map_or_else(|| "None".to_owned(), |m| m.to_string());
        println!("  {:<32} {:<8} {:>3} bits  id {}", k.name, kind, k.bit_width, k.id);
    }
    println!("Actions");
    for a in &t.actions {
        println!("  {} (id {})", a.name, a.id);
        for p in &a.params {
            println!("    {:<30} {:>3} bits  id {}", p.name, p.bit_width, p.id);
        }
    }
    if !t.data.is_empty() {
        println!("Data");
        for d in &t.data {
            println!("  {:<32} {:>3} bits  id {}", d.name, d.bit_width, d.id);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let schema = BfRtSchemaLoader::default()
        .load_file(&cli.schema)
        .with_context(|| format!("load schema {}", cli.schema.display()))?;
    match cli.command {
        Commands::SetFlow(args) => flow(&schema, UpdateType::Insert, args),
        Commands::ModFlow(args) => flow(&schema, UpdateType::Modify, args),
        Commands::DelFlow(args) => del_flow(&schema, args),
        Commands::Dump {
            table,
            entries,
            count,
        } => dump(&schema, &table, entries, count),
        Commands::Info { table, json } => info(&schema, &table, json),
        Commands::Table => {
            for t in schema.tables() {
                println!("{}", t.name);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
