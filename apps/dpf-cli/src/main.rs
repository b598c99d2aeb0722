use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dpf_core::{Location, Scoping};
use dpf_model::{Model, ModelResult};
use dpf_results::FieldsContainer;
use dpf_server::{DpfServer, ServerAddress, ServerConnection};
use tracing::info;

#[derive(Parser)]
#[command(name = "dpf")]
#[command(about = "Inspect and post-process finite-element result files", long_about = None)]
struct Cli {
    /// Open files through a running server (host:port) instead of in-process
    #[arg(long, global = true)]
    server: Option<ServerAddress>,
    /// Log debug messages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the model summary: results, mesh and time steps
    Describe {
        /// Path to the result file
        path: PathBuf,
    },
    /// Print mesh statistics and named selections
    Mesh {
        /// Path to the result file
        path: PathBuf,
    },
    /// Print one element of the mesh
    Element {
        /// Path to the result file
        path: PathBuf,
        /// Element id
        id: u32,
    },
    /// Print the time/frequency steps
    TimeFreq {
        /// Path to the result file
        path: PathBuf,
    },
    /// List available results
    Results {
        /// Path to the result file
        path: PathBuf,
    },
    /// Evaluate a result
    Eval(EvalArgs),
    /// Serve result files to remote clients
    Serve {
        /// Address to bind (defaults to DPF_IP or 127.0.0.1)
        #[arg(long)]
        ip: Option<String>,
        /// Port to bind (defaults to DPF_PORT or 50054)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args)]
struct EvalArgs {
    /// Path to the result file
    path: PathBuf,
    /// Result name or code (e.g. displacement, U)
    result: String,
    /// Evaluate on every time set
    #[arg(long, conflicts_with_all = ["set", "time"])]
    all_sets: bool,
    /// Cumulative set indices, 1-based
    #[arg(long, value_delimiter = ',', conflicts_with = "time")]
    set: Vec<usize>,
    /// Time or frequency values, interpolated between sets
    #[arg(long, value_delimiter = ',')]
    time: Vec<f64>,
    /// Restrict to these node ids
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["elements", "named_selection"])]
    nodes: Vec<u32>,
    /// Restrict to these element ids
    #[arg(long, value_delimiter = ',', conflicts_with = "named_selection")]
    elements: Vec<u32>,
    /// Restrict to a named selection of the mesh
    #[arg(long)]
    named_selection: Option<String>,
    /// Output location (Nodal, Elemental, ElementalNodal)
    #[arg(long)]
    location: Option<Location>,
    /// Split the output fields
    #[arg(long, value_enum)]
    split: Option<SplitArg>,
    /// Print values as CSV
    #[arg(long)]
    csv: bool,
    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    Shape,
    Body,
}

fn main() -> ModelResult<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let server = cli.server.as_ref();
    match cli.command {
        Commands::Describe { path } => cmd_describe(server, &path),
        Commands::Mesh { path } => cmd_mesh(server, &path),
        Commands::Element { path, id } => cmd_element(server, &path, id),
        Commands::TimeFreq { path } => cmd_time_freq(server, &path),
        Commands::Results { path } => cmd_results(server, &path),
        Commands::Eval(args) => cmd_eval(server, &args),
        Commands::Serve { ip, port } => cmd_serve(ip, port),
    }
}

fn open_model(server: Option<&ServerAddress>, path: &Path) -> ModelResult<Model> {
    match server {
        Some(address) => {
            let connection: Arc<ServerConnection> = ServerConnection::connect(address)?;
            Ok(connection.open_model(path)?)
        }
        None => Model::open(path),
    }
}

fn cmd_describe(server: Option<&ServerAddress>, path: &Path) -> ModelResult<()> {
    let model = open_model(server, path)?;
    print!("{}", model.describe()?);
    Ok(())
}

fn cmd_mesh(server: Option<&ServerAddress>, path: &Path) -> ModelResult<()> {
    let model = open_model(server, path)?;
    let mesh = model.metadata().meshed_region()?;
    println!("{mesh}");

    let mut counts: Vec<_> = mesh.element_type_counts().into_iter().collect();
    counts.sort_by_key(|(ty, _)| ty.to_string());
    println!("\nElement types:");
    for (ty, count) in counts {
        println!("  {ty}: {count}");
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "\nBounding box: [{:.6}, {:.6}, {:.6}] - [{:.6}, {:.6}, {:.6}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let names = mesh.available_named_selections();
    if names.is_empty() {
        println!("\nNo named selections");
    } else {
        println!("\nNamed selections:");
        for name in names {
            let scoping = mesh.named_selection(name)?;
            println!("  {name} ({} {} ids)", scoping.len(), scoping.location());
        }
    }
    Ok(())
}

fn cmd_element(server: Option<&ServerAddress>, path: &Path, id: u32) -> ModelResult<()> {
    let model = open_model(server, path)?;
    let mesh = model.metadata().meshed_region()?;
    let element = mesh.element_by_id(id)?;
    print!("{element}");
    println!("\tNode ids:     {:?}", mesh.element_node_ids(element));
    Ok(())
}

fn cmd_time_freq(server: Option<&ServerAddress>, path: &Path) -> ModelResult<()> {
    let model = open_model(server, path)?;
    print!("{}", model.metadata().time_freq_support()?);
    Ok(())
}

fn cmd_results(server: Option<&ServerAddress>, path: &Path) -> ModelResult<()> {
    let model = open_model(server, path)?;
    print!("{}", model.metadata().result_info());
    Ok(())
}

fn cmd_eval(server: Option<&ServerAddress>, args: &EvalArgs) -> ModelResult<()> {
    let model = open_model(server, &args.path)?;
    let mut query = model.results().get(&args.result)?;

    if args.all_sets {
        query = query.on_all_time_freqs();
    } else if !args.set.is_empty() {
        query = query.on_time_scoping(args.set.clone());
    } else if !args.time.is_empty() {
        query = query.on_time_scoping(args.time.clone());
    }

    if !args.nodes.is_empty() {
        query = query.on_mesh_scoping(Scoping::nodal(args.nodes.iter().copied()));
    } else if !args.elements.is_empty() {
        query = query.on_mesh_scoping(Scoping::elemental(args.elements.iter().copied()));
    } else if let Some(name) = &args.named_selection {
        query = query.on_named_selection(name.clone());
    }

    if let Some(location) = args.location {
        query = query.on_location(location);
    }
    query = match args.split {
        Some(SplitArg::Shape) => query.split_by_shape(),
        Some(SplitArg::Body) => query.split_by_body(),
        None => query,
    };

    let container = query.eval()?;
    let text = if args.csv {
        to_csv(&container)
    } else {
        container.to_string()
    };

    if let Some(output) = &args.output {
        std::fs::write(output, text)?;
        println!(
            "✓ Wrote {} field(s) to {}",
            container.len(),
            output.display()
        );
    } else {
        print!("{text}");
    }
    Ok(())
}

/// One row per entity: the label values, the id, then every value of the entity.
fn to_csv(container: &FieldsContainer) -> String {
    let mut csv = String::new();
    for label in container.labels() {
        csv.push_str(label);
        csv.push(',');
    }
    csv.push_str("id,values\n");
    for (label_space, field) in container.iter() {
        let labels: String = container
            .labels()
            .iter()
            .map(|label| {
                label_space
                    .get(label)
                    .map(|value| format!("{value},"))
                    .unwrap_or_else(|| ",".to_string())
            })
            .collect();
        for (id, values) in field.iter() {
            let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            csv.push_str(&format!("{labels}{id},{}\n", values.join(",")));
        }
    }
    csv
}

fn cmd_serve(ip: Option<String>, port: Option<u16>) -> ModelResult<()> {
    let mut address = ServerAddress::from_env()?;
    if let Some(ip) = ip {
        address.ip = ip;
    }
    if let Some(port) = port {
        address.port = port;
    }
    let server = DpfServer::bind(&address)?;
    info!(address = %server.local_addr(), "serving result files");
    server.run()?;
    Ok(())
}
