//! CLI binary for dungeon layouts: create rooms, wire corridors, check and export.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dungeon_core::catalog::RoomTypeCatalog;
use dungeon_core::config::DungeonConfig;
use dungeon_core::export::{ExportFormat, short_id};
use dungeon_core::graph::LayoutGraph;
use dungeon_core::integrity::{self, Severity};
use dungeon_core::mutator::GraphMutator;
use dungeon_core::storage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dungeon-layout", about = "Dungeon layout graph editor")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new layout holding only the entrance
    Init {
        /// Layout name
        name: String,

        /// Overwrite an existing layout with the same name
        #[arg(long)]
        force: bool,
    },

    /// List saved layouts
    List,

    /// List room types from the active catalog
    Types {
        /// Include types hidden from the type picker
        #[arg(long)]
        all: bool,
    },

    /// Add a room (entrance if the layout is empty, unassigned otherwise)
    Add {
        layout: String,

        /// Room type name
        #[arg(short, long = "type")]
        room_type: Option<String>,
    },

    /// Connect two rooms (parent -> child)
    Connect {
        layout: String,
        from: String,
        to: String,
    },

    /// Remove the edge parent -> child
    Disconnect {
        layout: String,
        parent: String,
        child: String,
    },

    /// Change a room's type
    Retype {
        layout: String,
        node: String,
        room_type: String,
    },

    /// Delete rooms and every edge touching them
    Delete {
        layout: String,
        #[arg(required = true)]
        nodes: Vec<String>,
    },

    /// Delete the edges among the given rooms, keeping the rooms
    Unlink {
        layout: String,
        #[arg(required = true)]
        nodes: Vec<String>,
    },

    /// Print rooms and edges
    Show {
        layout: String,

        /// Print the stored JSON document instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check layout integrity (symmetry, single parent, boss count, etc.)
    Validate { layout: String },

    /// Export layout as DOT (Graphviz) or Mermaid flowchart
    Export {
        layout: String,

        /// Output format: dot, mermaid
        #[arg(short, long, default_value = "dot")]
        format: String,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

/// Config and catalog for one invocation.
struct Project {
    root: PathBuf,
    config: DungeonConfig,
    catalog: RoomTypeCatalog,
}

impl Project {
    fn open(root: &Path) -> Result<Self> {
        let config = DungeonConfig::load(root)?;
        let catalog = config.load_catalog(root)?;
        tracing::debug!(
            root = %root.display(),
            max_child_corridors = config.layout.max_child_corridors,
            room_types = catalog.all_types().len(),
            "opened project"
        );
        Ok(Self {
            root: root.to_path_buf(),
            config,
            catalog,
        })
    }

    fn mutator(&self) -> GraphMutator<'_> {
        GraphMutator::new(&self.catalog, &self.config.layout)
    }

    fn load(&self, name: &str) -> Result<LayoutGraph> {
        if !storage::layout_exists(&self.root, name) {
            anyhow::bail!("No layout named '{name}'. Run `dungeon-layout init {name}` first.");
        }
        storage::load(&self.root, name)
    }

    fn save(&self, graph: &LayoutGraph) -> Result<()> {
        storage::save(&self.root, graph, &self.config.storage)
    }
}

/// Resolve each argument to a full node id.
fn resolve_all(graph: &LayoutGraph, args: &[String]) -> Result<Vec<String>> {
    args.iter().map(|arg| resolve(graph, arg)).collect()
}

fn resolve(graph: &LayoutGraph, arg: &str) -> Result<String> {
    Ok(graph.resolve_prefix(arg)?.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let project = Project::open(&project_root)?;

    match cli.command {
        Commands::Init { name, force } => cmd_init(&project, &name, force),
        Commands::List => cmd_list(&project),
        Commands::Types { all } => {
            cmd_types(&project, all);
            Ok(())
        }
        Commands::Add { layout, room_type } => cmd_add(&project, &layout, room_type.as_deref()),
        Commands::Connect { layout, from, to } => cmd_connect(&project, &layout, &from, &to),
        Commands::Disconnect {
            layout,
            parent,
            child,
        } => cmd_disconnect(&project, &layout, &parent, &child),
        Commands::Retype {
            layout,
            node,
            room_type,
        } => cmd_retype(&project, &layout, &node, &room_type),
        Commands::Delete { layout, nodes } => cmd_delete(&project, &layout, &nodes),
        Commands::Unlink { layout, nodes } => cmd_unlink(&project, &layout, &nodes),
        Commands::Show { layout, json } => cmd_show(&project, &layout, json),
        Commands::Validate { layout } => cmd_validate(&project, &layout),
        Commands::Export { layout, format } => cmd_export(&project, &layout, &format),
    }
}

fn cmd_init(project: &Project, name: &str, force: bool) -> Result<()> {
    storage::validate_name(name)?;
    if storage::layout_exists(&project.root, name) && !force {
        anyhow::bail!("Layout '{name}' already exists. Use --force to overwrite it.");
    }

    let mut graph = LayoutGraph::new(name);
    let entrance = project.mutator().create_default_node(&mut graph)?;
    project.save(&graph)?;

    eprintln!("Created layout '{name}'");
    println!("{entrance}");
    Ok(())
}

fn cmd_list(project: &Project) -> Result<()> {
    let names = storage::list(&project.root)?;
    if names.is_empty() {
        eprintln!("No layouts found. Run `dungeon-layout init <name>` to create one.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn cmd_types(project: &Project, all: bool) {
    let types: Vec<_> = if all {
        project.catalog.all_types().iter().collect()
    } else {
        project.catalog.displayable_types()
    };
    for ty in types {
        let hidden = if ty.displayable { "" } else { " (hidden)" };
        println!("{:<16} {}{hidden}", ty.name, ty.kind);
    }
}

fn cmd_add(project: &Project, layout: &str, room_type: Option<&str>) -> Result<()> {
    let mut graph = project.load(layout)?;
    let mutator = project.mutator();
    let id = match room_type {
        Some(ty) => mutator.create_node(&mut graph, ty)?,
        None => mutator.create_default_node(&mut graph)?,
    };
    project.save(&graph)?;

    if let Some(node) = graph.get_node(&id) {
        eprintln!("Added {} room", node.room_type);
    }
    println!("{id}");
    Ok(())
}

fn cmd_connect(project: &Project, layout: &str, from: &str, to: &str) -> Result<()> {
    let mut graph = project.load(layout)?;
    let from = resolve(&graph, from)?;
    let to = resolve(&graph, to)?;

    project.mutator().connect(&mut graph, &from, &to)?;
    project.save(&graph)?;

    println!("{} -> {}", short_id(&from), short_id(&to));
    Ok(())
}

fn cmd_disconnect(project: &Project, layout: &str, parent: &str, child: &str) -> Result<()> {
    let mut graph = project.load(layout)?;
    let parent = resolve(&graph, parent)?;
    let child = resolve(&graph, child)?;

    if project
        .mutator()
        .disconnect_edge(&mut graph, &parent, &child)?
    {
        project.save(&graph)?;
        println!("{} -/- {}", short_id(&parent), short_id(&child));
    } else {
        eprintln!(
            "No edge {} -> {}; layout unchanged.",
            short_id(&parent),
            short_id(&child)
        );
    }
    Ok(())
}

fn cmd_retype(project: &Project, layout: &str, node: &str, room_type: &str) -> Result<()> {
    let mut graph = project.load(layout)?;
    let node = resolve(&graph, node)?;

    let outcome = project.mutator().retype(&mut graph, &node, room_type)?;
    project.save(&graph)?;

    println!(
        "{}: {} -> {room_type}",
        short_id(&node),
        outcome.previous_type
    );
    for child in &outcome.severed {
        eprintln!("  severed edge to {}", short_id(child));
    }
    if let Some(parent) = &outcome.detached_parent {
        eprintln!("  detached from parent {}", short_id(parent));
    }
    Ok(())
}

fn cmd_delete(project: &Project, layout: &str, nodes: &[String]) -> Result<()> {
    let mut graph = project.load(layout)?;
    let ids = resolve_all(&graph, nodes)?;
    let mutator = project.mutator();

    // A single target surfaces the entrance refusal as an error.
    let outcome = if let [only] = ids.as_slice() {
        mutator.delete_node(&mut graph, only)?
    } else {
        let selected: HashSet<&str> = ids.iter().map(String::as_str).collect();
        mutator.delete_nodes(&mut graph, |n| selected.contains(n.id.as_str()))?
    };
    if !outcome.removed.is_empty() {
        project.save(&graph)?;
    }

    for id in &outcome.removed {
        println!("deleted {}", short_id(id));
    }
    for id in &outcome.protected {
        eprintln!("skipped entrance {}", short_id(id));
    }
    if !outcome.touched.is_empty() {
        eprintln!("  {} neighbouring room(s) lost an edge", outcome.touched.len());
    }
    Ok(())
}

fn cmd_unlink(project: &Project, layout: &str, nodes: &[String]) -> Result<()> {
    let mut graph = project.load(layout)?;
    let ids = resolve_all(&graph, nodes)?;
    let selected: HashSet<&str> = ids.iter().map(String::as_str).collect();

    let removed = project
        .mutator()
        .delete_selected_links(&mut graph, |n| selected.contains(n.id.as_str()));
    if removed.is_empty() {
        eprintln!("No edges among the selected rooms; layout unchanged.");
        return Ok(());
    }
    project.save(&graph)?;

    for edge in &removed {
        println!("{} -/- {}", short_id(&edge.parent), short_id(&edge.child));
    }
    Ok(())
}

fn cmd_show(project: &Project, layout: &str, json: bool) -> Result<()> {
    let graph = project.load(layout)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("=== Layout: {} ===", graph.name);
    println!(
        "  {} rooms, {} edges, updated {}",
        graph.len(),
        graph.edges().len(),
        graph.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    for node in graph.all_nodes() {
        let parent = node
            .parent_ids
            .first()
            .map_or("-", |p| short_id(p));
        let children: Vec<&str> = node.child_ids.iter().map(|c| short_id(c)).collect();
        println!(
            "  {}  {:<14} parent: {:<8}  children: [{}]",
            short_id(&node.id),
            node.room_type,
            parent,
            children.join(", ")
        );
    }
    Ok(())
}

fn cmd_validate(project: &Project, layout: &str) -> Result<()> {
    let graph = project.load(layout)?;
    let issues = integrity::check(&graph, &project.catalog);

    for issue in &issues {
        match &issue.node {
            Some(node) => println!("{}: {} ({})", issue.severity, issue.message, short_id(node)),
            None => println!("{}: {}", issue.severity, issue.message),
        }
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    if issues.is_empty() {
        eprintln!("Layout is valid. No integrity issues found.");
        eprintln!("  {} rooms, {} edges", graph.len(), graph.edges().len());
    } else {
        eprintln!(
            "\nFound {} integrity issue(s), {errors} error(s).",
            issues.len()
        );
    }

    if integrity::has_errors(&issues) {
        anyhow::bail!("layout '{layout}' failed validation");
    }
    Ok(())
}

fn cmd_export(project: &Project, layout: &str, format: &str) -> Result<()> {
    let graph = project.load(layout)?;
    let export_format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;

    let output = dungeon_core::export::export(&graph, &project.catalog, export_format);
    print!("{output}");
    Ok(())
}
