/// Diagnostic tool to verify the data → hierarchy → layout pipeline
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use salesview_rs::layout::{layout_hierarchy, LayoutConfig};
use salesview_rs::loader::{self, Dataset, Source};
use salesview_rs::tree::build_tree;

#[derive(Debug, Parser)]
#[command(name = "debug-layout", about)]
struct Cli {
    /// Local JSON file; defaults to fetching the video game dataset
    file: Option<PathBuf>,

    #[arg(long, default_value_t = 600.0)]
    width: f64,

    #[arg(long, default_value_t = 473.0)]
    height: f64,

    #[arg(long, default_value_t = 1.0)]
    inner_padding: f64,

    /// Snap edges to whole pixels
    #[arg(long)]
    round: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("salesview_rs=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let source = match cli.file {
        Some(path) => Source::File(path),
        None => Source::Dataset(Dataset::VideoGames),
    };

    println!("=== DIAGNOSTIC: Data → Layout Pipeline ===");
    println!("Source: {}", source);

    let root = loader::load(&source)?;
    println!("\n[1] Parsed '{}': {} nodes", root.name, root.count());

    let tree = build_tree(&root)?;
    let root_node = tree.get(tree.root);
    println!(
        "\n[2] Hierarchy built: {} nodes, total value {:.2}, height {}",
        tree.len(),
        root_node.aggregate,
        root_node.height
    );

    println!("\n[3] Top 10 categories:");
    for (i, child_id) in tree.children(tree.root).take(10).enumerate() {
        let child = tree.get(child_id);
        println!(
            "    [{}] '{}' - value: {:.2} ({} children)",
            i,
            child.name,
            child.aggregate,
            tree.children(child_id).count()
        );
    }

    let config = LayoutConfig {
        inner_padding: cli.inner_padding,
        round: cli.round,
        ..LayoutConfig::default()
    };
    let layout = layout_hierarchy(&tree, cli.width, cli.height, &config)?;
    println!("\n[4] Layout computed: {} rectangles", layout.len());

    println!("\n[5] Top 10 largest leaves by area:");
    let mut leaves: Vec<_> = layout.leaves().collect();
    leaves.sort_by(|a, b| b.area().total_cmp(&a.area()));
    for (i, rect) in leaves.iter().take(10).enumerate() {
        let node = tree.get(rect.node);
        println!(
            "    [{}] '{}' - rect: {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1}) - value: {:.2}",
            i,
            node.name,
            rect.width(),
            rect.height(),
            rect.area(),
            rect.x0,
            rect.y0,
            rect.value
        );
    }

    println!("\n[6] Checking for anomalies:");
    let viewport_area = cli.width * cli.height;
    let leaf_area: f64 = leaves.iter().map(|r| r.area()).sum();
    println!("    Total leaf area: {:.0}px²", leaf_area);
    println!("    Viewport area:   {:.0}px²", viewport_area);
    println!("    Coverage: {:.1}%", (leaf_area / viewport_area) * 100.0);

    // Only meaningful without padding or rounding.
    let total = root_node.aggregate;
    let worst = leaves
        .iter()
        .map(|r| (r.area() / viewport_area - r.value / total).abs())
        .fold(0.0f64, f64::max);
    println!("    Worst area/value deviation: {:.4}%", worst * 100.0);

    let tolerance = if cli.round { 0.5 } else { 1e-6 };
    println!(
        "    Containment: {}",
        if layout.is_contained(tolerance) { "ok" } else { "VIOLATED" }
    );
    match layout.find_overlap(tolerance) {
        None => println!("    Sibling overlap: none"),
        Some((a, b)) => println!(
            "    Sibling overlap: '{}' and '{}'",
            tree.get(layout.nodes[a].node).name,
            tree.get(layout.nodes[b].node).name
        ),
    }

    let degenerate = leaves.iter().filter(|r| r.width() <= 0.0 || r.height() <= 0.0).count();
    println!("\n[7] Collapsed leaves (zero width or height): {}", degenerate);

    Ok(())
}
