/// Render treemaps to standalone SVG files without opening a window.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use salesview_rs::layout::compute_layout;
use salesview_rs::loader::{self, Dataset, Source};
use salesview_rs::render::svg::{render_svg, SvgOptions};
use salesview_rs::settings::Settings;
use salesview_rs::tree::TreeNode;
use salesview_rs::ui::labels::LabelStyle;
use salesview_rs::ui::legend::category_colors;

#[derive(Debug, Parser)]
#[command(name = "export-svg", version, about)]
struct Cli {
    /// Published dataset to export
    #[arg(long, value_enum)]
    dataset: Option<Dataset>,

    /// Export every published dataset, fetched in parallel
    #[arg(long, conflicts_with_all = ["dataset", "url", "file"])]
    all: bool,

    #[arg(long, conflicts_with_all = ["dataset", "file"])]
    url: Option<String>,

    #[arg(long, conflicts_with = "dataset")]
    file: Option<PathBuf>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file, or directory with --all
    #[arg(short, long, default_value = "treemap.svg")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("salesview_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };

    if cli.all {
        std::fs::create_dir_all(&cli.output)
            .with_context(|| format!("creating {}", cli.output.display()))?;
        let sources: Vec<Source> = Dataset::ALL.iter().map(|&d| Source::Dataset(d)).collect();
        let results = loader::load_all(&sources);

        let mut failed = 0;
        for (dataset, result) in Dataset::ALL.iter().zip(results) {
            let path = cli.output.join(format!("{}.svg", dataset.slug()));
            let exported = result
                .with_context(|| format!("loading {}", dataset.url()))
                .and_then(|root| {
                    export(&root, &settings, dataset.title(), dataset.description(), &path)
                });
            if let Err(e) = exported {
                tracing::error!("{}: {:#}", dataset.slug(), e);
                failed += 1;
            }
        }
        if failed > 0 {
            anyhow::bail!("{failed} of {} datasets failed to export", Dataset::ALL.len());
        }
        return Ok(());
    }

    let source = if let Some(url) = cli.url {
        Source::Url(url)
    } else if let Some(path) = cli.file {
        Source::File(path)
    } else {
        Source::Dataset(cli.dataset.unwrap_or(settings.dataset))
    };
    let root = loader::load(&source).with_context(|| format!("loading {source}"))?;
    let (title, description) = match &source {
        Source::Dataset(d) => (d.title().to_string(), d.description().to_string()),
        _ => (root.name.clone(), String::new()),
    };
    export(&root, &settings, &title, &description, &cli.output)
}

fn export(
    root: &TreeNode,
    settings: &Settings,
    title: &str,
    description: &str,
    path: &Path,
) -> Result<()> {
    let (w, h) = settings.canvas.treemap_size();
    let (tree, layout) = compute_layout(root, w, h, &settings.layout)
        .with_context(|| format!("laying out '{}'", root.name))?;
    let colors = category_colors(&tree, &layout);

    let options = SvgOptions {
        title: title.to_string(),
        description: description.to_string(),
        canvas: settings.canvas.clone(),
        labels: settings
            .show_labels
            .then(|| LabelStyle::for_font_size(settings.label_font_size)),
        ..SvgOptions::default()
    };
    let svg = render_svg(&tree, &layout, &colors, &options).context("formatting SVG")?;
    std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(
        "Wrote {} ({} tiles, {} categories)",
        path.display(),
        layout.leaves().count(),
        colors.len()
    );
    Ok(())
}
