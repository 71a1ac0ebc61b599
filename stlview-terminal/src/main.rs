//! stlview - STL viewer files from the command line
//!
//! Preview a viewer file in the terminal, print what it loads, or generate
//! the HTML snippet that embeds it in a page.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stlview_core::embed::{embed_html, EmbedOptions, DEFAULT_HEIGHT_PX, DEFAULT_MODULE_URL};
use stlview_core::{load_models, LoadedScene, VariantKind, ViewerConfig, ViewerVariant};
use stlview_terminal::config::load_viewer_file;
use stlview_terminal::{FsSource, TerminalApp};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "stlview")]
#[command(about = "Preview and embed STL model viewers")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a viewer file in the terminal
    Preview {
        /// Viewer file (.toml or .json)
        file: PathBuf,

        /// Override the viewer variant (top-down, turntable)
        #[arg(long)]
        variant: Option<VariantKind>,

        /// Override the top-down rotation angle in degrees
        #[arg(long)]
        alpha: Option<f32>,
    },
    /// Load a viewer file and print its scene summary
    Info {
        /// Viewer file (.toml or .json)
        file: PathBuf,
    },
    /// Write the HTML snippet that mounts the viewer in a page
    Embed {
        /// Viewer file (.toml or .json)
        file: PathBuf,

        /// URL of the viewer's wasm JS module
        #[arg(long, default_value = DEFAULT_MODULE_URL)]
        module_url: String,

        /// Container height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT_PX)]
        height: u32,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Preview { file, variant, alpha } => {
            let mut config = load_viewer_file(&file)?;
            if let Some(variant) = variant {
                config.variant = variant;
            }
            if let Some(alpha) = alpha {
                config.alpha = alpha;
            }

            let variant = config.viewer_variant();
            let scene = load_scene(&file, &config)?;

            let mut app = TerminalApp::new(scene, variant)?;
            app.run()?;
        }
        Command::Info { file } => {
            let config = load_viewer_file(&file)?;
            let scene = load_scene(&file, &config)?;
            let size = scene.size();
            let center = scene.center();

            println!("Viewer: {} ({} models configured)", config.variant, config.models.len());
            for object in &scene.objects {
                println!(
                    "  - {}: {} triangles, {} outline edges",
                    object.label,
                    object.mesh.triangles.len(),
                    object.edges.segments.len()
                );
            }
            println!("Size:   {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
            println!("Center: ({:.3}, {:.3}, {:.3})", center.x, center.y, center.z);
        }
        Command::Embed {
            file,
            module_url,
            height,
            output,
        } => {
            let config = load_viewer_file(&file)?;
            let options = EmbedOptions {
                module_url,
                height_px: height,
            };
            let html = embed_html(&config.models, &config.viewer_variant(), &options)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Wrote embed snippet");
                }
                None => print!("{html}"),
            }
        }
    }

    Ok(())
}

/// Load every model of `config`, resolving paths next to the viewer file
fn load_scene(file: &Path, config: &ViewerConfig) -> Result<LoadedScene> {
    let root = file.parent().unwrap_or_else(|| Path::new("."));
    let source = FsSource::new(root);
    let variant: ViewerVariant = config.viewer_variant();
    let scene = pollster::block_on(load_models(&source, &config.models, &variant))
        .with_context(|| format!("Failed to load models of {}", file.display()))?;
    Ok(scene)
}
