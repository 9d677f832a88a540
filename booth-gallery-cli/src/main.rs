mod commands;
mod store;

use anyhow::Result;
use booth_gallery_core::GalleryPlugin;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "booth-gallery")]
#[command(about = "Photobooth gallery: thumbnails, manifest and HTML gallery for captured pictures", long_about = None)]
struct Cli {
    /// Booth configuration file (INI)
    #[arg(short, long, global = true, env = "BOOTH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one captured picture, as the booth does after each shot
    Capture {
        /// Picture file
        picture: PathBuf,

        /// QR code already produced for this picture
        #[arg(long)]
        qrcode: Option<PathBuf>,

        /// Booth output directory, searched for the QR code
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Process every picture already in a directory
    Backfill {
        /// Picture directory
        dir: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Do not wait for QR code files
        #[arg(long)]
        no_wait: bool,
    },

    /// Regenerate the gallery page from an existing manifest
    Render {
        /// Picture directory holding the manifest
        dir: PathBuf,
    },

    /// Print the gallery options with their defaults
    Options,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booth_gallery=info,booth_gallery_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Options = cli.command {
        commands::options::execute();
        return Ok(());
    }

    let store = store::load(cli.config.as_deref())?;
    let plugin = GalleryPlugin::startup(&store);

    let result = match cli.command {
        Commands::Capture {
            picture,
            qrcode,
            output_dir,
        } => commands::capture::execute(&plugin, picture, qrcode, output_dir),
        Commands::Backfill {
            dir,
            recursive,
            no_wait,
        } => commands::backfill::execute(&plugin, dir, recursive, no_wait),
        Commands::Render { dir } => commands::render::execute(&plugin, dir),
        Commands::Options => Ok(()),
    };

    plugin.cleanup();
    result
}
