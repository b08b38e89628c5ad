//! `vitrine` command line: open a model in a window or render a thumbnail.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vitrine::asset::{self, AssetSource};
use vitrine::options::Options;
use vitrine::thumbnail::ThumbnailRenderer;
use vitrine::viewer::window::ViewerWindow;
use vitrine::VitrineError;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Preview glTF models and render thumbnails")]
#[command(version)]
struct Cli {
    /// Options preset (TOML). Missing fields use defaults.
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a window showing the model
    View {
        /// Model path or http(s) URL
        location: String,
    },
    /// Render a PNG thumbnail without opening a window
    Thumbnail {
        /// Model path or http(s) URL
        location: String,

        /// Where to write the PNG
        #[arg(short, long, default_value = "thumbnail.png")]
        output: PathBuf,

        /// Also write the `data:image/png;base64,` URL to this file
        #[arg(long)]
        data_url: Option<PathBuf>,

        /// Width in pixels (overrides the preset)
        #[arg(long)]
        width: Option<u32>,

        /// Height in pixels (overrides the preset)
        #[arg(long)]
        height: Option<u32>,
    },
}

fn thumbnail(
    mut options: Options,
    location: &str,
    output: &Path,
    data_url: Option<&Path>,
    size: (Option<u32>, Option<u32>),
) -> Result<(), VitrineError> {
    if let Some(width) = size.0 {
        options.thumbnail.width = width.max(1);
    }
    if let Some(height) = size.1 {
        options.thumbnail.height = height.max(1);
    }

    let source = AssetSource::parse(location, "thumbnail")?;
    log::info!("loading {}", source.display_name());
    let model = asset::load(&source)?;

    let thumb = pollster::block_on(async {
        let mut renderer = ThumbnailRenderer::new(&options).await?;
        renderer.render(&model).await
    })?;

    std::fs::write(output, &thumb.png)?;
    log::info!("wrote {}", output.display());
    if let Some(path) = data_url {
        std::fs::write(path, &thumb.data_url)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), VitrineError> {
    let options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    match cli.command {
        Command::View { location } => ViewerWindow::builder()
            .with_location(location)
            .with_options(options)
            .build()
            .run(),
        Command::Thumbnail {
            location,
            output,
            data_url,
            width,
            height,
        } => thumbnail(
            options,
            &location,
            &output,
            data_url.as_deref(),
            (width, height),
        ),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
