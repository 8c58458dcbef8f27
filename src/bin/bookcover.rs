//! Command-line cover renderer.

use std::path::PathBuf;
use std::process::ExitCode;

use bookcover_renderer::{
    BookRecord, CoverError, CoverRenderer, CoverRequest, CoverStyle, DEFAULT_HEIGHT,
    DEFAULT_WIDTH, FontLibrary, resolve_palette,
};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bookcover", about = "Render procedural book covers", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a cover to a PNG file.
    Render {
        #[command(flatten)]
        book: BookArgs,

        /// Style JSON file.
        #[arg(long)]
        style: Option<PathBuf>,

        /// Grain seed; makes the output reproducible.
        #[arg(long)]
        seed: Option<u64>,

        /// Extra font file to load (repeatable).
        #[arg(long = "font")]
        fonts: Vec<PathBuf>,

        /// Output PNG path.
        #[arg(short, long, default_value = "cover.png")]
        output: PathBuf,
    },
    /// Print the palette selected for a book as JSON.
    Palette {
        #[command(flatten)]
        book: BookArgs,
    },
}

#[derive(Args)]
struct BookArgs {
    /// Book JSON record as served by the library backend.
    #[arg(long, conflicts_with_all = ["title", "author", "year", "genres"])]
    book: Option<PathBuf>,

    #[arg(long, required_unless_present = "book")]
    title: Option<String>,

    #[arg(long, required_unless_present = "book")]
    author: Option<String>,

    #[arg(long)]
    year: Option<String>,

    /// Genre, in priority order (repeatable).
    #[arg(long = "genre")]
    genres: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
}

impl BookArgs {
    fn into_request(self) -> Result<CoverRequest, CoverError> {
        if let Some(path) = self.book {
            let json = std::fs::read_to_string(path)?;
            return Ok(BookRecord::from_json(&json)?.to_request(self.width, self.height));
        }

        let mut request = CoverRequest::new(
            self.title.unwrap_or_default(),
            self.author.unwrap_or_default(),
        )
        .with_genres(self.genres)
        .with_size(self.width, self.height);
        request.year = self.year;
        Ok(request)
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "bookcover failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CoverError> {
    match cli.command {
        Command::Render {
            book,
            style,
            seed,
            fonts,
            output,
        } => {
            let request = book.into_request()?;

            let mut style = match style {
                Some(path) => CoverStyle::load(path)?,
                None => CoverStyle::default(),
            };
            if seed.is_some() {
                style.noise_seed = seed;
            }

            let mut library = FontLibrary::system();
            for path in fonts {
                library = library.with_font_file(path)?;
            }

            let mut renderer = CoverRenderer::with_style(style)?.with_fonts(library);
            let cover = renderer.render(&request)?;
            std::fs::write(&output, cover.bytes())?;

            info!(
                title = %request.title,
                output = %output.display(),
                width = cover.width(),
                height = cover.height(),
                "cover written"
            );
            Ok(())
        }
        Command::Palette { book } => {
            let request = book.into_request()?;
            let selection = resolve_palette(&request.title, &request.genres);
            println!("{}", serde_json::to_string_pretty(&selection)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
