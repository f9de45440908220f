use ai_movie_posters::api::huggingface::HuggingFaceGenerator;
use ai_movie_posters::api::openai::PlotWriter;
use ai_movie_posters::api::stock::StockPhotoGenerator;
use ai_movie_posters::api::tmdb::MovieSuggestions;
use ai_movie_posters::api::unsplash::UnsplashSearch;
use ai_movie_posters::api::http_client;
use ai_movie_posters::config::{Config, DEFAULT_CONFIG_PATH};
use ai_movie_posters::events::log_observer;
use ai_movie_posters::gallery::{download_poster, Gallery};
use ai_movie_posters::{
    build_prompt, init, FallbackCatalog, Genre, MovieFormData, PosterGenerator, PosterStyle,
    RemoteGenerator,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ai-movie-posters", version, about = "Generate movie posters from a title and genre")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a poster, falling back to stock images on failure
    Generate(GenerateArgs),
    /// Print the generation prompt only
    Prompt(FormArgs),
    /// Write a plot blurb for the movie
    Plot(FormArgs),
    /// List popular movies of a genre
    Suggest {
        #[arg(long, default_value = "drama")]
        genre: String,
    },
    /// List saved posters
    Gallery,
    /// Save a poster reference to a file
    Download {
        reference: String,
        #[arg(long, default_value = "posters/movie-poster.jpg")]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
struct FormArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "drama")]
    genre: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "cinematic")]
    style: String,
}

impl FormArgs {
    fn to_form(&self) -> Result<MovieFormData> {
        let style: PosterStyle = self.style.parse()?;
        let form = MovieFormData::new(
            self.title.as_str(),
            Genre::from(self.genre.as_str()),
            self.description.as_str(),
            style,
        )?;
        Ok(form)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeneratorKind {
    Huggingface,
    Stock,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    form: FormArgs,
    #[arg(long, value_enum, default_value_t = GeneratorKind::Huggingface)]
    generator: GeneratorKind,
    /// Skip the stock-photo search and go straight to the catalog
    #[arg(long)]
    no_search: bool,
    /// Seed for fallback selection
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    save: bool,
    #[arg(long)]
    download: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).await?;
    init::ensure_directories(&cfg).await?;
    let client = http_client()?;

    match cli.command {
        Command::Generate(args) => run_generate(&cfg, client, args).await,
        Command::Prompt(form) => {
            println!("{}", build_prompt(&form.to_form()?));
            Ok(())
        }
        Command::Plot(form) => {
            let form = form.to_form()?;
            let writer = PlotWriter::from_config(client, &cfg);
            println!("{}", writer.generate_plot_summary(&form).await);
            Ok(())
        }
        Command::Suggest { genre } => {
            let tmdb = MovieSuggestions::from_config(client, &cfg);
            let found = tmdb.movie_suggestions(&Genre::from(genre.as_str())).await;
            println!("{}", serde_json::to_string_pretty(&found)?);
            Ok(())
        }
        Command::Gallery => {
            let posters = Gallery::new(&cfg.gallery_path).list().await?;
            println!("{}", serde_json::to_string_pretty(&posters)?);
            Ok(())
        }
        Command::Download { reference, out } => {
            let written = download_poster(&client, &reference, &out).await?;
            println!("{} ({} bytes)", out.display(), written);
            Ok(())
        }
    }
}

async fn run_generate(cfg: &Config, client: reqwest::Client, args: GenerateArgs) -> Result<()> {
    let form = args.form.to_form()?;

    let catalog = match cfg.catalog_path.as_ref() {
        Some(path) => FallbackCatalog::from_json_file(path).await?,
        None => FallbackCatalog::builtin(),
    };

    let remote: Arc<dyn RemoteGenerator> = match args.generator {
        GeneratorKind::Huggingface => Arc::new(HuggingFaceGenerator::from_config(client.clone(), cfg)),
        GeneratorKind::Stock => Arc::new(StockPhotoGenerator::new(client.clone())),
    };

    let mut generator = PosterGenerator::new(remote, Arc::new(catalog))
        .with_timeouts(cfg.generation_timeout(), cfg.search_timeout())
        .with_observer(log_observer());
    if !args.no_search {
        generator = generator.with_search(Arc::new(UnsplashSearch::from_config(client.clone(), cfg)));
    }
    if let Some(seed) = args.seed {
        generator = generator.with_rng(Box::new(StdRng::seed_from_u64(seed)));
    }

    let poster = generator.generate(&form).await;
    println!("{}", serde_json::to_string_pretty(&poster)?);

    if args.save {
        Gallery::new(&cfg.gallery_path).save(&poster).await?;
    }
    if let Some(out) = args.download.as_ref() {
        download_poster(&client, &poster.image_reference, out)
            .await
            .with_context(|| format!("Failed to download poster to {}", out.display()))?;
    }

    Ok(())
}
