//! streamkit - TMDB movie, TV and people metadata CLI.
#![allow(clippy::future_not_send)]

/// Application configuration (TOML).
mod config;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::Value;
use streamkit_api::tmdb::{
    ApiError, Collections, Configuration, Envelope, ExternalSource, Find, LocalTmdbApi, Movies,
    ParamValue, Params, People, Search, TimeWindow, TmdbClient, Trending, Tv, directors,
    image_url, paginate, youtube_trailer,
};
use streamkit_db::SqliteCache;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, CacheBackend, resolve_config_path};

/// Environment variable holding the TMDB API key.
const API_KEY_ENV: &str = "TMDB_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Print `{success, data, pagination, error}` envelopes instead of raw JSON.
    #[arg(long, global = true)]
    envelope: bool,

    /// Response language (default: config `tmdb.language`, then "en-US").
    #[arg(long, global = true)]
    language: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// TMDB API queries.
    #[command(flatten)]
    Api(ApiCommands),
    /// Build an image URL from a TMDB file path.
    Image(ImageArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Subcommands that call the TMDB API.
#[derive(Subcommand)]
enum ApiCommands {
    /// Movie endpoints.
    Movie(MovieCommand),
    /// TV series endpoints.
    Tv(TvCommand),
    /// People endpoints.
    Person(PersonCommand),
    /// Multi, keyword and company search.
    Search(SearchCommand),
    /// Collection endpoints.
    Collection(CollectionCommand),
    /// Look up TMDB objects by external ID.
    Find(FindArgs),
    /// API configuration lists.
    Config(ConfigCommand),
    /// Trending movies, series and people.
    Trending(WindowArgs),
}

/// Page selection shared by paged listings.
#[derive(clap::Args)]
struct PageArgs {
    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Fetch pages 1..=N and merge their results (overrides --page).
    #[arg(long)]
    pages: Option<u32>,
}

/// Arguments for text searches.
#[derive(clap::Args)]
struct QueryArgs {
    /// Search text.
    query: String,
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for single-resource lookups.
#[derive(clap::Args)]
struct IdArgs {
    /// TMDB ID.
    id: u64,
}

/// Arguments for paged per-resource listings.
#[derive(clap::Args)]
struct IdPageArgs {
    /// TMDB ID.
    id: u64,
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for trending listings.
#[derive(clap::Args)]
struct WindowArgs {
    /// Time window: "day" or "week".
    #[arg(long, default_value = "day")]
    window: TimeWindow,
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for genre listings.
#[derive(clap::Args)]
struct GenreArgs {
    /// TMDB genre ID (e.g. 28 for Action).
    genre_id: u64,
    #[command(flatten)]
    paging: PageArgs,
}

/// Arguments for discover queries.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Discover filter as KEY=VALUE (repeatable, e.g. `--filter primary_release_year=1999`).
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

/// Arguments for the `movie` subcommand.
#[derive(clap::Args)]
struct MovieCommand {
    /// Movie subcommand to run.
    #[command(subcommand)]
    command: MovieSubcommands,
}

/// Available movie subcommands.
#[derive(Subcommand)]
enum MovieSubcommands {
    /// Search movies by title.
    Search(QueryArgs),
    /// Movie details with videos, credits, reviews and more appended.
    Details(IdArgs),
    /// Popular movies.
    Popular(PageArgs),
    /// Trending movies.
    Trending(WindowArgs),
    /// Upcoming releases.
    Upcoming(PageArgs),
    /// Movies now in theaters.
    NowPlaying(PageArgs),
    /// Top rated movies.
    TopRated(PageArgs),
    /// Movie genre list.
    Genres,
    /// Discover movies with filters.
    Discover(DiscoverArgs),
    /// Popular movies of one genre.
    ByGenre(GenreArgs),
    /// Streaming availability per region.
    WatchProviders(IdArgs),
    /// Similar movies.
    Similar(IdPageArgs),
    /// Recommended movies.
    Recommendations(IdPageArgs),
    /// User reviews.
    Reviews(IdPageArgs),
    /// Keywords.
    Keywords(IdArgs),
    /// Cast and crew.
    Credits(IdArgs),
    /// Trailers, teasers and clips.
    Videos(IdArgs),
    /// YouTube URL of the main trailer.
    Trailer(IdArgs),
    /// Directors from the credits.
    Directors(IdArgs),
}

/// Arguments for the `tv` subcommand.
#[derive(clap::Args)]
struct TvCommand {
    /// TV subcommand to run.
    #[command(subcommand)]
    command: TvSubcommands,
}

/// Arguments for the `tv season` subcommand.
#[derive(clap::Args)]
struct SeasonArgs {
    /// TMDB series ID.
    id: u64,
    /// Season number.
    season: u32,
}

/// Arguments for the `tv episode` subcommand.
#[derive(clap::Args)]
struct EpisodeArgs {
    /// TMDB series ID.
    id: u64,
    /// Season number.
    season: u32,
    /// Episode number.
    episode: u32,
}

/// Available TV subcommands.
#[derive(Subcommand)]
enum TvSubcommands {
    /// Search series by name.
    Search(QueryArgs),
    /// Series details with videos, credits, ratings and more appended.
    Details(IdArgs),
    /// Popular series.
    Popular(PageArgs),
    /// Top rated series.
    TopRated(PageArgs),
    /// Trending series.
    Trending(WindowArgs),
    /// Series airing today.
    AiringToday(PageArgs),
    /// Series airing in the next seven days.
    OnTheAir(PageArgs),
    /// Season details.
    Season(SeasonArgs),
    /// Episode details.
    Episode(EpisodeArgs),
    /// Streaming availability per region.
    WatchProviders(IdArgs),
    /// TV genre list.
    Genres,
    /// Discover series with filters.
    Discover(DiscoverArgs),
    /// Popular series of one genre.
    ByGenre(GenreArgs),
    /// Cast and crew.
    Credits(IdArgs),
    /// Trailers, teasers and clips.
    Videos(IdArgs),
    /// User reviews.
    Reviews(IdPageArgs),
    /// Similar series.
    Similar(IdPageArgs),
    /// Recommended series.
    Recommendations(IdPageArgs),
    /// YouTube URL of the main trailer.
    Trailer(IdArgs),
}

/// Arguments for the `person` subcommand.
#[derive(clap::Args)]
struct PersonCommand {
    /// Person subcommand to run.
    #[command(subcommand)]
    command: PersonSubcommands,
}

/// Available person subcommands.
#[derive(Subcommand)]
enum PersonSubcommands {
    /// Search people by name.
    Search(QueryArgs),
    /// Person details with credits and images appended.
    Details(IdArgs),
    /// Trending people.
    Trending(WindowArgs),
    /// Popular people.
    Popular(PageArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchCommand {
    /// Search subcommand to run.
    #[command(subcommand)]
    command: SearchSubcommands,
}

/// Available search subcommands.
#[derive(Subcommand)]
enum SearchSubcommands {
    /// Movies, series and people at once.
    Multi(QueryArgs),
    /// Keywords.
    Keyword(QueryArgs),
    /// Production companies.
    Company(QueryArgs),
}

/// Arguments for the `collection` subcommand.
#[derive(clap::Args)]
struct CollectionCommand {
    /// Collection subcommand to run.
    #[command(subcommand)]
    command: CollectionSubcommands,
}

/// Available collection subcommands.
#[derive(Subcommand)]
enum CollectionSubcommands {
    /// Collection details.
    Details(IdArgs),
    /// Search collections by name.
    Search(QueryArgs),
}

/// Arguments for the `find` subcommand.
#[derive(clap::Args)]
struct FindArgs {
    /// External ID (e.g. "tt0137523").
    external_id: String,
    /// External source (e.g. `imdb_id`, `tvdb_id`, `wikidata_id`).
    #[arg(long, default_value = "imdb_id")]
    source: ExternalSource,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available configuration subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Image base URLs and sizes.
    Api,
    /// Countries.
    Countries,
    /// Departments and jobs.
    Jobs,
    /// Languages.
    Languages,
    /// Primary translations.
    PrimaryTranslations,
    /// Timezones.
    Timezones,
}

/// Arguments for the `image` subcommand.
#[derive(clap::Args)]
struct ImageArgs {
    /// Image file path (e.g. "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg").
    path: String,
    /// Size segment (e.g. w92, w185, w500, original).
    #[arg(long, default_value = "original")]
    size: String,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: clap_complete::Shell,
}

/// Parses a `KEY=VALUE` discover filter.
fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty filter key in {raw:?}"));
    }
    Ok((String::from(key), String::from(value)))
}

/// Types a filter value: integers, finite floats and booleans are sent as
/// such. `nan`, `inf` and the like stay text.
fn filter_value(raw: &str) -> ParamValue {
    if let Ok(n) = raw.parse::<i64>() {
        return ParamValue::Integer(n);
    }
    if let Ok(f) = raw.parse::<f64>()
        && f.is_finite()
    {
        return ParamValue::Float(f);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return ParamValue::Bool(b);
    }
    ParamValue::from(raw)
}

/// Builds discover parameters from `--filter` pairs.
fn discover_params(args: &DiscoverArgs, language: Option<&str>) -> Params {
    args.filters
        .iter()
        .map(|(k, v)| (k.as_str(), filter_value(v)))
        .collect::<Params>()
        .with_opt("language", language)
}

/// Fetches one page, or pages `1..=N` merged when `--pages` is set.
async fn fetch_paged<F, Fut>(paging: &PageArgs, mut fetch_page: F) -> Result<Value, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    match paging.pages {
        Some(max_pages) => paginate(fetch_page, max_pages).await.map(Value::Array),
        None => fetch_page(paging.page).await,
    }
}

/// Extracts the main trailer URL from a videos response (`null` if none).
fn trailer_value(videos: &Value) -> Value {
    videos
        .get("results")
        .and_then(Value::as_array)
        .and_then(|list| youtube_trailer(list))
        .map_or(Value::Null, Value::String)
}

/// Runs the `movie` subcommand.
#[instrument(skip_all)]
async fn run_movie<A: LocalTmdbApi>(
    api: &A,
    command: MovieSubcommands,
    lang: Option<&str>,
) -> Result<Value, ApiError> {
    let movies = Movies::new(api);
    match command {
        MovieSubcommands::Search(a) => {
            fetch_paged(&a.paging, |p| movies.search(&a.query, p, lang)).await
        }
        MovieSubcommands::Details(a) => movies.details(a.id, lang).await,
        MovieSubcommands::Popular(a) => fetch_paged(&a, |p| movies.popular(p, lang)).await,
        MovieSubcommands::Trending(a) => {
            fetch_paged(&a.paging, |p| movies.trending(a.window, p, lang)).await
        }
        MovieSubcommands::Upcoming(a) => fetch_paged(&a, |p| movies.upcoming(p, lang)).await,
        MovieSubcommands::NowPlaying(a) => {
            fetch_paged(&a, |p| movies.now_playing(p, lang)).await
        }
        MovieSubcommands::TopRated(a) => fetch_paged(&a, |p| movies.top_rated(p, lang)).await,
        MovieSubcommands::Genres => movies.genres(lang).await,
        MovieSubcommands::Discover(a) => movies.discover(discover_params(&a, lang)).await,
        MovieSubcommands::ByGenre(a) => {
            fetch_paged(&a.paging, |p| movies.by_genre(a.genre_id, p, lang)).await
        }
        MovieSubcommands::WatchProviders(a) => movies.watch_providers(a.id, lang).await,
        MovieSubcommands::Similar(a) => {
            fetch_paged(&a.paging, |p| movies.similar(a.id, p, lang)).await
        }
        MovieSubcommands::Recommendations(a) => {
            fetch_paged(&a.paging, |p| movies.recommendations(a.id, p, lang)).await
        }
        MovieSubcommands::Reviews(a) => {
            fetch_paged(&a.paging, |p| movies.reviews(a.id, p, lang)).await
        }
        MovieSubcommands::Keywords(a) => movies.keywords(a.id).await,
        MovieSubcommands::Credits(a) => movies.credits(a.id, lang).await,
        MovieSubcommands::Videos(a) => movies.videos(a.id, lang).await,
        MovieSubcommands::Trailer(a) => Ok(trailer_value(&movies.videos(a.id, lang).await?)),
        MovieSubcommands::Directors(a) => {
            let credits = movies.credits(a.id, lang).await?;
            Ok(Value::Array(
                directors(&credits).into_iter().cloned().collect(),
            ))
        }
    }
}

/// Runs the `tv` subcommand.
#[instrument(skip_all)]
async fn run_tv<A: LocalTmdbApi>(
    api: &A,
    command: TvSubcommands,
    lang: Option<&str>,
) -> Result<Value, ApiError> {
    let tv = Tv::new(api);
    match command {
        TvSubcommands::Search(a) => fetch_paged(&a.paging, |p| tv.search(&a.query, p, lang)).await,
        TvSubcommands::Details(a) => tv.details(a.id, lang).await,
        TvSubcommands::Popular(a) => fetch_paged(&a, |p| tv.popular(p, lang)).await,
        TvSubcommands::TopRated(a) => fetch_paged(&a, |p| tv.top_rated(p, lang)).await,
        TvSubcommands::Trending(a) => {
            fetch_paged(&a.paging, |p| tv.trending(a.window, p, lang)).await
        }
        TvSubcommands::AiringToday(a) => fetch_paged(&a, |p| tv.airing_today(p, lang)).await,
        TvSubcommands::OnTheAir(a) => fetch_paged(&a, |p| tv.on_the_air(p, lang)).await,
        TvSubcommands::Season(a) => tv.season(a.id, a.season, lang).await,
        TvSubcommands::Episode(a) => tv.episode(a.id, a.season, a.episode, lang).await,
        TvSubcommands::WatchProviders(a) => tv.watch_providers(a.id, lang).await,
        TvSubcommands::Genres => tv.genres(lang).await,
        TvSubcommands::Discover(a) => tv.discover(discover_params(&a, lang)).await,
        TvSubcommands::ByGenre(a) => {
            fetch_paged(&a.paging, |p| tv.by_genre(a.genre_id, p, lang)).await
        }
        TvSubcommands::Credits(a) => tv.credits(a.id, lang).await,
        TvSubcommands::Videos(a) => tv.videos(a.id, lang).await,
        TvSubcommands::Reviews(a) => fetch_paged(&a.paging, |p| tv.reviews(a.id, p, lang)).await,
        TvSubcommands::Similar(a) => fetch_paged(&a.paging, |p| tv.similar(a.id, p, lang)).await,
        TvSubcommands::Recommendations(a) => {
            fetch_paged(&a.paging, |p| tv.recommendations(a.id, p, lang)).await
        }
        TvSubcommands::Trailer(a) => Ok(trailer_value(&tv.videos(a.id, lang).await?)),
    }
}

/// Routes an API subcommand to its namespace.
#[instrument(skip_all)]
async fn dispatch<A: LocalTmdbApi>(
    api: &A,
    command: ApiCommands,
    lang: Option<&str>,
) -> Result<Value, ApiError> {
    match command {
        ApiCommands::Movie(cmd) => run_movie(api, cmd.command, lang).await,
        ApiCommands::Tv(cmd) => run_tv(api, cmd.command, lang).await,
        ApiCommands::Person(cmd) => {
            let people = People::new(api);
            match cmd.command {
                PersonSubcommands::Search(a) => {
                    fetch_paged(&a.paging, |p| people.search(&a.query, p, lang)).await
                }
                PersonSubcommands::Details(a) => people.details(a.id, lang).await,
                PersonSubcommands::Trending(a) => {
                    fetch_paged(&a.paging, |p| people.trending(a.window, p, lang)).await
                }
                PersonSubcommands::Popular(a) => {
                    fetch_paged(&a, |p| people.popular(p, lang)).await
                }
            }
        }
        ApiCommands::Search(cmd) => {
            let search = Search::new(api);
            match cmd.command {
                SearchSubcommands::Multi(a) => {
                    fetch_paged(&a.paging, |p| search.multi(&a.query, p, lang)).await
                }
                SearchSubcommands::Keyword(a) => {
                    fetch_paged(&a.paging, |p| search.keyword(&a.query, p)).await
                }
                SearchSubcommands::Company(a) => {
                    fetch_paged(&a.paging, |p| search.company(&a.query, p)).await
                }
            }
        }
        ApiCommands::Collection(cmd) => {
            let collections = Collections::new(api);
            match cmd.command {
                CollectionSubcommands::Details(a) => collections.details(a.id, lang).await,
                CollectionSubcommands::Search(a) => {
                    fetch_paged(&a.paging, |p| collections.search(&a.query, p, lang)).await
                }
            }
        }
        ApiCommands::Find(a) => {
            Find::new(api)
                .by_id(&a.external_id, a.source, lang)
                .await
        }
        ApiCommands::Config(cmd) => {
            let config = Configuration::new(api);
            match cmd.command {
                ConfigSubcommands::Api => config.api_config().await,
                ConfigSubcommands::Countries => config.countries().await,
                ConfigSubcommands::Jobs => config.jobs().await,
                ConfigSubcommands::Languages => config.languages().await,
                ConfigSubcommands::PrimaryTranslations => config.primary_translations().await,
                ConfigSubcommands::Timezones => config.timezones().await,
            }
        }
        ApiCommands::Trending(a) => {
            let trending = Trending::new(api);
            fetch_paged(&a.paging, |p| trending.all(a.window, p)).await
        }
    }
}

/// Builds a client over the configured cache backend and runs `command`.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the cache database
/// cannot be opened. API failures are returned inside the `Ok` value.
#[instrument(skip_all)]
async fn run_api(
    command: ApiCommands,
    dir: Option<&PathBuf>,
    language: Option<String>,
) -> Result<Result<Value, ApiError>> {
    let config_path = resolve_config_path(dir)?;
    let config = AppConfig::load(&config_path)?;
    let api_key = config
        .api_key(std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default();
    let language = language.or_else(|| config.tmdb.language.clone());
    let lang = language.as_deref();

    tracing::debug!(
        config = %config_path.display(),
        backend = ?config.cache.backend,
        "configuration loaded"
    );

    let result = match config.cache.backend {
        CacheBackend::Memory => {
            match TmdbClient::builder()
                .api_key(api_key)
                .cache_ttl(config.cache_ttl())
                .build()
            {
                Ok(client) => dispatch(&client, command, lang).await,
                Err(err) => Err(err),
            }
        }
        CacheBackend::Sqlite => {
            let cache = SqliteCache::open(dir, config.cache_ttl())
                .context("failed to open response cache")?;
            cache
                .purge_expired()
                .context("failed to purge response cache")?;
            match TmdbClient::builder().api_key(api_key).cache(cache).build() {
                Ok(client) => dispatch(&client, command, lang).await,
                Err(err) => Err(err),
            }
        }
    };

    Ok(result)
}

/// Writes the outcome to stdout.
///
/// Plain mode prints the JSON (strings unquoted) and turns a failure into
/// the returned error; envelope mode prints an envelope in both cases and
/// still returns the failure so the exit status is non-zero.
///
/// # Errors
///
/// Returns the API failure, or an error if stdout cannot be written.
fn emit(envelope: bool, result: Result<Value, ApiError>) -> Result<()> {
    let (rendered, outcome) = if envelope {
        let outcome = result.as_ref().map(|_| ()).map_err(ApiError::clone);
        let body = Envelope::from_result(result);
        (
            serde_json::to_string_pretty(&body).context("failed to serialize envelope")?,
            outcome,
        )
    } else {
        match result {
            Ok(Value::String(s)) => (s, Ok(())),
            Ok(value) => (
                serde_json::to_string_pretty(&value).context("failed to serialize response")?,
                Ok(()),
            ),
            Err(err) => return Err(err.into()),
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("failed to write to stdout")?;
    outcome.map_err(anyhow::Error::from)
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Completions(args) => {
            let mut stdout = std::io::stdout().lock();
            clap_complete::generate(args.shell, &mut Cli::command(), "streamkit", &mut stdout);
            Ok(())
        }
        Commands::Image(args) => {
            let url =
                image_url(Some(args.path.as_str()), &args.size).map_or(Value::Null, Value::String);
            emit(cli.envelope, Ok(url))
        }
        Commands::Api(command) => {
            let result = run_api(command, cli.dir.as_ref(), cli.language).await?;
            emit(cli.envelope, result)
        }
    }
}
