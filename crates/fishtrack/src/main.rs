use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::{Args, Parser, Subcommand};
use fishtrack_core::{aggregate, store, DbPool, FishtrackError, Interval, TimeFormat};
use fishtrack_parser::{parse_detections, Detection, StationMapping};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fishtrack CLI / API runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consume every CSV under a directory and print aggregated intervals
    Cons(ConsArgs),
    /// As `cons`, with station-name reconciliation and ISO timestamps
    Aggregate(AggregateArgs),
    /// As `aggregate`, but skip aggregation and print normalised detections
    Parse(ParseArgs),
    /// Start the Axum API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ConsArgs {
    directory: PathBuf,
    #[arg(long, default_value_t = 60)]
    minutes: i64,
    #[arg(long)]
    debug: bool,
    #[arg(long = "no-debug", conflicts_with = "debug")]
    no_debug: bool,
}

#[derive(Args, Debug)]
struct AggregateArgs {
    directory: PathBuf,
    #[arg(long, default_value_t = 60)]
    minutes: i64,
    #[arg(long, default_value = "./data/station_names.md")]
    st_mapping: PathBuf,
    #[arg(long)]
    debug: bool,
    #[arg(long = "no-debug", conflicts_with = "debug")]
    no_debug: bool,
}

#[derive(Args, Debug)]
struct ParseArgs {
    directory: PathBuf,
    #[arg(long, default_value = "./data/station_names.csv")]
    st_mapping: PathBuf,
    #[arg(long)]
    debug: bool,
    #[arg(long = "no-debug", conflicts_with = "debug")]
    no_debug: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind the API server
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
    /// Gap threshold, in minutes, used to aggregate uploaded detections
    #[arg(long, default_value_t = 30)]
    gap_minutes: i64,
}

#[derive(Clone)]
struct AppState {
    pool: DbPool,
    gap_minutes: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Cons(args) => run_cons(args),
        Command::Aggregate(args) => run_aggregate(args),
        Command::Parse(args) => run_parse(args),
        Command::Serve(args) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .json()
                .init();
            run_server(args).await
        }
    }
}

fn csv_paths_in(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.exists() {
        eprintln!("Folder {} does not exist", directory.display());
        std::process::exit(-1);
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)
        .with_context(|| format!("failed to list {}", directory.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("csv"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn load_all_detections(
    directory: &Path,
    station_mapping: Option<&StationMapping>,
    debug: bool,
) -> Result<Vec<Detection>> {
    let mut detections = Vec::new();
    for path in csv_paths_in(directory)? {
        if debug {
            println!("{}", path.display());
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut parsed = parse_detections(&bytes, station_mapping)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        detections.append(&mut parsed);
    }
    Ok(detections)
}

fn print_intervals_csv(intervals: &[Interval], format: TimeFormat) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["transmitter_id", "station_name", "start", "stop"])?;
    for interval in intervals {
        writer.write_record([
            interval.transmitter_id.as_str(),
            interval.station_name.as_str(),
            &interval.format_start(format),
            &interval.format_stop(format),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_detections_csv(detections: &[Detection]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["timestamp", "transmitter_id", "station_name", "receiver_id"])?;
    for detection in detections {
        writer.write_record([
            detection.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            detection.transmitter_id.clone(),
            detection.station_name.clone(),
            detection.receiver_id.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn run_cons(args: ConsArgs) -> Result<()> {
    let debug = args.debug;
    let detections = load_all_detections(&args.directory, None, debug)?;
    let intervals = aggregate(&detections, args.minutes);
    print_intervals_csv(&intervals, TimeFormat::Unix)
}

fn run_aggregate(args: AggregateArgs) -> Result<()> {
    let debug = args.debug;
    let mapping = StationMapping::load(&args.st_mapping).ok();
    let detections = load_all_detections(&args.directory, mapping.as_ref(), debug)?;
    let intervals = aggregate(&detections, args.minutes);
    print_intervals_csv(&intervals, TimeFormat::Iso)
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let debug = args.debug;
    let mapping = StationMapping::load(&args.st_mapping).ok();
    let detections = load_all_detections(&args.directory, mapping.as_ref(), debug)?;
    print_detections_csv(&detections)
}

async fn connect_pool() -> Result<DbPool> {
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("FISHTRACK_DATABASE_URL"))
        .context("DATABASE_URL (or FISHTRACK_DATABASE_URL) must be set")?;
    Ok(store::connect(&database_url).await?)
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let pool = connect_pool().await?;
    store::run_migrations(&pool).await?;
    let state = AppState {
        pool,
        gap_minutes: args.gap_minutes,
    };

    let app = Router::new()
        .route("/", get(docs))
        .route("/add", get(add_form).post(add_detections))
        .route("/intervals", get(list_intervals))
        .with_state(state);

    let addr = args.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    info!(%addr, "Starting API server");
    axum::serve(listener, app.into_make_service())
        .await
        .context("Axum server failed")
}

async fn docs() -> Html<&'static str> {
    Html(
        "<html><body><h1>fishtrack</h1>\
         <ul>\
         <li>GET /add &mdash; upload form</li>\
         <li>POST /add &mdash; multipart 'file' field, returns aggregated intervals</li>\
         <li>GET /intervals?transmitter=&lt;id&gt; &mdash; that transmitter's intervals</li>\
         </ul></body></html>",
    )
}

async fn add_form() -> Html<&'static str> {
    Html(
        "<html><body><form method=\"post\" action=\"/add\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"file\"/>\
         <input type=\"submit\"/>\
         </form></body></html>",
    )
}

#[derive(Serialize)]
struct IntervalJson {
    transmitter_id: String,
    station_name: String,
    start: String,
    stop: String,
}

impl From<&Interval> for IntervalJson {
    fn from(interval: &Interval) -> Self {
        IntervalJson {
            transmitter_id: interval.transmitter_id.clone(),
            station_name: interval.station_name.clone(),
            start: interval.start.and_utc().to_rfc3339(),
            stop: interval.stop.and_utc().to_rfc3339(),
        }
    }
}

fn error_status(err: &FishtrackError) -> StatusCode {
    match err {
        FishtrackError::PersistenceFailed { .. } | FishtrackError::Sqlx(_) | FishtrackError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        FishtrackError::Parser(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn add_detections(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut bytes: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid multipart payload").into_response(),
        };
        if field.name() == Some("file") {
            match field.bytes().await {
                Ok(data) => bytes = Some(data.to_vec()),
                Err(_) => return (StatusCode::BAD_REQUEST, "failed to read file field").into_response(),
            }
        }
    }

    let Some(bytes) = bytes else {
        return (StatusCode::BAD_REQUEST, "missing 'file' field").into_response();
    };

    let detections = match parse_detections(&bytes, None) {
        Ok(detections) => detections,
        Err(err) => {
            error!(error = %err, "add: parsing failed");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let intervals = aggregate(&detections, state.gap_minutes);
    let outcomes = store::save_intervals(&state.pool, &intervals, state.gap_minutes).await;

    for (transmitter_id, outcome) in &outcomes {
        if let Err(err) = outcome {
            error!(transmitter = %transmitter_id, error = %err, "add: persistence failed");
            return (error_status(err), err.to_string()).into_response();
        }
    }

    let body: Vec<IntervalJson> = intervals.iter().map(IntervalJson::from).collect();
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(serde::Deserialize)]
struct IntervalsQuery {
    transmitter: String,
}

async fn list_intervals(
    State(state): State<AppState>,
    Query(query): Query<IntervalsQuery>,
) -> Result<Json<Vec<IntervalJson>>, (StatusCode, String)> {
    let intervals = store::by_transmitter(&state.pool, &query.transmitter)
        .await
        .map_err(|err| (error_status(&err), err.to_string()))?;
    Ok(Json(intervals.iter().map(IntervalJson::from).collect()))
}
