//! `dustmap` - 3D dust reddening lookups from the command line.
//!
//! Loads the map artifact once, then answers a single query given as flags,
//! a stream of JSON bodies, or prints a summary of the map.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dust_lookup::{CoordFrame, DustMap, LookupConfig};
use dustmap_cli::{render_error, render_result, QueryBody, RequestLimits, Values};
use dustmap_store::StoreConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dustmap")]
#[command(about = "3D dust reddening lookups on a multi-resolution HEALPix map")]
struct Args {
    /// Map artifact directory (overrides DUSTMAP_PATH)
    #[arg(long, env = "DUSTMAP_PATH")]
    map: Option<PathBuf>,

    /// Maximum coordinates per query
    #[arg(long, env = "DUSTMAP_MAX_COORDS", default_value_t = dustmap_cli::request::DEFAULT_MAX_COORDS)]
    max_coords: usize,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up one point, or a batch given as comma-separated lists
    Query {
        /// Galactic longitude(s) in degrees
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "b", conflicts_with_all = ["ra", "dec"])]
        l: Vec<f64>,

        /// Galactic latitude(s) in degrees
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "l")]
        b: Vec<f64>,

        /// Right ascension(s) in degrees (ICRS)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "dec")]
        ra: Vec<f64>,

        /// Declination(s) in degrees (ICRS)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "ra")]
        dec: Vec<f64>,

        /// Output mode: full, lite or sfd
        #[arg(long, default_value = "full")]
        mode: String,

        /// Distance(s) in kpc at which to evaluate the profiles
        #[arg(long, value_delimiter = ',')]
        distance: Vec<f64>,

        /// Print the line-of-sight table instead of JSON (single point only)
        #[arg(long)]
        table: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Answer JSON query bodies, one per line, from --body or stdin
    QueryJson {
        /// A single body; stdin is read when absent
        #[arg(long)]
        body: Option<String>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print a summary of the loaded map
    Inspect,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    let mut store_config = StoreConfig::from_env();
    if let Some(map) = &args.map {
        store_config.map_path = map.clone();
    }
    store_config.validate().map_err(anyhow::Error::msg)?;

    let lookup_config = LookupConfig::from_env();
    let map = DustMap::open(&store_config.map_path, lookup_config).with_context(|| {
        format!(
            "failed to load dust map from {}",
            store_config.map_path.display()
        )
    })?;

    let summary = map.summary();
    info!(
        map_name = %summary.map_name,
        n_pix = summary.n_pix,
        levels = summary.levels.len(),
        "Dust map ready"
    );

    let limits = RequestLimits {
        max_coords: args.max_coords,
    };

    match args.command {
        Command::Query {
            l,
            b,
            ra,
            dec,
            mode,
            distance,
            table,
            pretty,
        } => {
            let body = flags_to_body(l, b, ra, dec, mode, distance);
            if table {
                return print_table(&map, body, &limits);
            }
            let request = body.validate(&limits)?;
            let result = map.query(&request.query)?;
            print_json(&render_result(&request, &result), pretty)?;
        }
        Command::QueryJson { body, pretty } => match body {
            Some(body) => answer_body(&map, &body, &limits, pretty)?,
            None => {
                for line in io::stdin().lock().lines() {
                    let line = line.context("failed to read stdin")?;
                    if !line.trim().is_empty() {
                        answer_body(&map, &line, &limits, pretty)?;
                    }
                }
            }
        },
        Command::Inspect => {
            print_json(&serde_json::to_value(map.summary())?, true)?;
        }
    }

    info!(metrics = ?map.metrics(), "Done");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Flags become a body so both entry points share validation.
/// A single value per axis is a scalar query.
fn flags_to_body(
    l: Vec<f64>,
    b: Vec<f64>,
    ra: Vec<f64>,
    dec: Vec<f64>,
    mode: String,
    distance: Vec<f64>,
) -> QueryBody {
    let values = |mut v: Vec<f64>| match v.len() {
        0 => None,
        1 => v.pop().map(Values::One),
        _ => Some(Values::Many(v)),
    };

    QueryBody {
        l: values(l),
        b: values(b),
        ra: values(ra),
        dec: values(dec),
        mode: Some(mode),
        d: values(distance),
    }
}

/// Answer one JSON body. Invalid bodies print an error object and do not
/// stop the stream.
fn answer_body(map: &DustMap, body: &str, limits: &RequestLimits, pretty: bool) -> Result<()> {
    let parsed = QueryBody::from_json(body).and_then(|body| body.validate(limits));
    match parsed {
        Ok(request) => {
            let result = map.query(&request.query)?;
            print_json(&render_result(&request, &result), pretty)
        }
        Err(error) => {
            warn!(%error, "Rejected query body");
            print_json(&render_error(&error), pretty)
        }
    }
}

fn print_table(map: &DustMap, body: QueryBody, limits: &RequestLimits) -> Result<()> {
    let request = body.validate(limits)?;
    let (lon, lat) = match &request.query.coords {
        dust_lookup::Coordinates::Scalar { lon, lat } => (*lon, *lat),
        dust_lookup::Coordinates::Batch { .. } => {
            anyhow::bail!("--table needs a single point")
        }
    };
    let frame: CoordFrame = request.query.frame;
    print!("{}", map.los_table(lon, lat, frame));
    Ok(())
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}
