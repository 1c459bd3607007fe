use std::{thread, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use serde::Serialize;
use storemap::{
    config::Config,
    logging,
    utils::{format_distance, progress_style},
    Directory, Location, Store,
};

#[derive(Debug, Parser)]
#[command(version, about = "Nearby stores from the store server")]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// List stores, nearest first when a position is given
    List {
        #[command(flatten)]
        observer: Observer,
        /// Look up street addresses (slow, one request per store)
        #[arg(long)]
        geocode: bool,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Details for one store
    Show {
        name: String,
        #[command(flatten)]
        observer: Observer,
        /// Look up this store's street address
        #[arg(long)]
        geocode: bool,
    },
}

#[derive(Clone, Debug, Args)]
struct Observer {
    /// Your latitude
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Your longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl Observer {
    fn location(&self) -> Result<Option<Location>> {
        Ok(match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Location::new(lat, lon)?),
            _ => None,
        })
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    #[serde(flatten)]
    store: &'a Store,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = cli.config;

    // only a full listing resolves every address in the background
    let mut directory = Directory::new(config.distance);
    if let Command::List { geocode: true, .. } = cli.command {
        directory = directory.with_geocoder(config.geocoder(), config.geocode_interval());
    }

    let source = config.source();
    directory
        .refresh(source.as_ref())
        .context("Failed to load stores")?;

    match cli.command {
        Command::List {
            observer,
            geocode,
            limit,
            json,
        } => {
            if geocode {
                wait_for_addresses(&directory);
            }
            let observer = observer.location()?;
            let mut stores = directory.ranked_by_distance(observer);
            if let Some(x) = limit {
                stores.truncate(x);
            }

            let listings: Vec<_> = stores
                .iter()
                .map(|store| Listing {
                    store,
                    distance: observer.map(|x| directory.distance_to(store, x)),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&listings)?);
            } else if listings.is_empty() {
                println!("no stores");
            } else {
                for (i, x) in listings.iter().enumerate() {
                    let mut line = format!("{:>3}. {}", i + 1, x.store.name());
                    if let Some(d) = x.distance {
                        line.push_str(&format!(" ({})", format_distance(d)));
                    }
                    if !x.store.address().is_empty() {
                        line.push_str(&format!(" - {}", x.store.address()));
                    }
                    println!("{line}");
                }
            }
        }
        Command::Show {
            name,
            observer,
            geocode,
        } => {
            let observer = observer.location()?;
            let store = if geocode {
                directory
                    .resolve_address(&name, &config.geocoder())
                    .with_context(|| format!("Failed to look up the address of {name:?}"))?
            } else {
                directory.get(&name)
            };
            let Some(store) = store else {
                bail!("No store named {name:?}");
            };

            println!("{}", store.name());
            println!("location: {}", store.location());
            if store.address().is_empty() {
                println!("address:  unknown");
            } else {
                println!("address:  {}", store.address());
            }
            if let Some(x) = observer {
                let d = directory.distance_to(&store, x);
                println!("distance: {}", format_distance(d));
            }
        }
    }

    Ok(())
}

fn wait_for_addresses(directory: &Directory) {
    let total = directory.pending_lookups() as u64;
    if total == 0 {
        return;
    }

    eprintln!("Fetching addresses for {total} stores...");
    let pb = ProgressBar::new(total).with_style(progress_style());
    loop {
        let pending = directory.pending_lookups() as u64;
        pb.set_position(total.saturating_sub(pending));
        if pending == 0 {
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }
    pb.finish_and_clear();
}
