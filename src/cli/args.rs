use crate::config::WardSource;
use crate::spatial::Crs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parcel-districts")]
#[command(about = "Assign council district and ward to parcels by centroid spatial join")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Configuration file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join parcels to council districts and write the address CSV
    Join {
        #[arg(short, long, help = "Parcel layer (.geojson, .shp or .zip)")]
        parcels: Option<PathBuf>,

        #[arg(short, long, help = "Council district layer (.geojson, .shp or .zip)")]
        districts: Option<PathBuf>,

        #[arg(short, long, help = "Output CSV file path")]
        output_file: Option<PathBuf>,

        #[arg(long, value_parser = parse_crs, help = "Projected CRS for centroids and the join, e.g. EPSG:2262")]
        projected_crs: Option<Crs>,

        #[arg(long, value_enum)]
        ward_source: Option<WardSource>,

        #[arg(long, help = "Worker threads for the join [default: CPU count]")]
        max_workers: Option<usize>,

        #[arg(long, help = "Run the join and report without writing the CSV")]
        validate_only: bool,

        #[arg(short, long, help = "Hide the progress spinner")]
        quiet: bool,
    },

    /// Display information about a layer file or a written address CSV
    Inspect {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Look up the council district and ward for an address
    Lookup {
        #[arg(short, long, help = "Address such as \"500 S Salina St\"")]
        address: String,

        #[arg(
            short,
            long = "data",
            help = "Address CSV; repeat for fallback datasets [default: configured output file]"
        )]
        data: Vec<PathBuf>,
    },
}

fn parse_crs(value: &str) -> Result<Crs, String> {
    Crs::parse(value).map_err(|e| e.to_string())
}
