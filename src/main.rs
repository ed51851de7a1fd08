use clap::Parser;
use parcel_districts::cli::{run, Cli};
use parcel_districts::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
