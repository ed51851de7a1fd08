use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{ProcessingError, Result};
use crate::lookup::{parse_address, AddressIndex, AddressLookup, Candidate, LookupOutcome};
use crate::processors::DistrictPipeline;
use crate::readers::read_layer;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::AddressCsvWriter;
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Join {
            parcels,
            districts,
            output_file,
            projected_crs,
            ward_source,
            max_workers,
            validate_only,
            quiet,
        } => {
            if let Some(path) = parcels {
                config.parcels_path = path;
            }
            if let Some(path) = districts {
                config.districts_path = path;
            }
            if let Some(path) = output_file {
                config.output_path = path;
            }
            if let Some(crs) = projected_crs {
                config.projected_crs = crs;
            }
            if let Some(source) = ward_source {
                config.ward_source = source;
            }
            if let Some(workers) = max_workers {
                config.max_workers = workers;
            }

            println!("Joining parcels to council districts...");
            println!("Parcels: {}", config.parcels_path.display());
            println!("Districts: {}", config.districts_path.display());
            println!(
                "Projected CRS: {}, Workers: {}",
                config.projected_crs,
                config.worker_count()
            );

            let progress = ProgressReporter::new_spinner("Processing layers...", quiet);
            let pipeline = DistrictPipeline::new(config);
            let output = pipeline.run(Some(&progress))?;
            progress.finish_with_message(&format!("Joined {} parcels", output.report.total_parcels));

            println!("\n{}", output.report.generate_summary());

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            let output_path = &pipeline.config().output_path;
            let written = AddressCsvWriter::new().write_records(&output.records, output_path)?;
            info!(path = %output_path.display(), rows = written, "address CSV written");
            println!("Wrote {} rows", written);
        }

        Commands::Inspect { file } => {
            println!("Inspecting: {}", file.display());
            let is_csv = file
                .extension()
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);

            if is_csv {
                let info = AddressCsvWriter::new().get_file_info(&file)?;
                println!("\n{}", info.summary());
            } else {
                let layer = read_layer(&file, "input")?;
                println!("\n{}", layer.summary());
            }
        }

        Commands::Lookup { address, data } => {
            let paths = if data.is_empty() {
                vec![config.output_path.clone()]
            } else {
                data
            };
            let datasets = paths
                .iter()
                .map(|path| AddressIndex::from_csv(path))
                .collect::<Result<Vec<_>>>()?;

            let parsed = parse_address(&address).ok_or_else(|| {
                ProcessingError::InvalidAddress(format!(
                    "'{}': enter a street number and street name",
                    address
                ))
            })?;

            match AddressLookup::new(datasets).lookup(&parsed) {
                LookupOutcome::Match(candidate) => {
                    println!("{}", candidate.address);
                    println!(
                        "District {}",
                        candidate.district.as_deref().unwrap_or("Unknown")
                    );
                    println!("Ward {}", candidate.ward.as_deref().unwrap_or("Unknown"));
                    println!(
                        "Common Councilor: {}",
                        candidate
                            .district
                            .as_deref()
                            .and_then(|d| config.councilor(d))
                            .unwrap_or("Unknown")
                    );
                }
                LookupOutcome::Ambiguous(candidates) | LookupOutcome::Suggestions(candidates) => {
                    println!("No exact match, did you mean one of the options below?");
                    for candidate in &candidates {
                        println!("  {}", describe_candidate(candidate, &config));
                    }
                }
                LookupOutcome::NotFound => println!("No results found for this address."),
            }
        }
    }

    Ok(())
}

fn describe_candidate(candidate: &Candidate, config: &AppConfig) -> String {
    let mut parts = Vec::new();
    if let Some(district) = &candidate.district {
        parts.push(format!("District {}", district));
    }
    if let Some(ward) = &candidate.ward {
        parts.push(format!("Ward {}", ward));
    }
    if let Some(councilor) = candidate.district.as_deref().and_then(|d| config.councilor(d)) {
        parts.push(format!("Councilor {}", councilor));
    }

    if parts.is_empty() {
        candidate.address.clone()
    } else {
        format!("{} ({})", candidate.address, parts.join(", "))
    }
}
