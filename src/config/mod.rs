use crate::error::Result;
use crate::spatial::Crs;
use crate::utils::constants::*;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source field names in the parcel and district layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub street_number: String,
    pub street_name: String,
    pub parcel_ward: String,
    pub district_id: String,
    pub district_ward: Option<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            street_number: FIELD_STREET_NUMBER.to_string(),
            street_name: FIELD_STREET_NAME.to_string(),
            parcel_ward: FIELD_WARD.to_string(),
            district_id: FIELD_DISTRICT_ID.to_string(),
            district_ward: Some(FIELD_WARD.to_string()),
        }
    }
}

/// Where the output `ward` column comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WardSource {
    /// The parcel's own ward attribute
    Parcel,
    /// The ward attribute of the enclosing district
    District,
    /// The parcel's ward, or the district's when the parcel has none
    #[default]
    ParcelThenDistrict,
}

impl WardSource {
    pub fn resolve(&self, parcel_ward: Option<&str>, district_ward: Option<&str>) -> Option<String> {
        let ward = match self {
            WardSource::Parcel => parcel_ward,
            WardSource::District => district_ward,
            WardSource::ParcelThenDistrict => parcel_ward.or(district_ward),
        };
        ward.map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parcels_path: PathBuf,
    pub districts_path: PathBuf,
    pub output_path: PathBuf,
    /// Linear-unit CRS used for centroids and the join
    pub projected_crs: Crs,
    /// Overrides the CRS declared by the parcel file
    pub parcels_crs: Option<Crs>,
    /// Overrides the CRS declared by the district file
    pub districts_crs: Option<Crs>,
    pub fields: FieldMapping,
    pub ward_source: WardSource,
    /// 0 means one worker per CPU
    pub max_workers: usize,
    /// District id to councilor name, shown by `lookup`
    pub councilors: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parcels_path: PathBuf::from(DEFAULT_PARCELS_PATH),
            districts_path: PathBuf::from(DEFAULT_DISTRICTS_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            projected_crs: Crs::parse(DEFAULT_PROJECTED_CRS).unwrap_or(Crs::Epsg(2262)),
            parcels_crs: None,
            districts_crs: None,
            fields: FieldMapping::default(),
            ward_source: WardSource::default(),
            max_workers: 0,
            councilors: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Layer defaults, an optional TOML file and `PARCEL_DISTRICTS__*` environment
    /// variables, in increasing precedence.
    ///
    /// An explicit `path` must exist; otherwise `parcel-districts.toml` in the
    /// working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config: AppConfig = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn worker_count(&self) -> usize {
        if self.max_workers == 0 {
            num_cpus::get()
        } else {
            self.max_workers
        }
    }

    pub fn councilor(&self, district: &str) -> Option<&str> {
        self.councilors.get(district).map(String::as_str)
    }
}
