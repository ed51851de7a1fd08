/// Default input and output file names
pub const DEFAULT_PARCELS_PATH: &str = "Syracuse_Parcel_Map_(2024_Q4).geojson";
pub const DEFAULT_DISTRICTS_PATH: &str = "Syracuse_Common_Council_Boundaries_(2023).geojson";
pub const DEFAULT_OUTPUT_PATH: &str = "syracuse_addresses_with_council_district_and_ward.csv";
pub const DEFAULT_CONFIG_FILE: &str = "parcel-districts.toml";

/// NAD83 / New York West (ftUS)
pub const DEFAULT_PROJECTED_CRS: &str = "EPSG:2262";

/// Source layer field names
pub const FIELD_STREET_NUMBER: &str = "ADDRESSNUM";
pub const FIELD_STREET_NAME: &str = "ADDRESSNAM";
pub const FIELD_WARD: &str = "CITY_WARD";
pub const FIELD_DISTRICT_ID: &str = "DIST_ID";

/// Output column names
pub const COLUMN_STREET_NUMBER: &str = "street_number";
pub const COLUMN_STREET_NAME: &str = "street_name";
pub const COLUMN_COUNCIL_DISTRICT: &str = "council_district";
pub const COLUMN_WARD: &str = "ward";

/// Range dataset column names
pub const RANGE_NUM_FROM: &str = "Num From";
pub const RANGE_NUM_TO: &str = "Num To";
pub const RANGE_TYPE: &str = "RangeType";
pub const RANGE_STREET_NAME: &str = "Street Name";
pub const RANGE_WARD: &str = "Ward";
pub const RANGE_COUNCIL_CODE: &str = "CityCouncilCode";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PARCEL_DISTRICTS";

/// Layer labels used in logs and errors
pub const LAYER_PARCELS: &str = "parcels";
pub const LAYER_DISTRICTS: &str = "districts";
