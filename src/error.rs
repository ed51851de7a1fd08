use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("dBase error: {0}")]
    Dbase(#[from] shapefile::dbase::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    #[error("The {layer} layer declares no coordinate reference system; set {layer}_crs in the configuration")]
    UndeclaredCrs { layer: String },

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Feature {index} in {layer} layer has non-polygonal geometry: {kind}")]
    NonPolygonal {
        layer: String,
        index: usize,
        kind: String,
    },

    #[error("Field '{field}' not found in {layer} layer")]
    MissingField { layer: String, field: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
