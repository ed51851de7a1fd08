pub mod crs;
pub mod join;
pub mod reproject;

pub use crs::Crs;
pub use join::{DistrictIndex, JoinMatch, SpatialJoiner};
pub use reproject::Reprojector;
