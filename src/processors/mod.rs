pub mod address_builder;
pub mod pipeline;

pub use address_builder::{AddressBuilder, JoinReport};
pub use pipeline::{DistrictPipeline, PipelineOutput};
