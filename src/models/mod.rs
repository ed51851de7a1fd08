pub mod address;
pub mod district;
pub mod layer;
pub mod parcel;

pub use address::AddressRecord;
pub use district::District;
pub use layer::{Attributes, Layer, LayerFeature};
pub use parcel::Parcel;
