pub mod matcher;
pub mod normalize;

pub use matcher::{AddressIndex, AddressLookup, Candidate, LookupOutcome};
pub use normalize::{parse_address, ParsedAddress};
