use serde::{Deserialize, Serialize};
use validator::Validate;

/// One output row: an address annotated with its council district and ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AddressRecord {
    #[validate(length(min = 1))]
    pub street_number: String,

    #[validate(length(min = 1))]
    pub street_name: String,

    pub council_district: Option<String>,

    pub ward: Option<String>,
}

impl AddressRecord {
    pub fn new(
        street_number: String,
        street_name: String,
        council_district: Option<String>,
        ward: Option<String>,
    ) -> Self {
        Self {
            street_number,
            street_name,
            council_district,
            ward,
        }
    }

    pub fn has_district(&self) -> bool {
        self.council_district.is_some()
    }
}
