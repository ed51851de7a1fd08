use crate::config::WardSource;
use crate::models::{AddressRecord, Parcel};
use crate::spatial::{DistrictIndex, JoinMatch};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub total_parcels: usize,
    pub district_count: usize,
    pub written_records: usize,
    pub dropped_missing_address: usize,
    pub unmatched_parcels: usize,
    pub overlapping_parcels: usize,
    pub parcels_without_geometry: usize,
    pub records_per_district: BTreeMap<String, usize>,
}

impl JoinReport {
    /// Generate a summary report
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();
        let percent = |count: usize| {
            if self.total_parcels == 0 {
                0.0
            } else {
                100.0 * count as f64 / self.total_parcels as f64
            }
        };

        summary.push_str("=== Spatial Join Report ===\n");
        summary.push_str(&format!("Parcels: {}\n", self.total_parcels));
        summary.push_str(&format!("Districts: {}\n", self.district_count));
        summary.push_str(&format!(
            "Records Written: {} ({:.1}%)\n",
            self.written_records,
            percent(self.written_records)
        ));
        summary.push_str(&format!(
            "Dropped (missing address): {} ({:.1}%)\n",
            self.dropped_missing_address,
            percent(self.dropped_missing_address)
        ));
        summary.push_str(&format!(
            "Outside All Districts: {}\n",
            self.unmatched_parcels
        ));
        summary.push_str(&format!(
            "Overlapping Districts: {}\n",
            self.overlapping_parcels
        ));
        summary.push_str(&format!(
            "Without Geometry: {}\n",
            self.parcels_without_geometry
        ));

        if !self.records_per_district.is_empty() {
            summary.push_str("\nRecords per District:\n");
            for (district, count) in &self.records_per_district {
                summary.push_str(&format!("  {}: {}\n", district, count));
            }
        }

        summary
    }
}

/// Turns joined parcels into cleaned output rows.
pub struct AddressBuilder {
    ward_source: WardSource,
}

impl AddressBuilder {
    pub fn new(ward_source: WardSource) -> Self {
        Self { ward_source }
    }

    /// Build one record per parcel with a usable address, in parcel order.
    ///
    /// Street number and name are trimmed; a parcel missing either, or with
    /// either blank after trimming, is dropped. Parcels outside every
    /// district are kept with a null district.
    pub fn build(
        &self,
        parcels: &[Parcel],
        matches: &[JoinMatch],
        index: &DistrictIndex,
    ) -> (Vec<AddressRecord>, JoinReport) {
        let mut report = JoinReport {
            total_parcels: parcels.len(),
            district_count: index.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(parcels.len());

        for (parcel, found) in parcels.iter().zip(matches) {
            match found {
                JoinMatch::NoCentroid => report.parcels_without_geometry += 1,
                JoinMatch::Unmatched => report.unmatched_parcels += 1,
                JoinMatch::Overlap { .. } => report.overlapping_parcels += 1,
                JoinMatch::Single(_) => {}
            }

            let district = found.district_index().and_then(|i| index.get(i));
            let record = AddressRecord::new(
                clean(parcel.street_number.as_deref()),
                clean(parcel.street_name.as_deref()),
                district.and_then(|d| d.id.clone()),
                self.ward_source.resolve(
                    parcel.ward.as_deref(),
                    district.and_then(|d| d.ward.as_deref()),
                ),
            );

            if record.validate().is_err() {
                report.dropped_missing_address += 1;
                continue;
            }

            if let Some(id) = &record.council_district {
                *report.records_per_district.entry(id.clone()).or_default() += 1;
            }
            records.push(record);
        }

        report.written_records = records.len();
        (records, report)
    }
}

impl Default for AddressBuilder {
    fn default() -> Self {
        Self::new(WardSource::default())
    }
}

fn clean(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
