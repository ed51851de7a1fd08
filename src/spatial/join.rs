use crate::error::Result;
use crate::models::{District, Parcel};
use crate::utils::progress::ProgressReporter;
use geo::Point;
use rayon::prelude::*;
use tracing::warn;

/// Outcome of locating one parcel centroid among the districts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMatch {
    /// Parcel has no geometry to derive a centroid from
    NoCentroid,
    /// Centroid lies within no district
    Unmatched,
    /// Index of the only district containing the centroid
    Single(usize),
    /// Centroid lies within several overlapping districts; the first wins
    Overlap { first: usize, count: usize },
}

impl JoinMatch {
    pub fn district_index(&self) -> Option<usize> {
        match self {
            JoinMatch::Single(index) => Some(*index),
            JoinMatch::Overlap { first, .. } => Some(*first),
            JoinMatch::NoCentroid | JoinMatch::Unmatched => None,
        }
    }
}

/// District polygons in layer order, searched with an envelope prefilter.
#[derive(Debug, Clone)]
pub struct DistrictIndex {
    districts: Vec<District>,
}

impl DistrictIndex {
    pub fn new(districts: Vec<District>) -> Self {
        Self { districts }
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&District> {
        self.districts.get(index)
    }

    /// Find the districts whose interior contains `point`.
    pub fn locate(&self, point: &Point<f64>) -> JoinMatch {
        let mut matches = self
            .districts
            .iter()
            .enumerate()
            .filter(|(_, district)| district.contains(point))
            .map(|(index, _)| index);

        match matches.next() {
            None => JoinMatch::Unmatched,
            Some(first) => match matches.count() {
                0 => JoinMatch::Single(first),
                rest => JoinMatch::Overlap {
                    first,
                    count: rest + 1,
                },
            },
        }
    }
}

/// Left spatial join of parcel centroids against districts, data-parallel over parcels.
pub struct SpatialJoiner {
    max_workers: usize,
}

impl SpatialJoiner {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// One match per parcel, in parcel order.
    pub fn join(
        &self,
        parcels: &[Parcel],
        index: &DistrictIndex,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<JoinMatch>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()?;

        let matches: Vec<JoinMatch> = pool.install(|| {
            parcels
                .par_iter()
                .map(|parcel| {
                    let found = match parcel.centroid() {
                        Some(point) => index.locate(&point),
                        None => JoinMatch::NoCentroid,
                    };
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    found
                })
                .collect()
        });

        for (position, found) in matches.iter().enumerate() {
            if let JoinMatch::Overlap { first, count } = found {
                warn!(
                    parcel = position,
                    districts = count,
                    assigned = ?index.get(*first).and_then(|d| d.id.as_deref()),
                    "parcel centroid lies within overlapping districts"
                );
            }
        }

        Ok(matches)
    }
}

impl Default for SpatialJoiner {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
