use serde::{Deserialize, Serialize};

use crate::core::finite_extent;
use crate::error::{AtlasError, AtlasResult};

/// Aggregate over the half-open interval `[start, end)`.
///
/// The last bin of a partition also owns the domain's upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    /// Sum of the finite measures assigned to this bin.
    pub sum: f64,
    /// Number of records assigned to this bin, including ones whose measure
    /// was not finite.
    pub count: usize,
}

impl Bin {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Partitions `items` into bins over `domain` split at `thresholds`.
///
/// - `domain = None` falls back to the extent of the finite `value_of`
///   values; with no such values the call fails with `EmptyDomain`.
/// - Thresholds are sorted and de-duplicated; those not strictly inside the
///   domain are ignored, so `k` usable thresholds give `k + 1` bins.
/// - Items whose value is outside `[low, high]` (or `NaN`) are skipped.
/// - Every interval is present in the output, empty ones with `sum = 0`.
///
/// Sums do not depend on input order: each bin's measures are added in
/// ascending order.
pub fn bin_records<T, V, M>(
    items: &[T],
    domain: Option<(f64, f64)>,
    thresholds: &[f64],
    value_of: V,
    measure_of: M,
) -> AtlasResult<Vec<Bin>>
where
    V: Fn(&T) -> f64,
    M: Fn(&T) -> f64,
{
    let (low, high) = match domain {
        Some((low, high)) => {
            if !low.is_finite() || !high.is_finite() || low > high {
                return Err(AtlasError::InvalidDomain { low, high });
            }
            (low, high)
        }
        None => finite_extent(items.iter().map(&value_of)).ok_or(AtlasError::EmptyDomain)?,
    };

    let mut cuts: Vec<f64> = thresholds
        .iter()
        .copied()
        .filter(|threshold| *threshold > low && *threshold < high)
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    let mut assigned: Vec<Vec<f64>> = vec![Vec::new(); cuts.len() + 1];
    for item in items {
        let value = value_of(item);
        if !(value >= low && value <= high) {
            continue;
        }
        let index = cuts.partition_point(|cut| *cut <= value);
        assigned[index].push(measure_of(item));
    }

    let bins = assigned
        .into_iter()
        .enumerate()
        .map(|(index, mut measures)| {
            measures.sort_by(f64::total_cmp);
            let sum = measures
                .iter()
                .filter(|measure| measure.is_finite())
                .fold(0.0, |acc, measure| acc + measure);
            Bin {
                start: if index == 0 { low } else { cuts[index - 1] },
                end: cuts.get(index).copied().unwrap_or(high),
                sum,
                count: measures.len(),
            }
        })
        .collect();

    Ok(bins)
}

/// Largest bin sum, `0` for an empty slice.
#[must_use]
pub fn max_bin_sum(bins: &[Bin]) -> f64 {
    bins.iter()
        .map(|bin| bin.sum)
        .filter(|sum| sum.is_finite())
        .fold(0.0, f64::max)
}
