use serde::Serialize;

use crate::analysis::FrequencyTable;
use crate::color::ColorKey;

/// Proportions this close to 1.0 count as a complete table.
const COMPLETE_EPSILON: f64 = 1e-6;

/// One stacked histogram bar along a single axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistogramBar {
    pub color: ColorKey,
    pub proportion: f64,
    /// Start of the bar along the stacking axis.
    pub offset: f64,
    pub extent: f64,
}

/// Stacks one bar per color, smallest share first, across `total_extent`.
///
/// Zero-proportion entries are skipped. When the proportions sum to 1 the
/// last bar ends exactly at `total_extent`.
pub fn build_histogram(table: &FrequencyTable, total_extent: f64) -> Vec<HistogramBar> {
    let mut bars: Vec<HistogramBar> = Vec::with_capacity(table.len());
    let mut offset = 0.0;
    for (color, proportion) in table.ascending() {
        if proportion <= 0.0 {
            continue;
        }
        let extent = proportion * total_extent;
        bars.push(HistogramBar {
            color,
            proportion,
            offset,
            extent,
        });
        offset += extent;
    }

    if (table.total() - 1.0).abs() <= COMPLETE_EPSILON {
        if let Some(last) = bars.last_mut() {
            last.extent = (total_extent - last.offset).max(0.0);
        }
    }
    bars
}
