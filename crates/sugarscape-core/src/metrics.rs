//! Wealth statistics and death-rate arithmetic.
//!
//! Both degrade gracefully on an empty population: every statistic over
//! zero agents is zero, and a rate with a zero denominator is zero.

use sugarscape_types::WealthStats;

/// Min, max, mean and population standard deviation of `wealth`.
pub fn wealth_stats(wealth: impl IntoIterator<Item = i64>) -> WealthStats {
    let values: Vec<i64> = wealth.into_iter().collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return WealthStats::default();
    };

    #[allow(clippy::cast_precision_loss)]
    let count_f = values.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let sum: f64 = values.iter().map(|&w| w as f64).sum();
    let mean = sum / count_f;

    #[allow(clippy::cast_precision_loss)]
    let variance_sum: f64 = values
        .iter()
        .map(|&w| {
            let diff = w as f64 - mean;
            diff * diff
        })
        .sum();
    let stdev = (variance_sum / count_f).sqrt();

    WealthStats {
        count: u64::try_from(values.len()).unwrap_or(u64::MAX),
        min,
        max,
        mean,
        stdev,
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
#[allow(clippy::cast_precision_loss)]
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
