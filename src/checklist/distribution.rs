use serde::{Deserialize, Serialize};

/// Safely convert usize to f64 for summary statistics
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Descriptive statistics over a set of values
///
/// Mirrors the usual `count, mean, std, min, 25%, 50%, 75%, max` summary.
/// Quantiles use linear interpolation between closest ranks and `std` is the
/// sample standard deviation, so it is undefined for fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Distribution {
    /// Column headers in display order
    pub const HEADERS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    #[must_use]
    pub fn describe(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                q25: None,
                median: None,
                q75: None,
                max: None,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = count_to_f64(count);
        let mean = sorted.iter().sum::<f64>() / n;
        let std = (count > 1).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std,
            min: sorted.first().copied(),
            q25: Some(quantile(&sorted, 0.25)),
            median: Some(quantile(&sorted, 0.50)),
            q75: Some(quantile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }

    /// Describe a set of counts (cluster sizes, categories per cluster)
    #[must_use]
    pub fn from_counts<I: IntoIterator<Item = usize>>(counts: I) -> Self {
        let values: Vec<f64> = counts.into_iter().map(count_to_f64).collect();
        Self::describe(&values)
    }

    /// Values in [`Self::HEADERS`] order, formatted for a table cell
    #[must_use]
    pub fn row(&self) -> [String; 8] {
        let cell = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"));
        [
            self.count.to_string(),
            cell(self.mean),
            cell(self.std),
            cell(self.min),
            cell(self.q25),
            cell(self.median),
            cell(self.q75),
            cell(self.max),
        ]
    }
}

/// Linear-interpolated quantile of non-empty sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * count_to_f64(sorted.len() - 1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // position >= 0
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = position - position.floor();
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
