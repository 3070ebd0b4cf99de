//! Stateless numeric primitives used by the aggregation engine.
//!
//! Undefined results (no values, zero variance) are `None` rather than NaN.

/// Running sum and count for an arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` when nothing was pushed.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Arithmetic mean; `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut acc = MeanAccumulator::default();
    for v in values {
        acc.push(v);
    }
    acc.mean()
}

/// Pearson correlation coefficient of two equally long samples.
///
/// Returns `None` for fewer than two pairs or when either sample is constant.
/// The result is clamped to `[-1, 1]` against rounding drift.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }

    let mean_x = mean(xs.iter().copied())?;
    let mean_y = mean(ys.iter().copied())?;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Equal-width partition of `[min, max]` into a fixed number of bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualWidthBins {
    min: f64,
    width: f64,
    count: usize,
}

impl EqualWidthBins {
    /// `None` when `count` is zero, a bound is NaN, or `min > max`.
    pub fn new(min: f64, max: f64, count: usize) -> Option<Self> {
        if count == 0 || min.is_nan() || max.is_nan() || min > max {
            return None;
        }
        Some(EqualWidthBins {
            min,
            width: (max - min) / count as f64,
            count,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `[lower, upper]` edges of bin `index`.
    pub fn edges(&self, index: usize) -> (f64, f64) {
        let lower = self.min + self.width * index as f64;
        (lower, lower + self.width)
    }

    /// Bin holding `value`. Bins are half-open except the last, which also
    /// holds `max`. Values outside the range are clamped to the edge bins.
    /// A zero-width range puts everything in the first bin.
    pub fn index_of(&self, value: f64) -> usize {
        if self.width == 0.0 || value <= self.min {
            return 0;
        }
        let index = ((value - self.min) / self.width).floor() as usize;
        index.min(self.count - 1)
    }
}
