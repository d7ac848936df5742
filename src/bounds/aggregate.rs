//! Per-position aggregate bound extrema, error, and the `AVG`
//! sum/count derivation (spec.md §4.4).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub lower: f64,
    pub upper: f64,
}

impl CellBounds {
    pub fn degenerate() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    /// `|u - l| / (|u| + |l|)`, 0 when bounds coincide or sum to zero,
    /// 1 for a degenerate (missing) position (spec.md §4.4).
    pub fn error(&self) -> f64 {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return 1.0;
        }
        if self.lower == self.upper {
            return 0.0;
        }
        let denom = self.lower.abs() + self.upper.abs();
        if denom == 0.0 {
            0.0
        } else {
            (self.upper - self.lower).abs() / denom
        }
    }
}

/// Extrema across all `2^k` runs for one select-item position. `cells[i]`
/// is that position's value in run `i`'s single result row, `None` if
/// the run produced no row or a NULL cell there.
pub fn cell_bounds(cells: &[Option<f64>]) -> CellBounds {
    if cells.is_empty() || cells.iter().any(Option::is_none) {
        return CellBounds::degenerate();
    }
    let lower = cells.iter().filter_map(|c| *c).fold(f64::INFINITY, f64::min);
    let upper = cells
        .iter()
        .filter_map(|c| *c)
        .fold(f64::NEG_INFINITY, f64::max);
    CellBounds { lower, upper }
}

/// Derives `AVG` bounds from independently computed `SUM` and `COUNT`
/// bounds (spec.md §4.4): `(l_sum / u_count, u_sum / l_count)`, swapped
/// if inverted, since the default vector extremizing the sum need not
/// be the one extremizing the count.
pub fn avg_from_sum_count(sum: CellBounds, count: CellBounds) -> CellBounds {
    if !sum.lower.is_finite()
        || !sum.upper.is_finite()
        || !count.lower.is_finite()
        || !count.upper.is_finite()
        || count.lower == 0.0
        || count.upper == 0.0
    {
        return CellBounds::degenerate();
    }
    let mut lower = sum.lower / count.upper;
    let mut upper = sum.upper / count.lower;
    if lower > upper {
        std::mem::swap(&mut lower, &mut upper);
    }
    CellBounds { lower, upper }
}

pub fn mean_error(bounds: &[CellBounds]) -> f64 {
    if bounds.is_empty() {
        return 0.0;
    }
    bounds.iter().map(CellBounds::error).sum::<f64>() / bounds.len() as f64
}

#[derive(Debug, Clone)]
pub struct AggregateBounds {
    pub columns: Vec<String>,
    pub bounds: Vec<CellBounds>,
    pub error: f64,
    /// The select-item row under the all-defaults-1 (optimistic) run,
    /// matching the best-guess result (spec.md §4.5).
    pub best_guess: Option<Vec<crate::engine_db::Value>>,
}
