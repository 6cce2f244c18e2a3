//! Leibniz series partial sums
//!
//! π/4 = 1 - 1/3 + 1/5 - 1/7 + ...
//!
//! Every function here is pure and accumulates terms in increasing index order.
//! Floating-point addition is not associative, so the order is part of the contract:
//! two calls over the same range always produce the same bits.

/// Largest term count whose highest denominator `2 * i + 1` still fits in a `u64`
///
/// The coordinator refuses larger counts. The series functions themselves accept
/// any index.
pub const MAX_TERMS: u64 = u64::MAX / 2;

/// Number of terms summed between two cancellation polls in [`sum_range_until`]
pub const CANCEL_POLL_INTERVAL: u64 = 1 << 16;

/// The `i`-th term of the series, `(-1)^i / (2i + 1)`
///
/// # Examples
///
/// ```
/// use leibniz_pi::series::term;
///
/// assert_eq!(term(0), 1.0);
/// assert_eq!(term(1), -1.0 / 3.0);
/// ```
#[inline]
pub fn term(i: u64) -> f64 {
    let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
    let denominator = match i.checked_mul(2) {
        Some(twice) => (twice + 1) as f64,
        // Past MAX_TERMS the denominator needs more than 64 bits
        None => (2 * u128::from(i) + 1) as f64,
    };
    sign / denominator
}

/// Sum the series over the half-open index range `[start, end)`
///
/// An empty range (`start >= end`) sums to exactly `0.0`.
///
/// # Examples
///
/// ```
/// use leibniz_pi::series::sum_range;
///
/// assert_eq!(sum_range(5, 5), 0.0);
/// assert_eq!(sum_range(0, 1), 1.0);
/// ```
pub fn sum_range(start: u64, end: u64) -> f64 {
    let mut partial_sum = 0.0;
    for i in start..end {
        partial_sum += term(i);
    }
    partial_sum
}

/// Like [`sum_range`], but polls `should_stop` every [`CANCEL_POLL_INTERVAL`] terms
///
/// Returns `None` as soon as `should_stop` reports true. When it never does, the
/// result is bit-identical to `sum_range(start, end)`.
pub fn sum_range_until<F>(start: u64, end: u64, should_stop: F) -> Option<f64>
where
    F: Fn() -> bool,
{
    let mut partial_sum = 0.0;
    let mut block_start = start;

    while block_start < end {
        if should_stop() {
            return None;
        }

        let block_end = block_start.saturating_add(CANCEL_POLL_INTERVAL).min(end);
        for i in block_start..block_end {
            partial_sum += term(i);
        }
        block_start = block_end;
    }

    Some(partial_sum)
}
