use agri_core::{AgriError, ErrorInfo, RngHandle};
use rand::seq::SliceRandom;

/// Shuffles `0..n` with `seed` and returns `(train, test)` index sets.
///
/// The test set holds `ceil(test_fraction * n)` rows, at least one, and the
/// training set keeps at least one.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), AgriError> {
    if n < 2 {
        return Err(AgriError::Validation(
            ErrorInfo::new("too-few-records", "at least two records are needed to split")
                .with_context("records", n),
        ));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AgriError::Validation(
            ErrorInfo::new("test-fraction", "test fraction must lie strictly between 0 and 1")
                .with_context("value", test_fraction),
        ));
    }
    let test_count = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(RngHandle::from_seed(seed).inner_mut());
    let train = order.split_off(test_count);
    Ok((train, order))
}
