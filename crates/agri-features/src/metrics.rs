use agri_core::{AgriError, ErrorInfo};

fn check(y_true: &[f64], y_pred: &[f64]) -> Result<(), AgriError> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return Err(AgriError::Evaluation(
            ErrorInfo::new("metric-shape", "metric inputs must be non-empty and equal length")
                .with_context("truth", y_true.len())
                .with_context("predicted", y_pred.len()),
        ));
    }
    Ok(())
}

/// Mean squared error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, AgriError> {
    check(y_true, y_pred)?;
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Root mean squared error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, AgriError> {
    mse(y_true, y_pred).map(f64::sqrt)
}

/// Coefficient of determination.
///
/// With a constant truth vector the score is 1.0 for an exact fit and 0.0
/// otherwise.
pub fn r2(y_true: &[f64], y_pred: &[f64]) -> Result<f64, AgriError> {
    check(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
