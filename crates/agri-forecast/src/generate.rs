use std::collections::VecDeque;

use agri_core::{AgriError, ClimateFrame, ClimateRecord, DriverRecord, ErrorInfo};
use tracing::debug;

use crate::artifact::GenerativeModelArtifact;
use crate::training::SEQ_LENGTH;

/// Rolls the model forward one month per driver record.
///
/// `seed` must hold exactly 12 consecutive months and `drivers` must start the
/// month after the seed ends and continue without gaps. Each output row is
/// `predicted targets, sin_year, cos_year, drivers`.
pub fn generate_forecast(
    artifact: &GenerativeModelArtifact,
    seed: &[ClimateRecord],
    drivers: &[DriverRecord],
) -> Result<ClimateFrame, AgriError> {
    if seed.len() != SEQ_LENGTH {
        return Err(AgriError::Validation(
            ErrorInfo::new("seed-length", "seed window must hold exactly 12 months")
                .with_context("actual", seed.len()),
        ));
    }
    if let Some(pair) = seed.windows(2).find(|pair| !pair[1].period.follows(pair[0].period)) {
        return Err(AgriError::Validation(
            ErrorInfo::new("seed-gap", "seed window is not contiguous")
                .with_context("previous", pair[0].period)
                .with_context("next", pair[1].period),
        ));
    }
    let (Some(first_driver), Some(last_seed)) = (drivers.first(), seed.last()) else {
        return Err(AgriError::validation(
            "empty-drivers",
            "driver sequence for the forecast horizon is empty",
        ));
    };
    if !first_driver.period.follows(last_seed.period) {
        return Err(AgriError::Validation(
            ErrorInfo::new("boundary", "drivers must start one month after the seed")
                .with_context("seed_end", last_seed.period)
                .with_context("drivers_start", first_driver.period)
                .with_hint("expected drivers from the month following the seed"),
        ));
    }
    if let Some(pair) = drivers.windows(2).find(|pair| !pair[1].period.follows(pair[0].period)) {
        return Err(AgriError::Validation(
            ErrorInfo::new("driver-gap", "driver sequence is not contiguous")
                .with_context("previous", pair[0].period)
                .with_context("next", pair[1].period),
        ));
    }

    let layout = &artifact.layout;
    let mut window: VecDeque<Vec<f64>> = seed.iter().map(|r| layout.enrich(r)).collect();
    let mut frame = ClimateFrame::new(layout.columns());

    for driver in drivers {
        let targets = match &artifact.model {
            Some(model) => {
                let rows: Vec<Vec<f64>> = window.iter().cloned().collect();
                let scaled = model.input_scaler.transform(&rows)?;
                let predicted = model.network.predict(&scaled)?;
                model.target_scaler.inverse_transform_row(&predicted)?
            }
            None => Vec::new(),
        };
        let row = layout.compose(&targets, driver)?;
        frame.push_row(driver.period, row.clone())?;
        window.pop_front();
        window.push_back(row);
    }
    debug!(
        location = %artifact.location_id,
        months = frame.len(),
        "forecast generated"
    );
    Ok(frame)
}
