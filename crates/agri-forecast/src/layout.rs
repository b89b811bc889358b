use agri_core::{AgriError, Channel, ClimateRecord, DriverRecord, ErrorInfo, COS_YEAR, SIN_YEAR};
use serde::{Deserialize, Serialize};

/// Partition of the enriched feature vector into predicted targets and known drivers.
///
/// The vector is laid out as `targets…, sin_year, cos_year, drivers…`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    targets: Vec<Channel>,
    drivers: Vec<Channel>,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            targets: Channel::TARGETS.to_vec(),
            drivers: Channel::DRIVERS.to_vec(),
        }
    }
}

impl FeatureLayout {
    /// Creates a layout with explicit target and driver channels.
    pub fn new(targets: Vec<Channel>, drivers: Vec<Channel>) -> Result<Self, AgriError> {
        if let Some(shared) = targets.iter().find(|c| drivers.contains(c)) {
            return Err(AgriError::Validation(
                ErrorInfo::new("layout-overlap", "a channel cannot be both target and driver")
                    .with_context("channel", shared),
            ));
        }
        Ok(Self { targets, drivers })
    }

    /// Predicted channels.
    pub fn targets(&self) -> &[Channel] {
        &self.targets
    }

    /// Exogenous channels.
    pub fn drivers(&self) -> &[Channel] {
        &self.drivers
    }

    /// Width of the enriched vector.
    pub fn width(&self) -> usize {
        self.targets.len() + 2 + self.drivers.len()
    }

    /// Column names in vector order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.targets.iter().map(|c| c.name().to_string()).collect();
        columns.push(SIN_YEAR.to_string());
        columns.push(COS_YEAR.to_string());
        columns.extend(self.drivers.iter().map(|c| c.name().to_string()));
        columns
    }

    /// Enriched vector of an observed record.
    pub fn enrich(&self, record: &ClimateRecord) -> Vec<f64> {
        let (sin, cos) = record.period.cyclical();
        let mut row: Vec<f64> = self.targets.iter().map(|c| record.value(*c)).collect();
        row.push(sin);
        row.push(cos);
        row.extend(self.drivers.iter().map(|c| record.value(*c)));
        row
    }

    /// Target slice of an enriched vector.
    pub fn target_part<'a>(&self, row: &'a [f64]) -> &'a [f64] {
        &row[..self.targets.len()]
    }

    /// Enriched vector for a forecast month from predicted targets and projected drivers.
    pub fn compose(&self, targets: &[f64], drivers: &DriverRecord) -> Result<Vec<f64>, AgriError> {
        if targets.len() != self.targets.len() {
            return Err(AgriError::Evaluation(
                ErrorInfo::new("target-width", "prediction width does not match the layout")
                    .with_context("expected", self.targets.len())
                    .with_context("actual", targets.len()),
            ));
        }
        let (sin, cos) = drivers.period.cyclical();
        let mut row = Vec::with_capacity(self.width());
        row.extend_from_slice(targets);
        row.push(sin);
        row.push(cos);
        for channel in &self.drivers {
            row.push(drivers.value(*channel)?);
        }
        Ok(row)
    }
}
