use std::collections::BTreeMap;

use agri_core::{Crop, CropYieldRecord, LocationId, YearMonth};
use chrono::{DateTime, Utc};
use tracing::debug;

const SEASON_SUFFIXES: [&str; 4] = [".autumn", ".winter", ".spring", ".summer"];
const OUTLIER_Z: f64 = 3.0;

/// Strips a trailing season qualifier such as `.winter` from a crop name.
pub fn normalize_crop_name(name: &str) -> String {
    SEASON_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
        .to_string()
}

/// Cleans raw yield records.
///
/// Crop names are normalized, records whose sowing is not strictly before the
/// harvest or whose yield is not finite are dropped, per-crop outliers on
/// duration then yield (|z| ≥ 3) are removed, and records sharing crop,
/// location, sowing and harvest are merged into one with the mean yield. The
/// result is ordered by crop, location, sowing, harvest.
pub fn prepare_records(records: Vec<CropYieldRecord>) -> Vec<CropYieldRecord> {
    let total = records.len();
    let mut by_crop: BTreeMap<String, Vec<CropYieldRecord>> = BTreeMap::new();
    for mut record in records {
        if record.sowing >= record.harvest || !record.yield_per_hectare.is_finite() {
            continue;
        }
        record.crop = normalize_crop_name(&record.crop);
        by_crop.entry(record.crop.clone()).or_default().push(record);
    }

    type Key = (String, LocationId, YearMonth, YearMonth);
    let mut merged: BTreeMap<Key, (f64, usize)> = BTreeMap::new();
    for (_, group) in by_crop {
        let group = drop_outliers(group, |r| r.duration_months() as f64);
        let group = drop_outliers(group, |r| r.yield_per_hectare);
        for record in group {
            let entry = merged
                .entry((record.crop, record.location_id, record.sowing, record.harvest))
                .or_insert((0.0, 0));
            entry.0 += record.yield_per_hectare;
            entry.1 += 1;
        }
    }

    let prepared: Vec<CropYieldRecord> = merged
        .into_iter()
        .map(|((crop, location_id, sowing, harvest), (sum, count))| CropYieldRecord {
            crop,
            location_id,
            sowing,
            harvest,
            yield_per_hectare: sum / count as f64,
        })
        .collect();
    debug!(input = total, output = prepared.len(), "yield records prepared");
    prepared
}

/// Keeps records whose sample z-score on `value` is below the outlier cut.
///
/// Groups with fewer than two records or zero spread are kept whole.
fn drop_outliers<F>(group: Vec<CropYieldRecord>, value: F) -> Vec<CropYieldRecord>
where
    F: Fn(&CropYieldRecord) -> f64,
{
    if group.len() < 2 {
        return group;
    }
    let values: Vec<f64> = group.iter().map(&value).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    if std == 0.0 {
        return group;
    }
    group
        .into_iter()
        .zip(values)
        .filter(|(_, v)| ((v - mean) / std).abs() < OUTLIER_Z)
        .map(|(record, _)| record)
        .collect()
}

/// One crop per name, with min/max farming months from its prepared records.
pub fn derive_crops(records: &[CropYieldRecord], created_at: DateTime<Utc>) -> Vec<Crop> {
    let mut bounds: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for record in records {
        let duration = record.duration_months();
        let entry = bounds
            .entry(record.crop.as_str())
            .or_insert((duration, duration));
        entry.0 = entry.0.min(duration);
        entry.1 = entry.1.max(duration);
    }
    bounds
        .into_iter()
        .map(|(name, (min, max))| Crop {
            name: name.to_string(),
            created_at,
            min_farming_months: u32::try_from(min.max(0)).unwrap_or(0),
            max_farming_months: u32::try_from(max.max(0)).unwrap_or(u32::MAX),
        })
        .collect()
}
