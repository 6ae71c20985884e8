//! Record selection and wind-radii bucketing.
//!
//! Turns a heterogeneous list of deck records into per-model, per-bucket
//! parallel arrays the engine can work on:
//!
//! - keep records for the target cycle (and storm, if given)
//! - keep configured models only (optionally narrowed further)
//! - split each model by wind-radii threshold, dropping thin buckets
//!
//! Inputs are never modified. A model that ends up with no buckets is not an
//! error.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Configuration;
use crate::domain::{
    BucketMap, DeckRecord, ModelData, ModelMap, N_FIELDS, Storm, WindRadiiBucket, from_deck_missing,
};

/// Fewest samples a bucket needs to be interpolated.
pub const MIN_BUCKET_SAMPLES: usize = 2;

/// Counters describing what selection kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub records_read: usize,
    pub records_used: usize,
    pub buckets_dropped: usize,
}

/// Selected model data plus counters.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub model_data: ModelMap,
    pub stats: SelectionStats,
}

/// Select records for one cycle and build bucketed model data.
pub fn select_model_data(
    records: &[DeckRecord],
    dtg: DateTime<Utc>,
    storm: Option<&Storm>,
    config: &Configuration,
    models: Option<&[String]>,
) -> Selection {
    let by_model = select_records(records, dtg, storm, config, models);

    let mut stats = SelectionStats {
        records_read: records.len(),
        records_used: by_model.values().map(Vec::len).sum(),
        buckets_dropped: 0,
    };

    let mut model_data = ModelMap::new();
    for (model, recs) in by_model {
        let (buckets, dropped) = build_buckets(&recs);
        stats.buckets_dropped += dropped;
        debug!(
            model = %model,
            records = recs.len(),
            buckets = buckets.len(),
            dropped,
            "bucketed model records"
        );
        model_data.insert(model, buckets);
    }

    Selection { model_data, stats }
}

/// Group qualifying records by technique name.
pub fn select_records<'a>(
    records: &'a [DeckRecord],
    dtg: DateTime<Utc>,
    storm: Option<&Storm>,
    config: &Configuration,
    models: Option<&[String]>,
) -> BTreeMap<String, Vec<&'a DeckRecord>> {
    let wanted: Option<HashSet<&str>> = models.map(|m| m.iter().map(String::as_str).collect());

    let mut out: BTreeMap<String, Vec<&DeckRecord>> = BTreeMap::new();
    for rec in records {
        if rec.ref_time != dtg {
            continue;
        }
        if let Some(storm) = storm {
            if !rec.belongs_to(storm) {
                continue;
            }
        }
        let tech = rec.technique.as_str();
        if !config.contains_model(tech) {
            continue;
        }
        if let Some(wanted) = &wanted {
            if !wanted.contains(tech) {
                continue;
            }
        }
        out.entry(rec.technique.clone()).or_default().push(rec);
    }
    out
}

/// Split one model's records into wind-radii buckets.
///
/// Returns the buckets plus the number dropped for having fewer than
/// [`MIN_BUCKET_SAMPLES`] samples.
pub fn build_buckets(records: &[&DeckRecord]) -> (BucketMap, usize) {
    let mut buckets = BucketMap::new();
    let mut dropped = 0;

    for bucket in WindRadiiBucket::ALL {
        let mut recs: Vec<&DeckRecord> = records
            .iter()
            .copied()
            .filter(|r| WindRadiiBucket::from_threshold(r.rad_wind) == Some(bucket))
            .collect();

        if recs.is_empty() {
            continue;
        }
        if recs.len() < MIN_BUCKET_SAMPLES {
            dropped += 1;
            continue;
        }

        // Stable, so duplicate hours keep their deck order.
        recs.sort_by_key(|r| r.fcst_hour);
        buckets.insert(bucket, model_data_from_records(&recs));
    }

    (buckets, dropped)
}

/// Build parallel arrays from records, mapping deck missing values to NaN.
pub fn model_data_from_records(records: &[&DeckRecord]) -> ModelData {
    let forecast_hour = records.iter().map(|r| r.fcst_hour).collect();
    let mut fields: [Vec<f32>; N_FIELDS] = Default::default();
    for values in fields.iter_mut() {
        values.reserve(records.len());
    }
    for rec in records {
        for (f, v) in rec.tracked_fields().into_iter().enumerate() {
            fields[f].push(from_deck_missing(v));
        }
    }
    ModelData::new(forecast_hour, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::domain::deck::tests::record;
    use crate::domain::{Field, MISSING};
    use chrono::TimeZone;

    fn config(models: &[&str]) -> Configuration {
        Configuration::new(
            models.iter().map(|m| ModelConfig {
                input_name: m.to_string(),
                output_name: format!("{m}X"),
                min_relax_fcst_hour: 12,
                max_relax_fcst_hour: 72,
            }),
            10,
            6,
        )
        .unwrap()
    }

    fn dtg() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 28, 12, 0, 0).unwrap()
    }

    #[test]
    fn selects_cycle_storm_and_configured_models() {
        let mut other_cycle = record("GFSI", 0, 34.0);
        other_cycle.ref_time = Utc.with_ymd_and_hms(2020, 8, 28, 6, 0, 0).unwrap();
        let mut other_storm = record("GFSI", 6, 34.0);
        other_storm.cyclone_num = 10;

        let records = vec![
            record("GFSI", 0, 34.0),
            record("GFSI", 12, 34.0),
            record("HWFI", 0, 34.0),
            record("XTRP", 0, 34.0),
            other_cycle,
            other_storm,
        ];
        let storm: Storm = "AL092020".parse().unwrap();
        let cfg = config(&["GFSI", "HWFI"]);

        let selected = select_records(&records, dtg(), Some(&storm), &cfg, None);
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["GFSI", "HWFI"]);
        assert_eq!(selected["GFSI"].len(), 2);

        let only = vec!["HWFI".to_string()];
        let selected = select_records(&records, dtg(), Some(&storm), &cfg, Some(&only));
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["HWFI"]);
    }

    #[test]
    fn without_storm_filter_any_storm_matches() {
        let mut other_storm = record("GFSI", 6, 34.0);
        other_storm.basin = "EP".to_string();
        let records = vec![record("GFSI", 0, 34.0), other_storm];
        let selected = select_records(&records, dtg(), None, &config(&["GFSI"]), None);
        assert_eq!(selected["GFSI"].len(), 2);
    }

    #[test]
    fn single_sample_buckets_are_dropped() {
        let records = vec![
            record("GFSI", 0, 34.0),
            record("GFSI", 12, 34.0),
            record("GFSI", 0, 50.0),
            record("GFSI", 0, 35.0),
        ];
        let refs: Vec<&DeckRecord> = records.iter().collect();
        let (buckets, dropped) = build_buckets(&refs);
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![WindRadiiBucket::Kt34]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn bucket_arrays_are_sorted_and_missing_is_nan() {
        let mut late = record("GFSI", 24, 64.0);
        late.quad2_wind_rad = MISSING;
        let records = vec![late, record("GFSI", 0, 64.0)];
        let refs: Vec<&DeckRecord> = records.iter().collect();
        let (buckets, _) = build_buckets(&refs);

        let data = &buckets[&WindRadiiBucket::Kt64];
        assert_eq!(data.forecast_hour, vec![0, 24]);
        assert_eq!(data.field(Field::Quad2WindRad)[0], 50.0);
        assert!(data.field(Field::Quad2WindRad)[1].is_nan());
        assert!(data.check_shape("GFSI", WindRadiiBucket::Kt64).is_ok());
    }

    #[test]
    fn selection_counts_records() {
        let records = vec![
            record("GFSI", 0, 34.0),
            record("GFSI", 6, 34.0),
            record("GFSI", 0, 50.0),
            record("NONE", 0, 34.0),
        ];
        let sel = select_model_data(&records, dtg(), None, &config(&["GFSI"]), None);
        assert_eq!(
            sel.stats,
            SelectionStats {
                records_read: 4,
                records_used: 3,
                buckets_dropped: 1,
            }
        );
        assert_eq!(sel.model_data["GFSI"].len(), 1);
    }
}
