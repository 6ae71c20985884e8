//! A-deck records and storm identity.
//!
//! Only the columns the interpolator reads or writes are modelled. Records are
//! serde types so the binary can exchange them as JSON.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{N_FIELDS, from_deck_missing};

/// Technique number stamped on synthesized (interpolated) records.
pub const INTERPOLATED_TECHNIQUE_NUM: i32 = 3;

/// Quadrant convention of the synthesized wind radii.
pub const RAD_WIND_QUAD_NEQ: &str = "NEQ";

/// One forecast entry from an A-deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub ref_time: DateTime<Utc>,
    pub year: i32,
    pub basin: String,
    pub cyclone_num: i32,
    #[serde(default)]
    pub technique_num: i32,
    pub technique: String,
    pub fcst_hour: i32,
    pub clat: f32,
    pub clon: f32,
    pub wind_max: f32,
    #[serde(default)]
    pub mslp: f32,
    #[serde(default)]
    pub intensity: String,
    pub rad_wind: f32,
    #[serde(default)]
    pub rad_wind_quad: String,
    pub quad1_wind_rad: f32,
    pub quad2_wind_rad: f32,
    pub quad3_wind_rad: f32,
    pub quad4_wind_rad: f32,
}

impl DeckRecord {
    /// The seven tracked fields in storage order, raw deck values.
    pub fn tracked_fields(&self) -> [f32; N_FIELDS] {
        [
            self.clat,
            self.clon,
            self.wind_max,
            self.quad1_wind_rad,
            self.quad2_wind_rad,
            self.quad3_wind_rad,
            self.quad4_wind_rad,
        ]
    }

    /// Truth vector for bias correction: deck missing values become NaN so
    /// they request no adjustment.
    pub fn truth_fields(&self) -> [f32; N_FIELDS] {
        self.tracked_fields().map(from_deck_missing)
    }

    pub fn belongs_to(&self, storm: &Storm) -> bool {
        self.year == storm.year
            && self.basin == storm.basin
            && self.cyclone_num == storm.cyclone_num
    }
}

/// Storm identity: year, basin and cyclone number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Storm {
    pub year: i32,
    pub basin: String,
    pub cyclone_num: i32,
}

impl Storm {
    pub fn from_record(rec: &DeckRecord) -> Self {
        Self {
            year: rec.year,
            basin: rec.basin.clone(),
            cyclone_num: rec.cyclone_num,
        }
    }
}

impl fmt::Display for Storm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{:04}", self.basin, self.cyclone_num, self.year)
    }
}

/// Parses storm ids of the form `AL092020` (basin, number, year).
impl FromStr for Storm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 8 || !s.is_ascii() {
            return Err(format!("Invalid storm id '{s}'. Expected e.g. AL092020."));
        }
        let basin = &s[0..2];
        if !basin.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid basin in storm id '{s}'."));
        }
        let cyclone_num = s[2..4]
            .parse::<i32>()
            .map_err(|_| format!("Invalid cyclone number in storm id '{s}'."))?;
        let year = s[4..8]
            .parse::<i32>()
            .map_err(|_| format!("Invalid year in storm id '{s}'."))?;
        Ok(Storm {
            year,
            basin: basin.to_ascii_uppercase(),
            cyclone_num,
        })
    }
}

/// Canonical A-deck ordering: reference time, technique number, technique
/// name length, technique name, forecast hour, wind-radii threshold.
pub fn adeck_order(a: &DeckRecord, b: &DeckRecord) -> Ordering {
    a.ref_time
        .cmp(&b.ref_time)
        .then_with(|| a.technique_num.cmp(&b.technique_num))
        .then_with(|| a.technique.len().cmp(&b.technique.len()))
        .then_with(|| a.technique.cmp(&b.technique))
        .then_with(|| a.fcst_hour.cmp(&b.fcst_hour))
        .then_with(|| a.rad_wind.total_cmp(&b.rad_wind))
}

pub fn sort_adeck(records: &mut [DeckRecord]) {
    records.sort_by(adeck_order);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn record(technique: &str, fcst_hour: i32, rad_wind: f32) -> DeckRecord {
        DeckRecord {
            ref_time: Utc.with_ymd_and_hms(2020, 8, 28, 12, 0, 0).unwrap(),
            year: 2020,
            basin: "AL".to_string(),
            cyclone_num: 9,
            technique_num: 3,
            technique: technique.to_string(),
            fcst_hour,
            clat: 20.0,
            clon: -60.0,
            wind_max: 50.0,
            mslp: 0.0,
            intensity: String::new(),
            rad_wind,
            rad_wind_quad: RAD_WIND_QUAD_NEQ.to_string(),
            quad1_wind_rad: 60.0,
            quad2_wind_rad: 50.0,
            quad3_wind_rad: 40.0,
            quad4_wind_rad: 30.0,
        }
    }

    #[test]
    fn storm_id_parses_and_displays() {
        let storm: Storm = "al092020".parse().unwrap();
        assert_eq!(storm.basin, "AL");
        assert_eq!(storm.cyclone_num, 9);
        assert_eq!(storm.year, 2020);
        assert_eq!(storm.to_string(), "AL092020");
        assert!("AL9".parse::<Storm>().is_err());
        assert!("1209x020".parse::<Storm>().is_err());
    }

    #[test]
    fn adeck_sort_puts_short_technique_names_first() {
        let mut recs = vec![
            record("HWRF", 12, 34.0),
            record("AVNI", 6, 50.0),
            record("OFCL", 6, 34.0),
            record("AVNI", 6, 34.0),
            record("NVGM2", 0, 34.0),
        ];
        sort_adeck(&mut recs);
        let keys: Vec<(String, i32, f32)> = recs
            .iter()
            .map(|r| (r.technique.clone(), r.fcst_hour, r.rad_wind))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AVNI".to_string(), 6, 34.0),
                ("AVNI".to_string(), 6, 50.0),
                ("HWRF".to_string(), 12, 34.0),
                ("OFCL".to_string(), 6, 34.0),
                ("NVGM2".to_string(), 0, 34.0),
            ]
        );
    }

    #[test]
    fn truth_fields_mask_missing_values() {
        let mut rec = record("CARQ", 0, 34.0);
        rec.quad3_wind_rad = crate::domain::MISSING;
        let truth = rec.truth_fields();
        assert_eq!(truth[0], 20.0);
        assert!(truth[5].is_nan());
    }
}
