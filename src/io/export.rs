//! Export interpolated records to CSV.
//!
//! Meant for spreadsheets and quick plotting; missing values stay as the deck
//! sentinel so the file lines up with the JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::DeckRecord;
use crate::error::AppError;

const HEADER: &str = concat!(
    "ref_time,basin,cyclone_num,year,technique,fcst_hour,rad_wind,",
    "clat,clon,wind_max,",
    "quad1_wind_rad,quad2_wind_rad,quad3_wind_rad,quad4_wind_rad"
);

/// Write interpolated records to a CSV file.
pub fn write_records_csv(path: &Path, records: &[DeckRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    let mut file = BufWriter::new(file);

    writeln!(file, "{HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(file, "{}", csv_row(r))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

fn csv_row(r: &DeckRecord) -> String {
    format!(
        "{},{},{:02},{},{},{},{:.0},{:.2},{:.2},{:.1},{:.1},{:.1},{:.1},{:.1}",
        r.ref_time.format("%Y%m%d%H"),
        r.basin,
        r.cyclone_num,
        r.year,
        r.technique,
        r.fcst_hour,
        r.rad_wind,
        r.clat,
        r.clon,
        r.wind_max,
        r.quad1_wind_rad,
        r.quad2_wind_rad,
        r.quad3_wind_rad,
        r.quad4_wind_rad,
    )
}
