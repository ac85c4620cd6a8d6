use crate::error::{ChartError, Result};
use crate::series::{SeriesKind, SeriesRecord};

/// True when the year axis and all three series have the same length.
/// Empty records are valid.
pub fn lengths_match(record: &SeriesRecord) -> bool {
    validate_series(record).is_ok()
}

/// Reject a record whose series do not line up with the year axis.
///
/// The year axis sets the expected length; the first series that disagrees is
/// reported. Nothing is truncated.
pub fn validate_series(record: &SeriesRecord) -> Result<()> {
    let expected = record.years.len();

    for kind in SeriesKind::ALL {
        let found = record.values(kind).len();
        if found != expected {
            return Err(ChartError::Validation {
                series: kind.field_name(),
                expected,
                found,
            });
        }
    }

    Ok(())
}
