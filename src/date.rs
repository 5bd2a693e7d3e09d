//! Target date resolution.
//!
//! Sources are published per civil day in China, so the default target is
//! "yesterday" in `Asia/Shanghai`. An explicit `YYYYMMDD` override wins.

use crate::error::ConfigError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Timezone whose civil day the sources are published in.
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

/// A date override together with where it came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOverride {
    pub source_name: String,
    pub value: String,
}

/// Resolve the target date for one run.
///
/// # Errors
///
/// [`ConfigError::InvalidTargetDate`] if the override is not a valid `YYYYMMDD` date.
pub fn resolve_target_date(
    date_override: Option<&DateOverride>,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<NaiveDate, ConfigError> {
    match date_override {
        Some(o) => parse_override(o),
        None => Ok(yesterday_in(timezone, now)),
    }
}

fn parse_override(o: &DateOverride) -> Result<NaiveDate, ConfigError> {
    let raw = o.value.trim();
    let invalid = || ConfigError::InvalidTargetDate {
        source_name: o.source_name.clone(),
        value: o.value.clone(),
    };
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| invalid())
}

/// "Yesterday" as a civil date in `timezone`.
///
/// Unknown timezone names degrade to UTC with a warning.
pub fn yesterday_in(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
    let today = match timezone.parse::<Tz>() {
        Ok(tz) => now.with_timezone(&tz).date_naive(),
        Err(e) => {
            warn!(timezone, error = %e, "Unknown timezone; falling back to UTC");
            now.date_naive()
        }
    };
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    debug!(timezone, %yesterday, "Computed yesterday");
    yesterday
}
