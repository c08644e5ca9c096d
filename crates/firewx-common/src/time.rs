//! Forecast validity windows, period selection and local-time handling.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Timelike, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::{FireWxError, FireWxResult};

/// The time span a forecast grid is valid for.
///
/// Instantaneous fields (hourly RH, wind) have `start == end`; statistically
/// processed fields (max/min RH and temperature) span a 12-13 hour window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window at a single instant.
    pub fn instant(at: DateTime<Utc>) -> Self {
        Self { start: at, end: at }
    }

    /// Build from a reference time, forecast offset and optional period length in hours.
    pub fn from_reference(
        reference_time: DateTime<Utc>,
        forecast_hours: i64,
        period_hours: Option<i64>,
    ) -> Self {
        let start = reference_time + Duration::hours(forecast_hours);
        let end = start + Duration::hours(period_hours.unwrap_or(0));
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + self.duration() / 2
    }

    /// A window has expired once its end is at or before `now`.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        if self.is_instant() {
            self.start < now
        } else {
            self.end <= now
        }
    }

    /// Output frame name: `YYYY_MM_DD_HH.jpg` from the window start in UTC.
    pub fn frame_file_name(&self) -> String {
        format!("{}.jpg", self.start.format("%Y_%m_%d_%H"))
    }
}

/// Whether a forecast period covers daytime or overnight hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Day,
    Night,
}

impl PeriodKind {
    /// Classify by local hour: 06 <= h < 18 is day.
    pub fn from_local_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            PeriodKind::Day
        } else {
            PeriodKind::Night
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "Day",
            PeriodKind::Night => "Night",
        }
    }
}

/// How UTC valid times are converted to the region's local time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeZoneSpec {
    /// Use the offset of the machine producing the plots.
    SystemLocal,
    /// Fixed standard offset, optionally following the US daylight saving rule.
    Fixed {
        standard_offset_hours: i32,
        observes_dst: bool,
    },
}

impl Default for TimeZoneSpec {
    fn default() -> Self {
        TimeZoneSpec::SystemLocal
    }
}

impl TimeZoneSpec {
    pub fn fixed(standard_offset_hours: i32, observes_dst: bool) -> Self {
        TimeZoneSpec::Fixed {
            standard_offset_hours,
            observes_dst,
        }
    }

    pub fn validate(&self) -> FireWxResult<()> {
        match self {
            TimeZoneSpec::Fixed {
                standard_offset_hours,
                ..
            } if !(-12..=14).contains(standard_offset_hours) => Err(FireWxError::InvalidTime(
                format!("UTC offset out of range: {}", standard_offset_hours),
            )),
            _ => Ok(()),
        }
    }

    /// The UTC offset in effect at `utc`.
    pub fn offset_at(&self, utc: DateTime<Utc>) -> FixedOffset {
        match *self {
            TimeZoneSpec::SystemLocal => Local.from_utc_datetime(&utc.naive_utc()).offset().fix(),
            TimeZoneSpec::Fixed {
                standard_offset_hours,
                observes_dst,
            } => {
                let dst = observes_dst && us_dst_active(utc, standard_offset_hours);
                let hours = standard_offset_hours + if dst { 1 } else { 0 };
                FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
            }
        }
    }

    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        utc.with_timezone(&self.offset_at(utc))
    }

    /// Short zone abbreviation for labels.
    pub fn abbreviation(&self, utc: DateTime<Utc>) -> String {
        match *self {
            TimeZoneSpec::SystemLocal => "LT".to_string(),
            TimeZoneSpec::Fixed {
                standard_offset_hours,
                observes_dst,
            } => {
                let dst = observes_dst && us_dst_active(utc, standard_offset_hours);
                let prefix = match standard_offset_hours {
                    -4 => "A",
                    -5 => "E",
                    -6 => "C",
                    -7 => "M",
                    -8 => "P",
                    -9 => "AK",
                    -10 => "H",
                    _ => return format!("UTC{:+}", standard_offset_hours + dst as i32),
                };
                format!("{}{}T", prefix, if dst { "D" } else { "S" })
            }
        }
    }
}

/// US daylight saving: second Sunday of March 02:00 standard time until the
/// first Sunday of November 02:00 daylight time (01:00 standard).
pub fn us_dst_active(utc: DateTime<Utc>, standard_offset_hours: i32) -> bool {
    let standard_local = utc.naive_utc() + Duration::hours(standard_offset_hours as i64);
    let year = standard_local.year();

    let start = nth_sunday(year, 3, 2).and_then(|d| d.and_hms_opt(2, 0, 0));
    let end = nth_sunday(year, 11, 1).and_then(|d| d.and_hms_opt(1, 0, 0));

    match (start, end) {
        (Some(start), Some(end)) => standard_local >= start && standard_local < end,
        _ => false,
    }
}

fn nth_sunday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, n)
}

/// Keep the windows still worth plotting.
///
/// Expired windows are dropped, the rest are sorted by start time with
/// duplicate starts removed, and at most `max` are returned.
pub fn select_periods(windows: &[ValidWindow], now: DateTime<Utc>, max: usize) -> Vec<ValidWindow> {
    let mut selected: Vec<ValidWindow> = windows
        .iter()
        .copied()
        .filter(|w| !w.has_expired(now))
        .collect();
    selected.sort();
    selected.dedup_by_key(|w| w.start);
    selected.truncate(max);
    selected
}

/// A selected window with its local-time presentation.
#[derive(Debug, Clone)]
pub struct ForecastPeriod {
    /// 1-based counter within its kind (Day 1, Day 2, Night 1, ...)
    pub number: usize,
    pub kind: PeriodKind,
    pub window: ValidWindow,
    pub local_start: DateTime<FixedOffset>,
    pub local_end: DateTime<FixedOffset>,
    pub zone: String,
}

impl ForecastPeriod {
    /// Heading for a frame, e.g. "Night 2 - Wed 10/16" or "Tue 10/15 14 MDT".
    pub fn heading(&self) -> String {
        if self.window.is_instant() {
            format!("{} {}", self.local_start.format("%a %m/%d %H"), self.zone)
        } else {
            // Nights are named after the evening they start on.
            format!(
                "{} {} - {}",
                self.kind.as_str(),
                self.number,
                self.local_start.format("%a %m/%d")
            )
        }
    }

    /// Local time range, e.g. "07 PDT - 19 PDT".
    pub fn time_range_label(&self) -> String {
        format!(
            "{} {} - {} {}",
            self.local_start.format("%H"),
            self.zone,
            self.local_end.format("%H"),
            self.zone
        )
    }

    pub fn frame_file_name(&self) -> String {
        self.window.frame_file_name()
    }
}

/// Attach local times, day/night classification and counters to windows.
pub fn label_periods(windows: &[ValidWindow], tz: &TimeZoneSpec) -> Vec<ForecastPeriod> {
    let mut day_count = 0;
    let mut night_count = 0;

    windows
        .iter()
        .map(|w| {
            let kind = PeriodKind::from_local_hour(tz.to_local(w.midpoint()).hour());
            let number = match kind {
                PeriodKind::Day => {
                    day_count += 1;
                    day_count
                }
                PeriodKind::Night => {
                    night_count += 1;
                    night_count
                }
            };
            ForecastPeriod {
                number,
                kind,
                window: *w,
                local_start: tz.to_local(w.start),
                local_end: tz.to_local(w.end),
                zone: tz.abbreviation(w.start),
            }
        })
        .collect()
}

/// Signature stamp for figures: local and UTC creation time.
pub fn creation_stamp(now: DateTime<Utc>, tz: &TimeZoneSpec) -> String {
    let local = tz.to_local(now);
    format!(
        "Plot Created: {} {} ({} UTC)",
        local.format("%m/%d/%Y %H:%M"),
        tz.abbreviation(now),
        now.format("%H:%M")
    )
}

/// Parse "YYYY-MM-DDTHH:MM:SSZ" style timestamps (used by the CLI `--now` override).
pub fn parse_utc(s: &str) -> FireWxResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    Err(FireWxError::InvalidTime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_frame_file_name() {
        let w = ValidWindow::new(utc(2024, 7, 4, 12), utc(2024, 7, 5, 0));
        assert_eq!(w.frame_file_name(), "2024_07_04_12.jpg");
    }

    #[test]
    fn test_dst_boundaries() {
        // 2024: DST from 2024-03-10 to 2024-11-03
        assert!(!us_dst_active(utc(2024, 3, 10, 9), -8)); // 01:00 PST
        assert!(us_dst_active(utc(2024, 3, 10, 11), -8)); // 03:00 PDT
        assert!(us_dst_active(utc(2024, 11, 3, 8), -8)); // 00:00 PST-equivalent, still PDT
        assert!(!us_dst_active(utc(2024, 11, 3, 10), -8));
        assert!(!us_dst_active(utc(2024, 1, 15, 12), -7));
    }

    #[test]
    fn test_abbreviation() {
        let tz = TimeZoneSpec::fixed(-7, true);
        assert_eq!(tz.abbreviation(utc(2024, 7, 1, 12)), "MDT");
        assert_eq!(tz.abbreviation(utc(2024, 1, 1, 12)), "MST");
        let az = TimeZoneSpec::fixed(-7, false);
        assert_eq!(az.abbreviation(utc(2024, 7, 1, 12)), "MST");
    }

    #[test]
    fn test_validate_offset() {
        assert!(TimeZoneSpec::fixed(-8, true).validate().is_ok());
        assert!(TimeZoneSpec::fixed(20, true).validate().is_err());
    }
}
