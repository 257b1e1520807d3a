/*
 *  conditions.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather code to label/icon resolution
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, TimeZone};

use crate::icons::IconKey;

/// At or above this a clear day gets the warm sun.
pub const WARM_THRESHOLD_C: f64 = 14.0;

/// Label used for the clear bucket, the only one that branches.
pub const CLEAR_LABEL: &str = "Clear";

/// Result of resolving a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCondition {
    pub label: &'static str,
    pub icon: Option<IconKey>,
}

impl ResolvedCondition {
    pub const UNKNOWN: ResolvedCondition = ResolvedCondition { label: "", icon: None };

    /// Unknown codes resolve to nothing to show.
    pub fn is_known(&self) -> bool {
        !self.label.is_empty()
    }
}

struct ConditionRow {
    codes: &'static [i32],
    label: &'static str,
    icon: IconKey,
}

/// WMO weather interpretation codes, one row per bucket.
static CONDITION_TABLE: &[ConditionRow] = &[
    ConditionRow { codes: &[0], label: CLEAR_LABEL, icon: IconKey::ClearDayWarm },
    ConditionRow { codes: &[1, 2], label: "Cloudy", icon: IconKey::Cloudy },
    ConditionRow { codes: &[3], label: "Overcast", icon: IconKey::Overcast },
    ConditionRow { codes: &[45, 48], label: "Fog", icon: IconKey::Fog },
    ConditionRow { codes: &[51, 53, 55, 56, 57], label: "Drizzle", icon: IconKey::Drizzle },
    ConditionRow { codes: &[61, 63, 65, 66, 67, 80, 81, 82], label: "Rain", icon: IconKey::Rain },
    ConditionRow { codes: &[71, 73, 75, 77, 85, 86], label: "Snow", icon: IconKey::Snow },
    ConditionRow { codes: &[95, 96, 99], label: "Storms", icon: IconKey::Storms },
];

/// Map a condition code to a label and icon.
///
/// Only the clear bucket looks at `is_night` and `temperature_c`; the label
/// stays "Clear" for all three of its icons.
pub fn resolve_condition(code: i32, is_night: bool, temperature_c: f64) -> ResolvedCondition {
    let Some(row) = CONDITION_TABLE.iter().find(|row| row.codes.contains(&code)) else {
        return ResolvedCondition::UNKNOWN;
    };

    let icon = if row.label == CLEAR_LABEL {
        if is_night {
            IconKey::ClearNight
        } else if temperature_c >= WARM_THRESHOLD_C {
            IconKey::ClearDayWarm
        } else {
            IconKey::ClearDayCool
        }
    } else {
        row.icon
    };

    ResolvedCondition { label: row.label, icon: Some(icon) }
}

/// Night is at or after sunset, or before sunrise when that is known.
/// Without a sunset time it is always day.
pub fn is_night<Tz: TimeZone, Tz2: TimeZone>(
    now: &DateTime<Tz>,
    sunrise: Option<&DateTime<Tz2>>,
    sunset: Option<&DateTime<Tz2>>,
) -> bool {
    let Some(sunset) = sunset else {
        return false;
    };
    if *now >= *sunset {
        return true;
    }
    sunrise.is_some_and(|rise| *now < *rise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn clear_after_sunset_is_night_regardless_of_temperature() {
        for temp in [-10.0, 14.0, 35.0] {
            let r = resolve_condition(0, true, temp);
            assert_eq!(r.label, "Clear");
            assert_eq!(r.icon, Some(IconKey::ClearNight));
        }
    }

    #[test]
    fn clear_day_splits_on_threshold() {
        assert_eq!(resolve_condition(0, false, 20.0).icon, Some(IconKey::ClearDayWarm));
        assert_eq!(resolve_condition(0, false, 14.0).icon, Some(IconKey::ClearDayWarm));
        assert_eq!(resolve_condition(0, false, 13.9).icon, Some(IconKey::ClearDayCool));
        assert_eq!(resolve_condition(0, false, 13.9).label, "Clear");
    }

    #[test]
    fn other_buckets_ignore_night_and_temperature() {
        let day = resolve_condition(63, false, 30.0);
        let night = resolve_condition(63, true, -3.0);
        assert_eq!(day, night);
        assert_eq!(day.label, "Rain");
        assert_eq!(resolve_condition(3, true, 0.0).label, "Overcast");
        assert_eq!(resolve_condition(48, false, 0.0).icon, Some(IconKey::Fog));
        assert_eq!(resolve_condition(99, false, 0.0).label, "Storms");
        assert_eq!(resolve_condition(86, false, 0.0).label, "Snow");
        assert_eq!(resolve_condition(55, false, 0.0).label, "Drizzle");
        assert_eq!(resolve_condition(2, false, 0.0).label, "Cloudy");
    }

    #[test]
    fn unknown_code_resolves_to_nothing() {
        let r = resolve_condition(1234, false, 10.0);
        assert!(!r.is_known());
        assert_eq!(r, ResolvedCondition::UNKNOWN);
    }

    #[test]
    fn night_follows_sunset_and_sunrise() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let rise = tz.with_ymd_and_hms(2026, 10, 19, 7, 0, 0).unwrap();
        let set = tz.with_ymd_and_hms(2026, 10, 19, 18, 30, 0).unwrap();

        let noon = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 10, 19, 19, 0, 0).unwrap();
        let dawn = Utc.with_ymd_and_hms(2026, 10, 19, 5, 0, 0).unwrap();

        assert!(!is_night(&noon, Some(&rise), Some(&set)));
        assert!(is_night(&evening, Some(&rise), Some(&set)));
        assert!(is_night(&dawn, Some(&rise), Some(&set)));
        assert!(!is_night(&dawn, None, Some(&set)));
        assert!(!is_night(&evening, Some(&rise), None::<&DateTime<FixedOffset>>));
    }
}
