//! Occurrence expansion for recurrence rules.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

use civical_core::constants::MAX_OCCURRENCES;

use crate::rule::{Frequency, Rule};

/// Options for recurrence expansion.
#[derive(Debug, Clone)]
pub struct ExpansionOptions {
    /// Maximum number of occurrences to return.
    pub max_instances: usize,

    /// Start of time range filter (inclusive).
    pub range_start: Option<DateTime<Utc>>,

    /// End of time range filter (exclusive).
    pub range_end: Option<DateTime<Utc>>,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_instances: MAX_OCCURRENCES,
            range_start: None,
            range_end: None,
        }
    }
}

impl ExpansionOptions {
    /// Creates expansion options with a time range.
    #[must_use]
    pub fn with_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            range_start: Some(start),
            range_end: Some(end),
            ..Self::default()
        }
    }

    /// Sets the maximum number of instances.
    #[must_use]
    pub fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = max;
        self
    }
}

/// ## Summary
/// Expands a recurrence rule into the occurrence times intersecting the
/// requested range.
///
/// Candidates start at the template's own start and advance per the rule's
/// frequency and interval. A candidate counts toward the rule's occurrence
/// cap as soon as it is generated; window clipping and `exdates` suppression
/// apply afterwards, so an excluded occurrence still consumes its slot in a
/// count-bounded series. At most [`MAX_OCCURRENCES`] occurrences are ever
/// generated, whatever the window.
///
/// Expansion is total over validated rules: out-of-range inputs terminate
/// the sequence instead of failing. Each call recomputes from scratch; no
/// generator state persists between queries.
#[must_use]
pub fn expand(
    rule: &Rule,
    dtstart: DateTime<Utc>,
    exdates: &HashSet<NaiveDate>,
    options: &ExpansionOptions,
) -> Vec<DateTime<Utc>> {
    let start_date = dtstart.date_naive();
    let time = dtstart.time();

    let cap = options.max_instances.min(MAX_OCCURRENCES);
    // Both bounds on one rule is rejected at validation time; applying each
    // independently makes the stricter one win regardless.
    let count_bound = rule
        .count
        .map_or(MAX_OCCURRENCES, |c| (c as usize).min(MAX_OCCURRENCES));

    let mut occurrences = Vec::new();
    let mut generated = 0_usize;

    for date in candidates(rule, start_date) {
        if date < start_date {
            continue;
        }
        if let Some(until) = rule.until {
            if date > until {
                break;
            }
        }
        if generated == count_bound {
            break;
        }
        generated += 1;

        let occurrence = Utc.from_utc_datetime(&date.and_time(time));
        if let Some(end) = options.range_end {
            if occurrence >= end {
                break;
            }
        }
        if exdates.contains(&date) {
            continue;
        }
        if let Some(start) = options.range_start {
            if occurrence < start {
                continue;
            }
        }

        occurrences.push(occurrence);
        if occurrences.len() == cap {
            break;
        }
    }

    occurrences
}

/// Candidate date sequence for a rule, beginning in the template's start
/// week/month. Dates before the template start are yielded and filtered by
/// the caller.
fn candidates(rule: &Rule, start_date: NaiveDate) -> DateStepper {
    let step = rule.interval.max(1);
    match rule.frequency {
        Frequency::Daily => DateStepper::Daily {
            next: Some(start_date),
            step_days: u64::from(step),
        },
        Frequency::Weekly => {
            let week_start =
                start_date - Days::new(u64::from(start_date.weekday().num_days_from_monday()));
            let mut offsets: Vec<u64> = rule
                .by_weekday
                .iter()
                .map(|wd| u64::from(wd.num_days_from_monday()))
                .collect();
            offsets.sort_unstable();
            offsets.dedup();
            if offsets.is_empty() {
                // Validation forbids this; degrade to the start's own weekday.
                offsets.push(u64::from(start_date.weekday().num_days_from_monday()));
            }
            DateStepper::Weekly {
                week_start: Some(week_start),
                offsets,
                cursor: 0,
                step_days: 7 * u64::from(step),
            }
        }
        Frequency::Monthly => DateStepper::Monthly {
            year: start_date.year(),
            month: start_date.month(),
            day: rule.month_day.unwrap_or_else(|| start_date.day()).min(31),
            step_months: step,
            exhausted: false,
        },
    }
}

enum DateStepper {
    Daily {
        next: Option<NaiveDate>,
        step_days: u64,
    },
    Weekly {
        week_start: Option<NaiveDate>,
        offsets: Vec<u64>,
        cursor: usize,
        step_days: u64,
    },
    Monthly {
        year: i32,
        month: u32,
        day: u32,
        step_months: u32,
        exhausted: bool,
    },
}

impl Iterator for DateStepper {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        match self {
            Self::Daily { next, step_days } => {
                let current = (*next)?;
                *next = current.checked_add_days(Days::new(*step_days));
                Some(current)
            }
            Self::Weekly {
                week_start,
                offsets,
                cursor,
                step_days,
            } => {
                let base = (*week_start)?;
                let date = base.checked_add_days(Days::new(offsets[*cursor]))?;
                *cursor += 1;
                if *cursor == offsets.len() {
                    *cursor = 0;
                    *week_start = base.checked_add_days(Days::new(*step_days));
                }
                Some(date)
            }
            Self::Monthly {
                year,
                month,
                day,
                step_months,
                exhausted,
            } => {
                if *exhausted {
                    return None;
                }
                let date = clamped_date(*year, *month, *day);
                match advance_months(*year, *month, *step_months) {
                    Some((next_year, next_month)) => {
                        *year = next_year;
                        *month = next_month;
                    }
                    None => *exhausted = true,
                }
                date
            }
        }
    }
}

/// Day-of-month clamped to the target month's length: day 31 in a 30-day
/// month lands on the 30th, never the next month.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(last_day_of_month(year, month)))
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .unwrap_or(28)
}

fn advance_months(year: i32, month: u32, by: u32) -> Option<(i32, u32)> {
    let zero_based = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(by);
    let next_year = i32::try_from(zero_based.div_euclid(12)).ok()?;
    let next_month = u32::try_from(zero_based.rem_euclid(12)).ok()? + 1;
    Some((next_year, next_month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn weekly_mondays() -> Rule {
        Rule {
            frequency: Frequency::Weekly,
            interval: 1,
            until: Some(date(2025, 2, 1)),
            count: None,
            by_weekday: vec![Weekday::Mon],
            month_day: None,
        }
    }

    #[test]
    fn daily_count_bound() {
        let rule = Rule {
            frequency: Frequency::Daily,
            interval: 1,
            until: None,
            count: Some(5),
            by_weekday: vec![],
            month_day: None,
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 1, 10),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        assert_eq!(occurrences.len(), 5);
        assert_eq!(occurrences[0], at(2025, 1, 1, 10));
        assert_eq!(occurrences[4], at(2025, 1, 5, 10));
    }

    #[test]
    fn weekly_mondays_in_january_window() {
        // Template starts Monday 2025-01-06; window end is exclusive, so the
        // occurrence that would land on 2025-02-03 is out and 02-01 is the
        // rule's own end anyway.
        let occurrences = expand(
            &weekly_mondays(),
            at(2025, 1, 6, 9),
            &HashSet::new(),
            &ExpansionOptions::with_range(at(2025, 1, 1, 0), at(2025, 2, 1, 0)),
        );

        let expected: Vec<_> = [6, 13, 20, 27].iter().map(|d| at(2025, 1, *d, 9)).collect();
        assert_eq!(occurrences, expected);
    }

    #[test]
    fn weekly_exception_suppresses_one_date() {
        let exdates: HashSet<NaiveDate> = [date(2025, 1, 13)].into_iter().collect();
        let occurrences = expand(
            &weekly_mondays(),
            at(2025, 1, 6, 9),
            &exdates,
            &ExpansionOptions::with_range(at(2025, 1, 1, 0), at(2025, 2, 1, 0)),
        );

        let expected: Vec<_> = [6, 20, 27].iter().map(|d| at(2025, 1, *d, 9)).collect();
        assert_eq!(occurrences, expected);
    }

    #[test]
    fn weekly_multiple_days_strictly_increasing() {
        let rule = Rule {
            frequency: Frequency::Weekly,
            interval: 2,
            until: None,
            count: Some(8),
            by_weekday: vec![Weekday::Fri, Weekday::Tue],
            month_day: None,
        };
        // 2025-01-07 is a Tuesday.
        let occurrences = expand(
            &rule,
            at(2025, 1, 7, 18),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        assert_eq!(occurrences.len(), 8);
        for pair in occurrences.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // Tue 7th and Fri 10th, then two weeks later.
        assert_eq!(occurrences[0], at(2025, 1, 7, 18));
        assert_eq!(occurrences[1], at(2025, 1, 10, 18));
        assert_eq!(occurrences[2], at(2025, 1, 21, 18));
    }

    #[test]
    fn monthly_day_31_clamps_to_short_months() {
        let rule = Rule {
            frequency: Frequency::Monthly,
            interval: 1,
            until: None,
            count: Some(4),
            by_weekday: vec![],
            month_day: Some(31),
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 31, 12),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        assert_eq!(
            occurrences,
            vec![
                at(2025, 1, 31, 12),
                at(2025, 2, 28, 12),
                at(2025, 3, 31, 12),
                at(2025, 4, 30, 12),
            ]
        );
    }

    #[test]
    fn monthly_anchor_before_start_day_skips_first_month() {
        let rule = Rule {
            frequency: Frequency::Monthly,
            interval: 1,
            until: None,
            count: Some(2),
            by_weekday: vec![],
            month_day: Some(10),
        };
        let occurrences = expand(
            &rule,
            at(2025, 3, 15, 8),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        // March 10 precedes the series start and is never an occurrence.
        assert_eq!(occurrences, vec![at(2025, 4, 10, 8), at(2025, 5, 10, 8)]);
    }

    #[test]
    fn pre_window_occurrences_consume_the_count() {
        let rule = Rule {
            frequency: Frequency::Daily,
            interval: 1,
            until: None,
            count: Some(5),
            by_weekday: vec![],
            month_day: None,
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 1, 10),
            &HashSet::new(),
            &ExpansionOptions::with_range(at(2025, 1, 3, 0), at(2025, 2, 1, 0)),
        );

        // Jan 1 and 2 fall before the window but still count: 3, 4, 5 remain.
        assert_eq!(
            occurrences,
            vec![at(2025, 1, 3, 10), at(2025, 1, 4, 10), at(2025, 1, 5, 10)]
        );
    }

    #[test]
    fn ceiling_bounds_unbounded_windows() {
        let rule = Rule {
            frequency: Frequency::Daily,
            interval: 1,
            until: Some(date(2030, 1, 1)),
            count: None,
            by_weekday: vec![],
            month_day: None,
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 1, 0),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        assert_eq!(occurrences.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn stricter_bound_wins_when_both_present() {
        // Defensive path: validation forbids carrying both bounds, but the
        // expander must still terminate on the earlier of the two.
        let rule = Rule {
            frequency: Frequency::Daily,
            interval: 1,
            until: Some(date(2025, 1, 3)),
            count: Some(10),
            by_weekday: vec![],
            month_day: None,
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 1, 10),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );
        assert_eq!(occurrences.len(), 3);

        let rule = Rule {
            count: Some(2),
            until: Some(date(2025, 12, 31)),
            ..rule
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 1, 10),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );
        assert_eq!(occurrences.len(), 2);
    }

    #[test]
    fn expansion_is_idempotent() {
        let rule = weekly_mondays();
        let options = ExpansionOptions::with_range(at(2025, 1, 1, 0), at(2025, 2, 1, 0));
        let first = expand(&rule, at(2025, 1, 6, 9), &HashSet::new(), &options);
        let second = expand(&rule, at(2025, 1, 6, 9), &HashSet::new(), &options);
        assert_eq!(first, second);
    }

    #[test]
    fn no_duplicate_occurrence_dates() {
        let rule = Rule {
            frequency: Frequency::Weekly,
            interval: 1,
            until: None,
            count: Some(30),
            by_weekday: vec![Weekday::Mon, Weekday::Mon, Weekday::Thu],
            month_day: None,
        };
        let occurrences = expand(
            &rule,
            at(2025, 1, 6, 9),
            &HashSet::new(),
            &ExpansionOptions::default(),
        );

        let dates: HashSet<NaiveDate> = occurrences.iter().map(DateTime::date_naive).collect();
        assert_eq!(dates.len(), occurrences.len());
    }
}
