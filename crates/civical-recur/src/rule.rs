use chrono::{NaiveDate, Weekday};

use civical_core::constants::MAX_OCCURRENCES;

use crate::error::{RecurError, RecurResult};

/// How often a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurrence rule for an event template.
///
/// Termination is either `until` (inclusive last date) or `count` (total
/// occurrences from the series start), never both. `by_weekday` applies to
/// weekly rules; `month_day` applies to monthly rules and defaults to the
/// template's own start day when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub frequency: Frequency,
    pub interval: u32,
    pub until: Option<NaiveDate>,
    pub count: Option<u32>,
    pub by_weekday: Vec<Weekday>,
    pub month_day: Option<u32>,
}

impl Rule {
    /// ## Summary
    /// Checks the structural invariants of the rule.
    ///
    /// Runs when a rule is created or edited; expansion assumes a rule that
    /// already passed this check.
    ///
    /// ## Errors
    /// Returns a [`RecurError`] if the interval is not positive, a weekly
    /// rule selects no weekdays, the termination bounds are missing or
    /// conflicting, the occurrence count exceeds the expansion ceiling, or
    /// the day-of-month is outside `1..=31`.
    pub fn validate(&self) -> RecurResult<()> {
        if self.interval == 0 {
            return Err(RecurError::InvalidInterval);
        }
        if self.frequency == Frequency::Weekly && self.by_weekday.is_empty() {
            return Err(RecurError::EmptyWeekdaySet);
        }
        match (self.until, self.count) {
            (Some(_), Some(_)) => return Err(RecurError::ConflictingBounds),
            (None, None) => return Err(RecurError::MissingBound),
            _ => {}
        }
        if let Some(count) = self.count {
            if count == 0 || count as usize > MAX_OCCURRENCES {
                return Err(RecurError::CountTooLarge(count));
            }
        }
        if let Some(day) = self.month_day {
            if !(1..=31).contains(&day) {
                return Err(RecurError::InvalidMonthDay(day));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(days: &[Weekday]) -> Rule {
        Rule {
            frequency: Frequency::Weekly,
            interval: 1,
            until: None,
            count: Some(10),
            by_weekday: days.to_vec(),
            month_day: None,
        }
    }

    #[test]
    fn accepts_well_formed_rules() {
        assert_eq!(weekly(&[Weekday::Mon, Weekday::Fri]).validate(), Ok(()));

        let monthly = Rule {
            frequency: Frequency::Monthly,
            interval: 3,
            until: NaiveDate::from_ymd_opt(2026, 12, 31),
            count: None,
            by_weekday: vec![],
            month_day: Some(31),
        };
        assert_eq!(monthly.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut rule = weekly(&[Weekday::Mon]);
        rule.interval = 0;
        assert_eq!(rule.validate(), Err(RecurError::InvalidInterval));
    }

    #[test]
    fn rejects_weekly_without_weekdays() {
        assert_eq!(weekly(&[]).validate(), Err(RecurError::EmptyWeekdaySet));
    }

    #[test]
    fn rejects_conflicting_or_missing_bounds() {
        let mut rule = weekly(&[Weekday::Mon]);
        rule.until = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert_eq!(rule.validate(), Err(RecurError::ConflictingBounds));

        rule.until = None;
        rule.count = None;
        assert_eq!(rule.validate(), Err(RecurError::MissingBound));
    }

    #[test]
    fn rejects_count_above_ceiling() {
        let mut rule = weekly(&[Weekday::Mon]);
        rule.count = Some(366);
        assert_eq!(rule.validate(), Err(RecurError::CountTooLarge(366)));
    }

    #[test]
    fn rejects_month_day_out_of_range() {
        let rule = Rule {
            frequency: Frequency::Monthly,
            interval: 1,
            until: None,
            count: Some(5),
            by_weekday: vec![],
            month_day: Some(32),
        };
        assert_eq!(rule.validate(), Err(RecurError::InvalidMonthDay(32)));
    }
}
