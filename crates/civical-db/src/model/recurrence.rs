use chrono::Weekday;
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::error::{DbError, DbResult};

// Re-export Frequency for public API
pub use crate::db::enums::Frequency;

/// Stored recurrence rule referenced by series templates.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::recurrence_rule)]
#[diesel(check_for_backend(Pg))]
pub struct RecurrenceRule {
    pub id: uuid::Uuid,
    pub frequency: Frequency,
    pub interval: i32,
    pub until: Option<chrono::NaiveDate>,
    pub count: Option<i32>,
    pub by_weekday: Option<Vec<Option<String>>>,
    pub month_day: Option<i16>,
}

impl RecurrenceRule {
    /// ## Summary
    /// Converts the stored row into the expander's rule type.
    ///
    /// ## Errors
    /// Returns [`DbError::CorruptRecord`] when the row carries values the
    /// column constraints should have excluded (negative interval, unknown
    /// weekday code).
    pub fn to_rule(&self) -> DbResult<civical_recur::Rule> {
        let interval = u32::try_from(self.interval)
            .map_err(|err| DbError::CorruptRecord(format!("recurrence interval: {err}")))?;
        let count = self
            .count
            .map(u32::try_from)
            .transpose()
            .map_err(|err| DbError::CorruptRecord(format!("recurrence count: {err}")))?;
        let month_day = self
            .month_day
            .map(u32::try_from)
            .transpose()
            .map_err(|err| DbError::CorruptRecord(format!("recurrence month day: {err}")))?;
        let by_weekday = self
            .by_weekday
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .flatten()
            .map(|code| weekday_from_code(code))
            .collect::<DbResult<Vec<Weekday>>>()?;

        Ok(civical_recur::Rule {
            frequency: self.frequency.into(),
            interval,
            until: self.until,
            count,
            by_weekday,
            month_day,
        })
    }
}

/// Insert struct for creating new recurrence rules; doubles as a full
/// replacement changeset, so absent optional fields clear their columns.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::recurrence_rule)]
#[diesel(treat_none_as_null = true)]
pub struct NewRecurrenceRule {
    pub frequency: Frequency,
    pub interval: i32,
    pub until: Option<chrono::NaiveDate>,
    pub count: Option<i32>,
    pub by_weekday: Option<Vec<Option<String>>>,
    pub month_day: Option<i16>,
}

impl NewRecurrenceRule {
    /// Builds the insertable row from a validated rule.
    #[must_use]
    pub fn from_rule(rule: &civical_recur::Rule) -> Self {
        Self {
            frequency: rule.frequency.into(),
            interval: i32::try_from(rule.interval).unwrap_or(i32::MAX),
            until: rule.until,
            count: rule.count.map(|c| i32::try_from(c).unwrap_or(i32::MAX)),
            by_weekday: if rule.by_weekday.is_empty() {
                None
            } else {
                Some(
                    rule.by_weekday
                        .iter()
                        .map(|day| Some(weekday_code(*day).to_owned()))
                        .collect(),
                )
            },
            month_day: rule.month_day.map(|day| i16::try_from(day).unwrap_or(31)),
        }
    }
}

/// Database code for a weekday.
#[must_use]
pub const fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn weekday_from_code(code: &str) -> DbResult<Weekday> {
    match code {
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        "sun" => Ok(Weekday::Sun),
        other => Err(DbError::CorruptRecord(format!(
            "unknown weekday code: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn row_round_trips_through_rule() {
        let rule = civical_recur::Rule {
            frequency: civical_recur::Frequency::Weekly,
            interval: 2,
            until: NaiveDate::from_ymd_opt(2026, 6, 30),
            count: None,
            by_weekday: vec![Weekday::Mon, Weekday::Thu],
            month_day: None,
        };

        let new_row = NewRecurrenceRule::from_rule(&rule);
        let row = RecurrenceRule {
            id: uuid::Uuid::new_v4(),
            frequency: new_row.frequency,
            interval: new_row.interval,
            until: new_row.until,
            count: new_row.count,
            by_weekday: new_row.by_weekday.clone(),
            month_day: new_row.month_day,
        };

        assert_eq!(row.to_rule().expect("stored rule is well formed"), rule);
    }

    #[test]
    fn unknown_weekday_code_is_a_corrupt_record() {
        let row = RecurrenceRule {
            id: uuid::Uuid::new_v4(),
            frequency: Frequency::Weekly,
            interval: 1,
            until: None,
            count: Some(4),
            by_weekday: Some(vec![Some("noday".to_owned())]),
            month_day: None,
        };

        assert!(matches!(row.to_rule(), Err(DbError::CorruptRecord(_))));
    }
}
