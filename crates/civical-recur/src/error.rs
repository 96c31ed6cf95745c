use thiserror::Error;

/// Error raised while validating a recurrence rule.
///
/// Expansion itself never fails: malformed rules are rejected when they are
/// created or edited, so the expander only ever sees validated input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurError {
    #[error("Recurrence interval must be positive")]
    InvalidInterval,

    #[error("Weekly recurrence requires at least one weekday")]
    EmptyWeekdaySet,

    #[error("Recurrence must end by date or by count, not both")]
    ConflictingBounds,

    #[error("Recurrence must carry an end date or an occurrence count")]
    MissingBound,

    #[error("Occurrence count {0} exceeds the ceiling of {max}", max = civical_core::constants::MAX_OCCURRENCES)]
    CountTooLarge(u32),

    #[error("Day of month {0} is outside 1..=31")]
    InvalidMonthDay(u32),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
