//! Pure window assembly: filter by visibility, expand series, order
//! deterministically.

use std::collections::HashSet;

use chrono::NaiveDate;

use civical_db::model::event::Event;
use civical_recur::{ExpansionOptions, expand};

use crate::auth::{Principal, policy};

use super::{Occurrence, SeriesData, TimeWindow};

/// ## Summary
/// Combines stored singles and expanded series into the sequence visible to
/// `principal`, ordered by start time ascending with ties broken by event
/// id.
///
/// Singles (materialized edited instances included) pass through as-is;
/// each series template contributes one generated occurrence per expansion
/// date, reusing the template's fields with start and end shifted and the
/// occurrence date recorded. Templates themselves never appear. Everything
/// is filtered through [`policy::can_view`] before it is returned.
#[must_use]
pub fn assemble_window(
    principal: &Principal,
    window: &TimeWindow,
    singles: Vec<Event>,
    series: Vec<SeriesData>,
) -> Vec<Occurrence> {
    let mut entries: Vec<Occurrence> = Vec::new();

    for event in singles {
        if event.is_template() {
            continue;
        }
        if !policy::can_view(event.visibility.into(), event.owner_id, principal) {
            continue;
        }
        entries.push(Occurrence {
            original_start_date: event.original_start_date,
            event,
        });
    }

    let options = ExpansionOptions::with_range(window.start, window.end);
    for data in series {
        let SeriesData {
            template,
            rule,
            exdates,
            override_dates,
        } = data;

        if !policy::can_view(template.visibility.into(), template.owner_id, principal) {
            continue;
        }

        let suppressed: HashSet<NaiveDate> = exdates.union(&override_dates).copied().collect();
        let duration = template.duration();

        for start in expand(&rule, template.starts_at, &suppressed, &options) {
            entries.push(Occurrence {
                original_start_date: Some(start.date_naive()),
                event: Event {
                    starts_at: start,
                    ends_at: start + duration,
                    ..template.clone()
                },
            });
        }
    }

    entries.sort_by(|a, b| {
        a.event
            .starts_at
            .cmp(&b.event.starts_at)
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    entries
}
