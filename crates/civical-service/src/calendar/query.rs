//! Window listing against the database.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use civical_db::db::connection::DbConnection;
use civical_db::db::query::{event, exception};

use crate::auth::Principal;
use crate::error::{ServiceError, ServiceResult};

use super::{Occurrence, SeriesData, TimeWindow, assemble_window};

/// ## Summary
/// Lists the events visible to `principal` whose occurrences start inside
/// the window.
///
/// Gathers stored singles and every series template with its exceptions and
/// materialized instance dates, then delegates composition, visibility
/// filtering, and ordering to [`assemble_window`]. Reads share no state
/// between calls; the result is a pure function of current storage.
///
/// ## Errors
/// Returns an error if a database operation fails or a stored rule row is
/// corrupt. Access refusals never error here: events the principal may not
/// see are silently absent, as if they did not exist.
#[tracing::instrument(skip(conn, principal))]
pub async fn list_visible_events(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    window: TimeWindow,
) -> ServiceResult<Vec<Occurrence>> {
    let singles = event::singles_in_window(conn, window.start, window.end).await?;
    let template_rows = event::templates_started_before(conn, window.end).await?;

    tracing::debug!(
        singles = singles.len(),
        templates = template_rows.len(),
        "Gathered window candidates"
    );

    let template_ids: Vec<Uuid> = template_rows.iter().map(|(template, _)| template.id).collect();
    let exdates = exception::dates_for_events(conn, template_ids.clone()).await?;
    let instance_dates = event::instance_dates_for_series(conn, template_ids).await?;

    let mut series = Vec::with_capacity(template_rows.len());
    for (template, rule_row) in template_rows {
        let rule = rule_row.to_rule().map_err(ServiceError::from)?;
        series.push(SeriesData {
            exdates: dates_of(&exdates, template.id),
            override_dates: dates_of(&instance_dates, template.id),
            template,
            rule,
        });
    }

    Ok(assemble_window(principal, &window, singles, series))
}

fn dates_of(pairs: &[(Uuid, NaiveDate)], key: Uuid) -> HashSet<NaiveDate> {
    pairs
        .iter()
        .filter(|(id, _)| *id == key)
        .map(|(_, date)| *date)
        .collect()
}
