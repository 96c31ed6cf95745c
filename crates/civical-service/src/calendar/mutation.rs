//! Mutation flows: create, update, delete, and the instance-vs-series
//! branching for recurring events.
//!
//! Every entry point applies its writes inside one transaction, so a split
//! series is never observable truncated without its successor.

#![allow(clippy::too_many_lines)] // Service orchestration functions are inherently complex

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};
use uuid::Uuid;

use civical_core::constants::{MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_TITLE_LEN};
use civical_core::types::Visibility;
use civical_db::db::connection::DbConnection;
use civical_db::db::query::{event, exception, recurrence};
use civical_db::model::event::{Event, EventChanges, NewEvent};
use civical_db::model::exception::NewEventException;
use civical_db::model::recurrence::{NewRecurrenceRule, RecurrenceRule as RecurrenceRuleRow};
use civical_recur::{ExpansionOptions, Rule, expand};

use crate::auth::{Principal, policy};
use crate::error::{ServiceError, ServiceResult};

/// Which part of a recurring series a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Only the occurrence on the target date.
    ThisInstance,
    /// The target date and everything after it.
    AllFuture,
}

/// Fields for a new event. A recurrence makes it a series template.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub visibility: Visibility,
    pub category_id: Option<Uuid>,
    pub recurrence: Option<Rule>,
}

/// Partial update. Double-`Option` fields distinguish "leave alone" from
/// "clear". The owner cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub location: Option<Option<String>>,
    pub visibility: Option<Visibility>,
    pub category_id: Option<Option<Uuid>>,
    /// Replaces the series rule; rejected on non-recurring events.
    pub recurrence: Option<Rule>,
}

/// ## Summary
/// Creates an event (or series template) owned by the calling principal.
///
/// ## Errors
/// Returns `Forbidden` unless the principal may author events, a validation
/// error for malformed fields or rules, or a database error.
#[tracing::instrument(skip(conn, principal, draft), fields(title_len = draft.title.len()))]
pub async fn create_event(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    draft: &EventDraft,
) -> ServiceResult<Event> {
    if !policy::can_create(principal) {
        return Err(ServiceError::Forbidden(
            "only managers and admins may create events".to_owned(),
        ));
    }
    let owner_id = principal
        .id()
        .ok_or_else(|| ServiceError::Forbidden("anonymous viewers may not create events".to_owned()))?;

    validate_draft(draft)?;

    // The transaction closure must own its captures (diesel-async requires them
    // to outlive the pooled connection), so move an owned copy of the draft in.
    let draft = draft.clone();
    conn.transaction::<Event, ServiceError, _>(|conn| {
        async move {
            let recurrence_id = match &draft.recurrence {
                Some(rule) => Some(
                    recurrence::insert(conn, &NewRecurrenceRule::from_rule(rule))
                        .await?
                        .id,
                ),
                None => None,
            };

            let stored = event::insert(
                conn,
                &NewEvent {
                    title: &draft.title,
                    description: draft.description.as_deref(),
                    starts_at: draft.starts_at,
                    ends_at: draft.ends_at,
                    all_day: draft.all_day,
                    location: draft.location.as_deref(),
                    visibility: draft.visibility.into(),
                    category_id: draft.category_id,
                    owner_id,
                    recurrence_id,
                    series_id: None,
                    original_start_date: None,
                },
            )
            .await?;

            tracing::debug!(event_id = %stored.id, recurring = recurrence_id.is_some(), "Event created");
            Ok(stored)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Updates an event (or a whole series template) in place.
///
/// ## Errors
/// Returns `NotFound` when the target does not exist *or* the principal may
/// not know it exists, `Forbidden` when it is visible but not theirs to
/// change, a validation error for malformed fields, or a database error.
#[tracing::instrument(skip(conn, principal, patch))]
pub async fn update_event(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    event_id: Uuid,
    patch: &EventPatch,
) -> ServiceResult<Event> {
    let existing = require_event(conn, event_id).await?;
    ensure_mutable(&existing, principal)?;

    apply_event_update(conn, &existing, patch).await
}

/// ## Summary
/// Deletes an event. Deleting a series template removes the whole series:
/// its rule, its exceptions, and its materialized edited instances.
///
/// ## Errors
/// Returns `NotFound`/`Forbidden` under the same rules as [`update_event`],
/// or a database error.
#[tracing::instrument(skip(conn, principal))]
pub async fn delete_event(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    event_id: Uuid,
) -> ServiceResult<()> {
    let existing = require_event(conn, event_id).await?;
    ensure_mutable(&existing, principal)?;

    delete_event_row(conn, &existing).await
}

/// ## Summary
/// Deletes one occurrence of a series, or the series tail from `date` on.
///
/// `ThisInstance` records an exception for the date. `AllFuture` truncates
/// the rule to end just before `date` and drops the now-orphaned exceptions
/// and edited instances; aimed at the first occurrence or earlier it
/// removes the series entirely.
///
/// ## Errors
/// Returns `NotFound`/`Forbidden` as for [`update_event`], a validation
/// error when the event does not recur, or a database error.
#[tracing::instrument(skip(conn, principal, reason))]
pub async fn delete_occurrence(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    template_id: Uuid,
    date: NaiveDate,
    scope: EditScope,
    reason: Option<&str>,
) -> ServiceResult<()> {
    let (template, rule_row) = require_template(conn, principal, template_id).await?;

    match scope {
        EditScope::ThisInstance => {
            exception::insert(
                conn,
                &NewEventException {
                    event_id: template.id,
                    exception_date: date,
                    reason,
                },
            )
            .await?;
            Ok(())
        }
        EditScope::AllFuture => {
            if date <= template.starts_at.date_naive() {
                return delete_event_row(conn, &template).await;
            }
            let cutoff = day_before(date)?;
            conn.transaction::<(), ServiceError, _>(|conn| {
                async move {
                    recurrence::truncate(conn, rule_row.id, cutoff).await?;
                    event::delete_instances_from(conn, template.id, date).await?;
                    exception::delete_from_date(conn, template.id, date).await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await
        }
    }
}

/// ## Summary
/// Edits one occurrence of a series, or the series from `date` on.
///
/// `ThisInstance` suppresses the generated occurrence with an exception and
/// materializes a standalone event carrying the override fields plus a
/// back-reference to the occurrence it replaces. `AllFuture` splits the
/// series: the existing rule is truncated to end just before `date` and a
/// successor template starting at `date` carries the edits; exceptions and
/// edited instances from `date` on move to the successor. Both shapes
/// commit atomically. Aimed at the first occurrence or earlier, `AllFuture`
/// edits the template in place instead of splitting.
///
/// Returns the materialized instance, the successor template, or the
/// updated template respectively.
///
/// ## Errors
/// Returns `NotFound`/`Forbidden` as for [`update_event`], a validation
/// error when the event does not recur or the patch is malformed, or a
/// database error.
#[tracing::instrument(skip(conn, principal, patch))]
pub async fn edit_occurrence(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    template_id: Uuid,
    date: NaiveDate,
    scope: EditScope,
    patch: &EventPatch,
) -> ServiceResult<Event> {
    let (template, rule_row) = require_template(conn, principal, template_id).await?;
    validate_patch(patch)?;

    match scope {
        EditScope::ThisInstance => materialize_instance(conn, &template, date, patch).await,
        EditScope::AllFuture => {
            if date <= template.starts_at.date_naive() {
                return apply_event_update(conn, &template, patch).await;
            }
            split_series(conn, &template, &rule_row, date, patch).await
        }
    }
}

/// Suppresses the generated occurrence and stores the override as a
/// standalone event.
async fn materialize_instance(
    conn: &mut DbConnection<'_>,
    template: &Event,
    date: NaiveDate,
    patch: &EventPatch,
) -> ServiceResult<Event> {
    let (starts_at, ends_at) = merged_times(template, patch, date)?;

    // The transaction closure must own its captures (diesel-async requires them
    // to outlive the pooled connection), so move owned copies in.
    let template = template.clone();
    let patch = patch.clone();
    conn.transaction::<Event, ServiceError, _>(|conn| {
        async move {
            exception::insert(
                conn,
                &NewEventException {
                    event_id: template.id,
                    exception_date: date,
                    reason: None,
                },
            )
            .await?;

            let fields = merged_fields(&template, &patch);
            let stored = event::insert(
                conn,
                &NewEvent {
                    title: fields.title,
                    description: fields.description,
                    starts_at,
                    ends_at,
                    all_day: fields.all_day,
                    location: fields.location,
                    visibility: fields.visibility,
                    category_id: fields.category_id,
                    owner_id: template.owner_id,
                    recurrence_id: None,
                    series_id: Some(template.id),
                    original_start_date: Some(date),
                },
            )
            .await?;

            tracing::debug!(
                series = %template.id,
                instance = %stored.id,
                %date,
                "Occurrence materialized as standalone event"
            );
            Ok(stored)
        }
        .scope_boxed()
    })
    .await
}

/// Truncates the series before `date` and creates the successor carrying
/// the edits.
async fn split_series(
    conn: &mut DbConnection<'_>,
    template: &Event,
    rule_row: &RecurrenceRuleRow,
    date: NaiveDate,
    patch: &EventPatch,
) -> ServiceResult<Event> {
    let cutoff = day_before(date)?;
    let rule = rule_row.to_rule()?;
    let consumed = occurrences_before(&rule, template.starts_at, date);

    let successor_rule = match &patch.recurrence {
        Some(replacement) => {
            replacement
                .validate()
                .map_err(|err| ServiceError::ValidationError(err.to_string()))?;
            Some(replacement.clone())
        }
        None => successor_bounds(&rule, consumed).map(|(until, count)| Rule {
            until,
            count,
            ..rule.clone()
        }),
    };
    let (starts_at, ends_at) = merged_times(template, patch, date)?;

    conn.transaction::<Event, ServiceError, _>(|conn| {
        async move {
            recurrence::truncate(conn, rule_row.id, cutoff).await?;

            let Some(successor_rule) = successor_rule else {
                // The count ran out before the cut: nothing follows.
                event::delete_instances_from(conn, template.id, date).await?;
                exception::delete_from_date(conn, template.id, date).await?;
                return Ok(template.clone());
            };

            let new_rule_row =
                recurrence::insert(conn, &NewRecurrenceRule::from_rule(&successor_rule)).await?;

            let fields = merged_fields(template, patch);
            let successor = event::insert(
                conn,
                &NewEvent {
                    title: fields.title,
                    description: fields.description,
                    starts_at,
                    ends_at,
                    all_day: fields.all_day,
                    location: fields.location,
                    visibility: fields.visibility,
                    category_id: fields.category_id,
                    owner_id: template.owner_id,
                    recurrence_id: Some(new_rule_row.id),
                    series_id: None,
                    original_start_date: None,
                },
            )
            .await?;

            exception::reassign_from_date(conn, template.id, successor.id, date).await?;
            event::reassign_series(conn, template.id, successor.id, date).await?;

            tracing::debug!(
                truncated = %template.id,
                successor = %successor.id,
                %date,
                "Series split"
            );
            Ok(successor)
        }
        .scope_boxed()
    })
    .await
}

async fn apply_event_update<'a>(
    conn: &'a mut DbConnection<'a>,
    existing: &'a Event,
    patch: &'a EventPatch,
) -> ServiceResult<Event> {
    validate_patch(patch)?;

    let starts_at = patch.starts_at.unwrap_or(existing.starts_at);
    let ends_at = patch.ends_at.unwrap_or(existing.ends_at);
    if ends_at <= starts_at {
        return Err(ServiceError::ValidationError(
            "event end must be after its start".to_owned(),
        ));
    }

    if patch.recurrence.is_some() && existing.recurrence_id.is_none() {
        return Err(ServiceError::ValidationError(
            "a recurrence can only be set when the event is created".to_owned(),
        ));
    }

    conn.transaction::<Event, ServiceError, _>(|conn| {
        async move {
            if let (Some(rule), Some(rule_id)) = (&patch.recurrence, existing.recurrence_id) {
                rule.validate()
                    .map_err(|err| ServiceError::ValidationError(err.to_string()))?;
                recurrence::replace(conn, rule_id, &NewRecurrenceRule::from_rule(rule)).await?;
            }

            let changes = EventChanges {
                title: patch.title.as_deref(),
                description: patch.description.as_ref().map(Option::as_deref),
                starts_at: patch.starts_at,
                ends_at: patch.ends_at,
                all_day: patch.all_day,
                location: patch.location.as_ref().map(Option::as_deref),
                visibility: patch.visibility.map(Into::into),
                category_id: patch.category_id,
                updated_at: Utc::now(),
            };
            Ok(event::update(conn, existing.id, &changes).await?)
        }
        .scope_boxed()
    })
    .await
}

async fn delete_event_row<'a>(conn: &mut DbConnection<'a>, existing: &'a Event) -> ServiceResult<()> {
    conn.transaction::<(), ServiceError, _>(|conn| {
        async move {
            // Exceptions and materialized instances cascade with the row.
            event::delete(conn, existing.id).await?;
            if let Some(rule_id) = existing.recurrence_id {
                recurrence::delete(conn, rule_id).await?;
            }
            tracing::debug!(event_id = %existing.id, "Event deleted");
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

async fn require_event(conn: &mut DbConnection<'_>, event_id: Uuid) -> ServiceResult<Event> {
    event::by_id(conn, event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))
}

/// Mutation targets outside the principal's visibility read as missing;
/// visible ones they may not touch are refused.
fn ensure_mutable(event: &Event, principal: &Principal) -> ServiceResult<()> {
    if !policy::can_view(event.visibility.into(), event.owner_id, principal) {
        return Err(ServiceError::NotFound(format!("event {}", event.id)));
    }
    if !policy::can_modify(event.owner_id, principal) {
        return Err(ServiceError::Forbidden(
            "not allowed to modify this event".to_owned(),
        ));
    }
    Ok(())
}

async fn require_template(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    template_id: Uuid,
) -> ServiceResult<(Event, RecurrenceRuleRow)> {
    let template = require_event(conn, template_id).await?;
    ensure_mutable(&template, principal)?;

    let Some(rule_id) = template.recurrence_id else {
        return Err(ServiceError::ValidationError(
            "event does not recur".to_owned(),
        ));
    };
    let Some(rule_row) = recurrence::by_id(conn, rule_id).await? else {
        return Err(ServiceError::InvariantViolation(
            "series template without its stored rule",
        ));
    };
    Ok((template, rule_row))
}

fn validate_draft(draft: &EventDraft) -> ServiceResult<()> {
    validate_title(&draft.title)?;
    validate_text_limit(draft.description.as_deref(), MAX_DESCRIPTION_LEN, "description")?;
    validate_text_limit(draft.location.as_deref(), MAX_LOCATION_LEN, "location")?;
    if draft.ends_at <= draft.starts_at {
        return Err(ServiceError::ValidationError(
            "event end must be after its start".to_owned(),
        ));
    }
    if let Some(rule) = &draft.recurrence {
        rule.validate()
            .map_err(|err| ServiceError::ValidationError(err.to_string()))?;
    }
    Ok(())
}

fn validate_patch(patch: &EventPatch) -> ServiceResult<()> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(description) = &patch.description {
        validate_text_limit(description.as_deref(), MAX_DESCRIPTION_LEN, "description")?;
    }
    if let Some(location) = &patch.location {
        validate_text_limit(location.as_deref(), MAX_LOCATION_LEN, "location")?;
    }
    if let Some(rule) = &patch.recurrence {
        rule.validate()
            .map_err(|err| ServiceError::ValidationError(err.to_string()))?;
    }
    Ok(())
}

fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "title must not be empty".to_owned(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::ValidationError(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_text_limit(value: Option<&str>, limit: usize, field: &str) -> ServiceResult<()> {
    if let Some(text) = value {
        if text.chars().count() > limit {
            return Err(ServiceError::ValidationError(format!(
                "{field} exceeds {limit} characters"
            )));
        }
    }
    Ok(())
}

fn day_before(date: NaiveDate) -> ServiceResult<NaiveDate> {
    date.pred_opt().ok_or_else(|| {
        ServiceError::ValidationError("target date is out of range".to_owned())
    })
}

/// Counts the occurrences a series generates strictly before `cutoff`,
/// exceptions included: an excluded date still consumes its slot in a
/// count-bounded rule.
fn occurrences_before(rule: &Rule, series_start: DateTime<Utc>, cutoff: NaiveDate) -> usize {
    let cutoff_start = Utc.from_utc_datetime(&cutoff.and_time(NaiveTime::MIN));
    let options = ExpansionOptions {
        range_start: None,
        range_end: Some(cutoff_start),
        ..ExpansionOptions::default()
    };
    expand(rule, series_start, &HashSet::new(), &options).len()
}

/// Termination bounds for the successor of a split series, or `None` when
/// the original count is already used up and nothing follows the cut.
fn successor_bounds(rule: &Rule, consumed: usize) -> Option<(Option<NaiveDate>, Option<u32>)> {
    match (rule.until, rule.count) {
        (_, Some(count)) => {
            let remaining = count.saturating_sub(u32::try_from(consumed).unwrap_or(u32::MAX));
            if remaining == 0 {
                None
            } else {
                Some((None, Some(remaining)))
            }
        }
        (until, None) => Some((until, None)),
    }
}

struct MergedFields<'a> {
    title: &'a str,
    description: Option<&'a str>,
    all_day: bool,
    location: Option<&'a str>,
    visibility: civical_db::db::enums::Visibility,
    category_id: Option<Uuid>,
}

/// Template fields with the patch's overrides applied.
fn merged_fields<'a>(template: &'a Event, patch: &'a EventPatch) -> MergedFields<'a> {
    MergedFields {
        title: patch.title.as_deref().unwrap_or(&template.title),
        description: match &patch.description {
            Some(description) => description.as_deref(),
            None => template.description.as_deref(),
        },
        all_day: patch.all_day.unwrap_or(template.all_day),
        location: match &patch.location {
            Some(location) => location.as_deref(),
            None => template.location.as_deref(),
        },
        visibility: patch
            .visibility
            .map_or(template.visibility, Into::into),
        category_id: match patch.category_id {
            Some(category_id) => category_id,
            None => template.category_id,
        },
    }
}

/// Start and end for an occurrence-shaped write on `date`: the template's
/// time of day and duration unless the patch overrides them.
fn merged_times(
    template: &Event,
    patch: &EventPatch,
    date: NaiveDate,
) -> ServiceResult<(DateTime<Utc>, DateTime<Utc>)> {
    let default_start = Utc.from_utc_datetime(&date.and_time(template.starts_at.time()));
    let starts_at = patch.starts_at.unwrap_or(default_start);
    let ends_at = patch
        .ends_at
        .unwrap_or_else(|| starts_at + template.duration());
    if ends_at <= starts_at {
        return Err(ServiceError::ValidationError(
            "event end must be after its start".to_owned(),
        ));
    }
    Ok((starts_at, ends_at))
}
