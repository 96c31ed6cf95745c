//! Tests for pure window assembly.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use uuid::Uuid;

use civical_core::types::Role;
use civical_db::db::enums::Visibility;
use civical_db::model::event::Event;
use civical_recur::{Frequency, Rule};

use crate::auth::Principal;

use super::{SeriesData, TimeWindow, assemble_window};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn event(
    owner: Uuid,
    visibility: Visibility,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: "Board meeting".to_owned(),
        description: None,
        starts_at,
        ends_at,
        all_day: false,
        location: None,
        visibility,
        category_id: None,
        owner_id: owner,
        recurrence_id: None,
        series_id: None,
        original_start_date: None,
        created_at: starts_at,
        updated_at: starts_at,
    }
}

fn weekly_template(owner: Uuid, visibility: Visibility) -> (Event, Rule) {
    let mut template = event(owner, visibility, at(2025, 1, 6, 9), at(2025, 1, 6, 10));
    template.recurrence_id = Some(Uuid::new_v4());
    let rule = Rule {
        frequency: Frequency::Weekly,
        interval: 1,
        until: Some(date(2025, 2, 1)),
        count: None,
        by_weekday: vec![Weekday::Mon],
        month_day: None,
    };
    (template, rule)
}

fn series(template: Event, rule: Rule) -> SeriesData {
    SeriesData {
        template,
        rule,
        exdates: HashSet::new(),
        override_dates: HashSet::new(),
    }
}

fn january_window() -> TimeWindow {
    TimeWindow::new(at(2025, 1, 1, 0), at(2025, 2, 1, 0)).expect("valid window")
}

#[test]
fn private_events_are_hidden_from_other_members() {
    let manager = Uuid::new_v4();
    let private_event = event(manager, Visibility::Private, at(2025, 1, 8, 14), at(2025, 1, 8, 15));

    let member = Principal::authenticated(Uuid::new_v4(), Role::Member);
    let admin = Principal::authenticated(Uuid::new_v4(), Role::Admin);
    let owner = Principal::authenticated(manager, Role::Manager);

    let for_member = assemble_window(&member, &january_window(), vec![private_event.clone()], vec![]);
    assert!(for_member.is_empty());

    let for_admin = assemble_window(&admin, &january_window(), vec![private_event.clone()], vec![]);
    assert_eq!(for_admin.len(), 1);

    let for_owner = assemble_window(&owner, &january_window(), vec![private_event], vec![]);
    assert_eq!(for_owner.len(), 1);
}

#[test]
fn anonymous_viewers_see_only_public_events() {
    let owner = Uuid::new_v4();
    let singles = vec![
        event(owner, Visibility::Public, at(2025, 1, 8, 9), at(2025, 1, 8, 10)),
        event(owner, Visibility::Internal, at(2025, 1, 9, 9), at(2025, 1, 9, 10)),
        event(owner, Visibility::Private, at(2025, 1, 10, 9), at(2025, 1, 10, 10)),
    ];

    let visible = assemble_window(&Principal::Anonymous, &january_window(), singles, vec![]);

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].event.visibility, Visibility::Public);
}

#[test]
fn weekly_series_expands_into_four_mondays() {
    let owner = Uuid::new_v4();
    let (template, rule) = weekly_template(owner, Visibility::Public);
    let template_id = template.id;

    let visible = assemble_window(
        &Principal::Anonymous,
        &january_window(),
        vec![],
        vec![series(template, rule)],
    );

    let starts: Vec<_> = visible.iter().map(|o| o.event.starts_at).collect();
    assert_eq!(
        starts,
        vec![at(2025, 1, 6, 9), at(2025, 1, 13, 9), at(2025, 1, 20, 9), at(2025, 1, 27, 9)]
    );
    for occurrence in &visible {
        assert_eq!(occurrence.event.id, template_id);
        assert_eq!(
            occurrence.original_start_date,
            Some(occurrence.event.starts_at.date_naive())
        );
        // Duration carries over from the template.
        assert_eq!(occurrence.event.duration(), chrono::TimeDelta::hours(1));
    }
}

#[test]
fn exceptions_suppress_their_occurrence() {
    let owner = Uuid::new_v4();
    let (template, rule) = weekly_template(owner, Visibility::Public);

    let mut data = series(template, rule);
    data.exdates.insert(date(2025, 1, 13));

    let visible = assemble_window(&Principal::Anonymous, &january_window(), vec![], vec![data]);

    let dates: Vec<_> = visible
        .iter()
        .filter_map(|o| o.original_start_date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2025, 1, 6), date(2025, 1, 20), date(2025, 1, 27)]
    );
}

#[test]
fn overridden_occurrence_is_replaced_by_its_materialized_instance() {
    let owner = Uuid::new_v4();
    let (template, rule) = weekly_template(owner, Visibility::Public);

    // The Jan 13 occurrence was edited: moved to 11:00 as a standalone row.
    let mut edited = event(owner, Visibility::Public, at(2025, 1, 13, 11), at(2025, 1, 13, 12));
    edited.series_id = Some(template.id);
    edited.original_start_date = Some(date(2025, 1, 13));

    let mut data = series(template, rule);
    data.override_dates.insert(date(2025, 1, 13));

    let visible = assemble_window(
        &Principal::Anonymous,
        &january_window(),
        vec![edited.clone()],
        vec![data],
    );

    assert_eq!(visible.len(), 4);
    let on_the_13th: Vec<_> = visible
        .iter()
        .filter(|o| o.original_start_date == Some(date(2025, 1, 13)))
        .collect();
    assert_eq!(on_the_13th.len(), 1);
    assert_eq!(on_the_13th[0].event.id, edited.id);
    assert_eq!(on_the_13th[0].event.starts_at, at(2025, 1, 13, 11));
}

#[test]
fn ordering_is_start_then_id() {
    let owner = Uuid::new_v4();
    let mut first = event(owner, Visibility::Public, at(2025, 1, 8, 9), at(2025, 1, 8, 10));
    let mut second = event(owner, Visibility::Public, at(2025, 1, 8, 9), at(2025, 1, 8, 10));
    first.id = Uuid::from_u128(1);
    second.id = Uuid::from_u128(2);

    // Feed them in reverse; assembly orders by (start, id).
    let visible = assemble_window(
        &Principal::Anonymous,
        &january_window(),
        vec![second, first],
        vec![],
    );

    let ids: Vec<_> = visible.iter().map(|o| o.event.id).collect();
    assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
}

#[test]
fn templates_never_appear_directly() {
    let owner = Uuid::new_v4();
    let (template, rule) = weekly_template(owner, Visibility::Public);

    // Even if a template row leaks into the singles set, it is dropped.
    let visible = assemble_window(
        &Principal::Anonymous,
        &january_window(),
        vec![template.clone()],
        vec![series(template, rule)],
    );

    assert_eq!(visible.len(), 4);
    assert!(visible.iter().all(|o| o.original_start_date.is_some()));
}

#[test]
fn assembly_is_deterministic_across_calls() {
    let owner = Uuid::new_v4();
    let (template, rule) = weekly_template(owner, Visibility::Internal);
    let viewer = Principal::authenticated(Uuid::new_v4(), Role::Member);

    let first = assemble_window(
        &viewer,
        &january_window(),
        vec![],
        vec![series(template.clone(), rule.clone())],
    );
    let second = assemble_window(&viewer, &january_window(), vec![], vec![series(template, rule)]);

    assert_eq!(first, second);
}
