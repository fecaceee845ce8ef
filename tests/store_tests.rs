// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use paydays::db;
use paydays::error::CoreError;
use paydays::models::{Category, SubscriptionType};
use paydays::ordering::Position;
use paydays::settings;
use paydays::store::{self, NewSubscription, SubscriptionPatch};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn conn() -> Connection {
    db::open_in_memory().unwrap()
}

fn add(conn: &Connection, name: &str, day: u32) -> String {
    let mut input = NewSubscription::new(name, SubscriptionType::Subscription, Category::Entertainment);
    input.day_of_month = Some(day);
    store::create(conn, input).unwrap().id
}

fn names(conn: &Connection) -> Vec<String> {
    store::get_all(conn)
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect()
}

fn core_err(err: anyhow::Error) -> CoreError {
    err.downcast::<CoreError>().expect("expected a CoreError")
}

#[test]
fn create_applies_defaults() {
    let conn = conn();
    let s = store::create(
        &conn,
        NewSubscription::new("  Netflix ", SubscriptionType::Subscription, Category::Entertainment),
    )
    .unwrap();
    assert_eq!(s.name, "Netflix");
    assert_eq!(s.currency, "TRY");
    assert_eq!(s.reminders, vec![1]);
    assert!(s.is_active);
    assert_eq!(s.sort_order, 0);
    assert_eq!(s.created_at, s.updated_at);
    assert!(!s.id.is_empty());
}

#[test]
fn create_uses_configured_defaults() {
    let conn = conn();
    settings::set(&conn, settings::KEY_DEFAULT_CURRENCY, "usd").unwrap();
    settings::set(&conn, settings::KEY_DEFAULT_REMINDERS, "7, 1,7").unwrap();
    let id = add(&conn, "Spotify", 5);
    let s = store::get(&conn, &id).unwrap();
    assert_eq!(s.currency, "USD");
    assert_eq!(s.reminders, vec![7, 1]);
}

#[test]
fn new_records_go_to_the_end() {
    let conn = conn();
    add(&conn, "A", 1);
    add(&conn, "B", 1);
    let c = add(&conn, "C", 1);
    assert_eq!(store::get(&conn, &c).unwrap().sort_order, 2);
    assert_eq!(names(&conn), vec!["A", "B", "C"]);
}

#[test]
fn create_rejects_bad_input() {
    let conn = conn();
    let mut input = NewSubscription::new("Gym", SubscriptionType::Bill, Category::Bills);
    input.day_of_month = Some(32);
    let err = core_err(store::create(&conn, input).unwrap_err());
    assert!(matches!(err, CoreError::InvalidInput(_)));

    let mut input = NewSubscription::new("Gym", SubscriptionType::Bill, Category::Bills);
    input.amount = Some(Decimal::new(-1, 0));
    assert!(store::create(&conn, input).is_err());

    let input = NewSubscription::new("   ", SubscriptionType::Bill, Category::Bills);
    assert!(store::create(&conn, input).is_err());
    assert!(store::get_all(&conn).unwrap().is_empty());
}

#[test]
fn round_trips_every_field() {
    let conn = conn();
    let mut input = NewSubscription::new("Visa", SubscriptionType::CreditCard, Category::Banking);
    input.amount = Some("1250.75".parse().unwrap());
    input.currency = Some("eur".into());
    input.payment_method = Some("Auto debit".into());
    input.reminders = Some(vec![3, 0]);
    input.notes = Some("limit 5000".into());
    input.statement_day = Some(12);
    input.due_day = Some(22);
    input.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
    input.end_date = NaiveDate::from_ymd_opt(2026, 12, 31);
    let created = store::create(&conn, input).unwrap();

    let s = store::get(&conn, &created.id).unwrap();
    assert_eq!(s, created);
    assert_eq!(s.r#type, SubscriptionType::CreditCard);
    assert_eq!(s.amount, Some("1250.75".parse().unwrap()));
    assert_eq!(s.currency, "EUR");
    assert_eq!(s.statement_day, Some(12));
    assert_eq!(s.due_day, Some(22));
    assert_eq!(s.end_date, NaiveDate::from_ymd_opt(2026, 12, 31));
}

#[test]
fn update_changes_only_patched_fields() {
    let conn = conn();
    let id = add(&conn, "Netflix", 10);
    let before = store::get(&conn, &id).unwrap();
    let after = store::update(
        &conn,
        &id,
        SubscriptionPatch {
            amount: Some("199.99".parse().unwrap()),
            day_of_month: Some(31),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(after.name, "Netflix");
    assert_eq!(after.recurrence.day_of_month, Some(31));
    assert_eq!(after.amount, Some("199.99".parse().unwrap()));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[test]
fn unknown_ids_are_not_found() {
    let conn = conn();
    let err = core_err(store::get(&conn, "nope").unwrap_err());
    assert!(matches!(err, CoreError::NotFound(_)));
    let err = core_err(store::update(&conn, "nope", SubscriptionPatch::default()).unwrap_err());
    assert!(matches!(err, CoreError::NotFound(_)));
    let err = core_err(store::delete(&conn, "nope").unwrap_err());
    assert!(matches!(err, CoreError::NotFound(_)));
    assert!(store::find(&conn, "nope").unwrap().is_none());
}

#[test]
fn toggle_and_active_listing() {
    let conn = conn();
    let a = add(&conn, "A", 1);
    add(&conn, "B", 1);
    let s = store::toggle_active(&conn, &a).unwrap();
    assert!(!s.is_active);
    let active: Vec<String> = store::get_active(&conn)
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(active, vec!["B"]);
    assert_eq!(store::get_all(&conn).unwrap().len(), 2);
    assert!(store::toggle_active(&conn, &a).unwrap().is_active);
}

#[test]
fn delete_removes_record() {
    let conn = conn();
    let a = add(&conn, "A", 1);
    store::delete(&conn, &a).unwrap();
    assert!(store::find(&conn, &a).unwrap().is_none());
}

#[test]
fn search_ignores_case() {
    let conn = conn();
    add(&conn, "Netflix", 1);
    add(&conn, "Spotify", 1);
    add(&conn, "Netflix Family", 1);
    let hits: Vec<String> = store::search(&conn, "NETFLIX")
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(hits, vec!["Netflix", "Netflix Family"]);
}

#[test]
fn search_folds_non_ascii_names() {
    let conn = conn();
    add(&conn, "ŞOK Market", 1);
    add(&conn, "İSKİ Su", 1);
    add(&conn, "Netflix", 1);

    let hits = |q: &str| -> Vec<String> {
        store::search(&conn, q)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect()
    };
    assert_eq!(hits("ŞOK"), vec!["ŞOK Market"]);
    assert_eq!(hits("şok"), vec!["ŞOK Market"]);
    assert_eq!(hits("İSKİ"), vec!["İSKİ Su"]);
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = conn();
    add(&conn, "Netflix", 1);
    add(&conn, "Rent_2024", 1);
    add(&conn, "Savings 100%", 1);

    let names = |q: &str| -> Vec<String> {
        store::search(&conn, q)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect()
    };
    assert_eq!(names("_"), vec!["Rent_2024"]);
    assert_eq!(names("%"), vec!["Savings 100%"]);
    assert!(names("Net%").is_empty());
}

#[test]
fn duplicate_copies_fields_under_new_name() {
    let conn = conn();
    let mut input = NewSubscription::new("Visa", SubscriptionType::CreditCard, Category::Banking);
    input.amount = Some("300".parse().unwrap());
    input.currency = Some("EUR".into());
    input.payment_method = Some("Auto debit".into());
    input.reminders = Some(vec![5]);
    input.notes = Some("gold".into());
    input.statement_day = Some(3);
    input.due_day = Some(13);
    let src = store::create(&conn, input).unwrap();

    let copy = store::duplicate(&conn, &src.id).unwrap();
    assert_ne!(copy.id, src.id);
    assert_eq!(copy.name, "Visa (Kopya)");
    assert_eq!(copy.sort_order, src.sort_order + 1);
    assert_eq!(copy.r#type, src.r#type);
    assert_eq!(copy.category, src.category);
    assert_eq!(copy.recurrence, src.recurrence);
    assert_eq!(copy.amount, src.amount);
    assert_eq!(copy.currency, src.currency);
    assert_eq!(copy.payment_method, src.payment_method);
    assert_eq!(copy.reminders, src.reminders);
    assert_eq!(copy.notes, src.notes);
    assert_eq!((copy.statement_day, copy.due_day), (Some(3), Some(13)));

    let err = core_err(store::duplicate(&conn, "nope").unwrap_err());
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[test]
fn by_category_lists_active_only() {
    let conn = conn();
    let mut input = NewSubscription::new("Power", SubscriptionType::Bill, Category::Bills);
    input.day_of_month = Some(5);
    let power = store::create(&conn, input).unwrap();
    let water = store::create(
        &conn,
        NewSubscription::new("Water", SubscriptionType::Bill, Category::Bills),
    )
    .unwrap();
    add(&conn, "Netflix", 1);
    store::toggle_active(&conn, &water.id).unwrap();

    let bills = store::get_by_category(&conn, Category::Bills).unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].id, power.id);
}

#[test]
fn move_persists_contiguous_order() {
    let mut conn = conn();
    add(&conn, "A", 1);
    let b = add(&conn, "B", 1);
    add(&conn, "C", 1);
    let d = add(&conn, "D", 1);

    let ordered = store::move_subscription(&mut conn, &d, &b, Position::Before).unwrap();
    let got: Vec<&str> = ordered.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(got, vec!["A", "D", "B", "C"]);
    assert_eq!(names(&conn), vec!["A", "D", "B", "C"]);
    let orders: Vec<i64> = store::get_all(&conn)
        .unwrap()
        .iter()
        .map(|s| s.sort_order)
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[test]
fn move_stamps_only_the_moved_record() {
    let mut conn = conn();
    let a = add(&conn, "A", 1);
    let b = add(&conn, "B", 1);
    let a_before = store::get(&conn, &a).unwrap();
    let b_before = store::get(&conn, &b).unwrap();

    store::move_subscription(&mut conn, &a, &b, Position::After).unwrap();
    let a_after = store::get(&conn, &a).unwrap();
    let b_after = store::get(&conn, &b).unwrap();
    assert_eq!(a_after.sort_order, 1);
    assert_eq!(b_after.sort_order, 0);
    assert!(a_after.updated_at >= a_before.updated_at);
    assert_eq!(b_after.updated_at, b_before.updated_at);
}

#[test]
fn move_onto_itself_changes_nothing() {
    let mut conn = conn();
    let a = add(&conn, "A", 1);
    add(&conn, "B", 1);
    let before = store::get_all(&conn).unwrap();
    store::move_subscription(&mut conn, &a, &a, Position::After).unwrap();
    assert_eq!(store::get_all(&conn).unwrap(), before);
}

#[test]
fn failed_move_leaves_order_untouched() {
    let mut conn = conn();
    let a = add(&conn, "A", 1);
    add(&conn, "B", 1);
    let err = core_err(store::move_subscription(&mut conn, &a, "missing", Position::Before).unwrap_err());
    assert!(matches!(err, CoreError::NotFound(_)));
    assert_eq!(names(&conn), vec!["A", "B"]);
}

#[test]
fn move_repairs_shared_sort_orders() {
    let mut conn = conn();
    add(&conn, "A", 1);
    add(&conn, "B", 1);
    add(&conn, "C", 1);
    conn.execute("UPDATE subscriptions SET sort_order = 0", []).unwrap();
    let ids: Vec<String> = store::get_all(&conn).unwrap().into_iter().map(|s| s.id).collect();

    // shared values fall back to id order; move the last id to the front
    store::move_subscription(&mut conn, &ids[2], &ids[0], Position::Before).unwrap();
    let after: Vec<(String, i64)> = store::get_all(&conn)
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.sort_order))
        .collect();
    assert_eq!(
        after,
        vec![
            (ids[2].clone(), 0),
            (ids[0].clone(), 1),
            (ids[1].clone(), 2)
        ]
    );
}

#[test]
fn notifications_are_recorded_once() {
    let conn = conn();
    let a = add(&conn, "A", 1);
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    assert!(!store::was_notified(&conn, &a, day).unwrap());
    assert!(store::mark_notified(&conn, &a, day).unwrap());
    assert!(!store::mark_notified(&conn, &a, day).unwrap());
    assert!(store::was_notified(&conn, &a, day).unwrap());

    store::delete(&conn, &a).unwrap();
    assert!(!store::was_notified(&conn, &a, day).unwrap());
}
