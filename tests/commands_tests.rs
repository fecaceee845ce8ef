// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use paydays::commands::{calendar, config, doctor, exporter, reminders, subscriptions, summary};
use paydays::models::{Category, EventKind, SubscriptionType};
use paydays::store::{self, NewSubscription};
use paydays::{cli, db, settings};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn run_sub(conn: &mut Connection, args: &[&str]) {
    let mut argv = vec!["paydays", "sub"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("sub", m)) = matches.subcommand() {
        subscriptions::handle(conn, m).unwrap();
    } else {
        panic!("no sub subcommand");
    }
}

fn id_of(conn: &Connection, name: &str) -> String {
    store::search(conn, name).unwrap().remove(0).id
}

#[test]
fn add_edit_and_move_through_cli() {
    let mut conn = db::open_in_memory().unwrap();
    run_sub(
        &mut conn,
        &[
            "add", "--name", "Netflix", "--day", "31", "--amount", "99.99", "--currency", "usd",
            "--category", "entertainment",
        ],
    );
    run_sub(&mut conn, &["add", "--name", "Visa", "--type", "credit_card", "--statement-day", "12", "--due-day", "22"]);
    run_sub(&mut conn, &["add", "--name", "Rent", "--type", "bill", "--day", "1", "--reminders", "3,0"]);

    let netflix = store::get(&conn, &id_of(&conn, "Netflix")).unwrap();
    assert_eq!(netflix.currency, "USD");
    assert_eq!(netflix.category, Category::Entertainment);
    assert_eq!(netflix.amount, Some("99.99".parse().unwrap()));

    let visa_id = id_of(&conn, "Visa");
    let visa = store::get(&conn, &visa_id).unwrap();
    assert_eq!(visa.r#type, SubscriptionType::CreditCard);
    assert_eq!(visa.category, Category::Other);
    assert_eq!((visa.statement_day, visa.due_day), (Some(12), Some(22)));

    run_sub(&mut conn, &["edit", "--id", &visa_id, "--category", "Banking", "--active", "false"]);
    let visa = store::get(&conn, &visa_id).unwrap();
    assert_eq!(visa.category, Category::Banking);
    assert!(!visa.is_active);

    let rent_id = id_of(&conn, "Rent");
    let netflix_id = id_of(&conn, "Netflix");
    run_sub(&mut conn, &["move", "--id", &rent_id, "--target", &netflix_id]);
    let order: Vec<String> = store::get_all(&conn).unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(order, vec!["Rent", "Netflix", "Visa"]);

    run_sub(&mut conn, &["rm", "--id", &rent_id]);
    assert_eq!(store::get_all(&conn).unwrap().len(), 2);
}

#[test]
fn duplicate_through_cli_copies_the_record() {
    let mut conn = db::open_in_memory().unwrap();
    run_sub(
        &mut conn,
        &[
            "add", "--name", "Netflix", "--day", "31", "--amount", "99.99", "--currency", "usd",
            "--category", "entertainment", "--reminders", "3,1",
        ],
    );
    run_sub(&mut conn, &["add", "--name", "Rent", "--type", "bill", "--day", "1"]);
    let id = id_of(&conn, "Netflix");
    run_sub(&mut conn, &["duplicate", "--id", &id]);

    let all = store::get_all(&conn).unwrap();
    let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Netflix", "Rent", "Netflix (Kopya)"]);

    let (src, copy) = (&all[0], &all[2]);
    assert_ne!(copy.id, src.id);
    assert_eq!(copy.name, format!("{}{}", src.name, store::COPY_SUFFIX));
    assert_eq!(copy.amount, src.amount);
    assert_eq!(copy.currency, "USD");
    assert_eq!(copy.reminders, vec![3, 1]);
    assert_eq!(copy.recurrence.day_of_month, Some(31));
    assert_eq!(copy.category, Category::Entertainment);
    assert!(copy.sort_order > all[1].sort_order);
}

#[test]
fn next_label_uses_next_payment_or_due_date() {
    let today = d(2024, 4, 10);
    let mut netflix = NewSubscription::new("Netflix", SubscriptionType::Subscription, Category::Entertainment);
    netflix.day_of_month = Some(31);
    let mut early = NewSubscription::new("Gym", SubscriptionType::Bill, Category::Other);
    early.day_of_month = Some(5);
    let mut visa = NewSubscription::new("Visa", SubscriptionType::CreditCard, Category::Banking);
    visa.statement_day = Some(2);
    visa.due_day = Some(22);
    let blank = NewSubscription::new("Blank card", SubscriptionType::CreditCard, Category::Banking);

    let conn = db::open_in_memory().unwrap();
    let labels: Vec<String> = [netflix, early, visa, blank]
        .into_iter()
        .map(|input| subscriptions::next_label(&store::create(&conn, input).unwrap(), today))
        .collect();
    assert_eq!(labels, vec!["2024-04-30", "2024-05-05", "2024-04-22", ""]);
}

#[test]
fn cli_rejects_out_of_range_day() {
    let mut conn = db::open_in_memory().unwrap();
    let matches = cli::build_cli().get_matches_from(["paydays", "sub", "add", "--name", "Gym", "--day", "0"]);
    let (_, m) = matches.subcommand().unwrap();
    assert!(subscriptions::handle(&mut conn, m).is_err());
    assert!(store::get_all(&conn).unwrap().is_empty());
}

#[test]
fn calendar_days_apply_filters() {
    let conn = db::open_in_memory().unwrap();
    let mut netflix = NewSubscription::new("Netflix", SubscriptionType::Subscription, Category::Entertainment);
    netflix.day_of_month = Some(31);
    store::create(&conn, netflix).unwrap();
    let mut card = NewSubscription::new("Visa", SubscriptionType::CreditCard, Category::Banking);
    card.statement_day = Some(12);
    card.due_day = Some(22);
    store::create(&conn, card).unwrap();

    let matches = cli::build_cli().get_matches_from([
        "paydays",
        "calendar",
        "--from",
        "2024-04-01",
        "--to",
        "2024-04-30",
        "--payments-only",
        "--category",
        "Banking",
        "--category",
        "Entertainment",
    ]);
    let (_, m) = matches.subcommand().unwrap();
    let today = d(2024, 4, 1);
    let (start, end) = calendar::resolve_window(m, today).unwrap();
    assert_eq!((start, end), (d(2024, 4, 1), d(2024, 4, 30)));
    let spec = calendar::read_filter(m).unwrap();
    assert_eq!(spec.categories.len(), 2);

    let days = calendar::calendar_days(&conn, start, end, &spec, today).unwrap();
    assert_eq!(days.len(), 30);
    let events: Vec<(NaiveDate, EventKind)> = days
        .iter()
        .flat_map(|day| day.events.iter().map(|e| (e.date, e.kind)))
        .collect();
    assert_eq!(
        events,
        vec![(d(2024, 4, 22), EventKind::Due), (d(2024, 4, 30), EventKind::Payment)]
    );
}

#[test]
fn calendar_month_uses_six_week_grid() {
    let matches = cli::build_cli().get_matches_from(["paydays", "calendar", "--month", "2024-09"]);
    let (_, m) = matches.subcommand().unwrap();
    let window = calendar::resolve_window(m, d(2030, 1, 1)).unwrap();
    assert_eq!(window, (d(2024, 8, 26), d(2024, 10, 6)));
}

#[test]
fn inverted_calendar_window_is_an_error() {
    let matches = cli::build_cli().get_matches_from([
        "paydays", "calendar", "--from", "2024-05-31", "--to", "2024-05-01",
    ]);
    let (_, m) = matches.subcommand().unwrap();
    assert!(calendar::resolve_window(m, d(2024, 5, 1)).is_err());
}

#[test]
fn export_events_as_csv() {
    let conn = db::open_in_memory().unwrap();
    let mut rent = NewSubscription::new("Rent", SubscriptionType::Bill, Category::Bills);
    rent.day_of_month = Some(1);
    rent.amount = Some(Decimal::new(15000, 0));
    store::create(&conn, rent).unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("events.csv").to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "paydays", "export", "events", "--from", "2024-01-01", "--to", "2024-03-31", "--out", &out,
    ]);
    let (_, m) = matches.subcommand().unwrap();
    exporter::handle(&conn, m).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "2024-01-01");
    assert_eq!(&rows[0][1], "payment");
    assert_eq!(&rows[0][2], "Rent");
    assert_eq!(&rows[0][4], "15000");
    assert_eq!(&rows[2][0], "2024-03-01");
}

#[test]
fn reminders_report_once_when_marked() {
    let conn = db::open_in_memory().unwrap();
    let mut rent = NewSubscription::new("Rent", SubscriptionType::Bill, Category::Bills);
    rent.day_of_month = Some(10);
    rent.reminders = Some(vec![3, 0]);
    rent.amount = Some(Decimal::new(500, 0));
    rent.currency = Some("EUR".into());
    store::create(&conn, rent).unwrap();

    let due = reminders::due_reminders(&conn, d(2024, 5, 7), false).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].payment_date, d(2024, 5, 10));
    assert_eq!(due[0].amount.as_deref(), Some("EUR 500.00"));

    // unmarked lookups stay repeatable
    assert_eq!(reminders::due_reminders(&conn, d(2024, 5, 7), false).unwrap().len(), 1);
    assert_eq!(reminders::due_reminders(&conn, d(2024, 5, 7), true).unwrap().len(), 1);
    assert!(reminders::due_reminders(&conn, d(2024, 5, 7), true).unwrap().is_empty());

    assert_eq!(reminders::due_reminders(&conn, d(2024, 5, 10), false).unwrap().len(), 1);
    assert!(reminders::due_reminders(&conn, d(2024, 5, 8), false).unwrap().is_empty());
}

#[test]
fn summary_groups_by_currency() {
    let conn = db::open_in_memory().unwrap();
    for (name, amount, ccy, category) in [
        ("GitHub", "4", "USD", Category::SaaS),
        ("Netflix", "12", "USD", Category::Entertainment),
        ("Rent", "15000", "TRY", Category::Bills),
    ] {
        let mut input = NewSubscription::new(name, SubscriptionType::Subscription, category);
        input.amount = Some(amount.parse().unwrap());
        input.currency = Some(ccy.into());
        store::create(&conn, input).unwrap();
    }

    let report = summary::build(&conn, None).unwrap();
    let currencies: Vec<&str> = report.iter().map(|r| r.currency.as_str()).collect();
    assert_eq!(currencies, vec!["TRY", "USD"]);
    let usd = &report[1];
    assert_eq!(usd.monthly_total, Decimal::new(16, 0));
    assert_eq!(usd.records, 2);
    assert_eq!(usd.categories[0].category, Category::Entertainment);
    assert_eq!(usd.categories[0].percent, Decimal::new(750, 1));

    let only = summary::build(&conn, Some("usd")).unwrap();
    assert_eq!(only.len(), 1);
}

#[test]
fn config_set_through_cli() {
    let conn = db::open_in_memory().unwrap();
    let matches = cli::build_cli().get_matches_from(["paydays", "config", "set", "notifications_enabled", "off"]);
    let (_, m) = matches.subcommand().unwrap();
    config::handle(&conn, m).unwrap();
    assert!(!settings::load(&conn).unwrap().notifications_enabled);

    assert!(settings::set(&conn, "theme", "dark").is_err());
    assert!(settings::set(&conn, settings::KEY_DEFAULT_REMINDERS, "a,b").is_err());
    assert!(settings::set(&conn, settings::KEY_DEFAULT_CURRENCY, " ").is_err());
    assert_eq!(settings::load(&conn).unwrap().default_currency, "TRY");
}

#[test]
fn doctor_flags_suspicious_records() {
    let conn = db::open_in_memory().unwrap();
    store::create(
        &conn,
        NewSubscription::new("Blank card", SubscriptionType::CreditCard, Category::Banking),
    )
    .unwrap();
    let mut ended = NewSubscription::new("Old gym", SubscriptionType::Bill, Category::Other);
    ended.end_date = Some(d(2024, 1, 31));
    store::create(&conn, ended).unwrap();
    let mut weekly = NewSubscription::new("Cleaner", SubscriptionType::Bill, Category::Other);
    weekly.frequency = paydays::models::Frequency::Weekly;
    weekly.currency = Some("EURO".into());
    store::create(&conn, weekly).unwrap();
    conn.execute("UPDATE subscriptions SET sort_order = 0", []).unwrap();

    let issues: Vec<String> = doctor::diagnose(&conn, d(2024, 6, 1))
        .unwrap()
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert!(issues.contains(&"card_without_days".to_string()));
    assert!(issues.contains(&"ended_but_active".to_string()));
    assert!(issues.contains(&"projected_monthly".to_string()));
    assert!(issues.contains(&"odd_currency".to_string()));
    assert!(issues.contains(&"duplicate_sort_order".to_string()));
    assert!(!issues.contains(&"day_out_of_range".to_string()));
}
