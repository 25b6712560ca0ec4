//! Integration tests for accounting period maintenance and the posting gate.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

mod common;

use arus_core::period::{PeriodError, PeriodStatus};
use arus_db::PeriodRepository;
use arus_db::repositories::CreatePeriodInput;
use uuid::Uuid;

/// A far-future year no other test uses.
fn random_year() -> i32 {
    2200 + (Uuid::new_v4().as_u128() % 5000) as i32
}

fn month_input(year: i32, month: u32) -> CreatePeriodInput {
    let start = common::date(year, month, 1);
    let end = if month == 12 {
        common::date(year, 12, 31)
    } else {
        common::date(year, month + 1, 1).pred_opt().unwrap()
    };
    CreatePeriodInput {
        name: format!("{year}-{month:02}"),
        start_date: start,
        end_date: end,
        status: PeriodStatus::Open,
    }
}

#[tokio::test]
async fn test_create_and_resolve_period() {
    let Some(db) = common::connect().await else {
        return;
    };
    let year = random_year();
    common::clear_year(&db, year).await;
    let repo = PeriodRepository::new(db);

    let created = repo.create(month_input(year, 3)).await.unwrap();
    assert_eq!(created.status, PeriodStatus::Open);

    let resolved = repo.resolve(common::date(year, 3, 31)).await.unwrap();
    assert_eq!(resolved.map(|p| p.id), Some(created.id));

    let outside = repo.resolve(common::date(year, 4, 1)).await.unwrap();
    assert!(outside.is_none());

    let period = repo.check_posting(common::date(year, 3, 15)).await.unwrap();
    assert_eq!(period.id, created.id);
}

#[tokio::test]
async fn test_overlapping_period_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let year = random_year();
    common::clear_year(&db, year).await;
    let repo = PeriodRepository::new(db);

    repo.create(month_input(year, 6)).await.unwrap();

    let mut overlapping = month_input(year, 6);
    overlapping.name = "Overlap".to_string();
    overlapping.start_date = common::date(year, 6, 30);
    overlapping.end_date = common::date(year, 7, 15);

    let result = repo.create(overlapping).await;
    assert!(matches!(result, Err(PeriodError::OverlapsExisting { .. })));
}

#[tokio::test]
async fn test_invalid_period_input_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let year = random_year();
    common::clear_year(&db, year).await;
    let repo = PeriodRepository::new(db);

    let mut reversed = month_input(year, 1);
    reversed.start_date = common::date(year, 1, 31);
    reversed.end_date = common::date(year, 1, 1);
    assert!(matches!(
        repo.create(reversed).await,
        Err(PeriodError::InvalidDateRange { .. })
    ));

    let mut unnamed = month_input(year, 2);
    unnamed.name = "  ".to_string();
    assert!(matches!(repo.create(unnamed).await, Err(PeriodError::MissingName)));
}

#[tokio::test]
async fn test_closing_period_blocks_posting() {
    let Some(db) = common::connect().await else {
        return;
    };
    let year = random_year();
    common::clear_year(&db, year).await;
    let repo = PeriodRepository::new(db);

    let period = repo.create(month_input(year, 9)).await.unwrap();
    let date = common::date(year, 9, 10);
    assert!(repo.check_posting(date).await.is_ok());

    let closed = repo.set_status(period.id, PeriodStatus::Closed).await.unwrap();
    assert_eq!(closed.status, PeriodStatus::Closed);
    assert!(matches!(
        repo.check_posting(date).await,
        Err(PeriodError::Closed { .. })
    ));

    repo.set_status(period.id, PeriodStatus::Open).await.unwrap();
    assert!(repo.check_posting(date).await.is_ok());
}

#[tokio::test]
async fn test_date_outside_every_period() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = PeriodRepository::new(db);

    let result = repo.check_posting(common::date(1990, 5, 5)).await;
    assert!(matches!(result, Err(PeriodError::NoPeriod(_))));
    assert!(result.unwrap_err().blocks_posting());
}
