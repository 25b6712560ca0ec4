//! Integration tests for rate resolution and rate maintenance.
//!
//! Validates:
//! - Directional exchange rate lines (date and month requests)
//! - Highest set ID wins for overlapping ranges on a date
//! - Quote fallback through the base currency
//! - RateNotFound when no data covers the request

#![allow(clippy::uninlined_format_args)]

mod common;

use arus_core::currency::{MonthRef, RateError, RateSource, RateStatus, RateWhen};
use arus_db::RateRepository;
use arus_db::repositories::{
    CreateCurrencyRateInput, CreateExchangeRateInput, CreateRateLineInput,
};
use arus_shared::types::RateTypeId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn store_set(
    repo: &RateRepository,
    rate_type: i64,
    from: &str,
    to: &str,
    range: (NaiveDate, NaiveDate),
    rate: Decimal,
    status: RateStatus,
) -> i64 {
    repo.create_exchange_rate(CreateExchangeRateInput {
        rate_type_id: RateTypeId::new(rate_type),
        from_date: range.0,
        to_date: range.1,
        description: None,
        status,
        lines: vec![CreateRateLineInput {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
        }],
    })
    .await
    .unwrap()
    .rate
    .id
}

fn june_2025() -> RateWhen {
    RateWhen::Month(MonthRef::new(2025, 6).unwrap())
}

#[tokio::test]
async fn test_convert_with_directional_line() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    let set_id = store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(1), common::june(30)),
        dec!(0.000065),
        RateStatus::Active,
    )
    .await;

    let conversion = repo
        .convert(
            "IDR",
            &code,
            dec!(1000000),
            RateWhen::Date(common::june(15)),
            None,
        )
        .await
        .unwrap();

    assert_eq!(conversion.result, dec!(65));
    assert_eq!(conversion.rate.from_rate, dec!(0.000065));
    assert_eq!(conversion.rate.to_rate, Decimal::ONE);
    assert_eq!(conversion.rate.effective_date, common::june(1));
    assert_eq!(conversion.rate.rate_type_id, Some(RateTypeId::new(rate_type)));
    assert!(matches!(
        conversion.rate.source,
        RateSource::ExchangeRate { exchange_rate_id } if exchange_rate_id.into_inner() == set_id
    ));
}

#[tokio::test]
async fn test_month_without_data_is_rate_not_found() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(1), common::june(30)),
        dec!(0.000065),
        RateStatus::Active,
    )
    .await;

    let july = RateWhen::Month(MonthRef::new(2025, 7).unwrap());
    let result = repo.convert("IDR", &code, dec!(1000000), july, None).await;

    assert!(matches!(result, Err(RateError::RateNotFound { .. })));
}

#[tokio::test]
async fn test_overlapping_sets_highest_id_wins() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(1), common::june(30)),
        dec!(0.000065),
        RateStatus::Active,
    )
    .await;
    let newer = store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(10), common::june(20)),
        dec!(0.00007),
        RateStatus::Closed,
    )
    .await;

    let rate = repo
        .resolve("IDR", &code, RateWhen::Date(common::june(15)), None)
        .await
        .unwrap();

    assert_eq!(rate.from_rate, dec!(0.00007));
    assert!(matches!(
        rate.source,
        RateSource::ExchangeRate { exchange_rate_id } if exchange_rate_id.into_inner() == newer
    ));
}

#[tokio::test]
async fn test_month_picks_latest_effective_rate() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    // Later range stored first, so the lower ID must still win for the month
    store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(16), common::june(30)),
        dec!(0.000065),
        RateStatus::Active,
    )
    .await;
    store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(1), common::june(15)),
        dec!(0.00006),
        RateStatus::Active,
    )
    .await;

    let conversion = repo
        .convert("IDR", &code, dec!(1000000), june_2025(), None)
        .await
        .unwrap();

    assert_eq!(conversion.result, dec!(65));
    assert_eq!(conversion.rate.effective_date, common::june(16));
}

#[tokio::test]
async fn test_inactive_set_is_ignored() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    store_set(
        &repo,
        rate_type,
        "IDR",
        &code,
        (common::june(1), common::june(30)),
        dec!(0.000065),
        RateStatus::Inactive,
    )
    .await;

    let result = repo
        .resolve("IDR", &code, RateWhen::Date(common::june(15)), None)
        .await;
    assert!(matches!(result, Err(RateError::RateNotFound { .. })));
}

#[tokio::test]
async fn test_quote_fallback_cross_rate() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, usd) = common::create_currency(&db, 2).await;
    let (_, sgd) = common::create_currency(&db, 2).await;

    for (code, buy, sell) in [(&usd, dec!(15900), dec!(16100)), (&sgd, dec!(9900), dec!(10100))] {
        repo.create_currency_rate(CreateCurrencyRateInput {
            currency_code: code.clone(),
            rate_type_id: RateTypeId::new(rate_type),
            rate_date: common::june(10),
            buy_rate: buy,
            sell_rate: sell,
            middle_rate: None,
        })
        .await
        .unwrap();
    }

    let conversion = repo
        .convert(&usd, &sgd, dec!(100), RateWhen::Date(common::june(10)), None)
        .await
        .unwrap();

    assert_eq!(conversion.rate.source, RateSource::CurrencyRate);
    assert_eq!(conversion.rate.from_rate, dec!(16000));
    assert_eq!(conversion.rate.to_rate, dec!(10000));
    assert_eq!(conversion.result, dec!(160));

    // Into the base currency the base side counts as 1
    let to_base = repo
        .convert(&usd, "IDR", dec!(2), RateWhen::Date(common::june(10)), None)
        .await
        .unwrap();
    assert_eq!(to_base.result, dec!(32000));
}

#[tokio::test]
async fn test_duplicate_quote_conflicts() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    let input = CreateCurrencyRateInput {
        currency_code: code.clone(),
        rate_type_id: RateTypeId::new(rate_type),
        rate_date: common::june(3),
        buy_rate: dec!(100),
        sell_rate: dec!(110),
        middle_rate: Some(dec!(104)),
    };

    let stored = repo.create_currency_rate(input.clone()).await.unwrap();
    assert_eq!(stored.middle_rate, dec!(104));

    let duplicate = repo.create_currency_rate(input).await;
    assert!(matches!(duplicate, Err(RateError::DuplicateQuote { .. })));
}

#[tokio::test]
async fn test_exchange_rate_validation() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = RateRepository::new(db.clone());
    let rate_type = common::commercial_rate_type(&db).await;
    let (_, code) = common::create_currency(&db, 2).await;

    let reversed = repo
        .create_exchange_rate(CreateExchangeRateInput {
            rate_type_id: RateTypeId::new(rate_type),
            from_date: common::june(30),
            to_date: common::june(1),
            description: None,
            status: RateStatus::Active,
            lines: vec![CreateRateLineInput {
                from_currency: "IDR".to_string(),
                to_currency: code.clone(),
                rate: dec!(0.000065),
            }],
        })
        .await;
    assert!(matches!(reversed, Err(RateError::InvalidDateRange { .. })));

    let same = repo
        .create_exchange_rate(CreateExchangeRateInput {
            rate_type_id: RateTypeId::new(rate_type),
            from_date: common::june(1),
            to_date: common::june(30),
            description: None,
            status: RateStatus::Active,
            lines: vec![CreateRateLineInput {
                from_currency: code.clone(),
                to_currency: code.clone(),
                rate: dec!(1),
            }],
        })
        .await;
    assert!(matches!(same, Err(RateError::SameCurrency)));

    let unknown = repo
        .resolve("IDR", "NOPE", RateWhen::Date(common::june(1)), None)
        .await;
    assert!(matches!(unknown, Err(RateError::CurrencyNotFound(_))));
}
