//! Database seeder for Arus development and testing.
//!
//! Seeds currencies (IDR as base), rate types, the cash/bank/journal
//! transcodes, monthly accounting periods for the current year, a small chart
//! of accounts, a USD rate set and one open payable invoice.
//!
//! Every step skips rows that already exist, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use arus_core::currency::{RateError, RateStatus};
use arus_core::period::{PeriodError, PeriodStatus};
use arus_core::sequence::{SequenceError, TranscodeDefinition};
use arus_db::entities::{accounts, currencies, invoices, rate_types, sea_orm_active_enums};
use arus_db::repositories::{CreateExchangeRateInput, CreatePeriodInput, CreateRateLineInput};
use arus_db::{PeriodRepository, RateRepository, SequenceRepository, SequenceSettings};
use arus_shared::{AppConfig, BusinessClock, types::RateTypeId};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");
    let today = config
        .engine
        .clock()
        .unwrap_or_else(|_| BusinessClock::default())
        .today();

    println!("Connecting to database...");
    let db = arus_db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    println!("Seeding currencies...");
    seed_currencies(&db).await;

    println!("Seeding rate types...");
    let commercial = seed_rate_types(&db).await;

    println!("Seeding transcodes...");
    seed_transcodes(&db).await;

    println!("Seeding accounting periods for {}...", today.year());
    seed_periods(&db, today.year()).await;

    println!("Seeding chart of accounts...");
    seed_accounts(&db).await;

    if let Some(rate_type) = commercial {
        println!("Seeding USD exchange rate...");
        seed_exchange_rate(&db, rate_type, today).await;
    }

    println!("Seeding sample invoice...");
    seed_invoice(&db, today).await;

    println!("Seeding complete!");
}

/// Seeds IDR as the base currency plus USD and SGD.
async fn seed_currencies(db: &DatabaseConnection) {
    let rows = [
        ("IDR", "Indonesian Rupiah", "Rp", 0, true),
        ("USD", "US Dollar", "$", 2, false),
        ("SGD", "Singapore Dollar", "S$", 2, false),
    ];

    let mut inserted = 0;
    for (code, name, symbol, decimal_places, is_base) in rows {
        let currency = currencies::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            symbol: Set(symbol.to_string()),
            decimal_places: Set(decimal_places),
            is_base: Set(is_base),
            ..Default::default()
        };

        if let Err(e) = currency.insert(db).await {
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert currency {code}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} currencies");
}

/// Seeds rate types and returns the commercial rate type ID.
async fn seed_rate_types(db: &DatabaseConnection) -> Option<RateTypeId> {
    for (code, name) in [("COMMERCIAL", "Commercial rate"), ("TAX", "Tax rate")] {
        let rate_type = rate_types::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            ..Default::default()
        };

        match rate_type.insert(db).await {
            Ok(_) => println!("  Created rate type {code}"),
            Err(e) if e.to_string().contains("duplicate key") => {
                println!("  Rate type {code} already exists, skipping...");
            }
            Err(e) => eprintln!("Failed to insert rate type {code}: {e}"),
        }
    }

    rate_types::Entity::find()
        .filter(rate_types::Column::Code.eq("COMMERCIAL"))
        .one(db)
        .await
        .ok()
        .flatten()
        .map(|row| RateTypeId::new(row.id))
}

/// Seeds the journal voucher and cash/bank transcodes.
async fn seed_transcodes(db: &DatabaseConnection) {
    let repo = SequenceRepository::new(db.clone(), SequenceSettings::default());

    let definitions = [
        ("JV", "Journal Voucher", "{PREFIX}/{MM}{YYYY}/{SEQ}", 9),
        ("CI", "Cash In", "{PREFIX}/{YY}{MM}/{SEQ}", 10),
        ("CO", "Cash Out", "{PREFIX}/{YY}{MM}/{SEQ}", 11),
        ("BI", "Bank In", "{PREFIX}/{YY}{MM}/{SEQ}", 12),
        ("BO", "Bank Out", "{PREFIX}/{YY}{MM}/{SEQ}", 13),
    ];

    for (code, name, format, nomortranscode) in definitions {
        let definition = TranscodeDefinition {
            code: code.to_string(),
            name: name.to_string(),
            prefix: code.to_string(),
            format: format.to_string(),
            nomortranscode,
            last_number: 0,
        };

        match repo.create(definition).await {
            Ok(_) => println!("  Created transcode {code} ({format})"),
            Err(SequenceError::DuplicateCode(_)) => {
                println!("  Transcode {code} already exists, skipping...");
            }
            Err(e) => eprintln!("Failed to create transcode {code}: {e}"),
        }
    }
}

/// Seeds twelve open monthly periods for `year`.
async fn seed_periods(db: &DatabaseConnection, year: i32) {
    let repo = PeriodRepository::new(db.clone());
    let mut inserted = 0;

    for month in 1..=12 {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        let Some(end) = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
        else {
            continue;
        };

        let input = CreatePeriodInput {
            name: start.format("%B %Y").to_string(),
            start_date: start,
            end_date: end,
            status: PeriodStatus::Open,
        };

        match repo.create(input).await {
            Ok(_) => inserted += 1,
            Err(PeriodError::OverlapsExisting { .. }) => {}
            Err(e) => eprintln!("Failed to create period {year}-{month:02}: {e}"),
        }
    }

    println!("  Inserted {inserted} accounting periods");
}

/// Seeds a minimal chart of accounts.
async fn seed_accounts(db: &DatabaseConnection) {
    let rows = [
        ("1101", "Cash on Hand"),
        ("1102", "Bank BCA"),
        ("1201", "Accounts Receivable"),
        ("2101", "Accounts Payable"),
        ("4101", "Sales Revenue"),
        ("5101", "Office Expense"),
    ];

    let mut inserted = 0;
    for (code, name) in rows {
        let account = accounts::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            is_active: Set(true),
            ..Default::default()
        };

        if let Err(e) = account.insert(db).await {
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert account {code}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} accounts");
}

/// Seeds a USD/IDR rate set covering the current month.
async fn seed_exchange_rate(db: &DatabaseConnection, rate_type: RateTypeId, today: NaiveDate) {
    let repo = RateRepository::new(db.clone());

    let Some(from_date) = today.with_day(1) else {
        return;
    };
    let Some(to_date) = from_date
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
    else {
        return;
    };

    let input = CreateExchangeRateInput {
        rate_type_id: rate_type,
        from_date,
        to_date,
        description: Some("Seeded monthly rate".to_string()),
        status: RateStatus::Active,
        lines: vec![
            CreateRateLineInput {
                from_currency: "USD".to_string(),
                to_currency: "IDR".to_string(),
                rate: dec!(16250),
            },
            CreateRateLineInput {
                from_currency: "IDR".to_string(),
                to_currency: "USD".to_string(),
                rate: dec!(0.0000615),
            },
        ],
    };

    match repo.create_exchange_rate(input).await {
        Ok(stored) => println!(
            "  Created rate set {} ({from_date} to {to_date}, {} lines)",
            stored.rate.id,
            stored.lines.len()
        ),
        Err(RateError::CurrencyNotFound(code)) => {
            eprintln!("Skipping rate set, currency {code} missing");
        }
        Err(e) => eprintln!("Failed to create rate set: {e}"),
    }
}

/// Seeds one open payable invoice for settlement testing.
async fn seed_invoice(db: &DatabaseConnection, today: NaiveDate) {
    let invoice = invoices::ActiveModel {
        invoice_number: Set("AP-SEED-0001".to_string()),
        kind: Set(sea_orm_active_enums::InvoiceKind::Ap),
        partner_id: Set(None),
        invoice_date: Set(today),
        total_amount: Set(dec!(500000)),
        outstanding: Set(dec!(500000)),
        ..Default::default()
    };

    match invoice.insert(db).await {
        Ok(row) => println!("  Created invoice {} (id {})", row.invoice_number, row.id),
        Err(e) if e.to_string().contains("duplicate key") => {
            println!("  Sample invoice already exists, skipping...");
        }
        Err(e) => eprintln!("Failed to insert invoice: {e}"),
    }
}
