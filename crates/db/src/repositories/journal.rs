//! Journal repository.
//!
//! Every write runs in one database transaction: the journal row is locked,
//! the status rule is checked, and period checks, number allocation and
//! invoice settlement happen before a single commit.

use std::collections::{HashMap, HashSet};

use arus_core::currency::{CurrencyInfo, RateError, RateQuery, RateWhen, ResolvedRate};
use arus_core::ledger::{
    DocNumberRequest, InvoiceBalance, JournalAction, JournalInput, JournalLineInput,
    JournalStatus, JournalTotals, JournalView, LedgerError, LedgerService, ResolvedLine,
    SettlementDirection, SettlementService, transition, validate_header, validate_lines,
};
use arus_shared::types::{
    AccountId, InvoiceId, JournalId, PageRequest, PartnerId, RateTypeId,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::db_error::{is_contention, is_unique_violation};
use super::period::PeriodRepository;
use super::rate::RateRepository;
use super::sequence::{SequenceRepository, SequenceSettings};
use crate::entities::{
    accounts, invoices, journal_lines, journals, sea_orm_active_enums, transcodes,
};

fn db_err(err: DbErr) -> LedgerError {
    if is_contention(&err) {
        LedgerError::ConcurrentModification
    } else {
        LedgerError::Database(err.to_string())
    }
}

/// Filter options for listing journals.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    /// Filter by status.
    pub status: Option<JournalStatus>,
    /// Filter by transcode code.
    pub transcode_code: Option<String>,
    /// Filter by transcode category number.
    pub nomortranscode: Option<i32>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Journal header as shown in lists.
#[derive(Debug, Clone, Serialize)]
pub struct JournalSummary {
    /// Journal ID.
    pub id: JournalId,
    /// Document number.
    pub doc_number: String,
    /// Document date.
    pub doc_date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Status.
    pub status: JournalStatus,
    /// Transcode ID.
    pub transcode_id: i64,
}

impl From<journals::Model> for JournalSummary {
    fn from(model: journals::Model) -> Self {
        Self {
            id: JournalId::new(model.id),
            doc_number: model.doc_number,
            doc_date: model.doc_date,
            description: model.description,
            status: model.status.into(),
            transcode_id: model.transcode_id,
        }
    }
}

/// Converts a stored line into the core resolved line.
#[must_use]
pub fn to_resolved_line(model: &journal_lines::Model) -> ResolvedLine {
    ResolvedLine {
        line_no: model.line_no,
        coa_id: AccountId::new(model.coa_id),
        description: model.description.clone(),
        debit: model.debit,
        credit: model.credit,
        currency_code: model.currency_code.clone(),
        exchange_rate: model.exchange_rate,
        fc_debit: model.fc_debit,
        fc_credit: model.fc_credit,
        rate_type_id: model.rate_type_id.map(RateTypeId::new),
        ref_id: model.ref_id.map(InvoiceId::new),
        ref_type: model.ref_type.map(Into::into),
        partner_id: model.partner_id.map(PartnerId::new),
    }
}

fn to_invoice_balance(model: &invoices::Model) -> InvoiceBalance {
    InvoiceBalance {
        id: InvoiceId::new(model.id),
        kind: model.kind.into(),
        total_amount: model.total_amount,
        outstanding: model.outstanding,
    }
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    settings: SequenceSettings,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: SequenceSettings) -> Self {
        Self { db, settings }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.settings.lock_timeout_ms
        ))
        .await
        .map_err(db_err)?;
        Ok(txn)
    }

    /// Creates a Draft journal.
    ///
    /// With `doc_number = "AUTO"` the number is allocated from the transcode
    /// inside the same transaction, dated `today`. Numbers already taken by
    /// manually numbered journals are skipped.
    ///
    /// # Errors
    ///
    /// Returns validation errors, `Unbalanced`, `AccountNotFound`, rate or
    /// sequence errors, `DuplicateDocNumber` or `Database`. Nothing is written
    /// on error.
    pub async fn create(
        &self,
        input: JournalInput,
        today: NaiveDate,
    ) -> Result<JournalView, LedgerError> {
        let doc_request = validate_header(&input.header)?;
        validate_lines(&input.lines)?;

        let txn = self.begin().await?;

        let transcode = Self::find_transcode(&txn, &input.header.transcode_code).await?;
        let (lines, totals) =
            Self::resolve_lines(&txn, &input.lines, input.header.doc_date).await?;

        let doc_number = match doc_request {
            DocNumberRequest::Auto => Self::allocate_unused(&txn, &transcode.code, today).await?,
            DocNumberRequest::Manual(number) => number,
        };

        let now = Utc::now();
        let header = &input.header;
        let journal = journals::ActiveModel {
            doc_number: Set(doc_number.clone()),
            doc_date: Set(header.doc_date),
            description: Set(header.description.clone()),
            transcode_id: Set(transcode.id),
            source_type: Set(header.source_type.into()),
            ref_id: Set(header.ref_id),
            status: Set(sea_orm_active_enums::JournalStatus::Draft),
            is_giro: Set(header.giro.is_giro),
            giro_number: Set(header.giro.giro_number.clone()),
            giro_due_date: Set(header.giro.giro_due_date),
            giro_bank_name: Set(header.giro.giro_bank_name.clone()),
            posted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or(e, &doc_number))?;

        Self::insert_lines(&txn, journal.id, &lines).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            journal_id = journal.id,
            doc_number = %journal.doc_number,
            transcode = %transcode.code,
            total_debit = %totals.total_debit,
            lines = lines.len(),
            "Created journal"
        );

        Ok(Self::view(journal, transcode.code, lines, totals))
    }

    /// Replaces header and lines of a Draft journal.
    ///
    /// `doc_number = "AUTO"` keeps the current number; a journal is never
    /// renumbered implicitly.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidState` for a Posted journal, and the
    /// same validation errors as [`JournalRepository::create`].
    pub async fn update(&self, id: JournalId, input: JournalInput) -> Result<JournalView, LedgerError> {
        let doc_request = validate_header(&input.header)?;
        validate_lines(&input.lines)?;

        let txn = self.begin().await?;
        let journal = Self::lock_journal(&txn, id).await?;
        transition(id, journal.status.into(), JournalAction::Update)?;

        let transcode = Self::find_transcode(&txn, &input.header.transcode_code).await?;
        let (lines, totals) =
            Self::resolve_lines(&txn, &input.lines, input.header.doc_date).await?;

        let doc_number = match doc_request {
            DocNumberRequest::Auto => journal.doc_number.clone(),
            DocNumberRequest::Manual(number) => number,
        };

        let header = &input.header;
        let mut active: journals::ActiveModel = journal.into();
        active.doc_number = Set(doc_number.clone());
        active.doc_date = Set(header.doc_date);
        active.description = Set(header.description.clone());
        active.transcode_id = Set(transcode.id);
        active.source_type = Set(header.source_type.into());
        active.ref_id = Set(header.ref_id);
        active.is_giro = Set(header.giro.is_giro);
        active.giro_number = Set(header.giro.giro_number.clone());
        active.giro_due_date = Set(header.giro.giro_due_date);
        active.giro_bank_name = Set(header.giro.giro_bank_name.clone());
        active.updated_at = Set(Utc::now().into());
        let journal = active
            .update(&txn)
            .await
            .map_err(|e| duplicate_or(e, &doc_number))?;

        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::JournalId.eq(journal.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        Self::insert_lines(&txn, journal.id, &lines).await?;

        txn.commit().await.map_err(db_err)?;

        info!(journal_id = journal.id, doc_number = %journal.doc_number, lines = lines.len(), "Updated journal");
        Ok(Self::view(journal, transcode.code, lines, totals))
    }

    /// Posts a Draft journal and settles referenced invoices.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidState`, `PeriodClosed` (as a period
    /// error), `Unbalanced`, `NothingToPost`, settlement errors or `Database`.
    pub async fn post(&self, id: JournalId) -> Result<JournalView, LedgerError> {
        self.change_status(id, JournalAction::Post).await
    }

    /// Returns a Posted journal to Draft and restores invoice balances.
    ///
    /// The journal keeps its document number. Unposting is also gated by the
    /// accounting period, so a closed period stays frozen.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidState`, `PeriodClosed`,
    /// `OverRestore` or `Database`.
    pub async fn unpost(&self, id: JournalId) -> Result<JournalView, LedgerError> {
        self.change_status(id, JournalAction::Unpost).await
    }

    async fn change_status(
        &self,
        id: JournalId,
        action: JournalAction,
    ) -> Result<JournalView, LedgerError> {
        let txn = self.begin().await?;
        let journal = Self::lock_journal(&txn, id).await?;
        let next = transition(id, journal.status.into(), action)?;

        PeriodRepository::check_posting_in(&txn, journal.doc_date).await?;

        let lines = Self::load_lines(&txn, journal.id).await?;
        let totals = match action {
            JournalAction::Post => LedgerService::validate_for_posting(&lines)?,
            _ => LedgerService::calculate_totals(&lines),
        };

        let direction = match action {
            JournalAction::Post => SettlementDirection::Apply,
            _ => SettlementDirection::Reverse,
        };
        Self::settle(&txn, &lines, direction).await?;

        let transcode = transcodes::Entity::find_by_id(journal.transcode_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .map(|t| t.code)
            .unwrap_or_default();

        let now = Utc::now();
        let mut active: journals::ActiveModel = journal.into();
        active.status = Set(next.into());
        active.posted_at = Set(match next {
            JournalStatus::Posted => Some(now.into()),
            JournalStatus::Draft => None,
        });
        active.updated_at = Set(now.into());
        let journal = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            journal_id = journal.id,
            doc_number = %journal.doc_number,
            action = %action,
            status = %next,
            "Journal status changed"
        );
        Ok(Self::view(journal, transcode, lines, totals))
    }

    /// Deletes a Draft journal with its lines.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidState` for a Posted journal, or
    /// `Database`.
    pub async fn delete(&self, id: JournalId) -> Result<(), LedgerError> {
        let txn = self.begin().await?;
        let journal = Self::lock_journal(&txn, id).await?;
        transition(id, journal.status.into(), JournalAction::Delete)?;

        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::JournalId.eq(journal.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        journals::Entity::delete_by_id(journal.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(journal_id = journal.id, doc_number = %journal.doc_number, "Deleted journal");
        Ok(())
    }

    /// Gets a journal with lines and totals.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` or `Database`.
    pub async fn get(&self, id: JournalId) -> Result<JournalView, LedgerError> {
        let (journal, transcode) = journals::Entity::find_by_id(id.into_inner())
            .find_also_related(transcodes::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::JournalNotFound(id))?;

        let lines = Self::load_lines(&self.db, journal.id).await?;
        let totals = LedgerService::calculate_totals(&lines);
        let code = transcode.map(|t| t.code).unwrap_or_default();

        Ok(Self::view(journal, code, lines, totals))
    }

    /// Lists journal headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on failure.
    pub async fn list(
        &self,
        filter: JournalFilter,
        page: &PageRequest,
    ) -> Result<(Vec<JournalSummary>, u64), LedgerError> {
        let mut query = journals::Entity::find();

        if filter.transcode_code.is_some() || filter.nomortranscode.is_some() {
            query = query.join(JoinType::InnerJoin, journals::Relation::Transcodes.def());
        }
        if let Some(code) = filter.transcode_code {
            query = query.filter(transcodes::Column::Code.eq(code));
        }
        if let Some(category) = filter.nomortranscode {
            query = query.filter(transcodes::Column::Nomortranscode.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                journals::Column::Status.eq(sea_orm_active_enums::JournalStatus::from(status)),
            );
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(journals::Column::DocDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(journals::Column::DocDate.lte(date_to));
        }

        let query = query
            .order_by_desc(journals::Column::DocDate)
            .order_by_desc(journals::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((rows.into_iter().map(JournalSummary::from).collect(), total))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn lock_journal(
        txn: &DatabaseTransaction,
        id: JournalId,
    ) -> Result<journals::Model, LedgerError> {
        journals::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::JournalNotFound(id))
    }

    /// Allocates the next number that no journal holds yet.
    ///
    /// Each skipped number stays consumed, so the counter moves past manual
    /// numbers instead of regenerating them on every call.
    async fn allocate_unused(
        txn: &DatabaseTransaction,
        code: &str,
        today: NaiveDate,
    ) -> Result<String, LedgerError> {
        loop {
            let allocation = SequenceRepository::allocate_in(txn, code, today).await?;
            let taken = journals::Entity::find()
                .filter(journals::Column::DocNumber.eq(allocation.doc_number.as_str()))
                .count(txn)
                .await
                .map_err(db_err)?
                > 0;
            if !taken {
                return Ok(allocation.doc_number);
            }
            warn!(
                transcode = %code,
                doc_number = %allocation.doc_number,
                "Document number already used, skipping"
            );
        }
    }

    async fn find_transcode<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<transcodes::Model, LedgerError> {
        let code = code.trim();
        transcodes::Entity::find()
            .filter(transcodes::Column::Code.eq(code))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                arus_core::sequence::SequenceError::TranscodeNotFound(code.to_string()).into()
            })
    }

    async fn load_lines<C: ConnectionTrait>(
        conn: &C,
        journal_id: i64,
    ) -> Result<Vec<ResolvedLine>, LedgerError> {
        let rows = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(journal_id))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(to_resolved_line).collect())
    }

    /// Loads accounts and rates the lines need, then validates and converts
    /// them to the base currency at `doc_date`.
    async fn resolve_lines<C: ConnectionTrait>(
        conn: &C,
        lines: &[JournalLineInput],
        doc_date: NaiveDate,
    ) -> Result<(Vec<ResolvedLine>, JournalTotals), LedgerError> {
        let account_ids: Vec<i64> = lines
            .iter()
            .map(|l| l.coa_id.into_inner())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let known: HashSet<i64> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .filter(accounts::Column::IsActive.eq(true))
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|a| a.id)
            .collect();

        let base = RateRepository::base_currency_in(conn).await?;
        let currencies = Self::load_currencies(conn, lines, &base).await?;
        let rates = Self::load_rates(conn, lines, &base, &currencies, doc_date).await?;

        LedgerService::validate_and_resolve(
            lines,
            &base,
            |code| {
                currencies
                    .get(code)
                    .cloned()
                    .ok_or_else(|| RateError::CurrencyNotFound(code.to_string()).into())
            },
            |code, rate_type| {
                rates
                    .get(&(code.to_string(), rate_type))
                    .cloned()
                    .ok_or_else(|| {
                        LedgerError::Validation(format!("no rate loaded for currency {code}"))
                    })
            },
            |id| known.contains(&id.into_inner()),
        )
    }

    /// Loads every foreign currency the lines are entered in.
    async fn load_currencies<C: ConnectionTrait>(
        conn: &C,
        lines: &[JournalLineInput],
        base: &CurrencyInfo,
    ) -> Result<HashMap<String, CurrencyInfo>, LedgerError> {
        let mut currencies = HashMap::new();
        for code in lines.iter().filter_map(line_currency) {
            if code == base.code || currencies.contains_key(&code) {
                continue;
            }
            let currency = RateRepository::currency_in(conn, &code).await?;
            currencies.insert(code, currency);
        }
        Ok(currencies)
    }

    /// Resolves one rate per foreign `(currency, rate type)` pair that has no
    /// explicit rate on the line.
    async fn load_rates<C: ConnectionTrait>(
        conn: &C,
        lines: &[JournalLineInput],
        base: &CurrencyInfo,
        currencies: &HashMap<String, CurrencyInfo>,
        doc_date: NaiveDate,
    ) -> Result<HashMap<(String, Option<RateTypeId>), ResolvedRate>, LedgerError> {
        let mut rates = HashMap::new();

        for line in lines.iter().filter(|l| l.exchange_rate.is_none()) {
            let Some(currency) = line_currency(line).and_then(|code| currencies.get(&code))
            else {
                continue;
            };
            let key = (currency.code.clone(), line.rate_type_id);
            if rates.contains_key(&key) {
                continue;
            }

            let query = RateQuery {
                from: currency.clone(),
                to: base.clone(),
                base: base.clone(),
                when: RateWhen::Date(doc_date),
                rate_type: line.rate_type_id,
            };
            let rate = RateRepository::resolve_in(conn, &query).await?;
            debug!(
                currency = %currency.code,
                rate = %rate.from_rate,
                date = %doc_date,
                "Resolved line rate"
            );
            rates.insert(key, rate);
        }

        Ok(rates)
    }

    async fn insert_lines(
        txn: &DatabaseTransaction,
        journal_id: i64,
        lines: &[ResolvedLine],
    ) -> Result<(), LedgerError> {
        if lines.is_empty() {
            return Ok(());
        }
        let models = lines.iter().map(|line| journal_lines::ActiveModel {
            journal_id: Set(journal_id),
            line_no: Set(line.line_no),
            coa_id: Set(line.coa_id.into_inner()),
            description: Set(line.description.clone()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            currency_code: Set(line.currency_code.clone()),
            exchange_rate: Set(line.exchange_rate),
            fc_debit: Set(line.fc_debit),
            fc_credit: Set(line.fc_credit),
            rate_type_id: Set(line.rate_type_id.map(RateTypeId::into_inner)),
            ref_id: Set(line.ref_id.map(InvoiceId::into_inner)),
            ref_type: Set(line.ref_type.map(Into::into)),
            partner_id: Set(line.partner_id.map(PartnerId::into_inner)),
            ..Default::default()
        });
        journal_lines::Entity::insert_many(models)
            .exec(txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Applies or reverses settlement on every referenced invoice.
    ///
    /// Invoices are locked in ascending ID order.
    async fn settle(
        txn: &DatabaseTransaction,
        lines: &[ResolvedLine],
        direction: SettlementDirection,
    ) -> Result<(), LedgerError> {
        for delta in SettlementService::plan(lines)? {
            let invoice = invoices::Entity::find_by_id(delta.invoice_id.into_inner())
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(db_err)?
                .ok_or(LedgerError::InvoiceNotFound(delta.invoice_id))?;

            let outstanding =
                SettlementService::adjust(&to_invoice_balance(&invoice), &delta, direction)?;

            debug!(
                invoice_id = invoice.id,
                before = %invoice.outstanding,
                after = %outstanding,
                ?direction,
                "Adjusted invoice outstanding"
            );

            let mut active: invoices::ActiveModel = invoice.into();
            active.outstanding = Set(outstanding);
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await.map_err(db_err)?;
        }
        Ok(())
    }

    fn view(
        journal: journals::Model,
        transcode_code: String,
        lines: Vec<ResolvedLine>,
        totals: JournalTotals,
    ) -> JournalView {
        JournalView {
            id: JournalId::new(journal.id),
            doc_number: journal.doc_number,
            doc_date: journal.doc_date,
            description: journal.description,
            transcode_code,
            source_type: journal.source_type.into(),
            ref_id: journal.ref_id,
            status: journal.status.into(),
            giro: arus_core::ledger::GiroInfo {
                is_giro: journal.is_giro,
                giro_number: journal.giro_number,
                giro_due_date: journal.giro_due_date,
                giro_bank_name: journal.giro_bank_name,
            },
            lines,
            totals,
        }
    }
}

/// Upper-cased currency code entered on a line, if any.
fn line_currency(line: &JournalLineInput) -> Option<String> {
    line.currency_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

fn duplicate_or(err: DbErr, doc_number: &str) -> LedgerError {
    if is_unique_violation(&err) {
        LedgerError::DuplicateDocNumber(doc_number.to_string())
    } else {
        db_err(err)
    }
}
