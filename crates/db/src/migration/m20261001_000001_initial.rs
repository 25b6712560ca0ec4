//! Initial database migration.
//!
//! Creates enums, master data, rate tables, accounting periods, invoices,
//! journals and the integrity triggers guarding posted journals.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DOCUMENT NUMBERING & MASTER DATA
        // ============================================================
        db.execute_unprepared(TRANSCODES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: CURRENCY MANAGEMENT
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(RATE_TYPES_SQL).await?;
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;
        db.execute_unprepared(EXCHANGE_RATE_LINES_SQL).await?;
        db.execute_unprepared(CURRENCY_RATES_SQL).await?;

        // ============================================================
        // PART 4: ACCOUNTING PERIODS
        // ============================================================
        db.execute_unprepared(ACCOUNTING_PERIODS_SQL).await?;

        // ============================================================
        // PART 5: INVOICES & JOURNALS
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE journal_status AS ENUM ('draft', 'posted');

CREATE TYPE journal_source AS ENUM ('MANUAL', 'SYSTEM');

CREATE TYPE accounting_period_status AS ENUM ('open', 'closed');

-- A = active, C = closed (still usable for lookups), I = inactive
CREATE TYPE exchange_rate_status AS ENUM ('A', 'C', 'I');

CREATE TYPE invoice_kind AS ENUM ('AP', 'AR');
";

const TRANSCODES_SQL: &str = r"
CREATE TABLE transcodes (
    id BIGSERIAL PRIMARY KEY,
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    prefix VARCHAR(20) NOT NULL DEFAULT '',
    format VARCHAR(100) NOT NULL,
    nomortranscode INTEGER NOT NULL,
    last_number BIGINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_transcodes_last_number CHECK (last_number >= 0)
);

CREATE INDEX idx_transcodes_nomortranscode ON transcodes(nomortranscode);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    code VARCHAR(30) NOT NULL UNIQUE,
    name VARCHAR(150) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id BIGSERIAL PRIMARY KEY,
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    symbol VARCHAR(10) NOT NULL DEFAULT '',
    decimal_places SMALLINT NOT NULL DEFAULT 2,
    is_base BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_currencies_decimal_places CHECK (decimal_places BETWEEN 0 AND 4)
);

-- Exactly one base currency per installation
CREATE UNIQUE INDEX uq_currencies_single_base ON currencies(is_base) WHERE is_base;
";

const RATE_TYPES_SQL: &str = r"
CREATE TABLE rate_types (
    id BIGSERIAL PRIMARY KEY,
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    id BIGSERIAL PRIMARY KEY,
    rate_type_id BIGINT NOT NULL REFERENCES rate_types(id) ON DELETE RESTRICT,
    from_date DATE NOT NULL,
    to_date DATE NOT NULL,
    description TEXT,
    status exchange_rate_status NOT NULL DEFAULT 'A',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_exchange_rates_range CHECK (from_date <= to_date)
);

CREATE INDEX idx_exchange_rates_range ON exchange_rates(from_date, to_date);
";

const EXCHANGE_RATE_LINES_SQL: &str = r"
CREATE TABLE exchange_rate_lines (
    id BIGSERIAL PRIMARY KEY,
    exchange_rate_id BIGINT NOT NULL REFERENCES exchange_rates(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    from_currency_id BIGINT NOT NULL REFERENCES currencies(id) ON DELETE RESTRICT,
    to_currency_id BIGINT NOT NULL REFERENCES currencies(id) ON DELETE RESTRICT,
    rate NUMERIC(24, 10) NOT NULL,

    CONSTRAINT chk_exchange_rate_lines_positive CHECK (rate > 0),
    CONSTRAINT chk_exchange_rate_lines_pair CHECK (from_currency_id <> to_currency_id),
    CONSTRAINT uq_exchange_rate_lines_pair UNIQUE (exchange_rate_id, from_currency_id, to_currency_id)
);

CREATE INDEX idx_exchange_rate_lines_pair ON exchange_rate_lines(from_currency_id, to_currency_id);
";

const CURRENCY_RATES_SQL: &str = r"
CREATE TABLE currency_rates (
    id BIGSERIAL PRIMARY KEY,
    currency_id BIGINT NOT NULL REFERENCES currencies(id) ON DELETE RESTRICT,
    rate_type_id BIGINT NOT NULL REFERENCES rate_types(id) ON DELETE RESTRICT,
    rate_date DATE NOT NULL,
    buy_rate NUMERIC(24, 10) NOT NULL,
    sell_rate NUMERIC(24, 10) NOT NULL,
    middle_rate NUMERIC(24, 10) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_currency_rates_positive CHECK (buy_rate > 0 AND sell_rate > 0 AND middle_rate > 0),
    CONSTRAINT uq_currency_rates_day UNIQUE (currency_id, rate_type_id, rate_date)
);

CREATE INDEX idx_currency_rates_lookup ON currency_rates(currency_id, rate_date DESC);
";

const ACCOUNTING_PERIODS_SQL: &str = r"
CREATE TABLE accounting_periods (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status accounting_period_status NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_accounting_periods_range CHECK (start_date <= end_date),
    CONSTRAINT ex_accounting_periods_overlap
        EXCLUDE USING gist (daterange(start_date, end_date, '[]') WITH &&)
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id BIGSERIAL PRIMARY KEY,
    invoice_number VARCHAR(50) NOT NULL UNIQUE,
    kind invoice_kind NOT NULL,
    partner_id BIGINT,
    invoice_date DATE NOT NULL,
    total_amount NUMERIC(20, 4) NOT NULL,
    outstanding NUMERIC(20, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_invoices_outstanding CHECK (outstanding >= 0 AND outstanding <= total_amount)
);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id BIGSERIAL PRIMARY KEY,
    doc_number VARCHAR(50) NOT NULL UNIQUE,
    doc_date DATE NOT NULL,
    description TEXT,
    transcode_id BIGINT NOT NULL REFERENCES transcodes(id) ON DELETE RESTRICT,
    source_type journal_source NOT NULL DEFAULT 'MANUAL',
    ref_id BIGINT,
    status journal_status NOT NULL DEFAULT 'draft',
    is_giro BOOLEAN NOT NULL DEFAULT FALSE,
    giro_number VARCHAR(50),
    giro_due_date DATE,
    giro_bank_name VARCHAR(100),
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journals_doc_date ON journals(doc_date);
CREATE INDEX idx_journals_status ON journals(status, doc_date);
CREATE INDEX idx_journals_transcode ON journals(transcode_id);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id BIGSERIAL PRIMARY KEY,
    journal_id BIGINT NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    coa_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    description TEXT,
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    currency_code VARCHAR(10) NOT NULL,
    exchange_rate NUMERIC(24, 10) NOT NULL DEFAULT 1,
    fc_debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    fc_credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    rate_type_id BIGINT REFERENCES rate_types(id) ON DELETE RESTRICT,
    ref_id BIGINT REFERENCES invoices(id) ON DELETE RESTRICT,
    ref_type invoice_kind,
    partner_id BIGINT,

    CONSTRAINT chk_journal_lines_amounts CHECK (debit >= 0 AND credit >= 0 AND NOT (debit > 0 AND credit > 0)),
    CONSTRAINT chk_journal_lines_ref CHECK ((ref_id IS NULL) = (ref_type IS NULL)),
    CONSTRAINT uq_journal_lines_order UNIQUE (journal_id, line_no)
);

CREATE INDEX idx_journal_lines_journal ON journal_lines(journal_id);
CREATE INDEX idx_journal_lines_ref ON journal_lines(ref_id) WHERE ref_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_posted_journal_balance
-- A journal can only become posted with |debit - credit| <= 0.01
-- ============================================================
CREATE OR REPLACE FUNCTION check_posted_journal_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(20, 4);
    total_credit NUMERIC(20, 4);
BEGIN
    IF NEW.status = 'posted' THEN
        SELECT COALESCE(SUM(debit), 0), COALESCE(SUM(credit), 0)
        INTO total_debit, total_credit
        FROM journal_lines
        WHERE journal_id = NEW.id;

        IF ABS(total_debit - total_credit) > 0.01 THEN
            RAISE EXCEPTION 'Journal % is not balanced. Debit: %, Credit: %',
                NEW.doc_number, total_debit, total_credit;
        END IF;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_posted_balance
AFTER UPDATE OF status ON journals
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_posted_journal_balance();

-- ============================================================
-- FUNCTION: prevent_posted_line_modification
-- Lines of a posted journal are immutable until it is unposted
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_line_modification()
RETURNS TRIGGER AS $$
DECLARE
    owner_status journal_status;
    owner_id BIGINT;
BEGIN
    owner_id := COALESCE(NEW.journal_id, OLD.journal_id);

    SELECT status INTO owner_status FROM journals WHERE id = owner_id;

    IF owner_status = 'posted' THEN
        RAISE EXCEPTION 'Lines of posted journal % cannot be modified', owner_id;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_line_mod
BEFORE INSERT OR UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_line_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_prevent_posted_line_mod ON journal_lines;
DROP TRIGGER IF EXISTS trg_check_posted_balance ON journals;

DROP FUNCTION IF EXISTS prevent_posted_line_modification();
DROP FUNCTION IF EXISTS check_posted_journal_balance();

DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS accounting_periods CASCADE;
DROP TABLE IF EXISTS currency_rates CASCADE;
DROP TABLE IF EXISTS exchange_rate_lines CASCADE;
DROP TABLE IF EXISTS exchange_rates CASCADE;
DROP TABLE IF EXISTS rate_types CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS transcodes CASCADE;

DROP TYPE IF EXISTS invoice_kind CASCADE;
DROP TYPE IF EXISTS exchange_rate_status CASCADE;
DROP TYPE IF EXISTS accounting_period_status CASCADE;
DROP TYPE IF EXISTS journal_source CASCADE;
DROP TYPE IF EXISTS journal_status CASCADE;
";
