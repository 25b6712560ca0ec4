//! `SeaORM` Entity for journal_lines table.

use super::sea_orm_active_enums::InvoiceKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub journal_id: i64,
    pub line_no: i32,
    pub coa_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub credit: Decimal,
    pub currency_code: String,
    #[sea_orm(column_type = "Decimal(Some((24, 10)))")]
    pub exchange_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub fc_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub fc_credit: Decimal,
    pub rate_type_id: Option<i64>,
    pub ref_id: Option<i64>,
    pub ref_type: Option<InvoiceKind>,
    pub partner_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id",
        on_delete = "Cascade"
    )]
    Journals,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CoaId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::RefId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
