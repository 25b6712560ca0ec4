//! `SeaORM` Entity for exchange_rate_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rate_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exchange_rate_id: i64,
    pub line_no: i32,
    pub from_currency_id: i64,
    pub to_currency_id: i64,
    #[sea_orm(column_type = "Decimal(Some((24, 10)))")]
    pub rate: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exchange_rates::Entity",
        from = "Column::ExchangeRateId",
        to = "super::exchange_rates::Column::Id",
        on_delete = "Cascade"
    )]
    ExchangeRates,
}

impl Related<super::exchange_rates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExchangeRates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
