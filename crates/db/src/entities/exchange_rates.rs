//! `SeaORM` Entity for exchange_rates table.

use super::sea_orm_active_enums::ExchangeRateStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub rate_type_id: i64,
    pub from_date: Date,
    pub to_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: ExchangeRateStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rate_types::Entity",
        from = "Column::RateTypeId",
        to = "super::rate_types::Column::Id"
    )]
    RateTypes,
    #[sea_orm(has_many = "super::exchange_rate_lines::Entity")]
    ExchangeRateLines,
}

impl Related<super::rate_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RateTypes.def()
    }
}

impl Related<super::exchange_rate_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExchangeRateLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
