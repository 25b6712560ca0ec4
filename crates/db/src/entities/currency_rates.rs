//! `SeaORM` Entity for currency_rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currency_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub currency_id: i64,
    pub rate_type_id: i64,
    pub rate_date: Date,
    #[sea_orm(column_type = "Decimal(Some((24, 10)))")]
    pub buy_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 10)))")]
    pub sell_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 10)))")]
    pub middle_rate: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id"
    )]
    Currencies,
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
