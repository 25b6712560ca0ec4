//! `SeaORM` Entity for journals table.

use super::sea_orm_active_enums::{JournalSource, JournalStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub doc_number: String,
    pub doc_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub transcode_id: i64,
    pub source_type: JournalSource,
    pub ref_id: Option<i64>,
    pub status: JournalStatus,
    pub is_giro: bool,
    pub giro_number: Option<String>,
    pub giro_due_date: Option<Date>,
    pub giro_bank_name: Option<String>,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transcodes::Entity",
        from = "Column::TranscodeId",
        to = "super::transcodes::Column::Id"
    )]
    Transcodes,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::transcodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcodes.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
