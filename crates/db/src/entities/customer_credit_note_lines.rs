//! `SeaORM` Entity for customer_credit_note_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_credit_note_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub credit_note_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub line_number: i32,
    pub tenant_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub line_amount: Decimal,
    pub revenue_account_id: Uuid,
    pub project_id: Option<Uuid>,
    pub fund_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer_credit_notes::Entity",
        from = "Column::CreditNoteId",
        to = "super::customer_credit_notes::Column::Id",
        on_delete = "Cascade"
    )]
    CustomerCreditNotes,
}

impl Related<super::customer_credit_notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerCreditNotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
