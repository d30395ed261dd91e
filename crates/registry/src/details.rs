//! Transaction details.
//!
//! A [`Detail`] is one labeled slice of a transaction's amount breakdown.
//! Details are owned by their transaction and are immutable once written:
//! the storage layer only ever inserts them (skipping on conflict), never
//! updates them in place.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::labels::{Label, LabelRef};
use crate::{RegistryError, ResultRegistry};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    #[serde(skip)]
    pub uuid: Option<Uuid>,
    pub label: LabelRef,
    pub amount: i64,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub headers: String,
}

impl Detail {
    /// Construct a detail line under a label node. `flags` and `headers`
    /// start zeroed/empty.
    pub fn new(label: Label, amount: i64) -> Self {
        Self {
            uuid: None,
            label: LabelRef::Label(label),
            amount,
            flags: 0,
            headers: String::new(),
        }
    }

    /// Assign a UUID when absent and reject negative amounts.
    pub(crate) fn ensure_valid(&mut self) -> ResultRegistry<()> {
        if self.uuid.is_none() {
            self.uuid = Some(Uuid::new_v4());
        }
        if self.amount < 0 {
            return Err(RegistryError::NegativeDetailAmount(self.amount));
        }
        Ok(())
    }

    pub(crate) fn as_row(&self, transaction_uuid: Uuid) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            uuid: ActiveValue::Set(self.uuid.unwrap_or_else(Uuid::new_v4).to_string()),
            transaction_uuid: ActiveValue::Set(transaction_uuid.to_string()),
            label_name: ActiveValue::Set(self.label.name().to_string()),
            amount: ActiveValue::Set(self.amount),
            flags: ActiveValue::Set(i32::from(self.flags)),
            headers: ActiveValue::Set(self.headers.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub transaction_uuid: String,
    pub label_name: String,
    pub amount: i64,
    pub flags: i32,
    pub headers: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionUuid",
        to = "super::transactions::Column::Uuid",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::labels::Entity",
        from = "Column::LabelName",
        to = "super::labels::Column::Name",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Label,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Label.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
