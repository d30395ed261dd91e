//! Transaction entities, the primary records of the registry.
//!
//! A [`Transaction`] is an exchange between two actors (a sender and a
//! receiver) for a signed amount in minor units on a given date. The sign
//! encodes direction: positive is inbound, negative outbound. The amount
//! can optionally be broken down into labeled [`Detail`] lines, in which
//! case the detail amounts must add up to the absolute amount.
//!
//! Date and amount are fixed at creation. A later push matched by UUID may
//! re-point the label/sender/receiver references and rewrite flags and
//! headers, but never touches date or amount; those columns simply are not
//! part of the conflict-update set.

use chrono::NaiveDate;
use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ResultRegistry;
use crate::RegistryError;
use crate::actors::{Actor, ActorRef};
use crate::details::Detail;
use crate::labels::{Label, LabelRef};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub date: NaiveDate,
    pub amount: i64,
    pub label: LabelRef,
    pub sender: ActorRef,
    pub receiver: ActorRef,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub headers: String,
    #[serde(default)]
    pub details: Vec<Detail>,
}

impl Transaction {
    /// Construct a transaction carrying fully-populated references; the
    /// write path extracts and persists them before the transaction itself.
    /// Each `(label, amount)` pair seeds one detail line. `flags` and
    /// `headers` start zeroed/empty.
    pub fn new(
        date: NaiveDate,
        amount: i64,
        label: Label,
        sender: Actor,
        receiver: Actor,
        details: Vec<(Label, i64)>,
    ) -> Self {
        Self {
            uuid: None,
            date,
            amount,
            label: LabelRef::Label(label),
            sender: ActorRef::Actor(sender),
            receiver: ActorRef::Actor(receiver),
            flags: 0,
            headers: String::new(),
            details: details
                .into_iter()
                .map(|(label, amount)| Detail::new(label, amount))
                .collect(),
        }
    }

    /// Assign a UUID when absent, validate the detail lines and check that
    /// they add up to the absolute amount.
    ///
    /// Runs before anything is written, so a failure here leaves no
    /// transaction or detail row behind.
    pub(crate) fn ensure_valid(&mut self) -> ResultRegistry<()> {
        if self.uuid.is_none() {
            self.uuid = Some(Uuid::new_v4());
        }

        for detail in &mut self.details {
            detail.ensure_valid()?;
        }

        if !self.details.is_empty() {
            let actual: i64 = self.details.iter().map(|detail| detail.amount).sum();
            let expected = self.amount.abs();
            if actual != expected {
                return Err(RegistryError::DetailSumMismatch { expected, actual });
            }
        }

        Ok(())
    }

    pub(crate) fn as_row(&self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            uuid: ActiveValue::Set(self.uuid.unwrap_or_else(Uuid::new_v4).to_string()),
            date: ActiveValue::Set(self.date),
            amount: ActiveValue::Set(self.amount),
            label_name: ActiveValue::Set(self.label.name().to_string()),
            sender_name: ActiveValue::Set(self.sender.name().to_string()),
            receiver_name: ActiveValue::Set(self.receiver.name().to_string()),
            flags: ActiveValue::Set(i32::from(self.flags)),
            headers: ActiveValue::Set(self.headers.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub date: Date,
    pub amount: i64,
    pub label_name: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub flags: i32,
    pub headers: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::labels::Entity",
        from = "Column::LabelName",
        to = "super::labels::Column::Name",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Label,
    #[sea_orm(
        belongs_to = "super::actors::Entity",
        from = "Column::SenderName",
        to = "super::actors::Column::Name",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::actors::Entity",
        from = "Column::ReceiverName",
        to = "super::actors::Column::Name",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Receiver,
    #[sea_orm(has_many = "super::details::Entity")]
    Details,
}

impl Related<super::details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
