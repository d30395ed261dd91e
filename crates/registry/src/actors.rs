//! Actor entities.
//!
//! An [`Actor`] is any participant in a transaction. The same actor can act
//! as a sender in one transaction and as a receiver in another; the role
//! exists only in the context of a [`Transaction`](crate::Transaction).
//!
//! Actors are keyed by name. `flags` and `headers` are opaque to the
//! registry; their semantics belong to the caller.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{RegistryError, ResultRegistry};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub headers: String,
}

impl Actor {
    /// Construct an actor from its name only. `flags` and `headers` start
    /// zeroed/empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn ensure_valid(&self) -> ResultRegistry<()> {
        if self.name.is_empty() {
            return Err(RegistryError::EmptyName("actor"));
        }
        Ok(())
    }
}

/// Reference to an actor: either a record carried along with the
/// transaction, or a bare name to be resolved against already-stored
/// actors.
///
/// Serializes as the name alone; the carried record is a write-path
/// construct and never crosses the JSON boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActorRef {
    Actor(Actor),
    Name(String),
}

impl ActorRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Actor(actor) => &actor.name,
            Self::Name(name) => name,
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Actor(actor) => Some(actor),
            Self::Name(_) => None,
        }
    }
}

impl Serialize for ActorRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ActorRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::Name(String::deserialize(deserializer)?))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "actors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub flags: i32,
    pub headers: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Actor> for ActiveModel {
    fn from(actor: &Actor) -> Self {
        let now = Utc::now();
        Self {
            name: ActiveValue::Set(actor.name.clone()),
            flags: ActiveValue::Set(i32::from(actor.flags)),
            headers: ActiveValue::Set(actor.headers.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl From<Model> for Actor {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            flags: u16::try_from(model.flags).unwrap_or_default(),
            headers: model.headers,
        }
    }
}
