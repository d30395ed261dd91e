//! Label entities.
//!
//! A [`Label`] is a user-defined tag used to classify transactions and
//! detail lines. Labels form a forest: any label can be the parent of any
//! number of others, and a root label has no parent.
//!
//! In memory a parent can be a fully-populated node (to arbitrary depth);
//! in storage the relation is always a name-only reference. The write path
//! collapses node chains through
//! [`flatten_labels`](crate::resolve::flatten_labels).

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{RegistryError, ResultRegistry};

/// Parent of a label: a resolved node carried in memory, or a bare name in
/// the shape that goes to storage.
///
/// Serializes as the parent's name; a missing parent (`Option::None` on the
/// label) serializes as an explicit `null`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelParent {
    Node(Box<Label>),
    Name(String),
}

impl LabelParent {
    pub fn name(&self) -> &str {
        match self {
            Self::Node(label) => &label.name,
            Self::Name(name) => name,
        }
    }

    pub fn node(&self) -> Option<&Label> {
        match self {
            Self::Node(label) => Some(label),
            Self::Name(_) => None,
        }
    }
}

impl Serialize for LabelParent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LabelParent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::Name(String::deserialize(deserializer)?))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub parent: Option<LabelParent>,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub headers: String,
}

impl Label {
    /// Construct a label, optionally under a parent node. `flags` and
    /// `headers` start zeroed/empty.
    pub fn new(name: impl Into<String>, parent: Option<Label>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(|label| LabelParent::Node(Box::new(label))),
            ..Default::default()
        }
    }

    /// Copy of this label with the parent collapsed to a name-only
    /// reference, the form that can be stored.
    pub(crate) fn collapsed(&self) -> Label {
        Label {
            name: self.name.clone(),
            parent: self
                .parent
                .as_ref()
                .map(|parent| LabelParent::Name(parent.name().to_string())),
            flags: self.flags,
            headers: self.headers.clone(),
        }
    }

    pub(crate) fn parent_node(&self) -> Option<&Label> {
        self.parent.as_ref().and_then(LabelParent::node)
    }

    pub(crate) fn ensure_valid(&self) -> ResultRegistry<()> {
        if self.name.is_empty() {
            return Err(RegistryError::EmptyName("label"));
        }
        Ok(())
    }
}

/// Reference to a label: either a record carried along with the referencing
/// row, or a bare name to be resolved against already-stored labels.
///
/// Serializes as the name alone, like [`ActorRef`](crate::ActorRef).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelRef {
    Label(Label),
    Name(String),
}

impl LabelRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Label(label) => &label.name,
            Self::Name(name) => name,
        }
    }

    pub fn label(&self) -> Option<&Label> {
        match self {
            Self::Label(label) => Some(label),
            Self::Name(_) => None,
        }
    }
}

impl Serialize for LabelRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LabelRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::Name(String::deserialize(deserializer)?))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "labels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub parent_name: Option<String>,
    pub flags: i32,
    pub headers: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentName",
        to = "Column::Name",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Label> for ActiveModel {
    fn from(label: &Label) -> Self {
        let now = Utc::now();
        Self {
            name: ActiveValue::Set(label.name.clone()),
            parent_name: ActiveValue::Set(
                label.parent.as_ref().map(|parent| parent.name().to_string()),
            ),
            flags: ActiveValue::Set(i32::from(label.flags)),
            headers: ActiveValue::Set(label.headers.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl From<Model> for Label {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            parent: model.parent_name.map(LabelParent::Name),
            flags: u16::try_from(model.flags).unwrap_or_default(),
            headers: model.headers,
        }
    }
}
