//! The read projector.
//!
//! Reads are always ordered (actors and labels by name, transactions by
//! date) so pagination is deterministic. Relationships are resolved with
//! follow-up `IN` queries rather than joins; a joined limit would count
//! joined rows and break the page size.

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::labels::LabelParent;
use crate::{
    Actor, ActorRef, Detail, Label, LabelRef, PullOptions, Registry, ResultRegistry,
    RegistryError, Transaction, actors, details, labels, transactions,
};

fn paginate<Q: QuerySelect>(query: Q, options: &PullOptions) -> Q {
    let query = if options.limit > 0 {
        query.limit(options.limit)
    } else {
        query
    };
    if options.offset > 0 {
        query.offset(options.offset)
    } else {
        query
    }
}

fn parse_uuid(raw: &str) -> ResultRegistry<Uuid> {
    Uuid::parse_str(raw).map_err(|_| RegistryError::Malformed(format!("bad uuid {raw:?}")))
}

fn actor_ref(resolved: &HashMap<String, Actor>, name: &str) -> ActorRef {
    match resolved.get(name) {
        Some(actor) => ActorRef::Actor(actor.clone()),
        None => ActorRef::Name(name.to_string()),
    }
}

fn label_ref(resolved: &HashMap<String, Label>, name: &str) -> LabelRef {
    match resolved.get(name) {
        Some(label) => LabelRef::Label(label.clone()),
        None => LabelRef::Name(name.to_string()),
    }
}

impl Registry {
    /// Read actors, sorted by name.
    pub async fn pull_actors(&self, options: &PullOptions) -> ResultRegistry<Vec<Actor>> {
        let query = paginate(
            actors::Entity::find().order_by_asc(actors::Column::Name),
            options,
        );
        let models = query.all(&self.database).await?;

        Ok(models.into_iter().map(Actor::from).collect())
    }

    /// Read labels, sorted by name, with each label's parent resolved one
    /// level deep. The resolved parent keeps its own parent as a name
    /// reference; chains were already flattened at write time.
    pub async fn pull_labels(&self, options: &PullOptions) -> ResultRegistry<Vec<Label>> {
        let query = paginate(
            labels::Entity::find().order_by_asc(labels::Column::Name),
            options,
        );
        let models = query.all(&self.database).await?;

        let parent_names: HashSet<String> = models
            .iter()
            .filter_map(|model| model.parent_name.clone())
            .collect();
        let mut parents: HashMap<String, Label> = HashMap::new();
        if !parent_names.is_empty() {
            for model in labels::Entity::find()
                .filter(labels::Column::Name.is_in(parent_names))
                .all(&self.database)
                .await?
            {
                parents.insert(model.name.clone(), Label::from(model));
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let resolved = model
                    .parent_name
                    .as_ref()
                    .and_then(|name| parents.get(name))
                    .cloned();
                let mut label = Label::from(model);
                if let Some(parent) = resolved {
                    label.parent = Some(LabelParent::Node(Box::new(parent)));
                }
                label
            })
            .collect())
    }

    /// Read transactions, sorted by date, with label, sender, receiver and
    /// the detail lines (each with its own label) resolved in the same
    /// call.
    pub async fn pull_transactions(
        &self,
        options: &PullOptions,
    ) -> ResultRegistry<Vec<Transaction>> {
        let query = paginate(
            transactions::Entity::find().order_by_asc(transactions::Column::Date),
            options,
        );
        let models = query.all(&self.database).await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<String> = models.iter().map(|model| model.uuid.clone()).collect();
        let detail_models = details::Entity::find()
            .filter(details::Column::TransactionUuid.is_in(uuids))
            .order_by_asc(details::Column::Uuid)
            .all(&self.database)
            .await?;

        let mut actor_names: HashSet<String> = HashSet::new();
        let mut label_names: HashSet<String> = HashSet::new();
        for model in &models {
            actor_names.insert(model.sender_name.clone());
            actor_names.insert(model.receiver_name.clone());
            label_names.insert(model.label_name.clone());
        }
        for model in &detail_models {
            label_names.insert(model.label_name.clone());
        }

        let resolved_actors: HashMap<String, Actor> = actors::Entity::find()
            .filter(actors::Column::Name.is_in(actor_names))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.name.clone(), Actor::from(model)))
            .collect();
        let resolved_labels: HashMap<String, Label> = labels::Entity::find()
            .filter(labels::Column::Name.is_in(label_names))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.name.clone(), Label::from(model)))
            .collect();

        let mut details_by_tx: HashMap<String, Vec<Detail>> = HashMap::new();
        for model in detail_models {
            let detail = Detail {
                uuid: Some(parse_uuid(&model.uuid)?),
                label: label_ref(&resolved_labels, &model.label_name),
                amount: model.amount,
                flags: u16::try_from(model.flags).unwrap_or_default(),
                headers: model.headers,
            };
            details_by_tx
                .entry(model.transaction_uuid)
                .or_default()
                .push(detail);
        }

        models
            .into_iter()
            .map(|model| {
                let uuid = parse_uuid(&model.uuid)?;
                let detail_set = details_by_tx.remove(&model.uuid).unwrap_or_default();
                Ok(Transaction {
                    uuid: Some(uuid),
                    date: model.date,
                    amount: model.amount,
                    label: label_ref(&resolved_labels, &model.label_name),
                    sender: actor_ref(&resolved_actors, &model.sender_name),
                    receiver: actor_ref(&resolved_actors, &model.receiver_name),
                    flags: u16::try_from(model.flags).unwrap_or_default(),
                    headers: model.headers,
                    details: detail_set,
                })
            })
            .collect()
    }
}
