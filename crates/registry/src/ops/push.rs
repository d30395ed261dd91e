//! The upsert executor.
//!
//! Pushes are chunked multi-row inserts with an `ON CONFLICT` clause:
//! `DO NOTHING` in append-only mode, or an update of the declared mutable
//! columns in replace mode. Every push call runs inside one database
//! transaction; a failure anywhere rolls the whole call back and surfaces
//! the storage error unchanged.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, TransactionTrait};

use super::with_tx;
use crate::{
    Actor, Label, PushOptions, Registry, ResultRegistry, RegistryError, Transaction, WriteMode,
    actors, details, labels, resolve, transactions,
};

impl Registry {
    /// Write actors, updating every non-key field when a name conflict
    /// occurs (or skipping the row entirely in append-only mode).
    pub async fn push_actors(&self, batch: &[Actor], options: &PushOptions) -> ResultRegistry<()> {
        check_batch_size(options)?;
        for actor in batch {
            actor.ensure_valid()?;
        }

        with_tx!(self, |tx| upsert_actors(&tx, batch, options).await)
    }

    /// Write labels. The batch is flattened first: every in-memory parent
    /// chain is expanded into the batch with parent links rewritten as name
    /// references, deduplicated by name.
    pub async fn push_labels(&self, batch: &[Label], options: &PushOptions) -> ResultRegistry<()> {
        check_batch_size(options)?;
        let flattened = resolve::flatten_labels(batch);
        for label in &flattened {
            label.ensure_valid()?;
        }

        with_tx!(self, |tx| upsert_labels(&tx, &flattened, options).await)
    }

    /// Write transactions and their detail lines. Referenced actors and
    /// labels (embedded records or bare names, detail labels and label
    /// ancestors included) are written first in append-only mode, so
    /// foreign keys always resolve without clobbering independently-managed
    /// metadata on existing rows.
    ///
    /// Generated UUIDs are assigned back into `batch`, so the caller can
    /// serialize the pushed records afterwards.
    pub async fn push_transactions(
        &self,
        batch: &mut [Transaction],
        options: &PushOptions,
    ) -> ResultRegistry<()> {
        check_batch_size(options)?;
        for tx in batch.iter_mut() {
            tx.ensure_valid()?;
        }

        let refs = resolve::extract_references(batch);
        for actor in &refs.actors {
            actor.ensure_valid()?;
        }
        for label in &refs.labels {
            label.ensure_valid()?;
        }

        let dependency_options = PushOptions {
            mode: WriteMode::AppendOnly,
            ..*options
        };

        with_tx!(self, |tx| {
            upsert_actors(&tx, &refs.actors, &dependency_options).await?;
            upsert_labels(&tx, &refs.labels, &dependency_options).await?;
            upsert_transactions(&tx, batch, options).await
        })
    }
}

fn check_batch_size(options: &PushOptions) -> ResultRegistry<()> {
    if options.batch_size == 0 {
        return Err(RegistryError::InvalidBatchSize);
    }
    Ok(())
}

async fn upsert_actors<C: ConnectionTrait>(
    db: &C,
    batch: &[Actor],
    options: &PushOptions,
) -> ResultRegistry<()> {
    let conflict = match options.mode {
        WriteMode::AppendOnly => OnConflict::column(actors::Column::Name)
            .do_nothing()
            .to_owned(),
        WriteMode::Replace => OnConflict::column(actors::Column::Name)
            .update_columns([
                actors::Column::Flags,
                actors::Column::Headers,
                actors::Column::UpdatedAt,
            ])
            .to_owned(),
    };

    for chunk in batch.chunks(options.batch_size) {
        let rows: Vec<actors::ActiveModel> = chunk.iter().map(actors::ActiveModel::from).collect();
        actors::Entity::insert_many(rows)
            .on_conflict(conflict.clone())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

async fn upsert_labels<C: ConnectionTrait>(
    db: &C,
    batch: &[Label],
    options: &PushOptions,
) -> ResultRegistry<()> {
    let conflict = match options.mode {
        WriteMode::AppendOnly => OnConflict::column(labels::Column::Name)
            .do_nothing()
            .to_owned(),
        WriteMode::Replace => OnConflict::column(labels::Column::Name)
            .update_columns([
                labels::Column::ParentName,
                labels::Column::Flags,
                labels::Column::Headers,
                labels::Column::UpdatedAt,
            ])
            .to_owned(),
    };

    for chunk in batch.chunks(options.batch_size) {
        let rows: Vec<labels::ActiveModel> = chunk.iter().map(labels::ActiveModel::from).collect();
        labels::Entity::insert_many(rows)
            .on_conflict(conflict.clone())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

async fn upsert_transactions<C: ConnectionTrait>(
    db: &C,
    batch: &[Transaction],
    options: &PushOptions,
) -> ResultRegistry<()> {
    // Date and amount are deliberately absent from the update set: they are
    // fixed at creation.
    let conflict = match options.mode {
        WriteMode::AppendOnly => OnConflict::column(transactions::Column::Uuid)
            .do_nothing()
            .to_owned(),
        WriteMode::Replace => OnConflict::column(transactions::Column::Uuid)
            .update_columns([
                transactions::Column::LabelName,
                transactions::Column::SenderName,
                transactions::Column::ReceiverName,
                transactions::Column::Flags,
                transactions::Column::Headers,
                transactions::Column::UpdatedAt,
            ])
            .to_owned(),
    };

    for chunk in batch.chunks(options.batch_size) {
        let rows: Vec<transactions::ActiveModel> =
            chunk.iter().map(Transaction::as_row).collect();
        transactions::Entity::insert_many(rows)
            .on_conflict(conflict.clone())
            .exec_without_returning(db)
            .await?;
    }

    // Details have no update column set at all: they are insert-or-skip,
    // replaced only by pushing a fresh detail set.
    let detail_conflict = OnConflict::column(details::Column::Uuid)
        .do_nothing()
        .to_owned();
    let detail_rows: Vec<details::ActiveModel> = batch
        .iter()
        .flat_map(|tx| {
            let transaction_uuid = tx.uuid.unwrap_or_default();
            tx.details
                .iter()
                .map(move |detail| detail.as_row(transaction_uuid))
        })
        .collect();

    for chunk in detail_rows.chunks(options.batch_size) {
        details::Entity::insert_many(chunk.to_vec())
            .on_conflict(detail_conflict.clone())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}
