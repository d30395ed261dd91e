//! Persistence registry for a personal-finance ledger.
//!
//! The registry stores four record kinds:
//!
//! ```text
//!     (Participants)
//!         Actor        Label (user-defined classification forest)
//!           |            |
//!           \           /|
//!            Transaction |
//!                 \_    /
//!                    Details (breakdown of the transaction amount)
//! ```
//!
//! A [`Transaction`] is an exchange between two [`Actor`]s for a signed
//! amount in minor units, classified by a [`Label`] and optionally broken
//! down into [`Detail`] lines.
//!
//! Writes go through [`Registry::push_actors`], [`Registry::push_labels`]
//! and [`Registry::push_transactions`]: conflict-aware batched upserts that
//! flatten embedded label trees, write referenced actors and labels before
//! the transactions that depend on them, and enforce the detail-sum
//! invariant before anything hits storage. Reads go through the matching
//! `pull_*` methods: ordered, paginated, with relationships resolved.
//!
//! Schema management lives in the companion `migration` crate; bring a
//! database up with `migration::Migrator::up` before handing the
//! connection to [`RegistryBuilder::database`].
//!
//! The registry never logs: every failure surfaces to the caller as a
//! [`RegistryError`].

pub use actors::{Actor, ActorRef};
pub use details::Detail;
pub use error::RegistryError;
pub use labels::{Label, LabelParent, LabelRef};
pub use ops::{PullOptions, PushOptions, Registry, RegistryBuilder, WriteMode};
pub use transactions::Transaction;

mod actors;
mod details;
mod error;
mod labels;
mod ops;
mod resolve;
mod transactions;

type ResultRegistry<T> = Result<T, RegistryError>;
