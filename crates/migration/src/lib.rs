pub use sea_orm_migration::prelude::*;

mod m20260801_000001_actors;
mod m20260801_000002_labels;
mod m20260801_000003_transactions;
mod m20260801_000004_details;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        // Table dependency order; rollback runs in reverse.
        vec![
            Box::new(m20260801_000001_actors::Migration),
            Box::new(m20260801_000002_labels::Migration),
            Box::new(m20260801_000003_transactions::Migration),
            Box::new(m20260801_000004_details::Migration),
        ]
    }
}
