//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_profile_table;
mod m20250101_000002_create_moderation_tables;
mod m20250101_000003_create_community_tables;
mod m20250101_000004_create_gym_tables;
mod m20250101_000005_create_content_report_table;
mod m20250101_000006_create_feedback_table;
mod m20250101_000007_create_conversation_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_profile_table::Migration),
            Box::new(m20250101_000002_create_moderation_tables::Migration),
            Box::new(m20250101_000003_create_community_tables::Migration),
            Box::new(m20250101_000004_create_gym_tables::Migration),
            Box::new(m20250101_000005_create_content_report_table::Migration),
            Box::new(m20250101_000006_create_feedback_table::Migration),
            Box::new(m20250101_000007_create_conversation_tables::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 7);
    }
}
