use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202507150001_create_organizations::Migration),
            Box::new(migrations::m202507150002_create_users::Migration),
            Box::new(migrations::m202507150003_create_shows::Migration),
            Box::new(migrations::m202507150004_create_attendance::Migration),
        ]
    }
}
