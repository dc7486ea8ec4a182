use sea_orm::DatabaseConnection;

pub mod user_dao;

pub use user_dao::{UserDao, UserDetails, normalize_email};

/// Shared handle to the per-entity factories, passed in wherever records
/// are created or queried.
#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        UserDao::new(&self.db)
    }
}
