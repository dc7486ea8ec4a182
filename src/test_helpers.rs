use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use uuid::Uuid;

use crate::db::entities::user;

/// A mock Postgres connection with no canned results; any statement
/// issued against it fails the test.
pub fn mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Fixture row for entity-level tests. Email is assumed to already be in
/// canonical form; no usable password.
pub fn sample_user(email: &str, first_name: &str, last_name: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: None,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        is_staff: false,
        is_active: true,
        is_superuser: false,
        date_joined: Utc::now().fixed_offset(),
        hadm_id: None,
        admittime: None,
        dischtime: None,
        deathtime: None,
        admission_type: None,
        admission_location: None,
        discharge_location: None,
        insurance: None,
        language: None,
        religion: None,
        marital_status: None,
        ethnicity: None,
        diagnosis: None,
        state: None,
        district: None,
        statement: None,
    }
}
