#[allow(unused_imports)]
pub mod prelude {
    pub use super::user::Entity as User;
}

pub mod user {
    use sea_orm::entity::prelude::*;
    use serde::Serialize;

    use crate::auth::password;

    #[sea_orm::model]
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        /// Stored in canonical lowercase form, so the plain unique index
        /// enforces case-insensitive uniqueness.
        #[sea_orm(unique, indexed)]
        pub email: String,
        /// Argon2 PHC string. `None` means the account has no usable
        /// password and cannot authenticate until one is set.
        #[serde(skip_serializing)]
        pub password_hash: Option<String>,
        pub first_name: String,
        pub last_name: String,
        #[sea_orm(default_value = false)]
        pub is_staff: bool,
        #[sea_orm(default_value = true)]
        pub is_active: bool,
        #[sea_orm(default_value = false)]
        pub is_superuser: bool,
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub date_joined: DateTimeWithTimeZone,
        pub hadm_id: Option<String>,
        pub admittime: Option<DateTimeWithTimeZone>,
        pub dischtime: Option<DateTimeWithTimeZone>,
        pub deathtime: Option<DateTimeWithTimeZone>,
        pub admission_type: Option<String>,
        pub admission_location: Option<String>,
        pub discharge_location: Option<String>,
        pub insurance: Option<String>,
        pub language: Option<String>,
        pub religion: Option<String>,
        pub marital_status: Option<String>,
        pub ethnicity: Option<String>,
        pub diagnosis: Option<String>,
        pub state: Option<String>,
        pub district: Option<String>,
        pub statement: Option<String>,
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// First and last name joined by a single space, trimmed.
        pub fn full_name(&self) -> String {
            format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string()
        }

        pub fn short_name(&self) -> String {
            self.first_name.trim().to_string()
        }

        pub fn has_usable_password(&self) -> bool {
            self.password_hash.is_some()
        }

        /// Verify a plaintext password against the stored hash. Always
        /// false when no usable password is set.
        pub fn check_password(&self, raw: &str) -> bool {
            match &self.password_hash {
                Some(hash) => password::verify_password(raw, hash),
                None => false,
            }
        }
    }

    impl std::fmt::Display for Model {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.id)
        }
    }
}
