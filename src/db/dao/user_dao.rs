use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, sea_query::Expr,
};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::db::entities::{prelude::User, user};
use crate::error::{AppError, AppResult};

const MAX_PAGE_SIZE: u64 = 100;

/// Profile and hospital-admission attributes supplied at account
/// creation. Everything here is optional; the typed counterpart of a
/// free-form extra-fields map.
#[derive(Debug, Default, Clone)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub hadm_id: Option<String>,
    pub admittime: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub dischtime: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub deathtime: Option<chrono::DateTime<chrono::FixedOffset>>,
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

/// The account factory. All user records are created through here, never
/// by building an `ActiveModel` by hand and saving it.
#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl UserDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    /// Create an ordinary account. Without a password the account is
    /// created but cannot authenticate until one is set.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        details: UserDetails,
    ) -> AppResult<user::Model> {
        self.create_account(email, password, false, false, details)
            .await
    }

    /// Create a privileged account: staff and superuser flags forced on,
    /// and a usable password is mandatory.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        details: UserDetails,
    ) -> AppResult<user::Model> {
        if password.is_empty() {
            return Err(AppError::PasswordRequired);
        }
        self.create_account(email, Some(password), true, true, details)
            .await
    }

    async fn create_account(
        &self,
        email: &str,
        password: Option<&str>,
        is_staff: bool,
        is_superuser: bool,
        details: UserDetails,
    ) -> AppResult<user::Model> {
        let email = normalize_email(email)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let active = new_account(&email, password, is_staff, is_superuser, details)?;
        match active.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(user = %model.id, "created account");
                Ok(model)
            }
            // Loser of a concurrent duplicate create hits the unique index.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Case-insensitive lookup: the argument is normalized the same way
    /// addresses are normalized at write time. An address that cannot be
    /// normalized can never have been stored, so it matches nothing.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, id: &Uuid) -> AppResult<user::Model> {
        User::find_by_id(*id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound { id: *id })
    }

    /// Page through accounts in the default listing order, newest
    /// `date_joined` first.
    pub async fn list(&self, page: u64, page_size: u64) -> AppResult<Vec<user::Model>> {
        if page == 0 || page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidPagination { page, page_size });
        }
        User::find()
            .order_by_desc(user::Column::DateJoined)
            .paginate(&self.db, page_size)
            .fetch_page(page - 1)
            .await
            .map_err(AppError::from)
    }

    /// Rehash and store a new password, making a password-less account
    /// able to authenticate.
    pub async fn set_password(&self, id: &Uuid, password: &str) -> AppResult<()> {
        let hash = hash_password(password)?;
        let result = User::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(Some(hash)))
            .filter(user::Column::Id.eq(*id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound { id: *id });
        }
        Ok(())
    }

    /// Soft delete: accounts are deactivated, never removed.
    pub async fn deactivate(&self, id: &Uuid) -> AppResult<()> {
        let result = User::update_many()
            .col_expr(user::Column::IsActive, Expr::value(false))
            .filter(user::Column::Id.eq(*id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound { id: *id });
        }
        tracing::info!(user = %id, "deactivated account");
        Ok(())
    }
}

/// Reduce an address to its canonical comparison form: trimmed,
/// validated, full lowercase.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::InvalidEmail {
            reason: "address is empty",
        });
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return Err(AppError::InvalidEmail {
            reason: "missing '@'",
        });
    };
    if local.is_empty() || domain.is_empty() {
        return Err(AppError::InvalidEmail {
            reason: "empty local or domain part",
        });
    }
    if email.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidEmail {
            reason: "contains whitespace",
        });
    }
    Ok(email.to_lowercase())
}

// `email` must already be normalized.
fn new_account(
    email: &str,
    password: Option<&str>,
    is_staff: bool,
    is_superuser: bool,
    details: UserDetails,
) -> AppResult<user::ActiveModel> {
    let password_hash = match password {
        Some(raw) => Some(hash_password(raw)?),
        None => None,
    };

    Ok(user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        first_name: Set(details.first_name),
        last_name: Set(details.last_name),
        is_staff: Set(is_staff),
        is_active: Set(true),
        is_superuser: Set(is_superuser),
        date_joined: Set(Utc::now().fixed_offset()),
        hadm_id: Set(details.hadm_id),
        admittime: Set(details.admittime),
        dischtime: Set(details.dischtime),
        deathtime: Set(details.deathtime),
        admission_type: Set(details.admission_type),
        admission_location: Set(details.admission_location),
        discharge_location: Set(details.discharge_location),
        insurance: Set(details.insurance),
        language: Set(details.language),
        religion: Set(details.religion),
        marital_status: Set(details.marital_status),
        ethnicity: Set(details.ethnicity),
        diagnosis: Set(details.diagnosis),
        state: Set(details.state),
        district: Set(details.district),
        statement: Set(details.statement),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[test]
    fn normalize_lowercases_the_whole_address() {
        assert_eq!(normalize_email("Jane@Example.ORG").unwrap(), "jane@example.org");
        assert_eq!(
            normalize_email("a@x.com").unwrap(),
            normalize_email("A@X.com").unwrap()
        );
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize_email("  jane@example.org ").unwrap(), "jane@example.org");
    }

    #[test]
    fn empty_or_malformed_addresses_are_rejected() {
        for bad in ["", "   ", "janeexample.org", "@example.org", "jane@", "ja ne@example.org"] {
            assert!(
                matches!(normalize_email(bad), Err(AppError::InvalidEmail { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn ordinary_accounts_carry_no_privilege_flags() {
        let active = new_account("jane@example.org", None, false, false, UserDetails::default())
            .unwrap();

        assert!(!active.is_staff.clone().unwrap());
        assert!(!active.is_superuser.clone().unwrap());
        assert!(active.is_active.clone().unwrap());
    }

    #[test]
    fn privileged_accounts_carry_both_flags() {
        let active = new_account(
            "root@example.org",
            Some("secret"),
            true,
            true,
            UserDetails::default(),
        )
        .unwrap();

        assert!(active.is_staff.clone().unwrap());
        assert!(active.is_superuser.clone().unwrap());
        assert!(active.is_active.clone().unwrap());
    }

    #[test]
    fn password_is_stored_hashed_and_salted() {
        let active = new_account(
            "jane@example.org",
            Some("secret"),
            false,
            false,
            UserDetails::default(),
        )
        .unwrap();

        let hash = active.password_hash.clone().unwrap().unwrap();
        assert_ne!(hash, "secret");
        assert!(verify_password("secret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn missing_password_leaves_the_account_unusable() {
        let active = new_account("jane@example.org", None, false, false, UserDetails::default())
            .unwrap();
        assert!(active.password_hash.clone().unwrap().is_none());
    }

    #[test]
    fn detail_fields_are_merged_into_the_record() {
        let details = UserDetails {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            hadm_id: Some("145834".into()),
            admission_type: Some("EMERGENCY".into()),
            insurance: Some("Medicare".into()),
            diagnosis: Some("SEPSIS".into()),
            ..Default::default()
        };
        let active =
            new_account("jane@example.org", None, false, false, details).unwrap();

        assert_eq!(active.first_name.clone().unwrap(), "Jane");
        assert_eq!(active.last_name.clone().unwrap(), "Doe");
        assert_eq!(active.hadm_id.clone().unwrap().as_deref(), Some("145834"));
        assert_eq!(
            active.admission_type.clone().unwrap().as_deref(),
            Some("EMERGENCY")
        );
        assert_eq!(active.insurance.clone().unwrap().as_deref(), Some("Medicare"));
        assert_eq!(active.diagnosis.clone().unwrap().as_deref(), Some("SEPSIS"));
        assert_eq!(active.statement.clone().unwrap(), None);
    }
}
