use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic, QueryFilter,
    QueryOrder, QueryResult, QueryTrait, Select, Value,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::error::StoreError;
use crate::db::portable_id::IdBackend;
use crate::entities::prelude::Users;
use crate::entities::users::{self, Column};
use crate::models::password::Credential;
use crate::models::user::User;

/// CRUD for the `users` table.
///
/// Identifiers go through the [`IdBackend`] chosen for the connection; every
/// statement is built here so the `id` column is bound and read in the layout
/// the schema was created with.
pub struct UserRepository {
    conn: DatabaseConnection,
    ids: IdBackend,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, ids: IdBackend) -> Self {
        Self { conn, ids }
    }

    /// Insert a new user. The user must already have a password.
    pub async fn create(&self, user: &User) -> Result<(), StoreError> {
        let credential = required_credential(user)?;

        let insert = Query::insert()
            .into_table(Users)
            .columns([
                Column::Id,
                Column::Username,
                Column::Salt,
                Column::PasswordHash,
                Column::Email,
                Column::Admin,
            ])
            .values_panic([
                self.id_value(user.id()).into(),
                user.username.clone().into(),
                credential.salt().to_vec().into(),
                credential.digest().to_vec().into(),
                user.email.clone().into(),
                user.admin.into(),
            ])
            .to_owned();

        let backend = self.conn.get_database_backend();
        self.conn
            .execute(backend.build(&insert))
            .await
            .map_err(|e| StoreError::from_write(e, &user.username))?;

        info!(user_id = %user.id(), username = %user.username, "Created user");
        Ok(())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.find_one(Users::find().filter(Column::Id.eq(self.id_value(id))))
            .await
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one(Users::find().filter(Column::Username.eq(username)))
            .await
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let backend = self.conn.get_database_backend();
        let rows = self
            .conn
            .query_all(Users::find().order_by_asc(Column::Username).build(backend))
            .await?;

        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    /// Write every mutable field of `user` back to its row.
    pub async fn save(&self, user: &User) -> Result<(), StoreError> {
        let credential = required_credential(user)?;

        let update = Query::update()
            .table(Users)
            .value(Column::Username, user.username.clone())
            .value(Column::Salt, credential.salt().to_vec())
            .value(Column::PasswordHash, credential.digest().to_vec())
            .value(Column::Email, user.email.clone())
            .value(Column::Admin, user.admin)
            .and_where(Column::Id.eq(self.id_value(user.id())))
            .to_owned();

        let backend = self.conn.get_database_backend();
        let result = self
            .conn
            .execute(backend.build(&update))
            .await
            .map_err(|e| StoreError::from_write(e, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(user.id().to_string()));
        }

        debug!(user_id = %user.id(), "Saved user");
        Ok(())
    }

    /// Update password for a user (draws a new salt and rehashes)
    pub async fn update_password(&self, username: &str, new_password: &str) -> Result<(), StoreError> {
        let mut user = self
            .get_by_username(username)
            .await?
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;

        user.set_password(new_password);
        let credential = required_credential(&user)?;

        // salt and hash in one statement so they never diverge
        let update = Query::update()
            .table(Users)
            .value(Column::Salt, credential.salt().to_vec())
            .value(Column::PasswordHash, credential.digest().to_vec())
            .and_where(Column::Id.eq(self.id_value(user.id())))
            .to_owned();

        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&update)).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(username.to_string()));
        }

        info!(user_id = %user.id(), "Password updated");
        Ok(())
    }

    /// Verify password for a user. Unknown users simply don't match.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let Some(user) = self.get_by_username(username).await? else {
            debug!(username, "Password check for unknown user");
            return Ok(false);
        };

        let is_valid = user.verify_password(password);
        if !is_valid {
            debug!(user_id = %user.id(), "Password mismatch");
        }

        Ok(is_valid)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let delete = Query::delete()
            .from_table(Users)
            .and_where(Column::Id.eq(self.id_value(id)))
            .to_owned();

        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&delete)).await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id = %id, "Deleted user");
        }
        Ok(deleted)
    }

    fn id_value(&self, id: Uuid) -> Value {
        self.ids.encode_uuid(id).into()
    }

    async fn find_one(&self, select: Select<Users>) -> Result<Option<User>, StoreError> {
        let backend = self.conn.get_database_backend();
        let row = self.conn.query_one(select.build(backend)).await?;

        row.map(|row| self.decode_row(&row)).transpose()
    }

    fn decode_row(&self, row: &QueryResult) -> Result<User, StoreError> {
        let id = self
            .ids
            .read(row, Column::Id.as_str())?
            .ok_or(StoreError::MissingField("id"))?;

        let model = users::Model {
            id,
            username: row.try_get("", Column::Username.as_str())?,
            salt: row.try_get("", Column::Salt.as_str())?,
            password_hash: row.try_get("", Column::PasswordHash.as_str())?,
            email: row.try_get("", Column::Email.as_str())?,
            admin: row.try_get("", Column::Admin.as_str())?,
        };

        Ok(User::try_from(model)?)
    }
}

fn required_credential(user: &User) -> Result<&Credential, StoreError> {
    user.credential()
        .ok_or(StoreError::MissingField("password_hash"))
}
