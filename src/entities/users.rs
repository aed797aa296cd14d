use sea_orm::entity::prelude::*;

/// Row shape of the `users` table.
///
/// The table itself is created by the migration, which picks the `id` column
/// type for the connected backend.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,

    /// 64 random bytes, regenerated on every password change
    pub salt: Vec<u8>,

    /// SHA-512 of the password followed by the salt
    pub password_hash: Vec<u8>,

    pub email: Option<String>,

    pub admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
