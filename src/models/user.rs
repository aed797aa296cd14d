use rand::{CryptoRng, RngCore};
use uuid::Uuid;

use crate::entities::users;
use crate::models::password::{Credential, InvalidCredential};

/// A user account.
///
/// The password is never held in plaintext: [`User::set_password`] replaces
/// the salt and hash together and [`User::verify_password`] checks a
/// candidate against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    pub username: String,
    credential: Option<Credential>,
    pub email: Option<String>,
    pub admin: bool,
}

impl User {
    /// Creates a user with a freshly generated id and no password.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), username)
    }

    pub fn with_id(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            credential: None,
            email: None,
            admin: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Sets a new password using the thread-local CSPRNG for the salt.
    pub fn set_password(&mut self, password: &str) {
        self.set_password_with(password, &mut rand::rng());
    }

    pub fn set_password_with<R: CryptoRng + RngCore + ?Sized>(
        &mut self,
        password: &str,
        rng: &mut R,
    ) {
        self.credential = Some(Credential::generate(password, rng));
    }

    /// Returns false when no password has been set.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|credential| credential.matches(candidate))
    }

    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.credential.is_some()
    }

    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub fn salt(&self) -> Option<&[u8]> {
        self.credential.as_ref().map(Credential::salt)
    }

    #[must_use]
    pub fn password_hash(&self) -> Option<&[u8]> {
        self.credential.as_ref().map(Credential::digest)
    }
}

impl TryFrom<users::Model> for User {
    type Error = InvalidCredential;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let credential = Credential::from_parts(&model.salt, &model.password_hash)?;

        Ok(Self {
            id: model.id,
            username: model.username,
            credential: Some(credential),
            email: model.email,
            admin: model.admin,
        })
    }
}
