//! Credential Entity
//!
//! A user together with the stored password hash. Only loaded on the login
//! path (`SignInUseCase::authenticate`); never serialized.

use crate::domain::entity::user::User;
use crate::domain::value_object::user_password::UserPassword;

#[derive(Debug, Clone)]
pub struct Credential {
    pub user: User,
    pub password_hash: UserPassword,
}
