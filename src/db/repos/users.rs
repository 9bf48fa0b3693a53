use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateUserProfile, Role, UserProfile},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a profile. Fails with `Conflict` if the id, email or allow-list
    /// entry is already linked to another profile.
    async fn create(&self, input: CreateUserProfile) -> DbResult<UserProfile>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<UserProfile>>;
    async fn get_by_email(&self, email: &str) -> DbResult<Option<UserProfile>>;
    async fn get_by_allowed_lp(&self, allowed_lp_id: Uuid) -> DbResult<Option<UserProfile>>;
    /// Stamp `last_login_at` and return the profile's role, or `None` if no
    /// profile exists for `id`.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> DbResult<Option<Role>>;
    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<()>;
}
