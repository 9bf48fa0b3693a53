use uuid::Uuid;

use crate::{db::DbPool, models::UserProfile, observability::metrics};

/// Fetch the profile for `subject_id`.
///
/// Absence is an expected outcome for identities that have not finished
/// setup. Lookup failures are logged and also treated as absent, which keeps
/// the caller out of gated content.
pub async fn lookup_profile(db: &DbPool, subject_id: Uuid) -> Option<UserProfile> {
    match db.users().get_by_id(subject_id).await {
        Ok(Some(profile)) => {
            metrics::record_profile_lookup("found");
            Some(profile)
        }
        Ok(None) => {
            metrics::record_profile_lookup("absent");
            None
        }
        Err(e) => {
            metrics::record_profile_lookup("error");
            tracing::error!(subject_id = %subject_id, error = %e, "Profile lookup failed");
            None
        }
    }
}
