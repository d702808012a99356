//! Secret naming.

use uuid::Uuid;

/// Build the vault name for a brain secret owned by a user.
///
/// The name is unique per (user, brain, secret) and is the only key the
/// backend needs to find the stored value.
pub fn build_secret_unique_name(user_id: &Uuid, brain_id: &Uuid, secret_name: &str) -> String {
    format!("{}-{}-{}", user_id, brain_id, secret_name)
}
