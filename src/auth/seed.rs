// Bootstrap administrator provisioning

use tracing::info;

use crate::auth::{error::AuthError, models::Role, service::AuthService};
use crate::config::AdminSeed;

/// Make sure the configured administrator exists.
///
/// An existing account with the same email is left untouched, so restarts
/// never reset a changed password or a deactivation.
pub async fn ensure_admin(service: &AuthService, seed: &AdminSeed) -> Result<(), AuthError> {
    match service.provision(&seed.email, &seed.password, Role::Admin).await? {
        Some(user) => info!(user_id = %user.id, "Seeded administrator account"),
        None => info!("Administrator account already present; seeding skipped"),
    }
    Ok(())
}
