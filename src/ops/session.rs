use tracing::warn;

use crate::api::Backend;
use crate::model::User;

/// Look up who is logged in. Any failure means "anonymous": it is logged
/// and never reaches the caller.
pub async fn resolve<B: Backend + ?Sized>(api: &B) -> Option<User> {
    match api.current_user().await {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "user fetch failed");
            None
        }
    }
}
