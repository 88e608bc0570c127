use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserPatch};
use crate::user_actor::UserError;

/// Client for the user directory.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_client_new!(UserClient, User);

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<String, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    /// Where notifications for `id` go. `None` when the user does not exist.
    #[instrument(skip(self))]
    pub async fn email(&self, id: String) -> Result<Option<String>, UserError> {
        debug!("Sending request");
        Ok(self.inner.get(id).await?.map(|user| user.email))
    }
}
