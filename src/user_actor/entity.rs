use super::error::UserError;
use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserPatch};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Errors
    /// An email address is required: it is where invoices and refund notices go.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, UserError> {
        if params.email.trim().is_empty() {
            return Err(UserError::ValidationError("Email required".to_string()));
        }
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
        })
    }

    /// Updates the user's profile information.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(email) = patch.email {
            if email.trim().is_empty() {
                return Err(UserError::ValidationError("Email required".to_string()));
            }
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        Ok(())
    }

    /// No custom actions are defined for users.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
