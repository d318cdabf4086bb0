use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Settings, SettingsUpdate};
use crate::validation::FieldErrors;
use crate::view::RequestState;

use super::Mounted;

pub struct SettingsScreen {
    client: ApiClient,
    pub username: String,
    pub settings: RequestState<Settings>,
}

impl SettingsScreen {
    pub async fn mount(client: ApiClient, username: Option<&str>) -> ClientResult<Mounted<Self>> {
        let auth = match super::enter(client.session())? {
            Ok(auth) => auth,
            Err(route) => return Ok(Mounted::Redirect(route)),
        };
        let Some(username) = super::target_username(username, &auth) else {
            let mut errors = FieldErrors::default();
            errors.insert("username", "Failed to identify user. Please login again.");
            return Err(ClientError::Validation(errors));
        };

        let mut screen = Self {
            client,
            username,
            settings: RequestState::Idle,
        };
        screen.load().await;
        Ok(Mounted::Ready(screen))
    }

    pub async fn load(&mut self) {
        self.settings.begin();
        let result = self.client.settings(&self.username).await;
        self.settings.finish(result);
    }

    /// Save, then reload so the screen shows what the server stored.
    pub async fn save(&mut self, update: &SettingsUpdate) -> ClientResult<()> {
        self.client.update_settings(update).await?;
        tracing::info!(username = %self.username, "Settings updated");
        self.load().await;
        Ok(())
    }
}
