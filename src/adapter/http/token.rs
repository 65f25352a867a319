use tokio::sync::RwLock;

/// Holds the bearer token for one signed-in user.
///
/// Owned by whoever built the API client; there is no ambient token storage.
#[derive(Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        if self.token.write().await.take().is_some() {
            tracing::info!("Session token cleared");
        }
    }
}
