// Copyright (C) 2025 Joseph Sacchini
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const USERNAME_COOKIE: &str = "username";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize session file: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Name/value cookies persisted as a TOML table. A jar without a path lives
/// only in memory.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CookieJar {
    #[serde(default)]
    cookies: BTreeMap<String, String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl CookieJar {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn load(path: &Path) -> Result<Self, SessionError> {
        debug!(path = %path.display(), "loading cookie jar");

        let mut jar = match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let jar: CookieJar = toml::from_str(&contents)?;
                info!(path = %path.display(), cookies = jar.cookies.len(), "loaded cookie jar");
                jar
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "session file not found, starting signed out");
                CookieJar::default()
            }
            Err(e) => return Err(SessionError::Io(e)),
        };
        jar.path = Some(path.to_path_buf());
        Ok(jar)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn set(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    fn remove(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    async fn save(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        debug!(path = %path.display(), cookies = self.cookies.len(), "saved cookie jar");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    /// Not returned by the login endpoint, so usually unknown.
    pub user_id: Option<u64>,
    pub username: String,
}

#[derive(Debug)]
struct SessionState {
    admin: Option<Admin>,
    access_token: String,
    jar: CookieJar,
}

/// The signed-in admin and bearer token, kept in sync with the cookie jar.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn load(jar: CookieJar) -> Self {
        let access_token = jar.get(ACCESS_TOKEN_COOKIE).unwrap_or_default().to_string();
        debug!(has_token = !access_token.is_empty(), "session initialised");
        Self {
            state: RwLock::new(SessionState {
                admin: None,
                access_token,
                jar,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::load(CookieJar::in_memory())
    }

    /// The bearer token, or `None` when signed out.
    pub async fn access_token(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.access_token.is_empty()).then(|| state.access_token.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        !self.state.read().await.access_token.is_empty()
    }

    pub async fn admin(&self) -> Option<Admin> {
        self.state.read().await.admin.clone()
    }

    /// Username remembered from the last sign-in, if any.
    pub async fn remembered_username(&self) -> Option<String> {
        self.state.read().await.jar.get(USERNAME_COOKIE).map(str::to_string)
    }

    pub async fn set_admin(&self, admin: Admin) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        state.jar.set(USERNAME_COOKIE, &admin.username);
        debug!(username = %admin.username, "admin recorded");
        state.admin = Some(admin);
        state.jar.save().await
    }

    pub async fn set_access_token(&self, token: &str) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        state.jar.set(ACCESS_TOKEN_COOKIE, token);
        state.access_token = token.to_string();
        debug!("access token stored");
        state.jar.save().await
    }

    pub async fn reset_access_token(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        state.jar.remove(ACCESS_TOKEN_COOKIE);
        state.access_token.clear();
        debug!("access token cleared");
        state.jar.save().await
    }

    /// Sign out completely: token, remembered username and admin.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        state.jar.remove(ACCESS_TOKEN_COOKIE);
        state.jar.remove(USERNAME_COOKIE);
        state.access_token.clear();
        state.admin = None;
        info!("session reset");
        state.jar.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin {
            user_id: None,
            username: "admin".into(),
        }
    }

    #[tokio::test]
    async fn missing_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let jar = CookieJar::load(&dir.path().join("session.toml")).await.unwrap();
        let session = SessionStore::load(jar);
        assert_eq!(session.access_token().await, None);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn token_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.toml");

        let session = SessionStore::load(CookieJar::load(&path).await.unwrap());
        session.set_access_token("tok-1").await.unwrap();
        session.set_admin(admin()).await.unwrap();

        let reloaded = SessionStore::load(CookieJar::load(&path).await.unwrap());
        assert_eq!(reloaded.access_token().await.as_deref(), Some("tok-1"));
        assert_eq!(reloaded.remembered_username().await.as_deref(), Some("admin"));
        // The admin record itself is not restored from cookies.
        assert_eq!(reloaded.admin().await, None);
    }

    #[tokio::test]
    async fn reset_access_token_keeps_username() {
        let session = SessionStore::in_memory();
        session.set_access_token("tok").await.unwrap();
        session.set_admin(admin()).await.unwrap();

        session.reset_access_token().await.unwrap();

        assert_eq!(session.access_token().await, None);
        assert_eq!(session.admin().await, Some(admin()));
        assert_eq!(session.remembered_username().await.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let session = SessionStore::load(CookieJar::load(&path).await.unwrap());
        session.set_access_token("tok").await.unwrap();
        session.set_admin(admin()).await.unwrap();

        session.reset().await.unwrap();

        assert_eq!(session.access_token().await, None);
        assert_eq!(session.admin().await, None);
        let jar = CookieJar::load(&path).await.unwrap();
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE), None);
        assert_eq!(jar.get(USERNAME_COOKIE), None);
    }

    #[test]
    fn parses_cookie_table() {
        let jar: CookieJar = toml::from_str("[cookies]\naccess_token = \"abc\"\n").unwrap();
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE), Some("abc"));
        assert_eq!(jar.get(USERNAME_COOKIE), None);
    }
}
