//! Login by name, with the user remembered on this device.

use tracing::{info, warn};

use crate::error::{LiftLogError, Result};
use crate::prefs::PreferenceStore;
use crate::service::{DataService, User};

/// Create-or-get the user called `name` and remember it.
pub async fn login(service: &dyn DataService, prefs: &PreferenceStore, name: &str) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LiftLogError::Validation("Enter your name".to_string()));
    }

    let user = service.login(name).await?;
    info!("Logged in as {} ({})", user.name, user.id);
    if let Err(e) = prefs.set_session_user(&user) {
        // Still logged in for this run; only the next start forgets it.
        warn!("Failed to remember user: {}", e);
    }
    Ok(user)
}

pub fn logout(prefs: &PreferenceStore) -> Result<()> {
    prefs.clear_session_user()?;
    info!("Logged out");
    Ok(())
}

/// The user remembered by a previous login, confirmed with the service.
///
/// A user the service no longer knows is forgotten. When the service
/// cannot be asked, the remembered user is kept.
pub async fn restore(service: &dyn DataService, prefs: &PreferenceStore) -> Option<User> {
    let saved = prefs.session_user()?;
    match service.get_user(&saved.id).await {
        Ok(user) => {
            if user != saved {
                if let Err(e) = prefs.set_session_user(&user) {
                    warn!("Failed to update remembered user: {}", e);
                }
            }
            info!("Restored session for {}", user.name);
            Some(user)
        }
        Err(LiftLogError::Server { status: 404, .. }) => {
            warn!("Remembered user {} no longer exists", saved.id);
            if let Err(e) = prefs.clear_session_user() {
                warn!("Failed to forget user: {}", e);
            }
            None
        }
        Err(e) => {
            warn!("Could not confirm remembered user {}: {}", saved.id, e);
            Some(saved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::InMemoryDataService;
    use tempfile::TempDir;

    fn create_test_store() -> (PreferenceStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(&dir.path().join("preferences.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn test_login_remembers_user() {
        let (prefs, _dir) = create_test_store();
        let service = InMemoryDataService::new();

        let user = login(&service, &prefs, "  Alex ").await.unwrap();
        assert_eq!(user.name, "Alex");

        let reopened = PreferenceStore::open(prefs.path());
        assert_eq!(restore(&service, &reopened).await, Some(user));
    }

    #[tokio::test]
    async fn test_blank_name_never_reaches_service() {
        let (prefs, _dir) = create_test_store();
        let service = InMemoryDataService::new();
        service.set_offline(true);

        let err = login(&service, &prefs, "   ").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_logout_forgets_user() {
        let (prefs, _dir) = create_test_store();
        let service = InMemoryDataService::new();
        login(&service, &prefs, "Alex").await.unwrap();

        logout(&prefs).unwrap();
        assert!(restore(&service, &prefs).await.is_none());
    }

    #[tokio::test]
    async fn test_restore_forgets_user_unknown_to_service() {
        let (prefs, _dir) = create_test_store();
        let user = login(&InMemoryDataService::new(), &prefs, "Alex")
            .await
            .unwrap();
        assert_eq!(prefs.session_user(), Some(user));

        // A fresh backend has never seen this user
        let service = InMemoryDataService::new();
        assert!(restore(&service, &prefs).await.is_none());
        assert!(PreferenceStore::open(prefs.path()).session_user().is_none());
    }

    #[tokio::test]
    async fn test_restore_keeps_user_when_service_unreachable() {
        let (prefs, _dir) = create_test_store();
        let service = InMemoryDataService::new();
        let user = login(&service, &prefs, "Alex").await.unwrap();

        service.set_offline(true);
        assert_eq!(restore(&service, &prefs).await, Some(user.clone()));
        assert_eq!(prefs.session_user(), Some(user));
    }
}
