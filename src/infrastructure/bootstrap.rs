//! Composition root: turns [`Settings`] into ready-to-run services.

use tracing::{info, warn};

use crate::adapter::outbound::social::SocialSync;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations, DbPool};
use crate::adapter::outbound::square::{SquareClient, SquareSync};
use crate::application::sync::{MasterSync, SyncWindows};
use crate::error::Result;
use crate::infrastructure::config::settings::{DatabaseSettings, Settings, SocialSettings, SyncSettings};
use crate::port::outbound::sync::SyncAdapter;

/// Open the warehouse pool and apply the schema.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn open_warehouse(settings: &DatabaseSettings) -> Result<DbPool> {
    let pool = create_pool(&settings.url)?;
    run_migrations(&pool)?;
    info!(database = %settings.url, "Warehouse ready");
    Ok(pool)
}

#[must_use]
pub fn sync_windows(settings: &SyncSettings) -> SyncWindows {
    SyncWindows {
        days_back: settings.days_back,
        quick_days: settings.quick_days,
        health_timeout: settings.health_check_timeout,
    }
}

/// Instagram and Facebook adapters for every platform with full credentials.
pub fn social_adapters(settings: &SocialSettings, pool: &DbPool) -> Vec<Box<dyn SyncAdapter>> {
    let mut adapters: Vec<Box<dyn SyncAdapter>> = Vec::new();
    if let Some(instagram) = SocialSync::instagram(settings, pool.clone()) {
        adapters.push(Box::new(instagram));
    }
    if let Some(facebook) = SocialSync::facebook(settings, pool.clone()) {
        adapters.push(Box::new(facebook));
    }
    if settings.tiktok_access_token.is_some() {
        warn!("TIKTOK_ACCESS_TOKEN is set but TikTok sync is not supported, skipping");
    }
    adapters
}

/// Wire the Square and social adapters around one warehouse pool.
///
/// # Errors
/// Returns a config error when Square credentials are missing.
pub fn build_master_sync(settings: &Settings, pool: DbPool) -> Result<MasterSync<DbPool>> {
    let credentials = settings.require_square()?;
    let square = SquareSync::new(
        SquareClient::new(&credentials),
        pool.clone(),
        settings.sync.days_back,
    );
    let social = social_adapters(&settings.social, &pool);
    info!(
        environment = ?credentials.environment,
        social = social.len(),
        "Sync adapters configured"
    );

    Ok(MasterSync::new(
        pool,
        Box::new(square),
        social,
        sync_windows(&settings.sync),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)], db: &std::path::Path) -> Settings {
        let mut env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        env.insert("DATABASE_URL".into(), db.display().to_string());
        Settings::from_lookup(|key| env.get(key).cloned()).unwrap()
    }

    #[test]
    fn warehouse_opens_and_migrates_twice() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&[], &dir.path().join("w.db"));
        open_warehouse(&settings.database).unwrap();
        open_warehouse(&settings.database).unwrap();
    }

    #[test]
    fn master_sync_needs_square_token() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&[], &dir.path().join("w.db"));
        let pool = open_warehouse(&settings.database).unwrap();

        let err = build_master_sync(&settings, pool).err().unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "SQUARE_ACCESS_TOKEN"
            })
        ));
    }

    #[test]
    fn social_adapters_follow_configured_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(
            &[
                ("SQUARE_ACCESS_TOKEN", "sq"),
                ("FACEBOOK_ACCESS_TOKEN", "fb"),
                ("FACEBOOK_PAGE_ID", "42"),
                ("TIKTOK_ACCESS_TOKEN", "tt"),
            ],
            &dir.path().join("w.db"),
        );
        let pool = open_warehouse(&settings.database).unwrap();

        let names: Vec<_> = social_adapters(&settings.social, &pool)
            .iter()
            .map(|adapter| adapter.name())
            .collect();
        assert_eq!(names, vec!["facebook"]);
        assert!(build_master_sync(&settings, pool).is_ok());
    }

    #[test]
    fn windows_come_from_sync_settings() {
        let windows = sync_windows(&SyncSettings::default());
        assert_eq!(windows.days_back, 30);
        assert_eq!(windows.quick_days, 7);
    }
}
