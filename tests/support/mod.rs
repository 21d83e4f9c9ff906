#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use closet_sync::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};
use closet_sync::application::fixture::{generate, FixtureConfig, FixtureSummary};

/// Scratch directory holding a fixture set and a warehouse file.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("warehouse.db")
    }

    pub fn database_url(&self) -> String {
        self.database_path().display().to_string()
    }

    /// Write a small seeded fixture set into `data_dir()`.
    pub fn fixtures(&self) -> FixtureSummary {
        generate(&small_fixtures(), &self.data_dir()).expect("generate fixtures")
    }

    pub fn pool(&self) -> DbPool {
        let pool = create_pool(&self.database_url()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        pool
    }
}

pub fn small_fixtures() -> FixtureConfig {
    FixtureConfig {
        customers: 40,
        items: 60,
        orders: 50,
        posts: 20,
        market_events: 10,
        ..FixtureConfig::default()
    }
}
