use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;

/// Shared handler state; cloning is a cheap Arc bump.
#[derive(Clone)]
pub(crate) struct AppState(Arc<Shared>);

struct Shared {
    settings: Settings,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self(Arc::new(Shared { settings, db }))
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.0.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.0.db
    }
}
