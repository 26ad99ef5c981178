use crate::services::config::{apply_env_overrides, ConfigService, EngineSettings};
use crate::services::session::PlayerSessionStore;
use crate::services::storage::StorageLayout;
use anyhow::Context;
use std::path::PathBuf;

/// Everything a command needs: effective settings, storage layout and the
/// session store rooted in it.
pub struct AppContext {
    pub config: ConfigService,
    pub settings: EngineSettings,
    pub layout: StorageLayout,
    pub store: PlayerSessionStore,
}

impl AppContext {
    /// Settings come from the config file, then `SCORMFIX_*` variables, then
    /// an explicit `--data-dir`.
    pub fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = ConfigService::new(config_path).map_err(anyhow::Error::msg)?;

        let mut settings = config.get_settings();
        apply_env_overrides(&mut settings);
        if let Some(dir) = data_dir {
            settings.data_dir = dir;
        }

        let layout = StorageLayout::new(&settings.data_dir);
        layout
            .ensure()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Preparing data directory {}", settings.data_dir.display()))?;
        let store = PlayerSessionStore::new(layout.sessions_dir(), &settings);

        log::debug!("Using data directory {}", layout.root().display());
        Ok(Self {
            config,
            settings,
            layout,
            store,
        })
    }
}
