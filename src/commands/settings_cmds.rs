use super::AppContext;
use crate::services::config::EngineSettings;

pub fn get_settings(ctx: &AppContext) -> EngineSettings {
    ctx.settings.clone()
}

/// Persist the effective settings through the config service.
pub fn save_settings(ctx: &AppContext) -> Result<EngineSettings, String> {
    ctx.config.save_settings(ctx.settings.clone())?;
    Ok(ctx.config.get_settings())
}
