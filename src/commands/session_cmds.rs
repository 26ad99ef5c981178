use super::AppContext;
use crate::services::session::{PlayerSession, StatusMessage};
use crate::types::PackageError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyResult {
    pub session_id: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallResult {
    pub method: String,
    pub result: String,
    pub last_error: u16,
    pub status: StatusMessage,
}

pub fn list_sessions(ctx: &AppContext) -> Result<Vec<PlayerSession>, PackageError> {
    ctx.store.list()
}

pub fn show_session(ctx: &AppContext, id: &str) -> Result<PlayerSession, PackageError> {
    ctx.store.get(id)
}

pub fn destroy_session(ctx: &AppContext, id: &str) -> Result<DestroyResult, PackageError> {
    let removed = ctx.store.destroy(id)?;
    Ok(DestroyResult {
        session_id: id.to_string(),
        removed,
    })
}

pub fn resolve_file(ctx: &AppContext, id: &str, path: &str) -> Result<PathBuf, PackageError> {
    ctx.store.resolve_file(id, path)
}

/// One API call against the stored runtime; the updated state is saved
/// before returning.
pub fn call_api(
    ctx: &AppContext,
    id: &str,
    method: &str,
    args: &[String],
) -> Result<ApiCallResult, PackageError> {
    let mut runtime = ctx.store.load_runtime(id)?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = runtime.call(method, &args);
    ctx.store.save_runtime(id, &runtime)?;

    Ok(ApiCallResult {
        method: method.to_string(),
        result,
        last_error: runtime.last_error,
        status: runtime.status(),
    })
}

pub fn session_status(ctx: &AppContext, id: &str) -> Result<StatusMessage, PackageError> {
    Ok(ctx.store.load_runtime(id)?.status())
}
