use super::*;
use crate::test_utils::{create_test_zip, init_test_logger};
use tempfile::TempDir;

fn context(dir: &TempDir) -> AppContext {
    init_test_logger();
    AppContext::load(None, Some(dir.path().join("data"))).unwrap()
}

#[test]
fn test_context_prepares_storage() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    assert_eq!(ctx.settings.data_dir, dir.path().join("data"));
    assert!(ctx.layout.repaired_dir().is_dir());
    assert_eq!(ctx.store.root(), ctx.layout.sessions_dir());
}

#[test]
fn test_play_then_drive_session_api() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let zip = create_test_zip(
        dir.path(),
        "course.zip",
        &[("index.html", b"<html><head></head></html>")],
    );

    let outcome = package_cmds::play(&ctx, &zip);
    assert!(outcome.is_playable());
    let id = outcome.session.unwrap().session_id;

    let init = session_cmds::call_api(&ctx, &id, "LMSInitialize", &[String::new()]).unwrap();
    assert_eq!(init.result, "true");

    let args = vec!["cmi.core.lesson_location".to_string(), "page-2".to_string()];
    session_cmds::call_api(&ctx, &id, "LMSSetValue", &args).unwrap();

    let status = session_cmds::session_status(&ctx, &id).unwrap();
    assert_eq!(status.location.as_deref(), Some("page-2"));

    let launch = session_cmds::resolve_file(&ctx, &id, "index.html").unwrap();
    assert!(launch.is_file());

    assert!(session_cmds::destroy_session(&ctx, &id).unwrap().removed);
    assert!(session_cmds::list_sessions(&ctx).unwrap().is_empty());
}

#[test]
fn test_repair_with_explicit_output() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let zip = create_test_zip(dir.path(), "c.zip", &[("story.html", b"<p/>")]);
    let output = dir.path().join("custom.zip");

    let report = package_cmds::repair(&ctx, &zip, Some(&output));
    assert!(report.success);
    assert!(output.exists());
}
