use super::snippets::{api_shim_snippet, event_tracker_snippet, SHIM_MARKER, TRACKER_MARKER};
use super::*;
use crate::test_utils::{count_in_file, create_test_zip};
use std::fs;
use tempfile::TempDir;

fn test_snippet() -> Snippet {
    Snippet::new("data-test-marker", r#"<script data-test-marker></script>"#)
}

#[test]
fn test_inject_after_head_open() {
    let doc = b"<html><HEAD lang=\"en\"><title>x</title></HEAD><body></body></html>";
    let (out, point) = inject_snippet(doc, &test_snippet()).unwrap();

    assert_eq!(point, InsertionPoint::AfterHeadOpen);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<html><HEAD lang=\"en\"><script data-test-marker></script><title>x</title></HEAD><body></body></html>"
    );
}

#[test]
fn test_header_element_is_not_a_head_tag() {
    let doc = b"<html><body><header>Top</header></body></html>";
    let (out, point) = inject_snippet(doc, &test_snippet()).unwrap();

    assert_eq!(point, InsertionPoint::Prepended);
    assert!(out.starts_with(b"<script data-test-marker></script>\n<html>"));
}

#[test]
fn test_inject_before_head_close_when_open_tag_is_unusual() {
    // Opening tag broken across a '<head' prefix the open regex refuses
    let doc = b"<html><head/x><title>x</title></head><body></body></html>";
    let (out, point) = inject_snippet(doc, &test_snippet()).unwrap();

    assert_eq!(point, InsertionPoint::BeforeHeadClose);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("<title>x</title><script data-test-marker></script></head>"));
}

#[test]
fn test_inject_prepends_without_head() {
    let doc = b"<p>fragment</p>";
    let (out, point) = inject_snippet(doc, &test_snippet()).unwrap();

    assert_eq!(point, InsertionPoint::Prepended);
    assert_eq!(out, b"<script data-test-marker></script>\n<p>fragment</p>".to_vec());
}

#[test]
fn test_marker_present_skips_document() {
    let doc = b"<html><head><script data-test-marker></script></head></html>";
    assert!(inject_snippet(doc, &test_snippet()).is_none());
}

#[test]
fn test_non_utf8_bytes_survive_injection() {
    let doc = b"<html><head></head><body>caf\xe9</body></html>";
    let (out, _) = inject_snippet(doc, &test_snippet()).unwrap();
    assert!(out.ends_with(b"caf\xe9</body></html>"));
}

#[test]
fn test_instrument_tree_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::write(root.join("index.html"), "<html><head></head><body></body></html>").unwrap();
    fs::write(root.join("nested/page.HTM"), "<p>no head</p>").unwrap();
    fs::write(root.join("nested/deeper/a.html"), "<html><head><title>a</title></head></html>").unwrap();
    fs::write(root.join("nested/script.js"), "var head = '<head>';").unwrap();

    let snippets = vec![api_shim_snippet("/shim.js"), event_tracker_snippet()];

    let first = instrument_tree(root, &snippets).unwrap();
    assert_eq!(first.documents_scanned, 3);
    assert_eq!(first.documents_modified, 3);
    assert_eq!(first.injections, 6);

    let second = instrument_tree(root, &snippets).unwrap();
    assert_eq!(second.documents_modified, 0);
    assert_eq!(second.injections, 0);

    for page in ["index.html", "nested/page.HTM", "nested/deeper/a.html"] {
        assert_eq!(count_in_file(&root.join(page), SHIM_MARKER), 1, "{page}");
        assert_eq!(count_in_file(&root.join(page), TRACKER_MARKER), 1, "{page}");
    }
    assert_eq!(
        fs::read_to_string(root.join("nested/script.js")).unwrap(),
        "var head = '<head>';"
    );
}

fn position(text: &str, marker: &str) -> usize {
    text.find(marker)
        .unwrap_or_else(|| panic!("{marker} not found"))
}

#[test]
fn test_snippets_keep_list_order_in_document() {
    let snippets = [api_shim_snippet("/shim.js"), event_tracker_snippet()];
    for doc in [
        &b"<html><head><title>x</title></head></html>"[..],
        &b"<html><head/x><title>x</title></head></html>"[..],
        &b"<p>fragment</p>"[..],
    ] {
        let (out, _, injected) = inject_snippets(doc, &snippets).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(injected, 2);
        assert!(position(&text, SHIM_MARKER) < position(&text, TRACKER_MARKER));
    }
}

#[test]
fn test_tracker_added_after_existing_shim() {
    let doc = b"<html><head><title>x</title></head><body></body></html>";
    let (with_shim, _) = inject_snippet(doc, &api_shim_snippet("/shim.js")).unwrap();

    let snippets = [api_shim_snippet("/shim.js"), event_tracker_snippet()];
    let (out, point, injected) = inject_snippets(&with_shim, &snippets).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(point, InsertionPoint::AfterHeadOpen);
    assert_eq!(injected, 1);
    assert_eq!(text.matches(SHIM_MARKER).count(), 1);
    assert!(position(&text, SHIM_MARKER) < position(&text, TRACKER_MARKER));
    assert!(position(&text, TRACKER_MARKER) < position(&text, "<title>"));
}

#[test]
fn test_prepended_tracker_follows_prepended_shim() {
    let doc = b"<p>fragment</p>";
    let (with_shim, _) = inject_snippet(doc, &api_shim_snippet("/shim.js")).unwrap();
    let snippets = [api_shim_snippet("/shim.js"), event_tracker_snippet()];
    let (out, point, _) = inject_snippets(&with_shim, &snippets).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(point, InsertionPoint::Prepended);
    assert!(position(&text, SHIM_MARKER) < position(&text, TRACKER_MARKER));
    assert!(text.ends_with("</script>\n<p>fragment</p>"));
}

#[test]
fn test_shim_snippet_escapes_url() {
    let snippet = api_shim_snippet("/shim.js?a=1&b=\"2\"");
    assert!(snippet
        .markup
        .contains(r#"src="/shim.js?a=1&amp;b=&quot;2&quot;""#));
    assert!(snippet.markup.contains(SHIM_MARKER));
}

#[test]
fn test_tracker_posts_status_fields() {
    let snippet = event_tracker_snippet();
    for field in ["completion", "score", "location", "suspendDataLength", "scormfix:status"] {
        assert!(snippet.markup.contains(field), "missing {field}");
    }
}

#[test]
fn test_build_instrumented_archive_leaves_source_untouched() {
    let dir = TempDir::new().unwrap();
    let zip_path = create_test_zip(
        dir.path(),
        "course.zip",
        &[
            ("index.html", b"<html><head></head></html>"),
            ("style.css", b"body {}"),
        ],
    );
    let before = fs::read(&zip_path).unwrap();

    let package = Package::open(&zip_path).unwrap();
    let output = dir.path().join("course_instrumented.zip");
    let summary = build_instrumented_archive(
        &package,
        &output,
        &[api_shim_snippet("/shim.js"), event_tracker_snippet()],
    )
    .unwrap();

    assert_eq!(summary.documents_modified, 1);
    assert_eq!(fs::read(&zip_path).unwrap(), before);

    let index = archive::read_entry_to_string(&output, "index.html", u64::MAX).unwrap();
    assert_eq!(index.matches(SHIM_MARKER).count(), 1);
    assert_eq!(index.matches(TRACKER_MARKER).count(), 1);
    assert!(position(&index, SHIM_MARKER) < position(&index, TRACKER_MARKER));
}
