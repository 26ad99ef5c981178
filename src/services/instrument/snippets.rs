//! Built-in instrumentation snippets.

use super::Snippet;

/// Marker carried by the API shim reference.
pub const SHIM_MARKER: &str = r#"data-scormfix="api-shim""#;
/// Marker carried by the inline event tracker.
pub const TRACKER_MARKER: &str = r#"data-scormfix="tracker""#;

/// Message type posted to the hosting frame by the tracker.
pub const STATUS_MESSAGE_TYPE: &str = "scormfix:status";

const TRACKER_SCRIPT: &str = r#"(function () {
  var state = { completion: null, score: null, location: null, suspendDataLength: 0 };
  function post() {
    try {
      window.parent.postMessage({
        type: "scormfix:status",
        completion: state.completion,
        score: state.score,
        location: state.location,
        suspendDataLength: state.suspendDataLength
      }, "*");
    } catch (e) {}
  }
  function track(key, value) {
    var v = String(value);
    if (key === "cmi.core.lesson_status" || key === "cmi.completion_status") state.completion = v;
    else if (key === "cmi.core.score.raw" || key === "cmi.score.raw") state.score = v;
    else if (key === "cmi.core.lesson_location" || key === "cmi.location") state.location = v;
    else if (key === "cmi.suspend_data") state.suspendDataLength = v.length;
  }
  function wrap(api, setName, flushNames) {
    if (!api || api.__scormfixTracked) return;
    api.__scormfixTracked = true;
    var set = api[setName];
    if (typeof set === "function") {
      api[setName] = function (key, value) {
        var result = set.apply(api, arguments);
        track(key, value);
        post();
        return result;
      };
    }
    flushNames.forEach(function (name) {
      var fn = api[name];
      if (typeof fn === "function") {
        api[name] = function () {
          var result = fn.apply(api, arguments);
          post();
          return result;
        };
      }
    });
  }
  function attach() {
    wrap(window.API, "LMSSetValue", ["LMSCommit", "LMSFinish"]);
    wrap(window.API_1484_11, "SetValue", ["Commit", "Terminate"]);
  }
  attach();
  window.addEventListener("load", attach);
})();"#;

/// `<script src>` reference to the externally served persistence API shim.
pub fn api_shim_snippet(shim_url: &str) -> Snippet {
    Snippet::new(
        SHIM_MARKER,
        format!(
            r#"<script src="{}" {SHIM_MARKER}></script>"#,
            escape_attribute(shim_url)
        ),
    )
}

/// Inline tracker reporting persistence calls to the hosting frame.
pub fn event_tracker_snippet() -> Snippet {
    Snippet::new(
        TRACKER_MARKER,
        format!("<script {TRACKER_MARKER}>\n{TRACKER_SCRIPT}\n</script>"),
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
