//! Per-session state behind the content-facing persistence API.
//!
//! Both API generations are accepted: `LMSInitialize`/`LMSSetValue`/... and
//! `Initialize`/`SetValue`/... map onto the same state machine. Values are
//! kept verbatim under their data model names.

use crate::services::instrument::snippets::STATUS_MESSAGE_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_ERROR: u16 = 0;
pub const GENERAL_EXCEPTION: u16 = 101;
pub const INVALID_ARGUMENT: u16 = 201;
pub const NOT_INITIALIZED: u16 = 301;
pub const NOT_IMPLEMENTED: u16 = 401;
pub const READ_ONLY: u16 = 403;
pub const WRITE_ONLY: u16 = 404;
pub const INCORRECT_DATA_TYPE: u16 = 405;

/// Upper bound of `cmi.suspend_data` in the 1.2 data model.
pub const MAX_SUSPEND_DATA: usize = 4096;

const READ_ONLY_ELEMENTS: &[&str] = &[
    "cmi.core.student_id",
    "cmi.core.student_name",
    "cmi.core.credit",
    "cmi.core.entry",
    "cmi.core.total_time",
    "cmi.core.lesson_mode",
    "cmi.launch_data",
    "cmi.learner_id",
    "cmi.learner_name",
    "cmi.entry",
    "cmi.credit",
    "cmi.total_time",
    "cmi.mode",
];

const WRITE_ONLY_ELEMENTS: &[&str] = &[
    "cmi.core.exit",
    "cmi.core.session_time",
    "cmi.exit",
    "cmi.session_time",
];

const LESSON_STATUSES: &[&str] = &[
    "passed",
    "completed",
    "failed",
    "incomplete",
    "browsed",
    "not attempted",
];

const COMPLETION_STATUSES: &[&str] = &["completed", "incomplete", "not attempted", "unknown"];

/// Message the event tracker posts to the hosting frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub completion: String,
    pub score: Option<String>,
    pub location: Option<String>,
    pub suspend_data_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRuntime {
    pub initialized: bool,
    pub finished: bool,
    pub last_error: u16,
    pub call_counts: BTreeMap<String, u64>,
    pub values: BTreeMap<String, String>,
}

pub fn error_string(code: u16) -> &'static str {
    match code {
        NO_ERROR => "No error",
        GENERAL_EXCEPTION => "General exception",
        INVALID_ARGUMENT => "Invalid argument error",
        NOT_INITIALIZED => "Not initialized",
        NOT_IMPLEMENTED => "Not implemented error",
        READ_ONLY => "Element is read only",
        WRITE_ONLY => "Element is write only",
        INCORRECT_DATA_TYPE => "Incorrect data type",
        _ => "Unknown error",
    }
}

fn bool_str(ok: bool) -> String {
    let text = if ok { "true" } else { "false" };
    text.to_string()
}

impl SessionRuntime {
    fn count(&mut self, method: &str) {
        *self.call_counts.entry(method.to_string()).or_insert(0) += 1;
    }

    fn fail(&mut self, code: u16) -> bool {
        self.last_error = code;
        false
    }

    fn value(&self, element: &str) -> Option<&str> {
        self.values
            .get(element)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// `ab-initio` on a first attempt, `resume` once anything was bookmarked.
    pub fn entry(&self) -> &'static str {
        let bookmarked = ["cmi.suspend_data", "cmi.core.lesson_location", "cmi.location"]
            .iter()
            .any(|element| self.value(element).is_some());
        if bookmarked {
            "resume"
        } else {
            "ab-initio"
        }
    }

    pub fn initialize(&mut self) -> bool {
        self.count("Initialize");
        if self.initialized {
            return self.fail(GENERAL_EXCEPTION);
        }
        self.initialized = true;
        self.finished = false;
        self.last_error = NO_ERROR;
        true
    }

    pub fn get_value(&mut self, element: &str) -> String {
        self.count("GetValue");
        if !self.initialized {
            self.fail(NOT_INITIALIZED);
            return String::new();
        }
        if !element.starts_with("cmi.") {
            self.fail(INVALID_ARGUMENT);
            return String::new();
        }
        if WRITE_ONLY_ELEMENTS.contains(&element) {
            self.fail(WRITE_ONLY);
            return String::new();
        }

        self.last_error = NO_ERROR;
        match element {
            "cmi.core.entry" | "cmi.entry" => self.entry().to_string(),
            "cmi.core.lesson_status" => self
                .value(element)
                .unwrap_or("not attempted")
                .to_string(),
            "cmi.completion_status" => self.value(element).unwrap_or("unknown").to_string(),
            "cmi.core.credit" | "cmi.credit" => "credit".to_string(),
            _ => self.values.get(element).cloned().unwrap_or_default(),
        }
    }

    pub fn set_value(&mut self, element: &str, value: &str) -> bool {
        self.count("SetValue");
        if !self.initialized {
            return self.fail(NOT_INITIALIZED);
        }
        if !element.starts_with("cmi.") {
            return self.fail(INVALID_ARGUMENT);
        }
        if READ_ONLY_ELEMENTS.contains(&element) {
            return self.fail(READ_ONLY);
        }

        let valid = match element {
            "cmi.core.lesson_status" => LESSON_STATUSES.contains(&value),
            "cmi.completion_status" => COMPLETION_STATUSES.contains(&value),
            "cmi.suspend_data" => value.chars().count() <= MAX_SUSPEND_DATA,
            e if e.ends_with(".score.raw") => value.is_empty() || value.parse::<f64>().is_ok(),
            _ => true,
        };
        if !valid {
            return self.fail(INCORRECT_DATA_TYPE);
        }

        self.values.insert(element.to_string(), value.to_string());
        self.last_error = NO_ERROR;
        true
    }

    pub fn commit(&mut self) -> bool {
        self.count("Commit");
        if !self.initialized {
            return self.fail(NOT_INITIALIZED);
        }
        self.last_error = NO_ERROR;
        true
    }

    pub fn finish(&mut self) -> bool {
        self.count("Finish");
        if !self.initialized {
            return self.fail(NOT_INITIALIZED);
        }
        self.initialized = false;
        self.finished = true;
        self.last_error = NO_ERROR;
        true
    }

    /// Dispatch an API call by its content-facing name. Returns the string
    /// the API method hands back to the content.
    pub fn call(&mut self, method: &str, args: &[&str]) -> String {
        let arg = |i: usize| args.get(i).copied().unwrap_or_default();
        match method {
            "LMSInitialize" | "Initialize" => bool_str(self.initialize()),
            "LMSFinish" | "Terminate" => bool_str(self.finish()),
            "LMSCommit" | "Commit" => bool_str(self.commit()),
            "LMSGetValue" | "GetValue" => self.get_value(arg(0)),
            "LMSSetValue" | "SetValue" => bool_str(self.set_value(arg(0), arg(1))),
            "LMSGetLastError" | "GetLastError" => self.last_error.to_string(),
            "LMSGetErrorString" | "GetErrorString" => {
                error_string(arg(0).parse().unwrap_or(GENERAL_EXCEPTION)).to_string()
            }
            "LMSGetDiagnostic" | "GetDiagnostic" => error_string(self.last_error).to_string(),
            _ => {
                self.fail(NOT_IMPLEMENTED);
                bool_str(false)
            }
        }
    }

    pub fn status(&self) -> StatusMessage {
        let completion = self
            .value("cmi.core.lesson_status")
            .or_else(|| self.value("cmi.completion_status"))
            .unwrap_or("not attempted")
            .to_string();
        let score = self
            .value("cmi.core.score.raw")
            .or_else(|| self.value("cmi.score.raw"))
            .map(str::to_string);
        let location = self
            .value("cmi.core.lesson_location")
            .or_else(|| self.value("cmi.location"))
            .map(str::to_string);

        StatusMessage {
            message_type: STATUS_MESSAGE_TYPE.to_string(),
            completion,
            score,
            location,
            suspend_data_length: self
                .values
                .get("cmi.suspend_data")
                .map(|s| s.chars().count())
                .unwrap_or(0),
        }
    }
}
