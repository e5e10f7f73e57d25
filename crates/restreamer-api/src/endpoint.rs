// Path construction for daemon endpoints.
//
// Identifiers (process ids, output ids, storage names, metadata keys) are
// percent-encoded one segment at a time so reserved characters such as
// space, `&`, `%`, `+` and `/` survive the trip to the daemon.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::Error;

/// Everything except RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Root of the versioned REST API.
pub const API_ROOT: &str = "/api/v3";

/// Percent-encode a single path segment or query value.
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// Reject empty identifiers before any request is built.
pub fn require<'a>(value: &'a str, what: &str) -> Result<&'a str, Error> {
    if value.is_empty() {
        Err(Error::InvalidArgument(format!("{what} is required")))
    } else {
        Ok(value)
    }
}

/// Builder for an encoded absolute request path.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    path: String,
    query: Vec<(String, String)>,
}

impl PathBuilder {
    /// Start at `/api/v3`.
    pub fn api() -> Self {
        Self::root(API_ROOT)
    }

    /// Start at a literal (already safe) prefix such as `/ping`.
    pub fn root(prefix: &str) -> Self {
        Self {
            path: prefix.trim_end_matches('/').to_owned(),
            query: Vec::new(),
        }
    }

    /// Append a literal, trusted segment (`process`, `outputs`, ...).
    pub fn lit(mut self, segment: &str) -> Self {
        self.path.push('/');
        self.path.push_str(segment);
        self
    }

    /// Append a caller-supplied identifier, encoded as one segment.
    pub fn id(mut self, identifier: &str) -> Self {
        self.path.push('/');
        self.path.push_str(&encode_segment(identifier));
        self
    }

    /// Append a slash-separated file path.
    ///
    /// Empty segments are dropped and each remaining segment is encoded on
    /// its own. `.` and `..` segments are rejected so a path can never walk
    /// out of its storage.
    pub fn file_path(mut self, file_path: &str) -> Result<Self, Error> {
        let mut appended = false;
        for segment in file_path.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(Error::InvalidArgument(format!(
                    "file path may not contain relative segments: {file_path:?}"
                )));
            }
            self = self.id(segment);
            appended = true;
        }
        if appended {
            Ok(self)
        } else {
            Err(Error::InvalidArgument("file path is required".into()))
        }
    }

    /// Add a query parameter. Empty values are skipped.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.query.push((key.to_owned(), value.to_owned()));
        }
        self
    }

    pub fn build(self) -> String {
        if self.query.is_empty() {
            return self.path;
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_segment(k), encode_segment(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters_are_encoded() {
        let path = PathBuilder::api()
            .lit("process")
            .id("my stream & more+100%")
            .build();
        assert_eq!(path, "/api/v3/process/my%20stream%20%26%20more%2B100%25");
    }

    #[test]
    fn identifier_slash_stays_in_one_segment() {
        let path = PathBuilder::api().lit("metadata").id("a/b").build();
        assert_eq!(path, "/api/v3/metadata/a%2Fb");
    }

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(encode_segment("restreamer-ui_v1.2~x"), "restreamer-ui_v1.2~x");
    }

    #[test]
    fn file_paths_encode_per_segment() {
        let path = PathBuilder::api()
            .lit("fs")
            .id("disk")
            .file_path("/recordings//show one/part#1.mp4")
            .unwrap()
            .build();
        assert_eq!(path, "/api/v3/fs/disk/recordings/show%20one/part%231.mp4");
    }

    #[test]
    fn file_paths_reject_traversal_and_empty() {
        let base = || PathBuilder::api().lit("fs").id("disk");
        assert!(base().file_path("../etc/passwd").is_err());
        assert!(base().file_path("a/./b").is_err());
        assert!(base().file_path("///").is_err());
    }

    #[test]
    fn glob_query_is_encoded_and_optional() {
        let with = PathBuilder::api().lit("fs").id("mem").query("glob", "*.m3u8").build();
        assert_eq!(with, "/api/v3/fs/mem?glob=%2A.m3u8");

        let without = PathBuilder::api().lit("fs").id("mem").query("glob", "").build();
        assert_eq!(without, "/api/v3/fs/mem");
    }

    #[test]
    fn require_rejects_empty() {
        assert!(require("", "process id").is_err());
        assert_eq!(require("abc", "process id").unwrap(), "abc");
    }
}
