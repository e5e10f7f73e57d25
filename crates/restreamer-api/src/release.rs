// Explicit, idempotent release of client-produced values.
//
// Dropping any value frees it; `release` exists for callers that keep a
// long-lived slot (a UI panel's "current process state") and want to empty
// it in place. Releasing resets the value to its zero state, so releasing
// twice, or releasing a value that was never filled, does nothing.

use bytes::Bytes;
use serde_json::Value;

use crate::models::{
    ActiveSessions, ApiInfo, Codec, Codecs, EncodingParams, FfmpegInfo, FfmpegLibrary, Formats,
    FsEntry, LogEntry, OutputInfo, PlayoutStatus, ProbeInfo, Process, ProcessState, Protocols,
    RemoteSession, SkillEntry, Skills, StreamInfo,
};

pub trait Release {
    /// Reset to the empty state, freeing owned buffers.
    fn release(&mut self);
}

/// Release through an optional reference; `None` is a no-op.
pub fn release<T: Release + ?Sized>(value: Option<&mut T>) {
    if let Some(value) = value {
        value.release();
    }
}

macro_rules! release_to_default {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Release for $ty {
                fn release(&mut self) {
                    *self = <$ty>::default();
                }
            }
        )+
    };
}

release_to_default!(
    Process,
    ProcessState,
    LogEntry,
    OutputInfo,
    EncodingParams,
    ProbeInfo,
    StreamInfo,
    PlayoutStatus,
    FsEntry,
    RemoteSession,
    ActiveSessions,
    ApiInfo,
    Skills,
    FfmpegInfo,
    FfmpegLibrary,
    SkillEntry,
    Codec,
    Codecs,
    Formats,
    Protocols,
);

impl<T> Release for Vec<T> {
    fn release(&mut self) {
        self.clear();
        self.shrink_to_fit();
    }
}

impl<T: Release> Release for Option<T> {
    fn release(&mut self) {
        if let Some(inner) = self.as_mut() {
            inner.release();
        }
        *self = None;
    }
}

impl Release for String {
    fn release(&mut self) {
        self.clear();
        self.shrink_to_fit();
    }
}

impl Release for Bytes {
    fn release(&mut self) {
        *self = Bytes::new();
    }
}

impl Release for Value {
    fn release(&mut self) {
        *self = Value::Null;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FsList, ProcessList};

    fn sample_process() -> Process {
        Process {
            id: "restream-1".into(),
            reference: "obs".into(),
            state: "running".into(),
            uptime: 42,
            cpu_usage: 3.5,
            memory: 1 << 20,
            command: "-i in out".into(),
        }
    }

    #[test]
    fn double_release_is_safe() {
        let mut process = sample_process();
        process.release();
        assert_eq!(process, Process::default());
        process.release();
        assert_eq!(process, Process::default());
    }

    #[test]
    fn zero_value_release_is_noop() {
        let mut state = ProcessState::default();
        state.release();
        assert_eq!(state, ProcessState::default());

        let mut list: ProcessList = Vec::new();
        list.release();
        assert!(list.is_empty());
    }

    #[test]
    fn lists_release_to_empty() {
        let mut list: ProcessList = vec![sample_process(), Process::default()];
        list.release();
        assert_eq!(list.len(), 0);
        assert_eq!(list.capacity(), 0);
        list.release();
        assert!(list.is_empty());
    }

    #[test]
    fn partial_entries_release_cleanly() {
        let mut files: FsList = vec![
            FsEntry {
                name: "a.mp4".into(),
                ..FsEntry::default()
            },
            FsEntry::default(),
        ];
        files.release();
        assert!(files.is_empty());
    }

    #[test]
    fn none_and_absent_are_noops() {
        let mut slot: Option<ProbeInfo> = None;
        slot.release();
        assert!(slot.is_none());

        release::<ApiInfo>(None);

        let mut filled = Some(ApiInfo {
            name: "datarhei-core".into(),
            ..ApiInfo::default()
        });
        release(filled.as_mut());
        assert_eq!(filled, Some(ApiInfo::default()));
        filled.release();
        assert!(filled.is_none());
    }

    #[test]
    fn raw_payloads_release() {
        let mut blob = Bytes::from_static(b"\x89PNG");
        blob.release();
        assert!(blob.is_empty());

        let mut json = serde_json::json!({ "k": 1 });
        json.release();
        assert!(json.is_null());

        let mut text = String::from("pong");
        text.release();
        text.release();
        assert!(text.is_empty());
    }
}
