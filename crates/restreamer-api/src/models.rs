// Typed request parameters and response shapes.
//
// Response types deserialize leniently: absent fields and fields of the
// wrong JSON type read as zero/empty. Mandatory-field checks (a process
// needs an id, an output list needs its array) happen in the endpoint
// methods, not here.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{Display, EnumString};

use crate::lenient;

// ── Processes ────────────────────────────────────────────────────────

/// A remote encode/restream job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProcessWire")]
pub struct Process {
    pub id: String,
    pub reference: String,
    /// `running`, `finished`, `failed`, ...
    pub state: String,
    pub uptime: u64,
    pub cpu_usage: f64,
    pub memory: u64,
    pub command: String,
}

/// Older daemons spell `uptime`/`memory` as `uptime_seconds`/`memory_bytes`,
/// and some send both. The short name wins.
#[derive(Deserialize)]
struct ProcessWire {
    #[serde(default, deserialize_with = "lenient::string")]
    id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    reference: String,
    #[serde(default, deserialize_with = "lenient::string")]
    state: String,
    #[serde(default, deserialize_with = "lenient::opt_unsigned")]
    uptime: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_unsigned")]
    uptime_seconds: Option<u64>,
    #[serde(default, deserialize_with = "lenient::float")]
    cpu_usage: f64,
    #[serde(default, deserialize_with = "lenient::opt_unsigned")]
    memory: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_unsigned")]
    memory_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string")]
    command: String,
}

impl From<ProcessWire> for Process {
    fn from(wire: ProcessWire) -> Self {
        Self {
            id: wire.id,
            reference: wire.reference,
            state: wire.state,
            uptime: wire.uptime.or(wire.uptime_seconds).unwrap_or_default(),
            cpu_usage: wire.cpu_usage,
            memory: wire.memory.or(wire.memory_bytes).unwrap_or_default(),
            command: wire.command,
        }
    }
}

pub type ProcessList = Vec<Process>;

/// Lifecycle command sent to `POST /api/v3/process/{id}/command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ProcessCommand {
    Start,
    Stop,
    Restart,
}

/// Parameters for creating a multi-destination restream process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProcess {
    pub reference: String,
    pub input_url: String,
    pub output_urls: Vec<String>,
    pub video_filter: Option<String>,
}

impl NewProcess {
    /// FFmpeg argument string: copy codecs from one input and fan out to
    /// every destination through the `tee` muxer as FLV.
    pub(crate) fn ffmpeg_command(&self) -> String {
        let mut command = format!(
            "-re -i {} -c:v copy -c:a copy -f tee -map 0:v -map 0:a ",
            self.input_url
        );
        if let Some(filter) = self.video_filter.as_deref().filter(|f| !f.is_empty()) {
            command.push_str("-vf ");
            command.push_str(filter);
            command.push(' ');
        }
        let tee = self
            .output_urls
            .iter()
            .map(|url| format!("[f=flv]{url}"))
            .collect::<Vec<_>>()
            .join("|");
        command.push('"');
        command.push_str(&tee);
        command.push('"');
        command
    }
}

/// Transient telemetry snapshot for one process.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessState {
    pub order: String,
    pub frames: u64,
    pub dropped_frames: u64,
    /// kbit/s as reported by the daemon.
    pub current_bitrate: u32,
    pub fps: f64,
    pub bytes_written: u64,
    pub packets_sent: u64,
    /// 0.0 - 100.0
    pub progress: f64,
    pub is_running: bool,
}

#[derive(Deserialize)]
pub(crate) struct ProcessStateWire {
    #[serde(default, deserialize_with = "lenient::string")]
    order: String,
    #[serde(default)]
    progress: Option<Value>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    running: bool,
}

#[derive(Default, Deserialize)]
struct ProgressWire {
    #[serde(default, deserialize_with = "lenient::unsigned")]
    frames: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    dropped_frames: u64,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    bitrate: u32,
    #[serde(default, deserialize_with = "lenient::float")]
    fps: f64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    size_kb: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    packets: u64,
    #[serde(default, deserialize_with = "lenient::float")]
    percent: f64,
}

impl From<ProcessStateWire> for ProcessState {
    fn from(wire: ProcessStateWire) -> Self {
        // A non-object `progress` reads as all zeros.
        let progress: ProgressWire = lenient::nested(wire.progress);
        Self {
            order: wire.order,
            frames: progress.frames,
            dropped_frames: progress.dropped_frames,
            current_bitrate: progress.bitrate,
            fps: progress.fps,
            bytes_written: progress.size_kb.saturating_mul(1024),
            packets_sent: progress.packets,
            progress: progress.percent,
            is_running: wire.running,
        }
    }
}

/// One line of a process log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    /// `info`, `warning`, `error`, `debug`
    #[serde(default, deserialize_with = "lenient::string")]
    pub level: String,
}

pub type LogList = Vec<LogEntry>;

// ── Dynamic outputs ──────────────────────────────────────────────────

/// One destination attached to a running process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub video_filter: Option<String>,
}

pub type OutputList = Vec<OutputInfo>;

/// Encoding overrides for one output.
///
/// Zero (or `None`) in any field means "leave the current value
/// unchanged" when updating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodingParams {
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub preset: Option<String>,
    pub profile: Option<String>,
}

impl EncodingParams {
    /// Wire body: bitrates in bit/s, nested `resolution` and `fps` objects
    /// only when both halves are set.
    pub(crate) fn to_wire(&self) -> Value {
        let mut body = serde_json::Map::new();
        if self.video_bitrate_kbps > 0 {
            body.insert(
                "video_bitrate".into(),
                json!(u64::from(self.video_bitrate_kbps) * 1000),
            );
        }
        if self.audio_bitrate_kbps > 0 {
            body.insert(
                "audio_bitrate".into(),
                json!(u64::from(self.audio_bitrate_kbps) * 1000),
            );
        }
        if self.width > 0 && self.height > 0 {
            body.insert(
                "resolution".into(),
                json!({ "width": self.width, "height": self.height }),
            );
        }
        if self.fps_num > 0 && self.fps_den > 0 {
            body.insert(
                "fps".into(),
                json!({ "num": self.fps_num, "den": self.fps_den }),
            );
        }
        if let Some(preset) = self.preset.as_deref().filter(|p| !p.is_empty()) {
            body.insert("preset".into(), json!(preset));
        }
        if let Some(profile) = self.profile.as_deref().filter(|p| !p.is_empty()) {
            body.insert("profile".into(), json!(profile));
        }
        Value::Object(body)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Deserialize)]
pub(crate) struct EncodingWire {
    #[serde(default, deserialize_with = "lenient::unsigned")]
    video_bitrate: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    audio_bitrate: u64,
    #[serde(default)]
    resolution: Option<Value>,
    #[serde(default)]
    fps: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    preset: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    profile: Option<String>,
}

#[derive(Default, Deserialize)]
struct ResolutionWire {
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    width: u32,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    height: u32,
}

#[derive(Default, Deserialize)]
struct RationalWire {
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    num: u32,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    den: u32,
}

impl From<EncodingWire> for EncodingParams {
    fn from(wire: EncodingWire) -> Self {
        let resolution: ResolutionWire = lenient::nested(wire.resolution);
        let fps: RationalWire = lenient::nested(wire.fps);
        Self {
            video_bitrate_kbps: u32::try_from(wire.video_bitrate / 1000).unwrap_or(u32::MAX),
            audio_bitrate_kbps: u32::try_from(wire.audio_bitrate / 1000).unwrap_or(u32::MAX),
            width: resolution.width,
            height: resolution.height,
            fps_num: fps.num,
            fps_den: fps.den,
            preset: wire.preset,
            profile: wire.profile,
        }
    }
}

// ── Probe ────────────────────────────────────────────────────────────

/// Container-level result of probing a process input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProbeInfo {
    pub format_name: String,
    pub format_long_name: String,
    /// Microseconds.
    pub duration: i64,
    pub size: u64,
    /// bit/s
    pub bitrate: u32,
    pub streams: Vec<StreamInfo>,
}

/// One elementary stream found by a probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub codec_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub codec_long_name: String,
    /// `video`, `audio`, `subtitle`
    #[serde(default, deserialize_with = "lenient::string")]
    pub codec_type: String,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    pub width: u32,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    pub height: u32,
    #[serde(default, skip_deserializing)]
    pub fps_num: u32,
    #[serde(default, skip_deserializing)]
    pub fps_den: u32,
    #[serde(default, rename(deserialize = "bit_rate"), deserialize_with = "lenient::numeric_string32")]
    pub bitrate: u32,
    #[serde(default, deserialize_with = "lenient::numeric_string32")]
    pub sample_rate: u32,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    pub channels: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub pix_fmt: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub profile: String,
    /// Microseconds, when the stream reports its own duration.
    #[serde(default, deserialize_with = "lenient::seconds_as_micros")]
    pub duration: i64,
    #[serde(default, skip_serializing, deserialize_with = "lenient::string")]
    r_frame_rate: String,
}

impl StreamInfo {
    /// Frames per second, or `None` when the rate is unknown.
    pub fn fps(&self) -> Option<f64> {
        (self.fps_num > 0 && self.fps_den > 0)
            .then(|| f64::from(self.fps_num) / f64::from(self.fps_den))
    }

    fn resolve_frame_rate(mut self) -> Self {
        (self.fps_num, self.fps_den) = lenient::frame_rate(&self.r_frame_rate);
        self.r_frame_rate.clear();
        self
    }
}

#[derive(Deserialize)]
pub(crate) struct ProbeWire {
    #[serde(default)]
    format: Option<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    streams: Vec<StreamInfo>,
}

#[derive(Default, Deserialize)]
struct FormatWire {
    #[serde(default, deserialize_with = "lenient::string")]
    format_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    format_long_name: String,
    #[serde(default, deserialize_with = "lenient::seconds_as_micros")]
    duration: i64,
    #[serde(default, deserialize_with = "lenient::numeric_string")]
    size: u64,
    #[serde(default, deserialize_with = "lenient::numeric_string32")]
    bit_rate: u32,
}

impl From<ProbeWire> for ProbeInfo {
    fn from(wire: ProbeWire) -> Self {
        let format: FormatWire = lenient::nested(wire.format);
        Self {
            format_name: format.format_name,
            format_long_name: format.format_long_name,
            duration: format.duration,
            size: format.size,
            bitrate: format.bit_rate,
            streams: wire
                .streams
                .into_iter()
                .map(StreamInfo::resolve_frame_rate)
                .collect(),
        }
    }
}

// ── Playout ──────────────────────────────────────────────────────────

/// Status of one playout input of a process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoutStatus {
    /// Echoed from the request; the daemon does not return it.
    #[serde(default, skip_deserializing)]
    pub input_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, rename(deserialize = "connected"), deserialize_with = "lenient::boolean")]
    pub is_connected: bool,
    #[serde(default, rename(deserialize = "bytes"), deserialize_with = "lenient::unsigned")]
    pub bytes_received: u64,
    #[serde(default, deserialize_with = "lenient::unsigned32")]
    pub bitrate: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub state: String,
}

// ── Filesystem ───────────────────────────────────────────────────────

/// A file or directory under a named storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub path: String,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub size: u64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "lenient::signed")]
    pub modified: i64,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_directory: bool,
}

pub type FsList = Vec<FsEntry>;

// ── Monitoring ───────────────────────────────────────────────────────

/// A live client connection to the daemon (viewer, publisher).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSession {
    #[serde(default, rename(deserialize = "id"), deserialize_with = "lenient::string")]
    pub session_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reference: String,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub bytes_sent: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub bytes_received: u64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub remote_addr: String,
}

pub type SessionList = Vec<RemoteSession>;

/// Aggregate of all active sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSessions {
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub session_count: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub total_rx_bytes: u64,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub total_tx_bytes: u64,
}

// ── Diagnostics ──────────────────────────────────────────────────────

/// Name and version of the daemon's API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub build_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub commit: String,
}

// ── Skills ───────────────────────────────────────────────────────────

/// Encode/decode capabilities reported by the daemon's FFmpeg build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SkillsWire")]
pub struct Skills {
    pub ffmpeg: FfmpegInfo,
    pub filters: Vec<SkillEntry>,
    pub hwaccels: Vec<SkillEntry>,
    pub codecs: Codecs,
    pub formats: Formats,
    pub protocols: Protocols,
}

#[derive(Deserialize)]
struct SkillsWire {
    #[serde(default, deserialize_with = "lenient::object")]
    ffmpeg: FfmpegInfo,
    #[serde(default, deserialize_with = "lenient::opt_list")]
    filters: Option<Vec<SkillEntry>>,
    #[serde(default, deserialize_with = "lenient::opt_list")]
    filter: Option<Vec<SkillEntry>>,
    #[serde(default, deserialize_with = "lenient::list")]
    hwaccels: Vec<SkillEntry>,
    #[serde(default, deserialize_with = "lenient::object")]
    codecs: Codecs,
    #[serde(default, deserialize_with = "lenient::object")]
    formats: Formats,
    #[serde(default, deserialize_with = "lenient::object")]
    protocols: Protocols,
}

impl From<SkillsWire> for Skills {
    fn from(wire: SkillsWire) -> Self {
        Self {
            ffmpeg: wire.ffmpeg,
            filters: wire.filters.or(wire.filter).unwrap_or_default(),
            hwaccels: wire.hwaccels,
            codecs: wire.codecs,
            formats: wire.formats,
            protocols: wire.protocols,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FfmpegWire")]
pub struct FfmpegInfo {
    pub version: String,
    pub compiler: String,
    pub configuration: String,
    pub libs: Vec<FfmpegLibrary>,
}

#[derive(Deserialize)]
struct FfmpegWire {
    #[serde(default, deserialize_with = "lenient::string")]
    version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    compiler: String,
    #[serde(default, deserialize_with = "lenient::string")]
    configuration: String,
    #[serde(default, deserialize_with = "lenient::opt_list")]
    libs: Option<Vec<FfmpegLibrary>>,
    #[serde(default, deserialize_with = "lenient::opt_list")]
    libraries: Option<Vec<FfmpegLibrary>>,
}

impl From<FfmpegWire> for FfmpegInfo {
    fn from(wire: FfmpegWire) -> Self {
        Self {
            version: wire.version,
            compiler: wire.compiler,
            configuration: wire.configuration,
            libs: wire.libs.or(wire.libraries).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfmpegLibrary {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub compiled: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub linked: String,
}

/// A named capability (filter, hwaccel, format, protocol).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codec {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub encoders: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub decoders: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codecs {
    #[serde(default, deserialize_with = "lenient::list")]
    pub audio: Vec<Codec>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub video: Vec<Codec>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub subtitle: Vec<Codec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formats {
    #[serde(default, deserialize_with = "lenient::list")]
    pub demuxers: Vec<SkillEntry>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub muxers: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocols {
    #[serde(default, deserialize_with = "lenient::list")]
    pub input: Vec<SkillEntry>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub output: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CodecKind {
    Audio,
    Video,
    Subtitle,
}

impl Skills {
    pub fn codecs(&self, kind: CodecKind) -> &[Codec] {
        match kind {
            CodecKind::Audio => &self.codecs.audio,
            CodecKind::Video => &self.codecs.video,
            CodecKind::Subtitle => &self.codecs.subtitle,
        }
    }

    /// Every encoder name for the given codec kind, in report order.
    pub fn encoders(&self, kind: CodecKind) -> impl Iterator<Item = &str> {
        self.codecs(kind)
            .iter()
            .flat_map(|codec| codec.encoders.iter().map(String::as_str))
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        [CodecKind::Audio, CodecKind::Video, CodecKind::Subtitle]
            .into_iter()
            .any(|kind| self.encoders(kind).any(|e| e == name))
    }

    pub fn has_hwaccel(&self, id: &str) -> bool {
        self.hwaccels.iter().any(|h| h.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn ffmpeg_command_fans_out_through_tee() {
        let params = NewProcess {
            reference: "obs".into(),
            input_url: "rtmp://localhost/live/obs".into(),
            output_urls: vec![
                "rtmp://a.example/live/key1".into(),
                "rtmp://b.example/app/key2".into(),
            ],
            video_filter: None,
        };
        assert_eq!(
            params.ffmpeg_command(),
            "-re -i rtmp://localhost/live/obs -c:v copy -c:a copy -f tee -map 0:v -map 0:a \
             \"[f=flv]rtmp://a.example/live/key1|[f=flv]rtmp://b.example/app/key2\""
        );
    }

    #[test]
    fn ffmpeg_command_includes_video_filter() {
        let params = NewProcess {
            reference: "obs".into(),
            input_url: "in".into(),
            output_urls: vec!["out".into()],
            video_filter: Some("scale=1280:720".into()),
        };
        assert!(
            params
                .ffmpeg_command()
                .ends_with("-map 0:a -vf scale=1280:720 \"[f=flv]out\"")
        );
    }

    #[test]
    fn encoding_wire_skips_unset_fields() {
        let params = EncodingParams {
            video_bitrate_kbps: 4500,
            width: 1920,
            height: 0,
            fps_num: 30,
            fps_den: 1,
            preset: Some("veryfast".into()),
            ..EncodingParams::default()
        };
        assert_eq!(
            params.to_wire(),
            json!({
                "video_bitrate": 4_500_000,
                "fps": { "num": 30, "den": 1 },
                "preset": "veryfast"
            })
        );
        assert!(EncodingParams::default().is_empty());
        assert_eq!(EncodingParams::default().to_wire(), json!({}));
    }

    #[test]
    fn encoding_response_converts_to_kbps() {
        let wire: EncodingWire = serde_json::from_value(json!({
            "video_bitrate": 6_000_000,
            "audio_bitrate": 160_000,
            "resolution": { "width": 1280, "height": 720 },
            "fps": "60/1",
            "profile": "high"
        }))
        .unwrap();
        let params = EncodingParams::from(wire);
        assert_eq!(params.video_bitrate_kbps, 6000);
        assert_eq!(params.audio_bitrate_kbps, 160);
        assert_eq!((params.width, params.height), (1280, 720));
        assert_eq!((params.fps_num, params.fps_den), (0, 0));
        assert_eq!(params.profile.as_deref(), Some("high"));
        assert_eq!(params.preset, None);
    }

    #[test]
    fn process_state_flattens_progress() {
        let wire: ProcessStateWire = serde_json::from_value(json!({
            "order": "start",
            "running": true,
            "progress": {
                "frames": 9000,
                "dropped_frames": 3,
                "bitrate": 4500,
                "fps": 29.97,
                "size_kb": 2048,
                "packets": 12000,
                "percent": 12.5
            }
        }))
        .unwrap();
        let state = ProcessState::from(wire);
        assert_eq!(state.order, "start");
        assert!(state.is_running);
        assert_eq!(state.frames, 9000);
        assert_eq!(state.dropped_frames, 3);
        assert_eq!(state.current_bitrate, 4500);
        assert_eq!(state.bytes_written, 2048 * 1024);
        assert_eq!(state.packets_sent, 12000);
        assert!((state.progress - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_parses_string_numbers_and_frame_rate() {
        let wire: ProbeWire = serde_json::from_value(json!({
            "format": {
                "format_name": "flv",
                "format_long_name": "FLV (Flash Video)",
                "duration": "3.5",
                "size": "1048576",
                "bit_rate": "2500000"
            },
            "streams": [
                {
                    "codec_name": "h264",
                    "codec_type": "video",
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30000/1001",
                    "bit_rate": "2000000",
                    "pix_fmt": "yuv420p"
                },
                {
                    "codec_name": "aac",
                    "codec_type": "audio",
                    "channels": 2,
                    "sample_rate": "48000"
                }
            ]
        }))
        .unwrap();
        let info = ProbeInfo::from(wire);
        assert_eq!(info.format_name, "flv");
        assert_eq!(info.duration, 3_500_000);
        assert_eq!(info.size, 1_048_576);
        assert_eq!(info.bitrate, 2_500_000);
        assert_eq!(info.streams.len(), 2);

        let video = &info.streams[0];
        assert_eq!((video.fps_num, video.fps_den), (30000, 1001));
        assert_eq!(video.bitrate, 2_000_000);
        assert!(video.fps().is_some());

        let audio = &info.streams[1];
        assert_eq!(audio.sample_rate, 48000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.fps(), None);
    }

    #[test]
    fn skills_encoder_lookup() {
        let skills: Skills = serde_json::from_value(json!({
            "ffmpeg": { "version": "6.1.1" },
            "hwaccels": [{ "id": "vaapi", "name": "VAAPI" }],
            "codecs": {
                "video": [
                    { "id": "h264", "name": "H.264", "encoders": ["libx264", "h264_vaapi"], "decoders": ["h264"] }
                ],
                "audio": [
                    { "id": "aac", "name": "AAC", "encoders": ["aac"], "decoders": ["aac"] }
                ]
            }
        }))
        .unwrap();
        assert_eq!(skills.ffmpeg.version, "6.1.1");
        assert_eq!(
            skills.encoders(CodecKind::Video).collect::<Vec<_>>(),
            vec!["libx264", "h264_vaapi"]
        );
        assert!(skills.has_encoder("aac"));
        assert!(!skills.has_encoder("libvpx"));
        assert!(skills.has_hwaccel("vaapi"));
        assert!(skills.codecs(CodecKind::Subtitle).is_empty());
    }

    #[test]
    fn skills_tolerate_misshapen_sections() {
        let skills: Skills = serde_json::from_value(json!({
            "ffmpeg": "6.1.1",
            "codecs": null,
            "formats": [],
            "protocols": { "input": [{ "id": "rtmp", "name": "rtmp" }] }
        }))
        .unwrap();
        assert_eq!(skills.ffmpeg, FfmpegInfo::default());
        assert_eq!(skills.codecs, Codecs::default());
        assert_eq!(skills.formats, Formats::default());
        assert_eq!(skills.protocols.input.len(), 1);
    }

    #[test]
    fn skills_prefer_canonical_names_over_old_spellings() {
        let skills: Skills = serde_json::from_value(json!({
            "ffmpeg": {
                "version": "6.1.1",
                "libs": [{ "name": "avcodec" }],
                "libraries": [{ "name": "avcodec" }, { "name": "avformat" }]
            },
            "filters": [{ "id": "scale" }],
            "filter": [{ "id": "scale" }, { "id": "pad" }]
        }))
        .unwrap();
        assert_eq!(skills.ffmpeg.libs.len(), 1);
        assert_eq!(skills.filters.len(), 1);

        let skills: Skills = serde_json::from_value(json!({
            "ffmpeg": { "libraries": [{ "name": "avcodec" }] },
            "filter": [{ "id": "scale" }]
        }))
        .unwrap();
        assert_eq!(skills.ffmpeg.libs[0].name, "avcodec");
        assert_eq!(skills.filters[0].id, "scale");
    }

    #[test]
    fn process_with_both_spellings_keeps_the_short_one() {
        let p: Process = serde_json::from_value(json!({
            "id": "p1",
            "memory": 10,
            "memory_bytes": 20,
            "uptime": 5,
            "uptime_seconds": 6
        }))
        .unwrap();
        assert_eq!(p.id, "p1");
        assert_eq!(p.memory, 10);
        assert_eq!(p.uptime, 5);
    }

    #[test]
    fn process_accepts_memory_alias() {
        let p: Process = serde_json::from_value(json!({
            "id": "restream-1",
            "memory_bytes": 1024,
            "uptime": 12.9
        }))
        .unwrap();
        assert_eq!(p.memory, 1024);
        assert_eq!(p.uptime, 12);
        assert_eq!(p.state, "");
    }
}
