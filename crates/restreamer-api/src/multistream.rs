// Multistream orchestration
//
// Fans one input out to several streaming platforms through a single
// daemon process. Destination `i` is the process output
// `<platform>_<i>`, so destinations can be attached, retargeted or
// detached while the process runs. Stream keys stay out of logs.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::client::RestreamerClient;
use crate::error::Error;
use crate::models::NewProcess;

/// Frame orientation of the source or of a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Orientation {
    #[default]
    Auto,
    Horizontal,
    Vertical,
    Square,
}

impl Orientation {
    /// Classify a frame size. Ratios within 0.05 of 1:1 are square; a
    /// zero dimension gives `Auto`.
    pub fn detect(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::Auto;
        }
        let ratio = f64::from(width) / f64::from(height);
        if (ratio - 1.0).abs() < 0.05 {
            Self::Square
        } else if ratio < 1.0 {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }
}

/// FFmpeg video filter reframing `source` for a `target` destination, or
/// `None` when the frame passes through unchanged.
pub fn video_filter(source: Orientation, target: Orientation) -> Option<&'static str> {
    use Orientation::{Horizontal, Square, Vertical};

    match (source, target) {
        (s, t) if s == t => None,
        (Horizontal, Vertical) => Some("crop=ih*9/16:ih,scale=1080:1920"),
        (Vertical, Horizontal) => Some("crop=iw:iw*9/16,scale=1920:1080"),
        (Square, Horizontal) => Some("scale=1920:1080,setsar=1"),
        (Square, Vertical) => Some("scale=1080:1920,setsar=1"),
        (_, Square) => Some("scale=1080:1080,setsar=1"),
        _ => None,
    }
}

/// Streaming platform with a well-known ingest endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Twitch,
    YouTube,
    Facebook,
    Kick,
    TikTok,
    Instagram,
    #[strum(to_string = "x", serialize = "twitter")]
    X,
    Custom,
}

impl Platform {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Twitch => "Twitch",
            Self::YouTube => "YouTube",
            Self::Facebook => "Facebook",
            Self::Kick => "Kick",
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
            Self::X => "X (Twitter)",
            Self::Custom => "Custom",
        }
    }

    /// Ingest URL for this platform. `Auto` picks the horizontal endpoint;
    /// `Custom` has none.
    pub fn ingest_url(self, orientation: Orientation) -> &'static str {
        match self {
            Self::Twitch => "rtmp://live.twitch.tv/app",
            Self::YouTube => "rtmp://a.rtmp.youtube.com/live2",
            Self::Facebook => "rtmps://live-api-s.facebook.com:443/rtmp",
            Self::Kick => "rtmp://stream.kick.com/app",
            Self::TikTok if orientation == Orientation::Vertical => {
                "rtmp://live.tiktok.com/live"
            }
            Self::TikTok => "rtmp://live.tiktok.com/live/horizontal",
            Self::Instagram => "rtmps://live-upload.instagram.com:443/rtmp",
            Self::X => "rtmp://ingest.pscp.tv:80/x",
            Self::Custom => "",
        }
    }
}

/// One publish target.
#[derive(Debug, Clone)]
pub struct Destination {
    pub platform: Platform,
    pub ingest_url: String,
    stream_key: SecretString,
    pub orientation: Orientation,
    pub enabled: bool,
}

impl Destination {
    /// Destination on a known platform. The stream key is required.
    pub fn new(
        platform: Platform,
        stream_key: impl Into<String>,
        orientation: Orientation,
    ) -> Result<Self, Error> {
        if platform == Platform::Custom {
            return Err(Error::InvalidArgument(
                "custom destinations need an ingest URL".into(),
            ));
        }
        let stream_key = stream_key.into();
        if stream_key.is_empty() {
            return Err(Error::InvalidArgument("stream key is required".into()));
        }
        Ok(Self {
            platform,
            ingest_url: platform.ingest_url(orientation).to_owned(),
            stream_key: SecretString::from(stream_key),
            orientation,
            enabled: true,
        })
    }

    /// Destination with an explicit ingest URL. An empty key publishes to
    /// the URL as given.
    pub fn custom(
        ingest_url: impl Into<String>,
        stream_key: impl Into<String>,
        orientation: Orientation,
    ) -> Result<Self, Error> {
        let ingest_url = ingest_url.into();
        if ingest_url.trim().is_empty() {
            return Err(Error::InvalidArgument("ingest URL is required".into()));
        }
        Ok(Self {
            platform: Platform::Custom,
            ingest_url,
            stream_key: SecretString::from(stream_key.into()),
            orientation,
            enabled: true,
        })
    }

    pub fn set_stream_key(&mut self, stream_key: impl Into<String>) {
        self.stream_key = SecretString::from(stream_key.into());
    }

    /// Full publish URL. Contains the stream key.
    pub fn publish_url(&self) -> String {
        let key = self.stream_key.expose_secret();
        if key.is_empty() {
            self.ingest_url.clone()
        } else {
            format!("{}/{key}", self.ingest_url.trim_end_matches('/'))
        }
    }

    /// Process output id for the destination at `index`.
    pub fn output_id(&self, index: usize) -> String {
        format!("{}_{index}", self.platform)
    }
}

/// A set of destinations fed from one input by one process.
#[derive(Debug, Clone)]
pub struct Multistream {
    pub destinations: Vec<Destination>,
    pub source_orientation: Orientation,
    pub auto_detect_orientation: bool,
    reference: Option<String>,
}

impl Default for Multistream {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            source_orientation: Orientation::Auto,
            auto_detect_orientation: true,
            reference: None,
        }
    }
}

impl Multistream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a process that is already running under `reference`.
    pub fn with_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Self::default()
        }
    }

    /// Reference of the process this set runs as, once started.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Append a destination and return its index.
    pub fn add_destination(&mut self, destination: Destination) -> usize {
        self.destinations.push(destination);
        self.destinations.len() - 1
    }

    pub fn remove_destination(&mut self, index: usize) -> Option<Destination> {
        (index < self.destinations.len()).then(|| self.destinations.remove(index))
    }

    /// Record the source frame size. Ignored unless auto-detection is on.
    pub fn detect_source(&mut self, width: u32, height: u32) {
        if self.auto_detect_orientation {
            self.source_orientation = Orientation::detect(width, height);
        }
    }

    /// Process parameters publishing `input_url` to every enabled
    /// destination. Assigns a `multistream_<millis>` reference when none
    /// is set yet.
    pub fn new_process(&mut self, input_url: &str) -> Result<NewProcess, Error> {
        if self.destinations.is_empty() {
            return Err(Error::InvalidArgument("no destinations configured".into()));
        }
        let output_urls: Vec<String> = self
            .destinations
            .iter()
            .filter(|d| d.enabled)
            .map(Destination::publish_url)
            .collect();
        if output_urls.is_empty() {
            return Err(Error::InvalidArgument("no destinations are enabled".into()));
        }
        let reference = self
            .reference
            .get_or_insert_with(|| format!("multistream_{}", Utc::now().timestamp_millis()))
            .clone();
        Ok(NewProcess {
            reference,
            input_url: input_url.to_owned(),
            output_urls,
            video_filter: None,
        })
    }

    // ── Daemon operations ────────────────────────────────────────────

    /// Create the process publishing to every enabled destination.
    pub async fn start(
        &mut self,
        client: &mut RestreamerClient,
        input_url: &str,
    ) -> Result<(), Error> {
        let params = match self.new_process(input_url) {
            Ok(params) => params,
            Err(e) => return client.fail(e),
        };
        client.create_process(&params).await?;
        info!(
            reference = %params.reference,
            destinations = params.output_urls.len(),
            "multistream started"
        );
        Ok(())
    }

    /// Stop the process running under this set's reference.
    pub async fn stop(&self, client: &mut RestreamerClient) -> Result<(), Error> {
        let process_id = self.process_id(client).await?;
        client.stop_process(&process_id).await?;
        info!(process_id, "multistream stopped");
        Ok(())
    }

    /// Whether the process exists and is running. An unknown reference
    /// reads as inactive.
    pub async fn is_active(&self, client: &mut RestreamerClient) -> Result<bool, Error> {
        let Some(reference) = self.reference.as_deref() else {
            return Ok(false);
        };
        match client.find_process_by_reference(reference).await {
            Ok(process) => Ok(process.state == "running"),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Attach destination `index` to the running process, reframed from
    /// the source orientation when needed.
    pub async fn add_destination_live(
        &mut self,
        client: &mut RestreamerClient,
        index: usize,
    ) -> Result<(), Error> {
        let (output_id, url, filter) = self.live_output(client, index)?;
        let process_id = self.process_id(client).await?;
        client
            .add_process_output(&process_id, &output_id, &url, filter)
            .await?;
        self.set_enabled(index, true);
        debug!(process_id, output_id, "destination attached");
        Ok(())
    }

    /// Detach destination `index` from the running process.
    pub async fn remove_destination_live(
        &mut self,
        client: &mut RestreamerClient,
        index: usize,
    ) -> Result<(), Error> {
        let (output_id, _, _) = self.live_output(client, index)?;
        let process_id = self.process_id(client).await?;
        client.remove_process_output(&process_id, &output_id).await?;
        self.set_enabled(index, false);
        debug!(process_id, output_id, "destination detached");
        Ok(())
    }

    /// Attach or detach destination `index`. No request is made when it
    /// is already in the wanted state.
    pub async fn set_destination_enabled_live(
        &mut self,
        client: &mut RestreamerClient,
        index: usize,
        enabled: bool,
    ) -> Result<(), Error> {
        let current = match self.destinations.get(index) {
            Some(d) => d.enabled,
            None => return client.fail(out_of_range(index)),
        };
        if current == enabled {
            return Ok(());
        }
        if enabled {
            self.add_destination_live(client, index).await
        } else {
            self.remove_destination_live(client, index).await
        }
    }

    /// Replace the stream key of destination `index` and retarget its
    /// output on the running process.
    pub async fn update_destination_live(
        &mut self,
        client: &mut RestreamerClient,
        index: usize,
        stream_key: impl Into<String>,
    ) -> Result<(), Error> {
        let Some(destination) = self.destinations.get_mut(index) else {
            return client.fail(out_of_range(index));
        };
        destination.set_stream_key(stream_key);
        let (output_id, url, filter) = self.live_output(client, index)?;
        let process_id = self.process_id(client).await?;
        client
            .update_process_output(&process_id, &output_id, Some(&url), filter)
            .await?;
        debug!(process_id, output_id, "destination updated");
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Output id, publish URL and filter for destination `index`.
    fn live_output(
        &self,
        client: &mut RestreamerClient,
        index: usize,
    ) -> Result<(String, String, Option<&'static str>), Error> {
        match self.destinations.get(index) {
            Some(d) => Ok((
                d.output_id(index),
                d.publish_url(),
                video_filter(self.source_orientation, d.orientation),
            )),
            None => client.fail(out_of_range(index)),
        }
    }

    async fn process_id(&self, client: &mut RestreamerClient) -> Result<String, Error> {
        let Some(reference) = self.reference.as_deref() else {
            return client.invalid("multistream has not been started");
        };
        Ok(client.find_process_by_reference(reference).await?.id)
    }

    fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(d) = self.destinations.get_mut(index) {
            d.enabled = enabled;
        }
    }
}

fn out_of_range(index: usize) -> Error {
    Error::InvalidArgument(format!("no destination at index {index}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn orientation_follows_the_aspect_ratio() {
        assert_eq!(Orientation::detect(1920, 1080), Orientation::Horizontal);
        assert_eq!(Orientation::detect(1080, 1920), Orientation::Vertical);
        assert_eq!(Orientation::detect(1080, 1080), Orientation::Square);
        assert_eq!(Orientation::detect(1000, 1040), Orientation::Square);
        assert_eq!(Orientation::detect(0, 1080), Orientation::Auto);
    }

    #[test]
    fn filters_reframe_only_across_orientations() {
        use Orientation::{Auto, Horizontal, Square, Vertical};

        assert_eq!(video_filter(Horizontal, Horizontal), None);
        assert_eq!(
            video_filter(Horizontal, Vertical),
            Some("crop=ih*9/16:ih,scale=1080:1920")
        );
        assert_eq!(
            video_filter(Vertical, Horizontal),
            Some("crop=iw:iw*9/16,scale=1920:1080")
        );
        assert_eq!(video_filter(Square, Vertical), Some("scale=1080:1920,setsar=1"));
        assert_eq!(video_filter(Vertical, Square), Some("scale=1080:1080,setsar=1"));
        assert_eq!(video_filter(Auto, Vertical), None);
        assert_eq!(video_filter(Horizontal, Auto), None);
    }

    #[test]
    fn tiktok_ingest_depends_on_orientation() {
        assert_eq!(
            Platform::TikTok.ingest_url(Orientation::Vertical),
            "rtmp://live.tiktok.com/live"
        );
        assert_eq!(
            Platform::TikTok.ingest_url(Orientation::Auto),
            "rtmp://live.tiktok.com/live/horizontal"
        );
    }

    #[test]
    fn platforms_parse_from_their_keys() {
        assert_eq!("youtube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!("Twitter".parse::<Platform>().unwrap(), Platform::X);
        assert_eq!(Platform::X.to_string(), "x");
        assert_eq!(Platform::X.display_name(), "X (Twitter)");
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn publish_urls_join_ingest_and_key() {
        let twitch = Destination::new(Platform::Twitch, "k1", Orientation::Auto).unwrap();
        assert_eq!(twitch.publish_url(), "rtmp://live.twitch.tv/app/k1");
        assert_eq!(twitch.output_id(2), "twitch_2");

        let bare = Destination::custom("rtmp://relay.local/live/", "", Orientation::Auto).unwrap();
        assert_eq!(bare.publish_url(), "rtmp://relay.local/live/");
        let keyed = Destination::custom("rtmp://relay.local/live/", "k", Orientation::Auto).unwrap();
        assert_eq!(keyed.publish_url(), "rtmp://relay.local/live/k");
    }

    #[test]
    fn destinations_reject_missing_keys_and_urls() {
        let err = Destination::new(Platform::Kick, "", Orientation::Auto).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(Destination::new(Platform::Custom, "k", Orientation::Auto).is_err());
        assert!(Destination::custom(" ", "k", Orientation::Auto).is_err());
    }

    #[test]
    fn stream_keys_stay_out_of_debug_output() {
        let d = Destination::new(Platform::Twitch, "hunter2", Orientation::Auto).unwrap();
        assert!(!format!("{d:?}").contains("hunter2"));
    }

    #[test]
    fn new_process_publishes_enabled_destinations() {
        let mut set = Multistream::new();
        set.add_destination(Destination::new(Platform::Twitch, "a", Orientation::Auto).unwrap());
        let idx = set
            .add_destination(Destination::new(Platform::YouTube, "b", Orientation::Auto).unwrap());
        set.destinations[idx].enabled = false;

        let params = set.new_process("rtmp://localhost/live/obs").unwrap();
        assert_eq!(params.output_urls, vec!["rtmp://live.twitch.tv/app/a"]);
        assert_eq!(params.video_filter, None);
        assert!(params.reference.starts_with("multistream_"));
        assert_eq!(set.reference(), Some(params.reference.as_str()));

        let again = set.new_process("rtmp://localhost/live/obs").unwrap();
        assert_eq!(again.reference, params.reference);
    }

    #[test]
    fn new_process_needs_an_enabled_destination() {
        let mut set = Multistream::new();
        assert!(set.new_process("rtmp://in").is_err());

        set.add_destination(Destination::new(Platform::Kick, "k", Orientation::Auto).unwrap());
        set.destinations[0].enabled = false;
        assert!(set.new_process("rtmp://in").is_err());
        assert_eq!(set.reference(), None);
    }

    #[test]
    fn source_detection_respects_the_toggle() {
        let mut set = Multistream::new();
        set.detect_source(1080, 1920);
        assert_eq!(set.source_orientation, Orientation::Vertical);

        set.auto_detect_orientation = false;
        set.detect_source(1920, 1080);
        assert_eq!(set.source_orientation, Orientation::Vertical);
    }

    #[test]
    fn removing_out_of_range_is_none() {
        let mut set = Multistream::new();
        assert!(set.remove_destination(0).is_none());
    }
}
