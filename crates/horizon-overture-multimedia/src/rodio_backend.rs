//! Media backend built on `rodio`.
//!
//! Each opened track fetches its resource on a short-lived loader thread
//! (local files are read from disk, `http(s)` URLs are downloaded) and hands
//! the bytes back over a channel. The track reports [`LoadStatus::Ready`]
//! once the bytes have been decoded into a paused sink, which means the whole
//! resource is in memory and playback can run through without stalling.
//!
//! # Example
//!
//! ```ignore
//! use horizon_overture_multimedia::{AudioEngine, EngineConfig, RodioBackend};
//!
//! let backend = RodioBackend::new()?.with_base_dir("public");
//! let mut engine = AudioEngine::new(backend, EngineConfig::default());
//! ```

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use url::Url;

use horizon_overture_core::logging::targets;

use crate::backend::{LoadStatus, MediaBackend, MediaTrack};
use crate::error::{MultimediaError, Result};

/// Where a source URI points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
}

/// Classify a source URI, resolving relative paths against `base_dir`.
pub(crate) fn resolve_source(source: &str, base_dir: Option<&Path>) -> Result<SourceLocation> {
    match Url::parse(source) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(SourceLocation::Remote(url)),
            "file" => url
                .to_file_path()
                .map(SourceLocation::Local)
                .map_err(|()| MultimediaError::AudioLoad(format!("invalid file URI: {source}"))),
            // A Windows drive letter parses as a one-letter scheme.
            scheme if scheme.len() == 1 => Ok(SourceLocation::Local(PathBuf::from(source))),
            scheme => Err(MultimediaError::AudioLoad(format!(
                "unsupported scheme '{scheme}' in {source}"
            ))),
        },
        Err(_) => {
            let path = match base_dir {
                Some(base) => base.join(source.trim_start_matches('/')),
                None => PathBuf::from(source),
            };
            Ok(SourceLocation::Local(path))
        }
    }
}

fn fetch(location: &SourceLocation) -> Result<Vec<u8>> {
    match location {
        SourceLocation::Remote(url) => {
            let response = reqwest::blocking::get(url.clone())?.error_for_status()?;
            Ok(response.bytes()?.to_vec())
        }
        SourceLocation::Local(path) => Ok(std::fs::read(path)?),
    }
}

/// A media backend that plays through the default audio output device.
pub struct RodioBackend {
    /// The output stream (must be kept alive for audio to play).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    base_dir: Option<PathBuf>,
}

impl RodioBackend {
    /// Open the default output device.
    ///
    /// Returns an error if no audio output device is available.
    pub fn new() -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            stream_handle,
            base_dir: None,
        })
    }

    /// Resolve relative and root-relative source paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RodioBackend")
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

impl MediaBackend for RodioBackend {
    type Track = RodioTrack;

    fn open(&mut self, source: &str) -> Result<RodioTrack> {
        let location = resolve_source(source, self.base_dir.as_deref())?;
        let (tx, rx) = crossbeam_channel::bounded(1);

        std::thread::Builder::new()
            .name("overture-audio-loader".into())
            .spawn(move || {
                let _ = tx.send(fetch(&location));
            })?;

        tracing::debug!(target: targets::MEDIA_BACKEND, source, "loading audio");

        Ok(RodioTrack {
            source: source.to_string(),
            stream_handle: self.stream_handle.clone(),
            loader: Some(rx),
            sink: None,
            volume: 0.0,
        })
    }
}

/// A track played through a rodio [`Sink`].
pub struct RodioTrack {
    source: String,
    stream_handle: OutputStreamHandle,
    loader: Option<Receiver<Result<Vec<u8>>>>,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioTrack {
    fn install(&mut self, bytes: Vec<u8>) -> Result<()> {
        let decoder = Decoder::new(Cursor::new(bytes))?;
        let sink = Sink::try_new(&self.stream_handle)?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(decoder);
        self.sink = Some(sink);
        Ok(())
    }

    fn sink(&self) -> Result<&Sink> {
        self.sink
            .as_ref()
            .ok_or_else(|| MultimediaError::Playback(format!("{} is not loaded", self.source)))
    }
}

impl MediaTrack for RodioTrack {
    fn poll_load(&mut self) -> LoadStatus {
        if self.sink.is_some() {
            return LoadStatus::Ready;
        }
        let Some(loader) = &self.loader else {
            return LoadStatus::Failed(MultimediaError::AudioLoad(format!(
                "{} failed to load",
                self.source
            )));
        };

        let received = loader.try_recv();
        match received {
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                self.loader = None;
                LoadStatus::Failed(MultimediaError::AudioLoad(format!(
                    "loader for {} exited",
                    self.source
                )))
            }
            Ok(fetched) => {
                self.loader = None;
                match fetched.and_then(|bytes| self.install(bytes)) {
                    Ok(()) => LoadStatus::Ready,
                    Err(err) => LoadStatus::Failed(err),
                }
            }
        }
    }

    fn play(&mut self) -> Result<()> {
        self.sink()?.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink()?.try_seek(position)?;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

impl Drop for RodioTrack {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_remote() {
        let location = resolve_source("https://cdn.example.com/a.mp3", None).unwrap();
        assert!(matches!(location, SourceLocation::Remote(url) if url.host_str() == Some("cdn.example.com")));
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let location = resolve_source("/audio/intro.mp3", Some(Path::new("public"))).unwrap();
        assert_eq!(
            location,
            SourceLocation::Local(PathBuf::from("public").join("audio/intro.mp3"))
        );

        let location = resolve_source("audio/intro.mp3", None).unwrap();
        assert_eq!(location, SourceLocation::Local(PathBuf::from("audio/intro.mp3")));
    }

    #[test]
    fn test_resolve_rejects_unknown_scheme() {
        assert!(matches!(
            resolve_source("ftp://example.com/a.mp3", None),
            Err(MultimediaError::AudioLoad(_))
        ));
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let bytes = fetch(&SourceLocation::Local(path)).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = fetch(&SourceLocation::Local(dir.path().join("missing.mp3")));
        assert!(matches!(result, Err(MultimediaError::Io(_))));
    }

    #[test]
    fn test_undecodable_file_fails_to_load() {
        // May fail in CI environments without audio hardware
        let Ok(mut backend) = RodioBackend::new() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let mut track = backend.open(path.to_str().unwrap()).unwrap();
        let status = loop {
            match track.poll_load() {
                LoadStatus::Pending => std::thread::sleep(Duration::from_millis(5)),
                other => break other,
            }
        };
        assert!(matches!(status, LoadStatus::Failed(MultimediaError::AudioLoad(_))));
    }
}
