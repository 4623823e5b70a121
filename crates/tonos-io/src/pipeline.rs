//! Buffered playback through a rotating pool of sample buffers.
//!
//! Rendering happens on a dedicated producer thread, never in the device
//! callback. A fixed pool of buffers circulates between the two sides over
//! a pair of bounded channels: the producer blocks waiting for a spent
//! buffer, fills it, and hands it back; the callback only ever does
//! `try_recv`/`try_send`, so the audio thread cannot block or allocate.
//! When the producer falls behind, the callback plays silence and counts
//! an underrun rather than stalling the device.
//!
//! Parameter changes travel on a third channel and are applied by the
//! producer between buffers, which keeps every change taking effect on a
//! buffer boundary at worst a pool's worth of audio after it was sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};

use crate::stream::{device_name, find_output_device};
use crate::{Error, Result};

/// How long the producer waits for a spent buffer before rechecking the
/// stop flag.
const FREE_POLL: Duration = Duration::from_millis(50);

/// Playback pipeline configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per rotating buffer.
    pub buffer_size: u32,
    /// Number of rotating buffers in the pool.
    pub buffer_count: usize,
    /// Output channel count. Mono content is duplicated across channels.
    pub channels: u16,
    /// Output device selector: index, exact name or partial name.
    /// `None` uses the system default output.
    pub device: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            buffer_size: 1000,
            buffer_count: 3,
            channels: 1,
            device: None,
        }
    }
}

impl EngineConfig {
    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample rate must be positive".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer size must be positive".into()));
        }
        if self.buffer_count < 2 {
            return Err(Error::Config(
                "buffer pool needs at least two buffers".into(),
            ));
        }
        if self.channels == 0 {
            return Err(Error::Config("channel count must be positive".into()));
        }
        Ok(())
    }
}

/// A mono sample generator driven by the producer thread.
pub trait SampleSource: Send + 'static {
    /// Parameter-change message applied between buffers.
    type Command: Send + 'static;

    /// Applies one queued parameter change.
    fn apply(&mut self, command: Self::Command);

    /// Renders the next samples into `buffer`, overwriting it completely.
    fn fill(&mut self, buffer: &mut [f32]);
}

/// The producer loop: waits for spent buffers, applies pending commands,
/// refills and hands the buffer back.
///
/// Runs until the stop flag is set or either buffer channel disconnects.
pub fn run_producer<S: SampleSource>(
    mut source: S,
    free: Receiver<Vec<f32>>,
    ready: SyncSender<Vec<f32>>,
    commands: Receiver<S::Command>,
    stop: Arc<AtomicBool>,
) {
    tracing::debug!("producer loop running");
    while !stop.load(Ordering::SeqCst) {
        let mut buffer = match free.recv_timeout(FREE_POLL) {
            Ok(buffer) => buffer,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        while let Ok(command) = commands.try_recv() {
            source.apply(command);
        }

        source.fill(&mut buffer);
        if ready.send(buffer).is_err() {
            break;
        }
    }
    tracing::debug!("producer loop exited");
}

/// Callback-side cursor over the ready buffers.
///
/// Everything here is wait-free: filled buffers arrive over `try_recv`,
/// spent ones leave over `try_send`, and a starved callback writes silence
/// and bumps the underrun counter once.
pub struct Playback {
    ready: Receiver<Vec<f32>>,
    free: SyncSender<Vec<f32>>,
    current: Option<Vec<f32>>,
    cursor: usize,
    channels: usize,
    underruns: Arc<AtomicU64>,
}

impl Playback {
    /// Creates the callback state over the pipeline's buffer channels.
    pub fn new(
        ready: Receiver<Vec<f32>>,
        free: SyncSender<Vec<f32>>,
        channels: u16,
        underruns: Arc<AtomicU64>,
    ) -> Self {
        Self {
            ready,
            free,
            current: None,
            cursor: 0,
            channels: usize::from(channels.max(1)),
            underruns,
        }
    }

    /// Fills one device callback's worth of interleaved output.
    ///
    /// Mono samples are duplicated across all output channels. If the
    /// ready queue runs dry mid-callback the remaining frames are silence,
    /// but each frame still checks for a late buffer so playback resumes
    /// within the same callback when one arrives.
    pub fn write(&mut self, data: &mut [f32]) {
        let mut starved = false;
        for frame in data.chunks_mut(self.channels) {
            let sample = self.next_sample().unwrap_or_else(|| {
                starved = true;
                0.0
            });
            frame.fill(sample);
        }
        if starved {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn next_sample(&mut self) -> Option<f32> {
        loop {
            if let Some(buffer) = self.current.as_ref() {
                if self.cursor < buffer.len() {
                    let sample = buffer[self.cursor];
                    self.cursor += 1;
                    return Some(sample);
                }
                if let Some(spent) = self.current.take() {
                    // The channel capacity equals the pool size, so the
                    // returned buffer always fits.
                    let _ = self.free.try_send(spent);
                }
            }
            match self.ready.try_recv() {
                Ok(buffer) => {
                    self.current = Some(buffer);
                    self.cursor = 0;
                }
                Err(_) => return None,
            }
        }
    }
}

/// A live playback pipeline: producer thread, buffer pool and device
/// stream.
///
/// Dropping the pipeline (or calling [`stop`](Pipeline::stop)) sets the
/// stop flag, joins the producer and then closes the stream, in that
/// order, so the producer is never left blocking on a dead channel.
pub struct Pipeline<S: SampleSource> {
    commands: Sender<S::Command>,
    stop: Arc<AtomicBool>,
    underruns: Arc<AtomicU64>,
    producer: Option<JoinHandle<()>>,
    _stream: cpal::Stream,
}

impl<S: SampleSource> Pipeline<S> {
    /// Opens the output device and starts playback of `source`.
    ///
    /// Every buffer in the pool is filled before the stream opens, so the
    /// device's first callbacks never race the producer thread.
    pub fn start(config: &EngineConfig, mut source: S) -> Result<Self> {
        config.validate()?;

        let host = cpal::default_host();
        let device = find_output_device(&host, config.device.as_deref())?;

        let frames = config.buffer_size as usize;
        let (free_tx, free_rx) = mpsc::sync_channel::<Vec<f32>>(config.buffer_count);
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Vec<f32>>(config.buffer_count);
        let (command_tx, command_rx) = mpsc::channel::<S::Command>();

        for _ in 0..config.buffer_count {
            let mut buffer = vec![0.0f32; frames];
            source.fill(&mut buffer);
            ready_tx
                .send(buffer)
                .map_err(|_| Error::Stream("buffer pool rejected pre-roll".into()))?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let underruns = Arc::new(AtomicU64::new(0));

        let mut playback = Playback::new(
            ready_rx,
            free_tx,
            config.channels,
            Arc::clone(&underruns),
        );
        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    playback.write(data);
                },
                move |err| {
                    tracing::error!(error = %err, "output stream error");
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        let producer = thread::Builder::new().name("tonos-producer".into()).spawn({
            let stop = Arc::clone(&stop);
            move || run_producer(source, free_rx, ready_tx, command_rx, stop)
        })?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %device_name(&device).unwrap_or_else(|_| "<unnamed>".into()),
            sample_rate = config.sample_rate,
            frames,
            buffers = config.buffer_count,
            channels = config.channels,
            "playback pipeline started"
        );

        Ok(Self {
            commands: command_tx,
            stop,
            underruns,
            producer: Some(producer),
            _stream: stream,
        })
    }

    /// Queues a parameter change for the producer thread.
    ///
    /// Changes take effect on the next buffer boundary.
    pub fn send(&self, command: S::Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::Stream("playback pipeline is not running".into()))
    }

    /// Number of device callbacks that ran short of samples so far.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Stops playback and releases the audio device.
    pub fn stop(self) {}
}

impl<S: SampleSource> Drop for Pipeline<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
        let underruns = self.underruns.load(Ordering::Relaxed);
        if underruns > 0 {
            tracing::warn!(underruns, "playback pipeline stopped with underruns");
        } else {
            tracing::info!("playback pipeline stopped");
        }
        // The stream field drops after this body runs, closing the device.
    }
}
