use futures_channel::oneshot;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Logical sound effects. The embedder maps them to audio data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundName {
    TileReveal,
    Flag,
    Unflag,
    Pop,
    Victory,
    Defeat,
    RetryPress,
    Retry,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub name: SoundName,
    pub volume: f64,
}

/// Requests kept for an embedder that drains late. Older ones are dropped.
pub const OUTBOX_CAPACITY: usize = 64;

/// Play-once requests collected during a tick and drained by the embedder.
#[derive(Clone, Debug, Default)]
pub struct SoundQueue {
    outbox: Vec<SoundRequest>,
    played_this_tick: SmallVec<[SoundName; 4]>,
}

impl SoundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self, name: SoundName, volume: f64) {
        log::trace!("sound {:?} at {}", name, volume);
        if self.outbox.len() >= OUTBOX_CAPACITY {
            let stale = self.outbox.remove(0);
            log::trace!("sound outbox full, dropped {:?}", stale.name);
        }
        self.outbox.push(SoundRequest { name, volume });
    }

    /// Plays `name` at most once per tick, so a cluster of changes made in a
    /// single tick sounds once.
    pub fn play_once_per_tick(&mut self, name: SoundName, volume: f64) {
        if self.played_this_tick.contains(&name) {
            return;
        }
        self.played_this_tick.push(name);
        self.play(name, volume);
    }

    /// Call at the start of every tick.
    pub fn begin_tick(&mut self) {
        self.played_this_tick.clear();
    }

    pub fn pending(&self) -> &[SoundRequest] {
        &self.outbox
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, SoundRequest> {
        self.outbox.drain(..)
    }

    pub fn clear(&mut self) {
        self.outbox.clear();
    }
}

/// Readiness of the audio backend, which finishes initialising on another
/// task. Requests made before it is ready are dropped.
#[derive(Debug)]
pub struct AudioGate {
    ready: bool,
    signal: Option<oneshot::Receiver<()>>,
}

impl AudioGate {
    /// A gate that opens once the paired sender fires.
    pub fn pending() -> (oneshot::Sender<()>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                ready: false,
                signal: Some(receiver),
            },
        )
    }

    pub fn ready() -> Self {
        Self {
            ready: true,
            signal: None,
        }
    }

    /// Polls the readiness signal without blocking.
    pub fn poll(&mut self) -> bool {
        if let Some(signal) = &mut self.signal {
            match signal.try_recv() {
                Ok(Some(())) => {
                    log::info!("Audio is ready");
                    self.ready = true;
                    self.signal = None;
                }
                Ok(None) => {}
                Err(oneshot::Canceled) => {
                    log::warn!("Audio backend went away before becoming ready, sound disabled");
                    self.signal = None;
                }
            }
        }
        self.ready
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Default for AudioGate {
    fn default() -> Self {
        Self::ready()
    }
}
