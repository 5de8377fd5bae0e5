use std::{
    fmt,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use log::{info, warn};

use devlink_shared::constants::NOISE_PSK_SIZE;

use crate::{PskError, PskStoreError};

/// A Noise pre-shared key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoisePsk([u8; NOISE_PSK_SIZE]);

impl NoisePsk {
    pub fn new(bytes: [u8; NOISE_PSK_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NOISE_PSK_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for NoisePsk {
    type Error = PskError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; NOISE_PSK_SIZE] = bytes
            .try_into()
            .map_err(|_| PskError::InvalidLength { len: bytes.len() })?;
        Ok(Self(key))
    }
}

// keys never end up in logs
impl fmt::Debug for NoisePsk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoisePsk(..)")
    }
}

/// Persistent storage for the active key
pub trait PskStore {
    fn load(&mut self) -> Result<Option<NoisePsk>, PskStoreError>;

    fn save(&mut self, psk: &NoisePsk) -> Result<(), PskStoreError>;
}

/// Keeps the key in memory. Clones share the same slot, so a test can hold
/// on to one and inspect what the server saved.
#[derive(Clone, Default)]
pub struct MemoryPskStore {
    slot: Arc<Mutex<Option<NoisePsk>>>,
    fail_saves: Arc<Mutex<bool>>,
}

impl MemoryPskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Option<NoisePsk> {
        self.slot.lock().ok().and_then(|slot| *slot)
    }

    /// Makes every later save fail, as a full or worn-out flash would
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_saves.lock() {
            *flag = fail;
        }
    }
}

impl PskStore for MemoryPskStore {
    fn load(&mut self) -> Result<Option<NoisePsk>, PskStoreError> {
        self.slot
            .lock()
            .map(|slot| *slot)
            .map_err(|_| PskStoreError::Load {
                reason: "store lock poisoned".to_string(),
            })
    }

    fn save(&mut self, psk: &NoisePsk) -> Result<(), PskStoreError> {
        let failing = self.fail_saves.lock().map(|flag| *flag).unwrap_or(true);
        if failing {
            return Err(PskStoreError::Save {
                reason: "store rejected write".to_string(),
            });
        }
        let mut slot = self.slot.lock().map_err(|_| PskStoreError::Save {
            reason: "store lock poisoned".to_string(),
        })?;
        *slot = Some(*psk);
        Ok(())
    }
}

/// Owns the active pre-shared key and the pending switch to a new one
pub struct PskManager {
    store: Option<Box<dyn PskStore>>,
    active: Option<NoisePsk>,
    pending: Option<(NoisePsk, Instant)>,
    activation_delay: Duration,
}

impl PskManager {
    pub fn new(activation_delay: Duration) -> Self {
        Self {
            store: None,
            active: None,
            pending: None,
            activation_delay,
        }
    }

    /// Installs `store` and adopts the key it holds, if any
    pub fn set_store(&mut self, mut store: Box<dyn PskStore>) -> Result<(), PskStoreError> {
        let stored = store.load()?;
        self.store = Some(store);
        if stored.is_some() {
            self.active = stored;
        }
        Ok(())
    }

    /// Whether keys can be changed at all
    pub fn is_supported(&self) -> bool {
        self.store.is_some()
    }

    pub fn active(&self) -> Option<&NoisePsk> {
        self.active.as_ref()
    }

    pub fn has_pending_activation(&self) -> bool {
        self.pending.is_some()
    }

    /// Persists `psk` and, with `make_active`, schedules the switch to it.
    ///
    /// Saving the key that is already active changes nothing. Nothing is
    /// switched if persisting fails.
    pub fn save_noise_psk(
        &mut self,
        psk: NoisePsk,
        make_active: bool,
        now: Instant,
    ) -> Result<(), PskError> {
        if self.active == Some(psk) {
            info!("New Noise PSK matches the active one, nothing to do");
            return Ok(());
        }
        let Some(store) = self.store.as_mut() else {
            warn!("Cannot change Noise PSK: no store configured");
            return Err(PskError::NoStore);
        };
        if let Err(error) = store.save(&psk) {
            warn!("Failed to save Noise PSK: {}", error);
            return Err(error.into());
        }
        info!("Noise PSK saved");
        if make_active {
            self.pending = Some((psk, now + self.activation_delay));
        }
        Ok(())
    }

    /// Switches to the pending key once its grace period is over. Returns
    /// `true` when it did, at which point every client must reconnect.
    pub fn apply_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some((psk, due)) if now >= due => {
                self.active = Some(psk);
                self.pending = None;
                info!("Noise PSK activated, disconnecting clients");
                true
            }
            _ => false,
        }
    }
}
