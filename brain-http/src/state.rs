//! Shared application state threaded through every route.

use std::collections::HashMap;
use std::sync::Arc;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use brain_proto::hook::Hook;
use brain_proto::{StateStore, Turn};
use brain_store::Store;
use rand::RngCore;

use crate::error::ApiError;

/// Everything a route handler needs: the store, the memory service, the
/// agent loop, the secrets cipher, and the bearer token it must be
/// presented with.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: Store,
    memory: brain_memory::MemoryService,
    turn: Arc<dyn Turn>,
    state_store: Arc<dyn StateStore>,
    schedules: Arc<brain_schedule::ScheduleManager>,
    bearer_token: String,
    cipher: Aes256Gcm,
    hooks: HashMap<String, Arc<dyn Hook>>,
}

impl AppState {
    /// Build application state. `secret_key` must be 32 bytes — the
    /// AES-256-GCM key used to encrypt secret values at rest.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Store,
        memory: brain_memory::MemoryService,
        turn: Arc<dyn Turn>,
        state_store: Arc<dyn StateStore>,
        schedules: Arc<brain_schedule::ScheduleManager>,
        bearer_token: impl Into<String>,
        secret_key: &[u8; 32],
        hooks: HashMap<String, Arc<dyn Hook>>,
    ) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(secret_key));
        Self {
            inner: Arc::new(Inner {
                store,
                memory,
                turn,
                state_store,
                schedules,
                bearer_token: bearer_token.into(),
                cipher,
                hooks,
            }),
        }
    }

    /// The state store.
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The memory service.
    pub fn memory(&self) -> &brain_memory::MemoryService {
        &self.inner.memory
    }

    /// The agent loop, behind the object-safe `Turn` boundary.
    pub fn turn(&self) -> &Arc<dyn Turn> {
        &self.inner.turn
    }

    /// The same scoped key/value store backing the turn's (read-only)
    /// `StateReader` — the caller's handle for applying
    /// `TurnOutput::effects` after a turn completes.
    pub fn state_store(&self) -> &Arc<dyn StateStore> {
        &self.inner.state_store
    }

    /// The schedule manager.
    pub fn schedules(&self) -> &brain_schedule::ScheduleManager {
        &self.inner.schedules
    }

    /// The bearer token this instance requires.
    pub fn bearer_token(&self) -> &str {
        &self.inner.bearer_token
    }

    /// Plugin name -> hook, for `POST /hooks/:plugin` forwarding.
    pub fn hook(&self, plugin: &str) -> Option<Arc<dyn Hook>> {
        self.inner.hooks.get(plugin).cloned()
    }

    /// Encrypt a secret value for storage. Nonce is prepended to the
    /// ciphertext so [`Self::decrypt_secret`] is self-contained.
    pub fn encrypt_secret(&self, plaintext: &str) -> Result<Vec<u8>, ApiError> {
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .inner
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| ApiError::Internal("secret encryption failed".into()))?;
        let mut out = nonce_bytes.to_vec();
        out.extend(ciphertext);
        Ok(out)
    }

    /// Decrypt bytes produced by [`Self::encrypt_secret`].
    pub fn decrypt_secret(&self, stored: &[u8]) -> Result<String, ApiError> {
        if stored.len() < 12 {
            return Err(ApiError::Internal("secret ciphertext truncated".into()));
        }
        let (nonce_bytes, ciphertext) = stored.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .inner
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| ApiError::Internal("secret decryption failed".into()))?;
        String::from_utf8(plaintext)
            .map_err(|_| ApiError::Internal("decrypted secret was not utf-8".into()))
    }
}
