use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use alloy::primitives::{eip191_hash_message, Address, PrimitiveSignature, B256, U256};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use safe_sigverify_core::{
    ParsedSignature, RecoveryPort, SignatureType, SigningError, SIGNATURE_LEN,
};

use crate::codec::classify;
use crate::SigVerifyConfig;

/// `eth_sign` signatures carry `v + 4` to tell them apart from plain ECDSA.
const ETH_SIGN_V_OFFSET: u8 = 4;

pub type CacheKey = [u8; SIGNATURE_LEN + 32];

/// secp256k1 recovery through alloy.
#[derive(Debug, Clone, Copy, Default)]
pub struct K256RecoveryAdapter;

impl RecoveryPort for K256RecoveryAdapter {
    fn recover_address(
        &self,
        r: B256,
        s: B256,
        y_parity: bool,
        prehash: B256,
    ) -> Result<Address, SigningError> {
        let signature =
            PrimitiveSignature::new(U256::from_be_bytes(r.0), U256::from_be_bytes(s.0), y_parity);
        signature
            .recover_address_from_prehash(&prehash)
            .map_err(|e| {
                warn!(error = %e, "ecdsa recovery rejected signature");
                SigningError::RecoveryFailure
            })
    }
}

/// Recovered owners keyed by `signature || hash`.
///
/// Only ever cleared as a whole.
#[derive(Debug, Default)]
pub struct RecoveryCache {
    entries: RwLock<HashMap<CacheKey, Address>>,
}

impl RecoveryCache {
    pub fn key(signature: &ParsedSignature, hash: B256) -> CacheKey {
        let mut key = [0u8; SIGNATURE_LEN + 32];
        key[..SIGNATURE_LEN].copy_from_slice(&signature.to_bytes());
        key[SIGNATURE_LEN..].copy_from_slice(hash.as_slice());
        key
    }

    pub fn get(&self, key: &CacheKey) -> Option<Address> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    pub fn insert(&self, key: CacheKey, owner: Address) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, owner);
    }

    /// Swaps in an empty map and returns how many entries were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *entries).len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the cache every `period` on the current tokio runtime.
    ///
    /// The task only holds a weak reference and ends once the cache is dropped.
    pub fn spawn_reset_task(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let dropped = cache.clear();
                info!(dropped, "cleared recovered owner cache");
            }
        })
    }

    /// Same schedule as [`RecoveryCache::spawn_reset_task`] on a dedicated
    /// thread, for callers outside a tokio runtime. Setting `stop` and
    /// unparking the thread ends it early.
    pub fn spawn_reset_thread(
        self: &Arc<Self>,
        period: Duration,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let cache = Arc::downgrade(self);
        thread::Builder::new()
            .name("owner-cache-reset".to_owned())
            .spawn(move || {
                let mut deadline = std::time::Instant::now() + period;
                loop {
                    let now = std::time::Instant::now();
                    if now < deadline {
                        thread::park_timeout(deadline - now);
                    }
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    let Some(cache) = cache.upgrade() else {
                        break;
                    };
                    if std::time::Instant::now() >= deadline {
                        let dropped = cache.clear();
                        info!(dropped, "cleared recovered owner cache");
                        deadline += period;
                    }
                }
            })
    }
}

#[derive(Debug)]
enum ResetTask {
    Runtime(JoinHandle<()>),
    Thread {
        handle: thread::JoinHandle<()>,
        stop: Arc<AtomicBool>,
    },
}

impl ResetTask {
    fn is_running(&self) -> bool {
        match self {
            Self::Runtime(task) => !task.is_finished(),
            Self::Thread { handle, .. } => !handle.is_finished(),
        }
    }

    fn stop(self) {
        match self {
            Self::Runtime(task) => task.abort(),
            Self::Thread { handle, stop } => {
                stop.store(true, Ordering::Release);
                handle.thread().unpark();
            }
        }
    }
}

/// Resolves the owner a signature claims to speak for.
#[derive(Debug)]
pub struct OwnerRecoverer<R = K256RecoveryAdapter> {
    backend: R,
    cache: Arc<RecoveryCache>,
    reset_task: Option<ResetTask>,
}

impl OwnerRecoverer<K256RecoveryAdapter> {
    pub fn from_config(config: &SigVerifyConfig) -> Self {
        Self::with_config(K256RecoveryAdapter, config)
    }
}

/// Resets the cache hourly, as [`SigVerifyConfig::default`] does.
impl Default for OwnerRecoverer<K256RecoveryAdapter> {
    fn default() -> Self {
        Self::from_config(&SigVerifyConfig::default())
    }
}

impl<R: RecoveryPort> OwnerRecoverer<R> {
    /// Recoverer whose cache is never reset. Meant for tests and one-shot
    /// runs; long-lived callers use [`OwnerRecoverer::with_config`].
    pub fn new(backend: R) -> Self {
        Self {
            backend,
            cache: Arc::new(RecoveryCache::default()),
            reset_task: None,
        }
    }

    /// Starts the reset task when enabled: on the current tokio runtime if
    /// there is one, otherwise on a dedicated thread.
    pub fn with_config(backend: R, config: &SigVerifyConfig) -> Self {
        let mut recoverer = Self::new(backend);
        if !config.cache_reset_enabled {
            return recoverer;
        }
        let period = config.cache_reset_interval();
        recoverer.reset_task = match tokio::runtime::Handle::try_current() {
            Ok(_) => {
                debug!(?period, "starting owner cache reset task");
                Some(ResetTask::Runtime(recoverer.cache.spawn_reset_task(period)))
            }
            Err(_) => {
                debug!(?period, "no tokio runtime; starting owner cache reset thread");
                let stop = Arc::new(AtomicBool::new(false));
                match recoverer.cache.spawn_reset_thread(period, stop.clone()) {
                    Ok(handle) => Some(ResetTask::Thread { handle, stop }),
                    Err(e) => {
                        warn!(error = %e, "failed to spawn owner cache reset thread");
                        None
                    }
                }
            }
        };
        recoverer
    }

    pub fn cache(&self) -> &Arc<RecoveryCache> {
        &self.cache
    }

    pub fn reset_task_running(&self) -> bool {
        self.reset_task
            .as_ref()
            .is_some_and(ResetTask::is_running)
    }

    pub fn recover(
        &self,
        signature: &ParsedSignature,
        hash: B256,
    ) -> Result<Address, SigningError> {
        let key = RecoveryCache::key(signature, hash);
        if let Some(owner) = self.cache.get(&key) {
            debug!(%owner, "owner cache hit");
            return Ok(owner);
        }

        let owner = self.recover_uncached(signature, hash)?;
        self.cache.insert(key, owner);
        Ok(owner)
    }

    fn recover_uncached(
        &self,
        signature: &ParsedSignature,
        hash: B256,
    ) -> Result<Address, SigningError> {
        match classify(signature.v) {
            SignatureType::ContractSignature | SignatureType::ApprovedHash => {
                Ok(signature.embedded_owner())
            }
            SignatureType::EthSign => {
                let y_parity = recovery_parity(signature.v - ETH_SIGN_V_OFFSET)
                    .map_err(|_| SigningError::InvalidRecoveryByte(signature.v))?;
                self.backend.recover_address(
                    signature.r,
                    signature.s,
                    y_parity,
                    eip191_hash_message(hash),
                )
            }
            SignatureType::Eoa => {
                let y_parity = recovery_parity(signature.v)?;
                self.backend
                    .recover_address(signature.r, signature.s, y_parity, hash)
            }
        }
    }
}

impl<R> Drop for OwnerRecoverer<R> {
    fn drop(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.stop();
        }
    }
}

fn recovery_parity(v: u8) -> Result<bool, SigningError> {
    match v {
        0 | 1 => Ok(v == 1),
        27 | 28 => Ok(v == 28),
        other => Err(SigningError::InvalidRecoveryByte(other)),
    }
}
