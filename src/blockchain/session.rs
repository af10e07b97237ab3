// src/blockchain/session.rs

use std::str::FromStr;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use dashmap::DashMap;
use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::blockchain::{
    chains::{display_name_for, Chain},
    client::{ChainRpc, RpcConnector},
    models::{ChainSwitch, TokenError},
};

/// Clients bound to one chain and the session's account.
#[derive(Clone)]
pub struct ClientBinding {
    pub chain: Chain,
    pub rpc: Arc<dyn ChainRpc>,
}

struct SessionState {
    selected: Chain,
    account: Option<LocalWallet>,
    binding: Option<ClientBinding>,
}

/// Selected chain, signing account and the client binding for that chain.
///
/// Every mutation happens inside a synchronous critical section that is never
/// held across an `.await`, so a caller that switches and then reads observes
/// the new chain, and a binding never outlives the chain it was built for.
pub struct ChainSession {
    secret: Option<Arc<SecretString>>,
    connector: Arc<dyn RpcConnector>,
    state: Mutex<SessionState>,
    #[cfg(test)]
    derivations: AtomicUsize,
}

impl ChainSession {
    /// Creates an unbound session. The account is derived from `secret` on
    /// first use; a missing secret surfaces as a configuration error then.
    pub fn initialize(
        secret: Option<Arc<SecretString>>,
        connector: Arc<dyn RpcConnector>,
        default_chain: Chain,
    ) -> Arc<Self> {
        Arc::new(Self {
            secret,
            connector,
            state: Mutex::new(SessionState {
                selected: default_chain,
                account: None,
                binding: None,
            }),
            #[cfg(test)]
            derivations: AtomicUsize::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_chain(&self) -> Chain {
        self.lock().selected
    }

    /// Display name of the identifier `chain`, or of the selected chain when
    /// `None`. Unknown identifiers fail with `UnsupportedChain`.
    pub fn chain_display_name(&self, chain: Option<&str>) -> Result<&'static str, TokenError> {
        match chain {
            Some(identifier) => display_name_for(identifier.trim()),
            None => Ok(self.current_chain().display_name()),
        }
    }

    /// Whether clients are bound for the selected chain yet.
    pub fn is_bound(&self) -> bool {
        self.lock().binding.is_some()
    }

    /// Parses `target` and switches to it. Unknown identifiers leave the
    /// session untouched.
    pub fn switch_chain_by_name(&self, target: &str) -> Result<ChainSwitch, TokenError> {
        let chain = Chain::from_str(target)?;
        self.switch_chain(chain)
    }

    /// Selects `target` and rebuilds the binding for it in the same critical
    /// section. If the binding cannot be built nothing changes.
    pub fn switch_chain(&self, target: Chain) -> Result<ChainSwitch, TokenError> {
        let mut state = self.lock();
        let previous = state.selected;
        let account = self.account_in(&mut state)?;
        let rpc = self.connector.connect(target, &account)?;
        state.selected = target;
        state.binding = Some(ClientBinding { chain: target, rpc });
        info!(
            "Switched chain from {} to {}",
            previous.display_name(),
            target.display_name()
        );
        Ok(ChainSwitch {
            previous,
            current: target,
        })
    }

    /// Address of the signing account, identical on every chain.
    pub fn current_address(&self) -> Result<Address, TokenError> {
        let mut state = self.lock();
        Ok(self.account_in(&mut state)?.address())
    }

    /// Returns the binding for the selected chain, building the account and
    /// the binding on first use.
    pub fn ensure_binding(&self) -> Result<ClientBinding, TokenError> {
        let mut state = self.lock();
        if let Some(binding) = &state.binding {
            return Ok(binding.clone());
        }
        let account = self.account_in(&mut state)?;
        let chain = state.selected;
        let rpc = self.connector.connect(chain, &account)?;
        let binding = ClientBinding { chain, rpc };
        state.binding = Some(binding.clone());
        debug!("Initialized client binding for {}", chain.display_name());
        Ok(binding)
    }

    fn account_in(&self, state: &mut SessionState) -> Result<LocalWallet, TokenError> {
        if let Some(account) = &state.account {
            return Ok(account.clone());
        }
        let secret = self.secret.as_ref().ok_or_else(|| {
            TokenError::Configuration("PRIVATE_KEY environment variable is required".into())
        })?;
        let key = secret.expose_secret().trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let account = LocalWallet::from_str(key)
            .map_err(|e| TokenError::Configuration(format!("invalid PRIVATE_KEY: {}", e)))?;
        debug!("Derived signing account {:?}", account.address());
        #[cfg(test)]
        let _ = self.derivations.fetch_add(1, Ordering::SeqCst);
        state.account = Some(account.clone());
        Ok(account)
    }
}

/// Upper bound on registered conversations unless configured otherwise.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct RegistryEntry {
    session: Arc<ChainSession>,
    last_used: Instant,
}

/// Chain sessions keyed by conversation id, plus a shared default session for
/// callers that do not name a conversation.
///
/// A conversation is registered only when it switches chains. At most
/// `capacity` conversations are kept; the least recently used one is evicted
/// to make room for a new one.
#[derive(Clone)]
pub struct SessionRegistry {
    secret: Option<Arc<SecretString>>,
    connector: Arc<dyn RpcConnector>,
    default_chain: Chain,
    default_session: Arc<ChainSession>,
    capacity: usize,
    sessions: Arc<DashMap<String, RegistryEntry>>,
}

fn normalize(conversation_id: Option<&str>) -> Option<&str> {
    conversation_id.map(str::trim).filter(|id| !id.is_empty())
}

impl SessionRegistry {
    pub fn new(
        secret: Option<Arc<SecretString>>,
        connector: Arc<dyn RpcConnector>,
        default_chain: Chain,
        capacity: usize,
    ) -> Self {
        let default_session =
            ChainSession::initialize(secret.clone(), connector.clone(), default_chain);
        Self {
            secret,
            connector,
            default_chain,
            default_session,
            capacity: capacity.max(1),
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn default_session(&self) -> Arc<ChainSession> {
        self.default_session.clone()
    }

    fn fresh_session(&self) -> Arc<ChainSession> {
        ChainSession::initialize(
            self.secret.clone(),
            self.connector.clone(),
            self.default_chain,
        )
    }

    /// Session that a chain switch for `conversation_id` applies to. Unknown
    /// ids are registered. `None` or an empty id resolves to the default session.
    pub fn session(&self, conversation_id: Option<&str>) -> Arc<ChainSession> {
        let Some(id) = normalize(conversation_id) else {
            return self.default_session();
        };
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.last_used = Instant::now();
            return entry.session.clone();
        }

        self.evict_down_to(self.capacity - 1);
        debug!("Opening chain session for conversation {}", id);
        let session = self.fresh_session();
        let entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| RegistryEntry {
                session,
                last_used: Instant::now(),
            });
        entry.session.clone()
    }

    /// Session to read from for `conversation_id`. A conversation that never
    /// switched chains gets an unregistered session on the default chain.
    pub fn lookup(&self, conversation_id: Option<&str>) -> Arc<ChainSession> {
        let Some(id) = normalize(conversation_id) else {
            return self.default_session();
        };
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                entry.last_used = Instant::now();
                entry.session.clone()
            }
            None => self.fresh_session(),
        }
    }

    fn evict_down_to(&self, limit: usize) {
        while self.sessions.len() > limit {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                    debug!("Evicted chain session for conversation {}", id);
                }
                None => break,
            }
        }
    }

    /// Number of registered conversations, excluding the default session.
    pub fn conversation_count(&self) -> usize {
        self.sessions.len()
    }
}
