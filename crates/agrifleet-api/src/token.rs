// Bearer-token indirection.
//
// The client reads the current token on every request so a credential
// swapped or cleared at runtime takes effect on the next call without
// rebuilding the client. Persistent storage (keyring) lives in
// `agrifleet-config`; this crate only defines the seam and an in-memory
// implementation for tests and short-lived tools.

use std::sync::Mutex;

use secrecy::SecretString;

/// Storage seam for the API bearer token.
///
/// Implementations must swallow their own storage failures (log and
/// continue) -- the 401 path calls [`clear`](TokenStore::clear) from a
/// context that cannot recover from a failing credential backend anyway.
pub trait TokenStore: Send + Sync {
    /// The current token, if one is stored.
    fn get(&self) -> Option<SecretString>;

    /// Replace the stored token.
    fn store(&self, token: SecretString);

    /// Remove the stored token.
    fn clear(&self);
}

/// Process-local token storage.
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a token.
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<SecretString> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, token: SecretString) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}
