// ── Credential resolution ──
//
// The API bearer token lives in the platform keyring, with an
// environment override for headless deployments. Storage failures are
// logged and swallowed: the trait contract requires `clear` to succeed
// from the 401 path no matter what the credential backend does.

use secrecy::SecretString;
use tracing::{debug, warn};

use agrifleet_api::TokenStore;

const KEYRING_SERVICE: &str = "agrifleet";
const KEYRING_USER: &str = "api-token";

/// Environment variable that overrides the keyring token.
pub const TOKEN_ENV_VAR: &str = "AGRIFLEET_API_TOKEN";

/// Keyring-backed token storage with an env-var override.
#[derive(Debug, Default)]
pub struct KeyringTokenStore {
    _private: (),
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry() -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Option<SecretString> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Some(token.into());
            }
        }

        match Self::entry().and_then(|entry| entry.get_password()) {
            Ok(token) => Some(token.into()),
            Err(keyring::Error::NoEntry) => None,
            Err(err) => {
                debug!(error = %err, "keyring read failed");
                None
            }
        }
    }

    fn store(&self, token: SecretString) {
        use secrecy::ExposeSecret;
        match Self::entry().and_then(|entry| entry.set_password(token.expose_secret())) {
            Ok(()) => {}
            Err(err) => warn!(error = %err, "failed to store API token in keyring"),
        }
    }

    fn clear(&self) {
        match Self::entry().and_then(|entry| entry.delete_credential()) {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(err) => warn!(error = %err, "failed to clear API token from keyring"),
        }
    }
}
