//! Saved accounts and credential resolution.
//!
//! Accounts live in a JSON file (by default `~/.qiskit/qiskit-ibm.json`)
//! that maps an account name to its channel, token and optional
//! instance. The file is shared with other Qiskit tooling, so entries this
//! crate cannot parse are kept untouched when the file is rewritten.
//!
//! # Example
//!
//! ```ignore
//! use qfc_core::account::{Account, AccountStore, Credentials};
//!
//! let store = AccountStore::new()?;
//! store.save(None, Account::new("my-token"), false)?;
//!
//! // Later: no token given, falls back to the default saved account.
//! let credentials = Credentials::resolve(None, None, &store)?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Name used when saving or loading without an explicit account name.
pub const DEFAULT_ACCOUNT_NAME: &str = "default-ibm-quantum-platform";

/// Environment variable holding an API token.
pub const TOKEN_ENV: &str = "QISKIT_IBM_TOKEN";

/// Environment variable holding a service instance (CRN).
pub const INSTANCE_ENV: &str = "QISKIT_IBM_INSTANCE";

/// Environment variable holding the channel name.
pub const CHANNEL_ENV: &str = "QISKIT_IBM_CHANNEL";

/// Environment variable overriding the gateway URL.
pub const HOST_ENV: &str = "ENV_GATEWAY_PROVIDER_HOST";

/// Default serverless gateway URL.
pub const DEFAULT_HOST: &str = "https://qiskit-serverless.quantum.ibm.com";

/// IBM Quantum access channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// IBM Quantum Platform (current default).
    #[default]
    IbmQuantumPlatform,
    /// IBM Cloud, requires an instance CRN.
    IbmCloud,
    /// Legacy IBM Quantum channel.
    IbmQuantum,
}

impl Channel {
    /// Wire name of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::IbmQuantumPlatform => "ibm_quantum_platform",
            Channel::IbmCloud => "ibm_cloud",
            Channel::IbmQuantum => "ibm_quantum",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ibm_quantum_platform" => Ok(Channel::IbmQuantumPlatform),
            "ibm_cloud" => Ok(Channel::IbmCloud),
            "ibm_quantum" => Ok(Channel::IbmQuantum),
            other => Err(CatalogError::Configuration(format!(
                "unknown channel '{other}'. Available: ibm_quantum_platform, ibm_cloud, ibm_quantum"
            ))),
        }
    }
}

/// A saved account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Access channel.
    #[serde(default)]
    pub channel: Channel,
    /// API token.
    pub token: String,
    /// Service URL recorded with the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Service instance (CRN on IBM Cloud).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Whether this account is used when no name is given.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default_account: bool,
}

impl Account {
    /// Create an account on the default channel.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            channel: Channel::default(),
            token: token.into(),
            url: None,
            instance: None,
            is_default_account: false,
        }
    }

    /// Set the channel.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Set the service instance.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Set the service URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Mark as the default account.
    pub fn as_default(mut self) -> Self {
        self.is_default_account = true;
        self
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("channel", &self.channel)
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .field("instance", &self.instance)
            .field("is_default_account", &self.is_default_account)
            .finish()
    }
}

/// JSON file of named accounts.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Open the store at the default location (`~/.qiskit/qiskit-ibm.json`).
    pub fn new() -> CatalogResult<Self> {
        Ok(Self::at(Self::default_path()?))
    }

    /// Open a store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default account file location.
    pub fn default_path() -> CatalogResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            CatalogError::Configuration("could not determine home directory".into())
        })?;
        Ok(home.join(".qiskit").join("qiskit-ibm.json"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw name → object map. A missing file is an empty store.
    fn read_raw(&self) -> CatalogResult<serde_json::Map<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_raw(&self, entries: &serde_json::Map<String, serde_json::Value>) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// All parseable accounts, sorted by name.
    pub fn list(&self) -> CatalogResult<BTreeMap<String, Account>> {
        let mut accounts = BTreeMap::new();
        for (name, value) in self.read_raw()? {
            match serde_json::from_value::<Account>(value) {
                Ok(account) => {
                    accounts.insert(name, account);
                }
                Err(e) => tracing::warn!("skipping unreadable account '{name}': {e}"),
            }
        }
        Ok(accounts)
    }

    /// Save `account` under `name` (or the default name).
    ///
    /// Saving identical data again is a no-op. Replacing different data
    /// requires `overwrite`. Returns the name the account was saved under.
    pub fn save(
        &self,
        name: Option<&str>,
        account: Account,
        overwrite: bool,
    ) -> CatalogResult<String> {
        if account.token.trim().is_empty() {
            return Err(CatalogError::InvalidToken);
        }
        let name = name.unwrap_or(DEFAULT_ACCOUNT_NAME).to_string();
        let mut entries = self.read_raw()?;

        if let Some(existing) = entries.get(&name) {
            let same = serde_json::from_value::<Account>(existing.clone())
                .is_ok_and(|existing| existing == account);
            if same {
                return Ok(name);
            }
            if !overwrite {
                return Err(CatalogError::AccountExists(name));
            }
        }

        if account.is_default_account {
            for value in entries.values_mut() {
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("is_default_account");
                }
            }
        }

        entries.insert(name.clone(), serde_json::to_value(&account)?);
        self.write_raw(&entries)?;
        tracing::info!("saved account '{name}' to {}", self.path.display());
        Ok(name)
    }

    /// Load an account.
    ///
    /// With a name, the account must exist. Without one, the account
    /// flagged as default is returned, else the entry under
    /// [`DEFAULT_ACCOUNT_NAME`], else `None`.
    pub fn get(&self, name: Option<&str>) -> CatalogResult<Option<Account>> {
        let accounts = self.list()?;
        match name {
            Some(name) => accounts
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| CatalogError::AccountNotFound(name.to_string())),
            None => Ok(accounts
                .values()
                .find(|a| a.is_default_account)
                .or_else(|| accounts.get(DEFAULT_ACCOUNT_NAME))
                .cloned()),
        }
    }

    /// Remove an account. Returns whether it existed.
    pub fn delete(&self, name: &str) -> CatalogResult<bool> {
        let mut entries = self.read_raw()?;
        if entries.remove(name).is_none() {
            return Ok(false);
        }
        self.write_raw(&entries)?;
        Ok(true)
    }
}

/// Everything needed to open a gateway connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API token.
    pub token: String,
    /// Access channel.
    pub channel: Channel,
    /// Service instance, sent as `Service-CRN`.
    pub instance: Option<String>,
    /// Gateway URL.
    pub host: String,
}

impl Credentials {
    /// Credentials for an explicit token with default channel and host.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            channel: Channel::default(),
            instance: None,
            host: DEFAULT_HOST.to_string(),
        }
    }

    /// Override the gateway URL.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Resolve credentials from the process environment and `store`.
    ///
    /// See [`Credentials::resolve_with`] for precedence.
    pub fn resolve(
        token: Option<&str>,
        name: Option<&str>,
        store: &AccountStore,
    ) -> CatalogResult<Self> {
        Self::resolve_with(token, name, store, |key| std::env::var(key).ok())
    }

    /// Resolve credentials with an explicit environment lookup.
    ///
    /// Precedence: an explicit `token` (the `name` is then ignored), the
    /// named saved account, `QISKIT_IBM_TOKEN`, the default saved account.
    /// The gateway URL is `ENV_GATEWAY_PROVIDER_HOST` or [`DEFAULT_HOST`].
    pub fn resolve_with<F>(
        token: Option<&str>,
        name: Option<&str>,
        store: &AccountStore,
        env: F,
    ) -> CatalogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = env(HOST_ENV)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let env_channel = || -> CatalogResult<Channel> {
            env(CHANNEL_ENV)
                .map(|c| c.parse::<Channel>())
                .transpose()
                .map(Option::unwrap_or_default)
        };

        if let Some(token) = token {
            if token.trim().is_empty() {
                return Err(CatalogError::InvalidToken);
            }
            return Ok(Self {
                token: token.to_string(),
                channel: env_channel()?,
                instance: env(INSTANCE_ENV),
                host,
            });
        }

        let account = match name {
            Some(name) => store.get(Some(name))?,
            None => match env(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
                Some(token) => {
                    tracing::debug!("using token from {TOKEN_ENV}");
                    return Ok(Self {
                        token,
                        channel: env_channel()?,
                        instance: env(INSTANCE_ENV),
                        host,
                    });
                }
                None => store.get(None)?,
            },
        };

        let account = account.ok_or(CatalogError::MissingToken)?;
        Ok(Self {
            token: account.token,
            channel: account.channel,
            instance: account.instance,
            host,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("instance", &self.instance)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_store() -> (tempfile::TempDir, AccountStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("qiskit").join("qiskit-ibm.json"));
        (dir, store)
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_save_and_get_default() {
        let (_dir, store) = temp_store();
        let name = store.save(None, Account::new("token-1"), false).unwrap();
        assert_eq!(name, DEFAULT_ACCOUNT_NAME);

        let account = store.get(None).unwrap().unwrap();
        assert_eq!(account.token, "token-1");
        assert_eq!(account.channel, Channel::IbmQuantumPlatform);
    }

    #[test]
    fn test_save_existing_requires_overwrite() {
        let (_dir, store) = temp_store();
        store.save(Some("work"), Account::new("a"), false).unwrap();

        // Identical data is accepted.
        store.save(Some("work"), Account::new("a"), false).unwrap();

        let err = store.save(Some("work"), Account::new("b"), false).unwrap_err();
        assert!(matches!(err, CatalogError::AccountExists(name) if name == "work"));

        store.save(Some("work"), Account::new("b"), true).unwrap();
        assert_eq!(store.get(Some("work")).unwrap().unwrap().token, "b");
    }

    #[test]
    fn test_save_rejects_empty_token() {
        let (_dir, store) = temp_store();
        let err = store.save(None, Account::new("  "), false).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidToken));
    }

    #[test]
    fn test_get_named_missing() {
        let (_dir, store) = temp_store();
        let err = store.get(Some("nope")).unwrap_err();
        assert!(matches!(err, CatalogError::AccountNotFound(_)));
        assert!(store.get(None).unwrap().is_none());
    }

    #[test]
    fn test_default_flag_wins_over_default_name() {
        let (_dir, store) = temp_store();
        store.save(None, Account::new("by-name"), false).unwrap();
        store
            .save(Some("flagged"), Account::new("by-flag").as_default(), false)
            .unwrap();
        assert_eq!(store.get(None).unwrap().unwrap().token, "by-flag");
    }

    #[test]
    fn test_unknown_entries_survive_rewrite() {
        let (_dir, store) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"legacy": {"channel": "something_else", "token": "x", "proxies": {}}}"#,
        )
        .unwrap();

        assert!(store.list().unwrap().is_empty());
        store.save(Some("new"), Account::new("y"), false).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["legacy"]["channel"], "something_else");
        assert_eq!(raw["new"]["token"], "y");
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = temp_store();
        store.save(Some("temp"), Account::new("t"), false).unwrap();
        assert!(store.delete("temp").unwrap());
        assert!(!store.delete("temp").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.save(None, Account::new("secret"), false).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_account_debug_redacts_token() {
        let debug = format!("{:?}", Account::new("super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("ibm_cloud".parse::<Channel>().unwrap(), Channel::IbmCloud);
        assert_eq!(
            "IBM_QUANTUM_PLATFORM".parse::<Channel>().unwrap(),
            Channel::IbmQuantumPlatform
        );
        assert!("azure".parse::<Channel>().is_err());
    }

    #[test]
    fn test_resolve_explicit_token_ignores_name() {
        let (_dir, store) = temp_store();
        let creds =
            Credentials::resolve_with(Some("explicit"), Some("missing"), &store, env_from(&[]))
                .unwrap();
        assert_eq!(creds.token, "explicit");
        assert_eq!(creds.host, DEFAULT_HOST);
    }

    #[test]
    fn test_resolve_named_account() {
        let (_dir, store) = temp_store();
        store
            .save(
                Some("cloud"),
                Account::new("cloud-token")
                    .with_channel(Channel::IbmCloud)
                    .with_instance("crn:v1:abc"),
                false,
            )
            .unwrap();
        let creds = Credentials::resolve_with(
            None,
            Some("cloud"),
            &store,
            env_from(&[(TOKEN_ENV, "env-token")]),
        )
        .unwrap();
        assert_eq!(creds.token, "cloud-token");
        assert_eq!(creds.channel, Channel::IbmCloud);
        assert_eq!(creds.instance.as_deref(), Some("crn:v1:abc"));
    }

    #[test]
    fn test_resolve_env_before_default_account() {
        let (_dir, store) = temp_store();
        store.save(None, Account::new("saved"), false).unwrap();
        let creds = Credentials::resolve_with(
            None,
            None,
            &store,
            env_from(&[(TOKEN_ENV, "env-token"), (HOST_ENV, "http://localhost:8000")]),
        )
        .unwrap();
        assert_eq!(creds.token, "env-token");
        assert_eq!(creds.host, "http://localhost:8000");

        let creds = Credentials::resolve_with(None, None, &store, env_from(&[])).unwrap();
        assert_eq!(creds.token, "saved");
    }

    #[test]
    fn test_resolve_nothing_available() {
        let (_dir, store) = temp_store();
        let err = Credentials::resolve_with(None, None, &store, env_from(&[])).unwrap_err();
        assert!(matches!(err, CatalogError::MissingToken));
    }

    #[test]
    fn test_resolve_bad_env_channel() {
        let (_dir, store) = temp_store();
        let err = Credentials::resolve_with(
            Some("t"),
            None,
            &store,
            env_from(&[(CHANNEL_ENV, "nope")]),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let debug = format!("{:?}", Credentials::from_token("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
