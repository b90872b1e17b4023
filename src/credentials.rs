//! Credentials the deployment CLI keeps in the vault.
//!
//! The vault stores whatever it is given.  Checking that the stored values
//! actually work (a Cloudflare token verify call, a GitHub `/user` call, a
//! Komodo login) belongs to the caller, which plugs in through
//! [`CredentialValidator`].

use crate::vault::SecretStore;

pub const CLOUDFLARE_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const CLOUDFLARE_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const KOMODO_API_KEY: &str = "KOMODO_API_KEY";
pub const KOMODO_API_SECRET: &str = "KOMODO_API_SECRET";

/// A credential the deployment flow knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCredential {
    pub name: &'static str,
    pub description: &'static str,
    /// Needed by every deployment, as opposed to optional integrations.
    pub required: bool,
}

/// Every credential the deployment flow reads from the vault.
pub const KNOWN_CREDENTIALS: &[KnownCredential] = &[
    KnownCredential {
        name: CLOUDFLARE_API_TOKEN,
        description: "Cloudflare API token (tunnel + DNS)",
        required: true,
    },
    KnownCredential {
        name: CLOUDFLARE_ACCOUNT_ID,
        description: "Cloudflare account ID",
        required: true,
    },
    KnownCredential {
        name: GITHUB_TOKEN,
        description: "GitHub token for the image registry",
        required: true,
    },
    KnownCredential {
        name: KOMODO_API_KEY,
        description: "Komodo API key (optional stack deploy)",
        required: false,
    },
    KnownCredential {
        name: KOMODO_API_SECRET,
        description: "Komodo API secret (optional stack deploy)",
        required: false,
    },
];

/// Look up a known credential by name.
pub fn known(name: &str) -> Option<&'static KnownCredential> {
    KNOWN_CREDENTIALS.iter().find(|c| c.name == name)
}

/// Known credentials that `store` does not hold a non-empty value for.
pub fn missing(store: &SecretStore) -> Vec<&'static KnownCredential> {
    KNOWN_CREDENTIALS
        .iter()
        .filter(|c| store.get(c.name).is_none_or(str::is_empty))
        .collect()
}

/// Caller-supplied check that a set of credentials is usable.
///
/// Implementations typically call the relevant external API.  The vault
/// never invokes this itself; the CLI runs it after unlocking.
pub trait CredentialValidator {
    fn validate(&self, store: &SecretStore) -> bool;
}

impl<F> CredentialValidator for F
where
    F: Fn(&SecretStore) -> bool,
{
    fn validate(&self, store: &SecretStore) -> bool {
        self(store)
    }
}

/// Local check: every required known credential is present and non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceValidator;

impl CredentialValidator for PresenceValidator {
    fn validate(&self, store: &SecretStore) -> bool {
        missing(store).iter().all(|c| !c.required)
    }
}
