use crate::{
    auth::{Keys, UserNameAndPassword},
    InvalidConfiguration,
};
use std::fmt;
use strata_formats::InvalidArgument;

const DEFAULT_DOMAIN: &str = "global";

/// the authentication mode of an endpoint
///
/// the names follow the building-security metaphor of the ZAP protocol:
/// each level adds a stronger check at the door.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecurityLevel {
    /// no authentication, anyone may connect
    #[default]
    Grasslands,
    /// connecting addresses are checked against an allow list
    Strawhouse,
    /// clients present a user name and password
    Woodhouse,
    /// clients and server authenticate with asymmetric key pairs
    Stonehouse,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grasslands => "grasslands",
            Self::Strawhouse => "strawhouse",
            Self::Woodhouse => "woodhouse",
            Self::Stonehouse => "stonehouse",
        };
        f.write_str(name)
    }
}

/// the authentication policy handed to the transport at bind/connect time
///
/// composes exactly one credential set appropriate to its [`SecurityLevel`]
/// and side (client or authentication server). The constructors validate
/// that the matching credentials are complete, so a policy that exists is
/// mode-consistent; the accessors guard against reading credentials of the
/// wrong mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ZapOptions {
    security_level: SecurityLevel,
    is_authentication_server: bool,
    domain: String,
    client_credentials: Option<UserNameAndPassword>,
    server_keys: Option<Keys>,
    client_keys: Option<Keys>,
}

impl Default for ZapOptions {
    /// grasslands client: no authentication
    fn default() -> Self {
        Self {
            security_level: SecurityLevel::Grasslands,
            is_authentication_server: false,
            domain: DEFAULT_DOMAIN.to_string(),
            client_credentials: None,
            server_keys: None,
            client_keys: None,
        }
    }
}

impl ZapOptions {
    pub fn grasslands_client() -> Self {
        Self::default()
    }

    pub fn grasslands_server() -> Self {
        Self {
            is_authentication_server: true,
            ..Self::default()
        }
    }

    pub fn strawhouse_client() -> Self {
        Self {
            security_level: SecurityLevel::Strawhouse,
            ..Self::default()
        }
    }

    pub fn strawhouse_server() -> Self {
        Self {
            security_level: SecurityLevel::Strawhouse,
            is_authentication_server: true,
            ..Self::default()
        }
    }

    /// password-authenticating client; the credentials must be complete
    pub fn woodhouse_client(
        credentials: UserNameAndPassword,
    ) -> Result<Self, InvalidConfiguration> {
        if credentials.user_name().is_none() {
            return Err(InvalidConfiguration::new(
                "woodhouse client needs a user name",
            ));
        }
        if credentials.password().is_none() {
            return Err(InvalidConfiguration::new(
                "woodhouse client needs a password",
            ));
        }
        Ok(Self {
            security_level: SecurityLevel::Woodhouse,
            client_credentials: Some(credentials),
            ..Self::default()
        })
    }

    pub fn woodhouse_server() -> Self {
        Self {
            security_level: SecurityLevel::Woodhouse,
            is_authentication_server: true,
            ..Self::default()
        }
    }

    /// key-authenticating server; needs its own full key pair
    pub fn stonehouse_server(server_keys: Keys) -> Result<Self, InvalidConfiguration> {
        if !server_keys.have_public_key() {
            return Err(InvalidConfiguration::new(
                "stonehouse server needs its public key",
            ));
        }
        if !server_keys.have_private_key() {
            return Err(InvalidConfiguration::new(
                "stonehouse server needs its private key",
            ));
        }
        Ok(Self {
            security_level: SecurityLevel::Stonehouse,
            is_authentication_server: true,
            server_keys: Some(server_keys),
            ..Self::default()
        })
    }

    /// key-authenticating client; needs the server's public key and its
    /// own full key pair
    pub fn stonehouse_client(
        server_keys: Keys,
        client_keys: Keys,
    ) -> Result<Self, InvalidConfiguration> {
        if !server_keys.have_public_key() {
            return Err(InvalidConfiguration::new(
                "stonehouse client needs the server public key",
            ));
        }
        if !client_keys.have_public_key() {
            return Err(InvalidConfiguration::new(
                "stonehouse client needs its public key",
            ));
        }
        if !client_keys.have_private_key() {
            return Err(InvalidConfiguration::new(
                "stonehouse client needs its private key",
            ));
        }
        Ok(Self {
            security_level: SecurityLevel::Stonehouse,
            server_keys: Some(server_keys),
            client_keys: Some(client_keys),
            ..Self::default()
        })
    }

    /// the authentication domain, default `"global"`; rejects blank values
    pub fn set_domain(&mut self, domain: &str) -> Result<(), InvalidArgument> {
        if domain.chars().all(char::is_whitespace) {
            return Err(InvalidArgument::new("domain is empty"));
        }
        self.domain = domain.to_string();
        Ok(())
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    pub fn is_authentication_server(&self) -> bool {
        self.is_authentication_server
    }

    /// the client's password credentials; only woodhouse clients carry them
    pub fn client_credentials(&self) -> Result<&UserNameAndPassword, InvalidConfiguration> {
        if self.security_level != SecurityLevel::Woodhouse {
            return Err(InvalidConfiguration::new(
                "credentials are only set at the woodhouse level",
            ));
        }
        self.client_credentials
            .as_ref()
            .ok_or_else(|| InvalidConfiguration::new("credentials are only set for clients"))
    }

    /// the server keys; only stonehouse policies carry them
    pub fn server_keys(&self) -> Result<&Keys, InvalidConfiguration> {
        if self.security_level != SecurityLevel::Stonehouse {
            return Err(InvalidConfiguration::new(
                "server keys are only set at the stonehouse level",
            ));
        }
        self.server_keys
            .as_ref()
            .ok_or_else(|| InvalidConfiguration::new("server keys are not set"))
    }

    /// the client keys; only stonehouse clients carry them
    pub fn client_keys(&self) -> Result<&Keys, InvalidConfiguration> {
        if self.security_level != SecurityLevel::Stonehouse {
            return Err(InvalidConfiguration::new(
                "client keys are only set at the stonehouse level",
            ));
        }
        self.client_keys
            .as_ref()
            .ok_or_else(|| InvalidConfiguration::new("client keys are only set for clients"))
    }
}
