//! The fixed set of logical transcript contexts.
//!
//! A context is one business-unit and bot-type pair. Each context may be
//! bound to its own Postgres endpoint through a configuration key; contexts
//! without an endpoint are simply inactive.

use std::collections::HashMap;
use std::env;
use std::fmt;

use serde::{Serialize, Serializer};

/// Business unit owning a bot deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BusinessUnit {
    #[serde(rename = "AMG")]
    Amg,
    #[serde(rename = "LMP")]
    Lmp,
}

impl BusinessUnit {
    pub const ALL: [BusinessUnit; 2] = [BusinessUnit::Amg, BusinessUnit::Lmp];

    /// Wire code (`AMG`, `LMP`).
    pub fn code(&self) -> &'static str {
        match self {
            BusinessUnit::Amg => "AMG",
            BusinessUnit::Lmp => "LMP",
        }
    }

    /// Parse a wire code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.code() == code)
    }
}

impl fmt::Display for BusinessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of bot whose transcripts a context holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotType {
    Sales,
    Customer,
}

impl BotType {
    pub const ALL: [BotType; 2] = [BotType::Sales, BotType::Customer];

    /// Wire code (`sales`, `customer`).
    pub fn code(&self) -> &'static str {
        match self {
            BotType::Sales => "sales",
            BotType::Customer => "customer",
        }
    }

    /// Parse a wire code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bot| bot.code() == code)
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Composite `{unit}:{bot}` key, unique across the context set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey {
    pub unit: BusinessUnit,
    pub bot: BotType,
}

impl ContextKey {
    pub fn new(unit: BusinessUnit, bot: BotType) -> Self {
        Self { unit, bot }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.bot)
    }
}

impl Serialize for ContextKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Static description of one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub key: ContextKey,
    /// Human label shown to operators.
    pub label: &'static str,
    /// Configuration key holding the connection endpoint.
    pub config_key: &'static str,
}

impl Context {
    pub fn unit(&self) -> BusinessUnit {
        self.key.unit
    }

    pub fn bot(&self) -> BotType {
        self.key.bot
    }
}

/// Every known context, in the fixed iteration order used for merging.
pub const CONTEXTS: [Context; 4] = [
    Context {
        key: ContextKey {
            unit: BusinessUnit::Amg,
            bot: BotType::Sales,
        },
        label: "AMG Sales",
        config_key: "DB_URL_AMG_SALES",
    },
    Context {
        key: ContextKey {
            unit: BusinessUnit::Amg,
            bot: BotType::Customer,
        },
        label: "AMG Customer",
        config_key: "DB_URL_AMG_CUSTOMER",
    },
    Context {
        key: ContextKey {
            unit: BusinessUnit::Lmp,
            bot: BotType::Sales,
        },
        label: "LMP Sales",
        config_key: "DB_URL_LMP_SALES",
    },
    Context {
        key: ContextKey {
            unit: BusinessUnit::Lmp,
            bot: BotType::Customer,
        },
        label: "LMP Customer",
        config_key: "DB_URL_LMP_CUSTOMER",
    },
];

/// Look up a context by its key.
pub fn context_for(key: ContextKey) -> Context {
    let index = match (key.unit, key.bot) {
        (BusinessUnit::Amg, BotType::Sales) => 0,
        (BusinessUnit::Amg, BotType::Customer) => 1,
        (BusinessUnit::Lmp, BotType::Sales) => 2,
        (BusinessUnit::Lmp, BotType::Customer) => 3,
    };
    CONTEXTS[index]
}

/// A context together with the endpoint it resolved to at access time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBinding {
    pub context: Context,
    pub endpoint: Option<String>,
}

impl ContextBinding {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Resolves a context's configuration key to a connection endpoint.
///
/// Called on every access, so implementations may reflect configuration that
/// changes while the process runs.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self, config_key: &str) -> Option<String>;
}

/// Reads endpoints from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvEndpoints;

impl EndpointResolver for EnvEndpoints {
    fn resolve(&self, config_key: &str) -> Option<String> {
        non_blank(env::var(config_key).ok())
    }
}

/// Fixed endpoint table, mostly useful for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticEndpoints {
    endpoints: HashMap<String, String>,
}

impl StaticEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, config_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(config_key.into(), endpoint.into());
        self
    }
}

impl EndpointResolver for StaticEndpoints {
    fn resolve(&self, config_key: &str) -> Option<String> {
        non_blank(self.endpoints.get(config_key).cloned())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
