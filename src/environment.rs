//! The deployment environment the server is running in.

use std::fmt::Display;

use clap::ValueEnum;

/// Where the server is deployed, which controls how much detail error
/// responses reveal to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    /// Local development. Server errors include their details.
    #[default]
    Development,
    /// A public deployment. Server errors only include a generic message.
    Production,
}

impl Environment {
    /// Whether this is the production environment.
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}
