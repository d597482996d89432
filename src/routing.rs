// Host routing
// Maps resources to the API host that serves them

use std::collections::HashMap;

use crate::auth::TokenKind;

/// Host class a request is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// `{host}/companies/{company_id}/`
    Primary,
    /// `{legacy_host}/companies/{company_id}/`
    Legacy,
    /// `{legacy_host}/`, for resources outside the company scope
    LegacyDeduction,
    /// `{payroll_host}/companies/{company_id}/`
    Payroll,
}

impl Target {
    /// Identity server whose token this host accepts
    pub fn token_kind(self) -> TokenKind {
        match self {
            Target::Primary | Target::Legacy | Target::LegacyDeduction => TokenKind::Standard,
            Target::Payroll => TokenKind::Payroll,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Target::Primary => "primary",
            Target::Legacy => "legacy",
            Target::LegacyDeduction => "legacy-deduction",
            Target::Payroll => "payroll",
        };
        f.write_str(name)
    }
}

/// Resource-to-host table consulted before the caller's legacy flag
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Target>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("deduction", Target::LegacyDeduction);
        table
    }
}

impl RouteTable {
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Pin a resource to a host; replaces any earlier entry
    pub fn insert(&mut self, resource: impl Into<String>, target: Target) {
        self.routes.insert(normalize_resource(&resource.into()), target);
    }

    /// Table entry for `path`, else `Legacy` when asked for, else `Primary`
    pub fn resolve(&self, path: &str, legacy: bool) -> Target {
        if let Some(target) = self.routes.get(&normalize_resource(path)) {
            return *target;
        }
        if legacy {
            Target::Legacy
        } else {
            Target::Primary
        }
    }
}

/// Table keys are matched on the whole path, ignoring surrounding slashes
fn normalize_resource(path: &str) -> String {
    path.trim_matches('/').to_string()
}
