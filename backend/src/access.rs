use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};
use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt, fs,
    path::Path,
};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Policy Table ---

/// RoleAccessPolicy
///
/// The page sections a role may open, and the page it lands on by default.
/// A navigation target is permitted when it sits under one of `allowed_route_prefixes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoleAccessPolicy {
    pub allowed_route_prefixes: Vec<String>,
    pub default_route: String,
}

impl RoleAccessPolicy {
    pub fn new<I, S>(prefixes: I, default_route: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_route_prefixes: prefixes.into_iter().map(Into::into).collect(),
            default_route: default_route.to_string(),
        }
    }

    /// Segment-boundary prefix check: `/projects` admits `/projects/12` but not `/projects-archive`.
    pub fn allows(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.allowed_route_prefixes
            .iter()
            .any(|prefix| matches_prefix(&path, prefix))
    }
}

/// PolicyError
///
/// Configuration faults in the role policy table. These abort startup; they are never
/// surfaced to an actor at request time.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read role policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("role policy table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("role policy table defines no roles")]
    Empty,

    #[error("role policy table contains a blank role name")]
    BlankRole,

    #[error("role '{0}' is defined more than once")]
    DuplicateRole(String),

    #[error("role '{role}' has a non-absolute route '{route}'")]
    RelativeRoute { role: String, route: String },
}

/// PolicyTable
///
/// The process-wide `role -> policy` mapping. Constructed once at startup, validated,
/// then handed to the [`AccessRouter`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PolicyTable(BTreeMap<String, RoleAccessPolicy>);

impl PolicyTable {
    /// Builds and validates a table from `(role, policy)` pairs. A role may appear once.
    pub fn new<I>(entries: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (String, RoleAccessPolicy)>,
    {
        let mut roles = BTreeMap::new();
        for (role, policy) in entries {
            match roles.entry(role) {
                Entry::Vacant(slot) => {
                    slot.insert(policy);
                }
                Entry::Occupied(slot) => {
                    return Err(PolicyError::DuplicateRole(slot.key().clone()));
                }
            }
        }
        let table = Self(roles);
        table.check()?;
        Ok(table)
    }

    /// Parses the JSON shape `{ "<role>": { "allowedRoutePrefixes": [...], "defaultRoute": "..." } }`.
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        let RoleEntries(entries) = serde_json::from_str(raw)?;
        Self::new(entries)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// The portal's standard roles.
    pub fn portal_defaults() -> Self {
        let entries = [
            (
                "admin",
                RoleAccessPolicy::new(
                    [
                        "/dashboard",
                        "/projects",
                        "/contacts",
                        "/inductions",
                        "/inspections",
                        "/permits",
                        "/users",
                        "/settings",
                    ],
                    "/dashboard",
                ),
            ),
            (
                "manager",
                RoleAccessPolicy::new(
                    [
                        "/dashboard",
                        "/projects",
                        "/contacts",
                        "/inductions",
                        "/inspections",
                        "/permits",
                    ],
                    "/dashboard",
                ),
            ),
            (
                "supervisor",
                RoleAccessPolicy::new(["/inspections", "/permits", "/inductions"], "/inspections"),
            ),
            (
                "operative",
                RoleAccessPolicy::new(["/induction", "/profile"], "/induction"),
            ),
        ];
        Self(
            entries
                .into_iter()
                .map(|(role, policy)| (role.to_string(), policy))
                .collect(),
        )
    }

    pub fn get(&self, role: &str) -> Option<&RoleAccessPolicy> {
        self.0.get(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn check(&self) -> Result<(), PolicyError> {
        if self.0.is_empty() {
            return Err(PolicyError::Empty);
        }
        for (role, policy) in &self.0 {
            if role.trim().is_empty() {
                return Err(PolicyError::BlankRole);
            }
            let routes = std::iter::once(&policy.default_route).chain(&policy.allowed_route_prefixes);
            for route in routes {
                if !route.starts_with('/') {
                    return Err(PolicyError::RelativeRoute {
                        role: role.clone(),
                        route: route.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for PolicyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RoleEntries(entries) = RoleEntries::deserialize(deserializer)?;
        Self::new(entries).map_err(de::Error::custom)
    }
}

/// Policy file entries in document order, duplicates included. A plain map would keep
/// only the last entry for a repeated role.
struct RoleEntries(Vec<(String, RoleAccessPolicy)>);

impl<'de> Deserialize<'de> for RoleEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RoleEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of role names to access policies")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RoleAccessPolicy>()? {
                    entries.push(entry);
                }
                Ok(RoleEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

// --- Router ---

/// RedirectPaths
///
/// Fixed fallback targets for denied navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPaths {
    pub login: String,
    pub unauthorized: String,
}

/// NavigationDecision
///
/// Terminal outcome of a single navigation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationDecision {
    Allow,
    Redirect { target: String },
}

impl NavigationDecision {
    fn redirect(target: &str) -> Self {
        Self::Redirect {
            target: target.to_string(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// AccessRouter
///
/// Gates every page navigation by the actor's role. `decide` is a pure function of
/// (role, path, policy table); no decision is remembered between requests.
#[derive(Debug, Clone)]
pub struct AccessRouter {
    policies: PolicyTable,
    redirects: RedirectPaths,
}

impl AccessRouter {
    pub fn new(policies: PolicyTable, redirects: RedirectPaths) -> Self {
        Self {
            policies,
            redirects,
        }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn policy_for(&self, role: &str) -> Option<&RoleAccessPolicy> {
        self.policies.get(role)
    }

    /// decide
    ///
    /// `role` is `None` when the request carries no valid session token. Rules are applied
    /// in a fixed order:
    /// 1. no session -> login
    /// 2. role without a policy -> unauthorized
    /// 3. root path -> the role's default route
    /// 4. path under an allowed prefix -> allow
    /// 5. path equal to the default route -> allow
    /// 6. anything else -> the role's default route
    pub fn decide(&self, role: Option<&str>, path: &str) -> NavigationDecision {
        let path = normalize_path(path);
        let path = path.as_str();

        let Some(role) = role else {
            tracing::debug!(path, "navigation without session, redirecting to login");
            return NavigationDecision::redirect(&self.redirects.login);
        };

        let Some(policy) = self.policies.get(role) else {
            tracing::debug!(path, role, "role has no access policy");
            return NavigationDecision::redirect(&self.redirects.unauthorized);
        };

        let default_route = normalize_path(&policy.default_route);

        if path == "/" {
            // A default route of "/" would redirect onto itself.
            if default_route == "/" {
                return NavigationDecision::Allow;
            }
            return NavigationDecision::redirect(&policy.default_route);
        }

        if policy.allows(path) || path == default_route {
            return NavigationDecision::Allow;
        }

        tracing::debug!(path, role, target = %policy.default_route, "navigation outside allowed sections");
        NavigationDecision::redirect(&policy.default_route)
    }
}

/// Canonical form of a navigation target. The query string and fragment are dropped and
/// `.`/`..` segments are resolved before any prefix comparison; `..` never climbs above
/// the root. Empty segments collapse, so the empty path is the root.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let mut segments: Vec<&str> = Vec::new();
    for segment in path[..end].split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = normalize_path(prefix);
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
