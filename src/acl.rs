use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of roles a profile can carry. Anything the database stores outside this
/// set parses to `None` and is treated as "no role": every non-public path is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    SuperAdmin,
    Brand,
    Cep,
    Admin,
    Expert,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Brand,
        Role::Cep,
        Role::Admin,
        Role::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Brand => "brand",
            Role::Cep => "cep",
            Role::Admin => "admin",
            Role::Expert => "expert",
        }
    }

    /// Lenient parse used on values read back from the database.
    pub fn parse(value: Option<&str>) -> Option<Role> {
        value.and_then(|v| v.trim().parse().ok())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// NavPosition
///
/// Which sidebar group an entry is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavPosition {
    Top,
    Bottom,
}

/// RouteEntry
///
/// One row of the static ACL table.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub position: NavPosition,
    pub roles: &'static [Role],
}

impl RouteEntry {
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    fn nav_entry(&self) -> NavEntry {
        NavEntry {
            path: self.path.to_string(),
            label: self.label.to_string(),
            icon: self.icon.to_string(),
            position: self.position,
        }
    }
}

/// NavEntry
///
/// A sidebar link as sent to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavEntry {
    pub path: String,
    pub label: String,
    pub icon: String,
    pub position: NavPosition,
}

/// Navigation
///
/// The sidebar for one role, already split into its two groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Navigation {
    pub top: Vec<NavEntry>,
    pub bottom: Vec<NavEntry>,
}

use Role::{Admin, Brand, Cep, Expert, SuperAdmin};

/// Pages reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &["/login", "/forgot-password", "/reset-password", "/auth/callback"];

pub const DOCS_URL: &str = "https://docs.ilpdg.com";

/// The ACL table. Order here is sidebar order.
pub static ROUTES: &[RouteEntry] = &[
    RouteEntry {
        path: "/",
        label: "Dashboard",
        icon: "home",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Brand, Cep, Admin, Expert],
    },
    RouteEntry {
        path: "/products",
        label: "Prodotti",
        icon: "package",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Admin, Brand],
    },
    RouteEntry {
        path: "/categories",
        label: "Categorie",
        icon: "folder",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Admin],
    },
    RouteEntry {
        path: "/cover",
        label: "Cover",
        icon: "image",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Admin],
    },
    RouteEntry {
        path: "/selling-links",
        label: "Link di vendita",
        icon: "link",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Admin, Cep],
    },
    RouteEntry {
        path: "/users",
        label: "Utenti",
        icon: "users",
        position: NavPosition::Top,
        roles: &[SuperAdmin, Admin],
    },
    RouteEntry {
        path: "/profile",
        label: "Profilo",
        icon: "user",
        position: NavPosition::Bottom,
        roles: &[SuperAdmin, Brand, Cep, Admin, Expert],
    },
    RouteEntry {
        path: "/profile/tokens",
        label: "API Token",
        icon: "key",
        position: NavPosition::Bottom,
        roles: &[SuperAdmin, Brand],
    },
    RouteEntry {
        path: DOCS_URL,
        label: "Documentazione",
        icon: "book",
        position: NavPosition::Bottom,
        roles: &[SuperAdmin, Brand, Admin],
    },
];

pub fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// True when `path` is `prefix` itself or lies under it on a segment boundary.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| under(path, public))
}

/// find_route
///
/// Resolves `path` to the ACL entry that governs it. External URLs only match an identical
/// entry. Internal paths pick the longest configured prefix, with `/` matching only itself
/// so that it does not swallow every unconfigured page.
pub fn find_route(path: &str) -> Option<&'static RouteEntry> {
    if is_external(path) {
        return ROUTES.iter().find(|entry| entry.path == path);
    }

    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    ROUTES
        .iter()
        .filter(|entry| !is_external(entry.path))
        .filter(|entry| {
            if entry.path == "/" {
                path == "/"
            } else {
                under(path, entry.path)
            }
        })
        .max_by_key(|entry| entry.path.len())
}

/// can_access
///
/// Access decision for a page path. Unconfigured paths are reserved to `super_admin`.
pub fn can_access(role: Option<Role>, path: &str) -> bool {
    if is_public_path(path) {
        return true;
    }
    let Some(role) = role else {
        return false;
    };
    match find_route(path) {
        Some(entry) => entry.allows(role),
        None => role == Role::SuperAdmin,
    }
}

pub fn accessible_routes(role: Option<Role>) -> Vec<NavEntry> {
    let Some(role) = role else {
        return Vec::new();
    };
    ROUTES
        .iter()
        .filter(|entry| entry.allows(role))
        .map(RouteEntry::nav_entry)
        .collect()
}

pub fn navigation(role: Option<Role>) -> Navigation {
    let (top, bottom): (Vec<NavEntry>, Vec<NavEntry>) = accessible_routes(role)
        .into_iter()
        .partition(|entry| entry.position == NavPosition::Top);
    Navigation { top, bottom }
}
