//! Plugin catalog.
//!
//! Lists the pipeline components this crate provides, grouped by the role
//! they play in a host pipeline. Hosts resolve a name here and build the
//! component through its `from_config` constructor.

use std::collections::BTreeMap;
use std::fmt;

/// Role of a component within a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Produces records from an external source.
    Reader,
    /// Transforms records.
    Filter,
    /// Consumes records.
    Writer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reader => f.write_str("reader"),
            Role::Filter => f.write_str("filter"),
            Role::Writer => f.write_str("writer"),
        }
    }
}

/// Static description of one plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub role: Role,
    pub description: &'static str,
}

pub const REDIS_LISTEN: &str = "redis-listen";
pub const REDIS_CALL: &str = "redis-call";
pub const REDIS_BROADCAST: &str = "redis-broadcast";

/// All plugins provided by this crate.
pub const PLUGINS: &[PluginDescriptor] = &[
    PluginDescriptor {
        name: REDIS_LISTEN,
        role: Role::Reader,
        description: "Listens for data being broadcast and forwards it as named records.",
    },
    PluginDescriptor {
        name: REDIS_CALL,
        role: Role::Filter,
        description: "Sends record data out and annotates the record with the text reply.",
    },
    PluginDescriptor {
        name: REDIS_BROADCAST,
        role: Role::Writer,
        description: "Broadcasts the incoming records on the specified channel.",
    },
];

/// Find a plugin by name.
pub fn lookup(name: &str) -> Option<&'static PluginDescriptor> {
    PLUGINS.iter().find(|p| p.name == name)
}

/// Plugin names grouped by role.
pub fn by_role() -> BTreeMap<Role, Vec<&'static str>> {
    let mut grouped: BTreeMap<Role, Vec<&'static str>> = BTreeMap::new();
    for plugin in PLUGINS {
        grouped.entry(plugin.role).or_default().push(plugin.name);
    }
    grouped
}
