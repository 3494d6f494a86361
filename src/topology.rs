//! Router grouping derived from operation tags and paths.
//!
//! Versioned operations (paths under the configured API prefix) are grouped by
//! their first tag into `{tag}-router` groups. Each group's prefix is the path
//! segment following the API prefix, taken from the first operation in schema
//! order that carries the tag. Unversioned operations all land in a single
//! `legacy-router` group, which the aggregate router does not include.

use crate::config::PrefixTieBreak;
use crate::error::{Error, Result};
use crate::schema::{HttpMethod, Operation, SchemaDocument};
use log::{debug, warn};
use std::collections::HashMap;

pub const LEGACY_GROUP: &str = "legacy-router";

/// Identifies one operation by path and verb
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub path: String,
    pub method: HttpMethod,
}

impl OperationKey {
    pub fn of(op: &Operation) -> Self {
        Self {
            path: op.path.clone(),
            method: op.method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterGroup {
    /// `{tag}-router`, or `legacy-router`
    pub name: String,
    /// Tags listed on the group declaration
    pub tags: Vec<String>,
    /// Prefix relative to the API prefix (`/health`); empty for legacy
    pub prefix: String,
    pub members: Vec<OperationKey>,
}

impl RouterGroup {
    fn new(name: String, tags: Vec<String>, prefix: String) -> Self {
        Self {
            name,
            tags,
            prefix,
            members: Vec::new(),
        }
    }
}

/// Where an operation's handler is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    /// A tagged router group
    Group(&'a RouterGroup),
    /// Directly on the aggregate router (versioned, untagged)
    Aggregate,
    /// The legacy group, mounted separately by the caller
    Legacy(&'a RouterGroup),
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Group(usize),
    Aggregate,
    Legacy,
}

/// The resolved router layout for one document
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTopology {
    api_prefix: String,
    groups: Vec<RouterGroup>,
    legacy: RouterGroup,
    slots: HashMap<OperationKey, Slot>,
}

impl RouteTopology {
    /// Groups every operation of `doc`.
    ///
    /// # Errors
    ///
    /// With [`PrefixTieBreak::Reject`], returns a prefix-conflict error when an
    /// operation routed to a group derives a different prefix than the group.
    pub fn resolve(
        doc: &SchemaDocument,
        api_prefix: &str,
        tie_break: PrefixTieBreak,
    ) -> Result<Self> {
        let mut groups: Vec<RouterGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        // One group per distinct tag on versioned operations, first-seen order.
        // The prefix comes from the first operation carrying the tag.
        for op in doc.operations() {
            let Some(prefix) = derived_prefix(&op.path, api_prefix) else {
                continue;
            };
            for tag in &op.tags {
                if index.contains_key(tag) {
                    continue;
                }
                debug!("Router group {}-router uses prefix '{}' from {}", tag, prefix, op.path);
                index.insert(tag.clone(), groups.len());
                groups.push(RouterGroup::new(
                    format!("{tag}-router"),
                    vec![tag.clone()],
                    prefix.clone(),
                ));
            }
        }

        let mut legacy = RouterGroup::new(LEGACY_GROUP.to_string(), Vec::new(), String::new());
        let mut slots = HashMap::new();

        for op in doc.operations() {
            let key = OperationKey::of(op);
            let slot = match (derived_prefix(&op.path, api_prefix), op.first_tag()) {
                (None, tag) => {
                    if let Some(tag) = tag {
                        if !legacy.tags.iter().any(|t| t == tag) {
                            legacy.tags.push(tag.to_string());
                        }
                    }
                    legacy.members.push(key.clone());
                    Slot::Legacy
                }
                (Some(_), None) => {
                    debug!("{} {} has no tag; registering on the aggregate router", op.method, op.path);
                    Slot::Aggregate
                }
                (Some(prefix), Some(tag)) => {
                    let i = index[tag];
                    let group = &mut groups[i];
                    if group.prefix != prefix {
                        match tie_break {
                            PrefixTieBreak::Reject => {
                                return Err(Error::PrefixConflict {
                                    tag: tag.to_string(),
                                    kept: group.prefix.clone(),
                                    rejected: prefix,
                                    path: op.path.clone(),
                                });
                            }
                            PrefixTieBreak::FirstSeen => warn!(
                                "{} {} derives prefix '{}' but {} keeps '{}'",
                                op.method, op.path, prefix, group.name, group.prefix
                            ),
                        }
                    }
                    group.members.push(key.clone());
                    Slot::Group(i)
                }
            };
            slots.insert(key, slot);
        }

        Ok(Self {
            api_prefix: api_prefix.to_string(),
            groups,
            legacy,
            slots,
        })
    }

    /// Tagged groups in first-seen order, including groups without members
    pub fn groups(&self) -> &[RouterGroup] {
        &self.groups
    }

    pub fn legacy(&self) -> &RouterGroup {
        &self.legacy
    }

    pub fn group(&self, name: &str) -> Option<&RouterGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn placement(&self, op: &Operation) -> Placement<'_> {
        match self.slots.get(&OperationKey::of(op)) {
            Some(Slot::Group(i)) => Placement::Group(&self.groups[*i]),
            Some(Slot::Aggregate) => Placement::Aggregate,
            Some(Slot::Legacy) | None => Placement::Legacy(&self.legacy),
        }
    }

    /// Path of `op` relative to the router it is registered on.
    ///
    /// The API prefix and group prefix are stripped exactly once. An empty
    /// remainder maps to `/`.
    pub fn relative_path(&self, op: &Operation) -> String {
        let rest = match self.placement(op) {
            Placement::Legacy(_) => op.path.as_str(),
            Placement::Aggregate => strip_segment_prefix(&op.path, &self.api_prefix),
            Placement::Group(group) => {
                let versioned = strip_segment_prefix(&op.path, &self.api_prefix);
                strip_segment_prefix(versioned, &group.prefix)
            }
        };
        if rest.is_empty() {
            "/".to_string()
        } else {
            rest.to_string()
        }
    }
}

/// For a versioned path, the `/segment` following the API prefix (possibly
/// empty); `None` for paths outside the API prefix.
fn derived_prefix(path: &str, api_prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(api_prefix)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(
        rest.split('/')
            .find(|s| !s.is_empty())
            .map(|s| format!("/{s}"))
            .unwrap_or_default(),
    )
}

/// Strip `prefix` from `path` only when it ends on a segment boundary
fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
