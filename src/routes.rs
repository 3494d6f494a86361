//! Route planning shared by the route scaffolding and the client helpers.
//!
//! A [`RoutePlan`] holds one [`PlannedRoute`] per (path, verb), in schema
//! order, with the identifier, router placement, relative path, parameters,
//! types and handler body already decided. Both targets render from the same
//! plan, which keeps handler names and client helper names in step.

use crate::binding::{HandlerBody, ServiceBindingResolver};
use crate::naming;
use crate::schema::{HttpMethod, SchemaDocument, SchemaType};
use crate::topology::{Placement, RouteTopology, RouterGroup};
use log::{debug, warn};
use std::collections::HashSet;

/// Router a handler is registered on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterRef {
    Group(String),
    Aggregate,
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub operation_id: String,
    pub method: HttpMethod,
    /// Absolute path template from the schema
    pub path: String,
    /// Path relative to `router`
    pub relative_path: String,
    pub router: RouterRef,
    /// `{name}` tokens in left-to-right order; always string-typed
    pub path_params: Vec<String>,
    pub request: Option<SchemaType>,
    pub response: SchemaType,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub body: HandlerBody,
}

/// Every route of a document together with its router layout
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub topology: RouteTopology,
    pub routes: Vec<PlannedRoute>,
}

impl RoutePlan {
    pub fn build(
        doc: &SchemaDocument,
        topology: RouteTopology,
        resolver: &ServiceBindingResolver<'_>,
    ) -> Self {
        let ids = operation_ids(doc);
        let routes = doc
            .operations()
            .zip(ids)
            .map(|(op, operation_id)| {
                let router = match topology.placement(op) {
                    Placement::Group(group) => RouterRef::Group(group.name.clone()),
                    Placement::Aggregate => RouterRef::Aggregate,
                    Placement::Legacy(_) => RouterRef::Legacy,
                };
                let body = resolver.resolve(&operation_id, op.request_body.is_some());
                debug!("Planned {} {} as {}", op.method, op.path, operation_id);
                PlannedRoute {
                    relative_path: topology.relative_path(op),
                    path_params: path_parameters(&op.path),
                    method: op.method,
                    path: op.path.clone(),
                    router,
                    request: op.request_body.clone(),
                    response: op.response.clone(),
                    summary: op.summary.clone(),
                    description: op.description.clone(),
                    body,
                    operation_id,
                }
            })
            .collect();

        Self { topology, routes }
    }

    /// Tagged groups that have at least one handler, in first-seen order
    pub fn active_groups(&self) -> impl Iterator<Item = &RouterGroup> {
        self.topology.groups().iter().filter(|g| !g.members.is_empty())
    }

    pub fn has_legacy_routes(&self) -> bool {
        !self.topology.legacy().members.is_empty()
    }
}

/// Unique operation identifiers for every operation, in schema order.
///
/// Uses the explicit `operationId` when present, otherwise a fallback built
/// from the verb and path. Repeats get a numeric suffix.
pub fn operation_ids(doc: &SchemaDocument) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.operations()
        .map(|op| {
            let base = match &op.operation_id {
                Some(id) => naming::sanitize_identifier(id),
                None => naming::fallback_operation_id(op.method.as_str(), &op.path),
            };
            let id = naming::unique_name(&mut seen, &base);
            if id != base {
                warn!("Duplicate operation identifier '{}', using '{}'", base, id);
            }
            id
        })
        .collect()
}

/// Names of the `{name}` tokens of a path template, left to right
pub fn path_parameters(path: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() {
            params.push(name.to_string());
        }
        rest = &after[end + 1..];
    }
    params
}
