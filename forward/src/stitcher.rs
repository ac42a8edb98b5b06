//! Builds a standalone upstream query out of a slice of the client's document.
//!
//! The result is `query(<signature>) { <head> <body> }` followed by the fragment
//! definitions the body needs. Every piece except the injected fields and the typename
//! probe is copied from the client source verbatim.

use serde_json::Value as Json;

use crate::analyzer::{Target, locate_target, reachable_fragments, referenced_variables, selected_fields};
use crate::document::*;
use crate::error::ParseError;
use crate::forwarder::ForwardSpec;
use crate::parser::call_variables;

const TYPENAME_PROBE: &str = "__typename";

/// Alias prefix for an always-requested field whose own name is taken in the client's
/// selection by a different field, e.g. `{ id: name }`.
pub const INCLUDE_ALIAS_PREFIX: &str = "_include_";

/// Reads an always-requested field from a forwarded object, wherever it was stitched.
pub fn included_field<'v>(object: &'v Json, name: &str) -> Option<&'v Json> {
    object
        .get(format!("{INCLUDE_ALIAS_PREFIX}{name}"))
        .or_else(|| object.get(name))
}

/// A query ready to send upstream, plus the variable names its signature declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchedQuery {
    pub query: String,
    pub variables: Vec<String>,
}

/// Stitches the forwarded query for one field invocation.
///
/// Returns `Ok(None)` when there is no field node to forward, in which case nothing
/// should be sent upstream.
pub fn stitch(
    source: &str,
    document: &Document,
    operation: &OperationDefinition,
    field_nodes: &[&Field],
    spec: &ForwardSpec,
) -> Result<Option<StitchedQuery>, ParseError> {
    let Some(current) = field_nodes.first().copied() else {
        return Ok(None);
    };

    let (body, sets) = match locate_target(document, field_nodes, spec.path.as_deref()) {
        Target::Missing => return Ok(None),
        Target::Unresolved => (probe_body(&spec.include), Vec::new()),
        Target::Found(fields) => {
            let sets: Vec<&SelectionSet> = fields
                .iter()
                .filter_map(|field| field.selection_set.as_ref())
                .collect();
            (merge_bodies(source, document, &sets, &spec.include), sets)
        }
    };

    let mut fragments: Vec<&FragmentDefinition> = Vec::new();
    for set in &sets {
        for fragment in reachable_fragments(document, set) {
            if !fragments.iter().any(|f| f.name == fragment.name) {
                fragments.push(fragment);
            }
        }
    }

    let (head, mut used) = match &spec.head {
        Some(literal) => {
            let mut used = call_variables(literal)?;
            for name in referenced_variables(None, &sets, &fragments) {
                if !used.contains(&name) {
                    used.push(name);
                }
            }
            (literal.trim().to_string(), used)
        }
        None => (
            call_text(source, current).to_string(),
            referenced_variables(Some(current), &sets, &fragments),
        ),
    };

    // Declaration order, not first-use order.
    let declared: Vec<&VariableDefinition> = operation
        .variables
        .iter()
        .filter(|def| used.contains(&def.name))
        .collect();
    used = declared.iter().map(|def| def.name.clone()).collect();

    let signature = if declared.is_empty() {
        String::new()
    } else {
        let defs: Vec<&str> = declared.iter().map(|def| def.span.slice(source)).collect();
        format!("({})", defs.join(", "))
    };

    let mut query = if body.is_empty() {
        format!("query{signature} {{ {head} }}")
    } else {
        format!("query{signature} {{ {head} {body} }}")
    };
    for fragment in fragments {
        query.push('\n');
        query.push_str(fragment.span.slice(source));
    }

    Ok(Some(StitchedQuery {
        query,
        variables: used,
    }))
}

/// The field's name, arguments and directives, without its alias or selection set.
fn call_text<'s>(source: &'s str, field: &Field) -> &'s str {
    let end = field
        .selection_set
        .as_ref()
        .map(|set| set.span.start)
        .unwrap_or(field.span.end);
    Span::new(field.name_start, end).slice(source).trim_end()
}

fn probe_body(include: &[String]) -> String {
    let mut names: Vec<&str> = include.iter().map(String::as_str).collect();
    if !names.contains(&TYPENAME_PROBE) {
        names.push(TYPENAME_PROBE);
    }
    format!("{{ {} }}", names.join(" "))
}

/// One selection set holding every target's selections, with each `include` field
/// added right after the opening brace unless a direct selection already is that field
/// under its own name. An include whose name is taken by another field goes in under
/// [`INCLUDE_ALIAS_PREFIX`].
fn merge_bodies(source: &str, document: &Document, sets: &[&SelectionSet], include: &[String]) -> String {
    if sets.is_empty() {
        return String::new();
    }

    let mut parts: Vec<String> = Vec::new();
    for name in include {
        if sets.iter().any(|set| selects_plainly(set, name)) {
            continue;
        }
        let taken = sets.iter().any(|set| {
            selected_fields(document, set)
                .iter()
                .any(|field| field.response_key() == name && field.name != *name)
        });
        parts.push(if taken {
            format!("{INCLUDE_ALIAS_PREFIX}{name}: {name}")
        } else {
            name.clone()
        });
    }
    for set in sets {
        let text = set.span.slice(source);
        let inner = text
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(text)
            .trim();
        parts.push(inner.to_string());
    }
    format!("{{ {} }}", parts.join(" "))
}

/// Whether `set` directly selects `name` unaliased (or aliased to itself).
fn selects_plainly(set: &SelectionSet, name: &str) -> bool {
    set.selections.iter().any(|s| {
        matches!(s, Selection::Field(f) if f.name == name && f.response_key() == name)
    })
}
