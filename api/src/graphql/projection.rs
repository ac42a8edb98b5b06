//! Cuts resolved [`Node`]s down to exactly what the client selected.

use forward::document::{Directive, Document, Field, Selection, SelectionSet};
use serde_json::{Map, Value};

use super::node::Node;
use super::request::{GraphQlError, ResponsePath};

/// Fields of one selection level grouped by response key, in first-seen order.
pub type FieldGroups<'a> = Vec<(String, Vec<&'a Field>)>;

pub struct Projector<'a> {
    document: &'a Document,
    /// Client variables with operation defaults filled in.
    variables: &'a Map<String, Value>,
    errors: Vec<GraphQlError>,
}

impl<'a> Projector<'a> {
    pub fn new(document: &'a Document, variables: &'a Map<String, Value>) -> Self {
        Self {
            document,
            variables,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: GraphQlError) {
        self.errors.push(error);
    }

    pub fn into_errors(self) -> Vec<GraphQlError> {
        self.errors
    }

    /// Whether `@skip` / `@include` leave a selection in.
    pub fn included(&self, directives: &[Directive]) -> bool {
        directives.iter().all(|directive| {
            let condition = directive
                .arguments
                .iter()
                .find(|arg| arg.name == "if")
                .and_then(|arg| arg.value.to_json(self.variables).as_bool());
            match (directive.name.as_str(), condition) {
                ("skip", Some(true)) => false,
                ("include", Some(false)) => false,
                _ => true,
            }
        })
    }

    /// Groups the fields selected by `sets` on an object of type `typename`.
    ///
    /// With `typename = None` (forwarded data of unknown type) every fragment applies;
    /// fields whose type condition did not match upstream are simply absent there.
    pub fn collect_fields(&self, sets: &[&'a SelectionSet], typename: Option<&str>) -> FieldGroups<'a> {
        let mut groups: FieldGroups<'a> = Vec::new();
        let mut visited: Vec<&'a str> = Vec::new();
        for set in sets {
            self.collect_into(set, typename, &mut visited, &mut groups);
        }
        groups
    }

    fn collect_into(
        &self,
        set: &'a SelectionSet,
        typename: Option<&str>,
        visited: &mut Vec<&'a str>,
        groups: &mut FieldGroups<'a>,
    ) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if !self.included(&field.directives) {
                        continue;
                    }
                    let key = field.response_key();
                    match groups.iter_mut().find(|(k, _)| k == key) {
                        Some((_, fields)) => fields.push(field),
                        None => groups.push((key.to_string(), vec![field])),
                    }
                }
                Selection::InlineFragment(inline) => {
                    if self.included(&inline.directives)
                        && applies(inline.type_condition.as_deref(), typename)
                    {
                        self.collect_into(&inline.selection_set, typename, visited, groups);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives) || visited.contains(&spread.name.as_str()) {
                        continue;
                    }
                    let Some(fragment) = self.document.fragment(&spread.name) else {
                        continue;
                    };
                    if !applies(Some(&fragment.type_condition), typename) {
                        continue;
                    }
                    visited.push(&fragment.name);
                    self.collect_into(&fragment.selection_set, typename, visited, groups);
                }
            }
        }
    }

    /// Projects `node` through the merged selection of `fields` (all sharing one response key).
    pub fn project(&mut self, node: &Node, fields: &[&'a Field], path: &mut ResponsePath) -> Value {
        match node {
            Node::Null => Value::Null,
            Node::Scalar(value) => value.clone(),
            Node::List(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        path.push(Value::from(i));
                        let value = self.project(item, fields, path);
                        path.pop();
                        value
                    })
                    .collect(),
            ),
            Node::Forwarded(value) => {
                let sets = sub_selections(fields);
                self.project_forwarded(value, &sets, path)
            }
            Node::Object(object) => {
                let sets = sub_selections(fields);
                if sets.is_empty() {
                    let name = fields.first().map(|f| f.name.as_str()).unwrap_or_default();
                    self.errors.push(GraphQlError::at(
                        format!(
                            "Field \"{name}\" of type \"{}\" must have a selection of subfields.",
                            object.typename
                        ),
                        path,
                    ));
                    return Value::Null;
                }

                let mut out = Map::new();
                for (key, group) in self.collect_fields(&sets, Some(object.typename)) {
                    let name = group[0].name.as_str();
                    path.push(Value::from(key.as_str()));
                    let value = if name == "__typename" {
                        Value::from(object.typename)
                    } else {
                        match object.get(name) {
                            Some(child) => self.project(child, &group, path),
                            None => {
                                self.errors.push(GraphQlError::at(
                                    format!(
                                        "Cannot query field \"{name}\" on type \"{}\".",
                                        object.typename
                                    ),
                                    path,
                                ));
                                Value::Null
                            }
                        }
                    };
                    path.pop();
                    out.insert(key, value);
                }
                Value::Object(out)
            }
        }
    }

    /// Reads forwarded data by response key; the registration service already applied
    /// the client's aliases, so keys it did not return are left out.
    fn project_forwarded(
        &mut self,
        value: &Value,
        sets: &[&'a SelectionSet],
        path: &mut ResponsePath,
    ) -> Value {
        if sets.is_empty() {
            return value.clone();
        }
        match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        path.push(Value::from(i));
                        let projected = self.project_forwarded(item, sets, path);
                        path.pop();
                        projected
                    })
                    .collect(),
            ),
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, group) in self.collect_fields(sets, None) {
                    let Some(inner) = map.get(&key) else {
                        continue;
                    };
                    let child_sets = sub_selections(&group);
                    path.push(Value::from(key.as_str()));
                    let projected = self.project_forwarded(inner, &child_sets, path);
                    path.pop();
                    out.insert(key, projected);
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }
}

fn applies(condition: Option<&str>, typename: Option<&str>) -> bool {
    match (condition, typename) {
        (Some(condition), Some(typename)) => condition == typename,
        _ => true,
    }
}

fn sub_selections<'a>(fields: &[&'a Field]) -> Vec<&'a SelectionSet> {
    fields.iter().filter_map(|f| f.selection_set.as_ref()).collect()
}
