//! Locates the sub-selection a forwarded field delegates upstream, and works out which
//! fragments and variables that sub-selection actually depends on.

use crate::document::*;

/// Result of walking a configured path through the client's selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<'a> {
    /// The fields whose selection sets are forwarded. Same-key nodes merge, so there
    /// can be more than one.
    Found(Vec<&'a Field>),
    /// A path is configured but the client did not select all of it.
    Unresolved,
    /// The resolver was handed no field node at all.
    Missing,
}

/// Walks `path` starting from the field nodes of the field being resolved.
///
/// The first path segment names the field being resolved itself; every following
/// segment must be a field (matched by name, aliases ignored) with its own selection
/// set. Fragment spreads and inline fragments are folded into each step, and every
/// match at the last step is kept.
pub fn locate_target<'a>(
    document: &'a Document,
    field_nodes: &[&'a Field],
    path: Option<&str>,
) -> Target<'a> {
    if field_nodes.is_empty() {
        return Target::Missing;
    }
    let Some(path) = path else {
        return Target::Found(field_nodes.to_vec());
    };

    let mut current: Vec<&'a Field> = field_nodes.to_vec();
    for segment in path.split('.').skip(1) {
        let mut candidates = Vec::new();
        for field in current.iter().copied() {
            if let Some(set) = &field.selection_set {
                collect_fields(document, set, &mut Vec::new(), &mut candidates);
            }
        }
        current = candidates
            .into_iter()
            .filter(|f| f.name == segment && f.selection_set.is_some())
            .collect();
        if current.is_empty() {
            return Target::Unresolved;
        }
    }
    Target::Found(current)
}

/// Every field `set` selects at its own level, looking through fragments.
pub fn selected_fields<'a>(document: &'a Document, set: &'a SelectionSet) -> Vec<&'a Field> {
    let mut out = Vec::new();
    collect_fields(document, set, &mut Vec::new(), &mut out);
    out
}

/// Pushes every field selected by `set`, looking through fragments. `visiting` holds the
/// fragment names on the current expansion stack so self-referencing fragments terminate.
fn collect_fields<'a>(
    document: &'a Document,
    set: &'a SelectionSet,
    visiting: &mut Vec<&'a str>,
    out: &mut Vec<&'a Field>,
) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => out.push(field),
            Selection::InlineFragment(inline) => {
                collect_fields(document, &inline.selection_set, visiting, out)
            }
            Selection::FragmentSpread(spread) => {
                if visiting.contains(&spread.name.as_str()) {
                    continue;
                }
                if let Some(fragment) = document.fragment(&spread.name) {
                    visiting.push(&fragment.name);
                    collect_fields(document, &fragment.selection_set, visiting, out);
                    visiting.pop();
                }
            }
        }
    }
}

/// Fragment definitions transitively reachable from `set`, in first-use order, each once.
pub fn reachable_fragments<'a>(
    document: &'a Document,
    set: &'a SelectionSet,
) -> Vec<&'a FragmentDefinition> {
    let mut found: Vec<&'a FragmentDefinition> = Vec::new();
    let mut queue: Vec<&'a SelectionSet> = vec![set];
    let mut next = 0;
    while next < queue.len() {
        let mut spreads = Vec::new();
        spread_names(queue[next], &mut spreads);
        next += 1;
        for name in spreads {
            if found.iter().any(|f| f.name == name) {
                continue;
            }
            if let Some(fragment) = document.fragment(name) {
                found.push(fragment);
                queue.push(&fragment.selection_set);
            }
        }
    }
    found
}

fn spread_names<'a>(set: &'a SelectionSet, out: &mut Vec<&'a str>) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => {
                if let Some(inner) = &field.selection_set {
                    spread_names(inner, out);
                }
            }
            Selection::InlineFragment(inline) => spread_names(&inline.selection_set, out),
            Selection::FragmentSpread(spread) => {
                if !out.contains(&spread.name.as_str()) {
                    out.push(&spread.name);
                }
            }
        }
    }
}

/// Variables used by a field call's arguments and directives, some selection sets and a
/// list of fragment definitions, in first-use order.
pub fn referenced_variables(
    head: Option<&Field>,
    bodies: &[&SelectionSet],
    fragments: &[&FragmentDefinition],
) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(field) = head {
        field_call_variables(field, &mut names);
    }
    for set in bodies {
        selection_variables(set, &mut names);
    }
    for fragment in fragments {
        fragment
            .directives
            .iter()
            .for_each(|d| d.collect_variables(&mut names));
        selection_variables(&fragment.selection_set, &mut names);
    }
    names
}

fn field_call_variables(field: &Field, out: &mut Vec<String>) {
    for arg in &field.arguments {
        arg.value.collect_variables(out);
    }
    field.directives.iter().for_each(|d| d.collect_variables(out));
}

fn selection_variables(set: &SelectionSet, out: &mut Vec<String>) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => {
                field_call_variables(field, out);
                if let Some(inner) = &field.selection_set {
                    selection_variables(inner, out);
                }
            }
            Selection::InlineFragment(inline) => {
                inline.directives.iter().for_each(|d| d.collect_variables(out));
                selection_variables(&inline.selection_set, out);
            }
            Selection::FragmentSpread(spread) => {
                spread.directives.iter().for_each(|d| d.collect_variables(out));
            }
        }
    }
}

/// Top-level fields of an operation's selection, in document order.
pub fn root_fields(operation: &OperationDefinition) -> Vec<&Field> {
    operation
        .selection_set
        .selections
        .iter()
        .filter_map(|s| match s {
            Selection::Field(field) => Some(field),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn fields_named<'a>(doc: &'a Document, name: &str) -> Vec<&'a Field> {
        let op = doc.operations().next().unwrap();
        root_fields(op).into_iter().filter(|f| f.name == name).collect()
    }

    #[test]
    fn finds_nested_target_through_fragments() {
        let src = r#"
            mutation { check_in(user: "u", tag: "t") { ...Identity tags { checked_in } } }
            fragment Identity on UserAndTags { ... on UserAndTags { user { name } } }
        "#;
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "check_in");
        match locate_target(&doc, &nodes, Some("check_in.user")) {
            Target::Found(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].name, "user");
                assert_eq!(fields[0].selection_set.as_ref().unwrap().span.slice(src), "{ name }");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn alias_does_not_hide_path_segment() {
        let src = "{ user(id: \"1\") { who: user { name } } }";
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "user");
        let target = locate_target(&doc, &nodes, Some("user.user"));
        assert!(matches!(target, Target::Found(f) if f[0].alias.as_deref() == Some("who")));
    }

    #[test]
    fn omitted_segment_is_unresolved() {
        let doc = parse("{ user(id: \"1\") { tags { checked_in } } }").unwrap();
        let nodes = fields_named(&doc, "user");
        assert_eq!(locate_target(&doc, &nodes, Some("user.user")), Target::Unresolved);
    }

    #[test]
    fn no_path_targets_the_field_nodes_and_no_nodes_is_missing() {
        let doc = parse("{ question_names(branch: \"x\") }").unwrap();
        let nodes = fields_named(&doc, "question_names");
        assert!(matches!(
            locate_target(&doc, &nodes, None),
            Target::Found(f) if f.len() == 1 && f[0].name == "question_names"
        ));
        assert_eq!(locate_target(&doc, &[], Some("user.user")), Target::Missing);
    }

    #[test]
    fn self_referencing_fragments_terminate() {
        let src = "{ user(id: \"1\") { ...A } } fragment A on U { ...B } fragment B on U { ...A user { id } }";
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "user");
        assert!(matches!(
            locate_target(&doc, &nodes, Some("user.user")),
            Target::Found(f) if f[0].name == "user"
        ));
        let set = nodes[0].selection_set.as_ref().unwrap();
        let names: Vec<_> = reachable_fragments(&doc, set).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn reachable_fragments_skip_unused_definitions() {
        let src = r#"
            { user(id: "1") { user { ...Outer } } }
            fragment Unused on User { id }
            fragment Outer on User { name ...Inner }
            fragment Inner on User { email }
        "#;
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "user");
        let Target::Found(targets) = locate_target(&doc, &nodes, Some("user.user")) else {
            panic!("target not found");
        };
        let set = targets[0].selection_set.as_ref().unwrap();
        let names: Vec<_> = reachable_fragments(&doc, set).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn collects_variables_from_head_body_and_fragments() {
        let src = r#"
            query ($id: ID!, $q: String, $skip: Boolean!, $unused: Int) {
                user(id: $id) { user { ...F answer(question: $q) } }
            }
            fragment F on User { email @skip(if: $skip) }
        "#;
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "user");
        let Target::Found(targets) = locate_target(&doc, &nodes, Some("user.user")) else {
            panic!("target not found");
        };
        let set = targets[0].selection_set.as_ref().unwrap();
        let fragments = reachable_fragments(&doc, set);
        let vars = referenced_variables(Some(nodes[0]), &[set], &fragments);
        assert_eq!(vars, vec!["id", "q", "skip"]);
    }

    #[test]
    fn merged_nodes_keep_every_target() {
        let src = r#"{ user(id: "1") { user { name } } user(id: "1") { user { email } } }"#;
        let doc = parse(src).unwrap();
        let nodes = fields_named(&doc, "user");
        let Target::Found(targets) = locate_target(&doc, &nodes, Some("user.user")) else {
            panic!("target not found");
        };
        let bodies: Vec<_> = targets
            .iter()
            .map(|f| f.selection_set.as_ref().unwrap().span.slice(src))
            .collect();
        assert_eq!(bodies, vec!["{ name }", "{ email }"]);
    }
}
