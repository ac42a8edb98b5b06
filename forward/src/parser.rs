//! Builds the typed [`Document`] out of `apollo-parser`'s lossless syntax tree.
//!
//! Only the executable subset is accepted (operations and fragments); type system
//! definitions are rejected. Spans are taken from the tree's text ranges, narrowed to a
//! node's first and last significant token so trailing commas, whitespace and comments
//! never end up in a stitched query.

use apollo_parser::Parser;
use apollo_parser::cst::{self, CstNode};

use crate::analyzer::{referenced_variables, root_fields};
use crate::document::*;
use crate::error::ParseError;

const RECURSION_LIMIT: usize = 256;

/// Parses `source` into a [`Document`].
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let tree = Parser::new(source).recursion_limit(RECURSION_LIMIT).parse();
    if let Some(error) = tree.errors().next() {
        return Err(ParseError::new(error.index(), error.message()));
    }

    let builder = Builder { source };
    let mut definitions = Vec::new();
    for definition in tree.document().definitions() {
        definitions.push(match definition {
            cst::Definition::OperationDefinition(op) => Definition::Operation(builder.operation(&op)?),
            cst::Definition::FragmentDefinition(frag) => Definition::Fragment(builder.fragment(&frag)?),
            other => {
                return Err(ParseError::new(
                    span(&other).start,
                    "Expected an operation or fragment definition",
                ));
            }
        });
    }
    if definitions.is_empty() {
        return Err(ParseError::new(0, "Document contains no definitions"));
    }
    let document = Document { definitions };
    check_fragments(&document)?;
    Ok(document)
}

/// Variables named by a lone field call such as `user(id: $id)`.
///
/// Used for literal heads supplied by configuration, which never appear in a client
/// document.
pub fn call_variables(call: &str) -> Result<Vec<String>, ParseError> {
    let wrapped = format!("{{ {call} }}");
    let document = parse(&wrapped)
        .map_err(|e| ParseError::new(e.offset.saturating_sub(2).min(call.len()), e.message))?;
    let head = document
        .operation(None)
        .and_then(|op| root_fields(op).first().copied());
    Ok(referenced_variables(head, &[], &[]))
}

/// Byte range of `node` from its first significant token to its last.
fn span(node: &impl CstNode) -> Span {
    let syntax = node.syntax();
    let mut tokens = syntax
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !is_ignored(token.text()));
    match tokens.next() {
        Some(first) => {
            let start = first.text_range().start();
            let end = tokens.last().unwrap_or(first).text_range().end();
            Span::new(start.into(), end.into())
        }
        None => {
            let at = syntax.text_range().start().into();
            Span::new(at, at)
        }
    }
}

/// Whitespace, commas, comments and the byte order mark carry no meaning.
fn is_ignored(text: &str) -> bool {
    text.starts_with('#') || text.chars().all(|c| c.is_whitespace() || c == ',' || c == '\u{feff}')
}

fn required<T>(node: Option<T>, at: usize, what: &str) -> Result<T, ParseError> {
    node.ok_or_else(|| ParseError::new(at, format!("Expected {what}")))
}

fn name_of(node: Option<cst::Name>, at: usize) -> Result<String, ParseError> {
    required(node, at, "name").map(|name| name.text().to_string())
}

struct Builder<'s> {
    source: &'s str,
}

impl Builder<'_> {
    fn operation(&self, op: &cst::OperationDefinition) -> Result<OperationDefinition, ParseError> {
        let span = span(op);
        let kind = match op.operation_type() {
            Some(ty) if ty.mutation_token().is_some() => OperationKind::Mutation,
            Some(ty) if ty.subscription_token().is_some() => OperationKind::Subscription,
            _ => OperationKind::Query,
        };
        let variables = match op.variable_definitions() {
            Some(list) => list
                .variable_definitions()
                .map(|def| self.variable_definition(&def))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(OperationDefinition {
            kind,
            name: op.name().map(|name| name.text().to_string()),
            variables,
            directives: self.directives(op.directives(), false)?,
            selection_set: self.selection_set(required(op.selection_set(), span.start, "'{'")?)?,
            span,
        })
    }

    fn variable_definition(&self, def: &cst::VariableDefinition) -> Result<VariableDefinition, ParseError> {
        let span = span(def);
        let variable = required(def.variable(), span.start, "'$'")?;
        let default_value = match def.default_value().and_then(|default| default.value()) {
            Some(value) => Some(self.value(&value, true)?),
            None => None,
        };
        Ok(VariableDefinition {
            name: name_of(variable.name(), span.start)?,
            default_value,
            span,
        })
    }

    fn fragment(&self, frag: &cst::FragmentDefinition) -> Result<FragmentDefinition, ParseError> {
        let span = span(frag);
        let name = name_of(
            frag.fragment_name().and_then(|name| name.name()),
            span.start,
        )?;
        if name == "on" {
            return Err(ParseError::new(span.start, "Fragment cannot be named 'on'"));
        }
        let type_condition = name_of(
            frag.type_condition()
                .and_then(|condition| condition.named_type())
                .and_then(|ty| ty.name()),
            span.start,
        )?;
        Ok(FragmentDefinition {
            name,
            type_condition,
            directives: self.directives(frag.directives(), false)?,
            selection_set: self.selection_set(required(frag.selection_set(), span.start, "'{'")?)?,
            span,
        })
    }

    fn selection_set(&self, set: cst::SelectionSet) -> Result<SelectionSet, ParseError> {
        let span = span(&set);
        let selections = set
            .selections()
            .map(|selection| self.selection(selection))
            .collect::<Result<Vec<_>, _>>()?;
        if selections.is_empty() {
            return Err(ParseError::new(span.start, "Selection set cannot be empty"));
        }
        Ok(SelectionSet { selections, span })
    }

    fn selection(&self, selection: cst::Selection) -> Result<Selection, ParseError> {
        match selection {
            cst::Selection::Field(field) => self.field(&field).map(Selection::Field),
            cst::Selection::FragmentSpread(spread) => {
                let span = span(&spread);
                Ok(Selection::FragmentSpread(FragmentSpread {
                    name: name_of(spread.fragment_name().and_then(|name| name.name()), span.start)?,
                    directives: self.directives(spread.directives(), false)?,
                    span,
                }))
            }
            cst::Selection::InlineFragment(inline) => {
                let span = span(&inline);
                let type_condition = match inline.type_condition() {
                    Some(condition) => Some(name_of(
                        condition.named_type().and_then(|ty| ty.name()),
                        span.start,
                    )?),
                    None => None,
                };
                Ok(Selection::InlineFragment(InlineFragment {
                    type_condition,
                    directives: self.directives(inline.directives(), false)?,
                    selection_set: self.selection_set(required(inline.selection_set(), span.start, "'{'")?)?,
                    span,
                }))
            }
        }
    }

    fn field(&self, field: &cst::Field) -> Result<Field, ParseError> {
        let span = span(field);
        let name = required(field.name(), span.start, "name")?;
        let alias = match field.alias() {
            Some(alias) => Some(name_of(alias.name(), span.start)?),
            None => None,
        };
        let selection_set = match field.selection_set() {
            Some(set) => Some(self.selection_set(set)?),
            None => None,
        };
        Ok(Field {
            alias,
            name_start: self::span(&name).start,
            name: name.text().to_string(),
            arguments: self.arguments(field.arguments(), false)?,
            directives: self.directives(field.directives(), false)?,
            selection_set,
            span,
        })
    }

    fn arguments(&self, list: Option<cst::Arguments>, constant: bool) -> Result<Vec<Argument>, ParseError> {
        let Some(list) = list else {
            return Ok(Vec::new());
        };
        list.arguments()
            .map(|arg| -> Result<Argument, ParseError> {
                let at = span(&arg).start;
                Ok(Argument {
                    name: name_of(arg.name(), at)?,
                    value: self.value(&required(arg.value(), at, "a value")?, constant)?,
                })
            })
            .collect()
    }

    fn directives(&self, list: Option<cst::Directives>, constant: bool) -> Result<Vec<Directive>, ParseError> {
        let Some(list) = list else {
            return Ok(Vec::new());
        };
        list.directives()
            .map(|directive| -> Result<Directive, ParseError> {
                let at = span(&directive).start;
                Ok(Directive {
                    name: name_of(directive.name(), at)?,
                    arguments: self.arguments(directive.arguments(), constant)?,
                })
            })
            .collect()
    }

    fn value(&self, value: &cst::Value, constant: bool) -> Result<Value, ParseError> {
        let span = span(value);
        Ok(match value {
            cst::Value::Variable(variable) => {
                if constant {
                    return Err(ParseError::new(span.start, "Variables are not allowed here"));
                }
                Value::Variable(name_of(variable.name(), span.start)?)
            }
            cst::Value::StringValue(s) => Value::String(String::from(s)),
            cst::Value::IntValue(_) => Value::Int(span.slice(self.source).to_string()),
            cst::Value::FloatValue(_) => Value::Float(span.slice(self.source).to_string()),
            cst::Value::BooleanValue(b) => Value::Boolean(b.true_token().is_some()),
            cst::Value::NullValue(_) => Value::Null,
            cst::Value::EnumValue(e) => Value::Enum(name_of(e.name(), span.start)?),
            cst::Value::ListValue(list) => Value::List(
                list.values()
                    .map(|item| self.value(&item, constant))
                    .collect::<Result<_, _>>()?,
            ),
            cst::Value::ObjectValue(object) => Value::Object(
                object
                    .object_fields()
                    .map(|field| -> Result<(String, Value), ParseError> {
                        let at = self::span(&field).start;
                        let inner = required(field.value(), at, "a value")?;
                        Ok((name_of(field.name(), at)?, self.value(&inner, constant)?))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// Every spread must name a defined fragment, and fragment names must be unique.
fn check_fragments(document: &Document) -> Result<(), ParseError> {
    let mut seen: Vec<&str> = Vec::new();
    for fragment in document.fragments() {
        if seen.contains(&fragment.name.as_str()) {
            return Err(ParseError::new(
                fragment.span.start,
                format!("There can be only one fragment named '{}'", fragment.name),
            ));
        }
        seen.push(&fragment.name);
    }

    let mut pending: Vec<&SelectionSet> = document
        .definitions
        .iter()
        .map(|d| match d {
            Definition::Operation(op) => &op.selection_set,
            Definition::Fragment(frag) => &frag.selection_set,
        })
        .collect();
    while let Some(set) = pending.pop() {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => pending.extend(field.selection_set.as_ref()),
                Selection::InlineFragment(inline) => pending.push(&inline.selection_set),
                Selection::FragmentSpread(spread) => {
                    if !seen.contains(&spread.name.as_str()) {
                        return Err(ParseError::new(
                            spread.span.start,
                            format!("Unknown fragment '{}'", spread.name),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}
