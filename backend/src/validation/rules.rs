use serde_json::Value;
use std::{fmt, sync::Arc};

use super::{DefinitionError, FieldErrorMap, FormRecord, formats::Format};

/// A predicate over the whole record. Must not panic on unexpected shapes it can
/// reasonably meet; a panic is treated as a defect in the form definition.
pub type RecordPredicate = Arc<dyn Fn(&FormRecord) -> bool + Send + Sync>;

// --- Conditions ---

/// Condition
///
/// Decides whether a conditional rule applies to the current record.
#[derive(Clone)]
pub enum Condition {
    /// The field holds boolean `true`.
    IsTrue(String),
    /// The field holds exactly this JSON value.
    Equals(String, Value),
    /// The field is filled (see [`FormRecord::is_filled`]).
    Filled(String),
    Not(Box<Condition>),
    Custom(RecordPredicate),
}

impl Condition {
    pub fn is_true(path: &str) -> Self {
        Condition::IsTrue(path.to_string())
    }

    pub fn equals(path: &str, value: impl Into<Value>) -> Self {
        Condition::Equals(path.to_string(), value.into())
    }

    pub fn filled(path: &str) -> Self {
        Condition::Filled(path.to_string())
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Arbitrary predicate over the record.
    ///
    /// Inside a scoped stage the predicate is not rewritten: it always receives the whole
    /// record and must address fields by their full path (`declaration.agreed`, not
    /// `agreed`).
    pub fn custom(predicate: impl Fn(&FormRecord) -> bool + Send + Sync + 'static) -> Self {
        Condition::Custom(Arc::new(predicate))
    }

    pub fn holds(&self, record: &FormRecord) -> bool {
        match self {
            Condition::IsTrue(path) => record.get(path) == Some(&Value::Bool(true)),
            Condition::Equals(path, expected) => record.get(path) == Some(expected),
            Condition::Filled(path) => record.is_filled(path),
            Condition::Not(inner) => !inner.holds(record),
            Condition::Custom(predicate) => predicate(record),
        }
    }

    fn scoped(self, scope: &str) -> Self {
        match self {
            Condition::IsTrue(path) => Condition::IsTrue(join(scope, &path)),
            Condition::Equals(path, value) => Condition::Equals(join(scope, &path), value),
            Condition::Filled(path) => Condition::Filled(join(scope, &path)),
            Condition::Not(inner) => Condition::Not(Box::new(inner.scoped(scope))),
            custom @ Condition::Custom(_) => custom,
        }
    }

    fn check_paths(&self, stage: &str) -> Result<(), DefinitionError> {
        match self {
            Condition::IsTrue(path) | Condition::Equals(path, _) | Condition::Filled(path) => {
                check_path(stage, path)
            }
            Condition::Not(inner) => inner.check_paths(stage),
            Condition::Custom(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::IsTrue(path) => f.debug_tuple("IsTrue").field(path).finish(),
            Condition::Equals(path, value) => {
                f.debug_tuple("Equals").field(path).field(value).finish()
            }
            Condition::Filled(path) => f.debug_tuple("Filled").field(path).finish(),
            Condition::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Condition::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// --- Rules ---

/// Rule
///
/// One field constraint. Every variant is interpreted by [`Rule::check`]; a stage is
/// just an ordered list of these.
#[derive(Clone)]
pub enum Rule {
    Required {
        field: String,
        message: String,
    },
    RequiredIf {
        field: String,
        when: Condition,
        message: String,
    },
    /// At least one field of the group must be truthy. The error is reported under
    /// `report_to`, or the first field when unset.
    AtLeastOneOf {
        fields: Vec<String>,
        report_to: Option<String>,
        message: String,
    },
    /// When the condition holds, each subfield is individually required.
    RequiredIfGroup {
        group: String,
        when: Condition,
        subfields: Vec<String>,
        message: String,
    },
    /// Applies only to filled fields; pair with `Required` to demand a value.
    Format {
        field: String,
        format: Format,
        message: String,
    },
    Length {
        field: String,
        min: Option<usize>,
        max: Option<usize>,
        message: String,
    },
    Custom {
        field: String,
        check: RecordPredicate,
        message: String,
    },
}

impl Rule {
    pub fn required(field: &str, message: &str) -> Self {
        Rule::Required {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn required_if(field: &str, when: Condition, message: &str) -> Self {
        Rule::RequiredIf {
            field: field.to_string(),
            when,
            message: message.to_string(),
        }
    }

    pub fn at_least_one_of(fields: &[&str], message: &str) -> Self {
        Rule::AtLeastOneOf {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            report_to: None,
            message: message.to_string(),
        }
    }

    /// Subfields become required while the boolean `group` flag is `true`.
    pub fn required_if_group(group: &str, subfields: &[&str], message: &str) -> Self {
        Rule::RequiredIfGroup {
            group: group.to_string(),
            when: Condition::is_true(group),
            subfields: subfields.iter().map(|f| f.to_string()).collect(),
            message: message.to_string(),
        }
    }

    pub fn format(field: &str, format: Format, message: &str) -> Self {
        Rule::Format {
            field: field.to_string(),
            format,
            message: message.to_string(),
        }
    }

    pub fn length(field: &str, min: Option<usize>, max: Option<usize>, message: &str) -> Self {
        Rule::Length {
            field: field.to_string(),
            min,
            max,
            message: message.to_string(),
        }
    }

    /// Reports `message` under `field` when `check` returns false.
    ///
    /// Scoping is asymmetric for this rule. In a scoped stage `field` is relative to the
    /// scope and the error lands under the full path, but `check` still receives the whole
    /// record and reads fields by their full path.
    pub fn custom(
        field: &str,
        check: impl Fn(&FormRecord) -> bool + Send + Sync + 'static,
        message: &str,
    ) -> Self {
        Rule::Custom {
            field: field.to_string(),
            check: Arc::new(check),
            message: message.to_string(),
        }
    }

    /// Records every violation of this rule into `errors`.
    pub fn check(&self, record: &FormRecord, errors: &mut FieldErrorMap) {
        match self {
            Rule::Required { field, message } => {
                if !record.is_filled(field) {
                    errors.push(field, message);
                }
            }
            Rule::RequiredIf {
                field,
                when,
                message,
            } => {
                if when.holds(record) && !record.is_filled(field) {
                    errors.push(field, message);
                }
            }
            Rule::AtLeastOneOf {
                fields,
                report_to,
                message,
            } => {
                if !fields.iter().any(|f| record.is_truthy(f)) {
                    let target = report_to.as_ref().unwrap_or(&fields[0]);
                    errors.push(target, message);
                }
            }
            Rule::RequiredIfGroup {
                when,
                subfields,
                message,
                ..
            } => {
                if when.holds(record) {
                    for subfield in subfields.iter().filter(|f| !record.is_filled(f)) {
                        errors.push(subfield, message);
                    }
                }
            }
            Rule::Format {
                field,
                format,
                message,
            } => {
                if record.is_filled(field) {
                    let valid = record.str_at(field).is_some_and(|v| format.matches(v));
                    if !valid {
                        errors.push(field, message);
                    }
                }
            }
            Rule::Length {
                field,
                min,
                max,
                message,
            } => {
                let len = match record.get(field) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().chars().count()),
                    Some(Value::Array(items)) if !items.is_empty() => Some(items.len()),
                    _ => None,
                };
                if let Some(len) = len {
                    if min.is_some_and(|min| len < min) || max.is_some_and(|max| len > max) {
                        errors.push(field, message);
                    }
                }
            }
            Rule::Custom {
                field,
                check,
                message,
            } => {
                if !check(record) {
                    errors.push(field, message);
                }
            }
        }
    }

    /// Rewrites every field path to sit beneath `scope`.
    pub(crate) fn scoped(self, scope: &str) -> Self {
        let scope_all =
            |paths: Vec<String>| -> Vec<String> { paths.iter().map(|p| join(scope, p)).collect() };
        match self {
            Rule::Required { field, message } => Rule::Required {
                field: join(scope, &field),
                message,
            },
            Rule::RequiredIf {
                field,
                when,
                message,
            } => Rule::RequiredIf {
                field: join(scope, &field),
                when: when.scoped(scope),
                message,
            },
            Rule::AtLeastOneOf {
                fields,
                report_to,
                message,
            } => Rule::AtLeastOneOf {
                fields: scope_all(fields),
                report_to: report_to.map(|p| join(scope, &p)),
                message,
            },
            Rule::RequiredIfGroup {
                group,
                when,
                subfields,
                message,
            } => Rule::RequiredIfGroup {
                group: join(scope, &group),
                when: when.scoped(scope),
                subfields: scope_all(subfields),
                message,
            },
            Rule::Format {
                field,
                format,
                message,
            } => Rule::Format {
                field: join(scope, &field),
                format,
                message,
            },
            Rule::Length {
                field,
                min,
                max,
                message,
            } => Rule::Length {
                field: join(scope, &field),
                min,
                max,
                message,
            },
            Rule::Custom {
                field,
                check,
                message,
            } => Rule::Custom {
                field: join(scope, &field),
                check,
                message,
            },
        }
    }

    /// Rejects rules that could never be evaluated meaningfully.
    pub(crate) fn check_definition(&self, stage: &str) -> Result<(), DefinitionError> {
        match self {
            Rule::Required { field, .. }
            | Rule::Format { field, .. }
            | Rule::Custom { field, .. } => check_path(stage, field),
            Rule::RequiredIf { field, when, .. } => {
                check_path(stage, field)?;
                when.check_paths(stage)
            }
            Rule::AtLeastOneOf {
                fields, report_to, ..
            } => {
                if fields.is_empty() {
                    return Err(DefinitionError::EmptyFieldGroup {
                        stage: stage.to_string(),
                    });
                }
                fields.iter().chain(report_to).try_for_each(|f| check_path(stage, f))
            }
            Rule::RequiredIfGroup {
                group,
                when,
                subfields,
                ..
            } => {
                if subfields.is_empty() {
                    return Err(DefinitionError::EmptyFieldGroup {
                        stage: stage.to_string(),
                    });
                }
                check_path(stage, group)?;
                when.check_paths(stage)?;
                subfields.iter().try_for_each(|f| check_path(stage, f))
            }
            Rule::Length {
                field, min, max, ..
            } => {
                check_path(stage, field)?;
                match (min, max) {
                    (Some(min), Some(max)) if min > max => Err(DefinitionError::InvalidBounds {
                        stage: stage.to_string(),
                        field: field.clone(),
                    }),
                    _ => Ok(()),
                }
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required { field, .. } => f.debug_struct("Required").field("field", field).finish(),
            Rule::RequiredIf { field, when, .. } => f
                .debug_struct("RequiredIf")
                .field("field", field)
                .field("when", when)
                .finish(),
            Rule::AtLeastOneOf { fields, .. } => f
                .debug_struct("AtLeastOneOf")
                .field("fields", fields)
                .finish(),
            Rule::RequiredIfGroup {
                group, subfields, ..
            } => f
                .debug_struct("RequiredIfGroup")
                .field("group", group)
                .field("subfields", subfields)
                .finish(),
            Rule::Format { field, format, .. } => f
                .debug_struct("Format")
                .field("field", field)
                .field("format", format)
                .finish(),
            Rule::Length {
                field, min, max, ..
            } => f
                .debug_struct("Length")
                .field("field", field)
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Custom { field, .. } => f.debug_struct("Custom").field("field", field).finish(),
        }
    }
}

pub(crate) fn join(scope: &str, path: &str) -> String {
    format!("{scope}.{path}")
}

pub(crate) fn check_path(stage: &str, path: &str) -> Result<(), DefinitionError> {
    if path.trim().is_empty() {
        return Err(DefinitionError::BlankPath {
            stage: stage.to_string(),
        });
    }
    if path.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(DefinitionError::MalformedPath {
            stage: stage.to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}
