//! The portal's multi-step forms, expressed as validation stage lists.

use std::collections::BTreeMap;

use crate::validation::{DefinitionError, FormRecord, ValidationOutcome, ValidationStage, validate};

pub mod contact;
pub mod induction;
pub mod inspection;
pub mod permit;

/// FormDefinition
///
/// A named form and its sections, in the order the user steps through them.
#[derive(Debug, Clone)]
pub struct FormDefinition {
    name: String,
    title: String,
    stages: Vec<ValidationStage>,
}

impl FormDefinition {
    /// Stage names must be unique within a form; they address per-section validation.
    pub fn new(
        name: &str,
        title: &str,
        stages: Vec<ValidationStage>,
    ) -> Result<Self, DefinitionError> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].iter().any(|s| s.name() == stage.name()) {
                return Err(DefinitionError::DuplicateStage {
                    form: name.to_string(),
                    stage: stage.name().to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            title: title.to_string(),
            stages,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stages(&self) -> &[ValidationStage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&ValidationStage> {
        self.stages.iter().find(|s| s.name() == name)
    }

    pub fn validate(&self, record: &FormRecord) -> ValidationOutcome {
        validate(record, &self.stages)
    }
}

/// FormRegistry
///
/// Every form the portal accepts. Built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    forms: BTreeMap<String, FormDefinition>,
}

impl FormRegistry {
    /// The portal's built-in forms.
    pub fn builtin() -> Result<Self, DefinitionError> {
        let mut registry = Self::default();
        registry.register(induction::form()?)?;
        registry.register(inspection::daily_form()?)?;
        registry.register(inspection::weekly_form()?)?;
        registry.register(permit::form()?)?;
        registry.register(contact::form()?)?;
        Ok(registry)
    }

    pub fn register(&mut self, form: FormDefinition) -> Result<(), DefinitionError> {
        if self.forms.contains_key(form.name()) {
            return Err(DefinitionError::DuplicateForm(form.name().to_string()));
        }
        self.forms.insert(form.name().to_string(), form);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FormDefinition> {
        self.forms.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormDefinition> {
        self.forms.values()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
