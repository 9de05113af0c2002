use super::{
    DefinitionError, FieldErrorMap, FormRecord,
    rules::{Rule, check_path},
};

/// ValidationStage
///
/// One section of a multi-step form: an ordered rule list, optionally scoped to a
/// sub-object of the record. Rule paths inside a scoped stage are written relative to
/// the scope and reported under their full path.
#[derive(Debug, Clone)]
pub struct ValidationStage {
    name: String,
    scope: Option<String>,
    rules: Vec<Rule>,
}

impl ValidationStage {
    pub fn builder(name: &str) -> StageBuilder {
        StageBuilder {
            name: name.to_string(),
            scope: None,
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluates every rule; never stops at the first violation.
    pub fn evaluate(&self, record: &FormRecord) -> FieldErrorMap {
        let mut errors = FieldErrorMap::default();
        for rule in &self.rules {
            rule.check(record, &mut errors);
        }
        errors
    }
}

/// StageBuilder
///
/// Collects rules and checks them once in [`StageBuilder::build`], so a malformed
/// definition fails where it is written rather than on some later submit.
#[derive(Debug)]
pub struct StageBuilder {
    name: String,
    scope: Option<String>,
    rules: Vec<Rule>,
}

impl StageBuilder {
    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> Result<ValidationStage, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::BlankStageName);
        }
        if let Some(scope) = &self.scope {
            check_path(&self.name, scope)?;
        }
        for rule in &self.rules {
            rule.check_definition(&self.name)?;
        }

        let rules = match &self.scope {
            Some(scope) => self.rules.into_iter().map(|r| r.scoped(scope)).collect(),
            None => self.rules,
        };

        Ok(ValidationStage {
            name: self.name,
            scope: self.scope,
            rules,
        })
    }
}
