use super::FormDefinition;
use crate::validation::{DefinitionError, Format, Rule, ValidationStage};

pub const NAME: &str = "contact";

pub fn form() -> Result<FormDefinition, DefinitionError> {
    let details = ValidationStage::builder("details")
        .rule(Rule::required("name", "Name is required"))
        .rule(Rule::length("name", None, Some(120), "Name is too long"))
        .rule(Rule::at_least_one_of(
            &["email", "phone"],
            "Provide an email address or a phone number",
        ))
        .rule(Rule::format("email", Format::Email, "Enter a valid email address"))
        .rule(Rule::format("phone", Format::UkPhone, "Enter a valid UK phone number"))
        .build()?;

    FormDefinition::new(NAME, "Contact", vec![details])
}
