use serde_json::Value;

use super::FormDefinition;
use crate::validation::{Condition, DefinitionError, Format, Rule, ValidationStage};

pub const NAME: &str = "induction";

/// Site induction: who the operative is, their right to work, competency card,
/// emergency contact, medical declaration and sign-off.
pub fn form() -> Result<FormDefinition, DefinitionError> {
    let personal_details = ValidationStage::builder("personal_details")
        .rule(Rule::required("firstName", "First name is required"))
        .rule(Rule::required("lastName", "Last name is required"))
        .rule(Rule::required("dateOfBirth", "Date of birth is required"))
        .rule(Rule::format(
            "dateOfBirth",
            Format::Date,
            "Date of birth must be a valid date (DD/MM/YYYY)",
        ))
        .rule(Rule::required("phone", "Phone number is required"))
        .rule(Rule::format("phone", Format::UkPhone, "Enter a valid UK phone number"))
        .rule(Rule::format("email", Format::Email, "Enter a valid email address"))
        .build()?;

    let address = ValidationStage::builder("address")
        .scope("address")
        .rule(Rule::required("line1", "Address line 1 is required"))
        .rule(Rule::required("town", "Town or city is required"))
        .rule(Rule::required("postcode", "Postcode is required"))
        .rule(Rule::format("postcode", Format::Postcode, "Enter a valid UK postcode"))
        .build()?;

    let right_to_work = ValidationStage::builder("right_to_work")
        .rule(Rule::required("niNumber", "National Insurance number is required"))
        .rule(Rule::format(
            "niNumber",
            Format::NiNumber,
            "Enter a valid National Insurance number, e.g. AB123456C",
        ))
        .rule(Rule::custom(
            "rightToWork",
            |record| record.get("rightToWork") == Some(&Value::Bool(true)),
            "You must confirm your right to work in the UK",
        ))
        .build()?;

    let cscs = ValidationStage::builder("cscs")
        .rule(Rule::required_if(
            "cardNumber",
            Condition::is_true("hasCSCSCard"),
            "Card number is required when you hold a CSCS card",
        ))
        .rule(Rule::length(
            "cardNumber",
            Some(6),
            Some(16),
            "Card number must be between 6 and 16 characters",
        ))
        .rule(Rule::required_if(
            "cardType",
            Condition::is_true("hasCSCSCard"),
            "Card type is required when you hold a CSCS card",
        ))
        .rule(Rule::required_if(
            "cardExpiry",
            Condition::is_true("hasCSCSCard"),
            "Card expiry date is required when you hold a CSCS card",
        ))
        .rule(Rule::format(
            "cardExpiry",
            Format::Date,
            "Card expiry must be a valid date (DD/MM/YYYY)",
        ))
        .build()?;

    let emergency_contact = ValidationStage::builder("emergency_contact")
        .scope("emergencyContact")
        .rule(Rule::required("name", "Emergency contact name is required"))
        .rule(Rule::required("relationship", "Relationship is required"))
        .rule(Rule::required("phone", "Emergency contact phone is required"))
        .rule(Rule::format("phone", Format::UkPhone, "Enter a valid UK phone number"))
        .build()?;

    let medical = ValidationStage::builder("medical")
        .rule(Rule::required_if(
            "medicalDetails",
            Condition::is_true("hasMedicalCondition"),
            "Please describe the condition so site first aiders are aware",
        ))
        .build()?;

    let declaration = ValidationStage::builder("declaration")
        .scope("declaration")
        .rule(Rule::custom(
            "agreed",
            |record| record.get("declaration.agreed") == Some(&Value::Bool(true)),
            "You must accept the site rules",
        ))
        .rule(Rule::required("signature", "Signature is required"))
        .build()?;

    FormDefinition::new(
        NAME,
        "Site induction",
        vec![
            personal_details,
            address,
            right_to_work,
            cscs,
            emergency_contact,
            medical,
            declaration,
        ],
    )
}
