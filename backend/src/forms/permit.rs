use super::FormDefinition;
use crate::validation::{Condition, DefinitionError, Format, Rule, ValidationStage, formats};

pub const NAME: &str = "work_permit";

const PERMIT_TYPES: &str = "hot_works|working_at_height|confined_space|electrical|general";

/// Permit to work. Hazard-specific sections only apply to their permit type.
pub fn form() -> Result<FormDefinition, DefinitionError> {
    let details = ValidationStage::builder("details")
        .rule(Rule::required("permitType", "Permit type is required"))
        .rule(Rule::format(
            "permitType",
            Format::regex(PERMIT_TYPES)?,
            "Unknown permit type",
        ))
        .rule(Rule::required("projectId", "Select the project"))
        .rule(Rule::required("issuedTo", "Enter who the permit is issued to"))
        .rule(Rule::required("description", "Describe the work"))
        .rule(Rule::length(
            "description",
            Some(10),
            Some(1000),
            "Description must be between 10 and 1000 characters",
        ))
        .build()?;

    let validity = ValidationStage::builder("validity")
        .rule(Rule::required("startDate", "Start date is required"))
        .rule(Rule::format("startDate", Format::Date, "Must be a valid date (DD/MM/YYYY)"))
        .rule(Rule::required("endDate", "End date is required"))
        .rule(Rule::format("endDate", Format::Date, "Must be a valid date (DD/MM/YYYY)"))
        .rule(Rule::custom(
            "endDate",
            |record| {
                let start = record.str_at("startDate").and_then(formats::parse_date);
                let end = record.str_at("endDate").and_then(formats::parse_date);
                match (start, end) {
                    (Some(start), Some(end)) => end >= start,
                    _ => true,
                }
            },
            "End date cannot be before the start date",
        ))
        .build()?;

    let hazards = ValidationStage::builder("hazards")
        .rule(Rule::RequiredIfGroup {
            group: "hotWorks".to_string(),
            when: Condition::equals("permitType", "hot_works"),
            subfields: vec![
                "hotWorks.fireWatchName".to_string(),
                "hotWorks.extinguisherLocation".to_string(),
            ],
            message: "Required for hot works".to_string(),
        })
        .rule(Rule::required_if(
            "gasTestResult",
            Condition::equals("permitType", "confined_space"),
            "A gas test result is required for confined space entry",
        ))
        .rule(Rule::required_if(
            "isolationDetails",
            Condition::is_true("isolationRequired"),
            "Describe the isolation in place",
        ))
        .build()?;

    FormDefinition::new(NAME, "Permit to work", vec![details, validity, hazards])
}
