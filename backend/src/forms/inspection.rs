use chrono::{Datelike, Weekday};

use super::FormDefinition;
use crate::validation::{Condition, DefinitionError, Format, Rule, ValidationStage, formats};

pub const DAILY: &str = "daily_inspection";
pub const WEEKLY: &str = "weekly_inspection";

/// Daily plant and equipment check. Each ticked item opens its own detail group.
pub fn daily_form() -> Result<FormDefinition, DefinitionError> {
    let details = ValidationStage::builder("details")
        .rule(Rule::required("inspectionDate", "Inspection date is required"))
        .rule(Rule::format(
            "inspectionDate",
            Format::Date,
            "Inspection date must be a valid date (DD/MM/YYYY)",
        ))
        .rule(Rule::required("projectId", "Select the project being inspected"))
        .rule(Rule::required("inspectorName", "Inspector name is required"))
        .build()?;

    let equipment = ValidationStage::builder("equipment")
        .scope("equipment")
        .rule(Rule::at_least_one_of(
            &["mewp", "scaffold", "ladder", "powerTools"],
            "Select at least one item of equipment",
        ))
        .rule(Rule::required_if_group(
            "mewp",
            &["mewpDetails.serialNumber", "mewpDetails.lastThoroughExam"],
            "Required when a MEWP is inspected",
        ))
        .rule(Rule::format(
            "mewpDetails.lastThoroughExam",
            Format::Date,
            "Must be a valid date (DD/MM/YYYY)",
        ))
        .rule(Rule::required_if_group(
            "scaffold",
            &["scaffoldDetails.tagNumber", "scaffoldDetails.location"],
            "Required when a scaffold is inspected",
        ))
        .rule(Rule::required_if_group(
            "ladder",
            &["ladderDetails.reference"],
            "Required when a ladder is inspected",
        ))
        .rule(Rule::required_if_group(
            "powerTools",
            &["powerToolsDetails.patTestDate"],
            "Required when power tools are inspected",
        ))
        .rule(Rule::format(
            "powerToolsDetails.patTestDate",
            Format::Date,
            "Must be a valid date (DD/MM/YYYY)",
        ))
        .build()?;

    let defects = ValidationStage::builder("defects")
        .rule(Rule::required_if(
            "defectDetails",
            Condition::is_true("defectsFound"),
            "Describe the defects found",
        ))
        .rule(Rule::required_if(
            "actionTaken",
            Condition::is_true("defectsFound"),
            "Record the action taken",
        ))
        .rule(Rule::required("signedOffBy", "Sign-off is required"))
        .build()?;

    FormDefinition::new(
        DAILY,
        "Daily equipment inspection",
        vec![details, equipment, defects],
    )
}

/// Weekly scaffold and excavation inspection, signed off by a competent person.
pub fn weekly_form() -> Result<FormDefinition, DefinitionError> {
    let details = ValidationStage::builder("details")
        .rule(Rule::required("weekCommencing", "Week commencing date is required"))
        .rule(Rule::format(
            "weekCommencing",
            Format::Date,
            "Week commencing must be a valid date (DD/MM/YYYY)",
        ))
        .rule(Rule::custom(
            "weekCommencing",
            |record| {
                // Unparseable dates are already reported by the format rule.
                match record.str_at("weekCommencing").and_then(formats::parse_date) {
                    Some(date) => date.weekday() == Weekday::Mon,
                    None => true,
                }
            },
            "Week commencing must be a Monday",
        ))
        .rule(Rule::required("projectId", "Select the project being inspected"))
        .rule(Rule::required("inspectorName", "Inspector name is required"))
        .build()?;

    let scaffolds = ValidationStage::builder("scaffolds")
        .scope("scaffolds")
        .rule(Rule::required_if_group(
            "inspected",
            &["tagNumbers", "condition"],
            "Required when scaffolds are inspected",
        ))
        .rule(Rule::required_if(
            "remedialAction",
            Condition::equals("condition", "unsafe"),
            "Remedial action is required for an unsafe scaffold",
        ))
        .build()?;

    let excavations = ValidationStage::builder("excavations")
        .scope("excavations")
        .rule(Rule::required_if_group(
            "present",
            &["supportInPlace", "barriersInPlace"],
            "Required when excavations are present",
        ))
        .rule(Rule::required_if(
            "notes",
            Condition::equals("supportInPlace", false),
            "Explain why no support is in place",
        ))
        .build()?;

    let sign_off = ValidationStage::builder("sign_off")
        .scope("signOff")
        .rule(Rule::required("name", "Name is required"))
        .rule(Rule::required("position", "Position is required"))
        .rule(Rule::required("date", "Date is required"))
        .rule(Rule::format("date", Format::Date, "Must be a valid date (DD/MM/YYYY)"))
        .build()?;

    FormDefinition::new(
        WEEKLY,
        "Weekly inspection",
        vec![details, scaffolds, excavations, sign_off],
    )
}
