use serde_json::{Value, json};
use site_safety_portal::{
    forms::{FormDefinition, FormRegistry, contact, induction, inspection, permit},
    validation::{DefinitionError, FormRecord, Rule, ValidationStage},
};

// --- Test Utilities ---

fn registry() -> FormRegistry {
    FormRegistry::builtin().expect("built-in forms must be well formed")
}

fn valid_induction() -> Value {
    json!({
        "firstName": "Sam",
        "lastName": "Taylor",
        "dateOfBirth": "14/06/1990",
        "phone": "07700 900123",
        "email": "sam.taylor@example.com",
        "address": { "line1": "1 High Street", "town": "Leeds", "postcode": "LS1 4AP" },
        "niNumber": "AB123456C",
        "rightToWork": true,
        "hasCSCSCard": true,
        "cardNumber": "12345678",
        "cardType": "Green Labourer",
        "cardExpiry": "30/09/2027",
        "emergencyContact": { "name": "Alex Taylor", "relationship": "Partner", "phone": "0113 496 0000" },
        "hasMedicalCondition": false,
        "declaration": { "agreed": true, "signature": "S Taylor" }
    })
}

fn with(mut base: Value, path: &str, value: Value) -> FormRecord {
    let mut node = &mut base;
    let segments: Vec<&str> = path.split('.').collect();
    for segment in &segments[..segments.len() - 1] {
        node = node.get_mut(*segment).unwrap();
    }
    node[segments[segments.len() - 1]] = value;
    FormRecord::new(base)
}

// --- Registry ---

#[test]
fn test_builtin_registry_contains_portal_forms() {
    let registry = registry();
    for name in [
        induction::NAME,
        inspection::DAILY,
        inspection::WEEKLY,
        permit::NAME,
        contact::NAME,
    ] {
        assert!(registry.get(name).is_some(), "missing form {name}");
    }
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_duplicate_stage_and_form_are_rejected() {
    let stage = ValidationStage::builder("details")
        .rule(Rule::required("name", "Required"))
        .build()
        .unwrap();

    let duplicate_stage = FormDefinition::new("f", "F", vec![stage.clone(), stage.clone()]);
    assert!(matches!(
        duplicate_stage,
        Err(DefinitionError::DuplicateStage { .. })
    ));

    let mut registry = FormRegistry::default();
    registry
        .register(FormDefinition::new("f", "F", vec![stage.clone()]).unwrap())
        .unwrap();
    let again = registry.register(FormDefinition::new("f", "F", vec![stage]).unwrap());
    assert!(matches!(again, Err(DefinitionError::DuplicateForm(_))));
}

// --- Induction ---

#[test]
fn test_complete_induction_is_accepted() {
    let form = registry();
    let outcome = form
        .get(induction::NAME)
        .unwrap()
        .validate(&FormRecord::new(valid_induction()));
    assert!(outcome.accepted, "unexpected errors: {:?}", outcome.errors);
}

#[test]
fn test_induction_cscs_card_number_conditional() {
    let registry = registry();
    let form = registry.get(induction::NAME).unwrap();

    let missing_number = with(valid_induction(), "cardNumber", json!(""));
    let outcome = form.validate(&missing_number);
    assert!(!outcome.accepted);
    assert_eq!(outcome.errors.paths().collect::<Vec<_>>(), vec!["cardNumber"]);

    let mut no_card = valid_induction();
    no_card["hasCSCSCard"] = json!(false);
    no_card["cardNumber"] = json!("");
    no_card["cardType"] = json!("");
    no_card["cardExpiry"] = json!("");
    assert!(form.validate(&FormRecord::new(no_card)).accepted);
}

#[test]
fn test_induction_reports_every_failing_section() {
    let registry = registry();
    let form = registry.get(induction::NAME).unwrap();

    let mut record = valid_induction();
    record["niNumber"] = json!("QB123456C");
    record["emergencyContact"]["phone"] = json!("123");
    record["hasMedicalCondition"] = json!(true);
    record["declaration"]["agreed"] = json!(false);

    let outcome = form.validate(&FormRecord::new(record));
    assert_eq!(
        outcome.errors.paths().collect::<Vec<_>>(),
        vec![
            "declaration.agreed",
            "emergencyContact.phone",
            "medicalDetails",
            "niNumber",
        ]
    );
}

// --- Inspections ---

#[test]
fn test_daily_inspection_requires_equipment_selection() {
    let registry = registry();
    let form = registry.get(inspection::DAILY).unwrap();

    let record = FormRecord::new(json!({
        "inspectionDate": "03/06/2024",
        "projectId": "P-100",
        "inspectorName": "Jo Smith",
        "equipment": { "mewp": false, "scaffold": false },
        "defectsFound": false,
        "signedOffBy": "Jo Smith"
    }));
    let outcome = form.validate(&record);
    assert_eq!(outcome.errors.paths().collect::<Vec<_>>(), vec!["equipment.mewp"]);
}

#[test]
fn test_daily_inspection_ticked_item_opens_detail_group() {
    let registry = registry();
    let form = registry.get(inspection::DAILY).unwrap();

    let record = FormRecord::new(json!({
        "inspectionDate": "03/06/2024",
        "projectId": "P-100",
        "inspectorName": "Jo Smith",
        "equipment": {
            "mewp": true,
            "mewpDetails": { "serialNumber": "MW-7", "lastThoroughExam": "31/04/2024" },
            "ladder": true
        },
        "defectsFound": true,
        "defectDetails": "Worn rung",
        "signedOffBy": "Jo Smith"
    }));
    let outcome = form.validate(&record);
    assert_eq!(
        outcome.errors.paths().collect::<Vec<_>>(),
        vec![
            "actionTaken",
            "equipment.ladderDetails.reference",
            "equipment.mewpDetails.lastThoroughExam",
        ]
    );
}

#[test]
fn test_weekly_inspection_week_must_start_on_monday() {
    let registry = registry();
    let form = registry.get(inspection::WEEKLY).unwrap();
    let details = form.stage("details").unwrap();

    // 03/06/2024 was a Monday, 04/06/2024 a Tuesday.
    let monday = FormRecord::new(json!({
        "weekCommencing": "03/06/2024", "projectId": "P-1", "inspectorName": "Jo"
    }));
    let tuesday = FormRecord::new(json!({
        "weekCommencing": "04/06/2024", "projectId": "P-1", "inspectorName": "Jo"
    }));

    assert!(site_safety_portal::validation::validate_stage(&monday, details).accepted);
    let outcome = site_safety_portal::validation::validate_stage(&tuesday, details);
    assert_eq!(
        outcome.errors.get("weekCommencing"),
        Some(&["Week commencing must be a Monday".to_string()][..])
    );
}

#[test]
fn test_weekly_inspection_unsupported_excavation_needs_notes() {
    let registry = registry();
    let form = registry.get(inspection::WEEKLY).unwrap();
    let stage = form.stage("excavations").unwrap();

    let record = FormRecord::new(json!({
        "excavations": { "present": true, "supportInPlace": false, "barriersInPlace": true }
    }));
    let outcome = site_safety_portal::validation::validate_stage(&record, stage);
    assert_eq!(
        outcome.errors.paths().collect::<Vec<_>>(),
        vec!["excavations.notes"]
    );
}

// --- Permits ---

#[test]
fn test_hot_works_permit_requires_fire_watch() {
    let registry = registry();
    let form = registry.get(permit::NAME).unwrap();

    let record = FormRecord::new(json!({
        "permitType": "hot_works",
        "projectId": "P-9",
        "issuedTo": "Weld Co",
        "description": "Welding brackets on level 3",
        "startDate": "10/06/2024",
        "endDate": "09/06/2024"
    }));
    let outcome = form.validate(&record);
    assert_eq!(
        outcome.errors.paths().collect::<Vec<_>>(),
        vec![
            "endDate",
            "hotWorks.extinguisherLocation",
            "hotWorks.fireWatchName",
        ]
    );
}

#[test]
fn test_general_permit_skips_hazard_sections() {
    let registry = registry();
    let form = registry.get(permit::NAME).unwrap();

    let record = FormRecord::new(json!({
        "permitType": "general",
        "projectId": "P-9",
        "issuedTo": "Build Co",
        "description": "Move pallets to compound",
        "startDate": "10/06/2024",
        "endDate": "10/06/2024",
        "isolationRequired": false
    }));
    assert!(form.validate(&record).accepted);
}

#[test]
fn test_permit_rejects_unknown_type() {
    let registry = registry();
    let form = registry.get(permit::NAME).unwrap();
    let details = form.stage("details").unwrap();

    let record = FormRecord::new(json!({
        "permitType": "demolition",
        "projectId": "P-9",
        "issuedTo": "Build Co",
        "description": "Knock through the wall"
    }));
    let outcome = site_safety_portal::validation::validate_stage(&record, details);
    assert_eq!(outcome.errors.paths().collect::<Vec<_>>(), vec!["permitType"]);
}

// --- Contacts ---

#[test]
fn test_contact_needs_email_or_phone() {
    let registry = registry();
    let form = registry.get(contact::NAME).unwrap();

    let neither = form.validate(&FormRecord::new(json!({ "name": "Pat" })));
    assert!(neither.errors.contains("email"));

    let phone_only = form.validate(&FormRecord::new(json!({ "name": "Pat", "phone": "07700900123" })));
    assert!(phone_only.accepted);

    let bad_email = form.validate(&FormRecord::new(json!({ "name": "Pat", "email": "pat@" })));
    assert_eq!(
        bad_email.errors.get("email"),
        Some(&["Enter a valid email address".to_string()][..])
    );
}
