use cobalt_convert::{
    convert, convert_bytes, ConvertError, ConvertOptions, IdStrategy, MappingError,
};
use cobalt_models::{BundleType, IssueSeverity, Resource};
use serde_json::Value;
use std::path::PathBuf;

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn load(name: &str) -> String {
    let path = test_data_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

fn resources_of<'a>(bundle: &'a cobalt_models::Bundle, resource_type: &'a str) -> Vec<Value> {
    bundle
        .resources_of_type(resource_type)
        .map(|r| r.to_value().unwrap())
        .collect()
}

/// Any string or key anywhere in the JSON that still carries a null flavor.
fn contains_null_flavor(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k.contains("nullFlavor") || contains_null_flavor(v)),
        Value::Array(items) => items.iter().any(contains_null_flavor),
        _ => false,
    }
}

fn contains_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty() || map.values().any(contains_empty_container),
        Value::Array(items) => items.is_empty() || items.iter().any(contains_empty_container),
        Value::Null => true,
        _ => false,
    }
}

#[test]
fn null_flavored_lot_number_is_omitted() {
    let conversion = convert(
        &load("ImmunizationNullFlavorLotNumber.xml"),
        &ConvertOptions::default(),
    )
    .unwrap();
    assert!(conversion.is_complete());

    let immunizations = resources_of(&conversion.bundle, "Immunization");
    assert_eq!(immunizations.len(), 1);
    let immunization = &immunizations[0];
    assert!(immunization.get("lotNumber").is_none());
    assert_eq!(immunization["vaccineCode"]["coding"][0]["code"], "88");
    assert_eq!(immunization["occurrenceDateTime"], "2010-08-15");
}

#[test]
fn null_flavored_code_keeps_only_the_translation() {
    let conversion = convert(
        &load("ImmunizationNullFlavorCodeWithTranslation.xml"),
        &ConvertOptions::default(),
    )
    .unwrap();

    let immunizations = resources_of(&conversion.bundle, "Immunization");
    assert_eq!(immunizations.len(), 1);
    let codings = immunizations[0]["vaccineCode"]["coding"].as_array().unwrap();
    assert_eq!(codings.len(), 1);
    assert_eq!(
        codings[0],
        serde_json::json!({
            "system": "http://loinc.org",
            "code": "75320-2",
            "display": "Advance directive"
        })
    );
    assert!(codings.iter().all(|c| !c.is_null()));
    assert_eq!(immunizations[0]["lotNumber"], "1");
}

#[test]
fn failing_section_is_skipped_and_reported() {
    let conversion = convert(&load("PartialFailure.xml"), &ConvertOptions::default()).unwrap();

    // Both immunizations survive, nothing from the problems section does
    let immunizations = resources_of(&conversion.bundle, "Immunization");
    assert_eq!(immunizations.len(), 2);
    assert_eq!(immunizations[0]["status"], "completed");
    assert_eq!(immunizations[1]["status"], "not-done");
    assert_eq!(immunizations[1]["statusReason"]["coding"][0]["code"], "PATOBJ");
    assert_eq!(conversion.bundle.resources_of_type("Condition").count(), 0);

    assert_eq!(conversion.failures.len(), 1);
    let failure = &conversion.failures[0];
    assert_eq!(failure.section, "problems");
    assert_eq!(failure.path, "entry[0]/act/entryRelationship/observation");

    let outcome = conversion.operation_outcome();
    assert_eq!(outcome.issue.len(), 1);
    assert_eq!(outcome.issue[0].severity, IssueSeverity::Warning);
    assert_eq!(outcome.issue[0].code, "processing");
    assert!(outcome.issue[0]
        .diagnostics
        .as_deref()
        .unwrap()
        .starts_with("problems:"));

    // The Composition section for problems exists but references nothing
    let composition = &resources_of(&conversion.bundle, "Composition")[0];
    let sections = composition["section"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["entry"].as_array().unwrap().len(), 2);
    assert!(sections[1].get("entry").is_none());
}

#[test]
fn fail_fast_aborts_on_first_section_failure() {
    let options = ConvertOptions {
        fail_fast: true,
        ..ConvertOptions::default()
    };
    match convert(&load("PartialFailure.xml"), &options) {
        Err(ConvertError::Mapping(MappingError { section, .. })) => assert_eq!(section, "problems"),
        other => panic!("expected a mapping error, got {:?}", other),
    }
}

#[test]
fn full_document_maps_every_section() {
    let conversion = convert(
        &load("ContinuityOfCareDocument.xml"),
        &ConvertOptions::document(),
    )
    .unwrap();
    assert!(conversion.is_complete(), "{:?}", conversion.failures);
    assert!(conversion.bundle.is_document());

    let types: Vec<_> = conversion.bundle.resources().map(Resource::resource_type).collect();
    assert_eq!(
        types,
        vec![
            "Composition",
            "Patient",
            "Practitioner",
            "AllergyIntolerance",
            "MedicationStatement",
            "Condition",
            "Immunization",
            "Observation",
            "Observation",
            "DiagnosticReport",
            "Observation",
            "Observation",
            "Procedure",
            "Encounter",
        ]
    );

    let json = conversion.bundle.to_value().unwrap();
    assert!(!contains_null_flavor(&json));
    assert!(!contains_empty_container(&json));
}

#[test]
fn patient_demographics() {
    let conversion = convert(&load("ContinuityOfCareDocument.xml"), &ConvertOptions::default()).unwrap();
    let patient = &resources_of(&conversion.bundle, "Patient")[0];

    // The null-flavored id and telecom are gone
    assert_eq!(patient["identifier"].as_array().unwrap().len(), 1);
    assert_eq!(patient["identifier"][0]["system"], "http://hl7.org/fhir/sid/us-ssn");
    assert_eq!(patient["telecom"].as_array().unwrap().len(), 1);

    assert_eq!(patient["name"][0]["use"], "official");
    assert_eq!(patient["name"][0]["given"], serde_json::json!(["Eve", "Betterhalf"]));
    assert_eq!(patient["gender"], "female");
    assert_eq!(patient["birthDate"], "1975-05-01");
    assert_eq!(patient["deceasedBoolean"], false);
    assert_eq!(patient["maritalStatus"]["coding"][0]["code"], "M");
    assert_eq!(patient["communication"][0]["language"]["coding"][0]["code"], "en");
    assert_eq!(patient["communication"][0]["preferred"], true);
    assert_eq!(patient["address"][0]["city"], "Beaverton");

    // Race is present, ethnicity was ASKU
    let extensions = patient["extension"].as_array().unwrap();
    assert_eq!(extensions.len(), 1);
    assert_eq!(
        extensions[0]["url"],
        "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race"
    );
    let race: Vec<_> = extensions[0]["extension"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["url"].as_str().unwrap())
        .collect();
    assert_eq!(race, vec!["ombCategory", "detailed", "text"]);
}

#[test]
fn clinical_resources() {
    let conversion = convert(&load("ContinuityOfCareDocument.xml"), &ConvertOptions::default()).unwrap();
    let bundle = &conversion.bundle;

    let allergy = &resources_of(bundle, "AllergyIntolerance")[0];
    assert_eq!(allergy["type"], "allergy");
    assert_eq!(allergy["category"], serde_json::json!(["medication"]));
    assert_eq!(allergy["criticality"], "high");
    assert_eq!(allergy["clinicalStatus"]["coding"][0]["code"], "active");
    assert_eq!(allergy["code"]["coding"][0]["code"], "7982");
    assert_eq!(allergy["reaction"][0]["manifestation"][0]["coding"][0]["display"], "Hives");
    assert_eq!(allergy["reaction"][0]["severity"], "moderate");

    let medication = &resources_of(bundle, "MedicationStatement")[0];
    assert_eq!(medication["status"], "active");
    assert_eq!(medication["effectivePeriod"], serde_json::json!({ "start": "2012-08-06" }));
    assert_eq!(medication["dosage"][0]["text"], "2 puffs every 6 hours as needed");
    assert_eq!(medication["dosage"][0]["doseAndRate"][0]["doseQuantity"]["value"], 2);

    let condition = &resources_of(bundle, "Condition")[0];
    assert_eq!(condition["clinicalStatus"]["coding"][0]["code"], "resolved");
    let codes: Vec<_> = condition["code"]["coding"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["233604007", "J18.9"]);
    assert_eq!(condition["onsetDateTime"], "2008-01-03");
    assert_eq!(condition["abatementDateTime"], "2008-01-10");

    let immunization = &resources_of(bundle, "Immunization")[0];
    assert_eq!(immunization["manufacturer"]["display"], "Health LS - Immuno Inc.");
    assert_eq!(immunization["doseQuantity"]["value"], 0.5);

    let report = &resources_of(bundle, "DiagnosticReport")[0];
    assert_eq!(report["status"], "final");
    assert_eq!(report["effectiveDateTime"], "2008-03-19T08:30:00-08:00");
    assert_eq!(report["result"].as_array().unwrap().len(), 2);

    let observations = resources_of(bundle, "Observation");
    let categories: Vec<_> = observations
        .iter()
        .map(|o| o["category"][0]["coding"][0]["code"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["vital-signs", "vital-signs", "laboratory", "laboratory"]);
    assert_eq!(observations[2]["referenceRange"][0]["low"]["value"], 12.0);

    let procedure = &resources_of(bundle, "Procedure")[0];
    assert_eq!(procedure["status"], "completed");
    assert_eq!(procedure["performedDateTime"], "2012-05-12");

    let encounter = &resources_of(bundle, "Encounter")[0];
    assert_eq!(encounter["status"], "finished");
    assert_eq!(encounter["class"]["code"], "AMB");
    assert_eq!(encounter["reasonCode"][0]["coding"][0]["code"], "233604007");
}

#[test]
fn references_resolve_within_the_bundle() {
    let conversion = convert(&load("ContinuityOfCareDocument.xml"), &ConvertOptions::default()).unwrap();
    let bundle = &conversion.bundle;

    let full_urls: Vec<_> = bundle
        .entries()
        .iter()
        .map(|e| e.full_url.clone().unwrap())
        .collect();
    assert!(full_urls.iter().all(|u| u.starts_with("urn:uuid:")));

    let patient_url = bundle
        .entries()
        .iter()
        .find(|e| e.resource.as_ref().map(Resource::resource_type) == Some("Patient"))
        .and_then(|e| e.full_url.clone())
        .unwrap();

    let composition = &resources_of(bundle, "Composition")[0];
    assert_eq!(composition["subject"]["reference"], patient_url.as_str());
    assert_eq!(composition["author"].as_array().unwrap().len(), 1);

    let mut referenced = Vec::new();
    for section in composition["section"].as_array().unwrap() {
        for entry in section["entry"].as_array().into_iter().flatten() {
            referenced.push(entry["reference"].as_str().unwrap().to_string());
        }
    }
    // Everything but Composition, Patient and Practitioner is listed in a section
    assert_eq!(referenced.len(), full_urls.len() - 3);
    assert!(referenced.iter().all(|r| full_urls.contains(r)));

    for immunization in resources_of(bundle, "Immunization") {
        assert_eq!(immunization["patient"]["reference"], patient_url.as_str());
    }
}

#[test]
fn composition_sections_carry_narrative() {
    let conversion = convert(&load("ContinuityOfCareDocument.xml"), &ConvertOptions::default()).unwrap();
    let composition = &resources_of(&conversion.bundle, "Composition")[0];

    assert_eq!(composition["status"], "final");
    assert_eq!(composition["title"], "Continuity of Care Document");
    assert_eq!(composition["type"]["coding"][0]["code"], "34133-9");
    assert_eq!(composition["date"], "2013-06-07T00:00:00+00:00");
    assert_eq!(composition["confidentiality"], "N");

    let sections = composition["section"].as_array().unwrap();
    assert_eq!(sections.len(), 9);

    let allergies = sections[0]["text"]["div"].as_str().unwrap();
    assert!(allergies.starts_with("<div xmlns=\"http://www.w3.org/1999/xhtml\">"));
    assert!(allergies.contains("<span id=\"allergy1\">Penicillin G benzathine</span>"));

    // Unrecognised section: narrative only, footnote dropped
    let social = &sections[8];
    assert_eq!(social["title"], "Social History");
    assert!(social.get("entry").is_none());
    assert!(social["text"]["div"].as_str().unwrap().contains("<p>Never smoker</p>"));
}

#[test]
fn narrative_and_composition_can_be_disabled() {
    let xml = load("ContinuityOfCareDocument.xml");

    let options = ConvertOptions {
        include_narrative: false,
        ..ConvertOptions::default()
    };
    let conversion = convert(&xml, &options).unwrap();
    let composition = &resources_of(&conversion.bundle, "Composition")[0];
    assert!(composition["section"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s.get("text").is_none()));

    let options = ConvertOptions {
        include_composition: false,
        ..ConvertOptions::default()
    };
    let conversion = convert(&xml, &options).unwrap();
    assert_eq!(conversion.bundle.resources_of_type("Composition").count(), 0);
    assert_eq!(conversion.bundle.entry_count(), 13);
}

#[test]
fn deterministic_ids_are_stable_across_runs() {
    let xml = load("ContinuityOfCareDocument.xml");
    let first = convert(&xml, &ConvertOptions::default()).unwrap();
    let second = convert(&xml, &ConvertOptions::default()).unwrap();
    assert_eq!(first.bundle, second.bundle);

    let options = ConvertOptions {
        id_strategy: IdStrategy::Random,
        ..ConvertOptions::default()
    };
    let third = convert(&xml, &options).unwrap();
    let fourth = convert(&xml, &options).unwrap();
    assert_ne!(third.bundle, fourth.bundle);
    assert_eq!(third.bundle.entry_count(), fourth.bundle.entry_count());
}

#[test]
fn invalid_options_are_rejected() {
    let options = ConvertOptions {
        bundle_type: BundleType::Document,
        include_composition: false,
        ..ConvertOptions::default()
    };
    assert!(matches!(
        convert(&load("ContinuityOfCareDocument.xml"), &options),
        Err(ConvertError::InvalidOptions(_))
    ));
}

#[test]
fn malformed_and_foreign_documents() {
    assert!(matches!(
        convert("<ClinicalDocument><title>", &ConvertOptions::default()),
        Err(ConvertError::Malformed(_))
    ));
    assert!(matches!(
        convert_bytes(&[0x3c, 0xff, 0xfe], &ConvertOptions::default()),
        Err(ConvertError::Malformed(_))
    ));
    let deep = format!(
        "<ClinicalDocument>{}{}</ClinicalDocument>",
        "<component>".repeat(1_000),
        "</component>".repeat(1_000)
    );
    assert!(matches!(
        convert(&deep, &ConvertOptions::default()),
        Err(ConvertError::Malformed(cobalt_ccda_format::MalformedDocumentError::TooDeep { .. }))
    ));
    match convert("<Bundle xmlns=\"http://hl7.org/fhir\"/>", &ConvertOptions::default()) {
        Err(ConvertError::NotClinicalDocument(root)) => assert_eq!(root, "Bundle"),
        other => panic!("expected NotClinicalDocument, got {:?}", other),
    }
}

/// Every `reference` string anywhere in the JSON.
fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("reference", Value::String(r)) => out.push(r.clone()),
                    _ => collect_references(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        _ => {}
    }
}

#[test]
fn missing_patient_is_reported_but_not_fatal() {
    let xml = r#"<ClinicalDocument xmlns="urn:hl7-org:v3">
        <id root="1.2.3" extension="no-patient"/>
        <code code="34133-9" codeSystem="2.16.840.1.113883.6.1"/>
        <title>No patient</title>
        <component><structuredBody><component><section>
            <templateId root="2.16.840.1.113883.10.20.22.2.2.1"/>
            <code code="11369-6" codeSystem="2.16.840.1.113883.6.1"/>
            <title>Immunizations</title>
            <entry>
                <substanceAdministration classCode="SBADM" moodCode="EVN" negationInd="false">
                    <statusCode code="completed"/>
                    <effectiveTime value="20200115"/>
                    <consumable><manufacturedProduct><manufacturedMaterial>
                        <code code="140" codeSystem="2.16.840.1.113883.12.292"/>
                    </manufacturedMaterial></manufacturedProduct></consumable>
                </substanceAdministration>
            </entry>
        </section></component></structuredBody></component>
    </ClinicalDocument>"#;
    let conversion = convert(xml, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.failures.len(), 1);
    assert_eq!(conversion.failures[0].section, "patient");

    // The patient is reduced to its id so references still land somewhere
    let patients = resources_of(&conversion.bundle, "Patient");
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].as_object().unwrap().len(), 2);
    assert_eq!(conversion.bundle.resources_of_type("Immunization").count(), 1);

    let full_urls: Vec<_> = conversion
        .bundle
        .entries()
        .iter()
        .filter_map(|e| e.full_url.clone())
        .collect();
    let mut references = Vec::new();
    for resource in conversion.bundle.resources() {
        collect_references(&resource.to_value().unwrap(), &mut references);
    }
    // Composition subject and section entry, Immunization patient
    assert_eq!(references.len(), 3);
    for reference in &references {
        assert!(full_urls.contains(reference), "{reference} does not resolve");
    }
}
