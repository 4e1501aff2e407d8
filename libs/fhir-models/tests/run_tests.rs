use cobalt_models::{Bundle, BundleType, Composition, Immunization, Patient, Resource};
use serde_json::Value;
use std::{fs::File, path::PathBuf};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn load_fixture(relative: &str) -> Value {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);

    let file = File::open(&path).expect("failed to open fixture");
    serde_json::from_reader(file).expect("failed to deserialize fixture")
}

#[test]
fn parse_document_bundle() {
    let bundle = Bundle::from_value(&load_fixture("document-bundle.json")).unwrap();

    assert!(bundle.is_document());
    assert_eq!(bundle.bundle_type, BundleType::Document);
    assert_eq!(bundle.entry_count(), 3);

    let types: Vec<_> = bundle.resources().map(Resource::resource_type).collect();
    assert_eq!(types, vec!["Composition", "Patient", "Immunization"]);

    for entry in bundle.entries() {
        let resource = entry.resource.as_ref().expect("entry should carry a resource");
        assert_eq!(entry.full_url, resource.urn());
    }
}

#[test]
fn typed_access_to_entries() {
    let bundle = Bundle::from_value(&load_fixture("document-bundle.json")).unwrap();

    let composition: &Composition = bundle
        .resources()
        .find_map(|r| match r {
            Resource::Composition(c) => Some(c),
            _ => None,
        })
        .expect("composition should be present");
    assert_eq!(composition.title, "Continuity of Care Document");
    assert_eq!(composition.section.len(), 1);
    assert_eq!(composition.section[0].entry.len(), 1);

    let patient: &Patient = bundle
        .resources()
        .find_map(|r| match r {
            Resource::Patient(p) => Some(p),
            _ => None,
        })
        .expect("patient should be present");
    assert_eq!(patient.name[0].given, vec!["Eve".to_string()]);
    assert_eq!(patient.gender.as_deref(), Some("female"));

    let immunization: &Immunization = bundle
        .resources()
        .find_map(|r| match r {
            Resource::Immunization(i) => Some(i),
            _ => None,
        })
        .expect("immunization should be present");
    assert_eq!(immunization.lot_number.as_deref(), Some("1"));
    assert_eq!(
        immunization.patient.reference,
        Some(format!("urn:uuid:{}", patient.id.as_deref().unwrap()))
    );
}

#[test]
fn serialization_is_lossless_for_fixture() {
    let original = load_fixture("document-bundle.json");
    let bundle = Bundle::from_value(&original).unwrap();
    assert_eq!(bundle.to_value().unwrap(), original);
}
