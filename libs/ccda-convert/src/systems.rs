//! Code system OID to URI mapping

use phf::phf_map;

/// Code systems and identifier namespaces with a canonical FHIR URI.
static SYSTEMS_BY_OID: phf::Map<&'static str, &'static str> = phf_map! {
    // Clinical terminologies
    "2.16.840.1.113883.6.1" => "http://loinc.org",
    "2.16.840.1.113883.6.96" => "http://snomed.info/sct",
    "2.16.840.1.113883.6.88" => "http://www.nlm.nih.gov/research/umls/rxnorm",
    "2.16.840.1.113883.12.292" => "http://hl7.org/fhir/sid/cvx",
    "2.16.840.1.113883.12.227" => "http://hl7.org/fhir/sid/mvx",
    "2.16.840.1.113883.6.69" => "http://hl7.org/fhir/sid/ndc",
    "2.16.840.1.113883.6.90" => "http://hl7.org/fhir/sid/icd-10-cm",
    "2.16.840.1.113883.6.103" => "http://hl7.org/fhir/sid/icd-9-cm",
    "2.16.840.1.113883.6.12" => "http://www.ama-assn.org/go/cpt",
    "2.16.840.1.113883.6.8" => "http://unitsofmeasure.org",
    "2.16.840.1.113883.3.26.1.1" => "http://ncithesaurus-stage.nci.nih.gov",
    "2.16.840.1.113883.6.101" => "http://nucc.org/provider-taxonomy",
    "2.16.840.1.113883.6.238" => "urn:oid:2.16.840.1.113883.6.238",

    // HL7 v3 vocabularies
    "2.16.840.1.113883.5.1" => "http://terminology.hl7.org/CodeSystem/v3-AdministrativeGender",
    "2.16.840.1.113883.5.2" => "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus",
    "2.16.840.1.113883.5.4" => "http://terminology.hl7.org/CodeSystem/v3-ActCode",
    "2.16.840.1.113883.5.8" => "http://terminology.hl7.org/CodeSystem/v3-ActReason",
    "2.16.840.1.113883.5.25" => "http://terminology.hl7.org/CodeSystem/v3-Confidentiality",
    "2.16.840.1.113883.5.83" => "http://terminology.hl7.org/CodeSystem/v3-ObservationInterpretation",
    "2.16.840.1.113883.5.111" => "http://terminology.hl7.org/CodeSystem/v3-RoleCode",
    "2.16.840.1.113883.5.112" => "http://terminology.hl7.org/CodeSystem/v3-RouteOfAdministration",
    "2.16.840.1.113883.5.1063" => "http://terminology.hl7.org/CodeSystem/v3-ObservationValue",

    // Identifier namespaces
    "2.16.840.1.113883.4.1" => "http://hl7.org/fhir/sid/us-ssn",
    "2.16.840.1.113883.4.6" => "http://hl7.org/fhir/sid/us-npi",
};

/// Canonical URI for a code system or namespace OID, `urn:oid:<oid>` when the
/// OID is not known.
pub fn system_uri(oid: &str) -> String {
    match SYSTEMS_BY_OID.get(oid) {
        Some(uri) => (*uri).to_string(),
        None => format!("urn:oid:{oid}"),
    }
}

/// `true` for dotted-decimal OIDs such as `2.16.840.1.113883.19.5`.
pub fn is_oid(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}
