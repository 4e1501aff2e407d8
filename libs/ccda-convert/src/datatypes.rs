//! C-CDA datatype conversion (CD, II, PN, AD, TEL, TS, IVL_TS, PQ)
//!
//! Every helper takes an already sanitized node: the mapper runs the sanitizer
//! over the document before any field is read, so a null-flavored value never
//! reaches these functions.

use crate::systems::{is_oid, system_uri};
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use cobalt_ccda_model::{CcdaNode, Element};
use cobalt_models::{
    Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Period, Quantity,
};
use serde_json::Number;

const UCUM: &str = "http://unitsofmeasure.org";

/// Trimmed text of a scalar, or of an element's text entry.
pub fn text(node: Option<&CcdaNode>) -> Option<String> {
    let value = node?.text_content()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Coding from the attributes of one CD element; `None` without a `code`.
pub fn coding(element: &Element) -> Option<Coding> {
    let code = element.attribute("code")?;
    Some(Coding {
        system: element.attribute("codeSystem").map(system_uri),
        version: element.attribute("codeSystemVersion").map(str::to_string),
        code: Some(code.to_string()),
        display: element.attribute("displayName").map(str::to_string),
    })
}

/// CodeableConcept from a CD element.
///
/// The element's own code comes first, followed by each `translation`. Only
/// codings that survive are kept, so the result never has placeholder
/// entries. `originalText` becomes `text`. Returns `None` when nothing is left.
pub fn codeable_concept(node: Option<&CcdaNode>) -> Option<CodeableConcept> {
    let element = node?.first()?.as_element()?;

    let mut codings: Vec<Coding> = coding(element).into_iter().collect();
    if let Some(translations) = element.child("translation") {
        codings.extend(
            translations
                .iter()
                .filter_map(CcdaNode::as_element)
                .filter_map(coding),
        );
    }

    let concept = CodeableConcept {
        coding: codings,
        text: text(element.child("originalText")),
    };
    (!concept.is_empty()).then_some(concept)
}

/// Every CD under `name` that maps to a concept.
pub fn codeable_concepts(node: &CcdaNode, name: &str) -> Vec<CodeableConcept> {
    node.find_all(name)
        .into_iter()
        .filter_map(|n| codeable_concept(Some(n)))
        .collect()
}

/// Identifier from an II element.
///
/// `root` + `extension` is a namespaced value. A bare `root` is itself the
/// identifier and is expressed as a URI.
pub fn identifier(element: &Element) -> Option<Identifier> {
    let root = element.attribute("root");
    match (root, element.attribute("extension")) {
        (root, Some(extension)) => Some(Identifier {
            system: root.map(system_uri),
            value: Some(extension.to_string()),
            ..Default::default()
        }),
        (Some(root), None) => Some(Identifier {
            system: Some("urn:ietf:rfc:3986".to_string()),
            value: Some(if is_oid(root) {
                format!("urn:oid:{root}")
            } else {
                format!("urn:uuid:{}", root.to_ascii_lowercase())
            }),
            ..Default::default()
        }),
        (None, None) => None,
    }
}

pub fn identifiers(node: &CcdaNode, name: &str) -> Vec<Identifier> {
    node.find_all(name)
        .into_iter()
        .filter_map(CcdaNode::as_element)
        .filter_map(identifier)
        .collect()
}

/// Stable text form of an II (`root^extension`), used to seed ids.
pub fn instance_key(node: Option<&CcdaNode>) -> Option<String> {
    let element = node?.first()?.as_element()?;
    match (element.attribute("root"), element.attribute("extension")) {
        (Some(root), Some(extension)) => Some(format!("{root}^{extension}")),
        (Some(root), None) => Some(root.to_string()),
        (None, Some(extension)) => Some(extension.to_string()),
        (None, None) => None,
    }
}

fn texts(node: &CcdaNode, name: &str) -> Vec<String> {
    node.find_all(name)
        .into_iter()
        .filter_map(|n| text(Some(n)))
        .collect()
}

/// HumanName from a PN node. Unstructured names land in `text`.
pub fn human_name(node: &CcdaNode) -> Option<HumanName> {
    let name = match node {
        CcdaNode::Scalar(_) => HumanName {
            text: text(Some(node)),
            ..Default::default()
        },
        _ => HumanName {
            use_: node.attribute("use").and_then(name_use).map(str::to_string),
            text: node.as_element().and_then(Element::text).map(str::to_string),
            family: text(node.child("family")),
            given: texts(node, "given"),
            prefix: texts(node, "prefix"),
            suffix: texts(node, "suffix"),
            period: period(node.child("validTime")),
        },
    };

    let empty = name.text.is_none()
        && name.family.is_none()
        && name.given.is_empty()
        && name.prefix.is_empty()
        && name.suffix.is_empty();
    (!empty).then_some(name)
}

pub fn human_names(node: &CcdaNode, name: &str) -> Vec<HumanName> {
    node.find_all(name).into_iter().filter_map(human_name).collect()
}

fn name_use(code: &str) -> Option<&'static str> {
    match code {
        "L" => Some("official"),
        "P" | "A" => Some("nickname"),
        "ASGN" | "C" => Some("usual"),
        _ => None,
    }
}

/// Address from an AD node.
pub fn address(node: &CcdaNode) -> Option<Address> {
    let address = Address {
        use_: node
            .attribute("use")
            .and_then(address_use)
            .map(str::to_string),
        line: texts(node, "streetAddressLine"),
        city: text(node.child("city")),
        district: text(node.child("county")),
        state: text(node.child("state")),
        postal_code: text(node.child("postalCode")),
        country: text(node.child("country")),
        period: period(node.child("useablePeriod")),
    };

    let empty = address.line.is_empty()
        && address.city.is_none()
        && address.district.is_none()
        && address.state.is_none()
        && address.postal_code.is_none()
        && address.country.is_none();
    (!empty).then_some(address)
}

pub fn addresses(node: &CcdaNode, name: &str) -> Vec<Address> {
    node.find_all(name).into_iter().filter_map(address).collect()
}

fn address_use(code: &str) -> Option<&'static str> {
    match code {
        "H" | "HP" | "HV" => Some("home"),
        "WP" | "DIR" | "PUB" => Some("work"),
        "TMP" => Some("temp"),
        "OLD" | "BAD" => Some("old"),
        _ => None,
    }
}

/// ContactPoint from a TEL element (`tel:`, `mailto:`, `fax:`, `http(s):`).
pub fn contact_point(element: &Element) -> Option<ContactPoint> {
    let raw = element.attribute("value")?.trim();
    let (system, value) = if let Some(rest) = raw.strip_prefix("tel:") {
        ("phone", rest)
    } else if let Some(rest) = raw.strip_prefix("mailto:") {
        ("email", rest)
    } else if let Some(rest) = raw.strip_prefix("fax:") {
        ("fax", rest)
    } else if raw.starts_with("http:") || raw.starts_with("https:") {
        ("url", raw)
    } else {
        ("other", raw)
    };
    if value.is_empty() {
        return None;
    }

    let use_ = element.attribute("use").and_then(|code| match code {
        "H" | "HP" | "HV" => Some("home"),
        "WP" => Some("work"),
        "MC" | "PG" => Some("mobile"),
        "TMP" => Some("temp"),
        "BAD" | "OLD" => Some("old"),
        _ => None,
    });

    Some(ContactPoint {
        system: Some(system.to_string()),
        value: Some(value.to_string()),
        use_: use_.map(str::to_string),
    })
}

pub fn contact_points(node: &CcdaNode, name: &str) -> Vec<ContactPoint> {
    node.find_all(name)
        .into_iter()
        .filter_map(CcdaNode::as_element)
        .filter_map(contact_point)
        .collect()
}

/// FHIR `dateTime` from an HL7 TS value.
///
/// Accepts `YYYY[MM[DD[HH[MM[SS[.S+]]]]]][+/-ZZZZ]`. Partial dates keep their
/// precision, times gain seconds, and a missing offset is read as UTC.
/// Invalid calendar values yield `None`.
pub fn date_time_from_hl7(value: &str) -> Option<String> {
    let value = value.trim();
    let (body, offset) = split_offset(value);
    let (digits, fraction) = match body.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (body, None),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if fraction.is_some_and(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    match digits.len() {
        4 | 6 | 8 => date_from_digits(digits),
        10 | 12 | 14 => {
            let date = NaiveDate::parse_from_str(&digits[..8], "%Y%m%d").ok()?;
            let field = |range: std::ops::Range<usize>| -> Option<u32> {
                digits.get(range).map_or(Some(0), |s| s.parse().ok())
            };
            let time = NaiveTime::from_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)?;

            let mut stamp = format!("{}T{}", date.format("%Y-%m-%d"), time.format("%H:%M:%S"));
            if let Some(fraction) = fraction {
                stamp.push('.');
                stamp.push_str(fraction);
            }
            match offset {
                Some(offset) => stamp.push_str(&format_offset(offset)?),
                None => stamp.push('Z'),
            }
            Some(stamp)
        }
        _ => None,
    }
}

/// FHIR `date` from an HL7 TS value, dropping any time component.
pub fn date_from_hl7(value: &str) -> Option<String> {
    let (body, _) = split_offset(value.trim());
    let digits = body.split('.').next().unwrap_or(body);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.len() {
        4 | 6 | 8 => date_from_digits(digits),
        10 | 12 | 14 => {
            // Validate the whole timestamp before truncating it
            date_time_from_hl7(value)?;
            date_from_digits(&digits[..8])
        }
        _ => None,
    }
}

fn date_from_digits(digits: &str) -> Option<String> {
    let year: i32 = digits.get(0..4)?.parse().ok()?;
    match digits.len() {
        4 => Some(format!("{year:04}")),
        6 => {
            let month: u32 = digits.get(4..6)?.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.format("%Y-%m").to_string())
        }
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

fn split_offset(value: &str) -> (&str, Option<&str>) {
    match value.rfind(['+', '-']) {
        Some(index) if index > 0 => (&value[..index], Some(&value[index..])),
        _ => (value, None),
    }
}

fn format_offset(offset: &str) -> Option<String> {
    let (sign, digits) = offset.split_at(1);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let seconds = (hours * 3600 + minutes * 60) * if sign == "-" { -1 } else { 1 };
    let offset = FixedOffset::east_opt(seconds)?;
    Some(offset.to_string())
}

/// `dateTime` of a TS or IVL_TS: its `value`, else its `low` bound.
pub fn effective_date_time(node: Option<&CcdaNode>) -> Option<String> {
    let node = node?.first()?;
    node.attribute("value")
        .or_else(|| node.child("low").and_then(|low| low.attribute("value")))
        .and_then(date_time_from_hl7)
}

/// Period of an IVL_TS; `None` without a usable bound.
pub fn period(node: Option<&CcdaNode>) -> Option<Period> {
    let node = node?.first()?;
    let bound = |name: &str| {
        node.child(name)
            .and_then(|b| b.attribute("value"))
            .and_then(date_time_from_hl7)
    };
    let period = Period {
        start: bound("low"),
        end: bound("high"),
    };
    (period.start.is_some() || period.end.is_some()).then_some(period)
}

/// Quantity from a PQ element. A unit of `1` means "no unit".
pub fn quantity(node: Option<&CcdaNode>) -> Option<Quantity> {
    let node = node?.first()?;
    let value = node.attribute("value").and_then(decimal)?;
    let unit = node.attribute("unit").filter(|u| !u.is_empty() && *u != "1");
    Some(Quantity {
        value: Some(value),
        unit: unit.map(str::to_string),
        system: unit.map(|_| UCUM.to_string()),
        code: unit.map(str::to_string),
    })
}

fn decimal(value: &str) -> Option<Number> {
    let value = value.trim();
    if let Ok(integer) = value.parse::<i64>() {
        return Some(Number::from(integer));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_ccda_model::NullFlavor;

    fn cd(code: &str, system: &str, display: &str) -> Element {
        Element::new()
            .with_attribute("code", code)
            .with_attribute("codeSystem", system)
            .with_attribute("displayName", display)
    }

    #[test]
    fn test_codeable_concept_primary_then_translations() {
        let node = CcdaNode::from(
            cd("88", "2.16.840.1.113883.12.292", "Influenza virus vaccine")
                .with_child("translation", cd("141", "2.16.840.1.113883.12.292", "Influenza, seasonal"))
                .with_child("translation", cd("857", "2.16.840.1.113883.6.69", "Fluzone")),
        );
        let concept = codeable_concept(Some(&node)).unwrap();
        let codes: Vec<_> = concept.coding.iter().filter_map(|c| c.code.as_deref()).collect();
        assert_eq!(codes, vec!["88", "141", "857"]);
        assert_eq!(concept.coding[2].system.as_deref(), Some("http://hl7.org/fhir/sid/ndc"));
    }

    #[test]
    fn test_codeable_concept_without_primary_code() {
        // What is left of <code nullFlavor="OTH"><translation .../></code>
        let node = CcdaNode::from(
            Element::new().with_child("translation", cd("75320-2", "2.16.840.1.113883.6.1", "Advance directive")),
        );
        let concept = codeable_concept(Some(&node)).unwrap();
        assert_eq!(
            concept.coding,
            vec![Coding::new("http://loinc.org", "75320-2").with_display("Advance directive")]
        );
    }

    #[test]
    fn test_codeable_concept_original_text_only() {
        let node = CcdaNode::from(Element::new().with_child("originalText", "Penicillin"));
        let concept = codeable_concept(Some(&node)).unwrap();
        assert!(concept.coding.is_empty());
        assert_eq!(concept.text.as_deref(), Some("Penicillin"));
    }

    #[test]
    fn test_codeable_concept_with_nothing_usable() {
        let node = CcdaNode::from(Element::new().with_attribute("codeSystem", "2.16.840.1.113883.6.96"));
        assert_eq!(codeable_concept(Some(&node)), None);
        assert_eq!(codeable_concept(None), None);
    }

    #[test]
    fn test_identifier_forms() {
        let namespaced = Element::new()
            .with_attribute("root", "2.16.840.1.113883.4.1")
            .with_attribute("extension", "111-00-2330");
        assert_eq!(
            identifier(&namespaced).unwrap(),
            Identifier {
                system: Some("http://hl7.org/fhir/sid/us-ssn".to_string()),
                value: Some("111-00-2330".to_string()),
                ..Default::default()
            }
        );

        let bare_uuid = Element::new().with_attribute("root", "E6F1BA43-C0ED-4B9B-9F12-F435D8AD8F92");
        assert_eq!(
            identifier(&bare_uuid).unwrap().value.as_deref(),
            Some("urn:uuid:e6f1ba43-c0ed-4b9b-9f12-f435d8ad8f92")
        );

        let bare_oid = Element::new().with_attribute("root", "1.2.3.4");
        assert_eq!(identifier(&bare_oid).unwrap().value.as_deref(), Some("urn:oid:1.2.3.4"));

        assert_eq!(identifier(&Element::new().with_attribute("assigningAuthorityName", "x")), None);
    }

    #[test]
    fn test_human_name() {
        let node = CcdaNode::from(
            Element::new()
                .with_attribute("use", "L")
                .with_child("given", "Eve")
                .with_child("given", "Betterhalf")
                .with_child("family", "Everywoman"),
        );
        let name = human_name(&node).unwrap();
        assert_eq!(name.use_.as_deref(), Some("official"));
        assert_eq!(name.family.as_deref(), Some("Everywoman"));
        assert_eq!(name.given, vec!["Eve", "Betterhalf"]);

        let only_use = CcdaNode::from(Element::new().with_attribute("use", "L"));
        assert_eq!(human_name(&only_use), None);
    }

    #[test]
    fn test_address() {
        let node = CcdaNode::from(
            Element::new()
                .with_attribute("use", "HP")
                .with_child("streetAddressLine", "2222 Home Street")
                .with_child("city", "Beaverton")
                .with_child("state", "OR")
                .with_child("postalCode", "97867")
                .with_child("country", "US"),
        );
        let address = address(&node).unwrap();
        assert_eq!(address.use_.as_deref(), Some("home"));
        assert_eq!(address.line, vec!["2222 Home Street"]);
        assert_eq!(address.postal_code.as_deref(), Some("97867"));
    }

    #[test]
    fn test_contact_point() {
        let phone = Element::new()
            .with_attribute("use", "HP")
            .with_attribute("value", "tel:+1(555)555-2003");
        let contact = contact_point(&phone).unwrap();
        assert_eq!(contact.system.as_deref(), Some("phone"));
        assert_eq!(contact.value.as_deref(), Some("+1(555)555-2003"));
        assert_eq!(contact.use_.as_deref(), Some("home"));

        let email = Element::new().with_attribute("value", "mailto:eve@example.org");
        assert_eq!(contact_point(&email).unwrap().system.as_deref(), Some("email"));

        let empty = Element::new().with_attribute("value", "tel:");
        assert_eq!(contact_point(&empty), None);
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(date_time_from_hl7("2010").as_deref(), Some("2010"));
        assert_eq!(date_time_from_hl7("201008").as_deref(), Some("2010-08"));
        assert_eq!(date_time_from_hl7("20100815").as_deref(), Some("2010-08-15"));
        assert_eq!(
            date_time_from_hl7("201008151030").as_deref(),
            Some("2010-08-15T10:30:00Z")
        );
        assert_eq!(
            date_time_from_hl7("20100815103015-0500").as_deref(),
            Some("2010-08-15T10:30:15-05:00")
        );
        assert_eq!(
            date_time_from_hl7("20100815103015.123+0000").as_deref(),
            Some("2010-08-15T10:30:15.123+00:00")
        );
    }

    #[test]
    fn test_invalid_timestamps_are_dropped() {
        assert_eq!(date_time_from_hl7("20100231"), None);
        assert_eq!(date_time_from_hl7("201013"), None);
        assert_eq!(date_time_from_hl7("2010081525"), None);
        assert_eq!(date_time_from_hl7("201"), None);
        assert_eq!(date_time_from_hl7("2010-08-15"), None);
        assert_eq!(date_time_from_hl7(""), None);
    }

    #[test]
    fn test_date_truncates_time() {
        assert_eq!(date_from_hl7("19750501103022-0500").as_deref(), Some("1975-05-01"));
        assert_eq!(date_from_hl7("19750501").as_deref(), Some("1975-05-01"));
        assert_eq!(date_from_hl7("19750599"), None);
    }

    #[test]
    fn test_period_and_effective_time() {
        let ivl = CcdaNode::from(
            Element::new()
                .with_child("low", Element::new().with_attribute("value", "20070103"))
                .with_child("high", Element::new().with_attribute("value", "20120806")),
        );
        assert_eq!(
            period(Some(&ivl)),
            Some(Period {
                start: Some("2007-01-03".to_string()),
                end: Some("2012-08-06".to_string()),
            })
        );
        assert_eq!(effective_date_time(Some(&ivl)).as_deref(), Some("2007-01-03"));

        let ts = CcdaNode::from(Element::new().with_attribute("value", "20100815"));
        assert_eq!(effective_date_time(Some(&ts)).as_deref(), Some("2010-08-15"));
        assert_eq!(period(Some(&ts)), None);
    }

    #[test]
    fn test_quantity() {
        let pq = CcdaNode::from(
            Element::new()
                .with_attribute("value", "0.5")
                .with_attribute("unit", "mL"),
        );
        let q = quantity(Some(&pq)).unwrap();
        assert_eq!(q.value.and_then(|v| v.as_f64()), Some(0.5));
        assert_eq!(q.system.as_deref(), Some(UCUM));

        let unitless = CcdaNode::from(
            Element::new()
                .with_attribute("value", "2")
                .with_attribute("unit", "1"),
        );
        let q = quantity(Some(&unitless)).unwrap();
        assert_eq!(q.value, Some(Number::from(2)));
        assert_eq!(q.unit, None);

        let missing = CcdaNode::from(Element::new().with_attribute("unit", "mg"));
        assert_eq!(quantity(Some(&missing)), None);
    }

    #[test]
    fn test_text_ignores_blank() {
        assert_eq!(text(Some(&CcdaNode::from("  "))), None);
        assert_eq!(text(Some(&CcdaNode::from(" x "))).as_deref(), Some("x"));
        let with_marker = CcdaNode::from(Element::new().with_null_flavor(NullFlavor::Unknown));
        assert_eq!(text(Some(&with_marker)), None);
    }
}
