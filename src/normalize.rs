use crate::models::{CeoProfile, CompanyRecord, GeoDefaults, Headquarters, RtibContact};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Legacy-to-canonical field mapping, applied once at the store boundary.
/// Resolution order is fixed per family: first defined-and-non-empty source
/// wins. Every view reads through this one table, so the same raw document
/// can never display differently on different pages.
static COMPANY_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    table.insert("name", &["companyName", "name"]);
    table.insert("industry", &["businessActivity", "industry"]);
    table.insert("description", &["description", "registeredAddress"]);
    table.insert("headquarters", &["hqLocation", "location"]);
    table.insert("employees", &["numEmployees", "employeeCount"]);
    table.insert("marketCapOrRevenue", &["annualRevenue", "marketCap"]);
    table.insert("contactEmail", &["email", "contactEmail"]);
    table
});

fn alias_sources(family: &str) -> &'static [&'static str] {
    COMPANY_ALIASES.get(family).copied().unwrap_or(&[])
}

fn text_field(doc: &Map<String, Value>, family: &str) -> Option<String> {
    for key in alias_sources(family) {
        if let Some(text) = doc.get(*key).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn number_field(doc: &Map<String, Value>, family: &str) -> Option<f64> {
    alias_sources(family).iter().find_map(|key| parse_number(doc.get(*key)?))
}

// Raw documents are schema-less; numeric fields arrive as JSON numbers or as
// numeric strings, and anything unparseable falls back to the default.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn optional_text(doc: &Map<String, Value>, key: &str) -> Option<String> {
    let text = doc.get(key)?.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Splits a free-text "city, country" value on its first comma. Missing
/// pieces fall back to the configured geographic defaults rather than a
/// hardcoded country.
pub fn split_location(raw: Option<&str>, geo: &GeoDefaults) -> Headquarters {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Headquarters {
            city: geo.city.clone(),
            country: geo.country.clone(),
        };
    };

    match raw.split_once(',') {
        Some((city, country)) => {
            let city = city.trim();
            let country = country.trim();
            Headquarters {
                city: if city.is_empty() { geo.city.clone() } else { city.to_string() },
                country: if country.is_empty() {
                    geo.country.clone()
                } else {
                    country.to_string()
                },
            }
        }
        None => Headquarters {
            city: raw.to_string(),
            country: geo.country.clone(),
        },
    }
}

/// Maps a raw store document into the canonical record of the directory
/// views. Missing optional fields are never an error: every field downstream
/// code touches gets a type-correct default.
pub fn normalize_company(doc: &Value, geo: &GeoDefaults) -> Option<CompanyRecord> {
    let object = doc.as_object()?;
    let id = object.get("id").and_then(Value::as_str)?.to_string();

    let ceo = optional_text(object, "ceoName").map(|name| CeoProfile {
        name,
        birth_date: optional_text(object, "ceoBirthDate"),
    });

    let rtib_contact = optional_text(object, "rtibContactName").map(|name| RtibContact {
        name,
        position: optional_text(object, "rtibContactPosition"),
        phone: optional_text(object, "rtibContactPhone"),
        email: optional_text(object, "rtibContactEmail"),
    });

    Some(CompanyRecord {
        id,
        rank: object.get("rank").and_then(parse_number).unwrap_or(0.0) as i64,
        name: text_field(object, "name").unwrap_or_default(),
        industry: text_field(object, "industry").unwrap_or_default(),
        description: text_field(object, "description").unwrap_or_default(),
        headquarters: split_location(text_field(object, "headquarters").as_deref(), geo),
        employees: number_field(object, "employees").unwrap_or(0.0).max(0.0) as u64,
        market_cap_or_revenue: number_field(object, "marketCapOrRevenue").unwrap_or(0.0),
        website: optional_text(object, "website"),
        contact_email: text_field(object, "contactEmail"),
        phone: optional_text(object, "phone"),
        logo_url: optional_text(object, "logoUrl"),
        featured: object.get("featured").and_then(Value::as_bool).unwrap_or(false),
        ceo,
        rtib_contact,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_company, split_location};
    use crate::models::GeoDefaults;
    use serde_json::json;

    #[test]
    fn prefers_new_field_name_over_legacy() {
        let doc = json!({
            "id": "c1",
            "companyName": "Efes Rus",
            "name": "Old Display Name",
            "businessActivity": "Brewing",
            "industry": "Beverages"
        });
        let company = normalize_company(&doc, &GeoDefaults::default()).expect("normalized");
        assert_eq!(company.name, "Efes Rus");
        assert_eq!(company.industry, "Brewing");
    }

    #[test]
    fn falls_back_to_legacy_field_when_primary_is_missing_or_empty() {
        let doc = json!({
            "id": "c2",
            "companyName": "   ",
            "name": "Mavi",
            "industry": "Retail"
        });
        let company = normalize_company(&doc, &GeoDefaults::default()).expect("normalized");
        assert_eq!(company.name, "Mavi");
        assert_eq!(company.industry, "Retail");
    }

    #[test]
    fn defaults_every_field_when_both_aliases_are_absent() {
        let doc = json!({ "id": "c3" });
        let geo = GeoDefaults::default();
        let company = normalize_company(&doc, &geo).expect("normalized");
        assert_eq!(company.name, "");
        assert_eq!(company.industry, "");
        assert_eq!(company.description, "");
        assert_eq!(company.headquarters.city, "Unknown");
        assert_eq!(company.headquarters.country, "Russia");
        assert_eq!(company.employees, 0);
        assert_eq!(company.market_cap_or_revenue, 0.0);
        assert_eq!(company.rank, 0);
        assert!(!company.featured);
        assert!(company.ceo.is_none());
        assert!(company.rtib_contact.is_none());
    }

    #[test]
    fn splits_location_on_first_comma_only() {
        let geo = GeoDefaults::default();
        let hq = split_location(Some("Moscow, Russia"), &geo);
        assert_eq!(hq.city, "Moscow");
        assert_eq!(hq.country, "Russia");

        let hq = split_location(Some("St. Petersburg, Leningrad Oblast, Russia"), &geo);
        assert_eq!(hq.city, "St. Petersburg");
        assert_eq!(hq.country, "Leningrad Oblast, Russia");
    }

    #[test]
    fn location_without_comma_uses_configured_country() {
        let geo = GeoDefaults {
            city: "Unknown".to_string(),
            country: "Türkiye".to_string(),
        };
        let hq = split_location(Some("Istanbul"), &geo);
        assert_eq!(hq.city, "Istanbul");
        assert_eq!(hq.country, "Türkiye");
    }

    #[test]
    fn numeric_strings_parse_and_garbage_defaults_to_zero() {
        let doc = json!({
            "id": "c4",
            "numEmployees": "1500",
            "annualRevenue": "not a number",
            "rank": 2
        });
        let company = normalize_company(&doc, &GeoDefaults::default()).expect("normalized");
        assert_eq!(company.employees, 1500);
        assert_eq!(company.market_cap_or_revenue, 0.0);
        assert_eq!(company.rank, 2);
    }

    #[test]
    fn profile_sub_objects_require_a_name() {
        let doc = json!({
            "id": "c5",
            "ceoName": "Ayşe Demir",
            "ceoBirthDate": "1970-03-12",
            "rtibContactPhone": "+7 495 000 00 00"
        });
        let company = normalize_company(&doc, &GeoDefaults::default()).expect("normalized");
        let ceo = company.ceo.expect("ceo profile");
        assert_eq!(ceo.name, "Ayşe Demir");
        assert_eq!(ceo.birth_date.as_deref(), Some("1970-03-12"));
        // a stray contact phone without a contact name is not a contact
        assert!(company.rtib_contact.is_none());
    }

    #[test]
    fn documents_without_an_id_are_rejected() {
        assert!(normalize_company(&json!({"companyName": "X"}), &GeoDefaults::default()).is_none());
    }
}
