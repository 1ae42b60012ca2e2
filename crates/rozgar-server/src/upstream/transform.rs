// SPDX-License-Identifier: Apache-2.0

//! Maps the provider's loosely shaped records onto the canonical schema.
//! Upstream field names vary between resource revisions, so each canonical
//! field carries a table of known aliases, checked in order.

use chrono::Utc;
use rozgar_model::{DistrictDataset, DistrictRecord, MonthlyMetric};
use serde_json::Value;

const PEOPLE_FIELDS: &[&str] = &[
    "people_benefited",
    "total_people",
    "total_beneficiaries",
    "beneficiaries",
];
const PERSON_DAY_FIELDS: &[&str] = &[
    "person_days",
    "persondays_generated",
    "total_persondays",
    "total_person_days",
];
const WAGE_FIELDS: &[&str] = &["wages_paid", "total_wages", "wage_expenditure"];
const MONTH_FIELDS: &[&str] = &["month", "month_name"];
const YEAR_FIELDS: &[&str] = &["year", "fin_year"];

const MONTH_NAMES: &[(&str, &str)] = &[
    ("January", "जानेवारी"),
    ("February", "फेब्रुवारी"),
    ("March", "मार्च"),
    ("April", "एप्रिल"),
    ("May", "मे"),
    ("June", "जून"),
    ("July", "जुलै"),
    ("August", "ऑगस्ट"),
    ("September", "सप्टेंबर"),
    ("October", "ऑक्टोबर"),
    ("November", "नोव्हेंबर"),
    ("December", "डिसेंबर"),
];

fn field<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| record.get(*name))
}

/// Safe integer coercion: malformed or missing input becomes 0, never an
/// error for the whole record.
pub(crate) fn coerce_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_year(value: Option<&Value>) -> Option<i32> {
    let year = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => {
            // Tolerates fiscal-year forms like "2024-25".
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<i64>().ok()?
        }
        _ => return None,
    };
    (1900..3000).contains(&year).then_some(year as i32)
}

fn month_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|m| MONTH_NAMES.get((m as usize).wrapping_sub(1)))
            .map_or_else(|| "Unknown".to_string(), |(en, _)| (*en).to_string()),
        _ => "Unknown".to_string(),
    }
}

pub(crate) fn marathi_month(month: &str) -> String {
    MONTH_NAMES
        .iter()
        .find(|(en, _)| en.eq_ignore_ascii_case(month))
        .map_or_else(|| month.to_string(), |(_, mr)| (*mr).to_string())
}

/// Builds the canonical dataset from provider records. Returns `None` for an
/// empty record set (a tier miss, not an error).
pub(crate) fn dataset_from_records(
    district: &DistrictRecord,
    records: &[Value],
) -> Option<DistrictDataset> {
    if records.is_empty() {
        return None;
    }
    let mut monthly = Vec::with_capacity(records.len());
    let mut total_people = 0u64;
    let mut total_days = 0u64;
    let mut total_wages = 0u64;
    for record in records {
        let people = coerce_u64(field(record, PEOPLE_FIELDS));
        let days = coerce_u64(field(record, PERSON_DAY_FIELDS));
        let wages = coerce_u64(field(record, WAGE_FIELDS));
        let month = month_label(field(record, MONTH_FIELDS));
        total_people = total_people.saturating_add(people);
        total_days = total_days.saturating_add(days);
        total_wages = total_wages.saturating_add(wages);
        monthly.push(MonthlyMetric {
            month_marathi: marathi_month(&month),
            month,
            people_benefited: people,
            person_days: days,
            wages_paid: wages,
            year: coerce_year(field(record, YEAR_FIELDS)),
        });
    }
    Some(DistrictDataset {
        district: district.name.clone(),
        district_marathi: district.name_marathi.clone(),
        total_people_benefited: total_people,
        total_person_days: total_days,
        total_wages_paid: total_wages,
        last_updated: Utc::now().format("%Y-%m-%d").to_string(),
        monthly_data: monthly,
        historical_data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rozgar_model::DistrictId;
    use serde_json::json;

    fn record_for(name: &str) -> DistrictRecord {
        DistrictRecord {
            id: DistrictId::parse(name).expect("id"),
            name: name.to_string(),
            name_marathi: name.to_string(),
            lat: None,
            lng: None,
        }
    }

    #[test]
    fn coercion_defaults_malformed_input_to_zero() {
        assert_eq!(coerce_u64(Some(&json!(42))), 42);
        assert_eq!(coerce_u64(Some(&json!("42"))), 42);
        assert_eq!(coerce_u64(Some(&json!("  42 "))), 42);
        assert_eq!(coerce_u64(Some(&json!("12.7"))), 12);
        assert_eq!(coerce_u64(Some(&json!(12.7))), 12);
        assert_eq!(coerce_u64(Some(&json!("not a number"))), 0);
        assert_eq!(coerce_u64(Some(&json!(-5))), 0);
        assert_eq!(coerce_u64(Some(&json!(null))), 0);
        assert_eq!(coerce_u64(None), 0);
    }

    #[test]
    fn field_aliases_are_checked_in_order() {
        let district = record_for("pune");
        let records = vec![json!({
            "month": "April",
            "total_beneficiaries": "1200",
            "persondays_generated": 34000,
            "total_wages": "560000"
        })];
        let dataset = dataset_from_records(&district, &records).expect("dataset");
        assert_eq!(dataset.monthly_data[0].people_benefited, 1200);
        assert_eq!(dataset.monthly_data[0].person_days, 34000);
        assert_eq!(dataset.monthly_data[0].wages_paid, 560000);
        assert_eq!(dataset.monthly_data[0].month_marathi, "एप्रिल");
    }

    #[test]
    fn missing_metric_fields_become_zero_not_failure() {
        let district = record_for("pune");
        let records = vec![json!({"month": "May"})];
        let dataset = dataset_from_records(&district, &records).expect("dataset");
        assert_eq!(dataset.monthly_data[0].people_benefited, 0);
        assert_eq!(dataset.total_person_days, 0);
    }

    #[test]
    fn totals_sum_across_records() {
        let district = record_for("pune");
        let records = vec![
            json!({"month": "April", "people_benefited": 10, "person_days": 100, "wages_paid": 1000}),
            json!({"month": "May", "people_benefited": 20, "person_days": 200, "wages_paid": 2000}),
        ];
        let dataset = dataset_from_records(&district, &records).expect("dataset");
        assert_eq!(dataset.total_people_benefited, 30);
        assert_eq!(dataset.total_person_days, 300);
        assert_eq!(dataset.total_wages_paid, 3000);
        assert_eq!(dataset.monthly_data.len(), 2);
    }

    #[test]
    fn empty_record_set_is_absent() {
        assert!(dataset_from_records(&record_for("pune"), &[]).is_none());
    }

    #[test]
    fn fiscal_year_strings_are_tolerated() {
        let district = record_for("pune");
        let records = vec![json!({"month": 4, "fin_year": "2024-25"})];
        let dataset = dataset_from_records(&district, &records).expect("dataset");
        assert_eq!(dataset.monthly_data[0].year, Some(2024));
        assert_eq!(dataset.monthly_data[0].month, "April");
    }
}
