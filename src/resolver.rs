use crate::api::StatisticsRecord;

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Finds the record for a user supplied country name, ignoring case and
/// surrounding whitespace. If the API lists a country twice, the first entry
/// is used.
pub fn resolve<'a>(name: &str, records: &'a [StatisticsRecord]) -> Option<&'a StatisticsRecord> {
    let name = normalize(name);
    records
        .iter()
        .find(|record| normalize(record.country()) == name)
}

pub fn country_names(records: &[StatisticsRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.country().to_lowercase())
        .collect()
}

pub fn contains(name: &str, names: &[String]) -> bool {
    let name = normalize(name);
    names.iter().any(|n| *n == name)
}
