use serde::Deserialize;

/// Figures for one country, or for the whole world when the payload carries
/// no `country` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRecord {
    #[serde(default)]
    country: Option<String>,
    cases: u64,
    active: u64,
    recovered: u64,
    deaths: u64,
    today_cases: u64,
    today_recovered: u64,
    today_deaths: u64,
}

impl StatisticsRecord {
    pub const GLOBAL: &'static str = "Global";

    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(Self::GLOBAL)
    }

    pub fn cases(&self) -> u64 {
        self.cases
    }

    pub fn active(&self) -> u64 {
        self.active
    }

    pub fn recovered(&self) -> u64 {
        self.recovered
    }

    pub fn deaths(&self) -> u64 {
        self.deaths
    }

    pub fn today_cases(&self) -> u64 {
        self.today_cases
    }

    pub fn today_recovered(&self) -> u64 {
        self.today_recovered
    }

    pub fn today_deaths(&self) -> u64 {
        self.today_deaths
    }
}

impl TryFrom<serde_json::Value> for StatisticsRecord {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn testland() -> serde_json::Value {
        json!({
            "cases": 10,
            "active": 2,
            "recovered": 7,
            "deaths": 1,
            "todayCases": 3,
            "todayRecovered": 1,
            "todayDeaths": 0,
            "country": "Testland"
        })
    }

    #[test]
    fn accessors_reproduce_fields() {
        let record = StatisticsRecord::try_from(testland()).unwrap();
        assert_eq!(record.country(), "Testland");
        assert_eq!(record.cases(), 10);
        assert_eq!(record.active(), 2);
        assert_eq!(record.recovered(), 7);
        assert_eq!(record.deaths(), 1);
        assert_eq!(record.today_cases(), 3);
        assert_eq!(record.today_recovered(), 1);
        assert_eq!(record.today_deaths(), 0);
    }

    #[test]
    fn missing_country_is_global() {
        let mut value = testland();
        value.as_object_mut().unwrap().remove("country");
        let record = StatisticsRecord::try_from(value).unwrap();
        assert_eq!(record.country(), "Global");
    }

    #[test]
    fn missing_figure_is_rejected() {
        let mut value = testland();
        value.as_object_mut().unwrap().remove("todayDeaths");
        assert!(StatisticsRecord::try_from(value).is_err());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut value = testland();
        value["updated"] = json!(1_600_000_000_000u64);
        value["countryInfo"] = json!({"iso2": "TL"});
        assert!(StatisticsRecord::try_from(value).is_ok());
    }
}
