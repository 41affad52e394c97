use serde::{Deserialize, Deserializer, Serialize};

/// Company metadata. Providers fill in what they have; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub long_business_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, rename = "trailingPE", deserialize_with = "lenient_f64")]
    pub trailing_pe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default, rename = "logo_url")]
    pub logo_url: Option<String>,
}

impl CompanyProfile {
    /// Clearbit-style logo address for the company's website domain.
    pub fn logo_from_website(website: &str) -> Option<String> {
        let parsed = url::Url::parse(website).ok()?;
        let host = parsed.host_str()?;
        let domain = host.strip_prefix("www.").unwrap_or(host);
        if domain.is_empty() {
            return None;
        }
        Some(format!("https://logo.clearbit.com/{}", domain))
    }
}

/// Accepts a bare number, a `{"raw": n}` wrapper, or anything else as absent.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_value))
}

fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::Object(map) => map.get("raw").and_then(numeric_value),
        _ => None,
    }
}
