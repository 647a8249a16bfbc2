// SPDX-License-Identifier: Apache-2.0

/// Upstream numbers arrive as JSON numbers, numeric strings (`"1,250"`), empty
/// strings or `null`. Anything unparseable is treated as unset.
pub mod loose_number {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Flag(bool),
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let loose = Option::<Loose>::deserialize(deserializer)?;
        Ok(match loose {
            None | Some(Loose::Flag(_)) => None,
            Some(Loose::Number(v)) => Some(v),
            Some(Loose::Text(s)) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | '%' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::loose_number;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, with = "loose_number")]
        v: Option<f64>,
    }

    fn decode(raw: &str) -> Option<f64> {
        serde_json::from_str::<Probe>(raw).expect("decode").v
    }

    #[test]
    fn accepts_numbers_strings_and_nulls() {
        assert_eq!(decode(r#"{"v": 12}"#), Some(12.0));
        assert_eq!(decode(r#"{"v": "1,250.5"}"#), Some(1250.5));
        assert_eq!(decode(r#"{"v": "$3,000"}"#), Some(3000.0));
        assert_eq!(decode(r#"{"v": "-4.2%"}"#), Some(-4.2));
        assert_eq!(decode(r#"{"v": ""}"#), None);
        assert_eq!(decode(r#"{"v": "n/a"}"#), None);
        assert_eq!(decode(r#"{"v": null}"#), None);
        assert_eq!(decode(r#"{}"#), None);
    }
}
