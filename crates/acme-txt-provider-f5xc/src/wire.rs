// # F5 XC wire format
//
// Request and response bodies of the `rrsets` endpoints.
//
// ```json
// {
//   "dns_zone_name": "example.com",
//   "group_name": "acme",
//   "rrset": {
//     "ttl": 60,
//     "txt_record": { "name": "_acme-challenge", "values": ["tok-1"] }
//   }
// }
// ```
//
// Fields the API returns beyond these are captured by the flattened `extra`
// maps and written back unchanged on PUT.

use acme_txt_core::traits::{CHALLENGE_RECORD_TTL, RecordKey, RecordSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Key under which rrset-level extra fields are kept in [`RecordSet::extra`]
const RRSET_EXTRA_KEY: &str = "rrset";

/// Key under which `txt_record` extra fields are kept inside the rrset extras
const TXT_RECORD_EXTRA_KEY: &str = "txt_record";

/// Top-level record set document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RrSetDocument {
    #[serde(default)]
    pub dns_zone_name: String,

    #[serde(default)]
    pub group_name: String,

    pub rrset: RrSet,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `rrset` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RrSet {
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    #[serde(default)]
    pub txt_record: TxtRecord,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `txt_record` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxtRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_ttl() -> u32 {
    CHALLENGE_RECORD_TTL
}

/// `"values": null` is an empty record
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RrSetDocument {
    /// Body of a create call: one value, TTL 60
    pub fn for_create(key: &RecordKey, initial_value: &str) -> Self {
        Self {
            dns_zone_name: key.zone_name.clone(),
            group_name: key.group_name.clone(),
            rrset: RrSet {
                ttl: CHALLENGE_RECORD_TTL,
                txt_record: TxtRecord {
                    name: key.record_name.clone(),
                    values: vec![initial_value.to_string()],
                    extra: Map::new(),
                },
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Body of a replace call, restoring every field captured on fetch
    pub fn from_record(record: &RecordSet) -> Self {
        let mut extra = match &record.extra {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let mut rrset_extra = match extra.remove(RRSET_EXTRA_KEY) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let txt_extra = match rrset_extra.remove(TXT_RECORD_EXTRA_KEY) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Self {
            dns_zone_name: record.zone_name.clone(),
            group_name: record.group_name.clone(),
            rrset: RrSet {
                ttl: record.ttl,
                txt_record: TxtRecord {
                    name: record.record_name.clone(),
                    values: record.values.clone(),
                    extra: txt_extra,
                },
                extra: rrset_extra,
            },
            extra,
        }
    }

    /// Convert a response into a record set
    ///
    /// Names missing from the response are taken from `key`.
    pub fn into_record(self, key: &RecordKey) -> RecordSet {
        let mut extra = self.extra;
        let mut rrset_extra = self.rrset.extra;
        if !self.rrset.txt_record.extra.is_empty() {
            rrset_extra.insert(
                TXT_RECORD_EXTRA_KEY.to_string(),
                Value::Object(self.rrset.txt_record.extra),
            );
        }
        if !rrset_extra.is_empty() {
            extra.insert(RRSET_EXTRA_KEY.to_string(), Value::Object(rrset_extra));
        }

        RecordSet {
            zone_name: non_empty_or(self.dns_zone_name, &key.zone_name),
            group_name: non_empty_or(self.group_name, &key.group_name),
            record_name: non_empty_or(self.rrset.txt_record.name, &key.record_name),
            ttl: self.rrset.ttl,
            values: self.rrset.txt_record.values,
            extra: if extra.is_empty() {
                Value::Null
            } else {
                Value::Object(extra)
            },
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> RecordKey {
        RecordKey::new("example.com", "acme", "_acme-challenge")
    }

    #[test]
    fn test_create_body_shape() {
        let body = serde_json::to_value(RrSetDocument::for_create(&key(), "tok-1")).unwrap();

        assert_eq!(
            body,
            json!({
                "dns_zone_name": "example.com",
                "group_name": "acme",
                "rrset": {
                    "ttl": 60,
                    "txt_record": { "name": "_acme-challenge", "values": ["tok-1"] }
                }
            })
        );
    }

    #[test]
    fn test_unknown_fields_survive_fetch_and_replace() {
        let response = json!({
            "dns_zone_name": "example.com",
            "group_name": "acme",
            "namespace": "system",
            "record_name": "_acme-challenge",
            "type": "TXT",
            "rrset": {
                "ttl": 300,
                "description": "challenge tokens",
                "txt_record": { "name": "_acme-challenge", "values": ["tok-1"] }
            }
        });

        let doc: RrSetDocument = serde_json::from_value(response.clone()).unwrap();
        let record = doc.into_record(&key());
        assert_eq!(record.ttl, 300);
        assert_eq!(record.values, vec!["tok-1"]);

        let updated = record.with_values(vec!["tok-1".to_string(), "tok-2".to_string()]);
        let body = serde_json::to_value(RrSetDocument::from_record(&updated)).unwrap();

        let mut expected = response;
        expected["rrset"]["txt_record"]["values"] = json!(["tok-1", "tok-2"]);
        assert_eq!(body, expected);
    }

    #[test]
    fn test_sparse_response_falls_back_to_key() {
        let doc: RrSetDocument =
            serde_json::from_value(json!({ "rrset": { "ttl": 60 } })).unwrap();
        let record = doc.into_record(&key());

        assert_eq!(record.key(), key());
        assert!(record.values.is_empty());
        assert_eq!(record.extra, Value::Null);
    }

    #[test]
    fn test_missing_ttl_defaults_to_challenge_ttl() {
        let doc: RrSetDocument = serde_json::from_value(json!({
            "rrset": { "txt_record": { "name": "_acme-challenge", "values": ["a"] } }
        }))
        .unwrap();
        let record = doc
            .into_record(&key())
            .with_values(vec!["a".to_string(), "b".to_string()]);

        let body = serde_json::to_value(RrSetDocument::from_record(&record)).unwrap();
        assert_eq!(body["rrset"]["ttl"], json!(60));
        assert_eq!(body["rrset"]["txt_record"]["values"], json!(["a", "b"]));
    }

    #[test]
    fn test_txt_record_fields_survive_replace() {
        let response = json!({
            "dns_zone_name": "example.com",
            "group_name": "acme",
            "rrset": {
                "ttl": 120,
                "txt_record": {
                    "name": "_acme-challenge",
                    "values": ["tok-1"],
                    "labels": { "owner": "cert-manager" }
                }
            }
        });

        let doc: RrSetDocument = serde_json::from_value(response.clone()).unwrap();
        let record = doc
            .into_record(&key())
            .with_values(vec!["tok-1".to_string(), "tok-2".to_string()]);
        let body = serde_json::to_value(RrSetDocument::from_record(&record)).unwrap();

        let mut expected = response;
        expected["rrset"]["txt_record"]["values"] = json!(["tok-1", "tok-2"]);
        assert_eq!(body, expected);
    }

    #[test]
    fn test_null_values_decode_as_empty() {
        let doc: RrSetDocument = serde_json::from_value(json!({
            "rrset": { "ttl": 60, "txt_record": { "name": "_acme-challenge", "values": null } }
        }))
        .unwrap();

        assert!(doc.into_record(&key()).values.is_empty());
    }

    #[test]
    fn test_missing_rrset_is_rejected() {
        let result = serde_json::from_value::<RrSetDocument>(json!({ "group_name": "acme" }));
        assert!(result.is_err());
    }
}
