use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A carrier response for one tracking code, sorted into the shapes the
/// classifier knows how to read.
///
/// Construction never fails: anything that is neither a well-formed
/// response nor an error object ends up as `Unrecognized`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCarrierPayload {
    WellFormed(CarrierResponse),
    Error(ErrorResponse),
    Unrecognized(Value),
}

impl RawCarrierPayload {
    pub fn from_value(value: Value) -> Self {
        if let Some(error) = value.as_object().and_then(|map| map.get("error")) {
            return Self::Error(ErrorResponse {
                error: error.as_str().map(ToOwned::to_owned),
            });
        }

        match CarrierResponse::from_value(&value) {
            Some(response) => Self::WellFormed(response),
            None => Self::Unrecognized(value),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl<'de> Deserialize<'de> for RawCarrierPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Error body returned by the tracking service (`{error?: string}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: Option<String>,
}

/// The parts of a carrier response the tracker relies on.
///
/// Carriers spell the same field more than one way; each field takes the
/// first spelling that holds a string (or array), the rest are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierResponse {
    pub item_code: String,
    /// Checkpoints, newest first.
    pub history: Vec<Checkpoint>,
    pub summary: Option<String>,
}

impl CarrierResponse {
    /// `None` unless the value is an object with a non-blank item code and
    /// a checkpoint list.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let item_code = first_str(map, &["itemcode", "ItemCode"])?;
        if item_code.trim().is_empty() {
            return None;
        }
        let history = ["itemcodehistory", "Maslul"]
            .iter()
            .find_map(|name| map.get(*name).and_then(Value::as_array))?
            .iter()
            .map(Checkpoint::from_value)
            .collect();

        Some(Self {
            item_code: item_code.to_owned(),
            history,
            summary: first_string(map, &["status", "Status"]),
        })
    }

    /// Text of the newest checkpoint, or the top-level summary.
    pub fn latest_text(&self) -> Option<&str> {
        self.history
            .first()
            .and_then(Checkpoint::text)
            .or(self.summary.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Checkpoint {
    pub state_description: Option<String>,
    pub desc: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub city: Option<String>,
}

impl Checkpoint {
    /// Non-object entries read as an empty checkpoint.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            state_description: first_string(map, &["stateDescription"]),
            desc: first_string(map, &["desc"]),
            status: first_string(map, &["Status"]),
            date: first_string(map, &["date", "StatusDate"]),
            city: first_string(map, &["city", "City"]),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.state_description
            .as_deref()
            .or(self.desc.as_deref())
            .or(self.status.as_deref())
    }
}

fn first_str<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| map.get(*name).and_then(Value::as_str))
}

fn first_string(map: &Map<String, Value>, names: &[&str]) -> Option<String> {
    first_str(map, names).map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_key_wins_over_everything_else() {
        let payload = RawCarrierPayload::from_value(json!({
            "error": "not found",
            "itemcode": "RR1",
            "itemcodehistory": []
        }));
        assert_eq!(
            payload,
            RawCarrierPayload::Error(ErrorResponse {
                error: Some("not found".to_string())
            })
        );
    }

    #[test]
    fn missing_item_code_is_unrecognized() {
        let payload = RawCarrierPayload::from_value(json!({ "itemcodehistory": [] }));
        assert!(matches!(payload, RawCarrierPayload::Unrecognized(_)));
    }

    #[test]
    fn israel_post_field_names_are_accepted() {
        let payload = RawCarrierPayload::from_value(json!({
            "ItemCode": "RR123456789IL",
            "Maslul": [{ "Status": "נמסר ללקוח", "City": "חיפה", "StatusDate": "01/02/2024" }],
            "Status": null
        }));
        let RawCarrierPayload::WellFormed(response) = payload else {
            panic!("expected well-formed payload");
        };
        assert_eq!(response.latest_text(), Some("נמסר ללקוח"));
        assert_eq!(response.history[0].city.as_deref(), Some("חיפה"));
    }

    #[test]
    fn both_spellings_of_a_field_do_not_conflict() {
        let payload = RawCarrierPayload::from_value(json!({
            "itemcode": "RR1",
            "ItemCode": "RR1",
            "itemcodehistory": [{
                "desc": "נמסר ללקוח",
                "date": "2024-02-01",
                "StatusDate": "01/02/2024",
                "city": "Haifa",
                "City": "חיפה"
            }],
            "status": "x",
            "Status": "y"
        }));
        let RawCarrierPayload::WellFormed(response) = payload else {
            panic!("expected well-formed payload");
        };
        assert_eq!(response.latest_text(), Some("נמסר ללקוח"));
        assert_eq!(response.summary.as_deref(), Some("x"));
        assert_eq!(response.history[0].date.as_deref(), Some("2024-02-01"));
        assert_eq!(response.history[0].city.as_deref(), Some("Haifa"));
    }

    #[test]
    fn non_string_fields_read_as_absent() {
        let payload = RawCarrierPayload::from_value(json!({
            "itemcode": 42,
            "ItemCode": "RR1",
            "itemcodehistory": [7, { "stateDescription": null, "desc": "Sorting" }]
        }));
        let RawCarrierPayload::WellFormed(response) = payload else {
            panic!("expected well-formed payload");
        };
        assert_eq!(response.item_code, "RR1");
        assert_eq!(response.history[0], Checkpoint::default());
        assert_eq!(response.history[1].text(), Some("Sorting"));
    }
}
