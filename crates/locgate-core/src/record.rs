//! Access log data model.
//!
//! The persisted document has the shape:
//!
//! ```json
//! {
//!   "entries": {
//!     "alice": {
//!       "lastPaidDate": "2024-01-01",
//!       "history": [ { "date": "2024-01-01", "txHash": "0xabc" } ]
//!     }
//!   }
//! }
//! ```
//!
//! Records are read leniently. Each identity is decoded on its own: a value
//! under `entries` that is not an object is kept verbatim and written back
//! unchanged, and reads as "no record". Inside a record, a `lastPaidDate` that
//! is not a string is loaded as absent and a `history` that is not an array is
//! loaded as empty. History items without a valid `date` are kept verbatim.
//! `entries` may also be a JSON array, read as identities `"0"`, `"1"`, ...
//! The document only fails to parse when `entries` is missing or is neither
//! an object nor an array.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::Value;
use std::collections::BTreeMap;

/// Format used for every stored and reported date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
///
/// Only the zero-padded, ten character form is accepted so that a parsed date
/// always formats back to the exact string it was read from.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The whole store: identity -> access record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessLog {
    pub entries: BTreeMap<String, AccessRecord>,
    /// Identities whose stored value is not a record, passed through as-is.
    unreadable: BTreeMap<String, Value>,
}

impl AccessLog {
    /// Create an empty access log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for an identity. Identities are case-sensitive.
    pub fn get(&self, identity: &str) -> Option<&AccessRecord> {
        self.entries.get(identity)
    }

    /// Number of identities with a readable record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unreadable.is_empty()
    }

    /// Number of identities whose stored value could not be read as a record.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    /// Record a payment for `identity` on `date`, creating the record on first use.
    ///
    /// An unreadable stored value for `identity` is replaced by a fresh record.
    pub fn record_payment(
        &mut self,
        identity: &str,
        date: NaiveDate,
        tx_hash: Option<&str>,
    ) -> &AccessRecord {
        self.unreadable.remove(identity);
        let record = self.entries.entry(identity.to_string()).or_default();
        record.record_payment(date, tx_hash);
        record
    }

    fn insert_raw(&mut self, identity: String, value: Value) {
        match value {
            Value::Object(_) => match serde_json::from_value::<AccessRecord>(value.clone()) {
                Ok(record) => {
                    self.entries.insert(identity, record);
                }
                Err(_) => {
                    self.unreadable.insert(identity, value);
                }
            },
            other => {
                self.unreadable.insert(identity, other);
            }
        }
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    entries: BTreeMap<&'a str, EntryRef<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EntryRef<'a> {
    Record(&'a AccessRecord),
    Raw(&'a Value),
}

impl Serialize for AccessLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: BTreeMap<&str, EntryRef<'_>> = self
            .unreadable
            .iter()
            .map(|(identity, raw)| (identity.as_str(), EntryRef::Raw(raw)))
            .collect();
        entries.extend(
            self.entries
                .iter()
                .map(|(identity, record)| (identity.as_str(), EntryRef::Record(record))),
        );
        DocumentRef { entries }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawDocument {
            entries: Value,
        }

        let raw = RawDocument::deserialize(deserializer)?;
        let mut log = AccessLog::new();
        match raw.entries {
            Value::Object(map) => {
                for (identity, value) in map {
                    log.insert_raw(identity, value);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.into_iter().enumerate() {
                    log.insert_raw(index.to_string(), value);
                }
            }
            _ => return Err(D::Error::custom("`entries` must be an object or an array")),
        }
        Ok(log)
    }
}

/// Payment state for a single identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    /// Raw stored value. Kept as text so that an unparseable value survives
    /// rewrites untouched; see [`AccessRecord::last_paid`].
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_paid_date: Option<String>,

    /// Append-only, in the order payments were logged.
    #[serde(default, deserialize_with = "lenient_history")]
    pub history: Vec<HistoryItem>,
}

impl AccessRecord {
    /// The most recent payment date, if present and well-formed.
    pub fn last_paid(&self) -> Option<NaiveDate> {
        self.last_paid_date.as_deref().and_then(parse_date)
    }

    /// Append a history entry and move `lastPaidDate` to match it.
    ///
    /// An empty `tx_hash` is treated as not supplied.
    pub fn record_payment(&mut self, date: NaiveDate, tx_hash: Option<&str>) {
        self.last_paid_date = Some(format_date(date));
        self.history.push(HistoryItem::Entry(HistoryEntry {
            date,
            tx_hash: tx_hash.filter(|h| !h.is_empty()).map(str::to_string),
        }));
    }
}

/// One item of a record's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HistoryItem {
    Entry(HistoryEntry),
    /// Stored item without a valid `date`, written back unchanged.
    Raw(Value),
}

impl HistoryItem {
    pub fn entry(&self) -> Option<&HistoryEntry> {
        match self {
            HistoryItem::Entry(entry) => Some(entry),
            HistoryItem::Raw(_) => None,
        }
    }

    fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return HistoryItem::Raw(value);
        }
        match serde_json::from_value::<HistoryEntry>(value.clone()) {
            Ok(entry) => HistoryItem::Entry(entry),
            Err(_) => HistoryItem::Raw(value),
        }
    }
}

/// One logged payment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(with = "ymd")]
    pub date: NaiveDate,

    /// Opaque caller-supplied transaction reference; omitted from the
    /// document entirely when absent.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tx_hash: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<HistoryItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(HistoryItem::from_value).collect()),
        _ => Ok(Vec::new()),
    }
}

/// Strict `YYYY-MM-DD` serde adapter for [`NaiveDate`].
mod ymd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD")))
    }
}
