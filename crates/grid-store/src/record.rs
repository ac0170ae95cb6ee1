//! Record data model
//!
//! Defines the fundamental row types shared by every recordgrid crate:
//! - Record identifiers
//! - Scalar field values and their ordering
//! - Records, draft edits and update requests

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use ulid::Ulid;

/// Name of the identity key in the serialized record form
pub const ID_FIELD: &str = "Id";

/// Ordered field name to value mapping
pub type FieldMap = IndexMap<String, FieldValue>;

/// Unique record identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (ULID for sortability)
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Identifier as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Scalar value held by a record field
///
/// Serialized untagged: `null`, a JSON number, an ISO `YYYY-MM-DD` string
/// (parsed as a date) or any other string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing / cleared value
    Null,
    /// Numeric value
    Number(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Free text
    Text(String),
}

impl FieldValue {
    /// Total ordering used by sorting.
    ///
    /// Kinds rank `Null < Number < Date < Text`; same-kind values compare
    /// natively.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Whether the value is null or blank text
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text used for substring filtering
    #[must_use]
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{n:.0}")
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One row: an identified mapping from field name to value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identity
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Field values, in column order
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    /// Create record without fields
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: FieldMap::new(),
        }
    }

    /// With field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field value
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text of a field for filtering; the `Id` key resolves to the record id
    #[must_use]
    pub fn text_of(&self, field: &str) -> Option<Cow<'_, str>> {
        if field == ID_FIELD {
            return Some(Cow::Borrowed(self.id.as_str()));
        }
        self.fields.get(field).map(FieldValue::display_text)
    }

    /// Compare two records on one field.
    ///
    /// Missing fields compare like `Null`. `Id` compares the identifiers.
    #[must_use]
    pub fn compare_on(&self, other: &Self, field: &str) -> Ordering {
        if field == ID_FIELD {
            return self.id.cmp(&other.id);
        }
        match (self.fields.get(field), other.fields.get(field)) {
            (Some(a), Some(b)) => a.compare(b),
            (None, None) => Ordering::Equal,
            (None, Some(b)) => FieldValue::Null.compare(b),
            (Some(a), None) => a.compare(&FieldValue::Null),
        }
    }

    /// Merge a draft edit into this record's fields
    pub fn apply(&mut self, draft: &DraftEdit) {
        for (name, value) in draft.iter() {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

/// Sparse, unsaved change set for one record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftEdit {
    fields: FieldMap,
}

impl DraftEdit {
    /// Create empty draft
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With field value
    #[inline]
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field; later values overwrite earlier ones
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Merge another draft into this one (other wins per field)
    pub fn merge(&mut self, other: DraftEdit) {
        self.fields.extend(other.fields);
    }

    /// Staged value for a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Iterate staged fields
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Number of staged fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is staged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume into the underlying field map
    #[inline]
    #[must_use]
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }
}

impl From<FieldMap> for DraftEdit {
    fn from(fields: FieldMap) -> Self {
        Self { fields }
    }
}

/// A draft edit addressed to a record, ready for the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    /// Target record
    pub record_id: RecordId,
    /// Fields to overwrite
    pub fields: FieldMap,
}

impl RecordUpdate {
    /// Build update from a draft
    #[inline]
    #[must_use]
    pub fn new(record_id: RecordId, draft: DraftEdit) -> Self {
        Self {
            record_id,
            fields: draft.into_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_value_ordering() {
        let a = FieldValue::from(2.0);
        let b = FieldValue::from(10.0);
        assert_eq!(a.compare(&b), Ordering::Less);

        // Text compares lexicographically, unlike numbers
        let a = FieldValue::from("2");
        let b = FieldValue::from("10");
        assert_eq!(a.compare(&b), Ordering::Greater);

        assert_eq!(FieldValue::Null.compare(&FieldValue::from("a")), Ordering::Less);
        assert_eq!(FieldValue::from(1.0).compare(&FieldValue::Null), Ordering::Greater);
    }

    #[test]
    fn mixed_kinds_order_by_kind() {
        let nine = FieldValue::from(9.0);
        let ten = FieldValue::from(10.0);
        let text = FieldValue::from("10a");
        let date = FieldValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert_eq!(nine.compare(&ten), Ordering::Less);
        assert_eq!(ten.compare(&text), Ordering::Less);
        assert_eq!(nine.compare(&text), Ordering::Less);
        assert_eq!(text.compare(&nine), Ordering::Greater);
        assert_eq!(ten.compare(&date), Ordering::Less);
        assert_eq!(date.compare(&text), Ordering::Less);

        let mut column = vec![text.clone(), date.clone(), FieldValue::Null, ten.clone(), nine.clone()];
        column.sort_by(FieldValue::compare);
        assert_eq!(column, vec![FieldValue::Null, nine, ten, date, text]);
    }

    #[test]
    fn date_ordering() {
        let early = FieldValue::from(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        let late = FieldValue::from(NaiveDate::from_ymd_opt(2023, 11, 30).unwrap());
        assert_eq!(early.compare(&late), Ordering::Less);
    }

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(FieldValue::from(42.0).to_string(), "42");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn record_json_shape() {
        let json = r#"{"Id":"001","Name":"Acme","Employees":120,"Founded":"1999-04-01","Fax":null}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, RecordId::from("001"));
        assert_eq!(record.get("Name"), Some(&FieldValue::from("Acme")));
        assert_eq!(record.get("Employees"), Some(&FieldValue::Number(120.0)));
        assert_eq!(
            record.get("Founded"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(1999, 4, 1).unwrap()))
        );
        assert_eq!(record.get("Fax"), Some(&FieldValue::Null));

        let keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "Employees", "Founded", "Fax"]);
    }

    #[test]
    fn compare_on_missing_field_sorts_first() {
        let with = Record::new("1").with_field("City", "Oslo");
        let without = Record::new("2");
        assert_eq!(without.compare_on(&with, "City"), Ordering::Less);
        assert_eq!(with.compare_on(&without, "City"), Ordering::Greater);
        assert_eq!(with.compare_on(&without, ID_FIELD), Ordering::Less);
    }

    #[test]
    fn draft_later_edit_wins() {
        let mut draft = DraftEdit::new().with("Name", "Acme2");
        draft.set("Name", "Acme3");
        draft.merge(DraftEdit::new().with("BillingCity", "Paris"));

        assert_eq!(draft.len(), 2);
        assert_eq!(draft.get("Name"), Some(&FieldValue::from("Acme3")));

        let mut record = Record::new("1").with_field("Name", "Acme");
        record.apply(&draft);
        assert_eq!(record.get("Name"), Some(&FieldValue::from("Acme3")));
        assert_eq!(record.get("BillingCity"), Some(&FieldValue::from("Paris")));
    }

    #[test]
    fn record_update_wire_form() {
        let update = RecordUpdate::new(RecordId::from("7"), DraftEdit::new().with("Name", "X"));
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"recordId":"7","fields":{"Name":"X"}}"#);
    }
}
