//! Value: the unit of data marshaled across the interface boundary
//!
//! A `Value` is one instance of a closed set of kinds. Children are owned
//! outright (`Vec`, `BTreeMap`), so every value graph is a tree and
//! cloning a value always produces an independent copy.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Table payload: keyable values mapped to child values.
///
/// Iteration order is the key order, which keeps encoding and printing
/// deterministic for the same logical table.
pub type Table = BTreeMap<TableKey, Value>;

/// Kind of a value, and its one-byte wire tag
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null = 0x00,
    Bool = 0x01,
    Integer = 0x02,
    Float = 0x03,
    Text = 0x04,
    Array = 0x05,
    Table = 0x06,
}

impl Kind {
    /// Every kind, in tag order
    pub const ALL: [Kind; 7] = [
        Kind::Null,
        Kind::Bool,
        Kind::Integer,
        Kind::Float,
        Kind::Text,
        Kind::Array,
        Kind::Table,
    ];

    /// Wire tag byte
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Kind for a wire tag, `None` for unregistered tags
    pub fn from_tag(tag: u8) -> Option<Kind> {
        Kind::ALL.get(tag as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Bool => "Bool",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::Text => "Text",
            Kind::Array => "Array",
            Kind::Table => "Table",
        }
    }

    /// Whether values of this kind may be used as table keys
    pub fn is_keyable(self) -> bool {
        !matches!(self, Kind::Array | Kind::Table)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// TableKey: keyable subset of Value
///
/// Every scalar kind can be a key. Keys compare by exact payload: floats use
/// `f64::total_cmp`, so NaN is a usable key and `0.0` and `-0.0` are distinct
/// keys. Across kinds, keys order by tag.
#[derive(Debug, Clone)]
pub enum TableKey {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(Vec<u8>),
}

impl TableKey {
    pub fn kind(&self) -> Kind {
        match self {
            TableKey::Null => Kind::Null,
            TableKey::Bool(_) => Kind::Bool,
            TableKey::Integer(_) => Kind::Integer,
            TableKey::Float(_) => Kind::Float,
            TableKey::Text(_) => Kind::Text,
        }
    }

    /// Try to convert a Value to a TableKey
    /// Returns None for containers (Array, Table)
    pub fn from_value(value: &Value) -> Option<TableKey> {
        match value {
            Value::Null => Some(TableKey::Null),
            Value::Bool(b) => Some(TableKey::Bool(*b)),
            Value::Integer(n) => Some(TableKey::Integer(*n)),
            Value::Float(f) => Some(TableKey::Float(*f)),
            Value::Text(s) => Some(TableKey::Text(s.clone())),
            _ => None,
        }
    }

    /// Consuming variant of `from_value`, handing the value back on failure
    pub fn try_from_value(value: Value) -> Result<TableKey, Value> {
        match value {
            Value::Null => Ok(TableKey::Null),
            Value::Bool(b) => Ok(TableKey::Bool(b)),
            Value::Integer(n) => Ok(TableKey::Integer(n)),
            Value::Float(f) => Ok(TableKey::Float(f)),
            Value::Text(s) => Ok(TableKey::Text(s)),
            other => Err(other),
        }
    }

    /// Convert TableKey back to Value
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl Ord for TableKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TableKey::Null, TableKey::Null) => Ordering::Equal,
            (TableKey::Bool(a), TableKey::Bool(b)) => a.cmp(b),
            (TableKey::Integer(a), TableKey::Integer(b)) => a.cmp(b),
            (TableKey::Float(a), TableKey::Float(b)) => a.total_cmp(b),
            (TableKey::Text(a), TableKey::Text(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for TableKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            TableKey::Null => {}
            TableKey::Bool(b) => b.hash(state),
            TableKey::Integer(n) => n.hash(state),
            TableKey::Float(f) => f.to_bits().hash(state),
            TableKey::Text(s) => s.hash(state),
        }
    }
}

impl From<bool> for TableKey {
    fn from(b: bool) -> Self {
        TableKey::Bool(b)
    }
}

impl From<i64> for TableKey {
    fn from(n: i64) -> Self {
        TableKey::Integer(n)
    }
}

impl From<f64> for TableKey {
    fn from(f: f64) -> Self {
        TableKey::Float(f)
    }
}

impl From<&str> for TableKey {
    fn from(s: &str) -> Self {
        TableKey::Text(s.as_bytes().to_vec())
    }
}

impl From<String> for TableKey {
    fn from(s: String) -> Self {
        TableKey::Text(s.into_bytes())
    }
}

/// Value: one tagged instance of the marshaled type system
///
/// The enum discriminant is the kind; a value can never carry a payload that
/// disagrees with its kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    Bool(bool),

    /// Signed 64-bit integer
    Integer(i64),

    /// IEEE 754 double precision
    Float(f64),

    /// Byte string; usually UTF-8, but any bytes are carried unchanged
    Text(Vec<u8>),

    /// Ordered sequence of child values
    Array(Vec<Value>),

    /// Key-ordered mapping from keyable values to child values
    Table(Table),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Array(_) => Kind::Array,
            Value::Table(_) => Kind::Table,
        }
    }

    /// Build a Text value
    pub fn text(s: impl Into<Vec<u8>>) -> Value {
        Value::Text(s.into())
    }

    /// Build a Table value from key/value pairs (later duplicates win)
    pub fn table<K, I>(entries: I) -> Value
    where
        K: Into<TableKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Table(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Independent copy of the whole value graph
    ///
    /// Children are exclusively owned, so the copy shares no substructure
    /// with `self`: mutating one never affects the other.
    pub fn deep_copy(&self) -> Value {
        self.clone()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text contents, if this is Text holding valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        self.as_text_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Raw Text contents, whatever the encoding
    pub fn as_text_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Structural equality that compares floats by bit pattern
    ///
    /// `PartialEq` follows IEEE semantics (NaN != NaN); this is the equality
    /// the wire format preserves.
    pub fn bitwise_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.bitwise_eq(y))
            }
            (Value::Table(a), Value::Table(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.bitwise_eq(vb))
            }
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into_bytes())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl From<TableKey> for Value {
    fn from(k: TableKey) -> Self {
        match k {
            TableKey::Null => Value::Null,
            TableKey::Bool(b) => Value::Bool(b),
            TableKey::Integer(n) => Value::Integer(n),
            TableKey::Float(f) => Value::Float(f),
            TableKey::Text(s) => Value::Text(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::printer::write_value(self, 0, &crate::printer::PrintConfig::default(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_payload() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::Bool(true).kind(), Kind::Bool);
        assert_eq!(Value::Integer(1).kind(), Kind::Integer);
        assert_eq!(Value::Float(1.0).kind(), Kind::Float);
        assert_eq!(Value::text("x").kind(), Kind::Text);
        assert_eq!(Value::Array(vec![]).kind(), Kind::Array);
        assert_eq!(Value::Table(Table::new()).kind(), Kind::Table);
    }

    #[test]
    fn test_tag_roundtrip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(Kind::from_tag(0x07), None);
        assert_eq!(Kind::from_tag(0xFF), None);
    }

    #[test]
    fn test_accessors_only_for_own_kind() {
        let v = Value::Integer(7);
        assert_eq!(v.as_integer(), Some(7));
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_text(), None);
        assert!(v.as_array().is_none());

        let t = Value::text("hi");
        assert_eq!(t.as_text(), Some("hi"));
        assert_eq!(t.as_float(), None);
    }

    #[test]
    fn test_text_carries_raw_bytes() {
        let raw = Value::text(vec![0xFF, 0x00, b'a']);
        assert_eq!(raw.kind(), Kind::Text);
        assert_eq!(raw.as_text(), None);
        assert_eq!(raw.as_text_bytes(), Some(&[0xFF, 0x00, b'a'][..]));
    }

    #[test]
    fn test_table_key_conversion() {
        assert_eq!(
            TableKey::from_value(&Value::text("k")),
            Some(TableKey::Text(b"k".to_vec()))
        );
        assert_eq!(
            TableKey::from_value(&Value::Float(1.5)),
            Some(TableKey::Float(1.5))
        );
        assert_eq!(TableKey::from_value(&Value::Null), Some(TableKey::Null));
        assert_eq!(TableKey::from_value(&Value::Array(vec![])), None);
        assert_eq!(TableKey::Integer(3).to_value(), Value::Integer(3));

        let back = TableKey::try_from_value(Value::Array(vec![Value::Null]));
        assert_eq!(back, Err(Value::Array(vec![Value::Null])));
    }

    #[test]
    fn test_float_keys_use_total_order() {
        let nan = TableKey::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(TableKey::Float(0.0), TableKey::Float(-0.0));
        assert!(TableKey::Float(-1.0) < TableKey::Float(2.5));

        let mut table = Table::new();
        table.insert(TableKey::Float(f64::NAN), Value::Integer(1));
        table.insert(TableKey::Float(f64::NAN), Value::Integer(2));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&TableKey::Float(f64::NAN)), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_keys_order_by_kind_first() {
        let keys = [
            TableKey::from("a"),
            TableKey::Float(0.5),
            TableKey::Integer(9),
            TableKey::Bool(true),
            TableKey::Null,
        ];
        let table: Table = keys.iter().cloned().map(|k| (k, Value::Null)).collect();
        let kinds: Vec<Kind> = table.keys().map(TableKey::kind).collect();
        assert_eq!(
            kinds,
            vec![Kind::Null, Kind::Bool, Kind::Integer, Kind::Float, Kind::Text]
        );
    }

    #[test]
    fn test_deep_copy_independent_scalar() {
        let mut original = Value::Array(vec![Value::Integer(1), Value::text("a")]);
        let copy = original.deep_copy();

        original.as_array_mut().unwrap()[0] = Value::Integer(99);
        assert_eq!(copy.as_array().unwrap()[0], Value::Integer(1));
    }

    #[test]
    fn test_deep_copy_independent_nested_table() {
        let inner = Value::table([("k", Value::Bool(false))]);
        let original = Value::Array(vec![Value::Integer(1), inner]);
        let mut copy = original.deep_copy();

        let table = copy.as_array_mut().unwrap()[1].as_table_mut().unwrap();
        table.insert(TableKey::from("k"), Value::Bool(true));
        table.insert(TableKey::from("extra"), Value::Null);

        let orig_table = original.as_array().unwrap()[1].as_table().unwrap();
        assert_eq!(orig_table.len(), 1);
        assert_eq!(orig_table.get(&TableKey::from("k")), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_bitwise_eq_nan() {
        let a = Value::Array(vec![Value::Float(f64::NAN)]);
        let b = a.deep_copy();
        assert_ne!(a, b);
        assert!(a.bitwise_eq(&b));
        assert!(!Value::Float(0.0).bitwise_eq(&Value::Float(-0.0)));
    }
}
