//! Attribute bags: schema-free named values attached to a feature.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FeatureConfig;
use crate::error::{FeatureError, Result};
use crate::store::{IgnoreCase, KeyComparer, Keys, NamedValueStore, Values};

/// Dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    List(Vec<AttributeValue>),
}

/// Runtime type of an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Generic type reported for a null value.
    Object,
    Bool,
    Integer,
    Float,
    Text,
    DateTime,
    List,
}

impl AttributeValue {
    pub fn value_type(&self) -> AttributeType {
        match self {
            AttributeValue::Null => AttributeType::Object,
            AttributeValue::Bool(_) => AttributeType::Bool,
            AttributeValue::Integer(_) => AttributeType::Integer,
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Text(_) => AttributeType::Text,
            AttributeValue::DateTime(_) => AttributeType::DateTime,
            AttributeValue::List(_) => AttributeType::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::DateTime(d) => f.write_str(&d.to_rfc3339()),
            AttributeValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::DateTime(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        AttributeValue::List(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

/// How attribute names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameMatching {
    #[default]
    Exact,
    IgnoreCase,
}

impl NameMatching {
    fn comparer(self) -> Option<Arc<dyn KeyComparer<String>>> {
        match self {
            NameMatching::Exact => None,
            NameMatching::IgnoreCase => Some(Arc::new(IgnoreCase)),
        }
    }
}

/// All attributes associated with a single feature.
///
/// Unlike the underlying store, a bag reports missing names as attribute
/// errors and decides through the silent-upsert policy whether an indexed
/// write may create a new attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AttributeBagRecord")]
pub struct AttributeBag {
    attributes: NamedValueStore<String, AttributeValue>,
    #[serde(default)]
    name_matching: NameMatching,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    silent_upsert: Option<bool>,
}

#[derive(Deserialize)]
struct AttributeBagRecord {
    attributes: NamedValueStore<String, AttributeValue>,
    #[serde(default)]
    name_matching: NameMatching,
    #[serde(default)]
    silent_upsert: Option<bool>,
}

impl TryFrom<AttributeBagRecord> for AttributeBag {
    type Error = FeatureError;

    fn try_from(record: AttributeBagRecord) -> Result<Self> {
        let read_only = record.attributes.is_read_only();
        let pairs = record
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>();
        let attributes =
            NamedValueStore::from_parts(pairs, read_only, record.name_matching.comparer())?;
        Ok(Self {
            attributes,
            name_matching: record.name_matching,
            silent_upsert: record.silent_upsert,
        })
    }
}

impl Default for AttributeBag {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeBag {
    /// Creates an empty bag with exact name matching.
    pub fn new() -> Self {
        Self::with_name_matching(NameMatching::Exact)
    }

    /// Creates an empty bag using the given name matching.
    pub fn with_name_matching(name_matching: NameMatching) -> Self {
        Self {
            attributes: match name_matching {
                NameMatching::Exact => NamedValueStore::new(),
                NameMatching::IgnoreCase => NamedValueStore::with_comparer(IgnoreCase),
            },
            name_matching,
            silent_upsert: None,
        }
    }

    /// Creates a bag from name/value pairs; a repeated name fails.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let mut bag = Self::new();
        for (name, value) in pairs {
            bag.add(name, value)?;
        }
        Ok(bag)
    }

    /// Creates a bag that rejects every mutation.
    pub fn read_only<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let pairs = pairs.into_iter().map(|(n, v)| (n.into(), v.into()));
        Ok(Self {
            attributes: NamedValueStore::read_only(pairs)?,
            name_matching: NameMatching::Exact,
            silent_upsert: None,
        })
    }

    /// Overrides the process-wide silent-upsert default for this bag.
    pub fn with_silent_upsert(mut self, on: bool) -> Self {
        self.silent_upsert = Some(on);
        self
    }

    pub fn silent_upsert(&self) -> Option<bool> {
        self.silent_upsert
    }

    pub fn name_matching(&self) -> NameMatching {
        self.name_matching
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes.is_read_only()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn names(&self) -> Keys<'_, String, AttributeValue> {
        self.attributes.keys()
    }

    pub fn values(&self) -> Values<'_, String, AttributeValue> {
        self.attributes.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> + '_ {
        self.attributes.iter()
    }

    /// The backing store.
    pub fn store(&self) -> &NamedValueStore<String, AttributeValue> {
        &self.attributes
    }

    pub fn exists(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_string())
    }

    /// Indexed read; fails when the attribute does not exist.
    pub fn get(&self, name: &str) -> Result<&AttributeValue> {
        self.get_optional(name)
            .ok_or_else(|| FeatureError::AttributeNotFound {
                name: name.to_string(),
            })
    }

    /// Value of the attribute, `None` when it does not exist.
    pub fn get_optional(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.try_get(&name.to_string())
    }

    /// Indexed write under the bag's silent-upsert policy, falling back to
    /// the process-wide configuration.
    pub fn set<N, V>(&mut self, name: N, value: V) -> Result<()>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let upsert = self
            .silent_upsert
            .unwrap_or_else(|| FeatureConfig::global().add_attribute_with_indexer);
        self.write(name.into(), value.into(), upsert)
    }

    /// Indexed write using the policy of `config`.
    pub fn set_with<N, V>(&mut self, name: N, value: V, config: &FeatureConfig) -> Result<()>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        self.write(name.into(), value.into(), config.add_attribute_with_indexer)
    }

    fn write(&mut self, name: String, value: AttributeValue, upsert: bool) -> Result<()> {
        if self.is_read_only() {
            return Err(FeatureError::ReadOnly);
        }
        if !upsert && !self.attributes.contains_key(&name) {
            return Err(FeatureError::AttributeNotFound { name });
        }
        self.attributes.set(name, value)
    }

    /// Adds a new attribute; fails when the name already exists.
    pub fn add<N, V>(&mut self, name: N, value: V) -> Result<()>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        if self.is_read_only() {
            return Err(FeatureError::ReadOnly);
        }
        let name = name.into();
        if self.attributes.contains_key(&name) {
            return Err(FeatureError::AttributeExists { name });
        }
        self.attributes.add(name, value.into())
    }

    /// Deletes an attribute; fails when the name does not exist.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if !self.attributes.remove(&name.to_string())? {
            return Err(FeatureError::AttributeNotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Runtime type of the attribute's value, `Object` for null values.
    pub fn value_type(&self, name: &str) -> Result<AttributeType> {
        self.get_optional(name)
            .map(AttributeValue::value_type)
            .ok_or_else(|| FeatureError::AttributeOutOfRange {
                name: name.to_string(),
            })
    }

    /// Copies the attributes of `other` into this bag.
    ///
    /// With `prefer_this` a name already present here keeps its value;
    /// otherwise the value from `other` overwrites it. Names only present in
    /// this bag are left untouched.
    pub fn merge_with(&mut self, other: &AttributeBag, prefer_this: bool) -> Result<()> {
        if self.is_read_only() {
            return Err(FeatureError::ReadOnly);
        }
        for (name, value) in other.iter() {
            if !(prefer_this && self.attributes.contains_key(name)) {
                self.attributes.set(name.clone(), value.clone())?;
            }
        }
        Ok(())
    }

    /// New writable bag with this bag's attributes followed by the attributes
    /// of `other` whose names are not present here. Names are matched exactly.
    pub fn merged(&self, other: &AttributeBag) -> Result<AttributeBag> {
        let mut merged = AttributeBag::new();
        for (name, value) in self.iter().chain(other.iter()) {
            if !merged.attributes.contains_key(name) {
                merged.attributes.add(name.clone(), value.clone())?;
            }
        }
        Ok(merged)
    }
}

impl<'a> IntoIterator for &'a AttributeBag {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = <&'a NamedValueStore<String, AttributeValue> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        (&self.attributes).into_iter()
    }
}
