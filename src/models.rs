use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// Value of an optional field: free text, a list of labels, or a link map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Links(IndexMap<String, String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Links(links) => links.is_empty(),
        }
    }
}

/// Label -> value mapping for one optional group of a film record.
/// Only non-empty values are ever stored; keys keep extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldGroup(IndexMap<String, FieldValue>);

impl FieldGroup {
    /// Store `value` under `key` unless it is empty. Returns whether it was stored.
    pub fn insert_nonempty(&mut self, key: &str, value: FieldValue) -> bool {
        if value.is_empty() {
            return false;
        }
        self.0.insert(key.to_string(), value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One film extracted from its detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    /// Detail page the record was extracted from
    pub imdb_url: String,

    pub name: String,

    pub genres: Vec<String>,

    /// Rating exactly as displayed on the page
    pub rating: String,

    /// Lead performers
    pub stars: Vec<String>,

    #[serde(default, skip_serializing_if = "FieldGroup::is_empty")]
    pub details: FieldGroup,

    #[serde(rename = "box office", default, skip_serializing_if = "FieldGroup::is_empty")]
    pub box_office: FieldGroup,

    #[serde(rename = "technical specs", default, skip_serializing_if = "FieldGroup::is_empty")]
    pub technical_specs: FieldGroup,
}

impl FilmRecord {
    pub fn new(imdb_url: String, name: String, rating: String) -> Self {
        Self {
            imdb_url,
            name,
            genres: Vec::new(),
            rating,
            stars: Vec::new(),
            details: FieldGroup::default(),
            box_office: FieldGroup::default(),
            technical_specs: FieldGroup::default(),
        }
    }
}
