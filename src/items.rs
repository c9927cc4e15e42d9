use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        rename = "abstractNote",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_note: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
impl ItemRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_abstract(mut self, abstract_note: impl Into<String>) -> Self {
        self.abstract_note = Some(abstract_note.into());
        self
    }

    pub fn with_creators(mut self, creators: Vec<String>) -> Self {
        self.creators = creators;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Insertion-ordered mapping from item id to record.
///
/// Re-inserting an existing id replaces the record but keeps the slot it
/// was first inserted at, so iteration order only depends on first sighting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCollection {
    records: Vec<ItemRecord>,
    positions: HashMap<String, usize>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a record keyed by its `id`.
    ///
    /// Returns the record it replaced, if any.
    pub fn insert(&mut self, record: ItemRecord) -> Option<ItemRecord> {
        match self.positions.get(&record.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ItemRecord> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.records.iter()
    }
}

impl FromIterator<ItemRecord> for ItemCollection {
    fn from_iter<T: IntoIterator<Item = ItemRecord>>(iter: T) -> Self {
        let mut collection = ItemCollection::new();
        for record in iter {
            collection.insert(record);
        }
        collection
    }
}

impl IntoIterator for ItemCollection {
    type Item = ItemRecord;
    type IntoIter = std::vec::IntoIter<ItemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for ItemCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.records.iter().map(|r| (&r.id, r)))
    }
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = ItemCollection;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from item id to item record")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut collection = ItemCollection::with_capacity(access.size_hint().unwrap_or(0));

        // map key wins over any id stored inside the record
        while let Some((id, mut record)) = access.next_entry::<String, ItemRecord>()? {
            record.id = id;
            collection.insert(record);
        }

        Ok(collection)
    }
}

impl<'de> Deserialize<'de> for ItemCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CollectionVisitor)
    }
}
