use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::ops::{Index, IndexMut};

/// Arena of proof nodes. Items are never removed, so an `Id` stays valid
/// for the lifetime of the block it was issued by.
#[derive(Clone, Debug, PartialEq)]
pub struct Block<T> {
    items: Vec<T>,
}

impl<T> Block<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) -> Id<T> {
        let id = Id::new(self.items.len() as u32);
        self.items.push(item);
        id
    }

    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.as_usize())
    }

    pub fn contains(&self, id: Id<T>) -> bool {
        id.as_usize() < self.items.len()
    }

    /// The id at `index`, if it fits in an `Id` and names an item.
    pub fn id(&self, index: usize) -> Option<Id<T>> {
        let id = Id::new(u32::try_from(index).ok()?);
        if self.contains(id) {
            Some(id)
        } else {
            None
        }
    }

    pub fn last_id(&self) -> Option<Id<T>> {
        self.items.len().checked_sub(1).map(|id| Id::new(id as u32))
    }

    pub fn ids(&self) -> impl Iterator<Item = Id<T>> {
        (0..self.items.len() as u32).map(Id::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        let items = vec![];
        Self { items }
    }
}

impl<T> Index<Id<T>> for Block<T> {
    type Output = T;

    fn index(&self, id: Id<T>) -> &Self::Output {
        &self.items[id.as_usize()]
    }
}

impl<T> IndexMut<Id<T>> for Block<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut Self::Output {
        &mut self.items[id.as_usize()]
    }
}

impl<T: Serialize> Serialize for Block<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Block<T> {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let items = Vec::deserialize(deserializer)?;
        Ok(Self { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lookup() {
        let mut block = Block::default();
        block.push('a');
        block.push('b');
        assert_eq!(block.id(1), Some(Id::new(1)));
        assert_eq!(block.id(2), None);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(block.id(1 << 32), None);
    }
}
