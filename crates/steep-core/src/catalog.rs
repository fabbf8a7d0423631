use crate::code::{AssetCode, CodePattern};
use crate::id::CollectibleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a catalog entry is placed as a block or carried as an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemClass {
    Block,
    #[default]
    Item,
}

/// Properties of something that can be held in a liquid container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidProps {
    /// Raw stack units per litre. Non-positive values make the liquid
    /// unusable as an ingredient.
    pub items_per_litre: f32,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleDef {
    pub code: AssetCode,
    pub class: ItemClass,
    pub liquid: Option<LiquidProps>,
    /// Natural freshness window in hours before the entry starts to perish.
    pub perish_hours: Option<f32>,
}

impl CollectibleDef {
    pub fn is_liquid(&self) -> bool {
        self.liquid.is_some()
    }

    pub fn items_per_litre(&self) -> Option<f32> {
        self.liquid.map(|l| l.items_per_litre)
    }
}

/// Builder for the immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<CollectibleDef>,
    code_to_id: HashMap<AssetCode, CollectibleId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry. Duplicate codes are rejected.
    pub fn register(&mut self, def: CollectibleDef) -> Result<CollectibleId, CatalogError> {
        if def.code.is_pattern() {
            return Err(CatalogError::PatternCode(def.code));
        }
        if self.code_to_id.contains_key(&def.code) {
            return Err(CatalogError::Duplicate(def.code));
        }
        let id = CollectibleId(self.entries.len() as u32);
        self.code_to_id.insert(def.code.clone(), id);
        self.entries.push(def);
        Ok(id)
    }

    /// Register a solid item.
    pub fn register_item(&mut self, code: AssetCode) -> Result<CollectibleId, CatalogError> {
        self.register(CollectibleDef {
            code,
            class: ItemClass::Item,
            liquid: None,
            perish_hours: None,
        })
    }

    /// Register a block.
    pub fn register_block(&mut self, code: AssetCode) -> Result<CollectibleId, CatalogError> {
        self.register(CollectibleDef {
            code,
            class: ItemClass::Block,
            liquid: None,
            perish_hours: None,
        })
    }

    /// Register a liquid item with its units-per-litre factor.
    pub fn register_liquid(
        &mut self,
        code: AssetCode,
        items_per_litre: f32,
        perish_hours: Option<f32>,
    ) -> Result<CollectibleId, CatalogError> {
        self.register(CollectibleDef {
            code,
            class: ItemClass::Item,
            liquid: Some(LiquidProps { items_per_litre }),
            perish_hours,
        })
    }

    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries,
            code_to_id: self.code_to_id,
        }
    }
}

/// Immutable catalog of everything a station can hold. Shared by reference
/// across every station and the recipe loader.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CollectibleDef>,
    code_to_id: HashMap<AssetCode, CollectibleId>,
}

impl Catalog {
    pub fn get(&self, id: CollectibleId) -> Option<&CollectibleDef> {
        self.entries.get(id.0 as usize)
    }

    pub fn id(&self, code: &AssetCode) -> Option<CollectibleId> {
        self.code_to_id.get(code).copied()
    }

    pub fn by_code(&self, code: &AssetCode) -> Option<(CollectibleId, &CollectibleDef)> {
        let id = self.id(code)?;
        self.get(id).map(|def| (id, def))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of one class, in registration order.
    pub fn iter_class(
        &self,
        class: ItemClass,
    ) -> impl Iterator<Item = (CollectibleId, &CollectibleDef)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, def)| def.class == class)
            .map(|(i, def)| (CollectibleId(i as u32), def))
    }

    /// First entry of `class` matching `pattern`, in registration order.
    pub fn first_match(
        &self,
        pattern: &CodePattern,
        class: ItemClass,
    ) -> Option<CollectibleId> {
        if !pattern.is_wildcard() {
            return self
                .by_code(pattern.code())
                .filter(|(_, def)| def.class == class)
                .map(|(id, _)| id);
        }
        self.iter_class(class)
            .find(|(_, def)| pattern.matches(&def.code))
            .map(|(id, _)| id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate catalog code: {0}")]
    Duplicate(AssetCode),
    #[error("catalog code may not contain a wildcard: {0}")]
    PatternCode(AssetCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> AssetCode {
        AssetCode::parse(s).unwrap()
    }

    fn setup() -> Catalog {
        let mut b = CatalogBuilder::new();
        b.register_block(code("flower-lily")).unwrap();
        b.register_block(code("flower-rose")).unwrap();
        b.register_liquid(code("waterportion"), 100.0, None).unwrap();
        b.register_item(code("flower-dried")).unwrap();
        b.build()
    }

    #[test]
    fn register_and_lookup() {
        let cat = setup();
        assert_eq!(cat.len(), 4);
        let (id, def) = cat.by_code(&code("waterportion")).unwrap();
        assert_eq!(id, CollectibleId(2));
        assert!(def.is_liquid());
        assert_eq!(def.items_per_litre(), Some(100.0));
        assert!(cat.id(&code("nonexistent")).is_none());
    }

    #[test]
    fn duplicate_code_rejected() {
        let mut b = CatalogBuilder::new();
        b.register_item(code("a")).unwrap();
        let err = b.register_item(code("game:a")).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
    }

    #[test]
    fn pattern_code_rejected() {
        let mut b = CatalogBuilder::new();
        assert!(matches!(
            b.register_item(code("a-*")),
            Err(CatalogError::PatternCode(_))
        ));
    }

    #[test]
    fn iter_class_filters() {
        let cat = setup();
        let blocks: Vec<_> = cat
            .iter_class(ItemClass::Block)
            .map(|(_, d)| d.code.path().to_string())
            .collect();
        assert_eq!(blocks, vec!["flower-lily", "flower-rose"]);
    }

    #[test]
    fn first_match_respects_class() {
        let cat = setup();
        let p = code("flower-*").to_pattern();
        assert_eq!(cat.first_match(&p, ItemClass::Block), Some(CollectibleId(0)));
        assert_eq!(cat.first_match(&p, ItemClass::Item), Some(CollectibleId(3)));
        let literal = code("flower-rose").to_pattern();
        assert_eq!(cat.first_match(&literal, ItemClass::Block), Some(CollectibleId(1)));
        assert_eq!(cat.first_match(&literal, ItemClass::Item), None);
    }

    #[test]
    fn empty_catalog() {
        let cat = CatalogBuilder::new().build();
        assert!(cat.is_empty());
        assert!(cat.get(CollectibleId(0)).is_none());
    }
}
