use std::collections::BTreeMap;

use crate::descriptor::{EnumDef, PropertyDef, ResourceDef};
use crate::error::SchemaError;
use crate::types::TypeRef;

/// Collects resource and enum declarations, then validates them into an
/// immutable [`SchemaSet`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    resources: Vec<ResourceDef>,
    enums: Vec<EnumDef>,
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn resource(mut self, def: ResourceDef) -> SchemaBuilder {
        self.resources.push(def);
        self
    }

    pub fn enum_type(mut self, def: EnumDef) -> SchemaBuilder {
        self.enums.push(def);
        self
    }

    pub fn build(self) -> Result<SchemaSet, SchemaError> {
        let mut resources = BTreeMap::new();
        let mut enums = BTreeMap::new();

        for def in self.enums {
            let key = def.name.to_ascii_lowercase();
            if enums.insert(key, def.clone()).is_some() {
                return Err(SchemaError::DuplicateType { name: def.name });
            }
        }
        for def in self.resources {
            let key = def.name.to_ascii_lowercase();
            if enums.contains_key(&key) {
                return Err(SchemaError::DuplicateType { name: def.name });
            }
            if resources.insert(key, def.clone()).is_some() {
                return Err(SchemaError::DuplicateType { name: def.name });
            }
        }

        let schema = SchemaSet {
            resources,
            enums,
            descendants: BTreeMap::new(),
        };
        schema.validate()?.compute_descendants()
    }
}

/// A validated, immutable snapshot of every resource and enum declaration.
/// All lookups are case-insensitive; iteration order is name order.
#[derive(Debug)]
pub struct SchemaSet {
    resources: BTreeMap<String, ResourceDef>,
    enums: BTreeMap<String, EnumDef>,
    /// Strict descendants per resource, name-sorted. Precomputed so that
    /// property search over a type family needs no chain walking.
    descendants: BTreeMap<String, Vec<String>>,
}

impl SchemaSet {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceDef, SchemaError> {
        self.resources
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| SchemaError::UnknownType {
                name: name.to_string(),
            })
    }

    pub fn enum_def(&self, name: &str) -> Result<&EnumDef, SchemaError> {
        self.enums
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| SchemaError::UnknownEnum {
                name: name.to_string(),
            })
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDef> {
        self.resources.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    /// The strict descendants of a resource, in name order. A collection
    /// declared over a base type may hold any of these at runtime, so their
    /// properties take part in path resolution against the base.
    pub fn merged_types(&self, def: &ResourceDef) -> Vec<&ResourceDef> {
        self.descendants
            .get(&def.name.to_ascii_lowercase())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| self.resources.get(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Case-insensitive property search across the owner's whole type
    /// family: its own included properties first, then inherited ones
    /// nearest base first, then each descendant's in name order. The first
    /// match wins, which keeps resolution deterministic when names collide
    /// across the chain.
    pub fn find_property<'a>(
        &'a self,
        owner: &'a ResourceDef,
        external_name: &str,
    ) -> Option<&'a PropertyDef> {
        if let Some(found) = owner.own_property(external_name) {
            return Some(found);
        }
        let mut current = owner;
        while let Some(base) = &current.base {
            current = match self.resources.get(&base.to_ascii_lowercase()) {
                Some(next) => next,
                // validate() has already rejected dangling bases.
                None => break,
            };
            if let Some(found) = current.own_property(external_name) {
                return Some(found);
            }
        }
        for merged in self.merged_types(owner) {
            if let Some(found) = merged.own_property(external_name) {
                return Some(found);
            }
        }
        None
    }

    /// Whether an entity whose discriminator names `candidate` can be viewed
    /// as `target`. True when candidate is target or inherits from it.
    /// Unknown candidate names are simply not assignable.
    pub fn is_assignable(&self, target: &ResourceDef, candidate: &str) -> bool {
        let mut current = match self.resources.get(&candidate.to_ascii_lowercase()) {
            Some(def) => def,
            None => return false,
        };
        loop {
            if current.name.eq_ignore_ascii_case(&target.name) {
                return true;
            }
            match &current.base {
                Some(base) => match self.resources.get(&base.to_ascii_lowercase()) {
                    Some(def) => current = def,
                    None => return false,
                },
                None => return false,
            }
        }
    }

    fn validate(self) -> Result<SchemaSet, SchemaError> {
        for def in self.resources.values() {
            // Base links must resolve, and chains must terminate.
            if let Some(base) = &def.base {
                if !self.resources.contains_key(&base.to_ascii_lowercase()) {
                    return Err(SchemaError::UnknownBase {
                        type_name: def.name.clone(),
                        base: base.clone(),
                    });
                }
                let mut steps = 0usize;
                let mut current = def;
                while let Some(base) = &current.base {
                    steps += 1;
                    if steps > self.resources.len() {
                        return Err(SchemaError::CyclicBase {
                            type_name: def.name.clone(),
                        });
                    }
                    current = match self.resources.get(&base.to_ascii_lowercase()) {
                        Some(next) => next,
                        None => {
                            return Err(SchemaError::UnknownBase {
                                type_name: current.name.clone(),
                                base: base.clone(),
                            })
                        }
                    };
                }
            }

            for (index, property) in def.properties.iter().enumerate() {
                let clash = def.properties[..index]
                    .iter()
                    .any(|p| p.external_name.eq_ignore_ascii_case(&property.external_name));
                if clash {
                    return Err(SchemaError::DuplicateProperty {
                        type_name: def.name.clone(),
                        property: property.external_name.clone(),
                    });
                }
                self.check_type(&property.ty)?;
            }
        }
        Ok(self)
    }

    fn check_type(&self, ty: &TypeRef) -> Result<(), SchemaError> {
        match ty {
            TypeRef::Scalar(_) => Ok(()),
            TypeRef::Enum(name) => {
                self.enum_def(name)?;
                Ok(())
            }
            TypeRef::Resource(name) => {
                self.resource(name)?;
                Ok(())
            }
            TypeRef::Collection(element) | TypeRef::Dictionary(element) => {
                self.check_type(element)
            }
        }
    }

    fn compute_descendants(mut self) -> Result<SchemaSet, SchemaError> {
        let mut descendants: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for def in self.resources.values() {
            let own_key = def.name.to_ascii_lowercase();
            let mut current = def;
            while let Some(base) = &current.base {
                let base_key = base.to_ascii_lowercase();
                descendants
                    .entry(base_key.clone())
                    .or_default()
                    .push(own_key.clone());
                current = match self.resources.get(&base_key) {
                    Some(next) => next,
                    // validate() has already rejected dangling bases.
                    None => break,
                };
            }
        }
        for names in descendants.values_mut() {
            names.sort();
            names.dedup();
        }
        self.descendants = descendants;
        Ok(self)
    }
}
