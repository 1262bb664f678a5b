use std::collections::HashSet;

use serde::Deserialize;

use crate::builder::{SchemaBuilder, SchemaSet};
use crate::descriptor::{EnumDef, PropertyDef, ResourceDef};
use crate::error::SchemaError;
use crate::types::{ScalarKind, TypeRef};

/// Serialized form of a schema, as loaded from a JSON document.
///
/// Property types use a compact notation: scalar names (`string`, `int`,
/// `float`, `decimal`, `bool`, `guid`, `datetime`), declared type names,
/// `[T]` for collections and `{T}` for string-keyed dictionaries.
#[derive(Debug, Deserialize)]
pub struct SchemaDoc {
    #[serde(default)]
    pub resources: Vec<ResourceDoc>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceDoc {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDoc>,
}

#[derive(Debug, Deserialize)]
pub struct PropertyDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Storage key, when it differs from the exposed name.
    #[serde(default)]
    pub internal: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct EnumDoc {
    pub name: String,
    pub variants: Vec<String>,
}

impl SchemaDoc {
    /// Validates the document into a usable schema snapshot.
    pub fn build(self) -> Result<SchemaSet, SchemaError> {
        // Enum names are collected up front so a bare type name in a
        // property can be told apart from a resource reference.
        let enum_names: HashSet<String> = self
            .enums
            .iter()
            .map(|e| e.name.to_ascii_lowercase())
            .collect();

        let mut builder = SchemaBuilder::new();
        for doc in self.enums {
            builder = builder.enum_type(EnumDef::new(doc.name, doc.variants));
        }
        for doc in self.resources {
            let mut def = ResourceDef::new(doc.name);
            if let Some(base) = doc.base {
                def = def.extends(base);
            }
            if let Some(plural) = doc.plural {
                def = def.plural(plural);
            }
            for prop in doc.properties {
                let ty = parse_type_text(&prop.ty, &enum_names)?;
                let mut property = PropertyDef::new(prop.name, ty);
                if let Some(internal) = prop.internal {
                    property = property.stored_as(internal);
                }
                if prop.hidden {
                    property = property.excluded();
                }
                def = def.property(property);
            }
            builder = builder.resource(def);
        }
        builder.build()
    }
}

fn parse_type_text(text: &str, enum_names: &HashSet<String>) -> Result<TypeRef, SchemaError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::InvalidTypeText {
            text: text.to_string(),
        });
    }
    if let Some(inner) = trimmed.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| SchemaError::InvalidTypeText {
                text: text.to_string(),
            })?;
        return Ok(TypeRef::Collection(Box::new(parse_type_text(
            inner, enum_names,
        )?)));
    }
    if let Some(inner) = trimmed.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| SchemaError::InvalidTypeText {
                text: text.to_string(),
            })?;
        return Ok(TypeRef::Dictionary(Box::new(parse_type_text(
            inner, enum_names,
        )?)));
    }
    if let Some(scalar) = ScalarKind::parse(trimmed) {
        return Ok(TypeRef::Scalar(scalar));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SchemaError::InvalidTypeText {
            text: text.to_string(),
        });
    }
    if enum_names.contains(&trimmed.to_ascii_lowercase()) {
        Ok(TypeRef::Enum(trimmed.to_string()))
    } else {
        Ok(TypeRef::Resource(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KENNEL: &str = r#"
    {
        "enums": [
            { "name": "Temperament", "variants": ["Calm", "Playful", "Wild"] }
        ],
        "resources": [
            {
                "name": "Person",
                "properties": [
                    { "name": "Name", "type": "string" },
                    { "name": "Pets", "type": "[Dog]", "internal": "pets" }
                ]
            },
            {
                "name": "Dog",
                "properties": [
                    { "name": "Name", "type": "string" },
                    { "name": "Age", "type": "int" },
                    { "name": "Mood", "type": "Temperament" },
                    { "name": "Tags", "type": "{string}" },
                    { "name": "AuditTrail", "type": "string", "hidden": true }
                ]
            }
        ]
    }
    "#;

    #[test]
    fn test_document_builds_schema() {
        let doc: SchemaDoc = serde_json::from_str(KENNEL).unwrap();
        let schema = doc.build();
        assert!(schema.is_ok(), "Failed to build: {:?}", schema.err());
        let schema = schema.unwrap();

        let dog = schema.resource("Dog").unwrap();
        let mood = dog.own_property("Mood").unwrap();
        assert_eq!(mood.ty, TypeRef::Enum("Temperament".to_string()));

        let tags = dog.own_property("Tags").unwrap();
        assert!(matches!(tags.ty, TypeRef::Dictionary(_)));

        // Hidden properties never resolve.
        assert!(dog.own_property("AuditTrail").is_none());

        let person = schema.resource("Person").unwrap();
        let pets = person.own_property("Pets").unwrap();
        assert_eq!(pets.internal_name, "pets");
        assert!(pets.ty.is_collection());
    }

    #[test]
    fn test_default_plural_comes_from_name() {
        let doc: SchemaDoc = serde_json::from_str(KENNEL).unwrap();
        let schema = doc.build().unwrap();
        assert_eq!(schema.resource("Person").unwrap().plural_name, "People");
        assert_eq!(schema.resource("Dog").unwrap().plural_name, "Dogs");
    }

    #[test]
    fn test_malformed_type_text_rejected() {
        let enum_names = HashSet::new();
        assert!(matches!(
            parse_type_text("[Dog", &enum_names),
            Err(SchemaError::InvalidTypeText { .. })
        ));
        assert!(matches!(
            parse_type_text("", &enum_names),
            Err(SchemaError::InvalidTypeText { .. })
        ));
        assert!(matches!(
            parse_type_text("Dog!", &enum_names),
            Err(SchemaError::InvalidTypeText { .. })
        ));
    }
}
