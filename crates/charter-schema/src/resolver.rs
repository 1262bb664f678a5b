use crate::builder::SchemaSet;
use crate::descriptor::ResourceDef;
use crate::error::SchemaError;
use crate::types::TypeRef;

/// One hop of a resolved property path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub internal_name: String,
    pub ty: TypeRef,
}

/// A dotted external path mapped onto internal property names, one segment
/// per hop. Always holds at least one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub segments: Vec<PathSegment>,
}

impl ResolvedPath {
    /// Type of the final segment, which is the type the whole path reads as.
    pub fn terminal_type(&self) -> Option<&TypeRef> {
        self.segments.last().map(|s| &s.ty)
    }

    /// The internal names joined with dots, as read off stored entities.
    pub fn internal_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.internal_name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Maps an external dotted path rooted at `root` onto internal names.
///
/// Matching is case-insensitive and searches each owner's type family in
/// order: own properties, inherited ones, then subtypes. Navigation continues
/// through resource-typed segments; a collection segment continues at its
/// element type, so paths like `Pets.Name` resolve even though the middle hop
/// is a collection.
pub fn resolve_path(
    schema: &SchemaSet,
    root: &ResourceDef,
    external_path: &str,
) -> Result<ResolvedPath, SchemaError> {
    let mut segments = Vec::new();
    let mut owner = root;
    let mut remaining = external_path;

    loop {
        let (head, rest) = split_leftmost(remaining);
        let property =
            schema
                .find_property(owner, head)
                .ok_or_else(|| SchemaError::UnknownProperty {
                    type_name: owner.name.clone(),
                    segment: head.to_string(),
                    full_path: external_path.to_string(),
                })?;
        segments.push(PathSegment {
            internal_name: property.internal_name.clone(),
            ty: property.ty.clone(),
        });

        let rest = match rest {
            Some(rest) => rest,
            None => return Ok(ResolvedPath { segments }),
        };

        // A collection hop continues at its element type.
        let continuing = match &property.ty {
            TypeRef::Collection(element) => element.as_ref(),
            other => other,
        };
        match continuing {
            TypeRef::Resource(name) => {
                owner = schema.resource(name)?;
                remaining = rest;
            }
            _ => {
                return Err(SchemaError::InvalidPath {
                    type_name: owner.name.clone(),
                    segment: head.to_string(),
                    full_path: external_path.to_string(),
                })
            }
        }
    }
}

fn split_leftmost(path: &str) -> (&str, Option<&str>) {
    match path.find('.') {
        Some(index) => (&path[..index], Some(&path[index + 1..])),
        None => (path, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PropertyDef;
    use crate::types::ScalarKind;

    fn kennel_schema() -> SchemaSet {
        let schema = SchemaSet::builder()
            .resource(
                ResourceDef::new("Person")
                    .property(PropertyDef::new("Name", TypeRef::Scalar(ScalarKind::String)))
                    .property(
                        PropertyDef::new(
                            "Pets",
                            TypeRef::collection_of(TypeRef::Resource("Dog".to_string())),
                        )
                        .stored_as("pets"),
                    ),
            )
            .resource(
                ResourceDef::new("Dog")
                    .property(
                        PropertyDef::new("Name", TypeRef::Scalar(ScalarKind::String))
                            .stored_as("name"),
                    )
                    .property(
                        PropertyDef::new("Age", TypeRef::Scalar(ScalarKind::Int)).stored_as("age"),
                    )
                    .property(PropertyDef::new("Owner", TypeRef::Resource("Person".to_string()))),
            )
            .build();
        assert!(schema.is_ok(), "Failed to build schema: {:?}", schema.err());
        schema.unwrap()
    }

    // === Resolution ===

    #[test]
    fn test_single_segment_maps_to_internal_name() {
        let schema = kennel_schema();
        let dog = schema.resource("Dog").unwrap();
        let resolved = resolve_path(&schema, dog, "Name");
        assert!(resolved.is_ok(), "Failed to resolve: {:?}", resolved.err());
        let resolved = resolved.unwrap();
        assert_eq!(resolved.internal_path(), "name");
        assert_eq!(
            resolved.terminal_type(),
            Some(&TypeRef::Scalar(ScalarKind::String))
        );
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        let schema = kennel_schema();
        let dog = schema.resource("Dog").unwrap();
        let resolved = resolve_path(&schema, dog, "nAmE").unwrap();
        assert_eq!(resolved.internal_path(), "name");
    }

    #[test]
    fn test_dotted_path_navigates_resources() {
        let schema = kennel_schema();
        let dog = schema.resource("Dog").unwrap();
        let resolved = resolve_path(&schema, dog, "Owner.Name").unwrap();
        assert_eq!(resolved.internal_path(), "Owner.Name");
        assert_eq!(resolved.segments.len(), 2);
    }

    #[test]
    fn test_collection_hop_continues_at_element_type() {
        let schema = kennel_schema();
        let person = schema.resource("Person").unwrap();
        let resolved = resolve_path(&schema, person, "Pets.Age").unwrap();
        assert_eq!(resolved.internal_path(), "pets.age");
        assert!(resolved.segments[0].ty.is_collection());
    }

    // === Errors ===

    #[test]
    fn test_unknown_property_names_owner_and_full_path() {
        let schema = kennel_schema();
        let dog = schema.resource("Dog").unwrap();
        let result = resolve_path(&schema, dog, "Owner.Foo");
        match result {
            Err(SchemaError::UnknownProperty {
                type_name,
                segment,
                full_path,
            }) => {
                assert_eq!(type_name, "Person");
                assert_eq!(segment, "Foo");
                assert_eq!(full_path, "Owner.Foo");
            }
            other => panic!("Expected UnknownProperty, got {other:?}"),
        }
    }

    #[test]
    fn test_path_through_scalar_is_invalid() {
        let schema = kennel_schema();
        let dog = schema.resource("Dog").unwrap();
        let result = resolve_path(&schema, dog, "Name.Length");
        assert!(matches!(result, Err(SchemaError::InvalidPath { .. })));
    }
}
