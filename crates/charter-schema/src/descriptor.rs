use crate::types::TypeRef;

/// A single exposed property of a resource type.
///
/// The external name is what queries address; the internal name is the key
/// looked up on stored entities. The two coincide unless remapped.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub external_name: String,
    pub internal_name: String,
    pub ty: TypeRef,
    /// Excluded properties stay invisible to path resolution.
    pub included: bool,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> PropertyDef {
        let name = name.into();
        PropertyDef {
            internal_name: name.clone(),
            external_name: name,
            ty,
            included: true,
        }
    }

    /// Remaps the key used when reading the property off an entity.
    pub fn stored_as(mut self, internal: impl Into<String>) -> PropertyDef {
        self.internal_name = internal.into();
        self
    }

    /// Hides the property from queries without removing it from the schema.
    pub fn excluded(mut self) -> PropertyDef {
        self.included = false;
        self
    }

    pub fn is_collection(&self) -> bool {
        self.ty.is_collection()
    }
}

/// A declared resource type: a named bag of properties, optionally inheriting
/// from a base resource.
#[derive(Debug, Clone)]
pub struct ResourceDef {
    pub name: String,
    pub plural_name: String,
    pub base: Option<String>,
    pub properties: Vec<PropertyDef>,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>) -> ResourceDef {
        let name = name.into();
        ResourceDef {
            plural_name: pluralize(&name),
            name,
            base: None,
            properties: Vec::new(),
        }
    }

    pub fn extends(mut self, base: impl Into<String>) -> ResourceDef {
        self.base = Some(base.into());
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> ResourceDef {
        self.plural_name = plural.into();
        self
    }

    pub fn property(mut self, property: PropertyDef) -> ResourceDef {
        self.properties.push(property);
        self
    }

    /// First included property whose external name matches, ignoring case.
    /// Searches this type's own properties only.
    pub fn own_property(&self, external_name: &str) -> Option<&PropertyDef> {
        self.properties
            .iter()
            .filter(|p| p.included)
            .find(|p| p.external_name.eq_ignore_ascii_case(external_name))
    }
}

/// A declared enum. Ordering comparisons between enum values go by variant
/// position, so declaration order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, variants: Vec<String>) -> EnumDef {
        EnumDef {
            name: name.into(),
            variants,
        }
    }

    /// Position of the named variant, matched case-insensitively.
    pub fn ordinal(&self, variant: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.eq_ignore_ascii_case(variant))
    }
}

/// Derives an English plural for a type name, preserving the name's casing.
/// Used for default collection segments in resource URLs.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if let Some(stem) = irregular_plural(&lower) {
        // Keep the leading character's case from the original name.
        let mut out = String::with_capacity(stem.len());
        let mut chars = stem.chars();
        if let (Some(first), Some(orig)) = (chars.next(), name.chars().next()) {
            if orig.is_uppercase() {
                out.extend(first.to_uppercase());
            } else {
                out.push(first);
            }
            out.push_str(chars.as_str());
        }
        return out;
    }

    if let Some(stem) = name.strip_suffix('y') {
        let penultimate = stem.chars().last();
        let consonant = penultimate.map(|c| !"aeiou".contains(c.to_ascii_lowercase()));
        if consonant == Some(true) {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

fn irregular_plural(lower: &str) -> Option<&'static str> {
    match lower {
        "person" => Some("people"),
        "child" => Some("children"),
        "man" => Some("men"),
        "woman" => Some("women"),
        "foot" => Some("feet"),
        "tooth" => Some("teeth"),
        "mouse" => Some("mice"),
        _ => None,
    }
}
