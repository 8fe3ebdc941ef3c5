use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::aom::Aom;
use crate::error::AomResult;
use crate::kind::Kind;
use crate::node::NodeId;
use crate::serialise::factories;

/// Deserialization factory for one kind
///
/// Reads the kind-specific fields out of a serialized object. The second
/// element of the result is any children the factory deserialized itself
/// (a Fraction's numerator and denominator); they are attached before the
/// generic `children` array.
pub type DeserialiseFn = fn(&mut Aom, &Map<String, Value>) -> AomResult<(Kind, Vec<NodeId>)>;

/// Kind-name → constructor mapping used by deserialization
///
/// Populated by explicit registration, once per kind; nothing registers
/// itself as a load-time side effect.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    factories: HashMap<String, DeserialiseFn>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.register("node", factories::node);
        registry.register("article", factories::article);
        registry.register("document", factories::document);
        registry.register("section", factories::section);
        registry.register("subsection", factories::subsection);
        registry.register("paragraph", factories::paragraph);
        registry.register("text", factories::text);
        registry.register("inlinemaths", factories::inline_maths);
        registry.register("variable", factories::variable);
        registry.register("number", factories::number);
        registry.register("power", factories::power);
        registry.register("vector", factories::vector);
        registry.register("fraction", factories::fraction);
        registry.register("brackets", factories::brackets);
        registry.register("equals", factories::equals);
        registry.register("approx", factories::approx);
        registry.register("plus", factories::plus);
        registry.register("textnormal", factories::text_normal);
        registry.register("pagenumbering", factories::page_numbering);
        registry.register("maketitle", factories::make_title);
        registry.register("newpage", factories::new_page);
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, factory: DeserialiseFn) {
        self.factories.insert(kind.into(), factory);
    }

    pub fn get(&self, kind: &str) -> Option<DeserialiseFn> {
        self.factories.get(kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds_registered() {
        let registry = TypeRegistry::with_builtin_kinds();
        for kind in [
            "node",
            "article",
            "document",
            "section",
            "subsection",
            "paragraph",
            "text",
            "inlinemaths",
            "variable",
            "number",
            "power",
            "vector",
            "fraction",
            "brackets",
            "equals",
            "approx",
            "plus",
            "textnormal",
            "pagenumbering",
            "maketitle",
            "newpage",
        ] {
            assert!(registry.get(kind).is_some(), "missing factory for {kind}");
        }
    }

    #[test]
    fn test_unknown_kind_is_absent() {
        let registry = TypeRegistry::with_builtin_kinds();
        assert!(registry.get("hologram").is_none());
    }
}
