//! Serialization to and from the plain nested-object interchange form
//!
//! The shape is `{kind, id, children: [...], ...kind-specific fields}`; the
//! field names are part of the compatibility contract consumed by the
//! storage collaborator. A Fraction serializes its numerator and
//! denominator subtrees under their own keys instead of `children`.

use serde_json::{json, Map, Value};

use crate::aom::Aom;
use crate::error::{AomError, AomResult};
use crate::kind::Kind;
use crate::node::NodeId;

impl Aom {
    /// Serialize the subtree rooted at `id`
    pub fn serialise(&self, id: &str) -> AomResult<Value> {
        let node = self.node(id)?;
        let mut obj = Map::new();
        obj.insert("kind".to_string(), json!(node.kind.name()));
        obj.insert("id".to_string(), json!(node.id));

        match &node.kind {
            Kind::Fraction => {
                let mut branches = node.children.iter();
                if let Some(numerator) = branches.next() {
                    obj.insert("numerator".to_string(), self.serialise(numerator)?);
                }
                if let Some(denominator) = branches.next() {
                    obj.insert("denominator".to_string(), self.serialise(denominator)?);
                }
            }
            _ => {
                let children = node
                    .children
                    .iter()
                    .map(|child| self.serialise(child))
                    .collect::<AomResult<Vec<Value>>>()?;
                obj.insert("children".to_string(), Value::Array(children));
            }
        }

        match &node.kind {
            Kind::Article(meta) => {
                if let Some(title) = &meta.title {
                    obj.insert("title".to_string(), json!(title));
                }
                if let Some(author) = &meta.author {
                    obj.insert("author".to_string(), json!(author));
                }
                if let Some(date) = &meta.date {
                    obj.insert("date".to_string(), json!(date));
                }
                let packages = serde_json::to_value(&meta.packages)
                    .map_err(|e| AomError::invalid_form(e.to_string()))?;
                obj.insert("packages".to_string(), packages);
                obj.insert("readonly".to_string(), json!(meta.readonly));
                obj.insert("spellcheck".to_string(), json!(meta.spellcheck));
            }
            Kind::Section { title } | Kind::SubSection { title } => {
                obj.insert("title".to_string(), json!(title));
            }
            Kind::Text { text } | Kind::TextNormal { text } | Kind::Vector { text } => {
                obj.insert("text".to_string(), json!(text));
            }
            Kind::Variable { glyph } => {
                obj.insert("variable".to_string(), json!(glyph.to_string()));
            }
            Kind::Number { value } => {
                obj.insert("value".to_string(), json!(value));
            }
            Kind::Brackets { square } => {
                obj.insert("square".to_string(), json!(square));
            }
            Kind::PageNumbering { style } => {
                obj.insert("style".to_string(), json!(style));
            }
            _ => {}
        }

        Ok(Value::Object(obj))
    }

    /// Rebuild a subtree from its serialized form
    ///
    /// The kind's constructor is resolved through the type registry;
    /// unknown kinds fall back to the generic base node so documents from
    /// newer vocabularies still load. Children are deserialized before the
    /// node itself is constructed. Ids are preserved exactly; a collision
    /// with an already-registered id fails the call.
    pub fn deserialise(&mut self, value: &Value) -> AomResult<NodeId> {
        let obj = value
            .as_object()
            .ok_or_else(|| AomError::invalid_form("expected an object"))?;
        let kind_name = obj
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| AomError::invalid_form("missing kind"))?
            .to_string();
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AomError::invalid_form("missing id"))?
            .to_string();

        let mut children = Vec::new();
        if let Some(array) = obj.get("children").and_then(Value::as_array) {
            for child in array {
                children.push(self.deserialise(child)?);
            }
        }

        let factory = self.registry.get(&kind_name).unwrap_or(factories::node);
        let (kind, extra) = factory(self, obj)?;

        let node_id = self.build_with_id(kind, id)?;
        for child in extra.iter().chain(children.iter()) {
            self.attach_deserialised(&node_id, child)?;
        }
        Ok(node_id)
    }

    /// Attach a deserialized child without dispatching events
    fn attach_deserialised(&mut self, parent: &str, child: &str) -> AomResult<()> {
        let article = self.node(parent)?.article.clone();
        self.node_mut(parent)?.children.push(child.to_string());
        self.node_mut(child)?.parent = Some(parent.to_string());
        self.propagate_article(child, article);
        Ok(())
    }
}

/// Built-in kind constructors, registered by `TypeRegistry::with_builtin_kinds`
pub(crate) mod factories {
    use super::*;
    use crate::kind::ArticleMeta;

    type Built = AomResult<(Kind, Vec<NodeId>)>;

    fn optional_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
        obj.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn require_str(obj: &Map<String, Value>, key: &str, kind: &str) -> AomResult<String> {
        optional_str(obj, key)
            .ok_or_else(|| AomError::invalid_form(format!("{kind} missing {key}")))
    }

    pub fn node(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Node, Vec::new()))
    }

    pub fn article(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        let packages = match obj.get("packages") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AomError::invalid_form(format!("article packages: {e}")))?,
            None => Vec::new(),
        };
        let meta = ArticleMeta {
            title: optional_str(obj, "title"),
            author: optional_str(obj, "author"),
            date: optional_str(obj, "date"),
            packages,
            readonly: obj.get("readonly").and_then(Value::as_bool).unwrap_or(false),
            spellcheck: obj
                .get("spellcheck")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            maketitles: Vec::new(),
        };
        Ok((Kind::Article(meta), Vec::new()))
    }

    pub fn document(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Document, Vec::new()))
    }

    pub fn section(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::Section {
                title: require_str(obj, "title", "section")?,
            },
            Vec::new(),
        ))
    }

    pub fn subsection(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::SubSection {
                title: require_str(obj, "title", "subsection")?,
            },
            Vec::new(),
        ))
    }

    pub fn paragraph(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Paragraph, Vec::new()))
    }

    pub fn text(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::Text {
                text: require_str(obj, "text", "text")?,
            },
            Vec::new(),
        ))
    }

    pub fn inline_maths(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::InlineMaths, Vec::new()))
    }

    pub fn variable(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        let value = require_str(obj, "variable", "variable")?;
        let glyph = value
            .chars()
            .next()
            .ok_or_else(|| AomError::invalid_form("variable glyph is empty"))?;
        Ok((Kind::Variable { glyph }, Vec::new()))
    }

    pub fn number(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        let value = obj
            .get("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| AomError::invalid_form("number missing value"))?;
        Ok((Kind::Number { value }, Vec::new()))
    }

    pub fn power(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Power, Vec::new()))
    }

    pub fn vector(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::Vector {
                text: require_str(obj, "text", "vector")?,
            },
            Vec::new(),
        ))
    }

    /// Numerator and denominator carry their own subtrees; deserialize them
    /// here and hand them back as pre-attached children
    pub fn fraction(aom: &mut Aom, obj: &Map<String, Value>) -> Built {
        let mut branches = Vec::new();
        for key in ["numerator", "denominator"] {
            let value = obj
                .get(key)
                .ok_or_else(|| AomError::invalid_form(format!("fraction missing {key}")))?;
            branches.push(aom.deserialise(value)?);
        }
        Ok((Kind::Fraction, branches))
    }

    pub fn brackets(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        let square = obj
            .get("square")
            .and_then(Value::as_bool)
            .ok_or_else(|| AomError::invalid_form("brackets missing square"))?;
        Ok((Kind::Brackets { square }, Vec::new()))
    }

    pub fn equals(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Equals, Vec::new()))
    }

    pub fn approx(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Approx, Vec::new()))
    }

    pub fn plus(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::Plus, Vec::new()))
    }

    pub fn text_normal(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::TextNormal {
                text: require_str(obj, "text", "textnormal")?,
            },
            Vec::new(),
        ))
    }

    pub fn page_numbering(_: &mut Aom, obj: &Map<String, Value>) -> Built {
        Ok((
            Kind::PageNumbering {
                style: require_str(obj, "style", "pagenumbering")?,
            },
            Vec::new(),
        ))
    }

    pub fn make_title(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::MakeTitle, Vec::new()))
    }

    pub fn new_page(_: &mut Aom, _: &Map<String, Value>) -> Built {
        Ok((Kind::NewPage, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{ArticleMeta, Package};

    #[test]
    fn test_serialised_shape() {
        let mut aom = Aom::new();
        let section = aom.build(Kind::Section {
            title: "Intro".into(),
        });
        let text = aom.build(Kind::Text {
            text: "Hello".into(),
        });
        aom.append_children(&section, &[text.clone()]).unwrap();

        let value = aom.serialise(&section).unwrap();
        assert_eq!(value["kind"], "section");
        assert_eq!(value["id"], section.as_str());
        assert_eq!(value["title"], "Intro");
        assert_eq!(value["children"][0]["kind"], "text");
        assert_eq!(value["children"][0]["text"], "Hello");
    }

    #[test]
    fn test_round_trip_preserves_ids_and_fields() {
        let mut aom = Aom::new();
        let article = aom.build(Kind::Article(ArticleMeta {
            title: Some("Hi".into()),
            author: Some("Bob".into()),
            packages: vec![Package {
                name: "geometry".into(),
                options: vec![("margin".into(), "2cm".into())],
            }],
            spellcheck: true,
            ..ArticleMeta::default()
        }));
        let doc = aom.build(Kind::Document);
        let para = aom.build(Kind::Paragraph);
        let text = aom.build(Kind::Text {
            text: "Hello".into(),
        });
        aom.append_children(&para, &[text]).unwrap();
        aom.append_children(&doc, &[para]).unwrap();
        aom.append_children(&article, &[doc]).unwrap();

        let value = aom.serialise(&article).unwrap();

        // rebuild in an independent context; ids carry over exactly
        let mut other = Aom::new();
        let rebuilt = other.deserialise(&value).unwrap();
        assert_eq!(rebuilt, article);
        assert_eq!(other.serialise(&rebuilt).unwrap(), value);
    }

    #[test]
    fn test_deserialise_same_context_collides() {
        let mut aom = Aom::new();
        let text = aom.build(Kind::Text {
            text: "Hello".into(),
        });
        let value = aom.serialise(&text).unwrap();

        let err = aom.deserialise(&value).unwrap_err();
        assert!(matches!(err, AomError::IdCollision { .. }));
    }

    #[test]
    fn test_fraction_serialises_branches() {
        let mut aom = Aom::new();
        let fraction = aom.build(Kind::Fraction);
        let numerator = aom.build(Kind::Node);
        let denominator = aom.build(Kind::Node);
        let one = aom.build(Kind::Number { value: 1.0 });
        let x = aom.build(Kind::Variable { glyph: 'x' });
        aom.append_children(&numerator, &[one]).unwrap();
        aom.append_children(&denominator, &[x]).unwrap();
        aom.append_children(&fraction, &[numerator, denominator])
            .unwrap();

        let value = aom.serialise(&fraction).unwrap();
        assert!(value.get("children").is_none());
        assert_eq!(value["numerator"]["kind"], "node");
        assert_eq!(value["denominator"]["children"][0]["variable"], "x");

        let mut other = Aom::new();
        let rebuilt = other.deserialise(&value).unwrap();
        assert_eq!(other.children(&rebuilt).unwrap().len(), 2);
        assert_eq!(other.serialise(&rebuilt).unwrap(), value);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_node() {
        let mut aom = Aom::new();
        let value = serde_json::json!({
            "kind": "hologram",
            "id": "h-1",
            "children": [],
        });
        let id = aom.deserialise(&value).unwrap();
        assert!(matches!(aom.kind(&id).unwrap(), Kind::Node));
    }

    #[test]
    fn test_deserialise_rebuilds_maketitles() {
        let mut aom = Aom::new();
        let article = aom.build(Kind::Article(ArticleMeta::default()));
        let doc = aom.build(Kind::Document);
        let maketitle = aom.build(Kind::MakeTitle);
        aom.append_children(&doc, &[maketitle.clone()]).unwrap();
        aom.append_children(&article, &[doc]).unwrap();

        let value = aom.serialise(&article).unwrap();
        let mut other = Aom::new();
        let rebuilt = other.deserialise(&value).unwrap();
        assert_eq!(
            other.article_meta(&rebuilt).unwrap().maketitles,
            vec![maketitle]
        );
    }
}
