use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// The discriminant identifying which concrete variant a tree node is
///
/// Kind-specific payload fields live directly in the variants; polymorphic
/// behavior (serialization shape, markup printing, partial deletion)
/// dispatches by matching on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// Generic base node; also the fallback for unknown serialized kinds
    Node,

    /// Root of a document tree; owns the preamble metadata
    Article(ArticleMeta),

    /// The `\begin{document}...\end{document}` body
    Document,

    Section { title: String },
    SubSection { title: String },
    Paragraph,

    /// A run of text; may embed `<b>`/`<i>`/`<u>` decoration spans
    Text { text: String },

    /// Content between `$...$`
    InlineMaths,

    /// A single maths symbol; Greek glyphs print back as their commands
    Variable { glyph: char },
    Number { value: f64 },

    /// Exponent; the children are the exponent content
    Power,

    /// `\vec` argument, literal text or a Greek glyph
    Vector { text: String },

    /// Two children: numerator and denominator, in that order
    Fraction,

    Brackets { square: bool },

    /// Alignment equals, `&=`
    Equals,
    Approx,
    Plus,

    TextNormal { text: String },
    PageNumbering { style: String },

    /// Registers itself in its owning article's maketitles list on attach
    MakeTitle,
    NewPage,
}

impl Kind {
    /// The serialized name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Node => "node",
            Kind::Article(_) => "article",
            Kind::Document => "document",
            Kind::Section { .. } => "section",
            Kind::SubSection { .. } => "subsection",
            Kind::Paragraph => "paragraph",
            Kind::Text { .. } => "text",
            Kind::InlineMaths => "inlinemaths",
            Kind::Variable { .. } => "variable",
            Kind::Number { .. } => "number",
            Kind::Power => "power",
            Kind::Vector { .. } => "vector",
            Kind::Fraction => "fraction",
            Kind::Brackets { .. } => "brackets",
            Kind::Equals => "equals",
            Kind::Approx => "approx",
            Kind::Plus => "plus",
            Kind::TextNormal { .. } => "textnormal",
            Kind::PageNumbering { .. } => "pagenumbering",
            Kind::MakeTitle => "maketitle",
            Kind::NewPage => "newpage",
        }
    }

    /// Kinds that carry editable text and support positional deletion
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Kind::Text { .. } | Kind::TextNormal { .. } | Kind::Vector { .. }
        )
    }
}

/// Preamble metadata carried by an `Article` root
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub packages: Vec<Package>,
    pub readonly: bool,
    pub spellcheck: bool,
    /// Ids of the MakeTitle nodes currently attached beneath this article;
    /// maintained by the tree engine, not serialized
    pub maketitles: Vec<NodeId>,
}

/// A `\usepackage` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Kind::Article(ArticleMeta::default()).name(), "article");
        assert_eq!(Kind::SubSection { title: "t".into() }.name(), "subsection");
        assert_eq!(Kind::InlineMaths.name(), "inlinemaths");
    }

    #[test]
    fn test_text_like() {
        assert!(Kind::Text { text: "x".into() }.is_text_like());
        assert!(Kind::Vector { text: "v".into() }.is_text_like());
        assert!(!Kind::Paragraph.is_text_like());
    }
}
