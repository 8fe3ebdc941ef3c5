use serde::{Deserialize, Serialize};

/// AST node produced by the parser
///
/// The AST is a transient structure: it is produced by the parser, consumed
/// by the compiler, and never mutated in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AstNode {
    /// A run of plain characters
    Text { text: String },

    /// Paragraph separator, produced by a blank line
    Break,

    /// A `\name` command, optionally with `[key=value,...]` options and a
    /// `{...}` positional argument scope
    Tag {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Vec<AstNode>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Vec<(String, String)>>,
    },

    /// A `\begin{...}...\end{...}` block; `data` holds the parsed name
    /// argument, `children` the body
    Environment {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Vec<AstNode>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Vec<(String, String)>>,
        children: Vec<AstNode>,
    },

    /// A `(...)` or `[...]` group
    Brackets { children: Vec<AstNode>, square: bool },

    /// Content between `$...$`
    InlineMaths { children: Vec<AstNode> },
}

impl AstNode {
    /// The single literal-text content of an argument scope, if that is all
    /// the scope contains
    pub fn literal_text(data: &[AstNode]) -> Option<&str> {
        match data {
            [AstNode::Text { text }] => Some(text),
            _ => None,
        }
    }

    /// The name of an environment, read from its `data` argument
    pub fn environment_name(data: Option<&Vec<AstNode>>) -> Option<&str> {
        data.and_then(|d| Self::literal_text(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_text() {
        let data = vec![AstNode::Text {
            text: "article".to_string(),
        }];
        assert_eq!(AstNode::literal_text(&data), Some("article"));

        let mixed = vec![
            AstNode::Text {
                text: "a".to_string(),
            },
            AstNode::Break,
        ];
        assert_eq!(AstNode::literal_text(&mixed), None);
        assert_eq!(AstNode::literal_text(&[]), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let node = AstNode::Tag {
            name: "usepackage".to_string(),
            data: Some(vec![AstNode::Text {
                text: "amsmath".to_string(),
            }]),
            options: Some(vec![("margin".to_string(), "2cm".to_string())]),
        };

        let json = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
