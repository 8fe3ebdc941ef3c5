//! Structural markup printer
//!
//! Every node can regenerate markup text by concatenating its children's
//! markup inside kind-specific syntax. This is a structural pretty-printer,
//! not an exact inverse of the original input; from the second
//! parse-compile-print pass onward the output is stable.

use crate::aom::Aom;
use crate::error::AomResult;
use crate::greek;
use crate::kind::Kind;

impl Aom {
    /// The markup text of the subtree rooted at `id`
    pub fn tex(&self, id: &str) -> AomResult<String> {
        let node = self.node(id)?;
        let out = match &node.kind {
            Kind::Node | Kind::Paragraph => {
                let mut out = self.children_tex(id)?;
                if matches!(node.kind, Kind::Paragraph) {
                    out.push_str("\n\n");
                }
                out
            }
            Kind::Article(meta) => {
                let mut out = String::from("\\documentclass{article}\n");
                for package in &meta.packages {
                    if package.options.is_empty() {
                        out.push_str(&format!("\\usepackage{{{}}}\n", package.name));
                    } else {
                        let options = package
                            .options
                            .iter()
                            .map(|(key, value)| {
                                if value.is_empty() {
                                    key.clone()
                                } else {
                                    format!("{}={}", key, value)
                                }
                            })
                            .collect::<Vec<_>>()
                            .join(",");
                        out.push_str(&format!(
                            "\\usepackage[{}]{{{}}}\n",
                            options, package.name
                        ));
                    }
                }
                if let Some(title) = &meta.title {
                    out.push_str(&format!("\\title{{{}}}\n", title));
                }
                if let Some(author) = &meta.author {
                    out.push_str(&format!("\\author{{{}}}\n", author));
                }
                if let Some(date) = &meta.date {
                    out.push_str(&format!("\\date{{{}}}\n", date));
                }
                out.push_str(&self.children_tex(id)?);
                out
            }
            Kind::Document => {
                format!(
                    "\\begin{{document}}\n{}\\end{{document}}",
                    self.children_tex(id)?
                )
            }
            Kind::Section { title } => {
                format!("\\section{{{}}}\n{}", title, self.children_tex(id)?)
            }
            Kind::SubSection { title } => {
                format!("\\subsection{{{}}}\n{}", title, self.children_tex(id)?)
            }
            Kind::Text { text } => decode_decorations(text),
            Kind::InlineMaths => format!("${}$", self.children_tex(id)?),
            Kind::Variable { glyph } => match greek::command_for(*glyph) {
                Some(command) => format!("\\{}\n", command),
                None => glyph.to_string(),
            },
            Kind::Number { value } => {
                if value.fract() == 0.0 {
                    format!("{}", *value as i64)
                } else {
                    format!("{}", value)
                }
            }
            Kind::Power => format!("^{{{}}}", self.children_tex(id)?),
            Kind::Vector { text } => {
                let inner = single_greek_glyph(text)
                    .map(|command| format!("\\{}", command))
                    .unwrap_or_else(|| text.clone());
                format!("\\vec{{{}}}", inner)
            }
            Kind::Fraction => {
                let mut branches = node.children.iter();
                let numerator = match branches.next() {
                    Some(child) => self.tex(child)?,
                    None => String::new(),
                };
                let denominator = match branches.next() {
                    Some(child) => self.tex(child)?,
                    None => String::new(),
                };
                format!("\\frac{{{}}}{{{}}}", numerator, denominator)
            }
            Kind::Brackets { square } => {
                let inner = self.children_tex(id)?;
                if *square {
                    format!("[{}]", inner)
                } else {
                    format!("({})", inner)
                }
            }
            Kind::Equals => "&=".to_string(),
            Kind::Approx => "\\approx\n".to_string(),
            Kind::Plus => "+".to_string(),
            Kind::TextNormal { text } => format!("\\textnormal{{{}}}", text),
            Kind::PageNumbering { style } => format!("\\pagenumbering{{{}}}", style),
            Kind::MakeTitle => "\\maketitle\n".to_string(),
            Kind::NewPage => "\\newpage\n".to_string(),
        };
        Ok(out)
    }

    fn children_tex(&self, id: &str) -> AomResult<String> {
        let mut out = String::new();
        for child in &self.node(id)?.children {
            out.push_str(&self.tex(child)?);
        }
        Ok(out)
    }
}

/// Convert `<b>`/`<i>`/`<u>` decoration spans back into markup commands
fn decode_decorations(text: &str) -> String {
    text.replace("<b>", "\\textbf{")
        .replace("</b>", "}")
        .replace("<i>", "\\textit{")
        .replace("</i>", "}")
        .replace("<u>", "\\underline{")
        .replace("</u>", "}")
}

/// The Greek command for a one-glyph string, if that glyph is Greek
fn single_greek_glyph(text: &str) -> Option<&'static str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    greek::command_for(first)
}
