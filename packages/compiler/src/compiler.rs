use manuscript_aom::{greek, Aom, ArticleMeta, Kind, NodeId, Package};
use manuscript_parser::AstNode;
use tracing::warn;

use crate::error::{CompileError, CompileResult};

/// Parse and compile a markup document in one call
pub fn compile_source(aom: &mut Aom, source: &str) -> CompileResult<NodeId> {
    let nodes = manuscript_parser::parse(source)?;
    compile(aom, &nodes)
}

/// Compile a parsed document into an Article
///
/// The top level expects preamble tags (`documentclass`, `usepackage`,
/// `title`, `author`, `date`) followed by one `document` environment.
/// Anything else is fatal; no partial article is returned.
pub fn compile(aom: &mut Aom, nodes: &[AstNode]) -> CompileResult<NodeId> {
    let mut meta = ArticleMeta::default();
    let mut document = None;

    for node in nodes {
        match node {
            AstNode::Tag {
                name,
                data,
                options,
            } => match name.as_str() {
                "documentclass" => {
                    let class = literal(name, data.as_deref())?;
                    if class != "article" {
                        return Err(CompileError::unsupported(format!(
                            "document class {class}"
                        )));
                    }
                }
                "usepackage" => meta.packages.push(Package {
                    name: literal(name, data.as_deref())?.to_string(),
                    options: options.clone().unwrap_or_default(),
                }),
                "title" => meta.title = Some(literal(name, data.as_deref())?.to_string()),
                "author" => meta.author = Some(literal(name, data.as_deref())?.to_string()),
                "date" => meta.date = Some(date_argument(data.as_deref())?),
                other => {
                    return Err(CompileError::unsupported(format!("\\{other} at top level")))
                }
            },
            AstNode::Environment { .. } => {
                if document.is_some() {
                    return Err(CompileError::unsupported(
                        "more than one document environment",
                    ));
                }
                document = Some(node);
            }
            // stray whitespace between preamble entries is tolerated
            AstNode::Text { text } if text.trim().is_empty() => {}
            other => {
                return Err(CompileError::unsupported(format!(
                    "{} at top level",
                    describe(other)
                )))
            }
        }
    }

    let environment = document.ok_or_else(|| {
        CompileError::unsupported("missing document environment")
    })?;

    let article = aom.build(Kind::Article(meta));
    let body = env(aom, environment)?;
    aom.append_children(&article, &[body])?;
    Ok(article)
}

/// Compile one environment body into a Document node
///
/// Walks the children left to right with a pending text accumulator, a
/// pending paragraph and an optional open section/subsection. Nested
/// environments recurse here and are subject to the same name check.
fn env(aom: &mut Aom, environment: &AstNode) -> CompileResult<NodeId> {
    let AstNode::Environment { data, children, .. } = environment else {
        return Err(CompileError::InvalidEnvironment("none".to_string()));
    };
    match AstNode::environment_name(data.as_ref()) {
        Some("document") => {}
        Some(other) => return Err(CompileError::InvalidEnvironment(other.to_string())),
        None => return Err(CompileError::InvalidEnvironment("unnamed".to_string())),
    }

    let doc = aom.build(Kind::Document);
    let mut state = EnvState::new(doc.clone());
    for child in children {
        compile_block(aom, &mut state, child)?;
    }
    state.finish(aom)?;
    Ok(doc)
}

/// Walker state for one environment body
struct EnvState {
    doc: NodeId,
    text: String,
    paragraph: Option<NodeId>,
    section: Option<NodeId>,
    subsection: Option<NodeId>,
}

impl EnvState {
    fn new(doc: NodeId) -> Self {
        Self {
            doc,
            text: String::new(),
            paragraph: None,
            section: None,
            subsection: None,
        }
    }

    /// Where flushed paragraphs and nested blocks currently land
    fn container(&self) -> NodeId {
        self.subsection
            .clone()
            .or_else(|| self.section.clone())
            .unwrap_or_else(|| self.doc.clone())
    }

    fn ensure_paragraph(&mut self, aom: &mut Aom) -> NodeId {
        match &self.paragraph {
            Some(paragraph) => paragraph.clone(),
            None => {
                let paragraph = aom.build(Kind::Paragraph);
                self.paragraph = Some(paragraph.clone());
                paragraph
            }
        }
    }

    fn flush_text(&mut self, aom: &mut Aom) -> CompileResult<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = aom.build(Kind::Text {
            text: std::mem::take(&mut self.text),
        });
        let paragraph = self.ensure_paragraph(aom);
        aom.append_children(&paragraph, &[text])?;
        Ok(())
    }

    /// Flush the pending paragraph into the current container
    ///
    /// Paragraphs are created lazily, so consecutive breaks never produce
    /// empty ones.
    fn flush_paragraph(&mut self, aom: &mut Aom) -> CompileResult<()> {
        self.flush_text(aom)?;
        if let Some(paragraph) = self.paragraph.take() {
            let container = self.container();
            aom.append_children(&container, &[paragraph])?;
        }
        Ok(())
    }

    fn close_subsection(&mut self, aom: &mut Aom) -> CompileResult<()> {
        if let Some(subsection) = self.subsection.take() {
            let target = self.section.clone().unwrap_or_else(|| self.doc.clone());
            aom.append_children(&target, &[subsection])?;
        }
        Ok(())
    }

    fn open_section(&mut self, aom: &mut Aom, title: String) -> CompileResult<()> {
        self.flush_paragraph(aom)?;
        self.close_subsection(aom)?;
        if let Some(section) = self.section.take() {
            let doc = self.doc.clone();
            aom.append_children(&doc, &[section])?;
        }
        self.section = Some(aom.build(Kind::Section { title }));
        Ok(())
    }

    fn open_subsection(&mut self, aom: &mut Aom, title: String) -> CompileResult<()> {
        self.flush_paragraph(aom)?;
        self.close_subsection(aom)?;
        self.subsection = Some(aom.build(Kind::SubSection { title }));
        Ok(())
    }

    fn finish(&mut self, aom: &mut Aom) -> CompileResult<()> {
        self.flush_paragraph(aom)?;
        self.close_subsection(aom)?;
        if let Some(section) = self.section.take() {
            let doc = self.doc.clone();
            aom.append_children(&doc, &[section])?;
        }
        Ok(())
    }
}

fn compile_block(aom: &mut Aom, state: &mut EnvState, node: &AstNode) -> CompileResult<()> {
    match node {
        AstNode::Text { text } => state.text.push_str(text),
        AstNode::Break => state.flush_paragraph(aom)?,
        AstNode::Environment { .. } => {
            state.flush_paragraph(aom)?;
            let nested = env(aom, node)?;
            let container = state.container();
            aom.append_children(&container, &[nested])?;
        }
        AstNode::InlineMaths { children } => {
            state.flush_text(aom)?;
            let maths = aom.build(Kind::InlineMaths);
            let inner = compile_maths(aom, children)?;
            aom.append_children(&maths, &inner)?;
            let paragraph = state.ensure_paragraph(aom);
            aom.append_children(&paragraph, &[maths])?;
        }
        AstNode::Brackets { children, square } => {
            // bracket groups in text flow fold back into the running text
            state.text.push(if *square { '[' } else { '(' });
            for child in children {
                compile_block(aom, state, child)?;
            }
            state.text.push(if *square { ']' } else { ')' });
        }
        AstNode::Tag { name, data, .. } => compile_tag(aom, state, name, data.as_deref())?,
    }
    Ok(())
}

fn compile_tag(
    aom: &mut Aom,
    state: &mut EnvState,
    name: &str,
    data: Option<&[AstNode]>,
) -> CompileResult<()> {
    match name {
        "textbf" => fold_decoration(&mut state.text, name, data, "<b>", "</b>")?,
        "textit" => fold_decoration(&mut state.text, name, data, "<i>", "</i>")?,
        "underline" => fold_decoration(&mut state.text, name, data, "<u>", "</u>")?,
        "pagenumbering" => {
            let style = literal(name, data)?.to_string();
            push_inline(aom, state, Kind::PageNumbering { style })?;
        }
        "&=" => push_inline(aom, state, Kind::Equals)?,
        "approx" => push_inline(aom, state, Kind::Approx)?,
        "textnormal" => {
            let text = literal(name, data)?.to_string();
            push_inline(aom, state, Kind::TextNormal { text })?;
        }
        "vec" => {
            let text = vec_argument(data)?;
            push_inline(aom, state, Kind::Vector { text })?;
        }
        "^" => {
            let data =
                data.ok_or_else(|| CompileError::malformed("^", "expected an argument"))?;
            state.flush_text(aom)?;
            let power = aom.build(Kind::Power);
            let inner = compile_maths(aom, data)?;
            aom.append_children(&power, &inner)?;
            let paragraph = state.ensure_paragraph(aom);
            aom.append_children(&paragraph, &[power])?;
        }
        "maketitle" => push_inline(aom, state, Kind::MakeTitle)?,
        "newpage" => push_inline(aom, state, Kind::NewPage)?,
        "section" => {
            let title = literal(name, data)?.to_string();
            state.open_section(aom, title)?;
        }
        "subsection" => {
            let title = literal(name, data)?.to_string();
            state.open_subsection(aom, title)?;
        }
        other => match greek::glyph_for(other) {
            Some(glyph) => push_inline(aom, state, Kind::Variable { glyph })?,
            // unrecognized tags are skipped, not fatal, so documents using
            // newer markup still compile
            None => warn!(tag = other, "skipping unrecognized tag"),
        },
    }
    Ok(())
}

fn push_inline(aom: &mut Aom, state: &mut EnvState, kind: Kind) -> CompileResult<()> {
    state.flush_text(aom)?;
    let node = aom.build(kind);
    let paragraph = state.ensure_paragraph(aom);
    aom.append_children(&paragraph, &[node])?;
    Ok(())
}

/// Translate inline-maths content into typed nodes
///
/// Characters map one by one: spaces are dropped, digits become Number
/// nodes, `+` becomes Plus, everything else a Variable. A bare `^` takes
/// the following character as its exponent.
fn compile_maths(aom: &mut Aom, nodes: &[AstNode]) -> CompileResult<Vec<NodeId>> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            AstNode::Text { text } => {
                let mut chars = text.chars().peekable();
                while let Some(c) = chars.next() {
                    if c == ' ' {
                        continue;
                    }
                    if c == '^' {
                        match chars.next() {
                            Some(exponent) => {
                                let power = aom.build(Kind::Power);
                                let inner = maths_char(aom, exponent);
                                aom.append_children(&power, &[inner])?;
                                out.push(power);
                            }
                            None => warn!("dangling ^ in maths"),
                        }
                        continue;
                    }
                    out.push(maths_char(aom, c));
                }
            }
            AstNode::Tag { name, data, .. } => match name.as_str() {
                "^" => {
                    let data = data
                        .as_deref()
                        .ok_or_else(|| CompileError::malformed("^", "expected an argument"))?;
                    let power = aom.build(Kind::Power);
                    let inner = compile_maths(aom, data)?;
                    aom.append_children(&power, &inner)?;
                    out.push(power);
                }
                "&=" => out.push(aom.build(Kind::Equals)),
                "approx" => out.push(aom.build(Kind::Approx)),
                "vec" => {
                    let text = vec_argument(data.as_deref())?;
                    out.push(aom.build(Kind::Vector { text }));
                }
                other => match greek::glyph_for(other) {
                    Some(glyph) => out.push(aom.build(Kind::Variable { glyph })),
                    None => warn!(tag = other, "skipping unrecognized tag in maths"),
                },
            },
            AstNode::Brackets { children, square } => {
                let brackets = aom.build(Kind::Brackets { square: *square });
                let inner = compile_maths(aom, children)?;
                aom.append_children(&brackets, &inner)?;
                out.push(brackets);
            }
            AstNode::Break => {}
            other => warn!(node = describe(other), "skipping construct in maths"),
        }
    }
    Ok(out)
}

fn maths_char(aom: &mut Aom, c: char) -> NodeId {
    let kind = if c.is_ascii_digit() {
        Kind::Number {
            value: f64::from(c as u8 - b'0'),
        }
    } else if c == '+' {
        Kind::Plus
    } else {
        Kind::Variable { glyph: c }
    };
    aom.build(kind)
}

/// Fold a decoration tag into the running text buffer as marker spans
///
/// Only literal text and nested decorations may appear inside.
fn fold_decoration(
    buf: &mut String,
    tag: &str,
    data: Option<&[AstNode]>,
    open: &str,
    close: &str,
) -> CompileResult<()> {
    let data = data.ok_or_else(|| CompileError::malformed(tag, "expected an argument"))?;
    buf.push_str(open);
    for node in data {
        match node {
            AstNode::Text { text } => buf.push_str(text),
            AstNode::Tag { name, data, .. } => match name.as_str() {
                "textbf" => fold_decoration(buf, name, data.as_deref(), "<b>", "</b>")?,
                "textit" => fold_decoration(buf, name, data.as_deref(), "<i>", "</i>")?,
                "underline" => fold_decoration(buf, name, data.as_deref(), "<u>", "</u>")?,
                _ => {
                    return Err(CompileError::malformed(
                        tag,
                        format!("unsupported \\{name} inside decorated text"),
                    ))
                }
            },
            other => {
                return Err(CompileError::malformed(
                    tag,
                    format!("unsupported {} inside decorated text", describe(other)),
                ))
            }
        }
    }
    buf.push_str(close);
    Ok(())
}

/// The literal-text argument of a tag, or MalformedArgument
fn literal<'a>(tag: &str, data: Option<&'a [AstNode]>) -> CompileResult<&'a str> {
    let data = data.ok_or_else(|| CompileError::malformed(tag, "expected an argument"))?;
    AstNode::literal_text(data)
        .ok_or_else(|| CompileError::malformed(tag, "expected literal text"))
}

/// A `\vec` argument: literal text, or a recognized Greek-letter command
fn vec_argument(data: Option<&[AstNode]>) -> CompileResult<String> {
    let data = data.ok_or_else(|| CompileError::malformed("vec", "expected an argument"))?;
    if let Some(text) = AstNode::literal_text(data) {
        return Ok(text.to_string());
    }
    if let [AstNode::Tag {
        name, data: None, ..
    }] = data
    {
        if let Some(glyph) = greek::glyph_for(name) {
            return Ok(glyph.to_string());
        }
    }
    Err(CompileError::malformed(
        "vec",
        "expected literal text or a Greek letter",
    ))
}

/// A `\date` argument: literal text, or `\today` for the current time
fn date_argument(data: Option<&[AstNode]>) -> CompileResult<String> {
    let data = data.ok_or_else(|| CompileError::malformed("date", "expected an argument"))?;
    if let Some(text) = AstNode::literal_text(data) {
        return Ok(text.to_string());
    }
    if let [AstNode::Tag {
        name, data: None, ..
    }] = data
    {
        if name == "today" {
            return Ok(chrono::Local::now()
                .format("%e %B %Y")
                .to_string()
                .trim()
                .to_string());
        }
    }
    Err(CompileError::malformed(
        "date",
        "expected literal text or \\today",
    ))
}

fn describe(node: &AstNode) -> &'static str {
    match node {
        AstNode::Text { .. } => "text",
        AstNode::Break => "paragraph break",
        AstNode::Tag { .. } => "tag",
        AstNode::Environment { .. } => "environment",
        AstNode::Brackets { .. } => "bracket group",
        AstNode::InlineMaths { .. } => "inline maths",
    }
}
