//! XPath extraction.
//!
//! Each version is parsed as XML and the configured XPath 1.0 expression
//! evaluated with the namespace map bound. Node-sets serialize each node
//! back to XML text in document order, joined by newline; strings, numbers
//! and booleans stringify. Content that is not well-formed XML collapses
//! to empty extraction.

use std::fmt::Write as _;

use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

use crate::config::XpathWatch;
use crate::errors::VigilError;
use crate::watch::Extraction;

pub fn extract(watch: &XpathWatch, content: &str) -> Result<Extraction, VigilError> {
    let compile_error = |message: String| VigilError::QueryCompile {
        kind: "xpath",
        what: "expression",
        message,
    };

    let package = match parser::parse(content) {
        Ok(package) => package,
        Err(e) => {
            tracing::debug!("xpath watch: content is not well-formed XML: {e}");
            return Ok(Extraction::default());
        }
    };
    let document = package.as_document();

    let xpath = Factory::new()
        .build(&watch.expression)
        .map_err(|e| compile_error(e.to_string()))?
        .ok_or_else(|| compile_error("empty expression".to_string()))?;

    let mut context = Context::new();
    for (prefix, uri) in &watch.namespaces {
        context.set_namespace(prefix, uri);
    }

    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| compile_error(e.to_string()))?;

    let text = match value {
        Value::Nodeset(nodeset) => {
            let parts: Vec<String> = nodeset
                .document_order()
                .into_iter()
                .map(serialize_node)
                .collect();
            parts.join("\n")
        }
        Value::String(s) => s,
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => format_number(n),
    };

    Ok(Extraction {
        text,
        context: Vec::new(),
    })
}

/// XPath numbers are doubles; integral values print without a fraction.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Serialize a result node back to XML text.
fn serialize_node(node: Node<'_>) -> String {
    match node {
        Node::Element(element) => {
            let mut out = String::new();
            write_element(&mut out, element);
            out
        }
        Node::Text(text) => text.text().to_string(),
        Node::Attribute(attr) => attr.value().to_string(),
        Node::Comment(comment) => format!("<!--{}-->", comment.text()),
        Node::ProcessingInstruction(pi) => {
            format!("<?{} {}?>", pi.target(), pi.value().unwrap_or(""))
        }
        Node::Namespace(ns) => ns.uri().to_string(),
        Node::Root(root) => {
            let mut out = String::new();
            for child in root.children() {
                if let ChildOfRoot::Element(element) = child {
                    write_element(&mut out, element);
                }
            }
            out
        }
    }
}

fn write_element(out: &mut String, element: Element<'_>) {
    let name = element.name().local_part().to_string();
    out.push('<');
    out.push_str(&name);
    for attr in element.attributes() {
        let _ = write!(
            out,
            " {}=\"{}\"",
            attr.name().local_part(),
            escape(attr.value(), true)
        );
    }

    let children = element.children();
    if children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in children {
        match child {
            ChildOfElement::Element(inner) => write_element(out, inner),
            ChildOfElement::Text(text) => out.push_str(&escape(text.text(), false)),
            ChildOfElement::Comment(comment) => {
                let _ = write!(out, "<!--{}-->", comment.text());
            }
            ChildOfElement::ProcessingInstruction(pi) => {
                let _ = write!(out, "<?{} {}?>", pi.target(), pi.value().unwrap_or(""));
            }
        }
    }
    let _ = write!(out, "</{}>", name);
}

fn escape(value: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
