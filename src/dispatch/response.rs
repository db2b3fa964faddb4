//! Parsed XML responses.
//!
//! Every FogBugz reply is a `<response>` document. The body is parsed once
//! with `roxmltree` into an owned [`Element`] tree so that callers can hold
//! on to it without borrowing the raw text.

use std::collections::HashMap;

use crate::error::FbError;
use crate::model::Fields;

/// An owned XML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local tag name.
    pub name: String,
    /// Attributes by name.
    pub attributes: Fields,
    /// Concatenated text and CDATA content, untrimmed.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        let text = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect::<String>();

        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Element::from_node)
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            text,
            children,
        }
    }

    /// Returns the first direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns the trimmed text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.trim())
    }

    /// Returns an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the element has no child elements.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Attributes merged with the trimmed text of every leaf child.
    ///
    /// Child elements that have children of their own are skipped; a leaf
    /// child shadows an attribute of the same name.
    pub fn fields(&self) -> Fields {
        let mut fields = self.attributes.clone();
        for child in self.children.iter().filter(|child| child.is_leaf()) {
            fields.insert(child.name.clone(), child.text.trim().to_string());
        }
        fields
    }

    /// All descendants (excluding self) with the given name, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

/// A successfully parsed API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    root: Element,
}

impl Response {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns `FbError::Xml` if the body is not well-formed, or the error
    /// mapped by [`FbError::api`] if the root carries an `<error>` child.
    pub fn parse(body: &str) -> Result<Self, FbError> {
        let document = roxmltree::Document::parse(body)?;
        let root = Element::from_node(document.root_element());

        if let Some(error) = root.child("error") {
            let code = error
                .attr("code")
                .and_then(|code| code.trim().parse::<u32>().ok())
                .unwrap_or(0);
            return Err(FbError::api(code, error.text.trim()));
        }

        Ok(Self { root })
    }

    /// The `<response>` element.
    pub fn document(&self) -> &Element {
        &self.root
    }

    /// Flat map of the root's direct children to their trimmed text.
    pub fn children(&self) -> HashMap<String, String> {
        self.root
            .children
            .iter()
            .map(|child| (child.name.clone(), child.text.trim().to_string()))
            .collect()
    }

    /// Every element named `tag`, in document order.
    pub fn elements(&self, tag: &str) -> Vec<&Element> {
        self.root.descendants(tag)
    }

    /// One field map per element named `tag`, in document order.
    pub fn data(&self, tag: &str) -> Vec<Fields> {
        self.elements(tag).into_iter().map(Element::fields).collect()
    }
}
