//! Selector types, parsing and matching.
//!
//! Supports the subset of CSS selectors the navigation layer needs:
//! type (`ul`), class (`.sub-menu`), id (`#intro`) and universal (`*`)
//! selectors combined into compounds, the descendant (` `) and child (`>`)
//! combinators, comma-separated lists, and the `:scope` pseudo-class for
//! queries relative to an element.
//!
//! ```
//! use waymark_core::SelectorList;
//!
//! let list: SelectorList = "ul.toggle-show > li > a, :scope > button".parse().unwrap();
//! assert_eq!(list.len(), 2);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::dom::{Document, ElementId};
use crate::error::SelectorError;

/// How two adjacent selector parts relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Any ancestor (`a b`).
    Descendant,
    /// Direct parent (`a > b`).
    Child,
}

/// A single compound selector (e.g. `ul.sub-menu`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Matches only the scope element of a query.
    pub scope: bool,
    /// Tag name, lowercase. `None` matches any tag.
    pub tag: Option<String>,
    /// Required `id` attribute.
    pub id: Option<String>,
    /// Required classes (all must be present).
    pub classes: Vec<String>,
}

impl SelectorPart {
    /// Create a part matching a tag name.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            ..Default::default()
        }
    }

    /// Create a part matching only the query scope (`:scope`).
    pub fn scope() -> Self {
        Self {
            scope: true,
            ..Default::default()
        }
    }

    /// Create a part matching a class.
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            classes: vec![class.into()],
            ..Default::default()
        }
    }

    /// Add a class requirement.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    fn is_empty(&self) -> bool {
        !self.scope && self.tag.is_none() && self.id.is_none() && self.classes.is_empty()
    }

    fn matches(&self, doc: &Document, el: ElementId, scope: Option<ElementId>) -> bool {
        if self.scope {
            let scope = scope.unwrap_or_else(|| doc.document_element());
            if el != scope {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            match doc.tag(el) {
                Some(actual) if actual == tag => {}
                _ => return false,
            }
        }

        if let Some(id) = &self.id {
            if doc.attribute(el, "id") != Some(id.as_str()) {
                return false;
            }
        }

        self.classes.iter().all(|class| doc.has_class(el, class))
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope {
            write!(f, ":scope")?;
        }
        match &self.tag {
            Some(tag) => write!(f, "{tag}")?,
            None if self.is_empty() => write!(f, "*")?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

/// A complex selector: compound parts joined by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Selector parts, left to right.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a selector from a single part.
    pub fn simple(part: SelectorPart) -> Self {
        Self {
            parts: vec![part],
            combinators: vec![],
        }
    }

    /// Append a part joined with the child combinator.
    pub fn child(mut self, part: SelectorPart) -> Self {
        self.combinators.push(Combinator::Child);
        self.parts.push(part);
        self
    }

    /// Append a part joined with the descendant combinator.
    pub fn descendant(mut self, part: SelectorPart) -> Self {
        self.combinators.push(Combinator::Descendant);
        self.parts.push(part);
        self
    }

    /// Check whether `el` matches this selector.
    pub fn matches(&self, doc: &Document, el: ElementId, scope: Option<ElementId>) -> bool {
        match self.parts.len() {
            0 => false,
            n => self.matches_from(n - 1, doc, el, scope),
        }
    }

    fn matches_from(
        &self,
        index: usize,
        doc: &Document,
        el: ElementId,
        scope: Option<ElementId>,
    ) -> bool {
        if !self.parts[index].matches(doc, el, scope) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(el)
                .is_some_and(|parent| self.matches_from(index - 1, doc, parent, scope)),
            Combinator::Descendant => {
                let mut current = doc.parent(el);
                while let Some(ancestor) = current {
                    if self.matches_from(index - 1, doc, ancestor, scope) {
                        return true;
                    }
                    current = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                }
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectorParser::new(s).parse_complex()
    }
}

/// A comma-separated list of selectors; matches if any member matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Create a list from already-built selectors.
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    /// Number of selectors in the list.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the list is empty (never matches).
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// The selectors in this list.
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Check whether `el` matches any selector in the list.
    ///
    /// `scope` is the element `:scope` refers to; `None` means the document element.
    pub fn matches(&self, doc: &Document, el: ElementId, scope: Option<ElementId>) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(doc, el, scope))
    }
}

impl From<Selector> for SelectorList {
    fn from(selector: Selector) -> Self {
        Self::new(vec![selector])
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SelectorError::new(s, "empty selector"));
        }
        let selectors = s
            .split(',')
            .map(|member| {
                SelectorParser::new(member)
                    .parse_complex()
                    .map_err(|err| SelectorError::new(s, err.message))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }
}

/// Hand-written parser for a single complex selector.
struct SelectorParser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> SelectorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError::new(self.source, message)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn parse_complex(mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        let mut parts = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.chars.peek() {
                None => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(&c) => return Err(self.error(format!("unexpected character '{c}'"))),
            };
            if self.chars.peek().is_none() {
                return Err(self.error("selector ends with a combinator"));
            }
            combinators.push(combinator);
            parts.push(self.parse_compound()?);
        }

        Ok(Selector { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<SelectorPart, SelectorError> {
        let mut part = SelectorPart::default();
        let mut universal = false;

        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                universal = true;
            }
            Some(':') => {
                self.chars.next();
                let name = self.parse_ident()?;
                if name != "scope" {
                    return Err(self.error(format!("unsupported pseudo-class ':{name}'")));
                }
                part.scope = true;
            }
            Some(c) if is_ident_char(*c) => {
                part.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        while let Some(&c) = self.chars.peek() {
            match c {
                '.' => {
                    self.chars.next();
                    part.classes.push(self.parse_ident()?);
                }
                '#' => {
                    self.chars.next();
                    let id = self.parse_ident()?;
                    if part.id.replace(id).is_some() {
                        return Err(self.error("compound selector has two ids"));
                    }
                }
                _ => break,
            }
        }

        if part.is_empty() && !universal {
            return match self.chars.peek() {
                Some(&c) => Err(self.error(format!("unexpected character '{c}'"))),
                None => Err(self.error("empty selector")),
            };
        }
        Ok(part)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.chars.next();
        }
        if ident.is_empty() {
            Err(self.error("expected an identifier"))
        } else {
            Ok(ident)
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::el;

    #[test]
    fn test_parse_compound() {
        let selector: Selector = "ul.sub-menu.open#main".parse().unwrap();
        assert_eq!(selector.parts.len(), 1);
        let part = &selector.parts[0];
        assert_eq!(part.tag.as_deref(), Some("ul"));
        assert_eq!(part.id.as_deref(), Some("main"));
        assert_eq!(part.classes, vec!["sub-menu", "open"]);
    }

    #[test]
    fn test_parse_combinators() {
        let selector: Selector = "ul.toggle-show > li  a".parse().unwrap();
        assert_eq!(selector.parts.len(), 3);
        assert_eq!(
            selector.combinators,
            vec![Combinator::Child, Combinator::Descendant]
        );
        assert_eq!(selector.to_string(), "ul.toggle-show > li a");
    }

    #[test]
    fn test_parse_list_and_scope() {
        let list: SelectorList = ":scope > a, :scope>button".parse().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.selectors()[1].parts[0].scope);
        assert_eq!(list.to_string(), ":scope > a, :scope > button");
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<SelectorList>().is_err());
        assert!("ul >".parse::<SelectorList>().is_err());
        assert!("a,,b".parse::<SelectorList>().is_err());
        assert!("a:hover".parse::<SelectorList>().is_err());
        assert!("a[href]".parse::<SelectorList>().is_err());
        assert!("#a#b".parse::<SelectorList>().is_err());
    }

    #[test]
    fn test_parse_error_names_unexpected_character() {
        let err = "a[href]".parse::<SelectorList>().unwrap_err();
        assert_eq!(err.selector, "a[href]");
        assert_eq!(err.message, "unexpected character '['");

        let err = "~li".parse::<SelectorList>().unwrap_err();
        assert_eq!(err.message, "unexpected character '~'");
    }

    #[test]
    fn test_matching() {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.mount(
            body,
            el("nav").class("nav--toggle-sub").child(
                el("ul").child(
                    el("li")
                        .class("menu-item")
                        .child(el("a").attr("href", "#"))
                        .child(el("ul").class("sub-menu").child(el("li").child(el("a")))),
                ),
            ),
        );

        let sub_menus: SelectorList = ".nav--toggle-sub ul.sub-menu".parse().unwrap();
        let found = doc.query_selector_all(nav, &sub_menus);
        assert_eq!(found.len(), 1);

        let item = doc.parent(found[0]).unwrap();
        let own_link: SelectorList = ":scope > a".parse().unwrap();
        let links = doc.query_selector_all(item, &own_link);
        assert_eq!(links.len(), 1);

        let all_links: SelectorList = "a".parse().unwrap();
        assert_eq!(doc.query_selector_all(item, &all_links).len(), 2);

        let direct: SelectorList = "nav > li".parse().unwrap();
        assert!(doc.query_selector(nav, &direct).is_none());
    }
}
