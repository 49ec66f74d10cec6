//! Rendered element tree for the mock UI.
//!
//! Nodes are stored in document (pre-)order, so index order is document
//! order and a subtree is a contiguous run after its root.

use crate::driver::ElementHandle;
use crate::locator::{name_matches, text_matches, Role, Selector};

/// What clicking a node does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Click {
    Login,
    Logout,
    OpenForm,
    CloseForm,
    CreateBlog,
    ToggleDetails(u64),
    Like(u64),
    Remove(u64),
}

/// One rendered element
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Stable key, survives re-renders while the element stays on the page
    pub key: String,
    pub tag: &'static str,
    pub role: Option<Role>,
    /// Text directly inside this element
    pub text: String,
    pub test_id: Option<&'static str>,
    pub classes: Vec<&'static str>,
    pub parent: Option<usize>,
    /// Own visibility; effective visibility also needs every ancestor visible
    pub shown: bool,
    pub click: Option<Click>,
    /// Form field bound to this input
    pub field: Option<&'static str>,
}

impl Node {
    pub fn new(key: impl Into<String>, tag: &'static str) -> Self {
        let role = match tag {
            "button" => Some(Role::Button),
            "input" => Some(Role::Textbox),
            "h2" => Some(Role::Heading),
            "a" => Some(Role::Link),
            _ => None,
        };
        Self {
            key: key.into(),
            tag,
            role,
            text: String::new(),
            test_id: None,
            classes: Vec::new(),
            parent: None,
            shown: true,
            click: None,
            field: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    pub fn input(mut self, test_id: &'static str) -> Self {
        self.test_id = Some(test_id);
        self.field = Some(test_id);
        self
    }

    pub fn on_click(mut self, click: Click) -> Self {
        self.click = Some(click);
        self
    }

    pub fn shown(mut self, shown: bool) -> Self {
        self.shown = shown;
        self
    }
}

/// Rendered page
#[derive(Debug, Clone, Default)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    visible: Vec<bool>,
    /// Last index of each node's subtree
    subtree_end: Vec<usize>,
}

impl Dom {
    /// Start a document with a root `body`
    pub fn new() -> Self {
        let mut dom = Self::default();
        dom.push(None, Node::new("body", "body"));
        dom
    }

    /// Root element
    pub const fn root() -> usize {
        0
    }

    /// Append `node` as the last child of `parent`; children must be pushed
    /// right after their parent's earlier children to keep pre-order
    pub fn push(&mut self, parent: Option<usize>, mut node: Node) -> usize {
        let index = self.nodes.len();
        node.parent = parent;
        let visible = node.shown && parent.map_or(true, |p| self.visible[p]);
        self.nodes.push(node);
        self.visible.push(visible);
        self.subtree_end.push(index);
        let mut ancestor = parent;
        while let Some(a) = ancestor {
            self.subtree_end[a] = index;
            ancestor = self.nodes[a].parent;
        }
        index
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn find_key(&self, key: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible[index]
    }

    /// Text of the element and its descendants, space separated
    pub fn text_content(&self, index: usize) -> String {
        (index..=self.subtree_end[index])
            .map(|i| self.nodes[i].text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn matches(&self, index: usize, selector: &Selector) -> bool {
        let node = &self.nodes[index];
        match selector {
            Selector::Text(text) => !node.text.is_empty() && text_matches(&node.text, text),
            Selector::Role { role, name } => {
                node.role == Some(*role) && name_matches(&self.accessible_name(index), name)
            }
            Selector::TestId(id) => node.test_id.is_some_and(|t| t == id.as_str()),
            Selector::Css(css) => match css.strip_prefix('.') {
                Some(class) => node.classes.iter().any(|c| *c == class),
                None => node.tag == css.as_str(),
            },
            Selector::Parent => false,
        }
    }

    fn accessible_name(&self, index: usize) -> String {
        let node = &self.nodes[index];
        if node.field.is_some() {
            node.test_id.unwrap_or_default().to_string()
        } else {
            self.text_content(index)
        }
    }

    /// Resolve a selector chain to node indices in document order
    pub fn query(&self, steps: &[Selector]) -> Vec<usize> {
        let mut current = vec![Self::root()];
        for step in steps {
            let mut next: Vec<usize> = Vec::new();
            for &root in &current {
                if *step == Selector::Parent {
                    next.extend(self.nodes[root].parent);
                    continue;
                }
                next.extend((root..=self.subtree_end[root]).filter(|&i| self.matches(i, step)));
            }
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        current
    }

    /// Element handle for a node
    pub fn handle(&self, index: usize) -> ElementHandle {
        let node = &self.nodes[index];
        ElementHandle::new(node.key.clone(), node.tag)
            .with_text(self.text_content(index))
            .with_visible(self.is_visible(index))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Locator;

    fn sample() -> Dom {
        let mut dom = Dom::new();
        let root = Dom::root();
        for (id, title) in [(1, "first blog"), (2, "second blog")] {
            let entry = dom.push(Some(root), Node::new(format!("blog-{id}"), "div").class("blog"));
            dom.push(
                Some(entry),
                Node::new(format!("blog-{id}-title"), "span").text(format!("{title} Ann")),
            );
            dom.push(
                Some(entry),
                Node::new(format!("blog-{id}-toggle"), "button")
                    .text("view")
                    .on_click(Click::ToggleDetails(id)),
            );
            let hidden = dom.push(
                Some(entry),
                Node::new(format!("blog-{id}-details"), "div").shown(false),
            );
            dom.push(
                Some(hidden),
                Node::new(format!("blog-{id}-like"), "button").text("like"),
            );
        }
        dom
    }

    #[test]
    fn test_text_then_parent_then_role() {
        let dom = sample();
        let loc = Locator::text("second blog")
            .parent()
            .get_by_role(Role::Button, "view");
        let found = dom.query(loc.steps());
        assert_eq!(found.len(), 1);
        assert_eq!(dom.node(found[0]).key, "blog-2-toggle");
    }

    #[test]
    fn test_page_level_role_is_not_strict() {
        let dom = sample();
        let found = dom.query(Locator::role(Role::Button, "view").steps());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let dom = sample();
        let found = dom.query(Locator::role(Role::Button, "like").steps());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|&i| !dom.is_visible(i)));
    }

    #[test]
    fn test_css_class_and_text_content() {
        let dom = sample();
        let found = dom.query(Locator::css(".blog").steps());
        let texts: Vec<String> = found.iter().map(|&i| dom.text_content(i)).collect();
        assert_eq!(texts, vec!["first blog Ann view like", "second blog Ann view like"]);
        assert_eq!(dom.handle(found[0]).tag_name, "div");
    }

    #[test]
    fn test_text_matches_own_text_only() {
        let dom = sample();
        let found = dom.query(Locator::text("first blog").steps());
        assert_eq!(found.len(), 1);
        assert_eq!(dom.node(found[0]).tag, "span");
    }
}
