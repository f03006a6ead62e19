//! Snapshot rendering helpers.
//!
//! Turns the headless backend's widget tree into indented plain text for
//! snapshot tests and debugging. One widget per line:
//!
//! ```text
//! Container 32x40
//!   Text 16x15 @(8,0) "ab"
//!   Button 48x23 @(0,25) "Go" disabled
//! ```

use std::fmt::Write;

use crate::backend::{HeadlessBackend, HeadlessWidget, WidgetId};
use crate::geometry::Offset;

/// Render the subtree rooted at `root`.
///
/// Each line holds the widget kind, its committed size, its position within
/// its parent (omitted for `root`), and its content: text or label in quotes,
/// a toggle's state, a rectangle's color. Disabled widgets are marked.
/// Destroyed widgets are skipped.
pub fn widget_tree_to_string(backend: &HeadlessBackend, root: WidgetId) -> String {
    let mut out = String::new();
    write_widget(backend, root, None, 0, &mut out);
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

fn write_widget(backend: &HeadlessBackend, id: WidgetId, position: Option<Offset>, depth: usize, out: &mut String) {
    let Some(widget) = backend.widget(id) else {
        return;
    };
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), describe(&widget, position));
    for (index, child) in widget.children.iter().enumerate() {
        let position = widget.positions.get(index).copied().unwrap_or(Offset::ZERO);
        write_widget(backend, *child, Some(position), depth + 1, out);
    }
}

/// The one-line description of a widget, without indentation.
pub fn describe(widget: &HeadlessWidget, position: Option<Offset>) -> String {
    let mut line = format!("{:?} {}x{}", widget.kind, widget.size.width, widget.size.height);
    if let Some(position) = position {
        let _ = write!(line, " @({},{})", position.x, position.y);
    }
    if let Some(text) = &widget.text {
        let _ = write!(line, " {text:?}");
    }
    if let Some(is_on) = widget.is_on {
        line.push_str(if is_on { " [on]" } else { " [off]" });
    }
    if let Some(color) = widget.color {
        let _ = write!(line, " #{:02x}{:02x}{:02x}", color.r, color.g, color.b);
        if color.a != 255 {
            let _ = write!(line, "{:02x}", color.a);
        }
    }
    if !widget.is_enabled() {
        line.push_str(" disabled");
    }
    line
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::environment::{Color, Environment};
    use crate::geometry::ProposedSize;
    use crate::graph::ViewGraph;
    use crate::view::ViewExt;
    use crate::views::{Rectangle, Text, VStack};

    #[test]
    fn renders_nested_widgets_with_positions() {
        let backend = Rc::new(HeadlessBackend::new());
        let root = VStack::new(vec![
            Text::new("ab").boxed(),
            Rectangle::new(Color::RED).frame(20, 5).boxed(),
        ]);
        let mut graph = ViewGraph::new(root, backend.clone(), Environment::new());
        graph.compute_layout(ProposedSize::new(100, 100));

        let dump = widget_tree_to_string(&backend, graph.root_widget());

        insta::assert_snapshot!(dump, @r###"
        Container 20x30
          Text 16x15 @(2,0) "ab"
          Container 20x5 @(0,25)
            Rectangle 20x5 @(0,0) #ff0000
        "###);
    }

    #[test]
    fn destroyed_root_renders_empty() {
        let backend = Rc::new(HeadlessBackend::new());
        let mut graph = ViewGraph::new(Text::new("gone"), backend.clone(), Environment::new());
        let root = graph.root_widget();
        graph.teardown();
        assert_eq!(widget_tree_to_string(&backend, root), "");
    }
}
