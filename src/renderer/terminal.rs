//! Terminal presenter - Paint an in-memory display tree with crossterm.
//!
//! The in-memory host has no pixels. This presenter turns a subtree into an
//! indented outline and writes it to a terminal in one synchronized flush:
//!
//! ```text
//! <div id="app">
//!   <h1 class="title">
//!     "Tasks"
//!   <input class="input"> [abc]
//! ```
//!
//! [`present`] installs a spark-signals effect on a store's revision signal,
//! so the screen is repainted after every completed pass.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::queue;
use spark_signals::{effect, Signal};

use crate::host::{Host, MemoryHost, NodeId};

/// Cleanup function returned by [`present`].
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Outline
// =============================================================================

/// One painted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub depth: usize,
    pub text: String,
    /// Element rows are drawn bold.
    pub is_element: bool,
}

/// Flatten a subtree into rows, depth-first.
///
/// Elements show their attributes; elements holding a live value show it in
/// brackets. Handlers are not shown.
pub fn outline(host: &MemoryHost, node: NodeId) -> Vec<OutlineLine> {
    let mut lines = Vec::new();
    collect_outline(host, node, 0, &mut lines);
    lines
}

fn collect_outline(host: &MemoryHost, node: NodeId, depth: usize, lines: &mut Vec<OutlineLine>) {
    if let Some(text) = host.text(node) {
        lines.push(OutlineLine {
            depth,
            text: format!("{text:?}"),
            is_element: false,
        });
        return;
    }

    let Some(name) = host.node_name(node) else { return };
    let mut text = format!("<{name}");
    for attr in host.attribute_names(node) {
        if attr == "value" {
            continue;
        }
        let value = host.attribute(node, attr).unwrap_or_default();
        text.push_str(&format!(" {attr}=\"{value}\""));
    }
    text.push('>');
    if let Some(value) = host.value(node) {
        text.push_str(&format!(" [{value}]"));
    }
    lines.push(OutlineLine {
        depth,
        text,
        is_element: true,
    });

    for child in host.children(&node) {
        collect_outline(host, child, depth + 1, lines);
    }
}

/// Terminal row for an outline index, pinned to the last addressable row.
fn screen_row(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

// =============================================================================
// Terminal Renderer
// =============================================================================

/// Writes outlines to a terminal.
///
/// Frames are wrapped in a synchronized update and flushed with a single
/// write, so a partially drawn frame is never visible.
pub struct TerminalRenderer<W: Write> {
    out: W,
    indent: usize,
    frames: u64,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer on stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent: 2,
            frames: 0,
        }
    }

    /// Spaces per depth level (default 2).
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Clear the screen and paint `node`'s subtree, with an optional footer
    /// line (key help, status) below it.
    pub fn paint(&mut self, host: &MemoryHost, node: NodeId, footer: Option<&str>) -> io::Result<()> {
        let lines = outline(host, node);

        queue!(self.out, BeginSynchronizedUpdate, MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in lines.iter().enumerate() {
            let pad = " ".repeat(line.depth * self.indent);
            queue!(self.out, MoveTo(0, screen_row(row)), Print(pad))?;
            if line.is_element {
                queue!(
                    self.out,
                    SetAttribute(Attribute::Bold),
                    Print(&line.text),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(self.out, Print(&line.text))?;
            }
        }
        if let Some(footer) = footer {
            let row = screen_row(lines.len()).saturating_add(1);
            queue!(
                self.out,
                MoveTo(0, row),
                SetAttribute(Attribute::Dim),
                Print(footer),
                SetAttribute(Attribute::Reset)
            )?;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.frames += 1;
        Ok(())
    }

    /// Frames painted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// =============================================================================
// Present
// =============================================================================

/// Repaint `root` whenever `revision` changes.
///
/// The effect reads the revision (creating the dependency), then paints.
/// Paint errors are logged and the next revision tries again.
pub fn present<W: Write + 'static>(
    revision: Signal<u64>,
    host: Rc<RefCell<MemoryHost>>,
    root: NodeId,
    renderer: TerminalRenderer<W>,
    footer: Option<String>,
) -> Cleanup {
    let mut renderer = renderer;
    let stop = effect(move || {
        let rev = revision.get();
        let host = host.borrow();
        if let Err(err) = renderer.paint(&host, root, footer.as_deref()) {
            tracing::error!(revision = rev, %err, "terminal paint failed");
        }
    });
    Box::new(stop)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::VNode;
    use crate::renderer::materialize;

    fn sample() -> (MemoryHost, NodeId) {
        let mut host = MemoryHost::new();
        let root = host.mount_point("app");
        let tree = VNode::new("div")
            .child(VNode::new("h1").attr("class", "title").child("Tasks"))
            .child(VNode::new("input").attr("class", "input").attr("value", "abc"));
        let node = materialize(&mut host, &tree.into());
        host.append_child(&root, &node);
        (host, root)
    }

    #[test]
    fn test_outline_rows() {
        let (host, root) = sample();
        let lines = outline(&host, root);
        let rows: Vec<_> = lines.iter().map(|l| (l.depth, l.text.as_str())).collect();
        assert_eq!(
            rows,
            vec![
                (0, "<div id=\"app\">"),
                (1, "<div>"),
                (2, "<h1 class=\"title\">"),
                (3, "\"Tasks\""),
                (2, "<input class=\"input\"> [abc]"),
            ]
        );
    }

    #[test]
    fn test_paint_writes_once_per_frame() {
        let (host, root) = sample();
        let mut renderer = TerminalRenderer::new(Vec::new()).with_indent(4);

        renderer.paint(&host, root, Some("esc: quit")).unwrap();
        renderer.paint(&host, root, None).unwrap();

        assert_eq!(renderer.frames(), 2);
        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(written.contains("<h1 class=\"title\">"));
        assert!(written.contains("esc: quit"));
    }

    #[test]
    fn test_screen_row_saturates() {
        assert_eq!(screen_row(3), 3);
        assert_eq!(screen_row(usize::from(u16::MAX) + 10), u16::MAX);
        assert_eq!(screen_row(usize::MAX).saturating_add(1), u16::MAX);
    }
}
