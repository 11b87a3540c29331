use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    Root,
    core::{
        error::{Error, Result},
        focus::FocusType,
        id::NodeId,
    },
    geom::Rect,
};

/// Traverses the Root's tree and returns a string showing each node's name,
/// state, focus channels and geometry. This is a debug function.
pub fn dump(root: &Root) -> Result<String> {
    let mut buffer = Buffer::ansi();
    match root.child() {
        Some(c) => dump_node(&mut buffer, root, c, 0)?,
        None => writeln!(buffer, "<empty>")?,
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`], without color codes.
pub fn dump_plain(root: &Root) -> Result<String> {
    let mut buffer = Buffer::no_color();
    match root.child() {
        Some(c) => dump_node(&mut buffer, root, c, 0)?,
        None => writeln!(buffer, "<empty>")?,
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Format a rectangle compactly.
fn fmt_rect(r: Rect) -> String {
    format!("x: {}, y: {}, w: {}, h: {}", r.x, r.y, r.w, r.h)
}

/// Helper to write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(buffer: &mut Buffer, root: &Root, id: NodeId, level: usize) -> Result<()> {
    let node = root.node(id).ok_or(Error::NodeNotFound(id))?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.name())?;
    buffer.reset()?;
    write!(buffer, " {id:?}")?;
    if let Some(name) = node.id() {
        write!(buffer, " #{name}")?;
    }

    let mut indicators: Vec<(String, Color)> = FocusType::ALL
        .into_iter()
        .filter(|ty| root.focus(*ty) == Some(id))
        .map(|ty| (format!("{ty} focus"), Color::Magenta))
        .collect();
    if !node.is_enabled() {
        indicators.push(("disabled".into(), Color::Yellow));
    } else if !node.is_active() {
        indicators.push(("inactive".into(), Color::Yellow));
    }
    if node.is_layout_dirty() {
        indicators.push(("layout-dirty".into(), Color::Red));
    }
    for (i, (label, color)) in indicators.iter().enumerate() {
        write!(buffer, "{}", if i == 0 { " " } else { ", " })?;
        buffer.set_color(ColorSpec::new().set_fg(Some(*color)))?;
        write!(buffer, "{label}")?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    write_field(buffer, &indent, "bounds:", &fmt_rect(node.bounds()))?;
    if let Some(vid) = node.owned_viewport()
        && let Some(vp) = root.viewport(vid)
    {
        let kind = if vp.is_surface_backed() {
            "surface"
        } else {
            "clipped"
        };
        write_field(
            buffer,
            &indent,
            "viewport:",
            &format!(
                "{kind}, rect {}, offset ({}, {})",
                fmt_rect(vp.rect()),
                vp.offset().x,
                vp.offset().y
            ),
        )?;
    }

    for child in node.children() {
        dump_node(buffer, root, *child, level + 1)?;
    }
    Ok(())
}
