//! Main rendering module for mindscape
//!
//! Renders the complete UI:
//! - Mind map canvas (left)
//! - Node panel + assistant panel (right)
//! - Status line with flash messages (bottom)
//! - Topic input + help overlays

use crate::app::App;
use crate::map::render as scene;
use crate::map::{InputFocus, CELL_UNITS_X};
use crate::ui::theme::node_color;
use crate::ui::widgets;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::canvas::{Canvas as CanvasWidget, Line as CanvasLine, Rectangle},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 38;

/// Entry point for all UI rendering
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Fill entire background
    frame.render_widget(Block::default().style(app.theme.block_style()), area);

    let vertical = Layout::vertical([
        Constraint::Min(8),    // map + sidebar
        Constraint::Length(1), // status line
    ])
    .split(area);

    let horizontal = Layout::horizontal([
        Constraint::Min(30), // map canvas
        Constraint::Length(SIDEBAR_WIDTH),
    ])
    .split(vertical[0]);

    render_map(frame, app, horizontal[0]);
    render_sidebar(frame, app, horizontal[1]);
    render_status_line(frame, app, vertical[1]);

    // Overlays
    if app.workspace.input == InputFocus::Topic {
        widgets::render_input_popup(
            frame,
            "New Mind Map",
            &app.workspace.topic_input,
            "Enter: generate    Esc: cancel",
            &app.theme,
            area,
        );
    }
    if app.show_help {
        render_help(frame, app, area);
    }
}

/// The map itself, drawn on a braille canvas in document coordinates.
/// The widget's y axis points up, the document's points down, so every
/// y is flipped against the canvas height.
fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .style(app.theme.block_style())
        .title(format!(" {} ", app.workspace.map.name()))
        .title_style(app.theme.title())
        .borders(Borders::ALL)
        .border_style(app.theme.border());
    let inner = block.inner(area);

    // The mouse handler maps cells back through this rect
    app.workspace.map_area = Some(inner);

    let theme = &app.theme;
    let ws = &app.workspace;
    let doc = ws.map.canvas();
    let selected = ws.selected.as_deref();

    let widget = CanvasWidget::default()
        .block(block)
        .background_color(theme.bg)
        .x_bounds([0.0, doc.width])
        .y_bounds([0.0, doc.height])
        .paint(|ctx| {
            for edge in scene::edge_lines(&ws.map) {
                ctx.draw(&CanvasLine {
                    x1: edge.from.x,
                    y1: doc.height - edge.from.y,
                    x2: edge.to.x,
                    y2: doc.height - edge.to.y,
                    color: theme.fg_dim,
                });
            }
            ctx.layer();
            for b in scene::node_boxes(&ws.map) {
                let color = if selected == Some(b.key.as_str()) {
                    theme.accent
                } else {
                    node_color(b.color)
                };
                ctx.draw(&Rectangle {
                    x: b.position.x,
                    y: doc.height - b.position.y - b.height,
                    width: b.width,
                    height: b.height,
                    color,
                });
            }
            ctx.layer();
            for b in scene::node_boxes(&ws.map) {
                let max_chars = ((b.width / CELL_UNITS_X) as usize).saturating_sub(2).max(4);
                let mut label = scene::truncate_label(&b.key, max_chars);
                if ws.is_expanding(&b.key) {
                    label = format!("{} {}", label, widgets::spinner_frame());
                }
                let style = if selected == Some(b.key.as_str()) {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(node_color(b.color)).add_modifier(Modifier::BOLD)
                };
                let anchor = b.anchor();
                let text_width = label.chars().count() as f64 * CELL_UNITS_X;
                ctx.print(
                    anchor.x - text_width / 2.0,
                    doc.height - anchor.y,
                    Line::styled(label, style),
                );
            }
        });

    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let vertical = Layout::vertical([
        Constraint::Length(10), // node panel
        Constraint::Min(4),     // assistant panel
    ])
    .split(area);

    render_node_panel(frame, app, vertical[0]);
    render_assistant_panel(frame, app, vertical[1]);
}

fn render_node_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let ws = &app.workspace;

    let border = if ws.selected.is_some() {
        theme.border_focused()
    } else {
        theme.border()
    };
    let block = Block::default()
        .style(theme.block_style())
        .title(" Node ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    match ws.selected.as_deref().and_then(|sel| ws.map.get(sel)) {
        Some(node) => {
            lines.push(Line::styled(
                node.key.clone(),
                Style::default()
                    .fg(node_color(node.color))
                    .bg(theme.bg)
                    .add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::raw(""));
            let tier = match node.tier() {
                crate::types::Tier::Root => "root",
                crate::types::Tier::Concept => "concept",
            };
            lines.push(Line::styled(format!("Id        {}", node.id), theme.text()));
            lines.push(Line::styled(format!("Tier      {}", tier), theme.text()));
            lines.push(Line::styled(
                format!("Parent    {}", node.parent_key.as_deref().unwrap_or("(none)")),
                theme.text(),
            ));
            lines.push(Line::styled(
                format!("Children  {}", node.child_keys.len()),
                theme.text(),
            ));
            if ws.is_expanding(&node.key) {
                lines.push(Line::styled(
                    format!("{} expanding", widgets::spinner_frame()),
                    theme.warning(),
                ));
            } else {
                lines.push(Line::raw(""));
            }
            lines.push(Line::styled("e expand  d delete  c chat", theme.text_dim()));
        }
        None => {
            lines.push(Line::styled("No node selected", theme.text_dim()));
            lines.push(Line::raw(""));
            lines.push(Line::styled("Click a node or press Tab.", theme.text_dim()));
            lines.push(Line::styled("g starts a fresh map.", theme.text_dim()));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_assistant_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let ws = &app.workspace;

    let border = if ws.input == InputFocus::Chat {
        theme.border_focused()
    } else {
        theme.border()
    };
    let block = Block::default()
        .style(theme.block_style())
        .title(" Assistant ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    match ws.selected.as_deref() {
        None => {
            lines.push(Line::styled("Select a node to ask about it.", theme.text_dim()));
        }
        Some(sel) => {
            lines.push(Line::from(vec![
                Span::styled("About ", theme.text_dim()),
                Span::styled(sel.to_string(), theme.title()),
            ]));
            lines.push(Line::raw(""));
            for msg in &ws.chat_log {
                let (tag, style) = if msg.from_user {
                    ("You ", Style::default().fg(theme.accent).bg(theme.bg))
                } else {
                    ("AI  ", theme.success())
                };
                lines.push(Line::from(vec![
                    Span::styled(tag, style.add_modifier(Modifier::BOLD)),
                    Span::styled(msg.text.clone(), theme.text()),
                ]));
            }
            if ws.chat_waiting() {
                lines.push(Line::styled(
                    format!("{} thinking", widgets::spinner_frame()),
                    theme.warning(),
                ));
            }
            if ws.input == InputFocus::Chat {
                lines.push(Line::raw(""));
                lines.push(Line::from(vec![
                    Span::styled("> ", Style::default().fg(theme.accent_dim).bg(theme.bg)),
                    Span::styled(ws.chat_input.clone(), theme.text()),
                    Span::styled("▏", Style::default().fg(theme.accent_dim).bg(theme.bg)),
                ]));
            } else if ws.chat_log.is_empty() && !ws.chat_waiting() {
                lines.push(Line::styled("c to ask about this node.", theme.text_dim()));
            }
        }
    }

    // Keep the newest lines in view
    let skip = lines.len().saturating_sub(inner.height as usize);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), inner);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let ws = &app.workspace;

    if let Some(flash) = &ws.flash_message {
        widgets::render_flash_message(frame, &flash.text, flash.is_error, theme, area);
        return;
    }

    let left = match ws.generation_topic() {
        Some(topic) => format!("{} Mapping \"{}\"", widgets::spinner_frame(), topic),
        None => {
            "g map  e expand  c chat  d delete  s save  x export  t theme  ? help  q quit"
                .to_string()
        }
    };
    let right = format!("{} nodes", ws.map.len());
    widgets::render_status_bar(frame, &left, &right, theme, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup = widgets::centered_rect(48, 20, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .style(theme.block_style())
        .title(" Help ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let key = |k: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!(" {:<12}", k), theme.selected()),
            Span::styled(format!(" {}", desc), theme.text()),
        ])
    };

    let lines = vec![
        key("g", "Generate a map from a topic"),
        key("e", "Expand the selected node"),
        key("c", "Chat about the selected node"),
        key("d / Del", "Delete node and subtree"),
        key("Tab / arrows", "Cycle node selection"),
        key("s", "Save map as JSON"),
        key("x", "Export map as PNG"),
        key("t", "Cycle theme"),
        key("q", "Quit"),
        Line::raw(""),
        key("Drag", "Move a node"),
        key("Click", "Select a node"),
        key("Shift+Click", "Delete a node"),
        key("Right-Click", "Expand a node"),
        Line::raw(""),
        Line::styled(" Any key closes this overlay.", theme.text_dim()),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}
