//! Reusable UI widgets for mindscape
//!
//! Common UI components:
//! - Text input popup
//! - Status bar + flash messages
//! - Spinner + layout helpers

use crate::ui::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Current spinner frame, advancing with wall-clock time so it animates
/// across redraws
pub fn spinner_frame() -> &'static str {
    let idx = (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 100) as usize
        % SPINNER_FRAMES.len();
    SPINNER_FRAMES[idx]
}

/// Render a centered single-line text input popup
pub fn render_input_popup(
    frame: &mut Frame,
    title: &str,
    value: &str,
    hint: &str,
    theme: &Theme,
    area: Rect,
) {
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_area = centered_rect(popup_width, 5, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .style(theme.block_style())
        .title(format!(" {} ", title))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    frame.render_widget(block, popup_area);

    let input_area = Rect {
        x: popup_area.x + 2,
        y: popup_area.y + 1,
        width: popup_area.width.saturating_sub(4),
        height: 1,
    };
    // Keep the cursor end visible when the value outgrows the field
    let visible: String = {
        let max = input_area.width.saturating_sub(3) as usize;
        let chars: Vec<char> = value.chars().collect();
        let skip = chars.len().saturating_sub(max);
        chars[skip..].iter().collect()
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(theme.accent)),
        Span::styled(visible, theme.text()),
        Span::styled("▏", Style::default().fg(theme.accent).add_modifier(Modifier::SLOW_BLINK)),
    ]));
    frame.render_widget(input, input_area);

    let hint_area = Rect {
        x: popup_area.x + 2,
        y: popup_area.y + 3,
        width: popup_area.width.saturating_sub(4),
        height: 1,
    };
    frame.render_widget(Paragraph::new(hint).style(theme.text_dim()), hint_area);
}

/// Render a flash message into the status line
pub fn render_flash_message(
    frame: &mut Frame,
    message: &str,
    is_error: bool,
    theme: &Theme,
    area: Rect,
) {
    let style = if is_error { theme.error() } else { theme.success() };
    let prefix = if is_error { "✗ " } else { "✓ " };

    let flash = Paragraph::new(Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(message, style),
    ]));
    frame.render_widget(flash, area);
}

/// Render the status line: hints left, map stats right
pub fn render_status_bar(
    frame: &mut Frame,
    left_content: &str,
    right_content: &str,
    theme: &Theme,
    area: Rect,
) {
    frame.render_widget(Clear, area);

    let left_widget = Paragraph::new(left_content).style(theme.text_dim());

    let right_len = right_content.len() as u16;
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len + 1),
        y: area.y,
        width: right_len.min(area.width),
        height: 1,
    };
    let right_widget = Paragraph::new(right_content).style(theme.text_dim());

    frame.render_widget(left_widget, area);
    frame.render_widget(right_widget, right_area);
}

/// Helper: Create a centered rect of given size
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}
