use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::catalog::{MediaSummary, MediaType};

use super::browse::media_spans;
use super::widgets::titled_block;

#[allow(clippy::too_many_arguments)]
pub fn render_search_view(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    editing: bool,
    results: &[MediaSummary],
    list_state: &mut ListState,
    is_loading: bool,
    accent: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_search_input(frame, chunks[0], query, editing, is_loading, accent);

    render_search_results(frame, chunks[1], results, list_state, is_loading, accent);
}

fn render_search_input(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    editing: bool,
    is_loading: bool,
    accent: Color,
) {
    let title = if is_loading {
        " Search movies, TV shows, anime (loading...) "
    } else {
        " Search movies, TV shows, anime "
    };

    let input = Paragraph::new(query)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(title)
                .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(input, area);

    if editing {
        let cursor = query.chars().count() as u16;
        frame.set_cursor_position((area.x + cursor + 1, area.y + 1));
    }
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    results: &[MediaSummary],
    list_state: &mut ListState,
    is_loading: bool,
    accent: Color,
) {
    if results.is_empty() {
        let message = if is_loading {
            "Searching..."
        } else {
            "No results. Type to search, Enter to submit."
        };
        let empty = Paragraph::new(message)
            .block(titled_block("Search Results", accent))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(16) as usize;

    let items: Vec<ListItem> = results
        .iter()
        .map(|r| {
            let kind = MediaType::from(r.kind()).as_display();
            let mut spans = vec![Span::styled(
                format!("{:<8}│ ", kind),
                Style::default().fg(Color::Cyan),
            )];
            spans.extend(media_spans(r, width));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(titled_block("Search Results", accent))
        .highlight_style(
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}
