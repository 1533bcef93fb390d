use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::browse::{BrowsePage, Category, Section};
use crate::carousel::Carousel;
use crate::catalog::MediaSummary;
use crate::catalog::image::{ImageSize, image_url};

use super::widgets::{format_rating, format_year, titled_block, truncate};

/// Title, year and rating for one entry, fitted to `width` columns.
pub fn media_spans(item: &MediaSummary, width: usize) -> Vec<Span<'static>> {
    let year = format_year(item.year());
    let suffix_len = if year.is_empty() { 7 } else { year.len() + 10 };
    let title = truncate(item.title(), width.saturating_sub(suffix_len).max(4));

    let mut spans = vec![Span::raw(title)];
    if !year.is_empty() {
        spans.push(Span::styled(
            format!(" ({})", year),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(
        format!("  ★ {}", format_rating(item.vote_average())),
        Style::default().fg(Color::Yellow),
    ));
    spans
}

pub fn media_list_item(item: &MediaSummary, width: usize) -> ListItem<'static> {
    ListItem::new(Line::from(media_spans(item, width)))
}

pub fn render_tabs(frame: &mut Frame, area: Rect, current: Category, accent: Color) {
    let mut spans = vec![Span::styled(
        " BingePoint ",
        Style::default()
            .fg(Color::Black)
            .bg(accent)
            .add_modifier(Modifier::BOLD),
    )];

    for (i, category) in Category::ALL.iter().enumerate() {
        spans.push(Span::raw("  "));
        let style = if *category == current {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!("{}:{}", i + 1, category.as_display()),
            style,
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[allow(clippy::too_many_arguments)]
pub fn render_browse_view(
    frame: &mut Frame,
    area: Rect,
    category: Category,
    page: Option<&BrowsePage>,
    loading: bool,
    focus: usize,
    list_states: &mut [ListState],
    carousel: &Carousel,
    image_base_url: &str,
    accent: Color,
) {
    let Some(page) = page.filter(|p| p.visible_sections().next().is_some()) else {
        let message = if loading {
            "Loading..."
        } else {
            "Nothing to show here right now."
        };
        let empty = Paragraph::new(message)
            .block(titled_block(category.as_display(), accent))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let sections_area = if page.carousel.is_empty() {
        area
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(5)])
            .split(area);
        render_carousel(
            frame,
            chunks[0],
            &page.carousel,
            carousel,
            image_base_url,
            accent,
        );
        chunks[1]
    };

    let sections: Vec<&Section> = page.visible_sections().collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, sections.len() as u32);
            sections.len()
        ])
        .split(sections_area);

    for (i, (section, column)) in sections.iter().zip(columns.iter()).enumerate() {
        let Some(state) = list_states.get_mut(i) else {
            break;
        };
        render_section(frame, *column, section, state, i == focus, accent);
    }
}

fn render_section(
    frame: &mut Frame,
    area: Rect,
    section: &Section,
    list_state: &mut ListState,
    focused: bool,
    accent: Color,
) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = section
        .items
        .iter()
        .map(|item| media_list_item(item, width))
        .collect();

    let border = if focused { accent } else { Color::DarkGray };
    let title = format!("{} ({})", section.title, section.items.len());

    let list = List::new(items)
        .block(titled_block(&title, border))
        .highlight_style(if focused {
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}

fn render_carousel(
    frame: &mut Frame,
    area: Rect,
    items: &[MediaSummary],
    carousel: &Carousel,
    image_base_url: &str,
    accent: Color,
) {
    let Some(item) = items.get(carousel.index()) else {
        return;
    };

    let dots: Vec<Span> = (0..items.len())
        .map(|i| {
            if i == carousel.index() {
                Span::styled("● ", Style::default().fg(accent))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    let mut meta = vec![Span::styled(
        format!("★ {}", format_rating(item.vote_average())),
        Style::default().fg(Color::Yellow),
    )];
    let year = format_year(item.year());
    if !year.is_empty() {
        meta.push(Span::raw(format!("  {}", year)));
    }

    let lines = vec![
        Line::from(Span::styled(
            item.title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
        Line::from(Span::styled(
            image_url(image_base_url, item.backdrop_path(), ImageSize::Full),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            item.overview().to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(
            Block::default()
                .borders(Borders::ALL)
                .inner(area),
        );

    let title = if carousel.is_auto_playing() {
        "Trending Now"
    } else {
        "Trending Now (paused)"
    };
    frame.render_widget(titled_block(title, accent), area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        chunks[0],
    );
    frame.render_widget(Paragraph::new(Line::from(dots)), chunks[1]);
}
