use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::catalog::image::{ImageSize, image_url};
use crate::catalog::EpisodeSummary;
use crate::detail::{DetailPhase, DetailSession, Display, EpisodeState, ReadyDetail};

use super::widgets::{
    centered, format_episode_num, format_rating, format_seasons, format_year, help_bar,
    titled_block,
};

fn action_spans(key: &'static str, label: &'static str, accent: Color) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("[{}]", key),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}   ", label)),
    ]
}

fn episode_list_item(ep: &EpisodeSummary, selected: bool) -> ListItem<'static> {
    let marker = if selected { "▶" } else { " " };
    ListItem::new(Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Green)),
        Span::raw(" "),
        Span::styled(
            format_episode_num(ep.episode_number),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - "),
        Span::raw(ep.name.clone()),
    ]))
}

/// Facts line: year, runtime or season count, rating.
fn facts_line(ready: &ReadyDetail, is_series: bool) -> Line<'static> {
    let detail = &ready.detail;
    let mut parts = Vec::new();

    let year = format_year(detail.year());
    if !year.is_empty() {
        parts.push(year);
    }
    if let Some(runtime) = detail.runtime.filter(|r| *r > 0) {
        parts.push(format!("{} min", runtime));
    }
    if is_series && detail.season_count() > 0 {
        parts.push(format_seasons(detail.season_count()));
    }

    let mut spans = vec![Span::styled(
        format!("★ {}", format_rating(detail.vote_average)),
        Style::default().fg(Color::Yellow),
    )];
    for part in parts {
        spans.push(Span::styled("  •  ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(part));
    }
    Line::from(spans)
}

pub fn render_detail_view(
    frame: &mut Frame,
    session: &DetailSession,
    playback_url: Option<&str>,
    image_base_url: &str,
    status: Option<&str>,
    accent: Color,
) {
    let area = centered(frame.area(), 90, 28);
    frame.render_widget(Clear, area);

    let ready = match &session.phase {
        DetailPhase::Loading => {
            let loading = Paragraph::new("Loading details...")
                .block(titled_block(session.media_type.as_display(), accent))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, area);
            return;
        }
        DetailPhase::Failed(reason) => {
            let failed = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Could not load this title.",
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(
                    reason.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from("Esc to close"),
            ])
            .wrap(Wrap { trim: true })
            .block(titled_block(session.media_type.as_display(), accent));
            frame.render_widget(failed, area);
            return;
        }
        DetailPhase::Ready(ready) => ready,
    };

    let title = ready.detail.display_title();
    let block = titled_block(title, accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    match ready.display {
        Display::Overview => {
            render_overview(frame, chunks[0], session, ready, image_base_url, accent)
        }
        Display::PlayingMedia => {
            render_playing_media(frame, chunks[0], session, ready, playback_url, accent)
        }
        Display::PlayingTrailer => render_playing_trailer(frame, chunks[0], ready, accent),
    }

    if let Some(status) = status {
        frame.render_widget(
            Paragraph::new(status.to_string()).style(Style::default().fg(Color::Yellow)),
            chunks[1],
        );
    }

    let hints: &[(&str, &str)] = match ready.display {
        Display::Overview if ready.trailer().is_some() => {
            &[("w", "watch"), ("t", "trailer"), ("Esc", "close")]
        }
        Display::Overview => &[("w", "watch"), ("Esc", "close")],
        Display::PlayingMedia if session.is_series() => &[
            ("[/]", "season"),
            ("j/k", "episode"),
            ("r", "reload"),
            ("o", "open"),
            ("Esc", "back"),
        ],
        _ => &[("o", "open"), ("Esc", "back")],
    };
    frame.render_widget(help_bar(hints), chunks[2]);
}

fn render_overview(
    frame: &mut Frame,
    area: Rect,
    session: &DetailSession,
    ready: &ReadyDetail,
    image_base_url: &str,
    accent: Color,
) {
    let detail = &ready.detail;
    let mut lines = vec![facts_line(ready, session.is_series())];

    if !detail.genres.is_empty() {
        let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(Line::from(Span::styled(
            genres.join(", "),
            Style::default().fg(Color::Gray),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(detail.overview.clone()));
    lines.push(Line::from(""));

    let backdrop = image_url(
        image_base_url,
        detail.backdrop_path.as_deref(),
        ImageSize::Full,
    );
    let poster = image_url(
        image_base_url,
        detail.poster_path.as_deref(),
        ImageSize::Thumbnail,
    );
    lines.push(Line::from(vec![
        Span::styled("Backdrop: ", Style::default().fg(Color::DarkGray)),
        Span::raw(backdrop),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Poster:   ", Style::default().fg(Color::DarkGray)),
        Span::raw(poster),
    ]));
    lines.push(Line::from(""));

    let mut actions = action_spans("w", "Watch Now", accent);
    if ready.trailer().is_some() {
        actions.extend(action_spans("t", "Watch Trailer", accent));
    }
    lines.push(Line::from(actions));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_playing_media(
    frame: &mut Frame,
    area: Rect,
    session: &DetailSession,
    ready: &ReadyDetail,
    playback_url: Option<&str>,
    accent: Color,
) {
    let mut header = vec![Line::from(vec![
        Span::styled("Now playing: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            playback_url.unwrap_or_default().to_string(),
            Style::default().fg(accent),
        ),
    ])];

    let Some(seasons) = session.season_selector() else {
        header.push(Line::from(""));
        header.push(Line::from(action_spans("o", "Open in browser", accent)));
        frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), area);
        return;
    };

    let mut selector = vec![Span::styled("Season: ", Style::default().fg(Color::DarkGray))];
    for season in seasons {
        let style = if season.season_number == ready.selected_season {
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        selector.push(Span::styled(format!(" {} ", season.season_number), style));
        selector.push(Span::raw(" "));
    }
    header.push(Line::from(selector));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let episodes_title = format!("Season {} Episodes", ready.selected_season);
    let Some(episodes) = ready.current_episodes() else {
        let message = match ready.episodes {
            EpisodeState::Failed { .. } => "Could not load episodes. Press r to retry.",
            _ => "Loading episodes...",
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(titled_block(&episodes_title, accent)),
            chunks[1],
        );
        return;
    };

    let items: Vec<ListItem> = episodes
        .iter()
        .map(|ep| episode_list_item(ep, ep.episode_number == ready.selected_episode))
        .collect();
    let selected = episodes
        .iter()
        .position(|ep| ep.episode_number == ready.selected_episode);
    let mut state = ListState::default().with_selected(selected);

    let list = List::new(items)
        .block(titled_block(&episodes_title, accent))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_playing_trailer(frame: &mut Frame, area: Rect, ready: &ReadyDetail, accent: Color) {
    let Some(trailer) = ready.trailer() else {
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            trailer.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Trailer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(trailer.embed_url(), Style::default().fg(accent)),
        ]),
        Line::from(""),
        Line::from(action_spans("o", "Open in browser", accent)),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
