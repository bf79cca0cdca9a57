//! TUI views and rendering

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::state::{CARD_HEIGHT, TuiState};
use crate::domain::{DisplayField, FieldKind};
use crate::render::{CardViewModel, MarkerColor, MarkerViewModel};

/// Main render function; records pane areas into the state as it goes
pub fn render(state: &mut TuiState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[1]);

    render_header(state, frame, chunks[0]);
    render_list(state, frame, panes[0]);
    render_map(state, frame, panes[1]);
    render_footer(state, frame, chunks[2]);
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " IncidentMap ",
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    match state.selected() {
        Some(card) => {
            spans.push(Span::raw(" Selected: "));
            spans.push(Span::styled(
                card.title.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        None => spans.push(Span::styled(" No selection", Style::default().fg(Color::DarkGray))),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(state: &mut TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Incidents ({}) ", state.cards.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.set_list_area(inner);

    if state.cards.is_empty() {
        let empty = Paragraph::new("No incidents loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = state.visible_cards();
    for (slot, card) in state.cards.iter().skip(state.list_scroll).take(visible).enumerate() {
        let y = inner.y + slot as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(inner.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        render_card(card, frame, Rect::new(inner.x, y, inner.width, height));
    }
}

fn render_card(card: &CardViewModel, frame: &mut Frame, area: Rect) {
    let (border_style, border_type) = if card.highlighted {
        (Style::default().fg(Color::Red).add_modifier(Modifier::BOLD), BorderType::Thick)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Rounded)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", card.title),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Paragraph::new(card_lines(&card.fields)).block(block), area);
}

/// Three content lines: plain facts, emphasized figures, then sources
fn card_lines(fields: &[DisplayField]) -> Vec<Line<'static>> {
    let separator = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
    let mut facts = Vec::new();
    let mut figures = Vec::new();
    let mut links = Vec::new();

    for field in fields {
        match field.kind {
            FieldKind::Text | FieldKind::Date => {
                if !facts.is_empty() {
                    facts.push(separator());
                }
                let style = if field.kind == FieldKind::Date {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                facts.push(Span::styled(field.value.clone(), style));
            }
            FieldKind::NumericEmphasis => {
                if !figures.is_empty() {
                    figures.push(separator());
                }
                figures.push(Span::styled(format!("{}: ", field.label), Style::default().fg(Color::DarkGray)));
                figures.push(Span::styled(
                    field.value.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ));
            }
            FieldKind::Link => links.push(field.value.clone()),
        }
    }

    let links = match links.split_first() {
        Some((first, rest)) => {
            let mut spans = vec![Span::styled(
                first.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )];
            if !rest.is_empty() {
                spans.push(Span::styled(
                    format!(" (+{} more)", rest.len()),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
        None => Line::default(),
    };

    vec![Line::from(facts), Line::from(figures), links]
}

fn marker_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Blue => Color::Blue,
        MarkerColor::Red => Color::Red,
    }
}

fn render_map(state: &mut TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Map ({:.2}, {:.2}) zoom {} ",
        state.viewport.center.lat, state.viewport.center.lon, state.viewport.zoom
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.set_map_area(inner);

    let viewport = state.viewport;
    let (x_bounds, y_bounds) = viewport.bounds(inner);

    // Highlighted marker drawn last so it sits on top
    let mut markers: Vec<&MarkerViewModel> = state.markers().collect();
    markers.sort_by_key(|m| m.highlighted);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            for marker in &markers {
                ctx.draw(&Circle {
                    x: marker.coordinate.lon,
                    y: marker.coordinate.lat,
                    radius: viewport.marker_radius(inner, marker.radius),
                    color: marker_color(marker.color),
                });
            }
            for marker in markers.iter().filter(|m| m.highlighted) {
                ctx.print(
                    marker.coordinate.lon,
                    marker.coordinate.lat,
                    Span::styled(
                        format!(" {}", marker.label),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    frame.render_widget(canvas, inner);
}

fn render_footer(state: &TuiState, frame: &mut Frame, area: Rect) {
    let line = match &state.status {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(Color::Yellow))),
        None => Line::from(Span::styled(
            " click/j/k select | Esc clear | +/- zoom | PgUp/PgDn scroll | q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
