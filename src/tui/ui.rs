use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Mode};
use crate::{
    pagination::{PageItem, PaginationControls},
    search::ListMode,
};

pub fn render(f: &mut Frame, app: &App) {
    let area = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_search_bar(f, app, chunks[0]);

    if app.mode == Mode::Detail || (app.mode == Mode::ConfirmDelete && app.detail.is_some()) {
        render_detail(f, app, chunks[1]);
    } else {
        render_list(f, app, chunks[1]);
    }

    render_footer(f, app, chunks[2]);
}

fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == Mode::Editing;
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::styled(app.input.as_str(), style)];
    if editing {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search (/ to type, Enter to submit)"),
    );
    f.render_widget(paragraph, area);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;

    let title = if state.has_query() {
        format!("Blogsite - {} result(s) for \"{}\"", state.total, state.effective_query)
    } else {
        "Blogsite - Latest Posts".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if state.loading {
        let paragraph = Paragraph::new("Loading...")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    }

    if let Some(error) = &state.error {
        let paragraph = Paragraph::new(error.as_str())
            .block(block)
            .style(Style::default().fg(Color::Red));
        f.render_widget(paragraph, area);
        return;
    }

    if state.items.is_empty() {
        let message = if state.has_query() {
            format!("No results found for \"{}\".", state.effective_query)
        } else if app.controller.mode() == ListMode::Search {
            "Type / to search posts.".to_string()
        } else {
            "There are no blog posts yet.".to_string()
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .items
        .iter()
        .enumerate()
        .map(|(idx, post)| {
            let is_selected = idx == app.selected;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let content = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", idx + 1),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(post.title.as_str(), style),
                    Span::styled(
                        format!("  {}", post.created_short()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("     {}", post.summary(70).replace('\n', " ")),
                    Style::default().fg(Color::Gray),
                )),
            ];
            ListItem::new(content)
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(post) = &app.detail else {
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("Published: {}", post.created_long()),
        Style::default().fg(Color::DarkGray),
    ))];
    if post.was_updated() {
        lines.push(Line::from(Span::styled(
            format!("Updated: {}", post.updated_long()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.extend(post.content.lines().map(|line| Line::from(line.to_string())));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(post.title.as_str()),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(paragraph, area);
}

/// Page-number strip built from the pagination window.
pub fn pagination_spans(controls: &PaginationControls) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw("« ")];
    for item in &controls.items {
        match item {
            PageItem::Page(n) if controls.is_current(n) => spans.push(Span::styled(
                format!("[{}]", n),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(n) => spans.push(Span::raw(format!(" {} ", n))),
            PageItem::Ellipsis => spans.push(Span::raw(" … ")),
        }
    }
    spans.push(Span::raw(" »"));
    spans
}

fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::raw(label),
    ]
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    match app.mode {
        Mode::ConfirmDelete => {
            spans.push(Span::styled(
                "Delete this post? ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
            spans.extend(key_hint("y", " yes | "));
            spans.extend(key_hint("any other key", " cancel"));
        }
        Mode::Editing => {
            spans.extend(key_hint("Enter", " submit | "));
            spans.extend(key_hint("Esc", " done"));
        }
        Mode::Detail => {
            spans.extend(key_hint("↑/k ↓/j", " scroll | "));
            spans.extend(key_hint("d", " delete | "));
            spans.extend(key_hint("Esc", " back"));
        }
        Mode::Browse => {
            if let Some(controls) = app.state.controls() {
                spans.extend(pagination_spans(&controls));
                spans.push(Span::raw(" | "));
            }
            spans.extend(key_hint("↑↓", " select | "));
            spans.extend(key_hint("←→", " page | "));
            spans.extend(key_hint("Enter", " view | "));
            spans.extend(key_hint("d", " delete | "));
            spans.extend(key_hint("q", " quit"));
        }
    }

    if let Some(status) = &app.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Green),
        ));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White));

    f.render_widget(footer, area);
}
