use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::tui::app::{Screen, TuiApp};

pub const EMPTY_LIST: &str = "No data found";

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    match app.screen {
        Screen::List => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Search bar
                    Constraint::Length(3), // Site chips
                    Constraint::Min(5),    // Articles
                    Constraint::Length(1), // Status bar
                ])
                .split(frame.area());

            render_search_bar(frame, app, chunks[0], colors);
            render_chips(frame, app, chunks[1], colors);
            render_articles(frame, app, chunks[2], colors);
            render_status_bar(frame, app, chunks[3], colors);
        }
        Screen::Detail => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(1)])
                .split(frame.area());

            render_detail(frame, app, chunks[0], colors);
            render_status_bar(frame, app, chunks[1], colors);
        }
        Screen::Preferences => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            render_preference_filter(frame, app, chunks[0], colors);
            render_preference_list(frame, app, chunks[1], colors);
            render_status_bar(frame, app, chunks[2], colors);
        }
    }
}

fn border(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn highlight(colors: &ColorConfig) -> Style {
    Style::default()
        .bg(colors.selection_bg)
        .fg(colors.selection_fg)
        .add_modifier(Modifier::BOLD)
}

fn render_search_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let text = if app.editing_search {
        format!("{}_", app.search)
    } else {
        app.search.clone()
    };

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(border(app.editing_search, colors));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_chips(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let mut spans = Vec::new();
    for (index, site) in app.sites.iter().enumerate() {
        let mut style = if app.selected_chip == Some(index) {
            Style::default()
                .bg(colors.chip_selected_bg)
                .fg(colors.chip_selected_fg)
        } else {
            Style::default().fg(colors.chip_fg)
        };
        if index == app.chip_index {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {} ", site), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .title(" Sites ")
        .borders(Borders::ALL)
        .border_style(border(false, colors));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_articles(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let title = match app.pagination.count() {
        Some(count) => format!(" Articles [{}/{}] ", app.items().len(), count),
        None => format!(" Articles [{}] ", app.items().len()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border(!app.editing_search, colors));

    if app.items().is_empty() && !app.is_loading() {
        frame.render_widget(Paragraph::new(EMPTY_LIST).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .items()
        .iter()
        .map(|article| {
            let date = article.published_label().unwrap_or_default();
            ListItem::new(vec![
                Line::from(Span::styled(
                    article.display_title().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(
                        article.display_site().to_string(),
                        Style::default().fg(colors.metadata_site),
                    ),
                    Span::raw("  "),
                    Span::styled(date, Style::default().fg(colors.metadata_date)),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight(colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(detail) = &app.detail else {
        return;
    };

    let title = format!(
        " Article {} [{}/{}] ",
        detail.pager.current_id(),
        detail.pager.page() + 1,
        detail.pager.page_count()
    );

    let content = match &detail.article {
        Some(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.display_title().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    article.display_site().to_string(),
                    Style::default().fg(colors.metadata_site),
                )),
            ];
            if let Some(date) = article.published_label() {
                lines.push(Line::from(Span::styled(
                    date,
                    Style::default().fg(colors.metadata_date),
                )));
            }
            if let Some(url) = &article.url {
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(colors.metadata_link),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(
                "─".repeat(area.width.saturating_sub(2) as usize),
            ));
            lines.push(Line::from(""));
            for line in article.display_summary().lines() {
                lines.push(Line::from(line.to_string()));
            }
            Text::from(lines)
        }
        None => Text::from(detail.message.clone().unwrap_or_default()),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border(true, colors));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_preference_filter(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(view) = &app.preferences else {
        return;
    };
    let text = if view.editing {
        format!("{}_", view.filter)
    } else {
        view.filter.clone()
    };

    let block = Block::default()
        .title(" Filter sites ")
        .borders(Borders::ALL)
        .border_style(border(view.editing, colors));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_preference_list(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(view) = app.preferences.as_mut() else {
        return;
    };

    let block = Block::default()
        .title(" Preferred news site ")
        .borders(Borders::ALL)
        .border_style(border(!view.editing, colors));

    let visible = view.visible();
    if visible.is_empty() {
        frame.render_widget(Paragraph::new(EMPTY_LIST).block(block), area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|site| {
            let marker = if view.selected.as_deref() == Some(*site) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(format!("{} {}", marker, site))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight(colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut view.list_state);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let base = Style::default().fg(colors.status_fg).bg(colors.status_bg);

    let (status, style) = if let Some(toast) = app.toast_message() {
        (toast.to_string(), base.fg(colors.toast_fg))
    } else if app.is_loading() {
        ("Loading...".to_string(), base)
    } else if let Some(ref msg) = app.status_message {
        (msg.clone(), base)
    } else {
        (help_text(app).to_string(), base)
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

fn help_text(app: &TuiApp) -> &'static str {
    match app.screen {
        Screen::List if app.editing_search => "Type to search  Enter/Esc:Done",
        Screen::List => {
            "j/k:Nav  n/p:Page  /:Search  [/]:Chip  Space:Toggle  Enter:Open  P:Sites  R:Refresh  q:Quit"
        }
        Screen::Detail => "h/l:Swipe  j/k:Scroll  o:Browser  Esc:Back  q:Quit",
        Screen::Preferences => "/:Filter  j/k:Nav  Space:Toggle  c:Confirm  Esc:Back",
    }
}
