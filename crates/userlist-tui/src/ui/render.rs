use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use userlist_core::{Card, Notice, ViewState};

use crate::app::{App, AppState};

use super::styles;

/// Rows a card occupies, borders included.
pub const CARD_HEIGHT: u16 = 7;

/// Terminal widths at which the grid goes to three and two columns.
const WIDE_MIN_WIDTH: u16 = 110;
const MEDIUM_MIN_WIDTH: u16 = 80;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if let Some(notice) = app.controller.mount().notice() {
        render_notice(frame, notice, chunks[1]);
    }

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

/// Grid columns for a given width.
pub fn columns_for_width(width: u16) -> usize {
    if width >= WIDE_MIN_WIDTH {
        3
    } else if width >= MEDIUM_MIN_WIDTH {
        2
    } else {
        1
    }
}

/// First visible row such that `selected_row` is on screen.
pub fn scroll_offset(selected_row: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return 0;
    }
    selected_row.saturating_sub(visible_rows - 1)
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  {}", app.controller.mount().title().unwrap_or("userlist"));
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let mount = app.controller.mount();

    let block = Block::default()
        .title(format!(" Users ({}) ", mount.card_count()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let reload_height = if mount.reload_visible() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(reload_height)])
        .split(inner);

    if mount.card_count() == 0 {
        render_placeholder(frame, app, chunks[0]);
    } else {
        render_card_grid(frame, app, chunks[0]);
    }

    if mount.reload_visible() {
        render_reload_button(frame, chunks[1]);
    }
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.controller.view() {
        ViewState::Loading => "Loading users...",
        ViewState::Errored => "Users are unavailable right now",
        ViewState::Empty | ViewState::Loaded(_) => "No users to show",
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_card_grid(frame: &mut Frame, app: &App, area: Rect) {
    let cards = app.controller.mount().cards();
    let columns = columns_for_width(area.width);
    let visible_rows = ((area.height / CARD_HEIGHT) as usize).max(1);
    let offset = scroll_offset(app.selection / columns, visible_rows);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (r, row_area) in row_areas.iter().enumerate() {
        let row = offset + r;
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (c, col_area) in col_areas.iter().enumerate() {
            let index = row * columns + c;
            if let Some(card) = cards.get(index) {
                render_card(frame, card, *col_area, index == app.selection);
            }
        }
    }
}

fn render_card(frame: &mut Frame, card: &Card, area: Rect, selected: bool) {
    let mut lines = vec![Line::from(Span::styled(
        card.header.clone(),
        styles::card_header_style(),
    ))];

    for (label, value) in &card.fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), styles::label_style()),
            Span::styled(value.clone(), styles::body_style()),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled("Address: ", styles::label_style()),
        Span::styled(card.address.clone(), styles::muted_style()),
    ]));

    lines.push(
        Line::from(Span::styled(" Delete ", styles::delete_button_style(selected)))
            .alignment(Alignment::Center),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(selected));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_reload_button(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Reload Users ", styles::reload_button_style()),
        Span::styled("  press r", styles::muted_style()),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(""), line]).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Notice box anchored to the bottom-right corner of `area`.
fn render_notice(frame: &mut Frame, notice: &Notice, area: Rect) {
    let width = (notice.message.len() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let x = area.right().saturating_sub(width + 2).max(area.x);
    let y = area.bottom().saturating_sub(height + 1).max(area.y);
    let notice_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, notice_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::notice_style())
        .style(styles::notice_style());

    let paragraph = Paragraph::new(notice.message)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, notice_area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = format!(" {} ", app.status_line());

    let shortcuts = if app.controller.mount().reload_visible() {
        "[r]eload | [d]elete | [x] wipe | [q]uit"
    } else {
        "[d]elete | [x] wipe | [q]uit"
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 16, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            format!(" userlist {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("↑/↓ j/k", "Select user"),
        key("PgUp/PgDn", "Jump a page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        key("d / Del", "Delete selected user"),
        key("r / Enter", "Reload (when offered)"),
        key("x", "Wipe the list externally"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
