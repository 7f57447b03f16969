//! UI rendering

use super::app::{App, Focus};
use super::help::{get_about_help, get_help_text};
use destajo_core::render::Column;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

pub(crate) const FILTER_BAR_HEIGHT: u16 = 3;
pub(crate) const TABLE_MIN_HEIGHT: u16 = 5;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const COLUMN_SPACING: u16 = 1;

const ALL_LABEL: &str = "(todos)";

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FILTER_BAR_HEIGHT),
            Constraint::Min(TABLE_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [filter_area, table_area, status_area] = split_main_chunks(f.area());

    // borders + header row
    app.visible_rows = (table_area.height.saturating_sub(3) as usize).max(1);

    draw_filter_bar(f, app, filter_area);
    draw_table(f, app, table_area);
    draw_status_bar(f, app, status_area);

    if app.help_modal {
        draw_help_modal(f, app);
    }
}

fn control_style(focused: bool, editing: bool) -> Style {
    if editing {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ])
        .split(area);

    let driver = app.selected_driver().unwrap_or(ALL_LABEL);
    let receiver = app.selected_receiver().unwrap_or(ALL_LABEL);
    let date = if app.editing_date {
        format!("{}│", app.date_input)
    } else if app.date_input.is_empty() {
        ALL_LABEL.to_string()
    } else {
        app.date_input.clone()
    };

    let controls = [
        (" Conductor ", format!("◀ {} ▶", driver), Focus::Driver),
        (" Recibidor ", format!("◀ {} ▶", receiver), Focus::Receiver),
        (" Fecha ", date, Focus::Date),
    ];

    for ((title, content, focus), area) in controls.into_iter().zip(chunks.iter()) {
        let focused = app.focus == focus;
        let editing = focus == Focus::Date && app.editing_date;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(control_style(focused, editing));
        f.render_widget(Paragraph::new(content).block(block), *area);
    }
}

fn header_cell(column: Column) -> Cell<'static> {
    let line = Line::from(column.label());
    let line = if column.is_numeric() {
        line.alignment(Alignment::Right)
    } else {
        line
    };
    Cell::from(line).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let columns = app.renderer.layout().columns();

    let header = Row::new(columns.iter().map(|c| header_cell(*c))).height(1);

    let rows = app
        .surface
        .rows()
        .iter()
        .skip(app.scroll)
        .take(app.visible_rows)
        .map(|row| {
            Row::new(columns.iter().zip(&row.cells).map(|(column, cell)| {
                let line = Line::from(cell.text.clone());
                if column.is_numeric() {
                    Cell::from(line.alignment(Alignment::Right))
                } else {
                    Cell::from(line)
                }
            }))
        });

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| Constraint::Length(c.width_hint()))
        .collect();

    let border_style = if app.focus == Focus::Table {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Destajo ")
                .border_style(border_style),
        )
        .column_spacing(COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut parts: Vec<String> = Vec::new();
    match app.render_progress {
        Some((painted, total)) => parts.push(format!("Cargando {}/{}…", painted, total)),
        None => parts.push(app.surface.summary().to_string()),
    }
    if app.session.has_pending_filter() {
        parts.push("filtrando…".to_string());
    }
    if let Some(source) = app.session.source_name() {
        parts.push(source.to_string());
    }
    parts.push("? ayuda".to_string());

    let status = if app.status_message.is_empty() {
        parts.join("  |  ")
    } else {
        format!("{}  |  {}", app.status_message, parts.join("  |  "))
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(status, style)]));
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, f.area());

    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Ayuda ")
        .border_style(Style::default().fg(Color::Green))
        .style(modal_style);

    let mut lines: Vec<Line> = Vec::new();
    let about = get_about_help();
    let keys = get_help_text();
    for text in about.into_iter().chain(std::iter::once(String::new())).chain(keys) {
        let style = if text == "About Destajo" {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if text.starts_with("  ") {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let viewport_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(viewport_height);
    let effective_scroll = app.help_scroll.min(max_scroll);
    let scroll_y = u16::try_from(effective_scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(modal_style)
        .scroll((scroll_y, 0))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
