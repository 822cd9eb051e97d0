//! Rendering of the employee table, status bar, footer and dialogs.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
};
use staffroll_core::EmployeeRepository;

use crate::app::App;
use crate::command::footer_hints;
use crate::dialog::Dialog;

pub fn draw<R: EmployeeRepository>(frame: &mut Frame, app: &App<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let title = Paragraph::new("Employee Management System")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_table(frame, app, chunks[1]);

    let status = Paragraph::new(format!(" {}", app.status))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, chunks[2]);

    let footer = Paragraph::new(format!(" {}", footer_hints()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if let Some(dialog) = &app.dialog {
        draw_dialog(frame, dialog);
    }
}

fn draw_table<R: EmployeeRepository>(frame: &mut Frame, app: &App<R>, area: Rect) {
    let header = Row::new(["ID", "Name", "Department", "Salary"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = app.employees.iter().map(|employee| {
        Row::new([
            employee.id.to_string(),
            employee.name.clone(),
            employee.department.clone(),
            format!("{:.2}", employee.salary),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
        Constraint::Min(12),
    ];

    let title = match &app.filter {
        Some(department) => format!(" Employees: {department} "),
        None => " Employees ".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(app.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_dialog(frame: &mut Frame, dialog: &Dialog) {
    let lines: Vec<Line> = match dialog {
        Dialog::Form(form) => form
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let marker = if index == form.focus { "> " } else { "  " };
                let line = Line::from(format!("{marker}{}: {}", field.label, field.value));
                if index == form.focus {
                    line.style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    line
                }
            })
            .chain([
                Line::from(""),
                Line::from("Enter submit | Tab next field | Esc cancel")
                    .style(Style::default().fg(Color::DarkGray)),
            ])
            .collect(),
        Dialog::ConfirmDelete { id, name } => vec![
            Line::from(format!("Delete employee #{id} {name}?")),
            Line::from(""),
            Line::from("y confirm | n cancel").style(Style::default().fg(Color::DarkGray)),
        ],
    };

    let height = lines.len() as u16 + 2;
    let area = centered_rect(60, height, frame.area());
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", dialog.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(popup, area);
}

/// Rect of `percent_x` width and `height` rows centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled)
        .unwrap_or(u16::MAX)
        .max(20)
        .min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
