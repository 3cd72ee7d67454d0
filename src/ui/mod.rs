use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

use crate::app::{App, Focus, RESULT_ID, VIDEO_ID};
use crate::config::Variant;
use crate::dialog::{DialogService, ACKNOWLEDGE_LABEL};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(3), // random-pool
            Constraint::Length(3), // Buttons
            Constraint::Min(5),    // random-result
            Constraint::Length(4), // video
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_pool(f, app, chunks[1]);
    draw_buttons(f, app, chunks[2]);
    draw_result(f, app, chunks[3]);
    draw_video(f, app, chunks[4]);
    draw_footer(f, app, chunks[5]);

    // Dialog on top of everything
    if app.dialog.is_visible() {
        draw_dialog(f, app);
    }
}

fn border_style(app: &App, focused: bool) -> Style {
    if focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.inactive)
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref msg) = app.status_message {
        Line::from(Span::styled(msg.as_str(), Style::default().fg(app.theme.danger)))
    } else {
        let mode = match app.variant {
            Variant::Classic => "classic",
            Variant::Enhanced => "with clips",
        };
        Line::from(vec![
            Span::styled(" rollcall", Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" │ {}", mode), Style::default().fg(app.theme.text_dim)),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_pool(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Pool;
    let mut spans = vec![Span::styled(app.pool_input.as_str(), Style::default().fg(app.theme.text))];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(app.theme.accent)));
    }

    let block = Block::default()
        .title(format!(" {} ", Focus::Pool.element_id()))
        .borders(Borders::ALL)
        .border_style(border_style(app, focused));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_buttons(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (focus, label, rect) in [
        (Focus::RandomButton, "Draw", halves[0]),
        (Focus::InformationButton, "Disclaimer", halves[1]),
    ] {
        let focused = app.focus == focus;
        let style = if focused {
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let button = Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {} ", focus.element_id()),
                        Style::default().fg(app.theme.text_dim),
                    ))
                    .borders(Borders::ALL)
                    .border_style(border_style(app, focused)),
            );
        f.render_widget(button, rect);
    }
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", RESULT_ID))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.inactive));

    let inner_height = area.height.saturating_sub(2);
    let mut lines = vec![Line::from(""); (inner_height / 2) as usize];
    lines.push(match app.result.as_deref() {
        Some(name) => Line::from(Span::styled(
            name,
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled("—", Style::default().fg(app.theme.text_dim))),
    });

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn draw_video(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", VIDEO_ID))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.inactive));

    let mut lines = Vec::new();
    if app.video_visible {
        if let Some(src) = &app.video_src {
            lines.push(Line::from(vec![
                Span::styled("▶ ", Style::default().fg(app.theme.accent)),
                Span::styled(src.display().to_string(), Style::default().fg(app.theme.text)),
            ]));
        }
    }
    if let Some(left) = app.next_reveal_in(Instant::now()) {
        lines.push(Line::from(Span::styled(
            format!("Revealing in {:.1}s", left.as_secs_f32()),
            Style::default().fg(app.theme.text_dim),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(app.theme.accent);
    let dim = Style::default().fg(app.theme.text_dim);

    let spans = if app.dialog.is_visible() {
        vec![Span::styled(" Enter", key), Span::styled(" acknowledge", dim)]
    } else {
        let mut spans = vec![
            Span::styled(" Tab", key),
            Span::styled(" focus  ", dim),
            Span::styled("Enter", key),
            Span::styled(" press  ", dim),
        ];
        if app.focus != Focus::Pool {
            spans.extend([
                Span::styled("r", key),
                Span::styled(" draw  ", dim),
                Span::styled("i", key),
                Span::styled(" disclaimer  ", dim),
                Span::styled("q", key),
                Span::styled(" quit", dim),
            ]);
        } else {
            spans.extend([Span::styled("Ctrl-C", key), Span::styled(" quit", dim)]);
        }
        spans
    };

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_dialog(f: &mut Frame, app: &App) {
    let area = f.area();
    let theme = &app.theme;

    // Opaque shield over the whole page
    f.render_widget(Clear, area);
    f.render_widget(Block::default().style(Style::default().bg(theme.overlay)), area);

    let panel = centered_rect(if area.width < 80 { 95 } else { 60 }, 60, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(3),    // Body
            Constraint::Length(3), // Button strip
        ])
        .split(panel);

    let edge = Style::default().fg(theme.border);

    let title = Paragraph::new(Span::styled(
        format!(" {}", app.dialog.title()),
        Style::default().fg(theme.dialog_text).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL).border_style(edge))
    .style(Style::default().bg(theme.title_bar));
    f.render_widget(title, rows[0]);

    let body = Paragraph::new(app.dialog.body())
        .style(Style::default().fg(theme.dialog_text).bg(theme.panel))
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT).border_style(edge))
        .wrap(Wrap { trim: false });
    f.render_widget(body, rows[1]);

    let button = Paragraph::new(Span::styled(
        format!("[ {} ]", ACKNOWLEDGE_LABEL),
        Style::default().fg(theme.dialog_text).add_modifier(Modifier::BOLD | Modifier::REVERSED),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(edge))
    .style(Style::default().bg(theme.footer));
    f.render_widget(button, rows[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
