pub mod field;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::game::session::{Overlay, State};

pub fn render(frame: &mut Frame, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(80, 255, 80)))
        .title(" Alien Invaders ")
        .title_style(Style::default().fg(Color::Rgb(100, 255, 100)).add_modifier(Modifier::BOLD));

    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(8),    // Field
            Constraint::Length(1), // Help
        ])
        .split(inner);

    render_status(frame, app, chunks[0]);

    let fw = chunks[1].width as usize;
    let fh = chunks[1].height as usize;
    if fw > 0 && fh > 0 {
        let lines = field::render_field(&app.session, app.config(), fw, fh);
        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    if let Some(overlay) = app.session.overlay() {
        render_overlay(frame, chunks[1], overlay);
    }

    render_help(frame, app.session.state(), chunks[2]);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let lives = session.lives().unwrap_or(app.config().ship_lives);
    let lives_str = "\u{2666} ".repeat(lives as usize);
    let alive = session.wave().map_or(0, |wave| wave.formation().alive());

    let mut spans = vec![
        Span::styled(" \u{1f47e} ", Style::default()),
        Span::styled(
            format!("Lives: {} ", lives_str),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Aliens: {} ", alive),
            Style::default().fg(Color::Rgb(255, 80, 80)),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            session.state().label(),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if session.wave().is_some_and(|wave| wave.breached()) {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            "Defense line breached",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help(frame: &mut Frame, state: State, area: Rect) {
    let sep = || Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60)));
    let line = match state {
        State::Complete => Line::from(vec![
            Span::styled(" GAME OVER! ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled("Press ENTER for a new game, Q to quit", Style::default().fg(Color::Gray)),
        ]),
        _ => Line::from(vec![
            Span::styled(" \u{2190}\u{2192} Move ", Style::default().fg(Color::DarkGray)),
            sep(),
            Span::styled("\u{2191}/Space Fire ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            sep(),
            Span::styled("S Start ", Style::default().fg(Color::DarkGray)),
            sep(),
            Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_overlay(frame: &mut Frame, area: Rect, overlay: Overlay) {
    let text = overlay.text();
    let overlay_w = (text.chars().count() as u16 + 6).min(area.width);
    let overlay_h = 3u16.min(area.height);
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    let color = match overlay {
        Overlay::PressStart => Color::Rgb(255, 220, 80),
        Overlay::GameOver => Color::Rgb(255, 80, 80),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let p = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(p, overlay_area);
}
