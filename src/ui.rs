use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use zendo::music::STUDY_PLAYLISTS;
use zendo::timer::SessionType;
use zendo::util::{format_hours, format_mm_ss, plural, sessions_today};

use crate::{App, Panel, FIELD_RANGES};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());

    match app.panel {
        Some(Panel::Settings) => render_settings(app, f),
        Some(Panel::Analytics) => render_analytics(app, f),
        Some(Panel::Todos) => render_todos(app, f),
        Some(Panel::Music) => render_music(app, f),
        None => {}
    }
}

fn session_color(session: SessionType) -> Color {
    match session {
        SessionType::Focus => Color::Magenta,
        SessionType::ShortBreak => Color::Green,
        SessionType::LongBreak => Color::Cyan,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let settings = self.settings.get();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2), // title
                    Constraint::Length(2), // session tabs
                    Constraint::Min(1),    // countdown
                    Constraint::Length(1), // status
                    Constraint::Length(1), // progress
                    Constraint::Length(2), // analytics footer
                    Constraint::Length(1), // key legend
                ]
                .as_ref(),
            )
            .split(area);

        let title = Paragraph::new(Span::styled("z e n d o", dim_style.patch(bold_style)))
            .alignment(Alignment::Center);
        title.render(chunks[0], buf);

        let mut tabs: Vec<Span> = Vec::new();
        for (idx, session) in SessionType::ALL.into_iter().enumerate() {
            if idx > 0 {
                tabs.push(Span::raw("   "));
            }
            let label = format!("[{}] {}", idx + 1, session);
            if session == self.timer.session_type() {
                tabs.push(Span::styled(
                    label,
                    bold_style
                        .fg(session_color(session))
                        .add_modifier(Modifier::UNDERLINED),
                ));
            } else {
                tabs.push(Span::styled(label, dim_style));
            }
        }
        Paragraph::new(Line::from(tabs))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        // vertically center the big countdown inside the flexible chunk
        let countdown_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(chunks[2]);

        let countdown = Paragraph::new(Span::styled(
            format_mm_ss(self.timer.remaining_secs()),
            bold_style.fg(session_color(self.timer.session_type())),
        ))
        .alignment(Alignment::Center);
        countdown.render(countdown_rows[1], buf);

        let status = if self.timer.is_running() {
            "running · space to pause"
        } else {
            "paused · space to start"
        };
        Paragraph::new(Span::styled(status, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let progress = self.timer.progress(settings);
        Gauge::default()
            .gauge_style(Style::default().fg(session_color(self.timer.session_type())))
            .ratio(progress)
            .label(format!("{:.0}%", progress * 100.0))
            .render(chunks[4], buf);

        let record = self.analytics.record();
        let footer = format!(
            "today {} · streak {} day{} · {} session{} total",
            format_hours(record.today_focus_minutes),
            record.current_streak_days,
            plural(record.current_streak_days),
            record.completed_sessions,
            plural(record.completed_sessions),
        );
        Paragraph::new(Span::styled(footer, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let legend =
            "space start/pause · r reset · 1/2/3 session · s settings · a analytics · t todos · m music · q quit";
        Paragraph::new(Span::styled(
            legend,
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[6], buf);
    }
}

/// Popup rect centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Cuts `text` down to `max_width` display columns, appending an ellipsis
/// when anything was dropped.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn popup_block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_settings(app: &App, f: &mut Frame) {
    let area = centered_rect(52, 14, f.area());
    f.render_widget(Clear, area);

    let block = popup_block("settings");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let draft = &app.settings_panel.draft;
    let values = [
        format!("{} min{}", draft.pomodoro_minutes, plural(draft.pomodoro_minutes)),
        format!("{} min{}", draft.short_break_minutes, plural(draft.short_break_minutes)),
        format!("{} min{}", draft.long_break_minutes, plural(draft.long_break_minutes)),
        format!(
            "{} session{}",
            draft.daily_goal_sessions,
            plural(draft.daily_goal_sessions)
        ),
    ];
    let labels = [
        "Focus duration",
        "Short break duration",
        "Long break duration",
        "Daily goal",
    ];

    let mut lines: Vec<Line> = vec![Line::raw("")];
    for (idx, (label, value)) in labels.iter().zip(values.iter()).enumerate() {
        let (min, max, _step) = FIELD_RANGES[idx];
        let selected = idx == app.settings_panel.selected;
        let marker = if selected { "› " } else { "  " };
        let row_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<22}", marker, label), row_style),
            Span::styled(format!("{:>12}", value), row_style),
            Span::styled(
                format!("  ({}-{})", min, max),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]));
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(
        "↑/↓ select · ←/→ adjust · enter save · esc close",
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}

fn render_analytics(app: &App, f: &mut Frame) {
    let area = centered_rect(56, 18, f.area());
    f.render_widget(Clear, area);

    let block = popup_block("focus analytics");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let record = app.analytics.record();
    let goal = app.settings.get().daily_goal_sessions;
    let progress = app.analytics.today_progress_percent(goal);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1), // sessions completed
                Constraint::Length(1), // progress gauge
                Constraint::Length(1), // spacer
                Constraint::Length(5), // totals
                Constraint::Length(1), // spacer
                Constraint::Min(1),    // history
            ]
            .as_ref(),
        )
        .split(inner);

    let done = sessions_today(record.today_focus_minutes);
    f.render_widget(
        Paragraph::new(format!("Sessions completed  {}/{}", done, goal)),
        chunks[0],
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(progress / 100.0)
            .label(format!("{:.0}% of daily goal", progress)),
        chunks[1],
    );

    let mut totals = vec![
        Line::from(format!(
            "Today's focus       {}",
            format_hours(record.today_focus_minutes)
        )),
        Line::from(format!(
            "Current streak      {} day{}",
            record.current_streak_days,
            plural(record.current_streak_days)
        )),
        Line::from(format!(
            "Total focus time    {}",
            format_hours(record.total_focus_minutes)
        )),
        Line::from(format!("Total sessions      {}", record.completed_sessions)),
    ];
    if let Some(days) = app.history.as_ref().and_then(|db| db.minutes_by_day(7).ok()) {
        let week: u32 = days.iter().map(|(_, minutes)| minutes).sum();
        totals.push(Line::from(format!(
            "Past 7 days         {}",
            format_hours(week)
        )));
    }
    f.render_widget(Paragraph::new(totals), chunks[3]);

    let mut history_lines: Vec<Line> = Vec::new();
    if let Some(rows) = app.history.as_ref().and_then(|db| db.recent(5).ok()) {
        if !rows.is_empty() {
            history_lines.push(Line::from(Span::styled(
                "Recent sessions",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for row in rows {
                history_lines.push(Line::from(Span::styled(
                    format!(
                        "{}  {:<12} {:>4}m",
                        row.timestamp.format("%m-%d %H:%M"),
                        row.label,
                        row.minutes
                    ),
                    Style::default().add_modifier(Modifier::DIM),
                )));
            }
        }
    }
    if history_lines.is_empty() {
        history_lines.push(Line::from(Span::styled(
            "No recorded sessions yet.",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    f.render_widget(Paragraph::new(history_lines), chunks[5]);
}

fn render_todos(app: &App, f: &mut Frame) {
    let area = centered_rect(52, 16, f.area());
    f.render_widget(Clear, area);

    let block = popup_block("focus tasks");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1), // input line
                Constraint::Length(1), // spacer
                Constraint::Min(1),    // list
                Constraint::Length(1), // footer
            ]
            .as_ref(),
        )
        .split(inner);

    let input = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(app.todo_panel.input.as_str()),
        Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    f.render_widget(Paragraph::new(input), chunks[0]);

    if app.todos.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No tasks yet. Add one to get started!",
                Style::default().add_modifier(Modifier::DIM),
            ))
            .alignment(Alignment::Center),
            chunks[2],
        );
    } else {
        let text_width = inner.width.saturating_sub(6) as usize;
        let rows: Vec<Line> = app
            .todos
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let marker = if item.completed { "[x]" } else { "[ ]" };
                let mut style = if item.completed {
                    Style::default()
                        .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
                } else {
                    Style::default()
                };
                if idx == app.todo_panel.selected {
                    style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(
                    format!("{} {}", marker, truncate_to_width(&item.text, text_width)),
                    style,
                ))
            })
            .collect();
        f.render_widget(Paragraph::new(rows), chunks[2]);
    }

    let footer = format!(
        "{} of {} done · enter add · tab toggle · del remove",
        app.todos.completed_count(),
        app.todos.len()
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            footer,
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );
}

fn render_music(app: &App, f: &mut Frame) {
    let area = centered_rect(48, 15, f.area());
    f.render_widget(Clear, area);

    let block = popup_block("study music");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !app.music.is_connected() {
        let lines = vec![
            Line::raw(""),
            Line::from("Link your account to play study"),
            Line::from("music while you focus."),
            Line::raw(""),
            Line::from(Span::styled(
                "[c] connect",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(Span::styled(
                "Demo only — nothing leaves this terminal.",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            )),
        ];
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Now Playing",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            app.music.current_track().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(if app.music.is_playing() {
            Span::styled("▶ playing", Style::default().fg(Color::Green))
        } else {
            Span::styled("⏸ paused", Style::default().add_modifier(Modifier::DIM))
        }),
        Line::raw(""),
        Line::from(Span::styled(
            "Study playlists",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for (idx, playlist) in STUDY_PLAYLISTS.iter().enumerate() {
        let style = if idx == app.music_panel.selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", playlist.name),
            style,
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "space play/pause · ↑/↓ · enter select · esc close",
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn timer_screen_shows_countdown_and_legend() {
        let mut app = test_app();
        let content = render(&mut app);
        assert!(content.contains("25:00"));
        assert!(content.contains("focus"));
        assert!(content.contains("paused"));
    }

    #[test]
    fn settings_panel_renders_all_rows() {
        let mut app = test_app();
        app.panel = Some(Panel::Settings);
        let content = render(&mut app);
        assert!(content.contains("Focus duration"));
        assert!(content.contains("Daily goal"));
        assert!(content.contains("25 mins"));
    }

    #[test]
    fn analytics_panel_renders_totals() {
        let mut app = test_app();
        app.panel = Some(Panel::Analytics);
        let content = render(&mut app);
        assert!(content.contains("Sessions completed"));
        assert!(content.contains("Current streak"));
        assert!(content.contains("No recorded sessions yet."));
    }

    #[test]
    fn todos_panel_renders_placeholder_then_items() {
        let mut app = test_app();
        app.panel = Some(Panel::Todos);
        let content = render(&mut app);
        assert!(content.contains("No tasks yet."));

        app.todos.add("write report");
        let content = render(&mut app);
        assert!(content.contains("write report"));
        assert!(content.contains("0 of 1 done"));
    }

    #[test]
    fn music_panel_renders_connect_then_player() {
        let mut app = test_app();
        app.panel = Some(Panel::Music);
        let content = render(&mut app);
        assert!(content.contains("[c] connect"));

        app.music.connect();
        let content = render(&mut app);
        assert!(content.contains("Now Playing"));
        assert!(content.contains("Lo-fi Study Beats"));
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_to_width("short", 20), "short");
    }

    #[test]
    fn truncate_cuts_long_text_with_ellipsis() {
        let cut = truncate_to_width("a very long task description", 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
    }

    #[test]
    fn centered_rect_clamps_to_the_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(100, 100, area);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }
}
