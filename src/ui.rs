pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use wordmix::{config::ConfigStore, ledger::Standing, phrase::join_tokens, Phase};

use crate::{App, SettingsField, Status};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const TOKEN_GAP: &str = "   ";

impl<S: ConfigStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.machine().phase() {
            Phase::Ended => render_final_standings(self, area, buf),
            Phase::Idle | Phase::Scrambled | Phase::Revealed => render_round(self, area, buf),
        }
    }
}

fn render_round<S: ConfigStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let machine = app.game.machine();
    let ranking = app.game.session().ledger.rank();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),                              // header
            Constraint::Length(3),                              // timer
            Constraint::Min(3),                                 // tokens
            Constraint::Length(1),                              // translation
            Constraint::Length(ranking.len().max(1) as u16 + 2), // scoreboard
            Constraint::Length(1),                              // status
            Constraint::Length(1),                              // legend
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                "Round {}/{}",
                machine.played_count(),
                machine.total_phrases()
            ),
            bold_style,
        ),
        Span::raw("   "),
        Span::styled(machine.phase().to_string(), italic_style),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let progress = machine.progress();
    let gauge_color = if progress > 0.5 {
        Color::Green
    } else if progress > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    let label = if machine.countdown().has_expired() {
        "time's up".to_string()
    } else {
        format!("{}s", machine.remaining_secs())
    };
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Time"))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(progress)
        .label(label)
        .render(chunks[1], buf);

    render_tokens(app, chunks[2], buf);

    if let Some(translation) = machine.round().and_then(|r| r.translation.as_deref()) {
        Paragraph::new(Span::styled(
            translation.to_string(),
            italic_style.fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    render_scoreboard(app, &ranking, chunks[4], buf);
    render_status(app.status.as_ref(), chunks[5], buf);

    let legend = match (machine.phase(), app.arrange) {
        (Phase::Scrambled, true) => {
            "(←/→) pick word / (</>) move it / (c)heck / (space) reveal / (↑/↓ +/-) score / (s)ettings / (esc)ape"
        }
        (Phase::Scrambled, false) => "(space) reveal / (↑/↓) player / (+/-) score / (R)eset scores / (s)ettings / (esc)ape",
        _ => "(space) next / (↑/↓) player / (+/-) score / (R)eset scores / (s)ettings / (esc)ape",
    };
    Paragraph::new(Span::styled(legend, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn render_tokens<S: ConfigStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let machine = app.game.machine();
    let Some(tokens) = machine.visible_tokens() else {
        return;
    };
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let (line, width) = if machine.phase() == Phase::Revealed {
        let sentence = join_tokens(tokens);
        let width = sentence.width();
        (
            Line::from(Span::styled(sentence, bold_style.fg(Color::Green))),
            width,
        )
    } else {
        let word_style = bold_style.fg(Color::Yellow);
        let mut spans = Vec::with_capacity(tokens.len() * 2);
        for (idx, token) in tokens.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw(TOKEN_GAP));
            }
            let style = if app.arrange && idx == app.cursor {
                word_style.add_modifier(Modifier::REVERSED)
            } else {
                word_style
            };
            spans.push(Span::styled(token.clone(), style));
        }
        let width = tokens.iter().map(|t| t.width()).sum::<usize>()
            + TOKEN_GAP.len() * tokens.len().saturating_sub(1);
        (Line::from(spans), width)
    };

    // when the phrase fits on one line, centering it reads best
    let fits = width <= area.width.saturating_sub(2) as usize;
    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(if fits { Alignment::Center } else { Alignment::Left })
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_scoreboard<S: ConfigStore>(app: &App<S>, ranking: &[Standing], area: Rect, buf: &mut Buffer) {
    let selected = app.selected_player();
    let lines: Vec<Line> = if ranking.is_empty() {
        vec![Line::from(Span::styled(
            "no players yet, add some in (s)ettings",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        ranking
            .iter()
            .map(|standing| {
                let (bg, border) = pastel_for_name(&standing.name);
                let marker = if selected == Some(standing.name.as_str()) {
                    "▶ "
                } else {
                    "  "
                };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(border)),
                    Span::styled(
                        format!(" {} ", standing.name),
                        Style::default().bg(bg).fg(Color::Black).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        standing.score.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect()
    };

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Scores"))
        .render(area, buf);
}

fn render_status(status: Option<&Status>, area: Rect, buf: &mut Buffer) {
    if let Some(status) = status {
        let color = if status.is_error { Color::Red } else { Color::Cyan };
        Paragraph::new(Span::styled(status.text.clone(), Style::default().fg(color)))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

fn render_final_standings<S: ConfigStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let ranking = app
        .game
        .machine()
        .final_ranking()
        .map(<[Standing]>::to_vec)
        .unwrap_or_default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Final standings",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if ranking.is_empty() {
        lines.push(Line::from("Nobody was keeping score."));
    }
    for (idx, standing) in ranking.iter().enumerate() {
        let (bg, _) = pastel_for_name(&standing.name);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}. {}", idx + 1, standing.name),
                Style::default().bg(bg).fg(Color::Black),
            ),
            Span::raw("   "),
            Span::styled(
                standing.score.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[0], buf);

    render_status(app.status.as_ref(), chunks[1], buf);
    Paragraph::new(Span::styled(
        "(enter) play again / (s)ettings / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}

/// Settings editor: one bordered box per field, the focused one highlighted.
pub fn render_settings<S: ConfigStore>(app: &App<S>, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new("Settings")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    for (field, chunk) in SettingsField::ALL.iter().zip(&chunks[1..5]) {
        let focused = app.settings.focus == *field;
        let mut text = app.settings.field(*field).to_string();
        if focused {
            text.push('▏');
        }
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widget = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(field.label()),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(widget, *chunk);
    }

    render_status(app.status.as_ref(), chunks[5], f.buffer_mut());
    let help = Paragraph::new("(tab) next field / (enter) new line / (ctrl+s) save and restart / (esc) cancel")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[6]);
}

/// FNV-1a over UTF-16 code units.
fn name_hash(name: &str) -> u32 {
    name.encode_utf16().fold(2_166_136_261u32, |h, unit| {
        (h ^ unit as u32).wrapping_mul(16_777_619)
    })
}

/// Background and accent colours for a player label: one of 20 hues 18° apart.
pub fn pastel_for_name(name: &str) -> (Color, Color) {
    let hue = (name_hash(name) % 20) as f64 * 18.0;
    (hsl(hue, 0.70, 0.92), hsl(hue, 0.55, 0.78))
}

fn hsl(hue: f64, saturation: f64, lightness: f64) -> Color {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(channel(r), channel(g), channel(b))
}
