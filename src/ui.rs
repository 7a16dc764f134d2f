use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::quiz::QuizMode;
use crate::score::{self, ReviewMode};
use crate::session::{Phase, QuizSession};
use crate::util::{format_mm_ss, option_letter};
use crate::{App, ConfigForm, FormField, ReviewState, Screen};

const TITLE: &str = "readyme";
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Countdown turns urgent once fewer than five minutes remain.
const URGENT_SECONDS: u32 = 300;

pub fn draw(app: &mut App, f: &mut Frame) {
    match &mut app.screen {
        Screen::Configuring => render_form(&app.form, f),
        Screen::Generating => render_generating(app.spinner_frame, f),
        Screen::InSession(session) => render_session(session, f),
        Screen::ShowingResult(review) => render_review(review, f),
    }
}

fn accent() -> Style {
    Style::default().fg(Color::Cyan)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn hint_line(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(dim().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
}

fn render_form(form: &ConfigForm, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(11),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new(TITLE)
        .style(accent().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let field = |label: &str, value: String, focus: FormField| -> Line<'static> {
        let focused = form.focus == focus;
        let marker = if focused { "▸ " } else { "  " };
        let label_style = if focused {
            accent().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused && focus == FormField::Topic {
            "_"
        } else {
            ""
        };
        Line::from(vec![
            Span::styled(format!("{marker}{label:<12}"), label_style),
            Span::raw(value),
            Span::styled(cursor.to_string(), accent()),
        ])
    };

    let sources = if form.sources.is_empty() {
        "none".to_string()
    } else {
        form.sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        field("Topic", form.topic.clone(), FormField::Topic),
        Line::from(vec![
            Span::raw("  Files       "),
            Span::styled(sources, dim()),
        ]),
        field(
            "Duration",
            format!("{} min", form.duration_minutes),
            FormField::Duration,
        ),
        field(
            "Questions",
            form.question_count.to_string(),
            FormField::Questions,
        ),
        field("Mode", form.mode.to_string(), FormField::Mode),
        field(
            "Difficulty",
            form.difficulty.to_string(),
            FormField::Difficulty,
        ),
    ];
    if let Some(err) = &form.error {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red),
        ));
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" setup "))
        .wrap(Wrap { trim: false });
    f.render_widget(body, chunks[1]);

    let footer = if form.can_submit() {
        "[tab] field  [← →] adjust  [enter] start  [esc] quit"
    } else {
        "enter a topic or attach files to begin"
    };
    f.render_widget(hint_line(footer), chunks[3]);
}

fn render_generating(spinner_frame: usize, f: &mut Frame) {
    let area = centered_rect(40, 3, f.area());
    let glyph = SPINNER[spinner_frame % SPINNER.len()];
    let lines = vec![
        Line::from(vec![
            Span::styled(glyph.to_string(), accent()),
            Span::raw(" Constructing exam"),
        ]),
        Line::raw(""),
        Line::styled("this can take a minute", dim()),
    ];
    let body = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(body, area);
}

fn render_session(session: &QuizSession, f: &mut Frame) {
    let question = session.current_question();
    let width = f.area().width.saturating_sub(4).max(10) as usize;
    let question_height = (question.text.width() / width + 2) as u16;
    let explanation_height = if session.revealed() {
        (question.explanation.width() / width + 3) as u16
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(question_height),
            Constraint::Length(6),
            Constraint::Length(explanation_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_session_header(session, f, chunks[0]);

    let progress = Gauge::default()
        .gauge_style(accent())
        .ratio((session.current_index + 1) as f64 / session.questions.len().max(1) as f64)
        .label("");
    f.render_widget(progress, chunks[1]);

    let prompt = Paragraph::new(question.text.as_str())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: false });
    f.render_widget(prompt, chunks[3]);

    f.render_widget(option_list(session), chunks[4]);

    if session.revealed() {
        let explanation = Paragraph::new(question.explanation.as_str())
            .block(Block::default().borders(Borders::ALL).title(" why "))
            .wrap(Wrap { trim: false });
        f.render_widget(explanation, chunks[5]);
    }

    let action = primary_action_label(session);
    let footer = format!("[1-4] select  [enter] {action}  [esc] quit");
    f.render_widget(hint_line(&footer), chunks[7]);
}

fn render_session_header(session: &QuizSession, f: &mut Frame, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let counter = format!(
        "Question {} / {}",
        session.current_index + 1,
        session.questions.len()
    );
    f.render_widget(Paragraph::new(counter).style(accent()), halves[0]);

    let timer_style = if session.seconds_remaining < URGENT_SECONDS {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let timer = Paragraph::new(format_mm_ss(session.seconds_remaining))
        .style(timer_style)
        .alignment(Alignment::Right);
    f.render_widget(timer, halves[1]);
}

fn option_list(session: &QuizSession) -> Paragraph<'static> {
    let question = session.current_question();
    let committed = session.answers.get(&session.current_index).copied();
    let picked = session.selection.or(committed);

    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let selected = picked == Some(i);
            let marker = if selected { "▸" } else { " " };
            let style = if session.revealed() {
                if i == question.correct_index {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else if selected {
                    Style::default().fg(Color::Red)
                } else {
                    dim()
                }
            } else if selected {
                accent().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!("{marker} {}) {}", option_letter(i), option), style)
        })
        .collect();

    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn primary_action_label(session: &QuizSession) -> &'static str {
    match (session.mode, session.phase, session.is_last_question()) {
        (QuizMode::Guided, Phase::Revealed, true) => "Finish Session",
        (QuizMode::Guided, Phase::Revealed, false) => "Next Question",
        (QuizMode::Guided, _, _) => "Check Answer",
        (QuizMode::Exam, _, true) => "Submit Exam",
        (QuizMode::Exam, _, false) => "Next Question",
    }
}

fn render_review(review: &mut ReviewState, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let result = &review.result;
    let pct = score::percentage(result.score, result.total);
    let pct_style = if pct >= 80 {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if pct >= 60 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(format!("{pct}%"), pct_style),
            Span::raw(format!("  {} of {} correct", result.score, result.total)),
        ]),
        Line::styled(
            format!("time spent {}", format_mm_ss(result.time_spent_seconds)),
            dim(),
        ),
    ]);
    f.render_widget(summary, chunks[0]);

    let filter_label = match review.filter {
        ReviewMode::All => "showing all questions",
        ReviewMode::IncorrectOnly => "showing incorrect only",
    };
    f.render_widget(Paragraph::new(filter_label).style(dim()), chunks[1]);

    let items = score::review(&review.questions, &result.answers, review.filter);
    let mut lines: Vec<Line> = Vec::new();
    if items.is_empty() {
        lines.push(Line::styled("nothing to review", dim()));
    }
    for item in &items {
        let (mark, mark_style) = if item.is_correct {
            ("✓", Style::default().fg(Color::Green))
        } else {
            ("✗", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{mark} "), mark_style),
            Span::styled(
                format!("{}. {}", item.index + 1, item.question.text),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        for (i, option) in item.question.options.iter().enumerate() {
            let style = if i == item.question.correct_index {
                Style::default().fg(Color::Green)
            } else if item.user_answer == Some(i) {
                Style::default().fg(Color::Red)
            } else {
                dim()
            };
            let chosen = if item.user_answer == Some(i) { "▸" } else { " " };
            lines.push(Line::styled(
                format!("  {chosen} {}) {}", option_letter(i), option),
                style,
            ));
        }
        lines.push(Line::styled(
            format!("    {}", item.question.explanation),
            dim().add_modifier(Modifier::ITALIC),
        ));
        lines.push(Line::raw(""));
    }

    let viewport = chunks[2].height as usize;
    let max_offset = lines.len().saturating_sub(viewport);
    review.scroll_offset = review.scroll_offset.min(max_offset);

    let list = Paragraph::new(lines)
        .scroll((review.scroll_offset as u16, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(list, chunks[2]);

    f.render_widget(
        hint_line("[i] incorrect only  [↑ ↓] scroll  [r] retake  [esc] quit"),
        chunks[3],
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
