use crate::tui::forms::Form;
use crate::tui::state::{App, Mode, Screen, StudyScreen, MENU};
use crate::tui::theme::Theme;
use anktui_core::{retention_stats, Deck, Rating, RetentionStats, SessionState, StudyMode};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw_ui(f: &mut Frame, app: &App, theme: &Theme, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(2)])
        .split(f.size());

    let title = Paragraph::new(Line::from(vec![
        Span::raw("AnkTUI").style(theme.title),
        Span::raw("  "),
        Span::raw(screen_title(&app.screen)).style(theme.hint),
    ]));
    f.render_widget(title, chunks[0]);

    match &app.screen {
        Screen::Menu { selected } => draw_menu(f, chunks[1], *selected, theme),
        Screen::DeckList { selected, mode } => draw_deck_list(f, chunks[1], app, *selected, *mode, theme, now),
        Screen::Study(study) => draw_study(f, chunks[1], study, app.settings.show_progress, theme),
        Screen::DeckManager { selected, mode } => draw_deck_manager(f, chunks[1], app, *selected, mode, theme, now),
        Screen::CardEditor { deck, selected, mode } => {
            if let Some(d) = app.deck(*deck) {
                draw_card_editor(f, chunks[1], d, *selected, mode, theme);
            }
        }
        Screen::Stats => draw_stats(f, chunks[1], &app.decks, theme),
    }

    draw_footer(f, chunks[2], app, theme);
}

fn screen_title(screen: &Screen) -> &'static str {
    match screen {
        Screen::Menu { .. } => "Main menu",
        Screen::DeckList { mode: StudyMode::Review, .. } => "Study",
        Screen::DeckList { mode: StudyMode::Practice, .. } => "Practice",
        Screen::Study(_) => "Session",
        Screen::DeckManager { .. } => "Decks",
        Screen::CardEditor { .. } => "Cards",
        Screen::Stats => "Statistics",
    }
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let hint = match &app.screen {
        Screen::Menu { .. } => " ↑/k ↓/j select   Enter open   q quit",
        Screen::DeckList { .. } => " ↑/↓ select   Enter start   Esc back",
        Screen::Study(s) => match s.session.state() {
            SessionState::Presenting => " Space/Enter/f show answer   Esc back   q menu",
            SessionState::Revealed => " 1-4 rate   ←/→ + Enter rate   Esc back",
            SessionState::Complete => " r restart   Enter/Esc back   q menu",
        },
        Screen::DeckManager { mode: Mode::Browse, .. } => {
            " n new   e edit   d delete   Enter cards   Esc back"
        }
        Screen::CardEditor { mode: Mode::Browse, .. } => " n new   e/Enter edit   d delete   Esc back",
        Screen::DeckManager { mode: Mode::Form(_), .. } | Screen::CardEditor { mode: Mode::Form(_), .. } => {
            " Tab next field   Enter save   Esc cancel"
        }
        Screen::DeckManager { mode: Mode::ConfirmDelete(_), .. }
        | Screen::CardEditor { mode: Mode::ConfirmDelete(_), .. } => " y confirm   any other key cancels",
        Screen::Stats => " Esc back",
    };
    let line = match &app.status {
        Some(msg) => Line::from(Span::raw(format!(" {msg}")).style(theme.error)),
        None => Line::from(Span::raw(hint).style(theme.footer)),
    };
    let p = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

fn selectable_list<'a>(f: &mut Frame, area: Rect, title: &'a str, items: Vec<ListItem<'a>>, selected: usize, theme: &Theme) {
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected));
    }
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(theme.selected)
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_menu(f: &mut Frame, area: Rect, selected: usize, theme: &Theme) {
    let items = MENU.iter().map(|m| ListItem::new(*m)).collect();
    selectable_list(f, area, "Menu", items, selected, theme);
}

fn deck_line(d: &Deck, now: DateTime<Utc>) -> String {
    let c = d.card_counts(now);
    format!("{}  ({} cards, {} new, {} due)", d.name, c.total, c.new, c.due)
}

fn draw_deck_list(
    f: &mut Frame,
    area: Rect,
    app: &App,
    selected: usize,
    mode: StudyMode,
    theme: &Theme,
    now: DateTime<Utc>,
) {
    if app.decks.is_empty() {
        let p = Paragraph::new("No decks yet. Create one under Manage decks.")
            .block(Block::default().title("Decks").borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    }
    let title = match mode {
        StudyMode::Review => "Choose a deck to study",
        StudyMode::Practice => "Choose a deck to practice",
    };
    let items = app.decks.iter().map(|d| ListItem::new(deck_line(d, now))).collect();
    selectable_list(f, area, title, items, selected, theme);
}

fn draw_study(f: &mut Frame, area: Rect, study: &StudyScreen, show_progress: bool, theme: &Theme) {
    let session = &study.session;
    let block = Block::default()
        .title(format!("{} ({})", session.deck_name, screen_mode(session.mode)))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(if show_progress { 2 } else { 0 }), Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    if session.is_finished() {
        let text = if session.is_empty() {
            vec![Line::from("No cards to study right now.")]
        } else {
            vec![
                Line::from(Span::raw("Session complete!").style(theme.title)),
                Line::from(format!("You studied {} card(s).", session.completed())),
            ]
        };
        f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), rows[1]);
        return;
    }

    if show_progress {
        let (pos, total) = session.progress();
        let gauge = Gauge::default()
            .gauge_style(theme.title)
            .label(format!("Card {pos} of {total}"))
            .ratio(pos as f64 / total.max(1) as f64);
        f.render_widget(gauge, Rect { height: 1, ..rows[0] });
    }

    let Some(card) = session.current_card() else { return };
    let mut text = vec![
        Line::from(vec![Span::raw("Q: ").style(theme.title), Span::raw(card.front.as_str())]),
        Line::from(""),
    ];
    if session.showing_answer() {
        text.push(Line::from(vec![Span::raw("A: ").style(theme.title), Span::raw(card.back.as_str())]));
    }
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), rows[1]);

    if session.showing_answer() {
        let spans: Vec<Span> = Rating::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, r)| {
                let label = Span::raw(format!(" {} {} ", r.key(), r.label()));
                let label = if i == study.rating {
                    label.style(theme.rating(*r)).reversed()
                } else {
                    label.style(theme.rating(*r))
                };
                [label, Span::raw(" ")]
            })
            .collect();
        f.render_widget(Paragraph::new(Line::from(spans)), rows[2]);
    }
}

fn screen_mode(mode: StudyMode) -> &'static str {
    match mode {
        StudyMode::Review => "review",
        StudyMode::Practice => "practice",
    }
}

fn draw_deck_manager<Id>(
    f: &mut Frame,
    area: Rect,
    app: &App,
    selected: usize,
    mode: &Mode<Id>,
    theme: &Theme,
    now: DateTime<Utc>,
) {
    let items = app
        .decks
        .iter()
        .map(|d| {
            let mut lines = vec![Line::from(deck_line(d, now))];
            if !d.description.is_empty() {
                lines.push(Line::from(Span::raw(format!("  {}", d.description)).style(theme.hint)));
            }
            ListItem::new(lines)
        })
        .collect();
    selectable_list(f, area, "Decks", items, selected, theme);
    draw_overlay(f, area, mode, "Deck", theme);
}

fn draw_card_editor<Id>(f: &mut Frame, area: Rect, deck: &Deck, selected: usize, mode: &Mode<Id>, theme: &Theme) {
    let items = deck
        .cards
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::raw(c.front.as_str()),
                Span::raw("  →  ").style(theme.hint),
                Span::raw(c.back.as_str()),
            ]))
        })
        .collect();
    let title = format!("Cards in {}", deck.name);
    selectable_list(f, area, &title, items, selected, theme);
    draw_overlay(f, area, mode, "Card", theme);
}

fn draw_overlay<Id>(f: &mut Frame, area: Rect, mode: &Mode<Id>, noun: &str, theme: &Theme) {
    match mode {
        Mode::Browse => {}
        Mode::Form(form) => draw_form(f, centered(area, 60, 9), form, noun, theme),
        Mode::ConfirmDelete(_) => {
            let r = centered(area, 40, 3);
            f.render_widget(Clear, r);
            let p = Paragraph::new(format!("Delete this {}? (y/n)", noun.to_lowercase()))
                .style(theme.error)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, r);
        }
    }
}

fn draw_form(f: &mut Frame, area: Rect, form: &Form, noun: &str, theme: &Theme) {
    let title = if form.editing.is_some() { format!("Edit {noun}") } else { format!("New {noun}") };
    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let label_style = if i == form.focus { theme.selected } else { theme.hint };
        lines.push(Line::from(Span::raw(field.label).style(label_style)));
        let cursor = if i == form.focus { "_" } else { "" };
        lines.push(Line::from(format!("  {}{cursor}", field.value)));
    }
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::raw(err.as_str()).style(theme.error)));
    }
    f.render_widget(Clear, area);
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_stats(f: &mut Frame, area: Rect, decks: &[Deck], theme: &Theme) {
    let mut all = RetentionStats::default();
    let mut lines = Vec::new();
    for d in decks {
        let s = retention_stats(&d.cards);
        all.merge(&s);
        lines.push(stats_line(&d.name, &s));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::raw(stats_text("All decks", &all)).style(theme.title)));
    let p = Paragraph::new(lines).block(Block::default().title("Retention").borders(Borders::ALL));
    f.render_widget(p, area);
}

fn stats_line(name: &str, s: &RetentionStats) -> Line<'static> {
    Line::from(stats_text(name, s))
}

fn stats_text(name: &str, s: &RetentionStats) -> String {
    format!(
        "{name:<24} total {:>4}  new {:>4}  young {:>4}  mature {:>4}  ({:.0}% mature)",
        s.total,
        s.new,
        s.young,
        s.mature,
        s.mature_ratio() * 100.0
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
