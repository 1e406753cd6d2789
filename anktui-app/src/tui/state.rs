use crate::tui::forms::{Form, FormOutcome, TextField};
use crate::tui::inputs::{is_down, is_up, Input};
use anktui_core::{build_session, Card, CardId, Deck, DeckId, Rating, StudyMode, StudySession};
use chrono::{DateTime, Utc};
use tracing::debug;

pub const MENU: [&str; 5] = ["Study", "Practice", "Manage decks", "Statistics", "Quit"];

/// Things the runner does on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Save(Deck),
    Delete(DeckId),
    Quit,
}

/// Completions delivered back from spawned store calls.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Saved { deck: String, result: Result<(), String> },
    Deleted { deck: String, result: Result<(), String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub show_progress: bool,
    pub session_size: usize,
    pub default_ease: f64,
}

#[derive(Debug, Clone)]
pub struct StudyScreen {
    pub session: StudySession,
    /// Index into `Rating::ALL` for arrow-key rating.
    pub rating: usize,
}

#[derive(Debug, Clone)]
pub enum Mode<Id> {
    Browse,
    Form(Form),
    ConfirmDelete(Id),
}

#[derive(Debug, Clone)]
pub enum Screen {
    Menu { selected: usize },
    DeckList { selected: usize, mode: StudyMode },
    Study(StudyScreen),
    DeckManager { selected: usize, mode: Mode<DeckId> },
    CardEditor { deck: DeckId, selected: usize, mode: Mode<CardId> },
    Stats,
}

pub struct App {
    pub decks: Vec<Deck>,
    pub screen: Screen,
    pub status: Option<String>,
    pub settings: Settings,
}

type Step = (Screen, Vec<Effect>);

fn stay(screen: Screen) -> Step {
    (screen, vec![])
}

fn menu() -> Screen {
    Screen::Menu { selected: 0 }
}

fn clamp(selected: usize, len: usize) -> usize {
    selected.min(len.saturating_sub(1))
}

fn step_up(selected: usize) -> usize {
    selected.saturating_sub(1)
}

fn step_down(selected: usize, len: usize) -> usize {
    if selected + 1 < len {
        selected + 1
    } else {
        selected
    }
}

impl App {
    pub fn new(decks: Vec<Deck>, settings: Settings) -> Self {
        Self { decks, screen: menu(), status: None, settings }
    }

    pub fn deck(&self, id: DeckId) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == id)
    }

    fn deck_mut(&mut self, id: DeckId) -> Option<&mut Deck> {
        self.decks.iter_mut().find(|d| d.id == id)
    }

    pub fn handle_input(&mut self, input: Input, now: DateTime<Utc>) -> Vec<Effect> {
        if input == Input::Interrupt {
            return vec![Effect::Quit];
        }
        if input == Input::None {
            return vec![];
        }
        self.status = None;

        let screen = std::mem::replace(&mut self.screen, menu());
        let (next, effects) = match screen {
            Screen::Menu { selected } => self.on_menu(selected, input),
            Screen::DeckList { selected, mode } => self.on_deck_list(selected, mode, input, now),
            Screen::Study(study) => self.on_study(study, input, now),
            Screen::DeckManager { selected, mode } => self.on_deck_manager(selected, mode, input, now),
            Screen::CardEditor { deck, selected, mode } => {
                self.on_card_editor(deck, selected, mode, input, now)
            }
            Screen::Stats => match input {
                Input::Esc | Input::Char('q') | Input::Enter => stay(menu()),
                _ => stay(Screen::Stats),
            },
        };
        self.screen = next;
        effects
    }

    pub fn handle_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Saved { deck, result: Ok(()) } => debug!(%deck, "deck saved"),
            AppEvent::Deleted { deck, result: Ok(()) } => debug!(%deck, "deck deleted"),
            AppEvent::Saved { deck, result: Err(e) } => {
                self.status = Some(format!("Could not save '{deck}': {e}"));
            }
            AppEvent::Deleted { deck, result: Err(e) } => {
                self.status = Some(format!("Could not delete '{deck}': {e}"));
            }
        }
    }

    fn on_menu(&mut self, selected: usize, input: Input) -> Step {
        match input {
            i if is_up(i) => stay(Screen::Menu { selected: step_up(selected) }),
            i if is_down(i) => stay(Screen::Menu { selected: step_down(selected, MENU.len()) }),
            Input::Char('q') | Input::Esc => (Screen::Menu { selected }, vec![Effect::Quit]),
            Input::Enter => match selected {
                0 => stay(Screen::DeckList { selected: 0, mode: StudyMode::Review }),
                1 => stay(Screen::DeckList { selected: 0, mode: StudyMode::Practice }),
                2 => stay(Screen::DeckManager { selected: 0, mode: Mode::Browse }),
                3 => stay(Screen::Stats),
                _ => (Screen::Menu { selected }, vec![Effect::Quit]),
            },
            _ => stay(Screen::Menu { selected }),
        }
    }

    fn on_deck_list(&mut self, selected: usize, mode: StudyMode, input: Input, now: DateTime<Utc>) -> Step {
        match input {
            i if is_up(i) => stay(Screen::DeckList { selected: step_up(selected), mode }),
            i if is_down(i) => stay(Screen::DeckList { selected: step_down(selected, self.decks.len()), mode }),
            Input::Esc | Input::Char('q') => stay(menu()),
            Input::Enter => {
                let Some(deck) = self.decks.get(selected) else {
                    self.status = Some("No decks yet. Create one under Manage decks.".into());
                    return stay(Screen::DeckList { selected, mode });
                };
                let session = build_session(deck, self.settings.session_size, mode, now);
                if session.is_empty() {
                    self.status = Some(format!("Nothing to study in '{}' right now.", deck.name));
                    return stay(Screen::DeckList { selected, mode });
                }
                stay(Screen::Study(StudyScreen { session, rating: 2 }))
            }
            _ => stay(Screen::DeckList { selected, mode }),
        }
    }

    fn on_study(&mut self, mut study: StudyScreen, input: Input, now: DateTime<Utc>) -> Step {
        match input {
            Input::Esc => return stay(self.back_to_list(&study.session)),
            Input::Char('q') => return stay(menu()),
            _ => {}
        }

        if study.session.is_finished() {
            return match input {
                Input::Char('r') => {
                    match self.deck(study.session.deck_id) {
                        Some(deck) => study.session.restart(deck, self.settings.session_size, now),
                        None => return stay(self.back_to_list(&study.session)),
                    }
                    if study.session.is_empty() {
                        self.status = Some("Nothing left to study right now.".into());
                    }
                    stay(Screen::Study(study))
                }
                Input::Enter => stay(self.back_to_list(&study.session)),
                _ => stay(Screen::Study(study)),
            };
        }

        if !study.session.showing_answer() {
            if matches!(input, Input::Enter | Input::Char(' ') | Input::Char('f')) {
                study.session.reveal();
            }
            return stay(Screen::Study(study));
        }

        let rating = match input {
            Input::Left => {
                study.rating = step_up(study.rating);
                None
            }
            Input::Right => {
                study.rating = step_down(study.rating, Rating::ALL.len());
                None
            }
            Input::Enter => Some(Rating::ALL[study.rating]),
            Input::Char(c @ '1'..='4') => c.to_string().parse::<Rating>().ok(),
            _ => None,
        };
        let Some(rating) = rating else {
            return stay(Screen::Study(study));
        };

        let deck_id = study.session.deck_id;
        let Some(deck) = self.decks.iter_mut().find(|d| d.id == deck_id) else {
            self.status = Some("This deck was deleted.".into());
            return stay(menu());
        };
        let effects = match study.session.rate_current(deck, rating, now) {
            Ok(card) => {
                debug!(card = %card.id, ?rating, interval = card.interval, "rated card");
                vec![Effect::Save(deck.clone())]
            }
            Err(e) => {
                // card was removed mid-session; skip it
                self.status = Some(e.to_string());
                vec![]
            }
        };
        // still Revealed here, even when rating failed
        if let Err(e) = study.session.advance() {
            debug!(error = %e, "advance after rating");
        }
        study.rating = 2;
        (Screen::Study(study), effects)
    }

    fn back_to_list(&self, session: &StudySession) -> Screen {
        Screen::DeckList {
            selected: self.decks.iter().position(|d| d.id == session.deck_id).unwrap_or(0),
            mode: session.mode,
        }
    }

    fn on_deck_manager(&mut self, selected: usize, mode: Mode<DeckId>, input: Input, now: DateTime<Utc>) -> Step {
        let selected = clamp(selected, self.decks.len());
        match mode {
            Mode::Browse => match input {
                i if is_up(i) => stay(Screen::DeckManager { selected: step_up(selected), mode: Mode::Browse }),
                i if is_down(i) => stay(Screen::DeckManager {
                    selected: step_down(selected, self.decks.len()),
                    mode: Mode::Browse,
                }),
                Input::Esc | Input::Char('q') => stay(menu()),
                Input::Char('n') => {
                    let form = Form::new(None, [TextField::new("Name", ""), TextField::new("Description", "")]);
                    stay(Screen::DeckManager { selected, mode: Mode::Form(form) })
                }
                Input::Char('e') => {
                    let Some(d) = self.decks.get(selected) else { return stay(Screen::DeckManager { selected, mode: Mode::Browse }) };
                    let form = Form::new(
                        Some(d.id),
                        [TextField::new("Name", &d.name), TextField::new("Description", &d.description)],
                    );
                    stay(Screen::DeckManager { selected, mode: Mode::Form(form) })
                }
                Input::Char('d') | Input::Delete => match self.decks.get(selected) {
                    Some(d) => stay(Screen::DeckManager { selected, mode: Mode::ConfirmDelete(d.id) }),
                    None => stay(Screen::DeckManager { selected, mode: Mode::Browse }),
                },
                Input::Enter => match self.decks.get(selected) {
                    Some(d) => stay(Screen::CardEditor { deck: d.id, selected: 0, mode: Mode::Browse }),
                    None => stay(Screen::DeckManager { selected, mode: Mode::Browse }),
                },
                _ => stay(Screen::DeckManager { selected, mode: Mode::Browse }),
            },
            Mode::Form(mut form) => match form.handle(input) {
                FormOutcome::Editing => stay(Screen::DeckManager { selected, mode: Mode::Form(form) }),
                FormOutcome::Cancel => stay(Screen::DeckManager { selected, mode: Mode::Browse }),
                FormOutcome::Submit => match self.submit_deck(&form, now) {
                    Ok((deck, idx)) => (
                        Screen::DeckManager { selected: idx, mode: Mode::Browse },
                        vec![Effect::Save(deck)],
                    ),
                    Err(msg) => {
                        form.error = Some(msg);
                        stay(Screen::DeckManager { selected, mode: Mode::Form(form) })
                    }
                },
            },
            Mode::ConfirmDelete(id) => {
                if input != Input::Char('y') {
                    return stay(Screen::DeckManager { selected, mode: Mode::Browse });
                }
                self.decks.retain(|d| d.id != id);
                let selected = clamp(selected, self.decks.len());
                (Screen::DeckManager { selected, mode: Mode::Browse }, vec![Effect::Delete(id)])
            }
        }
    }

    fn submit_deck(&mut self, form: &Form, now: DateTime<Utc>) -> Result<(Deck, usize), String> {
        let (name, description) = (form.value(0), form.value(1));
        if name.is_empty() {
            return Err("Name must not be empty".into());
        }
        let taken = self
            .decks
            .iter()
            .any(|d| Some(d.id) != form.editing && d.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(format!("A deck named '{name}' already exists"));
        }
        match form.editing {
            Some(id) => {
                let idx = self.decks.iter().position(|d| d.id == id).ok_or("Deck no longer exists")?;
                self.decks[idx].update_info(name, description, now);
                Ok((self.decks[idx].clone(), idx))
            }
            None => {
                self.decks.push(Deck::new(name, description, now));
                let idx = self.decks.len() - 1;
                Ok((self.decks[idx].clone(), idx))
            }
        }
    }

    fn on_card_editor(
        &mut self,
        deck_id: DeckId,
        selected: usize,
        mode: Mode<CardId>,
        input: Input,
        now: DateTime<Utc>,
    ) -> Step {
        let Some(deck_idx) = self.decks.iter().position(|d| d.id == deck_id) else {
            return stay(Screen::DeckManager { selected: 0, mode: Mode::Browse });
        };
        let n_cards = self.decks[deck_idx].cards.len();
        let selected = clamp(selected, n_cards);
        let here = |selected, mode| Screen::CardEditor { deck: deck_id, selected, mode };

        match mode {
            Mode::Browse => match input {
                i if is_up(i) => stay(here(step_up(selected), Mode::Browse)),
                i if is_down(i) => stay(here(step_down(selected, n_cards), Mode::Browse)),
                Input::Esc | Input::Char('q') => stay(Screen::DeckManager { selected: deck_idx, mode: Mode::Browse }),
                Input::Char('n') => {
                    let form = Form::new(None, [TextField::new("Front", ""), TextField::new("Back", "")]);
                    stay(here(selected, Mode::Form(form)))
                }
                Input::Char('e') | Input::Enter => match self.decks[deck_idx].cards.get(selected) {
                    Some(c) => {
                        let form = Form::new(
                            Some(c.id),
                            [TextField::new("Front", &c.front), TextField::new("Back", &c.back)],
                        );
                        stay(here(selected, Mode::Form(form)))
                    }
                    None => stay(here(selected, Mode::Browse)),
                },
                Input::Char('d') | Input::Delete => match self.decks[deck_idx].cards.get(selected) {
                    Some(c) => stay(here(selected, Mode::ConfirmDelete(c.id))),
                    None => stay(here(selected, Mode::Browse)),
                },
                _ => stay(here(selected, Mode::Browse)),
            },
            Mode::Form(mut form) => match form.handle(input) {
                FormOutcome::Editing => stay(here(selected, Mode::Form(form))),
                FormOutcome::Cancel => stay(here(selected, Mode::Browse)),
                FormOutcome::Submit => {
                    let (front, back) = (form.value(0).to_string(), form.value(1).to_string());
                    if front.is_empty() || back.is_empty() {
                        form.error = Some("Front and back must both be filled in".into());
                        return stay(here(selected, Mode::Form(form)));
                    }
                    let default_ease = self.settings.default_ease;
                    let deck = &mut self.decks[deck_idx];
                    let result = match form.editing {
                        Some(id) => deck.update_card_content(id, &front, &back, now).map(|_| selected),
                        None => deck
                            .add_card(Card::new(front, back, now).with_ease_factor(default_ease), now)
                            .map(|_| deck.cards.len() - 1),
                    };
                    match result {
                        Ok(idx) => (here(idx, Mode::Browse), vec![Effect::Save(deck.clone())]),
                        Err(e) => {
                            form.error = Some(e.to_string());
                            stay(here(selected, Mode::Form(form)))
                        }
                    }
                }
            },
            Mode::ConfirmDelete(card_id) => {
                if input != Input::Char('y') {
                    return stay(here(selected, Mode::Browse));
                }
                let Some(deck) = self.deck_mut(deck_id) else {
                    return stay(menu());
                };
                if !deck.remove_card(card_id, now) {
                    return stay(here(selected, Mode::Browse));
                }
                let deck = deck.clone();
                let selected = clamp(selected, deck.cards.len());
                (here(selected, Mode::Browse), vec![Effect::Save(deck)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anktui_core::SessionState;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    fn settings() -> Settings {
        Settings { show_progress: true, session_size: 20, default_ease: 2.5 }
    }

    fn app_with(cards: usize) -> App {
        let mut deck = Deck::new("Verbs", "", now());
        for i in 0..cards {
            deck.add_card(Card::new(format!("f{i}"), format!("b{i}"), now()), now()).unwrap();
        }
        App::new(vec![deck], settings())
    }

    fn press(app: &mut App, keys: &[Input]) -> Vec<Effect> {
        keys.iter().flat_map(|k| app.handle_input(*k, now())).collect()
    }

    fn typed(s: &str) -> Vec<Input> {
        s.chars().map(Input::Char).collect()
    }

    fn study(app: &App) -> &StudySession {
        match &app.screen {
            Screen::Study(s) => &s.session,
            other => panic!("expected study screen, got {other:?}"),
        }
    }

    #[test]
    fn rating_key_saves_the_deck_and_advances() {
        let mut app = app_with(2);
        press(&mut app, &[Input::Enter, Input::Enter]);
        assert_eq!(study(&app).state(), SessionState::Presenting);

        // rating before reveal does nothing
        assert!(press(&mut app, &[Input::Char('3')]).is_empty());

        let effects = press(&mut app, &[Input::Char(' '), Input::Char('4')]);
        assert_eq!(effects.len(), 1);
        let Effect::Save(saved) = &effects[0] else { panic!("expected save") };
        assert_eq!(saved.cards[0].interval, 4);
        assert_eq!(app.decks[0], *saved);
        assert_eq!(study(&app).progress(), (2, 2));
    }

    #[test]
    fn rating_a_removed_card_skips_it_without_saving() {
        let mut app = app_with(2);
        press(&mut app, &[Input::Enter, Input::Enter, Input::Char(' ')]);
        let gone = app.decks[0].cards[0].id;
        app.decks[0].remove_card(gone, now());

        assert!(press(&mut app, &[Input::Char('3')]).is_empty());
        assert!(app.status.is_some());
        assert_eq!(study(&app).progress(), (2, 2));
        assert!(!study(&app).showing_answer());
    }

    #[test]
    fn arrow_keys_pick_a_rating() {
        let mut app = app_with(1);
        press(&mut app, &[Input::Enter, Input::Enter, Input::Char('f')]);
        let effects = press(&mut app, &[Input::Left, Input::Left, Input::Left, Input::Enter]);
        let Effect::Save(saved) = &effects[0] else { panic!("expected save") };
        // Good -> Hard -> Again -> Again
        assert_eq!(saved.cards[0].repetition, 0);
        assert!(study(&app).is_finished());
        assert_eq!(study(&app).completed(), 1);
    }

    #[test]
    fn restart_after_completion() {
        let mut app = app_with(1);
        press(&mut app, &[Input::Enter, Input::Char('2'), Input::Enter]);
        press(&mut app, &[Input::Enter, Input::Enter, Input::Char('3')]);
        assert!(study(&app).is_finished());

        // nothing due again until tomorrow
        press(&mut app, &[Input::Char('r')]);
        assert!(study(&app).is_empty());
        assert!(app.status.is_some());

        let later = now() + Duration::days(1);
        app.handle_input(Input::Char('r'), later);
        assert_eq!(study(&app).len(), 1);
    }

    #[test]
    fn practice_mode_and_empty_decks() {
        let mut app = app_with(0);
        press(&mut app, &[Input::Down, Input::Enter, Input::Enter]);
        assert!(matches!(app.screen, Screen::DeckList { mode: StudyMode::Practice, .. }));
        assert!(app.status.as_deref().unwrap_or("").contains("Nothing to study"));
    }

    #[test]
    fn esc_and_q_navigation() {
        let mut app = app_with(1);
        press(&mut app, &[Input::Enter, Input::Enter]);
        press(&mut app, &[Input::Esc]);
        assert!(matches!(app.screen, Screen::DeckList { .. }));
        press(&mut app, &[Input::Enter, Input::Char('q')]);
        assert!(matches!(app.screen, Screen::Menu { .. }));
        assert_eq!(press(&mut app, &[Input::Char('q')]), vec![Effect::Quit]);
        assert_eq!(app_with(0).handle_input(Input::Interrupt, now()), vec![Effect::Quit]);
    }

    #[test]
    fn create_rename_and_delete_decks() {
        let mut app = app_with(0);
        press(&mut app, &[Input::Down, Input::Down, Input::Enter, Input::Char('n')]);
        let mut keys = typed("Kanji");
        keys.extend([Input::Tab]);
        keys.extend(typed("N5 set"));
        keys.push(Input::Enter);
        let effects = press(&mut app, &keys);
        assert_eq!(app.decks.len(), 2);
        assert!(matches!(&effects[..], [Effect::Save(d)] if d.name == "Kanji" && d.description == "N5 set"));

        // duplicate names are refused
        let mut keys = vec![Input::Char('n')];
        keys.extend(typed("verbs"));
        keys.push(Input::Enter);
        assert!(press(&mut app, &keys).is_empty());
        match &app.screen {
            Screen::DeckManager { mode: Mode::Form(f), .. } => assert!(f.error.is_some()),
            other => panic!("unexpected screen {other:?}"),
        }
        press(&mut app, &[Input::Esc]);

        let effects = press(&mut app, &[Input::Char('e'), Input::Char('!'), Input::Enter]);
        assert!(matches!(&effects[..], [Effect::Save(d)] if d.name == "Kanji!"));

        let kanji = app.decks[1].id;
        assert!(press(&mut app, &[Input::Char('d'), Input::Char('n')]).is_empty());
        assert_eq!(press(&mut app, &[Input::Char('d'), Input::Char('y')]), vec![Effect::Delete(kanji)]);
        assert_eq!(app.decks.len(), 1);
    }

    #[test]
    fn card_editor_add_edit_delete() {
        let mut app = app_with(1);
        app.settings.default_ease = 2.0;
        press(&mut app, &[Input::Down, Input::Down, Input::Enter, Input::Enter]);
        assert!(matches!(app.screen, Screen::CardEditor { .. }));

        // empty back is rejected
        let mut keys = vec![Input::Char('n')];
        keys.extend(typed("perro"));
        keys.push(Input::Enter);
        assert!(press(&mut app, &keys).is_empty());
        let mut keys = vec![Input::Tab];
        keys.extend(typed("dog"));
        keys.push(Input::Enter);
        let effects = press(&mut app, &keys);
        assert_eq!(effects.len(), 1);
        let card = &app.decks[0].cards[1];
        assert_eq!((card.front.as_str(), card.back.as_str()), ("perro", "dog"));
        assert_eq!(card.ease_factor, 2.0);

        let effects = press(&mut app, &[Input::Enter, Input::Tab, Input::Backspace, Input::Char('g'), Input::Enter]);
        assert_eq!(effects.len(), 1);
        assert_eq!(app.decks[0].cards[1].back, "dog");

        let effects = press(&mut app, &[Input::Up, Input::Char('d'), Input::Char('y')]);
        assert_eq!(effects.len(), 1);
        assert_eq!(app.decks[0].cards.len(), 1);
        assert_eq!(app.decks[0].cards[0].front, "perro");

        press(&mut app, &[Input::Esc]);
        assert!(matches!(app.screen, Screen::DeckManager { selected: 0, .. }));
    }

    #[test]
    fn save_failures_show_in_status() {
        let mut app = app_with(0);
        app.handle_event(AppEvent::Saved { deck: "Verbs".into(), result: Err("disk full".into()) });
        assert!(app.status.as_deref().unwrap().contains("disk full"));
        // cleared on the next key
        press(&mut app, &[Input::Down]);
        assert!(app.status.is_none());
    }
}
