use crate::tui::inputs::Input;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
}

impl TextField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

/// Two-line edit form shared by the deck and card editors.
/// `editing` holds the id of the record being changed, `None` when creating.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub editing: Option<Uuid>,
    pub fields: [TextField; 2],
    pub focus: usize,
    pub error: Option<String>,
}

pub enum FormOutcome {
    Editing,
    Submit,
    Cancel,
}

impl Form {
    pub fn new(editing: Option<Uuid>, fields: [TextField; 2]) -> Self {
        Self { editing, fields, focus: 0, error: None }
    }

    pub fn value(&self, i: usize) -> &str {
        self.fields[i].value.trim()
    }

    pub fn handle(&mut self, input: Input) -> FormOutcome {
        match input {
            Input::Esc => return FormOutcome::Cancel,
            Input::Enter => return FormOutcome::Submit,
            Input::Tab | Input::Down => self.focus = (self.focus + 1) % self.fields.len(),
            Input::BackTab | Input::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len()
            }
            Input::Backspace => {
                self.fields[self.focus].value.pop();
            }
            Input::Char(c) => self.fields[self.focus].value.push(c),
            _ => {}
        }
        self.error = None;
        FormOutcome::Editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Form {
        Form::new(None, [TextField::new("Front", ""), TextField::new("Back", "x")])
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut f = form();
        for c in "hola".chars() {
            f.handle(Input::Char(c));
        }
        f.handle(Input::Tab);
        f.handle(Input::Backspace);
        f.handle(Input::Char('q'));
        assert_eq!(f.value(0), "hola");
        assert_eq!(f.value(1), "q");

        f.handle(Input::BackTab);
        assert_eq!(f.focus, 0);
        f.handle(Input::Up);
        assert_eq!(f.focus, 1);
    }

    #[test]
    fn enter_and_esc_finish() {
        let mut f = form();
        f.error = Some("bad".into());
        assert!(matches!(f.handle(Input::Enter), FormOutcome::Submit));
        assert!(f.error.is_some());
        assert!(matches!(f.handle(Input::Char('a')), FormOutcome::Editing));
        assert!(f.error.is_none());
        assert!(matches!(f.handle(Input::Esc), FormOutcome::Cancel));
    }
}
