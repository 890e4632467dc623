//! Create/edit form state and field validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::store::{User, UserDraft, UserId};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Focusable rows of the form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Avatar,
    Submit,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Avatar,
        FormField::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::Email => "Email",
            FormField::Avatar => "Avatar URL",
            FormField::Submit => "Submit",
        }
    }
}

/// Per-field validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub first_name: Option<&'static str>,
    pub last_name: Option<&'static str>,
    pub email: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }

    pub fn for_field(&self, field: FormField) -> Option<&'static str> {
        match field {
            FormField::FirstName => self.first_name,
            FormField::LastName => self.last_name,
            FormField::Email => self.email,
            FormField::Avatar | FormField::Submit => None,
        }
    }

    fn clear(&mut self, field: FormField) {
        match field {
            FormField::FirstName => self.first_name = None,
            FormField::LastName => self.last_name = None,
            FormField::Email => self.email = None,
            FormField::Avatar | FormField::Submit => {}
        }
    }
}

/// Check a draft. Blank fields and malformed emails are rejected.
pub fn validate(draft: &UserDraft) -> FormErrors {
    let mut errors = FormErrors::default();
    if draft.first_name.trim().is_empty() {
        errors.first_name = Some("First name is required");
    }
    if draft.last_name.trim().is_empty() {
        errors.last_name = Some("Last name is required");
    }
    let email = draft.email.trim();
    if email.is_empty() {
        errors.email = Some("Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.email = Some("Email is not valid");
    }
    errors
}

/// Form contents. `target` is the user being edited, `None` when creating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserForm {
    pub target: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: String,
    pub focus: FormField,
    pub errors: FormErrors,
}

impl UserForm {
    pub fn create() -> Self {
        Self {
            target: None,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            avatar: String::new(),
            focus: FormField::FirstName,
            errors: FormErrors::default(),
        }
    }

    /// Pre-filled from `user`. The avatar field starts blank, meaning "keep".
    pub fn edit(user: &User) -> Self {
        Self {
            target: Some(user.id),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            ..Self::create()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Avatar => &self.avatar,
            FormField::Submit => "",
        }
    }

    fn value_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::FirstName => Some(&mut self.first_name),
            FormField::LastName => Some(&mut self.last_name),
            FormField::Email => Some(&mut self.email),
            FormField::Avatar => Some(&mut self.avatar),
            FormField::Submit => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Type into the focused field; editing a field clears its error.
    pub fn input(&mut self, c: char) {
        let field = self.focus;
        if let Some(v) = self.value_mut(field) {
            v.push(c);
            self.errors.clear(field);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focus;
        if let Some(v) = self.value_mut(field) {
            v.pop();
            self.errors.clear(field);
        }
    }

    pub fn draft(&self) -> UserDraft {
        UserDraft::new(
            self.first_name.trim(),
            self.last_name.trim(),
            self.email.trim(),
        )
    }

    pub fn avatar_override(&self) -> Option<String> {
        let a = self.avatar.trim();
        (!a.is_empty()).then(|| a.to_string())
    }

    /// Validate and record errors. On failure focus moves to the first bad field.
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.draft());
        if let Some(bad) = FormField::ORDER
            .into_iter()
            .find(|f| self.errors.for_field(*f).is_some())
        {
            self.focus = bad;
        }
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_required() {
        let errors = validate(&UserDraft::new("  ", "", ""));
        assert_eq!(errors.first_name, Some("First name is required"));
        assert_eq!(errors.last_name, Some("Last name is required"));
        assert_eq!(errors.email, Some("Email is required"));
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["ana", "ana@x", "a b@x.com", "@x.com", "ana@@x.com"] {
            let errors = validate(&UserDraft::new("Ana", "Lopez", bad));
            assert_eq!(errors.email, Some("Email is not valid"), "{bad}");
        }
        assert!(validate(&UserDraft::new("Ana", "Lopez", "a@x.com")).is_empty());
    }

    #[test]
    fn focus_wraps_both_ways() {
        assert_eq!(FormField::Submit.next(), FormField::FirstName);
        assert_eq!(FormField::FirstName.prev(), FormField::Submit);
    }

    #[test]
    fn typing_clears_that_fields_error() {
        let mut form = UserForm::create();
        assert!(!form.validate());
        assert_eq!(form.focus, FormField::FirstName);

        form.input('A');
        assert!(form.errors.first_name.is_none());
        assert!(form.errors.last_name.is_some());
    }

    #[test]
    fn edit_prefills_and_keeps_avatar_by_default() {
        let user = User {
            id: 7,
            first_name: "Michael".into(),
            last_name: "Lawson".into(),
            email: "michael.lawson@reqres.in".into(),
            avatar: "https://reqres.in/img/faces/7-image.jpg".into(),
        };
        let form = UserForm::edit(&user);
        assert!(form.is_editing());
        assert_eq!(form.draft(), UserDraft::from(&user));
        assert_eq!(form.avatar_override(), None);
    }

    #[test]
    fn submit_row_ignores_typing() {
        let mut form = UserForm::create();
        form.focus = FormField::Submit;
        form.input('x');
        assert_eq!(form, UserForm { focus: FormField::Submit, ..UserForm::create() });
    }
}
