//! Create/edit book dialog state.
use std::path::PathBuf;

use crate::api::{Book, BookCode, BookRequest, UserCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing keeps the current holder so saving doesn't return the book.
    Edit {
        code: BookCode,
        holder_code: Option<UserCode>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Year,
    Authors,
    Cover,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Year,
        FormField::Authors,
        FormField::Cover,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Year => "Year",
            FormField::Authors => "Authors (comma separated)",
            FormField::Cover => "Cover image file",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookForm {
    pub mode: FormMode,
    pub values: [String; 5],
    pub selected: usize,
    pub error: Option<String>,
}

impl BookForm {
    pub fn new_create() -> Self {
        Self {
            mode: FormMode::Create,
            values: Default::default(),
            selected: 0,
            error: None,
        }
    }

    pub fn from_book(book: &Book) -> Self {
        Self {
            mode: FormMode::Edit {
                code: book.code,
                holder_code: book.holder.as_ref().map(|h| h.code),
            },
            values: [
                book.title.clone(),
                book.description.clone().unwrap_or_default(),
                book.year.map(|y| y.to_string()).unwrap_or_default(),
                book.authors.join(", "),
                String::new(),
            ],
            selected: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "New book",
            FormMode::Edit { .. } => "Edit book",
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field as usize]
    }

    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.selected]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = (self.selected + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    pub fn push_char(&mut self, c: char) {
        self.values[self.selected].push(c);
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        self.values[self.selected].pop();
        self.error = None;
    }

    /// Build the request body, or a message describing what to fix.
    pub fn to_request(&self) -> Result<BookRequest, String> {
        let title = self.value(FormField::Title).trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let year = match self.value(FormField::Year).trim() {
            "" => None,
            y => Some(
                y.parse::<i32>()
                    .map_err(|_| format!("Year must be a number, got '{y}'"))?,
            ),
        };
        let description = Some(self.value(FormField::Description).trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let authors = self
            .value(FormField::Authors)
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        let (code, holder_code) = match self.mode {
            FormMode::Create => (None, None),
            FormMode::Edit { code, holder_code } => (Some(code), holder_code),
        };
        Ok(BookRequest {
            code,
            title: title.to_string(),
            description,
            year,
            authors,
            holder_code,
        })
    }

    pub fn cover_path(&self) -> Option<PathBuf> {
        let p = self.value(FormField::Cover).trim();
        (!p.is_empty()).then(|| PathBuf::from(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BookHolder, Role};

    #[test]
    fn create_form_requires_title() {
        let form = BookForm::new_create();
        assert_eq!(form.to_request().unwrap_err(), "Title is required");
    }

    #[test]
    fn create_form_builds_request() {
        let mut form = BookForm::new_create();
        for c in "Dune".chars() {
            form.push_char(c);
        }
        form.next_field();
        form.next_field();
        for c in "1965".chars() {
            form.push_char(c);
        }
        form.next_field();
        for c in "Frank Herbert, , Someone".chars() {
            form.push_char(c);
        }
        let req = form.to_request().unwrap();
        assert_eq!(req.title, "Dune");
        assert_eq!(req.year, Some(1965));
        assert_eq!(req.description, None);
        assert_eq!(req.authors, vec!["Frank Herbert", "Someone"]);
        assert_eq!(req.code, None);
        assert_eq!(form.cover_path(), None);
    }

    #[test]
    fn bad_year_is_reported() {
        let mut form = BookForm::new_create();
        form.values[0] = "X".into();
        form.values[2] = "19x5".into();
        assert!(form.to_request().unwrap_err().contains("19x5"));
    }

    #[test]
    fn edit_form_keeps_holder() {
        let book = Book {
            code: 4,
            title: "X".into(),
            description: Some("d".into()),
            year: Some(2001),
            authors: vec!["A".into(), "B".into()],
            holder: Some(BookHolder {
                code: 9,
                name: "Ana".into(),
                email: "a@x".into(),
                role: Role::Regular,
            }),
            cover: None,
        };
        let form = BookForm::from_book(&book);
        assert_eq!(form.value(FormField::Authors), "A, B");
        let req = form.to_request().unwrap();
        assert_eq!(req.code, Some(4));
        assert_eq!(req.holder_code, Some(9));
        assert_eq!(req.authors, book.authors);
    }

    #[test]
    fn field_cycling_wraps() {
        let mut form = BookForm::new_create();
        form.prev_field();
        assert_eq!(form.selected_field(), FormField::Cover);
        form.next_field();
        assert_eq!(form.selected_field(), FormField::Title);
    }
}
