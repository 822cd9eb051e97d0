//! Modal dialogs: text-field forms and the delete confirmation.

use crossterm::event::{KeyCode, KeyEvent};
use staffroll_core::{Employee, EmployeeId};

/// What a submitted form is for.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    Add,
    UpdateSalary { id: EmployeeId },
    Edit { id: EmployeeId },
    SearchDepartment,
    AverageSalary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Outcome of feeding one key to a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Pending,
    Cancelled,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn add() -> Self {
        Self {
            kind: FormKind::Add,
            title: "Add Employee".to_string(),
            fields: vec![
                Field::new("ID (optional)", ""),
                Field::new("Name", ""),
                Field::new("Department", ""),
                Field::new("Salary", ""),
            ],
            focus: 1,
        }
    }

    pub fn update_salary(employee: &Employee) -> Self {
        Self {
            kind: FormKind::UpdateSalary { id: employee.id },
            title: format!("Update Salary: #{} {}", employee.id, employee.name),
            fields: vec![Field::new("New salary", format_salary(employee.salary))],
            focus: 0,
        }
    }

    pub fn edit(employee: &Employee) -> Self {
        Self {
            kind: FormKind::Edit { id: employee.id },
            title: format!("Edit Employee #{}", employee.id),
            fields: vec![
                Field::new("Name", employee.name.clone()),
                Field::new("Department", employee.department.clone()),
                Field::new("Salary", format_salary(employee.salary)),
            ],
            focus: 0,
        }
    }

    pub fn search_department(current: Option<&str>) -> Self {
        Self {
            kind: FormKind::SearchDepartment,
            title: "Search by Department (blank shows all)".to_string(),
            fields: vec![Field::new("Department", current.unwrap_or_default())],
            focus: 0,
        }
    }

    pub fn average_salary() -> Self {
        Self {
            kind: FormKind::AverageSalary,
            title: "Average Salary".to_string(),
            fields: vec![Field::new("Department", "")],
            focus: 0,
        }
    }

    /// Trimmed value of the field labelled `label`.
    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| field.value.trim())
            .unwrap_or_default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogEvent {
        match key.code {
            KeyCode::Esc => DialogEvent::Cancelled,
            KeyCode::Enter => DialogEvent::Submitted,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len();
                DialogEvent::Pending
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                DialogEvent::Pending
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                }
                DialogEvent::Pending
            }
            KeyCode::Char(ch) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(ch);
                }
                DialogEvent::Pending
            }
            _ => DialogEvent::Pending,
        }
    }
}

/// Any modal currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Form(Form),
    ConfirmDelete { id: EmployeeId, name: String },
}

impl Dialog {
    pub fn title(&self) -> &str {
        match self {
            Self::Form(form) => &form.title,
            Self::ConfirmDelete { .. } => "Confirm Delete",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogEvent {
        match self {
            Self::Form(form) => form.handle_key(key),
            Self::ConfirmDelete { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => DialogEvent::Submitted,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => DialogEvent::Cancelled,
                _ => DialogEvent::Pending,
            },
        }
    }
}

fn format_salary(salary: f64) -> String {
    format!("{salary:.2}")
}
