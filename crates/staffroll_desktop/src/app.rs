//! Desktop application state.
//!
//! # Responsibility
//! - Hold the table contents, selection, status line and open dialog.
//! - Turn key presses into employee use cases.
//!
//! # Invariants
//! - The table is re-fetched from the store after every mutation.
//! - `selected` is `None` or a valid index into `employees`.
//! - Nothing here touches the terminal; rendering lives in `ui`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};
use staffroll_core::{
    Employee, EmployeeId, EmployeeRepository, EmployeeService, NewEmployee, ReadOutcome, RepoError,
};

use crate::command::{command_for, Command};
use crate::dialog::{Dialog, DialogEvent, Form, FormKind};

pub const SELECT_FIRST: &str = "Select an employee first!";

pub struct App<R: EmployeeRepository> {
    service: EmployeeService<R>,
    pub employees: Vec<Employee>,
    pub selected: Option<usize>,
    /// Department the table is filtered to, if any.
    pub filter: Option<String>,
    pub status: String,
    pub dialog: Option<Dialog>,
    pub should_quit: bool,
}

impl<R: EmployeeRepository> App<R> {
    /// Creates the app and loads the initial table.
    pub fn new(service: EmployeeService<R>) -> Self {
        let mut app = Self {
            service,
            employees: Vec::new(),
            selected: None,
            filter: None,
            status: String::new(),
            dialog: None,
            should_quit: false,
        };
        app.reload();
        app
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.selected.and_then(|index| self.employees.get(index))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return;
        }
        if let Some(command) = command_for(key.code) {
            self.execute(command);
        }
    }

    pub fn execute(&mut self, command: Command) {
        if command.needs_selection() && self.selected_employee().is_none() {
            self.status = SELECT_FIRST.to_string();
            return;
        }

        match command {
            Command::Add => self.dialog = Some(Dialog::Form(Form::add())),
            Command::UpdateSalary => {
                if let Some(employee) = self.selected_employee() {
                    self.dialog = Some(Dialog::Form(Form::update_salary(employee)));
                }
            }
            Command::Edit => {
                if let Some(employee) = self.selected_employee() {
                    self.dialog = Some(Dialog::Form(Form::edit(employee)));
                }
            }
            Command::Delete => {
                if let Some(employee) = self.selected_employee() {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id: employee.id,
                        name: employee.name.clone(),
                    });
                }
            }
            Command::Refresh => {
                self.filter = None;
                self.reload();
            }
            Command::SearchDepartment => {
                self.dialog = Some(Dialog::Form(Form::search_department(
                    self.filter.as_deref(),
                )));
            }
            Command::AverageSalary => self.dialog = Some(Dialog::Form(Form::average_salary())),
            Command::Quit => self.should_quit = true,
            Command::SelectPrevious => self.move_selection(-1),
            Command::SelectNext => self.move_selection(1),
        }
    }

    /// Re-fetches the table, honoring the department filter.
    pub fn reload(&mut self) {
        let result = match &self.filter {
            Some(department) => self.service.list_by_department(department),
            None => self.service.list_all(),
        };

        match result {
            Ok(outcome) => {
                let fallback = outcome.fallback_cause().map(str::to_string);
                self.employees = outcome.into_value();
                self.status = match (fallback, &self.filter) {
                    (Some(cause), _) => format!("Store unavailable, showing defaults: {cause}"),
                    (None, Some(department)) => format!(
                        "{} employee(s) in {department}",
                        self.employees.len()
                    ),
                    (None, None) => format!("{} employee(s)", self.employees.len()),
                };
            }
            Err(err) => {
                warn!("event=desktop_reload module=desktop status=error error={err}");
                self.employees.clear();
                self.status = format!("Error: {err}");
            }
        }
        self.clamp_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        if self.employees.is_empty() {
            self.selected = None;
            return;
        }
        let last = self.employees.len() - 1;
        self.selected = Some(match self.selected {
            None => 0,
            Some(index) if delta < 0 => index.saturating_sub(1),
            Some(index) => (index + 1).min(last),
        });
    }

    fn clamp_selection(&mut self) {
        self.selected = match (self.selected, self.employees.len()) {
            (_, 0) => None,
            (Some(index), len) if index >= len => Some(len - 1),
            (selected, _) => selected,
        };
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        match dialog.handle_key(key) {
            DialogEvent::Pending => self.dialog = Some(dialog),
            DialogEvent::Cancelled => self.status = "Cancelled.".to_string(),
            DialogEvent::Submitted => {
                if let Err(reason) = self.submit(&dialog) {
                    self.status = reason;
                    self.dialog = Some(dialog);
                }
            }
        }
    }

    /// Applies a submitted dialog. `Err` keeps the dialog open with the
    /// message on the status line.
    fn submit(&mut self, dialog: &Dialog) -> Result<(), String> {
        match dialog {
            Dialog::ConfirmDelete { id, .. } => {
                let result = self.service.delete(*id);
                self.finish_write(result, "Employee deleted.");
                Ok(())
            }
            Dialog::Form(form) => match &form.kind {
                FormKind::Add => {
                    let id = parse_optional_id(form.value("ID (optional)"))?;
                    let salary = parse_salary(form.value("Salary"))?;
                    let payload = NewEmployee {
                        id,
                        name: form.value("Name").to_string(),
                        department: form.value("Department").to_string(),
                        salary,
                    };
                    match self.service.add(&payload) {
                        Ok(stored) => {
                            info!("event=desktop_add module=desktop status=ok id={}", stored.id);
                            self.reload();
                            self.status = format!("Employee #{} added.", stored.id);
                            Ok(())
                        }
                        Err(err) => rejected(err),
                    }
                }
                FormKind::UpdateSalary { id } => {
                    let salary = parse_salary(form.value("New salary"))?;
                    match self.service.update_salary(*id, salary) {
                        Err(err) if err.is_caller_error() => rejected(err),
                        result => {
                            self.finish_write(result, "Salary updated.");
                            Ok(())
                        }
                    }
                }
                FormKind::Edit { id } => {
                    let salary = parse_salary(form.value("Salary"))?;
                    let employee = Employee::new(
                        *id,
                        form.value("Name"),
                        form.value("Department"),
                        salary,
                    );
                    match self.service.update(&employee) {
                        Err(err) if err.is_caller_error() => rejected(err),
                        result => {
                            self.finish_write(result, "Employee updated.");
                            Ok(())
                        }
                    }
                }
                FormKind::SearchDepartment => {
                    let department = form.value("Department");
                    self.filter = (!department.is_empty()).then(|| department.to_string());
                    self.selected = None;
                    self.reload();
                    Ok(())
                }
                FormKind::AverageSalary => {
                    let department = form.value("Department");
                    if department.is_empty() {
                        return Err("Department is required.".to_string());
                    }
                    self.status = match self.service.average_salary(department) {
                        Ok(ReadOutcome::Fresh(average)) => {
                            format!("Average salary in {department} = {average:.2}")
                        }
                        Ok(ReadOutcome::Fallback { cause, .. }) => {
                            format!("Store unavailable, average not computed: {cause}")
                        }
                        Err(err) => format!("Error: {err}"),
                    };
                    Ok(())
                }
            },
        }
    }

    fn finish_write(&mut self, result: Result<bool, RepoError>, done: &str) {
        self.reload();
        self.status = match result {
            Ok(true) => done.to_string(),
            Ok(false) => "Employee not found.".to_string(),
            Err(err) => {
                warn!("event=desktop_write module=desktop status=error error={err}");
                format!("Error: {err}")
            }
        };
    }
}

fn rejected<T>(err: RepoError) -> Result<T, String> {
    if !err.is_caller_error() {
        warn!("event=desktop_write module=desktop status=error error={err}");
    }
    Err(format!("Error: {err}"))
}

fn parse_salary(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|salary| salary.is_finite())
        .ok_or_else(|| format!("Invalid salary `{raw}`"))
}

fn parse_optional_id(raw: &str) -> Result<Option<EmployeeId>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("Invalid employee id `{raw}`"))
}
