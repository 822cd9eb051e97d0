//! Interactive console menu.
//!
//! # Responsibility
//! - Drive employee use cases from line-based input.
//! - Keep the loop independent of stdin/stdout so scripted sessions can run it.
//!
//! # Invariants
//! - Unparseable input re-prompts; it never ends the session.
//! - End of input ends the session cleanly.
//! - Fallback reads are always announced before their (default) values.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{info, warn};
use staffroll_core::{
    Employee, EmployeeId, EmployeeRepository, EmployeeService, NewEmployee, ReadOutcome,
    RepoResult,
};

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    ViewAll,
    ViewByDepartment,
    AverageSalary,
    Add,
    UpdateSalary,
    Delete,
    Departments,
    Update,
    FindById,
    Count,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 11] = [
        Self::ViewAll,
        Self::ViewByDepartment,
        Self::AverageSalary,
        Self::Add,
        Self::UpdateSalary,
        Self::Delete,
        Self::Departments,
        Self::Update,
        Self::FindById,
        Self::Count,
        Self::Exit,
    ];

    pub fn key(self) -> u8 {
        match self {
            Self::Exit => 0,
            Self::ViewAll => 1,
            Self::ViewByDepartment => 2,
            Self::AverageSalary => 3,
            Self::Add => 4,
            Self::UpdateSalary => 5,
            Self::Delete => 6,
            Self::Departments => 7,
            Self::Update => 8,
            Self::FindById => 9,
            Self::Count => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Exit => "Exit",
            Self::ViewAll => "View All Employees",
            Self::ViewByDepartment => "View Employees by Department",
            Self::AverageSalary => "Get Average Salary by Department",
            Self::Add => "Add Employee",
            Self::UpdateSalary => "Update Salary",
            Self::Delete => "Delete Employee",
            Self::Departments => "List Departments",
            Self::Update => "Update Employee",
            Self::FindById => "Find Employee by ID",
            Self::Count => "Count Employees",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: u8 = value
            .trim()
            .parse()
            .map_err(|_| format!("not a menu number: `{}`", value.trim()))?;
        Self::ALL
            .into_iter()
            .find(|choice| choice.key() == key)
            .ok_or_else(|| format!("no menu entry {key}"))
    }
}

/// Formats one employee as a console row.
pub fn format_employee(employee: &Employee) -> String {
    format!(
        "#{}  {}  {}  {:.2}",
        employee.id, employee.name, employee.department, employee.salary
    )
}

/// Line-oriented console session over any reader/writer pair.
pub struct Console<I, O, R>
where
    I: BufRead,
    O: Write,
    R: EmployeeRepository,
{
    input: I,
    output: O,
    service: EmployeeService<R>,
}

impl<I, O, R> Console<I, O, R>
where
    I: BufRead,
    O: Write,
    R: EmployeeRepository,
{
    pub fn new(input: I, output: O, service: EmployeeService<R>) -> Self {
        Self {
            input,
            output,
            service,
        }
    }

    /// Returns the writer, mainly so scripted sessions can inspect output.
    pub fn into_output(self) -> O {
        self.output
    }

    /// Runs the menu until `0` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        info!(
            "event=console_start module=cli status=ok policy={}",
            self.service.policy()
        );
        loop {
            self.print_menu()?;
            let Some(choice) = self.read_parsed::<MenuChoice>("Enter choice: ")? else {
                break;
            };
            if choice == MenuChoice::Exit {
                writeln!(self.output, "Goodbye.")?;
                break;
            }
            if !self.dispatch(choice)? {
                break;
            }
        }
        info!("event=console_stop module=cli status=ok");
        self.output.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "=== Employee Management System ===")?;
        for choice in MenuChoice::ALL {
            writeln!(self.output, "{}. {}", choice.key(), choice.label())?;
        }
        Ok(())
    }

    /// Runs one action. `Ok(false)` means input ran out mid-action.
    fn dispatch(&mut self, choice: MenuChoice) -> io::Result<bool> {
        match choice {
            MenuChoice::Exit => Ok(false),
            MenuChoice::ViewAll => {
                let result = self.service.list_all();
                self.show_employees(result)?;
                Ok(true)
            }
            MenuChoice::ViewByDepartment => {
                let Some(department) = self.read_text("Enter department: ")? else {
                    return Ok(false);
                };
                let result = self.service.list_by_department(&department);
                self.show_employees(result)?;
                Ok(true)
            }
            MenuChoice::AverageSalary => {
                let Some(department) = self.read_text("Enter department: ")? else {
                    return Ok(false);
                };
                match self.service.average_salary(&department) {
                    Ok(outcome) => {
                        self.note_fallback(&outcome)?;
                        writeln!(
                            self.output,
                            "Average salary in {department} = {:.2}",
                            outcome.value()
                        )?;
                    }
                    Err(err) => self.show_error(err)?,
                }
                Ok(true)
            }
            MenuChoice::Add => self.add_employee(),
            MenuChoice::UpdateSalary => {
                let Some(id) = self.read_parsed::<EmployeeId>("Enter ID: ")? else {
                    return Ok(false);
                };
                let Some(salary) = self.read_parsed::<f64>("Enter new Salary: ")? else {
                    return Ok(false);
                };
                let result = self.service.update_salary(id, salary);
                self.show_write(result, "Salary updated.")?;
                Ok(true)
            }
            MenuChoice::Delete => {
                let Some(id) = self.read_parsed::<EmployeeId>("Enter ID: ")? else {
                    return Ok(false);
                };
                let result = self.service.delete(id);
                self.show_write(result, "Employee deleted.")?;
                Ok(true)
            }
            MenuChoice::Departments => {
                match self.service.list_departments() {
                    Ok(outcome) => {
                        self.note_fallback(&outcome)?;
                        if outcome.value().is_empty() {
                            writeln!(self.output, "No departments found.")?;
                        }
                        for department in outcome.value() {
                            writeln!(self.output, "{department}")?;
                        }
                    }
                    Err(err) => self.show_error(err)?,
                }
                Ok(true)
            }
            MenuChoice::Update => self.update_employee(),
            MenuChoice::FindById => {
                let Some(id) = self.read_parsed::<EmployeeId>("Enter ID: ")? else {
                    return Ok(false);
                };
                match self.service.get_by_id(id) {
                    Ok(outcome) => {
                        self.note_fallback(&outcome)?;
                        match outcome.value() {
                            Some(employee) => writeln!(self.output, "{}", format_employee(employee))?,
                            None => writeln!(self.output, "Employee not found.")?,
                        }
                    }
                    Err(err) => self.show_error(err)?,
                }
                Ok(true)
            }
            MenuChoice::Count => {
                match self.service.count() {
                    Ok(outcome) => {
                        self.note_fallback(&outcome)?;
                        writeln!(self.output, "Total employees: {}", outcome.value())?;
                    }
                    Err(err) => self.show_error(err)?,
                }
                Ok(true)
            }
        }
    }

    fn add_employee(&mut self) -> io::Result<bool> {
        let Some(id) = self.read_optional::<EmployeeId>("Enter ID (blank for auto): ")? else {
            return Ok(false);
        };
        let Some((name, department, salary)) = self.read_fields()? else {
            return Ok(false);
        };

        let payload = NewEmployee {
            id,
            name,
            department,
            salary,
        };
        match self.service.add(&payload) {
            Ok(stored) => writeln!(
                self.output,
                "Employee added: {}",
                format_employee(&stored)
            )?,
            Err(err) => self.show_error(err)?,
        }
        Ok(true)
    }

    fn update_employee(&mut self) -> io::Result<bool> {
        let Some(id) = self.read_parsed::<EmployeeId>("Enter ID: ")? else {
            return Ok(false);
        };
        let Some((name, department, salary)) = self.read_fields()? else {
            return Ok(false);
        };

        let result = self
            .service
            .update(&Employee::new(id, name, department, salary));
        self.show_write(result, "Employee updated.")?;
        Ok(true)
    }

    fn read_fields(&mut self) -> io::Result<Option<(String, String, f64)>> {
        let Some(name) = self.read_text("Enter Name: ")? else {
            return Ok(None);
        };
        let Some(department) = self.read_text("Enter Department: ")? else {
            return Ok(None);
        };
        let Some(salary) = self.read_parsed::<f64>("Enter Salary: ")? else {
            return Ok(None);
        };
        Ok(Some((name, department, salary)))
    }

    fn show_employees(&mut self, result: RepoResult<ReadOutcome<Vec<Employee>>>) -> io::Result<()> {
        match result {
            Ok(outcome) => {
                self.note_fallback(&outcome)?;
                if outcome.value().is_empty() {
                    writeln!(self.output, "No employees found.")?;
                }
                for employee in outcome.value() {
                    writeln!(self.output, "{}", format_employee(employee))?;
                }
                Ok(())
            }
            Err(err) => self.show_error(err),
        }
    }

    fn show_write(&mut self, result: RepoResult<bool>, done: &str) -> io::Result<()> {
        match result {
            Ok(true) => writeln!(self.output, "{done}"),
            Ok(false) => writeln!(self.output, "Employee not found."),
            Err(err) => self.show_error(err),
        }
    }

    fn note_fallback<T>(&mut self, outcome: &ReadOutcome<T>) -> io::Result<()> {
        if let Some(cause) = outcome.fallback_cause() {
            writeln!(self.output, "(store unavailable, showing defaults: {cause})")?;
        }
        Ok(())
    }

    fn show_error(&mut self, err: impl Display) -> io::Result<()> {
        warn!("event=console_action module=cli status=error error={err}");
        writeln!(self.output, "Error: {err}")
    }

    /// Prompts and reads one trimmed line. `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_text(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            match self.read_line(prompt)? {
                None => return Ok(None),
                Some(text) if text.is_empty() => {
                    writeln!(self.output, "A value is required.")?;
                }
                Some(text) => return Ok(Some(text)),
            }
        }
    }

    fn read_parsed<T: FromStr>(&mut self, prompt: &str) -> io::Result<Option<T>> {
        loop {
            let Some(text) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match text.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Invalid input `{text}`, try again.")?,
            }
        }
    }

    /// Like `read_parsed`, but a blank line yields `Some(None)`.
    fn read_optional<T: FromStr>(&mut self, prompt: &str) -> io::Result<Option<Option<T>>> {
        loop {
            let Some(text) = self.read_line(prompt)? else {
                return Ok(None);
            };
            if text.is_empty() {
                return Ok(Some(None));
            }
            match text.parse() {
                Ok(value) => return Ok(Some(Some(value))),
                Err(_) => writeln!(self.output, "Invalid input `{text}`, try again.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choice_parses_every_key() {
        for choice in MenuChoice::ALL {
            let parsed: MenuChoice = choice.key().to_string().parse().unwrap();
            assert_eq!(parsed, choice);
        }
        assert_eq!(" 10 ".parse::<MenuChoice>().unwrap(), MenuChoice::Count);
    }

    #[test]
    fn menu_choice_rejects_unknown_input() {
        assert!("11".parse::<MenuChoice>().is_err());
        assert!("abc".parse::<MenuChoice>().is_err());
        assert!("".parse::<MenuChoice>().is_err());
    }

    #[test]
    fn employee_rows_use_two_decimals() {
        let employee = Employee::new(3, "Carol", "Eng", 110000.5);
        assert_eq!(format_employee(&employee), "#3  Carol  Eng  110000.50");
    }
}
