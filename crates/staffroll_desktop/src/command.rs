//! Key-to-command dispatch table.

use crossterm::event::KeyCode;

/// Actions reachable from the main table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    UpdateSalary,
    Edit,
    Delete,
    Refresh,
    SearchDepartment,
    AverageSalary,
    Quit,
    SelectPrevious,
    SelectNext,
}

impl Command {
    /// True for commands that act on the selected row.
    pub fn needs_selection(self) -> bool {
        matches!(self, Self::UpdateSalary | Self::Edit | Self::Delete)
    }
}

/// One entry of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub key: KeyCode,
    pub command: Command,
    /// Footer hint; bindings without one are not advertised.
    pub hint: Option<&'static str>,
}

const fn bind(key: KeyCode, command: Command, hint: Option<&'static str>) -> Binding {
    Binding { key, command, hint }
}

pub const BINDINGS: &[Binding] = &[
    bind(KeyCode::Char('a'), Command::Add, Some("a add")),
    bind(KeyCode::Char('u'), Command::UpdateSalary, Some("u salary")),
    bind(KeyCode::Char('e'), Command::Edit, Some("e edit")),
    bind(KeyCode::Char('d'), Command::Delete, Some("d delete")),
    bind(KeyCode::Char('r'), Command::Refresh, Some("r refresh")),
    bind(KeyCode::Char('s'), Command::SearchDepartment, Some("s search")),
    bind(KeyCode::Char('v'), Command::AverageSalary, Some("v average")),
    bind(KeyCode::Char('q'), Command::Quit, Some("q quit")),
    bind(KeyCode::Esc, Command::Quit, None),
    bind(KeyCode::Up, Command::SelectPrevious, Some("↑/↓ move")),
    bind(KeyCode::Char('k'), Command::SelectPrevious, None),
    bind(KeyCode::Down, Command::SelectNext, None),
    bind(KeyCode::Char('j'), Command::SelectNext, None),
];

/// Looks up the command bound to `key`.
pub fn command_for(key: KeyCode) -> Option<Command> {
    BINDINGS
        .iter()
        .find(|binding| binding.key == key)
        .map(|binding| binding.command)
}

/// Footer text built from the advertised bindings.
pub fn footer_hints() -> String {
    BINDINGS
        .iter()
        .filter_map(|binding| binding.hint)
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_key_is_bound() {
        assert_eq!(command_for(KeyCode::Char('a')), Some(Command::Add));
        assert_eq!(command_for(KeyCode::Char('u')), Some(Command::UpdateSalary));
        assert_eq!(command_for(KeyCode::Char('e')), Some(Command::Edit));
        assert_eq!(command_for(KeyCode::Char('d')), Some(Command::Delete));
        assert_eq!(command_for(KeyCode::Char('r')), Some(Command::Refresh));
        assert_eq!(command_for(KeyCode::Char('s')), Some(Command::SearchDepartment));
        assert_eq!(command_for(KeyCode::Char('v')), Some(Command::AverageSalary));
        assert_eq!(command_for(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Char('j')), Some(Command::SelectNext));
        assert_eq!(command_for(KeyCode::Up), Some(Command::SelectPrevious));
        assert_eq!(command_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn keys_are_unique() {
        for (index, binding) in BINDINGS.iter().enumerate() {
            assert!(
                BINDINGS[index + 1..].iter().all(|other| other.key != binding.key),
                "{:?} bound twice",
                binding.key
            );
        }
    }

    #[test]
    fn footer_lists_advertised_hints() {
        let footer = footer_hints();
        assert!(footer.starts_with("a add | u salary"));
        assert!(footer.contains("q quit"));
        assert!(!footer.contains("Esc"));
    }
}
