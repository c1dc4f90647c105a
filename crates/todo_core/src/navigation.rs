//! Screen navigation model and static About content.
//!
//! # Responsibility
//! - Track the screen stack of the two-screen app.
//! - Hold the About screen text so every front end shows the same copy.
//!
//! # Invariants
//! - The stack always starts at, and never pops below, `Screen::Todo`.

use std::fmt::{Display, Formatter};

/// Named navigation destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Todo,
    About,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::About => "About",
        }
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const TODO_TITLE: &str = "Todo List";
pub const TODO_SUBTITLE: &str = "Organize your tasks, stay productive every day";
pub const EMPTY_LIST_TEXT: &str = "No tasks yet";

pub const ABOUT_TITLE: &str = "About This App";
pub const ABOUT_BODY: &str = "A simple to-do demo app with local persistence.";
pub const ABOUT_TECH_STACK: &[&str] = &[
    "Rust core (tokio + serde)",
    "SQLite key-value storage",
    "Flutter UI via flutter_rust_bridge",
];

/// Stack navigator with forward and back transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Creates a navigator showing the initial `Todo` screen.
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::Todo],
        }
    }

    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or_default()
    }

    /// Pushes `screen` unless it is already on top.
    pub fn navigate(&mut self, screen: Screen) {
        if self.current() != screen {
            self.stack.push(screen);
        }
    }

    /// Pops one screen. Returns `false` when already at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Navigator, Screen};

    #[test]
    fn starts_on_todo() {
        let navigator = Navigator::new();
        assert_eq!(navigator.current(), Screen::Todo);
        assert!(!navigator.can_go_back());
    }

    #[test]
    fn navigate_to_about_and_back() {
        let mut navigator = Navigator::new();
        navigator.navigate(Screen::About);
        assert_eq!(navigator.current(), Screen::About);

        assert!(navigator.back());
        assert_eq!(navigator.current(), Screen::Todo);
    }

    #[test]
    fn back_never_pops_root() {
        let mut navigator = Navigator::new();
        assert!(!navigator.back());
        assert_eq!(navigator.depth(), 1);
    }

    #[test]
    fn navigating_to_current_screen_is_ignored() {
        let mut navigator = Navigator::new();
        navigator.navigate(Screen::About);
        navigator.navigate(Screen::About);
        assert_eq!(navigator.depth(), 2);
    }
}
