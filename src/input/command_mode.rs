use crossterm::event::KeyCode;
use regex::RegexBuilder;

use crate::app::{AppState, Mode};
use crate::schedule::SchedulePeriod;
use crate::ui::theme::Theme;
use crate::ui::viewport::WindowingMode;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Refresh,
    Goto(SchedulePeriod),
    Extend(i32),
    Find(String),
    Theme(String),
    Virtual(WindowingMode),
    Help,
    Error(String),
}

/// What the terminal session has to do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandEffect {
    None,
    Quit,
    Reload,
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    if let Some(pattern) = trimmed.strip_prefix('/') {
        return if pattern.is_empty() {
            Command::Error("Empty search".to_string())
        } else {
            Command::Find(pattern.to_string())
        };
    }

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };
    let parts: Vec<&str> = command_text.split_whitespace().collect();

    if parts.is_empty() {
        return Command::Error("Empty command".to_string());
    }

    match parts[0] {
        "q" | "quit" => Command::Quit,
        "refresh" => Command::Refresh,
        "help" => Command::Help,
        "goto" => {
            if parts.len() < 2 {
                Command::Error("goto requires a YYYY-MM argument".to_string())
            } else if let Some(period) = SchedulePeriod::parse_month(parts[1]) {
                Command::Goto(period)
            } else {
                Command::Error(format!("Invalid month: {}", parts[1]))
            }
        }
        "extend" => match parts.get(1).map(|h| h.parse::<i32>()) {
            Some(Ok(hours)) if hours != 0 => Command::Extend(hours),
            Some(Ok(_)) => Command::Error("extend needs a non-zero number of hours".to_string()),
            Some(Err(_)) => Command::Error(format!("Invalid hours: {}", parts[1])),
            None => Command::Error("extend requires a number of hours".to_string()),
        },
        "find" => {
            if parts.len() < 2 {
                Command::Error("find requires a pattern".to_string())
            } else {
                Command::Find(parts[1..].join(" "))
            }
        }
        "theme" => {
            if parts.len() < 2 {
                Command::Error("theme requires a theme name".to_string())
            } else {
                Command::Theme(parts[1].to_string())
            }
        }
        "virtual" => match parts.get(1).and_then(|arg| WindowingMode::parse(arg)) {
            Some(mode) => Command::Virtual(mode),
            None => Command::Error("virtual takes auto, on or off".to_string()),
        },
        _ => Command::Error(format!("Unknown command: {}", parts[0])),
    }
}

pub fn execute(command: Command, state: &mut AppState) -> CommandEffect {
    match command {
        Command::Quit => return CommandEffect::Quit,
        Command::Refresh => {
            state.discard_local_edits();
            return CommandEffect::Reload;
        }
        Command::Goto(period) => {
            state.switch_period(period);
            return CommandEffect::Reload;
        }
        Command::Extend(hours) => state.extend_selected(hours),
        Command::Find(pattern) => {
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(regex) => {
                    state.find(&regex);
                    state.search_query = Some(pattern);
                }
                Err(e) => state.set_notice(format!("Invalid pattern: {}", e)),
            }
        }
        Command::Theme(name) => match Theme::find(&name) {
            Some(theme) => state.theme = theme,
            None => state.set_notice(format!(
                "Unknown theme '{}'. Available: {}",
                name,
                Theme::available_themes().join(", ")
            )),
        },
        Command::Virtual(mode) => state.set_windowing(mode),
        Command::Help => state.show_help = true,
        Command::Error(message) => state.set_notice(message),
    }
    CommandEffect::None
}

pub fn handle_key(key: KeyCode, state: &mut AppState) -> CommandEffect {
    match key {
        KeyCode::Esc => {
            state.command_buffer.clear();
            state.mode = Mode::Normal;
            CommandEffect::None
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut state.command_buffer);
            state.mode = Mode::Normal;
            execute(parse_command(&input), state)
        }
        KeyCode::Backspace => {
            state.command_buffer.pop();
            if state.command_buffer.is_empty() {
                state.mode = Mode::Normal;
            }
            CommandEffect::None
        }
        KeyCode::Char(c) => {
            state.command_buffer.push(c);
            CommandEffect::None
        }
        _ => CommandEffect::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grid::fixtures::*;
    use crate::schedule::GridStore;

    fn app() -> AppState {
        let ctx = context(3, rule(5, 11));
        let grid = grid_with(&ctx, &[(1, 2)]);
        AppState::new(ctx.period).with_store(GridStore::new(ctx, grid))
    }

    #[test]
    fn parse_quit_command() {
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(parse_command(":quit"), Command::Quit);
    }

    #[test]
    fn parse_refresh_command() {
        assert_eq!(parse_command(":refresh"), Command::Refresh);
        assert!(matches!(parse_command(":w"), Command::Error(_)));
    }

    #[test]
    fn parse_goto_command_with_month() {
        let cmd = parse_command(":goto 2025-04");
        assert_eq!(cmd, Command::Goto(SchedulePeriod::month(2025, 4).unwrap()));
    }

    #[test]
    fn parse_goto_command_with_invalid_month_returns_error() {
        assert!(matches!(parse_command(":goto 2025-13"), Command::Error(_)));
        assert!(matches!(parse_command(":goto"), Command::Error(_)));
    }

    #[test]
    fn parse_extend_with_signed_hours() {
        assert_eq!(parse_command(":extend 2"), Command::Extend(2));
        assert_eq!(parse_command(":extend -1"), Command::Extend(-1));
        assert!(matches!(parse_command(":extend 0"), Command::Error(_)));
        assert!(matches!(parse_command(":extend lots"), Command::Error(_)));
    }

    #[test]
    fn parse_find_from_command_and_slash() {
        assert_eq!(parse_command(":find Ann Lee"), Command::Find("Ann Lee".to_string()));
        assert_eq!(parse_command("/^Bo"), Command::Find("^Bo".to_string()));
        assert!(matches!(parse_command("/"), Command::Error(_)));
    }

    #[test]
    fn parse_virtual_modes() {
        assert_eq!(parse_command(":virtual on"), Command::Virtual(WindowingMode::Virtualized));
        assert!(matches!(parse_command(":virtual"), Command::Error(_)));
    }

    #[test]
    fn parse_unknown_command_returns_error() {
        assert!(matches!(parse_command(":unknown"), Command::Error(_)));
        assert!(matches!(parse_command("quit"), Command::Error(_)));
        assert!(matches!(parse_command(":"), Command::Error(_)));
    }

    #[test]
    fn goto_switches_period_and_requests_reload() {
        let mut state = app();

        let effect = execute(parse_command(":goto 2025-04"), &mut state);

        assert_eq!(effect, CommandEffect::Reload);
        assert_eq!(state.period(), SchedulePeriod::month(2025, 4).unwrap());
    }

    #[test]
    fn refresh_drops_local_edits() {
        let mut state = app();
        state.select_cell(0, 2);
        state.delete_selected();
        assert!(state.has_local_edits());

        let effect = execute(Command::Refresh, &mut state);

        assert_eq!(effect, CommandEffect::Reload);
        assert!(!state.has_local_edits());
    }

    #[test]
    fn extend_command_lengthens_selected_shift() {
        let mut state = app();
        state.select_cell(0, 2);

        execute(Command::Extend(2), &mut state);

        assert_eq!(state.store.shift_at(&key(1, 2)).unwrap().duration_minutes(), Some(600));
    }

    #[test]
    fn unknown_theme_leaves_theme_and_sets_notice() {
        let mut state = app();

        execute(Command::Theme("neon".to_string()), &mut state);

        assert_eq!(state.theme.name, "default");
        assert!(state.notice.is_some());
    }

    #[test]
    fn typed_search_moves_cursor_on_enter() {
        let mut state = app();
        state.mode = Mode::Command;
        for c in "/employee 3".chars() {
            handle_key(KeyCode::Char(c), &mut state);
        }

        let effect = handle_key(KeyCode::Enter, &mut state);

        assert_eq!(effect, CommandEffect::None);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.cursor.row, 2);
        assert!(state.command_buffer.is_empty());
    }

    #[test]
    fn escape_abandons_command() {
        let mut state = app();
        state.mode = Mode::Command;
        state.command_buffer = ":q".to_string();

        assert_eq!(handle_key(KeyCode::Esc, &mut state), CommandEffect::None);
        assert_eq!(state.mode, Mode::Normal);
    }
}
