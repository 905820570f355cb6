use ratatui::style::Color;

use crate::roster::ShiftKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub title: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub today: Color,
    pub weekend: Color,
    pub header: Color,
    pub rest_cell: Color,
    pub day_shift: Color,
    pub night_shift: Color,
    pub overtime_shift: Color,
    pub malformed_shift: Color,
    pub vacation: Color,
    pub violation: Color,
    pub drag_source: Color,
    pub drop_target: Color,
    pub status_bar: Color,
    pub help_title: Color,
    pub help_section: Color,
    pub command_mode: Color,
    pub error: Color,
    pub success: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            title: Color::Cyan,
            cursor_bg: Color::Blue,
            cursor_fg: Color::White,
            today: Color::Green,
            weekend: Color::DarkGray,
            header: Color::Yellow,
            rest_cell: Color::DarkGray,
            day_shift: Color::Cyan,
            night_shift: Color::Magenta,
            overtime_shift: Color::LightYellow,
            malformed_shift: Color::LightRed,
            vacation: Color::Green,
            violation: Color::Red,
            drag_source: Color::Gray,
            drop_target: Color::LightBlue,
            status_bar: Color::White,
            help_title: Color::Cyan,
            help_section: Color::Yellow,
            command_mode: Color::White,
            error: Color::Red,
            success: Color::Green,
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            title: Color::Rgb(251, 184, 108),
            cursor_bg: Color::Rgb(60, 56, 54),
            cursor_fg: Color::Rgb(235, 219, 178),
            today: Color::Rgb(184, 187, 38),
            weekend: Color::Rgb(146, 131, 116),
            header: Color::Rgb(254, 128, 25),
            rest_cell: Color::Rgb(102, 92, 84),
            day_shift: Color::Rgb(131, 165, 152),
            night_shift: Color::Rgb(211, 134, 155),
            overtime_shift: Color::Rgb(250, 189, 47),
            malformed_shift: Color::Rgb(254, 128, 25),
            vacation: Color::Rgb(142, 192, 124),
            violation: Color::Rgb(251, 73, 52),
            drag_source: Color::Rgb(146, 131, 116),
            drop_target: Color::Rgb(69, 133, 136),
            status_bar: Color::Rgb(235, 219, 178),
            help_title: Color::Rgb(251, 184, 108),
            help_section: Color::Rgb(254, 128, 25),
            command_mode: Color::Rgb(235, 219, 178),
            error: Color::Rgb(251, 73, 52),
            success: Color::Rgb(184, 187, 38),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            title: Color::Rgb(136, 192, 208),
            cursor_bg: Color::Rgb(59, 66, 82),
            cursor_fg: Color::Rgb(236, 239, 244),
            today: Color::Rgb(163, 190, 140),
            weekend: Color::Rgb(76, 86, 106),
            header: Color::Rgb(235, 203, 139),
            rest_cell: Color::Rgb(67, 76, 94),
            day_shift: Color::Rgb(129, 161, 193),
            night_shift: Color::Rgb(180, 142, 173),
            overtime_shift: Color::Rgb(235, 203, 139),
            malformed_shift: Color::Rgb(208, 135, 112),
            vacation: Color::Rgb(163, 190, 140),
            violation: Color::Rgb(191, 97, 106),
            drag_source: Color::Rgb(76, 86, 106),
            drop_target: Color::Rgb(94, 129, 172),
            status_bar: Color::Rgb(216, 222, 233),
            help_title: Color::Rgb(136, 192, 208),
            help_section: Color::Rgb(235, 203, 139),
            command_mode: Color::Rgb(216, 222, 233),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            title: Color::White,
            cursor_bg: Color::White,
            cursor_fg: Color::Black,
            today: Color::LightGreen,
            weekend: Color::Gray,
            header: Color::White,
            rest_cell: Color::Gray,
            day_shift: Color::LightCyan,
            night_shift: Color::LightMagenta,
            overtime_shift: Color::LightYellow,
            malformed_shift: Color::LightRed,
            vacation: Color::LightGreen,
            violation: Color::LightRed,
            drag_source: Color::DarkGray,
            drop_target: Color::LightBlue,
            status_bar: Color::White,
            help_title: Color::White,
            help_section: Color::LightYellow,
            command_mode: Color::White,
            error: Color::LightRed,
            success: Color::LightGreen,
        }
    }

    pub fn shift_color(&self, kind: ShiftKind) -> Color {
        match kind {
            ShiftKind::Day => self.day_shift,
            ShiftKind::Night => self.night_shift,
            ShiftKind::Overtime => self.overtime_shift,
        }
    }

    pub fn find(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "gruvbox" => Some(Self::gruvbox()),
            "nord" => Some(Self::nord()),
            "high-contrast" | "contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    pub fn get_by_name(name: &str) -> Self {
        Self::find(name).unwrap_or_else(Self::default_theme)
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "gruvbox", "nord", "high-contrast"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
