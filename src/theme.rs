//! Page and dialog colours
//! Defaults follow the classic disclaimer look; any entry can be overridden
//! with a hex string in the `[palette]` table of config.toml

use ratatui::style::Color;

use crate::config::PaletteOverrides;

#[derive(Debug, Clone)]
pub struct Theme {
    pub overlay: Color,      // Opaque shield behind the dialog
    pub title_bar: Color,    // Dialog title strip
    pub panel: Color,        // Dialog body
    pub footer: Color,       // Strip holding the acknowledgement button
    pub border: Color,       // Dialog outline
    pub accent: Color,       // Focused widget borders
    pub inactive: Color,     // Unfocused widget borders
    pub text: Color,
    pub text_dim: Color,
    pub dialog_text: Color,  // Text drawn on the light dialog surfaces
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            overlay: Color::Rgb(255, 255, 255),     // #fff
            title_bar: Color::Rgb(221, 130, 141),   // #DD828D
            panel: Color::Rgb(255, 255, 255),       // #fff
            footer: Color::Rgb(253, 238, 244),      // #FDEEF4
            border: Color::Rgb(249, 202, 222),      // #F9CADE
            accent: Color::Rgb(221, 130, 141),
            inactive: Color::Rgb(88, 91, 112),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            dialog_text: Color::Rgb(30, 30, 46),
            danger: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    pub fn load(overrides: &PaletteOverrides) -> Self {
        let mut theme = Self::default();
        let slots = [
            (&overrides.overlay, &mut theme.overlay),
            (&overrides.title_bar, &mut theme.title_bar),
            (&overrides.panel, &mut theme.panel),
            (&overrides.footer, &mut theme.footer),
            (&overrides.accent, &mut theme.accent),
        ];
        for (value, slot) in slots {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid palette colour: {}", value),
            }
        }
        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
