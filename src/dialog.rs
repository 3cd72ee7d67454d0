//! Modal dialog shown over the page
//!
//! Hiding only flips visibility. Title and body stay put so a re-render of a
//! hidden dialog is still well-defined.

pub const DISCLAIMER_TITLE: &str = "Disclaimer";

pub const DISCLAIMER_BODY: &str = "\
1. Everyone in the pool scored between 90 and 110 on the second monthly exam of the spring term (both bounds included).
2. The draw uses the current millisecond timestamp modulo the pool size. Nothing is rigged.
3. The timestamp changes once per millisecond, so two draws within the same millisecond pick the same person.
4. Whoever is drawn hands in their homework, or gets drawn with extra weight next time.";

pub const ACKNOWLEDGE_LABEL: &str = "O K";

pub trait DialogService {
    fn show(&mut self, title: &str, body: &str);
    /// Press the acknowledgement button; `true` if a dialog was open
    fn acknowledge(&mut self) -> bool;
    fn is_visible(&self) -> bool;
}

/// Full-screen overlay plus a centred panel
#[derive(Debug, Clone, Default)]
pub struct OverlayDialog {
    title: String,
    body: String,
    visible: bool,
}

impl OverlayDialog {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl DialogService for OverlayDialog {
    fn show(&mut self, title: &str, body: &str) {
        self.title = title.to_string();
        self.body = body.to_string();
        self.visible = true;
    }

    fn acknowledge(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_acknowledge() {
        let mut dialog = OverlayDialog::default();
        assert!(!dialog.is_visible());

        dialog.show(DISCLAIMER_TITLE, DISCLAIMER_BODY);
        assert!(dialog.is_visible());
        assert!(dialog.acknowledge());
        assert!(!dialog.is_visible());
        assert!(!dialog.acknowledge());
    }

    #[test]
    fn test_hidden_dialog_keeps_content() {
        let mut dialog = OverlayDialog::default();
        dialog.show("T", "B");
        dialog.acknowledge();
        assert_eq!(dialog.title(), "T");
        assert_eq!(dialog.body(), "B");
    }
}
