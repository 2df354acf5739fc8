pub const SHOW_MORE: &str = "Show more";
pub const SHOW_LESS: &str = "Show less";

/// Expand/collapse state of one row's description block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionToggle {
    expanded: bool,
}

impl DescriptionToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip the block and return the control's new label
    pub fn toggle(&mut self) -> &'static str {
        self.expanded = !self.expanded;
        self.label()
    }

    pub fn label(&self) -> &'static str {
        if self.expanded {
            SHOW_LESS
        } else {
            SHOW_MORE
        }
    }

    /// The text to render: everything when expanded, otherwise at most
    /// `limit` characters followed by an ellipsis.
    pub fn preview<'a>(&self, text: &'a str, limit: usize) -> std::borrow::Cow<'a, str> {
        if self.expanded || text.chars().count() <= limit {
            return std::borrow::Cow::Borrowed(text);
        }
        let cut: String = text.chars().take(limit).collect();
        std::borrow::Cow::Owned(format!("{}…", cut.trim_end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_label() {
        let mut toggle = DescriptionToggle::new();
        assert_eq!(toggle.label(), "Show more");
        assert_eq!(toggle.toggle(), "Show less");
        assert!(toggle.is_expanded());
        assert_eq!(toggle.toggle(), "Show more");
        assert!(!toggle.is_expanded());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let toggle = DescriptionToggle::new();
        assert_eq!(toggle.preview("Smørrebrød recipes", 5), "Smørr…");
        assert_eq!(toggle.preview("short", 10), "short");

        let mut toggle = toggle;
        toggle.toggle();
        assert_eq!(toggle.preview("Smørrebrød recipes", 5), "Smørrebrød recipes");
    }
}
