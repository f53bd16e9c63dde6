//! Argos output: the first line is the panel label, lines after `---` form
//! the dropdown, and `| key=value ...` after a line sets its attributes.

/// One Argos line with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgosItem {
    text: String,
    attrs: Vec<(String, String)>,
}

impl ArgosItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.push((key.to_string(), value.into()));
        self
    }

    pub fn href(self, url: impl Into<String>) -> Self {
        self.attr("href", url)
    }

    pub fn color(self, color: impl Into<String>) -> Self {
        self.attr("color", color)
    }

    pub fn size(self, size: u32) -> Self {
        self.attr("size", size.to_string())
    }

    pub fn font(self, font: impl Into<String>) -> Self {
        self.attr("font", font)
    }

    pub fn refresh(self) -> Self {
        self.attr("refresh", "true")
    }

    pub fn dropdown(self, show: bool) -> Self {
        self.attr("dropdown", show.to_string())
    }

    fn render(&self) -> String {
        // A raw newline or pipe would break the line protocol.
        let text = self.text.replace('\n', " ").replace('|', "│");
        if self.attrs.is_empty() {
            return text;
        }
        let attrs: Vec<String> = self.attrs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{} | {}", text, attrs.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Item(ArgosItem),
    Separator,
}

/// Builder for a full Argos frame.
#[derive(Debug, Clone, Default)]
pub struct ArgosMenu {
    lines: Vec<Line>,
}

impl ArgosMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: ArgosItem) -> Self {
        self.lines.push(Line::Item(item));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.item(ArgosItem::new(text))
    }

    pub fn separator(mut self) -> Self {
        self.lines.push(Line::Separator);
        self
    }

    pub fn push(&mut self, item: ArgosItem) {
        self.lines.push(Line::Item(item));
    }

    pub fn push_separator(&mut self) {
        self.lines.push(Line::Separator);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Item(item) => out.push_str(&item.render()),
                Line::Separator => out.push_str("---"),
            }
            out.push('\n');
        }
        out
    }
}

/// The "refresh" entry and check timestamp every widget ends with.
pub fn footer(menu: &mut ArgosMenu, label: &str, time: &str, color: &str, size: u32) {
    menu.push_separator();
    menu.push(ArgosItem::new("🔄 Refresh").refresh().size(11));
    menu.push(
        ArgosItem::new(format!("{label}: {time}"))
            .size(size)
            .color(color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_menu() {
        let menu = ArgosMenu::new()
            .text("🟢 ☁️")
            .separator()
            .item(ArgosItem::new("Service Health Monitor").size(14))
            .item(
                ArgosItem::new("🟢 GitHub")
                    .href("https://www.githubstatus.com/")
                    .color("#2ecc71"),
            );
        assert_eq!(
            menu.render(),
            "🟢 ☁️\n---\nService Health Monitor | size=14\n🟢 GitHub | href=https://www.githubstatus.com/ color=#2ecc71\n"
        );
    }

    #[test]
    fn test_text_is_sanitized() {
        let menu = ArgosMenu::new().text("a|b\nc");
        assert_eq!(menu.render(), "a│b c\n");
    }

    #[test]
    fn test_footer() {
        let mut menu = ArgosMenu::new();
        footer(&mut menu, "Last checked", "12:00:00", "#7f8c8d", 10);
        assert_eq!(
            menu.render(),
            "---\n🔄 Refresh | refresh=true size=11\nLast checked: 12:00:00 | size=10 color=#7f8c8d\n"
        );
    }
}
