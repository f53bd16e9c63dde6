use serde::Serialize;

/// One frame for a waybar `custom` module with `return-type = "json"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaybarOutput {
    pub text: String,
    pub tooltip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl WaybarOutput {
    pub fn new(text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tooltip: tooltip.into(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Single-line JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"text":"?","tooltip":""}"#.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json() {
        let out = WaybarOutput::new("✅", "a\nb").with_class("normal");
        assert_eq!(out.to_json(), r#"{"text":"✅","tooltip":"a\nb","class":"normal"}"#);
    }

    #[test]
    fn test_class_omitted_when_unset() {
        assert_eq!(WaybarOutput::new("x", "y").to_json(), r#"{"text":"x","tooltip":"y"}"#);
    }
}
