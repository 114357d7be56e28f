use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Json,
    JavaScript,
    Sql,
    Markdown,
    #[default]
    PlainText,
}

impl LanguageId {
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonc" => Self::Json,
            "javascript" | "js" => Self::JavaScript,
            "sql" => Self::Sql,
            "markdown" | "md" => Self::Markdown,
            _ => Self::PlainText,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JavaScript => "javascript",
            Self::Sql => "sql",
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
        }
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
