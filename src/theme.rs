use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub line_color: String,
    pub background: String,
    /// Categorical fill colours, cycled by depth or sibling index.
    pub palette: Vec<String>,
}

impl Theme {
    pub fn elastic_default() -> Self {
        Self {
            font_family: "\"Inter UI\", -apple-system, BlinkMacSystemFont, \"Segoe UI\", Helvetica, Arial, sans-serif"
                .to_string(),
            text_color: "#343741".to_string(),
            line_color: "#69707D".to_string(),
            background: "#FFFFFF".to_string(),
            palette: [
                "#54B399", "#6092C0", "#D36086", "#9170B8", "#CA8EAE", "#D6BF57", "#B9A888",
                "#DA8B45", "#AA6556", "#E7664C",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
            palette: [
                "#4C78A8", "#F58518", "#54A24B", "#E45756", "#72B7B2", "#EECA3B", "#B279A2",
                "#FF9DA6", "#9D755D", "#BAB0AC",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "default" | "base" | "elastic" => Some(Self::elastic_default()),
            _ => None,
        }
    }

    pub fn palette_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#808080";
        }
        &self.palette[index % self.palette.len()]
    }
}
