use serde::{Deserialize, Serialize};

use crate::entities::Language;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub title_en: String,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub stops: Vec<String>,
}

impl Tour {
    pub fn title(&self, language: Language) -> &str {
        match (language, &self.title_ru) {
            (Language::Ru, Some(title)) => title,
            _ => &self.title_en,
        }
    }
}
