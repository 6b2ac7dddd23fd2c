use std::fmt;
use std::str::FromStr;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(anyhow::anyhow!("unsupported language: {other}")),
        }
    }
}

/// A document stored in the `documents` collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub filename: String,
    pub text: String,
    pub language: Language,
    pub indexed_at: DateTime,
}

impl IndexedDocument {
    pub fn new(filename: String, text: String, language: Language) -> IndexedDocument {
        IndexedDocument {
            id: ObjectId::new(),
            filename,
            text,
            language,
            indexed_at: DateTime::now(),
        }
    }
}
