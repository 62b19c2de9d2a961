//! Series listed by a provider's catalog.

use serde::{Deserialize, Serialize};

/// A series as shown in a library listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL of a cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Series {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            thumbnail: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(Series::new("1", "Test Series 1")).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "1", "name": "Test Series 1" }));

        let series: Series = serde_json::from_str(
            r#"{"id":"2","name":"Two","description":"d","thumbnail":"http://x/t.png"}"#,
        )
        .unwrap();
        assert_eq!(
            series,
            Series::new("2", "Two")
                .with_description("d")
                .with_thumbnail("http://x/t.png")
        );
    }
}
