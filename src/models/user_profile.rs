use serde::{Deserialize, Serialize};

/// Preferences a recommendation request is built from
///
/// Immutable for the duration of a request. List entries that are blank (the form sends
/// `[""]` when nothing was picked) mean "no constraint" and never become filter terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub recent_watches: Vec<String>,
    pub other_comments: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            themes: vec!["Space".to_string(), "Love".to_string(), "Action".to_string()],
            actors: Vec::new(),
            directors: Vec::new(),
            recent_watches: vec!["Chopping Mall".to_string()],
            other_comments: "I like movies with robots".to_string(),
        }
    }
}

impl UserProfile {
    /// Genres that should constrain a structured query
    pub fn active_genres(&self) -> Vec<&str> {
        active(&self.genres)
    }

    pub fn active_themes(&self) -> Vec<&str> {
        active(&self.themes)
    }

    pub fn active_actors(&self) -> Vec<&str> {
        active(&self.actors)
    }

    pub fn active_directors(&self) -> Vec<&str> {
        active(&self.directors)
    }

    pub fn active_recent_watches(&self) -> Vec<&str> {
        active(&self.recent_watches)
    }

    /// Flat `key -> value` rendering, one line per field, used as embedding input
    /// and as the profile shown to the language model.
    pub fn to_metadata_str(&self) -> String {
        let mut metadata = String::new();
        for (key, values) in [
            ("genres", &self.genres),
            ("themes", &self.themes),
            ("actors", &self.actors),
            ("directors", &self.directors),
            ("recent_watches", &self.recent_watches),
        ] {
            metadata.push_str(&format!("{} -> {}\n", key, render_list(values)));
        }
        metadata.push_str(&format!("other_comments -> {}\n", self.other_comments));
        metadata
    }
}

fn active(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Renders a list as `['a', 'b']`
pub fn render_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    format!("[{}]", quoted.join(", "))
}
