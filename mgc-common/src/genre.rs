//! Genre vocabulary and per-genre probability records
//!
//! The classifier speaks a closed vocabulary of 10 labels. Everything that crosses a
//! storage or network boundary is parsed into [`Genre`] and [`GenreProbabilities`] so
//! partial maps and unknown labels are rejected at the edge.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 10 classification labels
///
/// Declaration order is the canonical ordering used for tie-breaks and iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Blues,
    Classical,
    Country,
    Disco,
    Hiphop,
    Jazz,
    Metal,
    Pop,
    Reggae,
    Rock,
}

impl Genre {
    /// All genres in canonical order
    pub const ALL: [Genre; 10] = [
        Genre::Blues,
        Genre::Classical,
        Genre::Country,
        Genre::Disco,
        Genre::Hiphop,
        Genre::Jazz,
        Genre::Metal,
        Genre::Pop,
        Genre::Reggae,
        Genre::Rock,
    ];

    /// Lowercase wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Blues => "blues",
            Genre::Classical => "classical",
            Genre::Country => "country",
            Genre::Disco => "disco",
            Genre::Hiphop => "hiphop",
            Genre::Jazz => "jazz",
            Genre::Metal => "metal",
            Genre::Pop => "pop",
            Genre::Reggae => "reggae",
            Genre::Rock => "rock",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown genre: {:?}", s)))
    }
}

/// Probability for each of the 10 genres
///
/// Fixed-shape record: deserializing a map that lacks any genre key fails.
/// Values are trusted as produced by the classifier; no sum-to-one check is made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenreProbabilities {
    pub blues: f64,
    pub classical: f64,
    pub country: f64,
    pub disco: f64,
    pub hiphop: f64,
    pub jazz: f64,
    pub metal: f64,
    pub pop: f64,
    pub reggae: f64,
    pub rock: f64,
}

impl GenreProbabilities {
    /// Probability assigned to `genre`
    pub fn get(&self, genre: Genre) -> f64 {
        match genre {
            Genre::Blues => self.blues,
            Genre::Classical => self.classical,
            Genre::Country => self.country,
            Genre::Disco => self.disco,
            Genre::Hiphop => self.hiphop,
            Genre::Jazz => self.jazz,
            Genre::Metal => self.metal,
            Genre::Pop => self.pop,
            Genre::Reggae => self.reggae,
            Genre::Rock => self.rock,
        }
    }

    /// (genre, probability) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Genre, f64)> + '_ {
        Genre::ALL.iter().map(move |&genre| (genre, self.get(genre)))
    }

    /// Genre with the highest probability
    ///
    /// Ties go to the genre that comes first in canonical order. NaN never wins;
    /// an all-NaN record yields the first canonical genre.
    pub fn top_genre(&self) -> Genre {
        let mut best: Option<(Genre, f64)> = None;
        for (genre, value) in self.iter() {
            if value.is_nan() {
                continue;
            }
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((genre, value)),
            }
        }
        best.map(|(genre, _)| genre).unwrap_or(Genre::ALL[0])
    }
}

/// Classifier result: the predicted label plus the full probability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub genre: Genre,
    pub probabilities: GenreProbabilities,
}

/// Fixed probability table substituted when the classifier is unavailable
pub const FALLBACK_PROBABILITIES: GenreProbabilities = GenreProbabilities {
    blues: 0.05,
    classical: 0.05,
    country: 0.05,
    disco: 0.05,
    hiphop: 0.10,
    jazz: 0.05,
    metal: 0.05,
    pop: 0.25,
    reggae: 0.05,
    rock: 0.35,
};

/// Deterministic substitute prediction (always `rock`)
pub fn fallback_prediction() -> PredictionResponse {
    PredictionResponse {
        genre: FALLBACK_PROBABILITIES.top_genre(),
        probabilities: FALLBACK_PROBABILITIES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uniform(value: f64) -> GenreProbabilities {
        GenreProbabilities {
            blues: value,
            classical: value,
            country: value,
            disco: value,
            hiphop: value,
            jazz: value,
            metal: value,
            pop: value,
            reggae: value,
            rock: value,
        }
    }

    #[test]
    fn test_genre_labels_parse() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
        assert_eq!("hiphop".parse::<Genre>().unwrap(), Genre::Hiphop);
    }

    #[test]
    fn test_genre_rejects_unknown_and_mixed_case() {
        assert!("polka".parse::<Genre>().is_err());
        assert!("Rock".parse::<Genre>().is_err());
        assert!("".parse::<Genre>().is_err());
        assert!("all".parse::<Genre>().is_err());
    }

    #[test]
    fn test_genre_serde_uses_lowercase_label() {
        assert_eq!(serde_json::to_value(Genre::Hiphop).unwrap(), json!("hiphop"));
        let parsed: Genre = serde_json::from_value(json!("classical")).unwrap();
        assert_eq!(parsed, Genre::Classical);
    }

    #[test]
    fn test_fallback_is_rock() {
        let fallback = fallback_prediction();
        assert_eq!(fallback.genre, Genre::Rock);
        assert_eq!(fallback.probabilities.rock, 0.35);
        assert_eq!(fallback.probabilities.pop, 0.25);
        assert_eq!(fallback.probabilities.hiphop, 0.10);
        assert_eq!(fallback, fallback_prediction());
    }

    #[test]
    fn test_fallback_serializes_all_ten_keys() {
        let value = serde_json::to_value(fallback_prediction()).unwrap();
        assert_eq!(value["genre"], "rock");
        let probabilities = value["probabilities"].as_object().unwrap();
        assert_eq!(probabilities.len(), 10);
        for genre in Genre::ALL {
            assert!(probabilities.contains_key(genre.as_str()));
        }
    }

    #[test]
    fn test_top_genre_tie_breaks_on_canonical_order() {
        assert_eq!(uniform(0.1).top_genre(), Genre::Blues);

        let mut probabilities = uniform(0.0);
        probabilities.jazz = 0.4;
        probabilities.metal = 0.4;
        assert_eq!(probabilities.top_genre(), Genre::Jazz);
    }

    #[test]
    fn test_top_genre_ignores_nan() {
        let mut probabilities = uniform(0.05);
        probabilities.blues = f64::NAN;
        probabilities.reggae = 0.6;
        assert_eq!(probabilities.top_genre(), Genre::Reggae);
        assert_eq!(uniform(f64::NAN).top_genre(), Genre::Blues);
    }

    #[test]
    fn test_probabilities_reject_partial_map() {
        let partial = json!({ "rock": 1.0, "pop": 0.0 });
        assert!(serde_json::from_value::<GenreProbabilities>(partial).is_err());
    }

    #[test]
    fn test_probabilities_ignore_extra_keys() {
        let mut value = serde_json::to_value(uniform(0.1)).unwrap();
        value["polka"] = json!(0.9);
        let parsed: GenreProbabilities = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, uniform(0.1));
    }

    #[test]
    fn test_iter_follows_canonical_order() {
        let genres: Vec<Genre> = FALLBACK_PROBABILITIES.iter().map(|(g, _)| g).collect();
        assert_eq!(genres, Genre::ALL.to_vec());
    }
}
