//! History query: a principal's past predictions, newest first
//!
//! Anonymous callers get an empty list, never an error.

use mgc_common::{Genre, Result};
use sqlx::SqlitePool;

use crate::db::predictions;
use crate::models::{PredictionRecord, Principal};

/// Sentinel filter value meaning "every genre"
pub const ALL_GENRES: &str = "all";

/// Parsed `genreFilter` argument; an empty value means no filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreFilter {
    All,
    Only(Genre),
    /// Not a genre label; matches no record
    Unmatched,
}

impl GenreFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some(ALL_GENRES) => GenreFilter::All,
            Some(label) => label
                .parse::<Genre>()
                .map(GenreFilter::Only)
                .unwrap_or(GenreFilter::Unmatched),
        }
    }

    pub fn matches(&self, genre: Genre) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(wanted) => *wanted == genre,
            GenreFilter::Unmatched => false,
        }
    }
}

/// List the caller's records, optionally restricted to one genre
///
/// The filter is applied after the time-ordered fetch, so it never reorders records.
pub async fn list_history(
    pool: &SqlitePool,
    principal: Option<&Principal>,
    genre_filter: Option<&str>,
) -> Result<Vec<PredictionRecord>> {
    let Some(principal) = principal else {
        return Ok(Vec::new());
    };

    let filter = GenreFilter::parse(genre_filter);
    let records = predictions::list_by_owner(pool, principal.user_id).await?;

    Ok(records
        .into_iter()
        .filter(|record| filter.matches(record.predicted_genre))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(GenreFilter::parse(None), GenreFilter::All);
        assert_eq!(GenreFilter::parse(Some("all")), GenreFilter::All);
        assert_eq!(GenreFilter::parse(Some("jazz")), GenreFilter::Only(Genre::Jazz));
        assert_eq!(GenreFilter::parse(Some("Jazz")), GenreFilter::Unmatched);
        assert_eq!(GenreFilter::parse(Some("")), GenreFilter::All);
        assert_eq!(GenreFilter::parse(Some(" ")), GenreFilter::Unmatched);
    }

    #[test]
    fn test_filter_matches() {
        assert!(GenreFilter::All.matches(Genre::Blues));
        assert!(GenreFilter::Only(Genre::Rock).matches(Genre::Rock));
        assert!(!GenreFilter::Only(Genre::Rock).matches(Genre::Pop));
        assert!(!GenreFilter::Unmatched.matches(Genre::Rock));
    }
}
