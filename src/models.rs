use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

pub type MovieId = i32;

/// The projection of a movie used by grids and stored in the watchlist.
///
/// Field names are the TMDB names and are kept verbatim in the persisted
/// watchlist, so renaming a field here is a storage migration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i32>,
}

impl MovieSummary {
    pub fn release_year(&self) -> Option<i16> {
        release_year(&self.release_date)
    }

    pub fn year_label(&self) -> String {
        self.release_year().map(|y| y.to_string()).unwrap_or_else(|| "N/A".to_string())
    }

    /// One decimal, or "N/A" for unrated movies.
    pub fn rating_label(&self) -> String {
        if self.vote_average > 0.0 {
            format!("{:.1}", self.vote_average)
        } else {
            "N/A".to_string()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CrewMember {
    pub id: i32,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Video {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.key)
    }

    fn is_youtube(&self) -> bool {
        self.site == "YouTube"
    }

    fn is_trailer(&self) -> bool {
        self.kind == "Trailer"
    }
}

/// TMDB's `{ "results": [...] }` wrapper used by appended responses.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ResultList<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for ResultList<T> {
    fn default() -> Self {
        Self { results: Vec::new() }
    }
}

/// Full record for the detail page. Never stored; see [`MovieDetail::summary`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub videos: ResultList<Video>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub similar: ResultList<MovieSummary>,
}

impl MovieDetail {
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
        }
    }

    pub fn year_label(&self) -> String {
        release_year(&self.release_date)
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(minutes) => format!("{}h {}m", minutes / 60, minutes % 60),
            None => "Unknown".to_string(),
        }
    }

    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Official YouTube trailer, then any YouTube trailer, then any YouTube video.
    pub fn trailer(&self) -> Option<&Video> {
        let videos = &self.videos.results;
        videos
            .iter()
            .find(|v| v.is_youtube() && v.is_trailer() && v.name.contains("Official"))
            .or_else(|| videos.iter().find(|v| v.is_youtube() && v.is_trailer()))
            .or_else(|| videos.iter().find(|v| v.is_youtube()))
    }

    pub fn director(&self) -> Option<&str> {
        self.credits.crew.iter().find(|c| c.job == "Director").map(|c| c.name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Person {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for: Vec<MovieSummary>,
}

impl Person {
    /// TV credits carry `name` rather than `title`, so they show as "Unknown".
    pub fn known_for_title(&self) -> Option<&str> {
        self.known_for.first().map(|m| if m.title.is_empty() { "Unknown" } else { m.title.as_str() })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchResults<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn release_year(release_date: &str) -> Option<i16> {
    release_date.trim().parse::<Date>().ok().map(|d| d.year())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn sample_movie(id: MovieId, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: Some(format!("/backdrop-{id}.jpg")),
        release_date: "2023-01-01".to_string(),
        vote_average: 8.5,
        overview: format!("Overview of {title}"),
        genre_ids: vec![28, 12],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn video(name: &str, site: &str, kind: &str) -> Video {
        Video {
            id: name.to_lowercase(),
            key: format!("key-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            site: site.to_string(),
            kind: kind.to_string(),
        }
    }

    fn detail_json() -> serde_json::Value {
        json!({
            "id": 550,
            "title": "Fight Club",
            "poster_path": "/poster.jpg",
            "backdrop_path": null,
            "release_date": "1999-10-15",
            "vote_average": 8.433,
            "overview": "A ticking-time-bomb insomniac...",
            "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}],
            "runtime": 139,
            "tagline": "Mischief. Mayhem. Soap.",
            "videos": {"results": [
                {"id": "v1", "key": "abc", "name": "Teaser", "site": "YouTube", "type": "Teaser"}
            ]},
            "credits": {
                "cast": [{"id": 819, "name": "Edward Norton", "character": "Narrator", "profile_path": null}],
                "crew": [
                    {"id": 1, "name": "Art Linson", "job": "Producer", "profile_path": null},
                    {"id": 7467, "name": "David Fincher", "job": "Director", "profile_path": "/df.jpg"}
                ]
            },
            "similar": {"results": [{"id": 807, "title": "Se7en", "release_date": null, "genre_ids": [80]}]}
        })
    }

    #[test]
    fn detail_projects_to_summary_with_genre_ids() {
        let detail: MovieDetail = serde_json::from_value(detail_json()).unwrap();
        let summary = detail.summary();

        assert_eq!(summary.id, 550);
        assert_eq!(summary.title, "Fight Club");
        assert_eq!(summary.backdrop_path, None);
        assert_eq!(summary.genre_ids, vec![18, 53]);
        assert_eq!(summary.release_year(), Some(1999));
    }

    #[test]
    fn detail_helpers() {
        let detail: MovieDetail = serde_json::from_value(detail_json()).unwrap();

        assert_eq!(detail.runtime_label(), "2h 19m");
        assert_eq!(detail.director(), Some("David Fincher"));
        assert_eq!(detail.tagline(), Some("Mischief. Mayhem. Soap."));
        assert_eq!(detail.trailer().map(|v| v.key.as_str()), Some("abc"));
        assert_eq!(detail.similar.results[0].release_date, "");
        assert_eq!(detail.similar.results[0].year_label(), "N/A");
    }

    #[test]
    fn missing_appended_sections_default_to_empty() {
        let detail: MovieDetail =
            serde_json::from_value(json!({"id": 1, "title": "Bare", "runtime": null})).unwrap();

        assert!(detail.credits.cast.is_empty());
        assert!(detail.similar.results.is_empty());
        assert_eq!(detail.trailer(), None);
        assert_eq!(detail.director(), None);
        assert_eq!(detail.runtime_label(), "Unknown");
    }

    #[test]
    fn trailer_prefers_official_youtube_trailer() {
        let mut detail: MovieDetail =
            serde_json::from_value(json!({"id": 1, "title": "Pick"})).unwrap();
        detail.videos.results = vec![
            video("Behind the Scenes", "YouTube", "Featurette"),
            video("Trailer 2", "Vimeo", "Trailer"),
            video("Trailer 1", "YouTube", "Trailer"),
            video("Official Trailer", "YouTube", "Trailer"),
        ];
        assert_eq!(detail.trailer().unwrap().name, "Official Trailer");

        detail.videos.results.pop();
        assert_eq!(detail.trailer().unwrap().name, "Trailer 1");

        detail.videos.results.pop();
        assert_eq!(detail.trailer().unwrap().name, "Behind the Scenes");

        detail.videos.results = vec![video("Trailer 2", "Vimeo", "Trailer")];
        assert_eq!(detail.trailer(), None);
    }

    #[test]
    fn summary_labels() {
        let mut movie = sample_movie(1, "Test Movie");
        assert_eq!(movie.year_label(), "2023");
        assert_eq!(movie.rating_label(), "8.5");

        movie.vote_average = 0.0;
        movie.release_date = "soon".to_string();
        assert_eq!(movie.rating_label(), "N/A");
        assert_eq!(movie.year_label(), "N/A");
    }

    #[test]
    fn summary_serializes_with_verbatim_field_names() {
        let value = serde_json::to_value(sample_movie(1, "Test Movie")).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(
            keys,
            [
                "backdrop_path",
                "genre_ids",
                "id",
                "overview",
                "poster_path",
                "release_date",
                "title",
                "vote_average"
            ]
        );
    }

    #[test]
    fn person_known_for_falls_back_for_tv_credits() {
        let person: Person = serde_json::from_value(json!({
            "id": 287,
            "name": "Brad Pitt",
            "profile_path": "/bp.jpg",
            "known_for": [{"id": 1399, "name": "Some Show", "media_type": "tv"}]
        }))
        .unwrap();
        assert_eq!(person.known_for_title(), Some("Unknown"));

        let person: Person =
            serde_json::from_value(json!({"id": 2, "name": "Nobody", "known_for": null})).unwrap();
        assert_eq!(person.known_for_title(), None);
    }
}
