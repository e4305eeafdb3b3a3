//! DTOs for decoding catalog JSON responses.

use serde::Deserialize;
use url::Url;

use crate::domain::{PlayerInfo, TitleDetails, TitleId};

#[derive(Debug, Deserialize)]
pub(super) struct AnimeDto {
    pub(super) name: Option<String>,
    pub(super) russian: Option<String>,
    #[serde(default)]
    pub(super) english: Vec<Option<String>>,
    pub(super) description: Option<String>,
    pub(super) image: Option<ImageDto>,
    pub(super) episodes: Option<u32>,
    pub(super) status: Option<String>,
    /// Upstream sends the score as a decimal string.
    pub(super) score: Option<String>,
    #[serde(default)]
    pub(super) genres: Vec<GenreDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageDto {
    pub(super) original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenreDto {
    pub(super) name: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl AnimeDto {
    /// Map into domain details, resolving relative poster paths against `origin`.
    pub(super) fn into_details(self, title_id: &TitleId, origin: &Url) -> Result<TitleDetails, String> {
        let title = non_blank(self.name)
            .or_else(|| non_blank(self.russian))
            .ok_or_else(|| format!("title {title_id} has no name"))?;
        let poster_url = self
            .image
            .and_then(|image| non_blank(image.original))
            .and_then(|path| origin.join(&path).ok())
            .map(String::from);
        Ok(TitleDetails {
            title_id: title_id.clone(),
            title,
            title_english: self.english.into_iter().flatten().find(|t| !t.trim().is_empty()),
            synopsis: non_blank(self.description),
            poster_url,
            episodes: self.episodes.filter(|n| *n > 0),
            status: non_blank(self.status),
            score: self
                .score
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|s| *s > 0.0),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PlayerSearchDto {
    #[serde(default)]
    pub(super) results: Vec<PlayerResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlayerResultDto {
    pub(super) link: Option<String>,
    pub(super) episodes_count: Option<u32>,
}

impl PlayerSearchDto {
    /// First result with a usable link; protocol-relative links gain `https:`.
    pub(super) fn into_player(self, title_id: &TitleId) -> Option<PlayerInfo> {
        self.results.into_iter().find_map(|result| {
            let link = non_blank(result.link)?;
            let embed_url = if link.starts_with("//") {
                format!("https:{link}")
            } else {
                link
            };
            Some(PlayerInfo {
                title_id: title_id.clone(),
                episodes_total: result.episodes_count,
                embed_url,
            })
        })
    }
}
