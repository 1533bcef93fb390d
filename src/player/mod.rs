mod opener;

pub use opener::UrlOpener;

use crate::catalog::MediaId;

/// What the embed provider should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    Movie {
        id: MediaId,
    },
    Episode {
        series_id: MediaId,
        season: u32,
        episode: u32,
    },
}

impl PlaybackTarget {
    /// Location on the embed provider. Deterministic for a given target.
    pub fn embed_url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            PlaybackTarget::Movie { id } => format!("{}/movie/{}", base, id),
            PlaybackTarget::Episode {
                series_id,
                season,
                episode,
            } => format!("{}/tv/{}/{}/{}", base, series_id, season, episode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_embed_url() {
        let target = PlaybackTarget::Movie { id: 603 };
        assert_eq!(
            target.embed_url("https://vidsrc.icu/embed"),
            "https://vidsrc.icu/embed/movie/603"
        );
    }

    #[test]
    fn test_episode_embed_url() {
        let target = PlaybackTarget::Episode {
            series_id: 1399,
            season: 2,
            episode: 5,
        };
        assert_eq!(
            target.embed_url("https://vidsrc.icu/embed/"),
            "https://vidsrc.icu/embed/tv/1399/2/5"
        );
    }
}
