//! Detail view orchestration.
//!
//! The orchestrator never performs I/O. Every transition that needs data
//! returns a [`DetailCommand`]; the caller runs it and feeds the outcome back
//! with the same [`RequestToken`]. Results carrying a superseded token are
//! dropped, so out-of-order network completion cannot resurrect old state.

use tracing::{debug, error, info};

use crate::catalog::{
    EpisodeSummary, MediaDetail, MediaId, MediaKind, MediaType, SeasonSummary, TrailerRef,
};
use crate::error::Result;
use crate::player::PlaybackTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailCommand {
    FetchDetail {
        token: RequestToken,
        kind: MediaKind,
        id: MediaId,
    },
    FetchSeason {
        token: RequestToken,
        series_id: MediaId,
        season: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Overview,
    PlayingTrailer,
    PlayingMedia,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeState {
    Idle,
    Loading { season: u32 },
    Loaded {
        season: u32,
        episodes: Vec<EpisodeSummary>,
    },
    Failed { season: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyDetail {
    pub detail: MediaDetail,
    pub display: Display,
    pub seasons: Vec<SeasonSummary>,
    pub selected_season: u32,
    pub selected_episode: u32,
    pub episodes: EpisodeState,
    trailer: Option<TrailerRef>,
}

impl ReadyDetail {
    pub fn trailer(&self) -> Option<&TrailerRef> {
        self.trailer.as_ref()
    }

    /// Episodes of the selected season, only once they have arrived.
    pub fn current_episodes(&self) -> Option<&[EpisodeSummary]> {
        match &self.episodes {
            EpisodeState::Loaded { season, episodes } if *season == self.selected_season => {
                Some(episodes)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPhase {
    Loading,
    Ready(Box<ReadyDetail>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSession {
    pub id: MediaId,
    pub media_type: MediaType,
    pub phase: DetailPhase,
    detail_token: RequestToken,
    season_token: Option<RequestToken>,
}

impl DetailSession {
    pub fn ready(&self) -> Option<&ReadyDetail> {
        match &self.phase {
            DetailPhase::Ready(ready) => Some(&**ready),
            _ => None,
        }
    }

    fn ready_mut(&mut self) -> Option<&mut ReadyDetail> {
        match &mut self.phase {
            DetailPhase::Ready(ready) => Some(&mut **ready),
            _ => None,
        }
    }

    pub fn is_series(&self) -> bool {
        self.media_type.is_series()
    }

    /// Season choices, offered only while playing a series that has seasons.
    pub fn season_selector(&self) -> Option<&[SeasonSummary]> {
        let ready = self.ready()?;
        if self.is_series() && ready.display == Display::PlayingMedia && !ready.seasons.is_empty()
        {
            Some(&ready.seasons)
        } else {
            None
        }
    }

    pub fn playback_target(&self) -> Option<PlaybackTarget> {
        let ready = self.ready()?;
        if ready.display != Display::PlayingMedia {
            return None;
        }

        if self.is_series() {
            Some(PlaybackTarget::Episode {
                series_id: self.id,
                season: ready.selected_season,
                episode: ready.selected_episode,
            })
        } else {
            Some(PlaybackTarget::Movie { id: self.id })
        }
    }

    pub fn trailer_url(&self) -> Option<String> {
        let ready = self.ready()?;
        if ready.display != Display::PlayingTrailer {
            return None;
        }
        ready.trailer().map(TrailerRef::embed_url)
    }
}

pub struct DetailOrchestrator {
    embed_base_url: String,
    last_token: u64,
    session: Option<DetailSession>,
}

impl DetailOrchestrator {
    pub fn new(embed_base_url: String) -> Self {
        Self {
            embed_base_url,
            last_token: 0,
            session: None,
        }
    }

    fn issue_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    pub fn session(&self) -> Option<&DetailSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Start over for a (possibly different) title. Prior state is discarded.
    pub fn open(&mut self, id: MediaId, media_type: MediaType) -> DetailCommand {
        let token = self.issue_token();
        info!(id, media_type = media_type.as_display(), "Opening detail");

        self.session = Some(DetailSession {
            id,
            media_type,
            phase: DetailPhase::Loading,
            detail_token: token,
            season_token: None,
        });

        DetailCommand::FetchDetail {
            token,
            kind: media_type.catalog_kind(),
            id,
        }
    }

    pub fn close(&mut self) {
        self.session = None;
    }

    /// Apply a detail fetch outcome. Returns the initial season fetch for
    /// series that report at least one season.
    pub fn on_detail_loaded(
        &mut self,
        token: RequestToken,
        result: Result<MediaDetail>,
    ) -> Option<DetailCommand> {
        let session = self.session.as_ref()?;
        if session.detail_token != token {
            debug!(?token, "Dropping stale detail response");
            return None;
        }

        let detail = match result {
            Ok(detail) => detail,
            Err(e) => {
                error!(id = session.id, error = %e, "Failed to load detail");
                if let Some(session) = self.session.as_mut() {
                    session.phase = DetailPhase::Failed(e.to_string());
                }
                return None;
            }
        };

        let wants_episodes = session.is_series() && detail.season_count() > 0;
        let series_id = session.id;
        let season_token = wants_episodes.then(|| self.issue_token());

        let ready = ReadyDetail {
            trailer: detail.trailer(),
            seasons: detail.playable_seasons(),
            selected_season: 1,
            selected_episode: 1,
            episodes: if wants_episodes {
                EpisodeState::Loading { season: 1 }
            } else {
                EpisodeState::Idle
            },
            display: Display::Overview,
            detail,
        };

        let session = self.session.as_mut()?;
        session.phase = DetailPhase::Ready(Box::new(ready));
        session.season_token = season_token;

        season_token.map(|token| DetailCommand::FetchSeason {
            token,
            series_id,
            season: 1,
        })
    }

    /// Apply an episode list. Returns false when the response was stale.
    pub fn on_season_loaded(
        &mut self,
        token: RequestToken,
        season: u32,
        result: Result<Vec<EpisodeSummary>>,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.season_token != Some(token) {
            debug!(?token, season, "Dropping superseded season response");
            return false;
        }
        let series_id = session.id;
        let Some(ready) = session.ready_mut() else {
            return false;
        };
        if ready.selected_season != season {
            debug!(season, selected = ready.selected_season, "Dropping season response");
            return false;
        }

        ready.episodes = match result {
            Ok(episodes) => {
                debug!(series_id, season, count = episodes.len(), "Episodes loaded");
                EpisodeState::Loaded { season, episodes }
            }
            Err(e) => {
                error!(series_id, season, error = %e, "Failed to load episodes");
                EpisodeState::Failed { season }
            }
        };
        true
    }

    pub fn play_media(&mut self) -> bool {
        let Some(ready) = self.session.as_mut().and_then(DetailSession::ready_mut) else {
            return false;
        };
        ready.display = Display::PlayingMedia;
        true
    }

    /// Unavailable when the title has no trailer.
    pub fn play_trailer(&mut self) -> bool {
        let Some(ready) = self.session.as_mut().and_then(DetailSession::ready_mut) else {
            return false;
        };
        if ready.trailer.is_none() {
            return false;
        }
        ready.display = Display::PlayingTrailer;
        true
    }

    pub fn back_to_overview(&mut self) -> bool {
        let Some(ready) = self.session.as_mut().and_then(DetailSession::ready_mut) else {
            return false;
        };
        let changed = ready.display != Display::Overview;
        ready.display = Display::Overview;
        changed
    }

    /// Select a season while playing a series. The episode always resets to 1
    /// and a fresh episode fetch supersedes any in flight.
    pub fn select_season(&mut self, season: u32) -> Option<DetailCommand> {
        let session = self.session.as_ref()?;
        let offered = session
            .season_selector()?
            .iter()
            .any(|s| s.season_number == season);
        if !offered {
            return None;
        }

        let ready = session.ready()?;
        let reuse = ready.selected_season == season
            && matches!(
                ready.episodes,
                EpisodeState::Loading { .. } | EpisodeState::Loaded { .. }
            );

        let token = (!reuse).then(|| self.issue_token());
        let session = self.session.as_mut()?;
        let series_id = session.id;
        if token.is_some() {
            session.season_token = token;
        }
        let ready = session.ready_mut()?;
        ready.selected_season = season;
        ready.selected_episode = 1;

        let token = token?;
        ready.episodes = EpisodeState::Loading { season };
        debug!(series_id, season, "Season selected");
        Some(DetailCommand::FetchSeason {
            token,
            series_id,
            season,
        })
    }

    /// Step to the neighbouring offered season.
    pub fn step_season(&mut self, forward: bool) -> Option<DetailCommand> {
        let session = self.session.as_ref()?;
        let seasons = session.season_selector()?;
        let current = session.ready()?.selected_season;
        let pos = seasons.iter().position(|s| s.season_number == current);
        let next = match (pos, forward) {
            (Some(i), true) => seasons.get(i + 1),
            (Some(i), false) => i.checked_sub(1).and_then(|i| seasons.get(i)),
            (None, _) => seasons.first(),
        }?;
        let season = next.season_number;
        self.select_season(season)
    }

    /// Only episodes of the loaded, currently selected season are valid.
    pub fn select_episode(&mut self, episode: u32) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.is_series() {
            return false;
        }
        let Some(ready) = session.ready_mut() else {
            return false;
        };
        if ready.display != Display::PlayingMedia {
            return false;
        }
        let known = ready
            .current_episodes()
            .is_some_and(|eps| eps.iter().any(|e| e.episode_number == episode));
        if known {
            ready.selected_episode = episode;
        }
        known
    }

    pub fn step_episode(&mut self, forward: bool) -> bool {
        let Some(ready) = self.session.as_ref().and_then(DetailSession::ready) else {
            return false;
        };
        let Some(episodes) = ready.current_episodes() else {
            return false;
        };
        let pos = episodes
            .iter()
            .position(|e| e.episode_number == ready.selected_episode);
        let next = match (pos, forward) {
            (Some(i), true) => episodes.get(i + 1),
            (Some(i), false) => i.checked_sub(1).and_then(|i| episodes.get(i)),
            (None, _) => episodes.first(),
        };
        match next.map(|e| e.episode_number) {
            Some(number) => self.select_episode(number),
            None => false,
        }
    }

    pub fn playback_url(&self) -> Option<String> {
        self.session
            .as_ref()?
            .playback_target()
            .map(|t| t.embed_url(&self.embed_base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{Video, VideoCollection};
    use crate::error::Error;

    const EMBED: &str = "https://vidsrc.icu/embed";

    fn series_detail(id: MediaId, seasons: u32) -> MediaDetail {
        MediaDetail {
            id,
            title: None,
            name: Some("Show".to_string()),
            poster_path: None,
            backdrop_path: None,
            overview: String::new(),
            release_date: None,
            first_air_date: Some("2020-01-01".to_string()),
            vote_average: 8.0,
            genres: Vec::new(),
            runtime: None,
            number_of_seasons: Some(seasons),
            videos: None,
            seasons: Some(
                (0..=seasons)
                    .map(|n| SeasonSummary {
                        id: 100 + n as u64,
                        name: if n == 0 {
                            "Specials".to_string()
                        } else {
                            format!("Season {}", n)
                        },
                        season_number: n,
                        episode_count: 3,
                    })
                    .collect(),
            ),
        }
    }

    fn movie_detail(id: MediaId, videos: Vec<Video>) -> MediaDetail {
        MediaDetail {
            id,
            title: Some("Film".to_string()),
            name: None,
            poster_path: None,
            backdrop_path: None,
            overview: String::new(),
            release_date: Some("2010-07-15".to_string()),
            first_air_date: None,
            vote_average: 8.4,
            genres: Vec::new(),
            runtime: Some(148),
            number_of_seasons: None,
            videos: Some(VideoCollection { results: videos }),
            seasons: None,
        }
    }

    fn episodes(season: u32, count: u32) -> Vec<EpisodeSummary> {
        (1..=count)
            .map(|n| EpisodeSummary {
                id: (season * 1000 + n) as u64,
                name: format!("S{} E{}", season, n),
                episode_number: n,
                season_number: season,
            })
            .collect()
    }

    fn token_of(cmd: &DetailCommand) -> RequestToken {
        match cmd {
            DetailCommand::FetchDetail { token, .. } | DetailCommand::FetchSeason { token, .. } => {
                *token
            }
        }
    }

    /// Open a series, resolve its detail and season 1, and start playback.
    fn playing_series(seasons: u32) -> DetailOrchestrator {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(1399, MediaType::Series);
        let fetch = orch
            .on_detail_loaded(token_of(&open), Ok(series_detail(1399, seasons)))
            .unwrap();
        assert!(orch.on_season_loaded(token_of(&fetch), 1, Ok(episodes(1, 3))));
        assert!(orch.play_media());
        orch
    }

    fn ready(orch: &DetailOrchestrator) -> &ReadyDetail {
        orch.session().unwrap().ready().unwrap()
    }

    #[test]
    fn test_series_ready_fetches_first_season() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(1399, MediaType::Anime);
        assert_eq!(
            open,
            DetailCommand::FetchDetail {
                token: token_of(&open),
                kind: MediaKind::Tv,
                id: 1399
            }
        );

        let fetch = orch.on_detail_loaded(token_of(&open), Ok(series_detail(1399, 2)));
        assert!(matches!(
            fetch,
            Some(DetailCommand::FetchSeason {
                series_id: 1399,
                season: 1,
                ..
            })
        ));
        assert_eq!(ready(&orch).episodes, EpisodeState::Loading { season: 1 });
        assert_eq!(ready(&orch).seasons.len(), 2);
    }

    #[test]
    fn test_zero_seasons_never_fetch() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(5, MediaType::Series);
        let mut detail = series_detail(5, 0);
        detail.seasons = Some(Vec::new());

        assert_eq!(orch.on_detail_loaded(token_of(&open), Ok(detail)), None);
        assert!(orch.play_media());
        let session = orch.session().unwrap();
        assert!(session.season_selector().is_none());
        assert_eq!(ready(&orch).episodes, EpisodeState::Idle);
        assert_eq!(orch.select_season(1), None);
    }

    #[test]
    fn test_season_change_resets_episode() {
        let mut orch = playing_series(3);
        assert!(orch.select_episode(3));
        assert_eq!(ready(&orch).selected_episode, 3);

        let cmd = orch.select_season(2).unwrap();
        assert!(matches!(cmd, DetailCommand::FetchSeason { season: 2, .. }));
        assert_eq!(ready(&orch).selected_season, 2);
        assert_eq!(ready(&orch).selected_episode, 1);
        assert_eq!(ready(&orch).episodes, EpisodeState::Loading { season: 2 });
        assert!(ready(&orch).current_episodes().is_none());

        // Reselecting the same season still resets the episode
        assert!(orch.on_season_loaded(token_of(&cmd), 2, Ok(episodes(2, 3))));
        assert!(orch.select_episode(2));
        assert_eq!(orch.select_season(2), None);
        assert_eq!(ready(&orch).selected_episode, 1);
    }

    #[test]
    fn test_late_season_response_is_dropped() {
        let mut orch = playing_series(3);

        let season_a = orch.select_season(2).unwrap();
        let season_b = orch.select_season(3).unwrap();

        assert!(orch.on_season_loaded(token_of(&season_b), 3, Ok(episodes(3, 4))));
        assert!(!orch.on_season_loaded(token_of(&season_a), 2, Ok(episodes(2, 9))));

        let current = ready(&orch).current_episodes().unwrap();
        assert_eq!(current.len(), 4);
        assert!(current.iter().all(|e| e.season_number == 3));
    }

    #[test]
    fn test_early_stale_response_is_dropped() {
        let mut orch = playing_series(3);

        let season_a = orch.select_season(2).unwrap();
        let season_b = orch.select_season(3).unwrap();

        assert!(!orch.on_season_loaded(token_of(&season_a), 2, Ok(episodes(2, 9))));
        assert_eq!(ready(&orch).episodes, EpisodeState::Loading { season: 3 });
        assert!(orch.on_season_loaded(token_of(&season_b), 3, Ok(episodes(3, 4))));
    }

    #[test]
    fn test_season_change_requires_playback() {
        let mut orch = playing_series(3);
        assert!(orch.back_to_overview());
        assert_eq!(orch.select_season(2), None);
        assert_eq!(ready(&orch).selected_season, 1);
    }

    #[test]
    fn test_specials_not_selectable() {
        let mut orch = playing_series(2);
        assert_eq!(orch.select_season(0), None);
        assert_eq!(orch.select_season(7), None);
    }

    #[test]
    fn test_reopen_discards_previous_title() {
        let mut orch = playing_series(3);
        let pending = orch.select_season(2).unwrap();

        let open = orch.open(42, MediaType::Movie);
        let session = orch.session().unwrap();
        assert_eq!(session.id, 42);
        assert_eq!(session.phase, DetailPhase::Loading);

        // Responses meant for the old title are ignored
        assert!(!orch.on_season_loaded(token_of(&pending), 2, Ok(episodes(2, 3))));
        assert!(orch.on_detail_loaded(token_of(&open), Ok(movie_detail(42, Vec::new()))).is_none());
        assert_eq!(ready(&orch).detail.id, 42);
    }

    #[test]
    fn test_stale_detail_is_dropped() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let first = orch.open(1, MediaType::Movie);
        let second = orch.open(2, MediaType::Movie);

        assert!(orch.on_detail_loaded(token_of(&first), Ok(movie_detail(1, Vec::new()))).is_none());
        assert_eq!(orch.session().unwrap().phase, DetailPhase::Loading);

        orch.on_detail_loaded(token_of(&second), Ok(movie_detail(2, Vec::new())));
        assert_eq!(ready(&orch).detail.id, 2);
    }

    #[test]
    fn test_detail_failure() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(9, MediaType::Movie);
        let err = Error::Status {
            status: 404,
            endpoint: "/movie/9".to_string(),
        };
        assert!(orch.on_detail_loaded(token_of(&open), Err(err)).is_none());
        assert!(matches!(orch.session().unwrap().phase, DetailPhase::Failed(_)));
        assert!(!orch.play_media());
    }

    #[test]
    fn test_movie_without_trailer() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(27205, MediaType::Movie);
        let teaser = Video {
            key: "abc".into(),
            name: "Teaser".into(),
            site: "YouTube".into(),
            video_type: "Teaser".into(),
        };
        orch.on_detail_loaded(token_of(&open), Ok(movie_detail(27205, vec![teaser])));

        assert!(ready(&orch).trailer().is_none());
        assert!(!orch.play_trailer());
        assert_eq!(ready(&orch).display, Display::Overview);
        assert!(orch.session().unwrap().trailer_url().is_none());
    }

    #[test]
    fn test_movie_trailer_and_playback() {
        let mut orch = DetailOrchestrator::new(EMBED.to_string());
        let open = orch.open(27205, MediaType::Movie);
        let trailer = Video {
            key: "YoHD9XEInc0".into(),
            name: "Trailer".into(),
            site: "YouTube".into(),
            video_type: "Trailer".into(),
        };
        orch.on_detail_loaded(token_of(&open), Ok(movie_detail(27205, vec![trailer])));

        assert!(orch.play_trailer());
        assert_eq!(
            orch.session().unwrap().trailer_url().as_deref(),
            Some("https://www.youtube.com/embed/YoHD9XEInc0")
        );
        assert!(orch.playback_url().is_none());

        assert!(orch.play_media());
        assert_eq!(
            orch.playback_url().as_deref(),
            Some("https://vidsrc.icu/embed/movie/27205")
        );
        assert!(orch.session().unwrap().season_selector().is_none());
    }

    #[test]
    fn test_series_playback_url_follows_selection() {
        let mut orch = playing_series(2);
        assert_eq!(
            orch.playback_url().as_deref(),
            Some("https://vidsrc.icu/embed/tv/1399/1/1")
        );

        assert!(orch.step_episode(true));
        assert_eq!(
            orch.playback_url().as_deref(),
            Some("https://vidsrc.icu/embed/tv/1399/1/2")
        );

        let cmd = orch.step_season(true).unwrap();
        assert_eq!(
            orch.playback_url().as_deref(),
            Some("https://vidsrc.icu/embed/tv/1399/2/1")
        );
        assert!(orch.step_season(true).is_none());

        // Episodes of the pending season cannot be picked yet
        assert!(!orch.select_episode(2));
        assert!(orch.on_season_loaded(token_of(&cmd), 2, Ok(episodes(2, 3))));
        assert!(orch.select_episode(3));
        assert!(!orch.select_episode(4));
    }

    #[test]
    fn test_failed_season_can_be_reselected() {
        let mut orch = playing_series(2);
        let cmd = orch.select_season(2).unwrap();
        let err = Error::MalformedResponse {
            endpoint: "/tv/1399/season/2".to_string(),
            reason: "eof".to_string(),
        };
        assert!(orch.on_season_loaded(token_of(&cmd), 2, Err(err)));
        assert_eq!(ready(&orch).episodes, EpisodeState::Failed { season: 2 });

        assert!(orch.select_season(2).is_some());
    }
}
