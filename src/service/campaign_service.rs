use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::error;
use tokio::sync::Mutex;

use super::{
    cache::{Boundary, PhaseTimeCache},
    clock::{Clock, SystemClock},
    error::{CampaignError, CampaignResult},
    format::format_phase_date,
};
use crate::{
    db::{Campaign, Database},
    log_debug, log_info, log_warn,
    settings::SettingsStore,
};

const ENABLE_LOGS: bool = true;

/// Answers "where are we relative to this phase" questions.
///
/// Phase boundaries are served from an in-memory [`PhaseTimeCache`] that is
/// built from the store on first use and only refreshed by [`reset`].
/// Readers clone the current `Arc` and never hold the lock while comparing,
/// so a reset swaps the whole snapshot at once.
///
/// Two resets racing each other both rebuild from the store; whichever
/// finishes last is the one readers see.
///
/// [`reset`]: CampaignService::reset
pub struct CampaignService {
    db: Database,
    settings: Arc<SettingsStore>,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<Arc<PhaseTimeCache>>>,
    first_build: Mutex<()>,
}

impl CampaignService {
    pub fn new(db: Database, settings: Arc<SettingsStore>) -> Self {
        Self::with_clock(db, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, settings: Arc<SettingsStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            settings,
            clock,
            cache: RwLock::new(None),
            first_build: Mutex::new(()),
        }
    }

    /// Rebuild the cache from every stored phase and swap it in.
    pub async fn reset(&self) -> CampaignResult<()> {
        self.rebuild().await.map(|_| ())
    }

    /// Drop the cache; the next query rebuilds it.
    pub fn invalidate(&self) {
        log_debug!("Phase cache invalidated");
        *self.write_slot() = None;
    }

    async fn rebuild(&self) -> CampaignResult<Arc<PhaseTimeCache>> {
        log_debug!("Phase cache reset");

        let phases = self.db.get_phases().await?;
        let cache = Arc::new(PhaseTimeCache::build(&phases));

        if cache.is_empty() {
            log_warn!("Phase cache rebuilt with no phases; every phase query will fail");
        } else {
            log_info!(
                "Phase cache rebuilt: {} phases, {} boundaries",
                phases.len(),
                cache.len()
            );
        }

        *self.write_slot() = Some(Arc::clone(&cache));
        Ok(cache)
    }

    /// Current snapshot, building it once if nothing has been built yet.
    pub async fn snapshot(&self) -> CampaignResult<Arc<PhaseTimeCache>> {
        if let Some(cache) = self.read_slot() {
            return Ok(cache);
        }

        // Callers arriving together wait for a single build.
        let _guard = self.first_build.lock().await;
        if let Some(cache) = self.read_slot() {
            return Ok(cache);
        }
        self.rebuild().await
    }

    fn read_slot(&self) -> Option<Arc<PhaseTimeCache>> {
        match self.cache.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<PhaseTimeCache>>> {
        match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Cached boundary of a phase, or [`CampaignError::NoSuchPhase`].
    pub async fn timestamp(
        &self,
        campaign: &str,
        phase: &str,
        boundary: Boundary,
    ) -> CampaignResult<DateTime<Utc>> {
        let cache = self.snapshot().await?;
        lookup(&cache, campaign, phase, boundary)
    }

    /// Strictly after the start and strictly before the end.
    ///
    /// Both boundaries come from the same snapshot so a concurrent reset
    /// cannot pair an old start with a new end.
    pub async fn is_during(&self, campaign: &str, phase: &str) -> CampaignResult<bool> {
        let cache = self.snapshot().await?;
        let beginning = lookup(&cache, campaign, phase, Boundary::Beginning)?;
        let end = lookup(&cache, campaign, phase, Boundary::End)?;
        let now = self.clock.now();

        Ok(now > beginning && now < end)
    }

    pub async fn is_before_end(&self, campaign: &str, phase: &str) -> CampaignResult<bool> {
        let end = self.timestamp(campaign, phase, Boundary::End).await?;
        Ok(self.clock.now() < end)
    }

    pub async fn is_after_beginning(&self, campaign: &str, phase: &str) -> CampaignResult<bool> {
        let beginning = self.timestamp(campaign, phase, Boundary::Beginning).await?;
        Ok(self.clock.now() > beginning)
    }

    pub async fn is_before_beginning(&self, campaign: &str, phase: &str) -> CampaignResult<bool> {
        let beginning = self.timestamp(campaign, phase, Boundary::Beginning).await?;
        Ok(self.clock.now() < beginning)
    }

    pub async fn is_after_end(&self, campaign: &str, phase: &str) -> CampaignResult<bool> {
        let end = self.timestamp(campaign, phase, Boundary::End).await?;
        Ok(self.clock.now() > end)
    }

    /// The campaign designated by `last_campaign_id` in the settings.
    pub async fn current_campaign(&self) -> CampaignResult<Campaign> {
        let id = self.settings.last_campaign_id();
        self.db
            .find_campaign(id)
            .await?
            .ok_or(CampaignError::CurrentCampaign { id })
    }

    async fn current_code(&self) -> CampaignResult<String> {
        Ok(self.current_campaign().await?.campaign_code)
    }

    pub async fn is_during_current(&self, phase: &str) -> CampaignResult<bool> {
        let campaign = self.current_code().await?;
        self.is_during(&campaign, phase).await
    }

    pub async fn is_before_end_current(&self, phase: &str) -> CampaignResult<bool> {
        let campaign = self.current_code().await?;
        self.is_before_end(&campaign, phase).await
    }

    pub async fn is_after_beginning_current(&self, phase: &str) -> CampaignResult<bool> {
        let campaign = self.current_code().await?;
        self.is_after_beginning(&campaign, phase).await
    }

    pub async fn is_before_beginning_current(&self, phase: &str) -> CampaignResult<bool> {
        let campaign = self.current_code().await?;
        self.is_before_beginning(&campaign, phase).await
    }

    pub async fn is_after_end_current(&self, phase: &str) -> CampaignResult<bool> {
        let campaign = self.current_code().await?;
        self.is_after_end(&campaign, phase).await
    }

    /// Start of the phase as display text, e.g. "1er juin 2021".
    pub async fn start_str(
        &self,
        campaign: &str,
        phase: &str,
        locale: &str,
        with_accents: bool,
    ) -> CampaignResult<String> {
        let beginning = self.timestamp(campaign, phase, Boundary::Beginning).await?;
        format_phase_date(beginning, locale, with_accents)
    }

    pub async fn start_str_current(
        &self,
        phase: &str,
        locale: &str,
        with_accents: bool,
    ) -> CampaignResult<String> {
        let campaign = self.current_code().await?;
        self.start_str(&campaign, phase, locale, with_accents).await
    }

    pub async fn end_str(
        &self,
        campaign: &str,
        phase: &str,
        locale: &str,
        with_accents: bool,
    ) -> CampaignResult<String> {
        let end = self.timestamp(campaign, phase, Boundary::End).await?;
        format_phase_date(end, locale, with_accents)
    }

    pub async fn end_str_current(
        &self,
        phase: &str,
        locale: &str,
        with_accents: bool,
    ) -> CampaignResult<String> {
        let campaign = self.current_code().await?;
        self.end_str(&campaign, phase, locale, with_accents).await
    }
}

/// Misses are logged with the full key before being reported.
fn lookup(
    cache: &PhaseTimeCache,
    campaign: &str,
    phase: &str,
    boundary: Boundary,
) -> CampaignResult<DateTime<Utc>> {
    cache.get(campaign, phase, boundary).ok_or_else(|| {
        let err = CampaignError::NoSuchPhase {
            campaign: campaign.to_string(),
            phase: phase.to_string(),
            boundary,
        };
        error!("{err}");
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_support::{campaign_input, phase_input},
        service::clock::FixedClock,
        settings::CampaignSettings,
    };
    use chrono::TimeZone;

    fn instant(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    struct Fixture {
        db: Database,
        clock: Arc<FixedClock>,
        service: CampaignService,
    }

    /// Campaign "A" with phase "VOTE" from 2021-06-16T12:00 to 2021-09-16T12:00.
    async fn fixture(last_campaign_id: i64) -> Fixture {
        let db = Database::in_memory().unwrap();
        db.create_campaign(campaign_input("A")).await.unwrap();
        db.create_phase(phase_input("A", "VOTE")).await.unwrap();

        let settings = Arc::new(SettingsStore::in_memory(CampaignSettings {
            last_campaign_id,
            ..CampaignSettings::default()
        }));
        let clock = Arc::new(FixedClock::new(instant(2021, 7, 1, 0)));
        let service = CampaignService::with_clock(db.clone(), settings, clock.clone());

        Fixture { db, clock, service }
    }

    #[tokio::test]
    async fn vote_phase_scenario() {
        let Fixture { clock, service, .. } = fixture(1).await;

        clock.set(instant(2021, 7, 1, 0));
        assert!(service.is_during("A", "VOTE").await.unwrap());
        assert!(service.is_after_beginning("A", "VOTE").await.unwrap());
        assert!(service.is_before_end("A", "VOTE").await.unwrap());

        clock.set(instant(2021, 5, 1, 0));
        assert!(!service.is_during("A", "VOTE").await.unwrap());
        assert!(service.is_before_beginning("A", "VOTE").await.unwrap());
        assert!(!service.is_after_beginning("A", "VOTE").await.unwrap());

        clock.set(instant(2021, 10, 1, 0));
        assert!(!service.is_during("A", "VOTE").await.unwrap());
        assert!(service.is_after_end("A", "VOTE").await.unwrap());
        assert!(!service.is_before_end("A", "VOTE").await.unwrap());
    }

    #[tokio::test]
    async fn boundaries_are_exclusive() {
        let Fixture { clock, service, .. } = fixture(1).await;

        clock.set(instant(2021, 6, 16, 12));
        assert!(!service.is_during("A", "VOTE").await.unwrap());
        assert!(!service.is_after_beginning("A", "VOTE").await.unwrap());
        assert!(!service.is_before_beginning("A", "VOTE").await.unwrap());

        clock.set(instant(2021, 9, 16, 12));
        assert!(!service.is_during("A", "VOTE").await.unwrap());
        assert!(!service.is_before_end("A", "VOTE").await.unwrap());
        assert!(!service.is_after_end("A", "VOTE").await.unwrap());

        clock.set(instant(2021, 6, 16, 12) + chrono::Duration::seconds(1));
        assert!(service.is_during("A", "VOTE").await.unwrap());
        clock.set(instant(2021, 9, 16, 12) - chrono::Duration::seconds(1));
        assert!(service.is_during("A", "VOTE").await.unwrap());
    }

    #[tokio::test]
    async fn every_predicate_fails_for_unknown_phase() {
        let Fixture { service, .. } = fixture(1).await;

        let results = [
            service.is_during("A", "RESULTS").await,
            service.is_before_end("A", "RESULTS").await,
            service.is_after_beginning("A", "RESULTS").await,
            service.is_before_beginning("A", "RESULTS").await,
            service.is_after_end("B", "VOTE").await,
        ];

        for result in results {
            assert!(matches!(result, Err(CampaignError::NoSuchPhase { .. })));
        }
    }

    #[tokio::test]
    async fn unknown_phase_error_carries_the_key() {
        let Fixture { service, .. } = fixture(1).await;

        match service.is_after_end("A", "RESULTS").await {
            Err(CampaignError::NoSuchPhase {
                campaign,
                phase,
                boundary,
            }) => {
                assert_eq!(campaign, "A");
                assert_eq!(phase, "RESULTS");
                assert_eq!(boundary, Boundary::End);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cache_is_stale_until_reset() {
        let Fixture { db, service, .. } = fixture(1).await;

        assert!(service.is_during("A", "VOTE").await.unwrap());
        db.create_phase(phase_input("A", "RESULTS")).await.unwrap();

        assert!(matches!(
            service.is_during("A", "RESULTS").await,
            Err(CampaignError::NoSuchPhase { .. })
        ));

        service.reset().await.unwrap();
        assert!(service.is_during("A", "RESULTS").await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_forces_a_lazy_rebuild() {
        let Fixture { db, service, .. } = fixture(1).await;
        service.snapshot().await.unwrap();

        db.create_phase(phase_input("A", "RESULTS")).await.unwrap();
        service.invalidate();

        assert!(service.is_during("A", "RESULTS").await.unwrap());
    }

    #[tokio::test]
    async fn reset_twice_yields_identical_contents() {
        let Fixture { service, .. } = fixture(1).await;

        service.reset().await.unwrap();
        let first = service.snapshot().await.unwrap();
        service.reset().await.unwrap();
        let second = service.snapshot().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn lazy_build_happens_once() {
        let Fixture { service, .. } = fixture(1).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move { service.snapshot().await.unwrap() }));
        }

        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap());
        }
        assert!(snapshots.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn predicates_read_one_snapshot_while_resets_swap_windows() {
        let Fixture {
            db, clock, service, ..
        } = fixture(1).await;
        let phase = db.get_phases_by_campaign("A").await.unwrap().remove(0);
        let service = Arc::new(service);

        // Both windows exclude 06-01; only a mix of the two contains it.
        let early = (instant(2021, 5, 1, 0), instant(2021, 5, 15, 0));
        let late = (instant(2021, 7, 1, 0), instant(2021, 12, 1, 0));
        clock.set(instant(2021, 6, 1, 0));
        service.reset().await.unwrap();

        let resetter = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for round in 0..400 {
                    let (start, end) = if round % 2 == 0 { early } else { late };
                    let mut input = phase_input("A", "VOTE");
                    input.starting_date = start;
                    input.ending_date = end;
                    db.update_phase(phase.id, input).await.unwrap();
                    service.reset().await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..6 {
            let service = Arc::clone(&service);
            readers.push(tokio::spawn(async move {
                for _ in 0..400 {
                    assert!(!service.is_during("A", "VOTE").await.unwrap());
                    let snapshot = service.snapshot().await.unwrap();
                    assert_eq!(snapshot.len(), 2);
                    tokio::task::yield_now().await;
                }
            }));
        }

        resetter.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }

    #[tokio::test]
    async fn current_campaign_predicates_use_configured_id() {
        let Fixture { service, .. } = fixture(1).await;

        assert_eq!(service.current_campaign().await.unwrap().campaign_code, "A");
        assert!(service.is_during_current("VOTE").await.unwrap());
        assert!(!service.is_before_beginning_current("VOTE").await.unwrap());
        assert!(!service.is_after_end_current("VOTE").await.unwrap());
        assert!(service.is_after_beginning_current("VOTE").await.unwrap());
        assert!(service.is_before_end_current("VOTE").await.unwrap());
    }

    #[tokio::test]
    async fn unconfigured_current_campaign_is_an_error() {
        let Fixture { service, .. } = fixture(-1).await;

        assert!(matches!(
            service.current_campaign().await,
            Err(CampaignError::CurrentCampaign { id: -1 })
        ));
        assert!(matches!(
            service.is_during_current("VOTE").await,
            Err(CampaignError::CurrentCampaign { id: -1 })
        ));
    }

    #[tokio::test]
    async fn phase_dates_render_in_french() {
        let Fixture { service, .. } = fixture(1).await;

        assert_eq!(
            service.start_str("A", "VOTE", "fr_FR", true).await.unwrap(),
            "16 juin 2021"
        );
        assert_eq!(
            service.end_str_current("VOTE", "fr_FR", true).await.unwrap(),
            "16 septembre 2021"
        );
        assert!(matches!(
            service.start_str_current("RESULTS", "fr_FR", true).await,
            Err(CampaignError::NoSuchPhase { .. })
        ));
    }
}
