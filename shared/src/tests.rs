#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    use crate::error::{Error, ErrorCode, Result};
    use crate::models::*;
    use crate::tally::{category_standings, count_votes, VotingProgress};
    use crate::validation::*;
    use crate::vote_state::*;

    fn votes(pairs: &[(&str, &str)]) -> VoteMap {
        pairs.iter().map(|(c, n)| (c.to_string(), n.to_string())).collect()
    }

    fn store() -> SharedVoteStore<MemorySlot> {
        SharedVoteStore::new(VoteStateStore::open(MemorySlot::new()))
    }

    fn persisted(store: &SharedVoteStore<MemorySlot>) -> Option<String> {
        store.read(|s| s.slot().load(STORAGE_KEY))
    }

    #[derive(Default)]
    struct FakeService {
        remote: RefCell<VoteMap>,
        fail_fetch: Cell<bool>,
        fail_submit: Cell<bool>,
        fetches: Cell<usize>,
    }

    impl FakeService {
        fn with_remote(pairs: &[(&str, &str)]) -> Self {
            Self { remote: RefCell::new(votes(pairs)), ..Default::default() }
        }
    }

    #[async_trait(?Send)]
    impl VoteService for FakeService {
        async fn fetch_user_votes(&self, _user_id: &str) -> Result<VoteMap> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail_fetch.get() {
                return Err(Error::network("connection reset"));
            }
            Ok(self.remote.borrow().clone())
        }

        async fn submit_vote(&self, _user_id: &str, category_id: &str, nominee_id: &str) -> Result<()> {
            if self.fail_submit.get() {
                return Err(Error::network("connection reset"));
            }
            self.remote.borrow_mut().insert(category_id.to_string(), nominee_id.to_string());
            Ok(())
        }
    }

    /// Fetches resolve only when the test sends through the matching gate.
    /// Submits do the same while submit gates are left, and succeed otherwise.
    struct GatedService {
        gates: RefCell<VecDeque<oneshot::Receiver<Result<VoteMap>>>>,
        submit_gates: RefCell<VecDeque<oneshot::Receiver<Result<()>>>>,
    }

    impl GatedService {
        fn new(gates: Vec<oneshot::Receiver<Result<VoteMap>>>) -> Self {
            Self::with_submits(gates, Vec::new())
        }

        fn with_submits(
            gates: Vec<oneshot::Receiver<Result<VoteMap>>>,
            submit_gates: Vec<oneshot::Receiver<Result<()>>>,
        ) -> Self {
            Self {
                gates: RefCell::new(gates.into()),
                submit_gates: RefCell::new(submit_gates.into()),
            }
        }
    }

    #[async_trait(?Send)]
    impl VoteService for GatedService {
        async fn fetch_user_votes(&self, _user_id: &str) -> Result<VoteMap> {
            let gate = self.gates.borrow_mut().pop_front().expect("no gate left");
            gate.await.unwrap_or_else(|_| Err(Error::network("gate dropped")))
        }

        async fn submit_vote(&self, _user_id: &str, _category_id: &str, _nominee_id: &str) -> Result<()> {
            let gate = self.submit_gates.borrow_mut().pop_front();
            match gate {
                Some(gate) => gate.await.unwrap_or_else(|_| Err(Error::network("gate dropped"))),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_set_vote_overwrites_per_category() {
        let store = store();
        store.set_vote("best-game", "nominee-1");
        store.set_vote("best-art", "nominee-4");
        store.set_vote("best-game", "nominee-3");

        let mut categories = store.voted_categories();
        categories.sort();
        assert_eq!(categories, vec!["best-art", "best-game"]);
        assert_eq!(store.get_vote("best-game").as_deref(), Some("nominee-3"));
        assert_eq!(store.get_vote("best-studio"), None);
    }

    #[test]
    fn test_clear_votes_keeps_sync_flag() {
        let store = store();
        let service = FakeService::with_remote(&[("best-game", "nominee-2")]);
        block_on(store.load_votes_from_db(&service, "user-42"));
        assert!(store.is_synced());

        store.clear_votes();
        assert!(store.voted_categories().is_empty());
        assert!(store.is_synced());
        let reopened = VoteStateStore::open(MemorySlot::with_entry(STORAGE_KEY, &persisted(&store).unwrap()));
        assert!(reopened.votes().is_empty());
    }

    #[test]
    fn test_load_replaces_local_votes() {
        let store = store();
        store.set_vote("best-game", "nominee-1");
        assert_eq!(store.voted_categories(), vec!["best-game"]);

        let service = FakeService::with_remote(&[("best-game", "nominee-2"), ("best-studio", "nominee-7")]);
        let outcome = block_on(store.load_votes_from_db(&service, "user-42"));

        assert_eq!(outcome, LoadOutcome::Applied { votes: 2 });
        let mut categories = store.voted_categories();
        categories.sort();
        assert_eq!(categories, vec!["best-game", "best-studio"]);
        assert_eq!(store.get_vote("best-game").as_deref(), Some("nominee-2"));
        assert!(store.is_synced());
    }

    #[test]
    fn test_load_discards_local_only_categories() {
        let store = store();
        store.set_vote("best-game", "nominee-z");
        store.set_vote("best-music", "nominee-w");

        let service = FakeService::with_remote(&[("best-game", "nominee-x"), ("best-studio", "nominee-y")]);
        block_on(store.load_votes_from_db(&service, "user-42"));

        assert_eq!(store.read(|s| s.votes().clone()), votes(&[("best-game", "nominee-x"), ("best-studio", "nominee-y")]));
        assert_eq!(store.get_vote("best-music"), None);
    }

    #[test]
    fn test_load_empty_remote_is_a_successful_sync() {
        let store = store();
        store.set_vote("best-game", "nominee-1");

        let service = FakeService::default();
        assert_eq!(block_on(store.load_votes_from_db(&service, "user-42")), LoadOutcome::Applied { votes: 0 });
        assert!(store.voted_categories().is_empty());
        assert!(store.is_synced());
    }

    #[test]
    fn test_failed_load_keeps_local_state() {
        let store = store();
        store.set_vote("best-game", "nominee-1");

        let service = FakeService::with_remote(&[("best-studio", "nominee-7")]);
        service.fail_fetch.set(true);

        assert_eq!(block_on(store.load_votes_from_db(&service, "user-42")), LoadOutcome::Failed);
        assert_eq!(store.voted_categories(), vec!["best-game"]);
        assert!(!store.is_synced());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_repeated_loads_are_idempotent() {
        let store = store();
        let service = FakeService::with_remote(&[("best-game", "nominee-2"), ("best-art", "nominee-5")]);

        block_on(store.load_votes_from_db(&service, "user-42"));
        let first = store.read(|s| s.state().clone());
        block_on(store.load_votes_from_db(&service, "user-42"));

        assert_eq!(store.read(|s| s.state().clone()), first);
        assert_eq!(service.fetches.get(), 2);
    }

    #[test]
    fn test_submit_writes_through_on_success() {
        let store = store();
        let service = FakeService::default();

        assert!(block_on(store.submit_vote_to_db(&service, "user-42", "cat1", "nomX")));
        assert_eq!(store.get_vote("cat1").as_deref(), Some("nomX"));
        assert_eq!(service.remote.borrow().get("cat1").map(String::as_str), Some("nomX"));
    }

    #[test]
    fn test_failed_submit_leaves_state_untouched() {
        let store = store();
        store.set_vote("best-game", "nominee-1");
        let before_state = store.read(|s| s.state().clone());
        let before_blob = persisted(&store);

        let service = FakeService::default();
        service.fail_submit.set(true);

        assert!(!block_on(store.submit_vote_to_db(&service, "user-42", "best-art", "nominee-9")));
        assert_eq!(store.get_vote("best-art"), None);
        assert_eq!(store.read(|s| s.state().clone()), before_state);
        assert_eq!(persisted(&store), before_blob);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let store = store();
        assert_eq!(persisted(&store), None);

        store.set_vote("best-game", "nominee-1");
        let reopened = VoteStateStore::open(MemorySlot::with_entry(STORAGE_KEY, &persisted(&store).unwrap()));
        assert_eq!(reopened.get_vote("best-game"), Some("nominee-1"));
    }

    #[test]
    fn test_state_blob_round_trip() {
        let state = VoteState {
            votes: votes(&[("best-game", "nominee-2"), ("best-studio", "nominee-7")]),
            sync_with_db: true,
        };
        let blob = state.to_blob().unwrap();
        assert!(blob.contains("\"version\":1"));
        assert!(blob.contains("\"syncWithDb\":true"));
        assert_eq!(VoteState::from_blob(&blob).unwrap(), state);

        let restored = VoteStateStore::open(MemorySlot::with_entry(STORAGE_KEY, &blob));
        assert_eq!(restored.state(), &state);
    }

    #[test]
    fn test_legacy_blob_is_migrated() {
        let legacy = r#"{"state":{"votes":{"best-game":"nominee-1"},"loading":false,"syncWithDb":true},"version":0}"#;
        let state = VoteState::from_blob(legacy).unwrap();
        assert_eq!(state.votes, votes(&[("best-game", "nominee-1")]));
        assert!(state.sync_with_db);
    }

    #[test]
    fn test_unreadable_blob_starts_empty() {
        assert!(matches!(VoteState::from_blob("not json"), Err(StoreError::Decode(_))));
        let future = r#"{"version":9,"votes":[],"syncWithDb":false}"#;
        assert!(matches!(VoteState::from_blob(future), Err(StoreError::UnsupportedVersion(9))));

        let store = VoteStateStore::open(MemorySlot::with_entry(STORAGE_KEY, future));
        assert!(store.votes().is_empty());
        assert!(!store.is_synced());
    }

    #[test]
    fn test_newer_load_supersedes_older() {
        let (old_tx, old_rx) = oneshot::channel();
        let (new_tx, new_rx) = oneshot::channel();
        let service = GatedService::new(vec![old_rx, new_rx]);
        let store = store();

        let (first, second, ()) = block_on(async {
            futures::join!(
                store.load_votes_from_db(&service, "user-42"),
                store.load_votes_from_db(&service, "user-42"),
                async {
                    new_tx.send(Ok(votes(&[("best-game", "nominee-new")]))).unwrap();
                    old_tx.send(Ok(votes(&[("best-game", "nominee-old")]))).unwrap();
                }
            )
        });

        assert_eq!(first, LoadOutcome::Stale);
        assert_eq!(second, LoadOutcome::Applied { votes: 1 });
        assert_eq!(store.get_vote("best-game").as_deref(), Some("nominee-new"));
    }

    #[test]
    fn test_clear_during_load_drops_result() {
        let (tx, rx) = oneshot::channel();
        let service = GatedService::new(vec![rx]);
        let store = store();

        let (outcome, ()) = block_on(async {
            futures::join!(
                store.load_votes_from_db(&service, "user-42"),
                async {
                    assert!(store.is_loading());
                    store.clear_votes();
                    tx.send(Ok(votes(&[("best-game", "nominee-2")]))).unwrap();
                }
            )
        });

        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(store.voted_categories().is_empty());
        assert!(!store.is_synced());
    }

    #[test]
    fn test_vote_confirmed_during_load_survives() {
        let (tx, rx) = oneshot::channel();
        let service = GatedService::new(vec![rx]);
        let store = store();

        let (outcome, ()) = block_on(async {
            futures::join!(
                store.load_votes_from_db(&service, "user-42"),
                async {
                    assert!(store.submit_vote_to_db(&service, "user-42", "best-art", "nominee-9").await);
                    // snapshot taken before the write reached the remote
                    tx.send(Ok(votes(&[("best-game", "nominee-2")]))).unwrap();
                }
            )
        });

        assert_eq!(outcome, LoadOutcome::Applied { votes: 2 });
        assert_eq!(store.get_vote("best-art").as_deref(), Some("nominee-9"));
        assert_eq!(store.get_vote("best-game").as_deref(), Some("nominee-2"));
    }

    #[test]
    fn test_vote_confirmed_after_sign_out_stays_with_its_voter() {
        let (fetch_tx, fetch_rx) = oneshot::channel();
        let (submit_tx, submit_rx) = oneshot::channel();
        let service = GatedService::with_submits(vec![fetch_rx], vec![submit_rx]);
        let store = store();

        let (submitted, outcome, ()) = block_on(async {
            futures::join!(
                store.submit_vote_to_db(&service, "user-a", "best-art", "nominee-a"),
                async {
                    // user-a signs out and user-b signs in before the write is acknowledged
                    store.clear_votes();
                    store.load_votes_from_db(&service, "user-b").await
                },
                async {
                    submit_tx.send(Ok(())).unwrap();
                    fetch_tx.send(Ok(votes(&[("best-game", "nominee-b")]))).unwrap();
                }
            )
        });

        assert!(submitted);
        assert_eq!(outcome, LoadOutcome::Applied { votes: 1 });
        assert_eq!(store.get_vote("best-art"), None);
        assert_eq!(store.get_vote("best-game").as_deref(), Some("nominee-b"));
        assert!(store.is_synced());
        assert!(!persisted(&store).unwrap().contains("nominee-a"));
    }

    #[test]
    fn test_vote_confirmed_during_other_voter_load_is_dropped() {
        let (fetch_tx, fetch_rx) = oneshot::channel();
        let (submit_tx, submit_rx) = oneshot::channel();
        let service = GatedService::with_submits(vec![fetch_rx], vec![submit_rx]);
        let store = store();

        let (submitted, outcome, ()) = block_on(async {
            futures::join!(
                store.submit_vote_to_db(&service, "user-a", "best-art", "nominee-a"),
                store.load_votes_from_db(&service, "user-b"),
                async {
                    submit_tx.send(Ok(())).unwrap();
                    fetch_tx.send(Ok(votes(&[("best-game", "nominee-b")]))).unwrap();
                }
            )
        });

        assert!(submitted);
        assert_eq!(outcome, LoadOutcome::Applied { votes: 1 });
        assert_eq!(store.voted_categories(), vec!["best-game".to_string()]);
    }

    #[test]
    fn test_confirmed_vote_after_clear_is_not_applied() {
        let mut store = VoteStateStore::open(MemorySlot::new());
        let ticket = store.begin_submit("user-a");
        store.clear_votes();

        assert!(!store.record_confirmed_vote(&ticket, "best-art", "nominee-a"));
        assert!(store.votes().is_empty());

        let fresh = store.begin_submit("user-a");
        assert!(store.record_confirmed_vote(&fresh, "best-art", "nominee-a"));
        assert_eq!(store.get_vote("best-art"), Some("nominee-a"));
    }

    #[test]
    fn test_error_from_status() {
        assert_eq!(Error::from_status(429, "slow down").code, ErrorCode::RateLimited);
        assert_eq!(Error::from_status(404, "missing").code, ErrorCode::NotFound);
        assert_eq!(Error::from_status(502, "bad gateway").code, ErrorCode::SystemError);
    }

    fn category(id: &str, name: &str) -> Category {
        Category { id: id.into(), name: name.into(), description: String::new(), icon: "🏆".into() }
    }

    fn nominee(id: &str, name: &str, category_id: &str) -> Nominee {
        Nominee {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image_url: String::new(),
            category_id: category_id.into(),
        }
    }

    #[test]
    fn test_count_votes() {
        let pairs = [
            ("best-game", "nominee-2"),
            ("best-art", "nominee-9"),
            ("best-game", "nominee-1"),
            ("best-game", "nominee-2"),
        ];
        let entries = count_votes(pairs.iter().copied());

        assert_eq!(entries, vec![
            LeaderboardEntry { category_id: "best-art".into(), nominee_id: "nominee-9".into(), vote_count: 1 },
            LeaderboardEntry { category_id: "best-game".into(), nominee_id: "nominee-2".into(), vote_count: 2 },
            LeaderboardEntry { category_id: "best-game".into(), nominee_id: "nominee-1".into(), vote_count: 1 },
        ]);
        assert!(count_votes(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_category_standings_zero_fill_and_order() {
        let best_game = category("best-game", "Best Game");
        let nominees = [
            nominee("nominee-1", "Alpha", "best-game"),
            nominee("nominee-2", "Beta", "best-game"),
            nominee("nominee-3", "Gamma", "best-game"),
            nominee("nominee-9", "Other", "best-art"),
        ];
        let entries = count_votes([
            ("best-game", "nominee-2"),
            ("best-game", "nominee-2"),
            ("best-game", "nominee-3"),
            ("best-art", "nominee-9"),
        ]);

        let standings = category_standings(&best_game, &nominees, &entries);
        let order: Vec<_> = standings.iter().map(|s| (s.nominee_id.as_str(), s.votes)).collect();
        assert_eq!(order, vec![("nominee-2", 2), ("nominee-3", 1), ("nominee-1", 0)]);
        assert!((standings[0].share - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(standings[2].share, 0.0);

        let empty = category_standings(&category("best-music", "Best Music"), &nominees, &entries);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_voting_progress() {
        let categories = [category("best-game", "Best Game"), category("best-art", "Best Art")];
        let voted = vec!["best-game".to_string(), "retired-category".to_string()];

        let progress = VotingProgress::new(&voted, &categories);
        assert_eq!(progress.voted_count, 1);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.percentage(), 50.0);
        assert!(progress.has_voted("best-game"));
        assert!(!progress.has_voted("retired-category"));
        assert!(!progress.is_complete());

        assert_eq!(VotingProgress::new(&voted, &[]).percentage(), 0.0);
    }

    #[test]
    fn test_id_validation() {
        assert!(validate_id("best-game-2025").is_ok());
        assert_eq!(validate_id(""), Err(ValidationError::EmptyId));
        assert!(matches!(validate_id("Best Game"), Err(ValidationError::InvalidId(_))));
        assert_eq!(validate_id(&"a".repeat(MAX_ID_LENGTH + 1)), Err(ValidationError::IdTooLong));

        assert!(validate_user_id("3f2b8c1e-7a44-4b0e-9a51-0c1d2e3f4a5b").is_ok());
        assert!(validate_user_id("a/b").is_err());
        assert!(validate_user_id("").is_err());
    }

    #[test]
    fn test_catalog_validation() {
        assert!(validate_category(&category("best-game", "Best Game")).is_ok());
        assert_eq!(validate_category(&category("best-game", "  ")), Err(ValidationError::EmptyName));

        let mut n = nominee("nominee-1", "Alpha", "best-game");
        assert!(validate_nominee(&n).is_ok());
        n.image_url = "ftp://example.com/a.png".into();
        assert!(matches!(validate_nominee(&n), Err(ValidationError::InvalidImageUrl(_))));
        n.image_url = "https://example.com/a.png".into();
        n.description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert_eq!(validate_nominee(&n), Err(ValidationError::DescriptionTooLong));
    }

    #[test]
    fn test_event_and_reservation_validation() {
        let mut event = NewEvent {
            title: "Indie Showcase".into(),
            description: None,
            start_time: Some("18:00".into()),
            end_time: None,
            venue: Some("Hall B".into()),
            speakers: None,
            reservable: true,
            phase: EventPhase::PreEvent,
            day_label: "Monday".into(),
            event_date: "2026-01-19".into(),
        };
        assert!(validate_event(&event).is_ok());
        event.event_date = "19/01/2026".into();
        assert!(matches!(validate_event(&event), Err(ValidationError::InvalidDate(_))));

        let mut reservation = NewReservation {
            event_title: "Indie Showcase".into(),
            user_name: "Sam".into(),
            contact_info: "sam@example.com".into(),
        };
        assert!(validate_reservation(&reservation).is_ok());
        reservation.contact_info = " ".into();
        assert_eq!(validate_reservation(&reservation), Err(ValidationError::EmptyContact));
    }

    #[test]
    fn test_event_phase_wire_names() {
        assert_eq!(serde_json::to_string(&EventPhase::PreEvent).unwrap(), "\"Pre-Event\"");
        assert_eq!(serde_json::from_str::<EventPhase>("\"On-Event\"").unwrap(), EventPhase::OnEvent);
    }
}
