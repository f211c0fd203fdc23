//! Tests for round lifecycle and settlement

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::GameConfig;
    use crate::oracle::MockPriceOracle;
    use crate::progression::{AchievementId, ChallengeKind, DailyChallenge};
    use crate::testing::{notifier_for, test_game_config, RecordingSink};
    use crate::types::{ApiTier, PowerUp};
    use mockall::Sequence;
    use rust_decimal_macros::dec;

    const USER: UserId = 42;
    const CHAT: ChatId = -1001;

    fn oracle_with(prices: Vec<Result<Decimal>>) -> MockPriceOracle {
        let mut oracle = MockPriceOracle::new();
        oracle.expect_tier().return_const(ApiTier::Free);
        let mut seq = Sequence::new();
        for price in prices {
            let price = match price {
                Ok(p) => Ok(p),
                Err(e) => Err(e.to_string()),
            };
            oracle
                .expect_spot_price()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |symbol| {
                    price.clone().map_err(|reason| BotError::PriceUnavailable { symbol, reason })
                });
        }
        oracle
    }

    fn unavailable() -> Result<Decimal> {
        Err(BotError::Internal("timeout".to_string()))
    }

    fn setup(
        oracle: MockPriceOracle,
        config: GameConfig,
    ) -> (Arc<RoundManager>, Arc<ProfileStore>, Arc<RecordingSink>) {
        let profiles = Arc::new(ProfileStore::new(config.clone()));
        let sink = RecordingSink::new();
        let manager = Arc::new(RoundManager::new(
            config,
            Arc::new(oracle),
            profiles.clone(),
            notifier_for(&sink),
        ));
        profiles.get_or_create(USER, "alice", CHAT);
        (manager, profiles, sink)
    }

    /// Challenge that cannot complete during a test
    fn pin_challenge(profiles: &ProfileStore) {
        profiles
            .update(USER, |p| {
                p.daily_challenge =
                    Some(DailyChallenge::new(ChallengeKind::PredictionCount, 50, 150, Utc::now()));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_evaluate_outcome_up() {
        let outcome = evaluate_outcome(dec!(50000), dec!(50600), Direction::Up, dec!(1.0));
        assert!(outcome.won);
        assert_eq!(outcome.change_pct, dec!(1.2));

        // Threshold is inclusive
        assert!(evaluate_outcome(dec!(100), dec!(101), Direction::Up, dec!(1.0)).won);
        assert!(!evaluate_outcome(dec!(100), dec!(100.99), Direction::Up, dec!(1.0)).won);
    }

    #[test]
    fn test_evaluate_outcome_down() {
        assert!(evaluate_outcome(dec!(2000), dec!(1970), Direction::Down, dec!(1.0)).won);
        assert!(!evaluate_outcome(dec!(2000), dec!(2030), Direction::Down, dec!(1.0)).won);
        assert!(!evaluate_outcome(dec!(2000), dec!(1990), Direction::Down, dec!(1.0)).won);
    }

    #[test]
    fn test_evaluate_outcome_zero_start() {
        let outcome = evaluate_outcome(Decimal::ZERO, dec!(10), Direction::Up, dec!(1.0));
        assert_eq!(outcome.change_pct, Decimal::ZERO);
        assert!(!outcome.won);
    }

    #[test]
    fn test_win_tokens_formula() {
        let config = GameConfig::default();
        assert_eq!(rewards::win_tokens(&config, 0, false), 50);
        assert_eq!(rewards::win_tokens(&config, 4, false), 70);
        assert_eq!(rewards::win_tokens(&config, 0, true), 150);
        assert_eq!(rewards::win_xp(&config, 2), 60);
    }

    #[tokio::test]
    async fn test_winning_round() {
        let oracle = oracle_with(vec![Ok(dec!(50000)), Ok(dec!(50600))]);
        let (manager, profiles, sink) = setup(oracle, test_game_config());

        let round = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        assert_eq!(round.start_price, dec!(50000));
        assert_eq!(manager.active_count(), 1);
        assert_eq!(manager.pending_tasks(), 1);

        let report = manager.resolve_round(round.id).await.unwrap();
        assert!(report.outcome.won);
        assert_eq!(report.settlement.tokens, 50);
        assert_eq!(report.settlement.xp, 50);
        assert_eq!(report.progression.unlocked[0].id, AchievementId::FirstBlood);

        let p = profiles.get(USER).unwrap();
        assert_eq!(p.tokens, 1150);
        assert_eq!(p.streak, 1);
        assert_eq!(p.best_streak, 1);
        assert_eq!(p.xp, 50);
        assert_eq!(p.wins, 1);
        assert_eq!(p.total_predictions, 1);
        assert!(p.history[0].is_win());

        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_tasks(), 0);
        assert!(sink.contains("PREDICTION WON"));
        assert!(sink.contains("First Blood"));
        assert!(sink.messages().iter().all(|(chat, _)| *chat == CHAT));
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_affect_settlement() {
        let config = test_game_config();
        let profiles = Arc::new(ProfileStore::new(config.clone()));
        let sink = RecordingSink::failing();
        let manager = Arc::new(RoundManager::new(
            config,
            Arc::new(oracle_with(vec![Ok(dec!(50000)), Ok(dec!(50600))])),
            profiles.clone(),
            notifier_for(&sink),
        ));
        profiles.get_or_create(USER, "alice", CHAT);

        let round = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        let report = manager.resolve_round(round.id).await;
        tokio_test::assert_ok!(&report);

        let p = profiles.get(USER).unwrap();
        assert_eq!(p.tokens, 1150);
        assert_eq!(p.streak, 1);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_tasks(), 0);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_whale_loss_is_not_refunded() {
        let oracle = oracle_with(vec![Ok(dec!(3000)), Ok(dec!(3010))]);
        let (manager, profiles, sink) = setup(oracle, test_game_config());
        pin_challenge(&profiles);
        profiles
            .update(USER, |p| {
                p.streak = 2;
                p.best_streak = 2;
                Ok(())
            })
            .unwrap();

        let round = manager
            .start_round(USER, CHAT, Symbol::Eth, Direction::Up, true)
            .await
            .unwrap();
        assert_eq!(round.power_up_cost, PowerUpCost::Tokens(500));
        assert_eq!(profiles.get(USER).unwrap().tokens, 500);

        let report = manager.resolve_round(round.id).await.unwrap();
        assert!(!report.outcome.won);
        assert_eq!(report.settlement.tokens, 0);
        assert_eq!(report.settlement.streak_lost, 2);

        let p = profiles.get(USER).unwrap();
        assert_eq!(p.tokens, 500);
        assert_eq!(p.streak, 0);
        assert_eq!(p.xp, 10);
        assert!(sink.contains("PREDICTION LOST"));
    }

    #[tokio::test]
    async fn test_whale_win_triples_reward() {
        let oracle = oracle_with(vec![Ok(dec!(100)), Ok(dec!(102))]);
        let (manager, profiles, _sink) = setup(oracle, test_game_config());
        pin_challenge(&profiles);
        profiles
            .update(USER, |p| {
                p.add_power_up(PowerUp::WhaleMode);
                p.achievements.insert(AchievementId::FirstBlood);
                Ok(())
            })
            .unwrap();

        let round = manager
            .start_round(USER, CHAT, Symbol::Sol, Direction::Up, true)
            .await
            .unwrap();
        assert_eq!(round.power_up_cost, PowerUpCost::Inventory);

        let report = manager.resolve_round(round.id).await.unwrap();
        assert_eq!(report.settlement.tokens, 150);
        let p = profiles.get(USER).unwrap();
        // Whale Rider bonus on top
        assert_eq!(p.tokens, 1000 + 150 + 250);
        assert_eq!(p.power_up_count(PowerUp::WhaleMode), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_at_resolution_refunds() {
        let oracle = oracle_with(vec![Ok(dec!(50000)), unavailable()]);
        let (manager, profiles, sink) = setup(oracle, test_game_config());
        profiles
            .update(USER, |p| {
                p.streak = 2;
                Ok(())
            })
            .unwrap();
        let before = profiles.get(USER).unwrap();

        let round = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, true)
            .await
            .unwrap();
        assert_eq!(profiles.get(USER).unwrap().tokens, 500);

        let result = manager.resolve_round(round.id).await;
        assert!(matches!(result, Err(BotError::PriceUnavailable { symbol: Symbol::Btc, .. })));

        let p = profiles.get(USER).unwrap();
        assert_eq!(p.tokens, before.tokens);
        assert_eq!(p.streak, 2);
        assert_eq!(p.xp, before.xp);
        assert_eq!(p.total_predictions, 0);
        assert_eq!(p.history[0].status, RoundStatus::Failed);
        assert_eq!(manager.active_count(), 0);
        assert!(sink.contains("Price oracle failed"));
        assert!(sink.contains("500 tokens refunded"));
    }

    #[tokio::test]
    async fn test_oracle_failure_at_start_charges_nothing() {
        let oracle = oracle_with(vec![unavailable()]);
        let (manager, profiles, _sink) = setup(oracle, test_game_config());

        let result = manager
            .start_round(USER, CHAT, Symbol::Ada, Direction::Down, true)
            .await;
        assert!(matches!(result, Err(BotError::PriceUnavailable { .. })));
        assert_eq!(profiles.get(USER).unwrap().tokens, 1000);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_second_prediction_rejected() {
        let oracle = oracle_with(vec![Ok(dec!(50000))]);
        let (manager, _profiles, _sink) = setup(oracle, test_game_config());

        manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        let second = manager
            .start_round(USER, CHAT, Symbol::Eth, Direction::Down, false)
            .await;

        match second {
            Err(BotError::AlreadyActive { symbol, remaining_secs }) => {
                assert_eq!(symbol, Symbol::Btc);
                assert!(remaining_secs > 0);
            }
            other => panic!("expected AlreadyActive, got {:?}", other.map(|r| r.id)),
        }
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn test_whale_needs_tokens() {
        let oracle = oracle_with(vec![Ok(dec!(50000))]);
        let (manager, profiles, _sink) = setup(oracle, test_game_config());
        profiles
            .update(USER, |p| {
                p.tokens = 499;
                Ok(())
            })
            .unwrap();

        let result = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, true)
            .await;
        assert!(matches!(result, Err(BotError::InsufficientTokens { needed: 500, available: 499 })));
        assert_eq!(manager.active_count(), 0);
        assert_eq!(profiles.get(USER).unwrap().tokens, 499);
    }

    #[tokio::test]
    async fn test_cooldown_blocks_new_round() {
        let oracle = oracle_with(vec![]);
        let config = GameConfig {
            cooldown_free_secs: 45,
            ..test_game_config()
        };
        let (manager, profiles, _sink) = setup(oracle, config);
        profiles
            .update(USER, |p| {
                p.last_played = Some(Utc::now());
                Ok(())
            })
            .unwrap();

        let result = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await;
        match result {
            Err(BotError::Cooldown { remaining_secs }) => assert!(remaining_secs > 40),
            other => panic!("expected Cooldown, got {:?}", other.map(|r| r.id)),
        }
    }

    #[tokio::test]
    async fn test_unknown_player_rejected() {
        let oracle = oracle_with(vec![]);
        let (manager, _profiles, _sink) = setup(oracle, test_game_config());
        let result = manager
            .start_round(7, CHAT, Symbol::Btc, Direction::Up, false)
            .await;
        assert!(matches!(result, Err(BotError::Internal(_))));
    }

    #[tokio::test]
    async fn test_round_resolves_once() {
        let oracle = oracle_with(vec![Ok(dec!(50000)), Ok(dec!(50000))]);
        let (manager, profiles, _sink) = setup(oracle, test_game_config());

        let round = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        manager.resolve_round(round.id).await.unwrap();
        let again = manager.resolve_round(round.id).await;

        assert!(matches!(again, Err(BotError::NoActiveRound)));
        assert_eq!(profiles.get(USER).unwrap().total_predictions, 1);
    }

    #[tokio::test]
    async fn test_check_overdue() {
        let oracle = oracle_with(vec![Ok(dec!(50000)), Ok(dec!(49000))]);
        let (manager, profiles, _sink) = setup(oracle, test_game_config());

        assert!(matches!(manager.check_overdue(USER).await, Err(BotError::NoActiveRound)));

        manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Down, false)
            .await
            .unwrap();
        assert!(matches!(
            manager.check_overdue(USER).await,
            Err(BotError::AlreadyActive { .. })
        ));

        if let Some(round) = manager.active.lock().get_mut(&USER) {
            round.deadline = Utc::now() - Duration::seconds(1);
        }
        let report = manager.check_overdue(USER).await.unwrap();
        assert!(report.outcome.won);
        assert_eq!(manager.pending_tasks(), 0);
        assert_eq!(profiles.get(USER).unwrap().wins, 1);
    }

    #[tokio::test]
    async fn test_timer_resolves_round() {
        let oracle = oracle_with(vec![Ok(dec!(50000)), Ok(dec!(50600))]);
        let config = GameConfig {
            round_secs: 1,
            ..test_game_config()
        };
        let (manager, profiles, sink) = setup(oracle, config);

        manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_tasks(), 0);
        assert_eq!(profiles.get(USER).unwrap().wins, 1);
        assert!(sink.contains("PREDICTION WON"));
    }

    #[tokio::test]
    async fn test_streak_milestone_taunt() {
        let oracle = oracle_with(vec![Ok(dec!(100)), Ok(dec!(105))]);
        let (manager, profiles, sink) = setup(oracle, test_game_config());
        pin_challenge(&profiles);
        profiles
            .update(USER, |p| {
                p.streak = 4;
                p.best_streak = 4;
                Ok(())
            })
            .unwrap();

        let round = manager
            .start_round(USER, CHAT, Symbol::Bnb, Direction::Up, false)
            .await
            .unwrap();
        let report = manager.resolve_round(round.id).await.unwrap();

        assert_eq!(report.progression.profile.streak, 5);
        // 50 + 5 * 4
        assert_eq!(report.settlement.tokens, 70);
        assert!(sink.contains("MILESTONE"));
    }

    #[tokio::test]
    async fn test_fud_raises_threshold() {
        let oracle = oracle_with(vec![Ok(dec!(100))]);
        let config = GameConfig {
            fud_chance: 1.0,
            ..test_game_config()
        };
        let (manager, _profiles, _sink) = setup(oracle, config);

        let round = manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        assert!(round.fud);
        assert_eq!(round.threshold_pct, dec!(1.1));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending() {
        let oracle = oracle_with(vec![Ok(dec!(50000))]);
        let (manager, _profiles, _sink) = setup(oracle, test_game_config());

        manager
            .start_round(USER, CHAT, Symbol::Btc, Direction::Up, false)
            .await
            .unwrap();
        assert_eq!(manager.shutdown(), 1);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_scheduler_cancel() {
        let scheduler = RoundScheduler::new();
        let id = uuid::Uuid::new_v4();
        scheduler.schedule(id, std::time::Duration::from_secs(3600), async {});

        assert!(scheduler.is_scheduled(&id));
        assert!(scheduler.cancel(&id));
        assert!(!scheduler.cancel(&id));
        assert_eq!(scheduler.pending(), 0);
    }
}
