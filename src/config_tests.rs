//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use super::super::error::BotError;
    use super::super::types::{ApiTier, PowerUp};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::io::Write;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();
        config
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.round_secs, 60);
        assert_eq!(config.move_threshold_pct, dec!(1.0));
        assert_eq!(config.starting_tokens, 1000);
        assert_eq!(config.base_reward, 50);
        assert_eq!(config.whale_multiplier, 3);
        assert_eq!(config.og_cap, 10);
        assert_eq!(config.airdrop_min, 50);
        assert_eq!(config.airdrop_max, 200);
        assert_eq!(config.fud_chance, 0.0);
    }

    #[test]
    fn test_oracle_config_defaults() {
        let config: OracleConfig = toml::from_str("").unwrap();
        assert_eq!(config.free_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.pro_url, "https://pro-api.coingecko.com/api/v3");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.cache_secs, 10);
        assert_eq!(config.min_interval_ms, 2000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_partial_game_section() {
        let config: Config = toml::from_str(
            r#"
            [game]
            round_secs = 90
            whale_cost = 750
            "#,
        )
        .unwrap();
        assert_eq!(config.game.round_secs, 90);
        assert_eq!(config.game.whale_cost, 750);
        assert_eq!(config.game.shield_cost, 300);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.telegram.poll_timeout_secs, 30);
    }

    #[test]
    fn test_price_and_cooldown_lookup() {
        let config = GameConfig::default();
        assert_eq!(config.price_of(PowerUp::WhaleMode), 500);
        assert_eq!(config.price_of(PowerUp::StreakShield), 300);
        assert_eq!(config.cooldown_secs(ApiTier::Free), 45);
        assert_eq!(config.cooldown_secs(ApiTier::Pro), 30);
        assert_eq!(config.round_duration().as_secs(), 60);
    }

    #[test]
    fn test_oracle_tier_from_key() {
        let mut config = OracleConfig::default();
        assert_eq!(config.tier(), ApiTier::Free);
        config.api_key = Some("   ".to_string());
        assert_eq!(config.tier(), ApiTier::Free);
        config.api_key = Some("cg-pro".to_string());
        assert_eq!(config.tier(), ApiTier::Pro);
    }

    #[test]
    fn test_apply_env_credentials() {
        let env: HashMap<&str, &str> =
            HashMap::from([(BOT_TOKEN_ENV, "999:xyz"), (PRICE_API_KEY_ENV, "cg-key")]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.telegram.bot_token, "999:xyz");
        assert_eq!(config.oracle.api_key.as_deref(), Some("cg-key"));
        assert_eq!(config.oracle.tier(), ApiTier::Pro);
    }

    #[test]
    fn test_apply_env_ignores_blank_values() {
        let mut config = valid_config();
        config.apply_env(|key| (key == BOT_TOKEN_ENV).then(|| " ".to_string()));
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert!(config.oracle.api_key.is_none());
    }

    #[test]
    fn test_validate_requires_bot_token() {
        let config = Config::default();
        match config.validate() {
            Err(BotError::Config(msg)) => assert!(msg.contains(BOT_TOKEN_ENV)),
            other => panic!("expected config error, got {:?}", other),
        }
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_cache_longer_than_round() {
        let mut config = valid_config();
        config.game.round_secs = 10;
        config.oracle.cache_secs = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = valid_config();
        config.game.airdrop_min = 300;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.game.fud_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.game.round_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_oracle_retries() {
        let mut config = valid_config();
        config.oracle.max_retries = 1;
        assert!(config.validate().is_ok());

        config.oracle.max_retries = 3;
        match config.validate() {
            Err(BotError::Config(msg)) => assert!(msg.contains("max_retries")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = valid_config();
        config.oracle.api_key = Some("cg-key".to_string());
        let shown = config.redacted();
        assert_eq!(shown.telegram.bot_token, "***");
        assert_eq!(shown.oracle.api_key.as_deref(), Some("***"));
        assert_eq!(config.telegram.bot_token, "123:abc");
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [game]
            round_secs = 120
            og_cap = 5
            fud_chance = 0.25

            [oracle]
            timeout_secs = 3
            "#
        )
        .unwrap();

        let config = Config::read(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.game.round_secs, 120);
        assert_eq!(config.game.og_cap, 5);
        assert_eq!(config.game.fud_chance, 0.25);
        assert_eq!(config.oracle.timeout_secs, 3);
        assert_eq!(config.game.starting_tokens, 1000);
    }

    #[test]
    fn test_read_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::read(path.to_str().unwrap()).unwrap();
        assert_eq!(config.game.round_secs, 60);
        assert_eq!(config.oracle.cache_secs, 10);
    }
}
