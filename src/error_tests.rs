//! Tests for error replies

#[cfg(test)]
mod tests {
    use super::super::error::*;
    use super::super::types::Symbol;

    #[test]
    fn test_game_errors_have_replies() {
        let errors = vec![
            BotError::PriceUnavailable { symbol: Symbol::Btc, reason: "timeout".to_string() },
            BotError::InsufficientTokens { needed: 500, available: 120 },
            BotError::AlreadyActive { symbol: Symbol::Eth, remaining_secs: 42 },
            BotError::AlreadyClaimedToday { remaining_secs: 3_700 },
            BotError::Cooldown { remaining_secs: 12 },
            BotError::UnknownSymbol("doge".to_string()),
            BotError::InvalidCommand("Usage: /predict".to_string()),
            BotError::NoActiveRound,
        ];
        for e in errors {
            assert!(e.user_message().is_some(), "{:?} should have a reply", e);
        }
    }

    #[test]
    fn test_internal_errors_have_no_reply() {
        assert!(BotError::Internal("boom".to_string()).user_message().is_none());
        assert!(BotError::Telegram("502".to_string()).user_message().is_none());
        assert!(BotError::Config("missing".to_string()).user_message().is_none());
    }

    #[test]
    fn test_reply_contents() {
        let reply = BotError::InsufficientTokens { needed: 500, available: 120 }
            .user_message()
            .unwrap();
        assert!(reply.contains("500"));
        assert!(reply.contains("120"));

        let reply = BotError::AlreadyActive { symbol: Symbol::Eth, remaining_secs: 42 }
            .user_message()
            .unwrap();
        assert!(reply.contains("ETH"));
        assert!(reply.contains("42s"));

        let reply = BotError::AlreadyClaimedToday { remaining_secs: 3_700 }.user_message().unwrap();
        assert!(reply.contains("1h 1m"));

        let reply = BotError::UnknownSymbol("doge".to_string()).user_message().unwrap();
        assert!(reply.contains("BTC, ETH, BNB, ADA, SOL"));
    }

    #[test]
    fn test_price_unavailable_reassures_player() {
        let reply = BotError::PriceUnavailable { symbol: Symbol::Sol, reason: "429".to_string() }
            .user_message()
            .unwrap();
        assert!(reply.contains("SOL"));
        assert!(reply.contains("safe"));
        assert!(!reply.contains("429"));
    }

    #[test]
    fn test_config_error_conversion() {
        let e: BotError = config::ConfigError::Message("bad value".to_string()).into();
        assert!(matches!(e, BotError::Config(ref m) if m.contains("bad value")));
    }

    #[test]
    fn test_display() {
        let e = BotError::Cooldown { remaining_secs: 7 };
        assert_eq!(e.to_string(), "Cooldown active: 7s remaining");
    }
}
