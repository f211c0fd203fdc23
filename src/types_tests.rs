//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::error::BotError;
    use super::super::types::*;

    #[test]
    fn test_symbol_serialization() {
        assert_eq!(serde_json::to_string(&Symbol::Btc).unwrap(), "\"BTC\"");
        let sol: Symbol = serde_json::from_str("\"SOL\"").unwrap();
        assert_eq!(sol, Symbol::Sol);
    }

    #[test]
    fn test_symbol_parse_ticker_and_name() {
        assert_eq!("btc".parse::<Symbol>().unwrap(), Symbol::Btc);
        assert_eq!("ETH".parse::<Symbol>().unwrap(), Symbol::Eth);
        assert_eq!("binancecoin".parse::<Symbol>().unwrap(), Symbol::Bnb);
        assert_eq!(" Cardano ".parse::<Symbol>().unwrap(), Symbol::Ada);
    }

    #[test]
    fn test_symbol_parse_unknown() {
        match "doge".parse::<Symbol>() {
            Err(BotError::UnknownSymbol(s)) => assert_eq!(s, "doge"),
            other => panic!("expected UnknownSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_symbol_coingecko_ids() {
        let ids: Vec<_> = Symbol::ALL.iter().map(|s| s.coingecko_id()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "binancecoin", "cardano", "solana"]);
        assert_eq!(Symbol::Ada.to_string(), "ADA");
    }

    #[test]
    fn test_direction_parse_aliases() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("PUMP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("d".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!("short".parse::<Direction>().unwrap(), Direction::Down);
        assert!(matches!("sideways".parse::<Direction>(), Err(BotError::InvalidCommand(_))));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "UP");
        assert_eq!(Direction::Down.to_string(), "DOWN");
        assert_ne!(Direction::Up.emoji(), Direction::Down.emoji());
    }

    #[test]
    fn test_power_up_parse() {
        assert_eq!("whale".parse::<PowerUp>().unwrap(), PowerUp::WhaleMode);
        assert_eq!("Shield".parse::<PowerUp>().unwrap(), PowerUp::StreakShield);
        assert!("rocket".parse::<PowerUp>().is_err());
    }

    #[test]
    fn test_power_up_serialization() {
        assert_eq!(serde_json::to_string(&PowerUp::WhaleMode).unwrap(), "\"whale_mode\"");
        assert_eq!(PowerUp::StreakShield.to_string(), "Streak Shield");
    }

    #[test]
    fn test_api_tier_display() {
        assert_eq!(ApiTier::Free.to_string(), "Free");
        assert_eq!(ApiTier::Pro.to_string(), "Pro");
    }
}
