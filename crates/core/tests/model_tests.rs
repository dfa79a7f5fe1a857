// ═══════════════════════════════════════════════════════════════════
// Model Tests: OptionKind, MonthDay, Position, PositionInput,
// QuoteCache, RefreshInterval, Settings, SortState
// ═══════════════════════════════════════════════════════════════════

use options_monitor_core::errors::CoreError;
use options_monitor_core::models::position::{
    normalize_ends, normalize_ticker, MonthDay, OptionKind, Position, PositionField,
    PositionInput,
};
use options_monitor_core::models::quote::{Quote, QuoteCache, QuoteUpdate};
use options_monitor_core::models::settings::{RefreshInterval, Settings};
use options_monitor_core::models::sort::{SortColumn, SortDirection, SortState};

fn validation_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn input(ticker: &str, ends: &str, kind: &str, contracts: &str, premium: &str, strike: &str) -> PositionInput {
    PositionInput {
        ticker: ticker.into(),
        ends: ends.into(),
        kind: kind.into(),
        contracts: contracts.into(),
        premium: premium.into(),
        strike: strike.into(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// OptionKind
// ═══════════════════════════════════════════════════════════════════

mod option_kind {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("call".parse::<OptionKind>().unwrap(), OptionKind::Call);
        assert_eq!("PUT".parse::<OptionKind>().unwrap(), OptionKind::Put);
        assert_eq!(" Put ".parse::<OptionKind>().unwrap(), OptionKind::Put);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "straddle".parse::<OptionKind>().unwrap_err();
        assert_eq!(validation_message(err), "Option must be Call or Put.");
    }

    #[test]
    fn display() {
        assert_eq!(OptionKind::Call.to_string(), "Call");
        assert_eq!(OptionKind::Put.to_string(), "Put");
    }
}

// ═══════════════════════════════════════════════════════════════════
// MonthDay
// ═══════════════════════════════════════════════════════════════════

mod month_day {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_valid() {
        assert_eq!(MonthDay::parse("3/21"), Some(MonthDay { month: 3, day: 21 }));
        assert_eq!(MonthDay::parse("12/05"), Some(MonthDay { month: 12, day: 5 }));
    }

    #[test]
    fn parse_invalid() {
        assert_eq!(MonthDay::parse(""), None);
        assert_eq!(MonthDay::parse("13/1"), None);
        assert_eq!(MonthDay::parse("0/10"), None);
        assert_eq!(MonthDay::parse("4/32"), None);
        assert_eq!(MonthDay::parse("Jan 5"), None);
        assert_eq!(MonthDay::parse("1/2/3"), None);
    }

    #[test]
    fn parse_rejects_days_the_month_lacks() {
        assert_eq!(MonthDay::parse("2/30"), None);
        assert_eq!(MonthDay::parse("4/31"), None);
        assert_eq!(MonthDay::parse("2/29"), Some(MonthDay { month: 2, day: 29 }));
        let err = normalize_ends("2/30").unwrap_err();
        assert_eq!(validation_message(err), "Close must be M/D format or empty.");
    }

    #[test]
    fn to_date_uses_year() {
        let md = MonthDay::parse("2/29").unwrap();
        assert_eq!(md.to_date(2024), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(md.to_date(2023), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Position
// ═══════════════════════════════════════════════════════════════════

mod position {
    use super::*;

    #[test]
    fn new_normalizes_ticker() {
        let p = Position::new(" aapl ", "1/17", OptionKind::Call, 1, 10.0, 150.0).unwrap();
        assert_eq!(p.ticker, "AAPL");
        assert_eq!(p.ends, "1/17");
    }

    #[test]
    fn equality_ignores_id() {
        let a = Position::new("MSFT", "", OptionKind::Put, 2, 0.0, 300.0).unwrap();
        let b = Position::new("MSFT", "", OptionKind::Put, 2, 0.0, 300.0).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_contracts_rejected() {
        assert!(Position::new("AAPL", "", OptionKind::Call, 0, 0.0, 1.0).is_err());
    }

    #[test]
    fn negative_or_nan_numbers_rejected() {
        assert!(Position::new("AAPL", "", OptionKind::Call, 1, -1.0, 1.0).is_err());
        assert!(Position::new("AAPL", "", OptionKind::Call, 1, 0.0, -5.0).is_err());
        assert!(Position::new("AAPL", "", OptionKind::Call, 1, f64::NAN, 1.0).is_err());
        assert!(Position::new("AAPL", "", OptionKind::Call, 1, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn long_ticker_rejected() {
        let err = Position::new("GOOGLE", "", OptionKind::Call, 1, 0.0, 1.0).unwrap_err();
        assert_eq!(validation_message(err), "Ticker cannot exceed 5 characters.");
    }

    #[test]
    fn from_stored_keeps_bad_ends() {
        let p = Position::from_stored("spy", "soon", OptionKind::Put, 1, 5.0, 400.0).unwrap();
        assert_eq!(p.ticker, "SPY");
        assert_eq!(p.ends, "soon");
        assert_eq!(p.expiration(), None);
    }

    #[test]
    fn expiration_parsed() {
        let p = Position::new("SPY", "6/20", OptionKind::Put, 1, 5.0, 400.0).unwrap();
        assert_eq!(p.expiration(), Some(MonthDay { month: 6, day: 20 }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PositionInput / field helpers
// ═══════════════════════════════════════════════════════════════════

mod position_input {
    use super::*;

    #[test]
    fn parse_valid() {
        let p = input("tsla", "3/15", "put", "3", "120.5", "180").parse().unwrap();
        assert_eq!(p.ticker, "TSLA");
        assert_eq!(p.ends, "3/15");
        assert_eq!(p.kind, OptionKind::Put);
        assert_eq!(p.contracts, 3);
        assert_eq!(p.premium, 120.5);
        assert_eq!(p.strike, 180.0);
    }

    #[test]
    fn blank_ends_accepted() {
        let p = input("T", "", "Call", "1", "0", "20").parse().unwrap();
        assert_eq!(p.ends, "");
    }

    #[test]
    fn bad_ends_message() {
        let err = input("T", "March", "Call", "1", "0", "20").parse().unwrap_err();
        assert_eq!(validation_message(err), "Close must be M/D format or empty.");
    }

    #[test]
    fn bad_ticker_message() {
        let err = input("TOOLONG", "", "Call", "1", "0", "20").parse().unwrap_err();
        assert_eq!(validation_message(err), "Invalid Ticker.");
        let err = input("  ", "", "Call", "1", "0", "20").parse().unwrap_err();
        assert_eq!(validation_message(err), "Invalid Ticker.");
    }

    #[test]
    fn bad_kind_message() {
        let err = input("T", "", "Strangle", "1", "0", "20").parse().unwrap_err();
        assert_eq!(validation_message(err), "Option must be Call or Put.");
    }

    #[test]
    fn bad_numbers_message() {
        for (c, p, s) in [("x", "0", "20"), ("1", "abc", "20"), ("1", "0", ""), ("1.5", "0", "20")] {
            let err = input("T", "", "Call", c, p, s).parse().unwrap_err();
            assert_eq!(validation_message(err), "Check Contracts, Premium & Strike.");
        }
    }

    #[test]
    fn normalize_helpers() {
        assert_eq!(normalize_ticker(" qqq ").unwrap(), "QQQ");
        assert!(normalize_ticker("").is_err());
        assert_eq!(normalize_ends(" 4/1 ").unwrap(), "4/1");
        assert!(normalize_ends("4-1").is_err());
    }

    #[test]
    fn field_from_str_aliases() {
        assert_eq!("ticker".parse::<PositionField>().unwrap(), PositionField::Ticker);
        assert_eq!("Close".parse::<PositionField>().unwrap(), PositionField::Ends);
        assert_eq!("kind".parse::<PositionField>().unwrap(), PositionField::Option);
        assert_eq!("STRIKE".parse::<PositionField>().unwrap(), PositionField::Strike);
        assert!("value".parse::<PositionField>().is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Quote / QuoteCache
// ═══════════════════════════════════════════════════════════════════

mod quote_cache {
    use super::*;

    fn update(ticker: &str, quote: Quote, generation: u64) -> QuoteUpdate {
        QuoteUpdate {
            ticker: ticker.into(),
            quote,
            generation,
        }
    }

    #[test]
    fn unknown_ticker_is_pending() {
        let cache = QuoteCache::new();
        assert_eq!(cache.get("AAPL"), Quote::Pending);
        assert!(!cache.contains("AAPL"));
        assert!(cache.is_unresolved("AAPL"));
    }

    #[test]
    fn discover_then_apply() {
        let mut cache = QuoteCache::new();
        cache.discover("aapl");
        assert!(cache.contains("AAPL"));
        assert_eq!(cache.get("AAPL"), Quote::Pending);

        assert!(cache.apply(update("AAPL", Quote::Price(190.5), 1)));
        assert_eq!(cache.get("aapl"), Quote::Price(190.5));
        assert!(!cache.is_unresolved("AAPL"));
    }

    #[test]
    fn discover_keeps_existing_price() {
        let mut cache = QuoteCache::new();
        cache.apply(update("AAPL", Quote::Price(1.0), 1));
        cache.discover("AAPL");
        assert_eq!(cache.get("AAPL"), Quote::Price(1.0));
    }

    #[test]
    fn older_generation_ignored() {
        let mut cache = QuoteCache::new();
        assert!(cache.apply(update("AAPL", Quote::Price(2.0), 5)));
        assert!(!cache.apply(update("AAPL", Quote::Price(1.0), 4)));
        assert_eq!(cache.get("AAPL"), Quote::Price(2.0));
        // Same generation overwrites
        assert!(cache.apply(update("AAPL", Quote::Unavailable, 5)));
        assert_eq!(cache.get("AAPL"), Quote::Unavailable);
    }

    #[test]
    fn clear_discards_in_flight_results() {
        let mut cache = QuoteCache::new();
        cache.apply(update("AAPL", Quote::Price(2.0), 1));
        cache.clear(3);
        assert!(cache.is_empty());
        assert!(!cache.accepts(2));
        assert!(cache.accepts(3));
        assert!(!cache.apply(update("AAPL", Quote::Price(9.0), 2)));
        assert!(cache.is_empty());
        assert!(cache.apply(update("AAPL", Quote::Price(9.0), 3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn quote_accessors() {
        assert_eq!(Quote::Price(3.5).price(), Some(3.5));
        assert_eq!(Quote::Pending.price(), None);
        assert!(!Quote::Unavailable.is_resolved());
    }
}

// ═══════════════════════════════════════════════════════════════════
// RefreshInterval
// ═══════════════════════════════════════════════════════════════════

mod refresh_interval {
    use super::*;
    use std::time::Duration;

    #[test]
    fn labels_round_trip() {
        for choice in RefreshInterval::CHOICES {
            let label = choice.to_string();
            assert_eq!(label.parse::<RefreshInterval>().unwrap(), choice);
        }
    }

    #[test]
    fn menu_labels() {
        let labels: Vec<String> = RefreshInterval::CHOICES.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            ["Don't Update", "5 Mins", "10 Mins", "15 Mins", "30 Mins", "1 Hour", "2 Hours"]
        );
    }

    #[test]
    fn periods() {
        assert_eq!(RefreshInterval::Manual.period(), None);
        assert_eq!(RefreshInterval::Minutes(5).period(), Some(Duration::from_secs(300)));
        assert_eq!(RefreshInterval::Hours(2).period(), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn only_menu_intervals_accepted() {
        assert!("45 Mins".parse::<RefreshInterval>().is_err());
        assert!("3 Hours".parse::<RefreshInterval>().is_err());
        assert!(matches!(
            "400000000000000000 Mins".parse::<RefreshInterval>(),
            Err(CoreError::InvalidInterval(_))
        ));

        let s = Settings {
            refresh_interval: "400000000000000000 Mins".into(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn huge_period_saturates() {
        assert_eq!(
            RefreshInterval::Hours(u64::MAX).period(),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn invalid_labels() {
        assert!("0 Mins".parse::<RefreshInterval>().is_err());
        assert!("often".parse::<RefreshInterval>().is_err());
        assert!("5 Days".parse::<RefreshInterval>().is_err());
        assert!(matches!(
            "soon".parse::<RefreshInterval>(),
            Err(CoreError::InvalidInterval(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.data_file.to_str(), Some("data.csv"));
        assert_eq!(s.interval().unwrap(), RefreshInterval::Minutes(5));
        assert_eq!(s.retry_attempts, 3);
        assert_eq!(s.retry_delay().as_millis(), 1000);
        assert!(!s.dev_mode);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut s = Settings::default();
        s.retry_attempts = 0;
        assert!(matches!(s.validate(), Err(CoreError::Config(_))));

        let mut s = Settings::default();
        s.refresh_interval = "whenever".into();
        assert!(matches!(s.validate(), Err(CoreError::InvalidInterval(_))));

        let mut s = Settings::default();
        s.data_file = "".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");

        let mut s = Settings::default();
        s.refresh_interval = "1 Hour".into();
        s.retry_attempts = 5;
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.refresh_interval, "1 Hour");
        assert_eq!(loaded.retry_attempts, 5);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "retry_attempts": 7 }"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.retry_attempts, 7);
        assert_eq!(loaded.refresh_interval, "5 Mins");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.retry_attempts, 3);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SortColumn / SortState
// ═══════════════════════════════════════════════════════════════════

mod sort_state {
    use super::*;

    #[test]
    fn first_click_sorts_descending() {
        let mut state = SortState::new();
        assert_eq!(state.toggle(SortColumn::Ticker), SortDirection::Descending);
        assert_eq!(state.toggle(SortColumn::Ticker), SortDirection::Ascending);
        assert_eq!(state.toggle(SortColumn::Ticker), SortDirection::Descending);
    }

    #[test]
    fn columns_remember_their_own_direction() {
        let mut state = SortState::new();
        state.toggle(SortColumn::Strike);
        state.toggle(SortColumn::Strike);
        assert_eq!(state.toggle(SortColumn::Value), SortDirection::Descending);
        assert_eq!(state.direction_of(SortColumn::Strike), SortDirection::Ascending);
        assert_eq!(state.toggle(SortColumn::Strike), SortDirection::Descending);
        assert_eq!(state.current(), Some((SortColumn::Strike, SortDirection::Descending)));
    }

    #[test]
    fn column_parse_and_flags() {
        assert_eq!("current".parse::<SortColumn>().unwrap(), SortColumn::Current);
        assert!("bogus".parse::<SortColumn>().is_err());
        assert!(SortColumn::Value.is_price_dependent());
        assert!(!SortColumn::Ends.is_price_dependent());
        assert_eq!(SortColumn::ALL.len(), 10);
    }
}
