mod common;

use chrono::TimeDelta;
use common::*;
use linkmint::ShortenerError;
use linkmint::application::EngineConfig;
use linkmint::domain::entities::{RecordStatus, Ttl};
use std::time::Duration;

#[test]
fn test_code_resolves_until_ttl_elapses() {
    let engine = create_engine(&test_config());
    let record = engine
        .shortener
        .create(
            "https://example.com/brief",
            Some(Ttl::After(Duration::from_millis(100))),
        )
        .unwrap();
    let code = record.code.as_str();

    assert_eq!(
        engine.shortener.resolve(code).unwrap(),
        "https://example.com/brief"
    );

    std::thread::sleep(Duration::from_millis(150));

    assert_eq!(
        engine.shortener.resolve(code),
        Err(ShortenerError::CodeNotFound(code.to_string()))
    );
}

#[test]
fn test_expired_code_is_hidden_before_any_sweep() {
    let (engine, clock) = create_engine_with_clock(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/a", ttl_secs(60))
        .unwrap();

    clock.advance(TimeDelta::seconds(59));
    assert!(engine.shortener.inspect(record.code.as_str()).is_ok());

    clock.advance(TimeDelta::seconds(1));
    assert!(matches!(
        engine.shortener.inspect(record.code.as_str()),
        Err(ShortenerError::CodeNotFound(_))
    ));
}

#[test]
fn test_sweep_reclaims_only_due_records() {
    let (engine, clock) = create_engine_with_clock(&test_config());
    let short = engine
        .shortener
        .create("https://example.com/short", ttl_secs(10))
        .unwrap();
    let long = engine
        .shortener
        .create("https://example.com/long", ttl_secs(3600))
        .unwrap();
    let forever = engine
        .shortener
        .create("https://example.com/forever", Some(Ttl::Never))
        .unwrap();

    clock.advance(TimeDelta::seconds(11));
    let report = engine.expiration.sweep().unwrap();

    assert_eq!(report.reclaimed, 1);
    assert!(engine.shortener.inspect(short.code.as_str()).is_err());
    assert_eq!(
        engine.shortener.inspect(long.code.as_str()).unwrap().status,
        RecordStatus::Active
    );
    assert!(engine.shortener.inspect(forever.code.as_str()).is_ok());
}

#[test]
fn test_never_expiring_record_survives_any_clock() {
    let (engine, clock) = create_engine_with_clock(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/forever", None)
        .unwrap();

    assert_eq!(record.expiry.timestamp(), None);

    clock.advance(TimeDelta::days(365 * 50));
    let report = engine.expiration.sweep().unwrap();

    assert_eq!(report.reclaimed, 0);
    assert_eq!(
        engine.shortener.resolve(record.code.as_str()).unwrap(),
        "https://example.com/forever"
    );
}

#[test]
fn test_default_ttl_applies_when_none_given() {
    let config = EngineConfig {
        default_ttl: Ttl::After(Duration::from_secs(30)),
        ..test_config()
    };
    let (engine, clock) = create_engine_with_clock(&config);

    let record = engine
        .shortener
        .create("https://example.com/a", None)
        .unwrap();

    assert_eq!(
        record.expiry.timestamp(),
        Some(record.created_at + TimeDelta::seconds(30))
    );

    clock.advance(TimeDelta::seconds(31));
    assert!(engine.shortener.resolve(record.code.as_str()).is_err());
}

#[test]
fn test_swept_codes_are_issued_again() {
    let (engine, clock) = create_engine_with_clock(&tiny_keyspace("ab", 1));

    let first = engine
        .shortener
        .create("https://example.com/1", ttl_secs(5))
        .unwrap();
    let second = engine
        .shortener
        .create("https://example.com/2", ttl_secs(5))
        .unwrap();
    assert_ne!(first.code, second.code);

    assert!(matches!(
        engine.shortener.create("https://example.com/3", ttl_secs(5)),
        Err(ShortenerError::ExhaustedKeyspace { .. })
    ));

    clock.advance(TimeDelta::seconds(6));
    let report = engine.expiration.sweep().unwrap();
    assert_eq!(report.reclaimed, 2);

    let reissued = engine
        .shortener
        .create("https://example.com/3", None)
        .unwrap();
    assert!(reissued.code == first.code || reissued.code == second.code);
    assert_eq!(
        engine.shortener.resolve(reissued.code.as_str()).unwrap(),
        "https://example.com/3"
    );
}

#[test]
fn test_due_code_is_reusable_without_a_sweep() {
    let (engine, clock) = create_engine_with_clock(&tiny_keyspace("a", 1));

    let first = engine
        .shortener
        .create("https://example.com/old", ttl_secs(1))
        .unwrap();

    clock.advance(TimeDelta::seconds(2));

    let second = engine
        .shortener
        .create("https://example.com/new", None)
        .unwrap();

    assert_eq!(first.code, second.code);
    assert_eq!(
        engine.shortener.resolve(second.code.as_str()).unwrap(),
        "https://example.com/new"
    );
}

#[test]
fn test_grace_period_delays_reclamation() {
    let config = EngineConfig {
        expired_grace: Duration::from_secs(60),
        ..tiny_keyspace("a", 1)
    };
    let (engine, clock) = create_engine_with_clock(&config);

    let record = engine
        .shortener
        .create("https://example.com/a", ttl_secs(1))
        .unwrap();

    clock.advance(TimeDelta::seconds(30));
    assert!(engine.shortener.inspect(record.code.as_str()).is_err());
    assert_eq!(engine.expiration.sweep().unwrap().reclaimed, 0);

    clock.advance(TimeDelta::seconds(60));
    assert_eq!(engine.expiration.sweep().unwrap().reclaimed, 1);
}

#[test]
fn test_sweep_drains_more_than_one_batch() {
    let config = EngineConfig {
        sweep_batch_size: 4,
        ..test_config()
    };
    let (engine, clock) = create_engine_with_clock(&config);

    for i in 0..10 {
        engine
            .shortener
            .create(&format!("https://example.com/{i}"), ttl_secs(1))
            .unwrap();
    }

    clock.advance(TimeDelta::seconds(2));
    let report = engine.expiration.sweep().unwrap();

    assert_eq!(report.examined, 10);
    assert_eq!(report.reclaimed, 10);
    assert_eq!(engine.expiration.sweep().unwrap().examined, 0);
}
