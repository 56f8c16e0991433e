use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use pretty_assertions::assert_eq;
use queue_eta_estimator::{
    EngineConfig,
    Eta,
    RateEtaEngine,
};
use serde_json::{
    json,
    Value,
};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
}

fn engine() -> RateEtaEngine {
    RateEtaEngine::new(EngineConfig::default()).unwrap()
}

/// Shape of the Immich `/api/jobs` response.
fn jobs_document(queues: &[(&str, i64, i64)]) -> Value {
    let mut document = serde_json::Map::new();
    for (name, waiting, active) in queues {
        document.insert(
            name.to_string(),
            json!({
                "jobCounts": {
                    "active": active,
                    "completed": 0,
                    "failed": 0,
                    "delayed": 0,
                    "waiting": waiting,
                    "paused": 0,
                },
                "queueStatus": { "isActive": *active > 0, "isPaused": false },
            }),
        );
    }
    Value::Object(document)
}

#[test]
fn every_snapshot_satisfies_the_pending_identity() {
    let document = json!({
        "a": { "jobCounts": { "waiting": 5, "active": 2, "delayed": 3, "paused": 1, "failed": 9 } },
        "b": [
            { "queue": "b", "waiting": 1.7, "active": "x", "delayed": 4 },
            { "queue": "b", "waiting": 8, "paused": 2 },
        ],
        "c": { "nested": { "deeper": { "waiting": -2, "active": 5, "completed": 10 } } },
        "noise": { "waiting": 3, "name": "only-one-field" },
    });
    let report = engine().process_document(at(0), &document);
    assert!(!report.snapshot.is_empty());
    for queue in &report.snapshot.queues {
        assert_eq!(queue.pending, queue.waiting + queue.active + queue.delayed + queue.paused);
    }
    let totals = report.snapshot.totals;
    assert_eq!(totals.pending, totals.waiting + totals.active + totals.delayed + totals.paused);
}

#[test]
fn duplicate_queue_keeps_maximum_not_sum_or_last() {
    let document = json!({
        "views": [
            { "queue": "library", "waiting": 4, "active": 0 },
            { "queue": "library", "waiting": 10, "active": 2 },
            { "queue": "library", "waiting": 1, "active": 0 },
        ]
    });
    let report = engine().process_document(at(0), &document);
    assert_eq!(report.snapshot.queues.len(), 1);
    assert_eq!(report.snapshot.queue("library").unwrap().pending, 12);
    assert_eq!(report.snapshot.totals.pending, 17);
}

#[test]
fn only_the_second_observation_defines_a_rate() {
    let mut engine = engine();
    let first = engine.process_document(at(0), &jobs_document(&[("search", 10, 0)]));
    assert!(first.estimate.global.rate.is_none());
    assert!(first.estimate.queue("search").unwrap().rate.is_none());
    assert_eq!(first.estimate.queue("search").unwrap().eta, Eta::Unavailable);

    let second = engine.process_document(at(5), &jobs_document(&[("search", 5, 0)]));
    assert_eq!(second.estimate.global.rate.unwrap().inst_rate, 1.0);
    assert_eq!(second.estimate.queue("search").unwrap().rate.unwrap().inst_rate, 1.0);
}

#[test]
fn non_increasing_backlog_never_yields_negative_rates() {
    let mut engine = engine();
    let pending = [500, 500, 480, 480, 300, 299, 299, 0, 0];
    for (tick, pending) in pending.into_iter().enumerate() {
        let report = engine.process_document(at(tick as i64 * 7), &jobs_document(&[("faces", pending, 0)]));
        if let Some(rate) = report.estimate.global.rate {
            assert!(rate.ema_rate >= 0.0, "tick {tick}: {rate:?}");
            assert!(rate.avg_rate >= 0.0, "tick {tick}: {rate:?}");
        }
    }
}

#[test]
fn constant_drain_converges_to_the_drain_rate() {
    let mut engine = RateEtaEngine::new(EngineConfig {
        alpha: 0.3,
        remaining: None,
    })
    .unwrap();

    // A burst first, so the EMA starts away from the steady rate.
    engine.process_document(at(0), &jobs_document(&[("video", 10_000, 0)]));
    engine.process_document(at(10), &jobs_document(&[("video", 9_500, 0)]));

    let mut pending = 9_500;
    let mut last = None;
    for tick in 2..80 {
        pending -= 20;
        let report = engine.process_document(at(tick * 10), &jobs_document(&[("video", pending, 0)]));
        last = report.estimate.global.rate;
    }
    let rate = last.unwrap();
    assert_eq!(rate.inst_rate, 2.0);
    assert!((rate.ema_rate - 2.0).abs() < 1e-6, "{rate:?}");
}

#[test]
fn eta_follows_the_sign_of_the_smoothed_rate() {
    let mut engine = engine();
    engine.process_document(at(0), &jobs_document(&[("a", 100, 0)]));

    let draining = engine.process_document(at(10), &jobs_document(&[("a", 90, 0)]));
    let eta = draining.estimate.global.eta.secs().unwrap();
    assert!(eta.is_finite() && eta > 0.0);

    // One large refill pushes the EMA negative.
    let growing = engine.process_document(at(20), &jobs_document(&[("a", 400, 0)]));
    assert!(growing.estimate.global.rate.unwrap().ema_rate <= 0.0);
    assert_eq!(growing.estimate.global.eta, Eta::Unavailable);
}

#[test]
fn thumbnail_scenario() {
    let document = json!({
        "thumbnailGeneration": {
            "jobCounts": { "waiting": 5, "active": 2, "delayed": 0, "paused": 0, "failed": 1 }
        }
    });
    let report = engine().process_document(at(0), &document);
    let queue = report.snapshot.queue("thumbnailGeneration").unwrap();
    assert_eq!(queue.pending, 7);
    assert_eq!(queue.failed, 1);
}

#[test]
fn global_rate_scenario() {
    let mut engine = RateEtaEngine::new(EngineConfig {
        alpha: 0.3,
        remaining: None,
    })
    .unwrap();
    engine.process_document(at(0), &jobs_document(&[("a", 60, 0), ("b", 40, 0)]));
    let report = engine.process_document(at(20), &jobs_document(&[("a", 50, 0), ("b", 30, 0)]));

    let rate = report.estimate.global.rate.unwrap();
    assert_eq!(report.estimate.global.pending, 80);
    assert_eq!(rate.inst_rate, 1.0);
    assert_eq!(rate.ema_rate, 1.0);
    assert_eq!(report.estimate.global.eta, Eta::Available(80.0));
}

#[test]
fn vanished_queue_keeps_rate_and_leaves_the_critical_path() {
    let mut engine = engine();
    engine.process_document(at(0), &jobs_document(&[("slow", 1_000, 0), ("fast", 100, 0)]));
    let second = engine.process_document(at(10), &jobs_document(&[("slow", 990, 0), ("fast", 50, 0)]));
    assert_eq!(second.estimate.critical_path.unwrap().name, "slow");
    let slow_rate = *engine.rate("slow").unwrap();

    let third = engine.process_document(at(20), &jobs_document(&[("fast", 40, 0)]));
    assert_eq!(engine.rate("slow"), Some(&slow_rate));
    assert!(third.queue("slow").is_none());
    assert_eq!(third.estimate.critical_path.unwrap().name, "fast");
}

#[test]
fn stalled_queue_eta_stays_finite_over_a_long_session() {
    let mut engine = engine();
    engine.process_document(at(0), &jobs_document(&[("library", 100, 0)]));
    engine.process_document(at(60), &jobs_document(&[("library", 40, 0)]));

    let mut saw_unavailable = false;
    // A few days of one-minute samples with no progress.
    for tick in 2..5_000 {
        let report = engine.process_document(at(tick * 60), &jobs_document(&[("library", 40, 0)]));
        let queue = report.estimate.queue("library").unwrap();
        let ema_rate = queue.ema_rate().unwrap();
        assert!(ema_rate >= 0.0, "tick {tick}: {ema_rate}");

        for eta in [queue.eta, report.estimate.global.eta] {
            if let Some(secs) = eta.secs() {
                assert!(secs.is_finite() && secs > 0.0, "tick {tick}: ema={ema_rate:e} eta={secs}");
            }
        }
        assert_eq!(
            report.estimate.critical_path.is_some(),
            queue.eta != Eta::Unavailable,
            "tick {tick}"
        );

        let exported = serde_json::to_value(&report).unwrap();
        let queue_eta = &exported["estimate"]["queues"][0]["eta"];
        match queue.eta {
            Eta::Available(secs) => assert_eq!(queue_eta.as_f64(), Some(secs)),
            Eta::Unavailable => {
                saw_unavailable = true;
                assert!(queue_eta.is_null());
            }
        }
    }
    assert!(saw_unavailable);
}
