use sigpipe::engine::arg_parser::Cli;
use sigpipe::engine::cli::build_opts;
use sigpipe::engine::source::{Source, count_items};
use sigpipe::engine::{
    DigestLock, SlotArena, SlotError, StdSigner, Signer, combine_results, crc32_of_md5,
    single_hash,
};
use sigpipe::pipeline::{InFlightLimiter, PipelineError};
use sigpipe::utils::{apply_file_to_opts, parse_sigpipe_toml};
use sigpipe::{FailurePolicy, Opts, SignOpts};
use std::io::Write;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// --- StdSigner ---

#[test]
fn test_crc32_check_value() {
    let signer = StdSigner::new();
    assert_eq!(signer.crc32("123456789").unwrap(), "3421780262");
}

#[test]
fn test_crc32_of_zero() {
    let signer = StdSigner::new();
    assert_eq!(signer.crc32("0").unwrap(), "4108050209");
}

#[test]
fn test_md5_hex() {
    let signer = StdSigner::new();
    let lock = DigestLock::new();
    let digest = lock.with_permit(|p| signer.md5("0", p)).unwrap();
    assert_eq!(digest, "cfcd208495d565ef66e7dff9f98764da");
    let empty = lock.with_permit(|p| signer.md5("", p)).unwrap();
    assert_eq!(empty, "d41d8cd98f00b204e9800998ecf8427e");
}

#[test]
fn test_crc32_of_md5_zero() {
    let signer = StdSigner::new();
    let lock = DigestLock::new();
    assert_eq!(crc32_of_md5(&signer, &lock, "0").unwrap(), "502633748");
}

#[test]
fn test_single_hash_zero() {
    let signer = StdSigner::new();
    let lock = DigestLock::new();
    assert_eq!(
        single_hash(&signer, &lock, "0").unwrap(),
        "4108050209~502633748"
    );
}

#[test]
fn test_md5_detects_overlap_across_locks() {
    // Two separate locks defeat the serialization; the signer must notice.
    let signer = Arc::new(StdSigner::with_latency(
        Duration::ZERO,
        Duration::from_millis(200),
    ));
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let signer = Arc::clone(&signer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let lock = DigestLock::new();
                barrier.wait();
                lock.with_permit(|p| signer.md5(&i.to_string(), p))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let contention = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .err()
                .and_then(|e| e.downcast_ref::<PipelineError>())
                == Some(&PipelineError::DigestContention)
        })
        .count();
    assert!(contention >= 1);
}

#[test]
fn test_md5_shared_lock_never_overlaps() {
    let signer = Arc::new(StdSigner::with_latency(
        Duration::ZERO,
        Duration::from_millis(5),
    ));
    let lock = Arc::new(DigestLock::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let signer = Arc::clone(&signer);
            let lock = Arc::clone(&lock);
            thread::spawn(move || lock.with_permit(|p| signer.md5(&i.to_string(), p)))
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
}

// --- SlotArena ---

#[test]
fn test_slots_read_in_index_order() {
    let slots = SlotArena::new(3);
    slots.fill(2, "c").unwrap();
    slots.fill(0, "a").unwrap();
    slots.fill(1, "b").unwrap();
    assert_eq!(slots.into_ordered().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_slots_reject_second_write() {
    let slots = SlotArena::new(2);
    slots.fill(1, 10).unwrap();
    assert_eq!(slots.fill(1, 11), Err(SlotError::AlreadyFilled(1)));
}

#[test]
fn test_slots_out_of_range() {
    let slots: SlotArena<u8> = SlotArena::new(2);
    assert_eq!(
        slots.fill(2, 0),
        Err(SlotError::OutOfRange { index: 2, len: 2 })
    );
}

#[test]
fn test_slots_missing_slot() {
    let slots = SlotArena::new(3);
    slots.fill(0, 'x').unwrap();
    slots.fill(2, 'z').unwrap();
    assert_eq!(slots.into_ordered(), Err(SlotError::Missing(1)));
}

#[test]
fn test_slots_filled_from_threads() {
    let slots = SlotArena::new(16);
    thread::scope(|s| {
        for i in 0..16 {
            let slots = &slots;
            s.spawn(move || {
                thread::sleep(Duration::from_millis((16 - i) as u64));
                slots.fill(i, i * i).unwrap();
            });
        }
    });
    let expected: Vec<usize> = (0..16).map(|i| i * i).collect();
    assert_eq!(slots.into_ordered().unwrap(), expected);
}

// --- combine_results ---

#[test]
fn test_combine_sorts_and_joins() {
    let got = combine_results(vec!["b".into(), "a".into(), "c".into()]);
    assert_eq!(got, "a_b_c");
}

#[test]
fn test_combine_empty() {
    assert_eq!(combine_results(Vec::new()), "");
}

#[test]
fn test_combine_byte_order() {
    // Byte order puts digits before uppercase before lowercase; "10" sorts before "9".
    let got = combine_results(vec!["a".into(), "B".into(), "9".into(), "10".into()]);
    assert_eq!(got, "10_9_B_a");
}

// --- InFlightLimiter ---

#[test]
fn test_limiter_permits_return_on_drop() {
    let limiter = InFlightLimiter::new(2);
    assert_eq!(limiter.available(), 2);
    let a = limiter.acquire();
    let _b = limiter.acquire();
    assert_eq!(limiter.available(), 0);
    drop(a);
    assert_eq!(limiter.available(), 1);
}

// --- options / config ---

#[test]
fn test_sign_opts_defaults() {
    let opts = Opts::from(&SignOpts::default());
    assert!(opts.max_in_flight >= 2);
    assert_eq!(opts.failure_policy, FailurePolicy::Abort);
    assert!(opts.crc_delay.is_zero());
    assert!(opts.md5_delay.is_zero());
}

#[test]
fn test_toml_applies_present_fields_only() {
    let file = parse_sigpipe_toml(
        r#"
        [settings]
        max_in_flight = 3
        keep_going = true
        md5_delay_ms = 15
        "#,
    )
    .unwrap();
    let mut opts = Opts::default();
    let cap_before = opts.channel_cap;
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.max_in_flight, 3);
    assert_eq!(opts.failure_policy, FailurePolicy::Sentinel);
    assert_eq!(opts.md5_delay, Duration::from_millis(15));
    assert_eq!(opts.channel_cap, cap_before);
}

#[test]
fn test_toml_rejects_unknown_setting() {
    assert!(parse_sigpipe_toml("[settings]\nmax_inflight = 3\n").is_err());
}

#[test]
fn test_cli_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[settings]\nmax_in_flight = 5\nchannel_cap = 8\nkeep_going = true").unwrap();
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        max_in_flight: Some(9),
        ..Default::default()
    };
    let opts = build_opts(&cli).unwrap();
    assert_eq!(opts.max_in_flight, 9);
    assert_eq!(opts.channel_cap, 8);
    assert_eq!(opts.failure_policy, FailurePolicy::Sentinel);
    assert_eq!(opts.config_path.as_deref(), Some(file.path()));
}

#[test]
fn test_missing_explicit_config_is_error() {
    let cli = Cli {
        config: Some("/nonexistent/sigpipe.toml".into()),
        ..Default::default()
    };
    assert!(build_opts(&cli).is_err());
}

// --- sources ---

#[test]
fn test_count_items_are_decimal() {
    let items: Vec<String> = count_items(3).collect();
    assert_eq!(items, vec!["0", "1", "2"]);
}

#[test]
fn test_source_defaults_to_count() {
    let src = Source::from_cli(&Cli::default()).unwrap();
    assert_eq!(src, Source::Count(7));
}

#[test]
fn test_source_rejects_two_inputs() {
    let cli = Cli {
        values: vec!["a".into()],
        count: Some(3),
        ..Default::default()
    };
    assert!(Source::from_cli(&cli).is_err());
}

#[test]
fn test_source_file_skips_blank_lines_keeps_payload_whitespace() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "a\n\n  b  \n   \nc").unwrap();
    let cli = Cli {
        input: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let items: Vec<String> = Source::from_cli(&cli).unwrap().into_items().unwrap().collect();
    assert_eq!(items, vec!["a", "  b  ", "c"]);
}
