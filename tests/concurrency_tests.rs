//! Concurrent writers against one base directory
//!
//! Every thread opens its own service, so each holds a separate lock file
//! handle, just like separate processes do.

use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use gacha_tally::{GachaService, Paths, Roster};
use tempfile::TempDir;

const WRITERS: usize = 8;
const RECORDS_PER_WRITER: usize = 5;

fn spawn_writers<F>(base: PathBuf, work: F) -> Vec<thread::JoinHandle<()>>
where
    F: Fn(usize, &GachaService) + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(WRITERS));
    let work = Arc::new(work);

    (0..WRITERS)
        .map(|i| {
            let base = base.clone();
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            thread::spawn(move || {
                let service = GachaService::open(Paths::new(&base)).unwrap();
                barrier.wait();
                (*work)(i, &service);
            })
        })
        .collect()
}

#[test]
fn test_no_lost_updates_on_one_player() {
    let temp_dir = TempDir::new().unwrap();

    let handles = spawn_writers(temp_dir.path().to_path_buf(), |i, service| {
        for n in 0..RECORDS_PER_WRITER {
            let code = if (i + n) % 2 == 0 { "1" } else { "0" };
            service.record("userA", code).unwrap();
        }
    });
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let service = GachaService::open(Paths::new(temp_dir.path())).unwrap();
    let roster = service.roster().unwrap();
    let a = roster.get("userA").unwrap();

    let expected_jackpots = (0..WRITERS)
        .flat_map(|i| (0..RECORDS_PER_WRITER).map(move |n| (i + n) % 2 == 0))
        .filter(|&jackpot| jackpot)
        .count() as u64;
    let total = (WRITERS * RECORDS_PER_WRITER) as u64;
    assert_eq!(a.jackpot_count(), expected_jackpots);
    assert_eq!(a.hit_count(), total - expected_jackpots);
}

#[test]
fn test_new_players_get_distinct_orders() {
    let temp_dir = TempDir::new().unwrap();

    let handles = spawn_writers(temp_dir.path().to_path_buf(), |i, service| {
        service.record(&format!("player{}", i), "0").unwrap();
    });
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let service = GachaService::open(Paths::new(temp_dir.path())).unwrap();
    let roster = service.roster().unwrap();
    assert_eq!(roster.len(), WRITERS);

    let mut orders: Vec<u32> = roster.users().iter().map(|p| p.order()).collect();
    orders.sort_unstable();
    assert_eq!(orders, (1..=WRITERS as u32).collect::<Vec<_>>());
}

#[test]
fn test_roster_file_always_parses_during_writes() {
    let temp_dir = TempDir::new().unwrap();
    let roster_path = Paths::new(temp_dir.path()).roster_path();

    let handles = spawn_writers(temp_dir.path().to_path_buf(), |i, service| {
        for _ in 0..RECORDS_PER_WRITER {
            service.record(&format!("player{}", i % 3), "0").unwrap();
        }
    });

    // Unlocked readers must never see a torn file
    while handles.iter().any(|h| !h.is_finished()) {
        if let Ok(bytes) = std::fs::read(&roster_path) {
            Roster::from_json_slice(&bytes).unwrap();
        }
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let roster = Roster::from_json_slice(&std::fs::read(&roster_path).unwrap()).unwrap();
    let total: u64 = roster.users().iter().map(|p| p.hit_count()).sum();
    assert_eq!(total, (WRITERS * RECORDS_PER_WRITER) as u64);
}
