//! Concurrency Tests
//!
//! Many threads appending to one step, to many steps, and racing finish
//! against append.

use crate::common::*;
use std::collections::HashSet;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 200;

#[test]
fn concurrent_appends_to_one_step_never_interleave() {
    let t = TestStore::new();
    let store = Arc::new(t.store);

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let data = format!("worker-{}-line-{}-{}", worker, i, "x".repeat(512));
                    store
                        .log_append(&entry(1, (worker * PER_THREAD + i) as i64, &data))
                        .expect("append");
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let found = store.log_find(StepId::new(1)).expect("every line should decode");
    assert_eq!(found.len(), THREADS * PER_THREAD);

    let unique: HashSet<i64> = found.iter().map(|e| e.line).collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
    assert_eq!(store.open_handles(), 1, "only one handle for the step");
}

#[test]
fn per_thread_order_is_preserved() {
    let t = TestStore::new();
    let store = Arc::new(t.store);

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let e = entry(1, i as i64, &format!("{}", worker));
                    store.log_append(&e).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let found = store.log_find(StepId::new(1)).unwrap();
    for worker in 0..THREADS {
        let tag = worker.to_string();
        let lines: Vec<i64> = found
            .iter()
            .filter(|e| e.text() == tag.as_str())
            .map(|e| e.line)
            .collect();
        let expected: Vec<i64> = (0..PER_THREAD as i64).collect();
        assert_eq!(lines, expected, "worker {} lines out of order", worker);
    }
}

#[test]
fn concurrent_steps_get_their_own_files() {
    let t = TestStore::new();
    let store = Arc::new(t.store);

    let workers: Vec<_> = (0..THREADS as i64)
        .map(|step| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..PER_THREAD as i64 {
                    store.log_append(&entry(step, i, "line")).unwrap();
                }
                store.log_finish(StepId::new(step)).unwrap();
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(store.open_handles(), 0);
    for step in 0..THREADS as i64 {
        assert_eq!(store.log_find(StepId::new(step)).unwrap().len(), PER_THREAD);
    }
}

#[test]
fn finish_racing_appends_loses_nothing() {
    let t = TestStore::new();
    let store = Arc::new(t.store);

    let appender = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..(PER_THREAD * 5) as i64 {
                store.log_append(&entry(3, i, "a")).unwrap();
            }
        })
    };
    let finisher = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..PER_THREAD {
                store.log_finish(StepId::new(3)).unwrap();
                thread::yield_now();
            }
        })
    };
    appender.join().unwrap();
    finisher.join().unwrap();
    store.log_finish(StepId::new(3)).unwrap();

    let lines: Vec<i64> = store
        .log_find(StepId::new(3))
        .unwrap()
        .iter()
        .map(|e| e.line)
        .collect();
    let expected: Vec<i64> = (0..(PER_THREAD * 5) as i64).collect();
    assert_eq!(lines, expected);
    assert_eq!(store.open_handles(), 0);
}

#[test]
fn find_while_appending_returns_whole_lines() {
    let t = TestStore::new();
    let store = Arc::new(t.store);

    let appender = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..PER_THREAD as i64 {
                store.log_append(&entry(4, i, "payload")).unwrap();
            }
        })
    };

    let mut last = 0;
    while last < PER_THREAD {
        let found = store.log_find(StepId::new(4)).expect("no torn lines");
        assert!(found.len() >= last);
        last = found.len();
        if appender.is_finished() && last < PER_THREAD {
            last = store.log_find(StepId::new(4)).unwrap().len();
            break;
        }
    }
    appender.join().unwrap();
    assert_eq!(last, PER_THREAD);
}
