//! End-to-end tests of the inspection flow: context gating, resolution
//! precedence, rendering, and the stash lifecycle.
//!
//! These tests share the process-wide context store and stash, so each one
//! takes the serializing lock first and uses keys/tags unique to this file.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use behold::{
    clear_stash, get_stash, in_context, set_context, snapshot, unset_context, Args, Behold,
    BeholdError, Value,
};
use serde::Serialize;
use serde_json::json;

static LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedSink {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[derive(Serialize)]
struct Reading {
    sensor: &'static str,
    value: i64,
}

#[test]
fn unfiltered_inspections_always_pass() {
    let _serial = serial();
    let sink = SharedSink::default();
    let mut debug = Behold::new().with_sink(Box::new(sink.clone()));
    assert!(debug.show(Args::new().field("x", 1)).unwrap());
    assert!(debug.is_true(Args::new()).unwrap());
    assert_eq!(sink.contents(), "x: 1\n");
}

#[test]
fn failed_boolean_suppresses_every_terminal() {
    let _serial = serial();
    clear_stash::<_, &str>([]).unwrap();
    let sink = SharedSink::default();
    let mut debug = Behold::new()
        .tag("it_suppressed")
        .with_sink(Box::new(sink.clone()));

    assert!(!debug.when(false).show(Args::new().field("x", 1)).unwrap());
    assert!(!debug.when(false).stash(Args::new().field("x", 1)).unwrap());
    assert!(!debug.when(false).is_true(Args::new()).unwrap());
    assert!(debug
        .when(false)
        .get(Args::new().field("x", 1))
        .unwrap()
        .is_none());

    assert_eq!(sink.contents(), "");
    assert!(get_stash("it_suppressed").is_err());
}

#[test]
fn struct_subjects_render_in_sorted_order() {
    let _serial = serial();
    let sink = SharedSink::default();
    let mut debug = Behold::new().with_sink(Box::new(sink.clone()));
    let reading = Reading {
        sensor: "temp",
        value: 21,
    };
    debug.show(Args::new().subject(&reading)).unwrap();
    assert_eq!(sink.contents(), "sensor: temp, value: 21\n");
}

#[test]
fn keyword_data_overrides_subject_attributes() {
    let _serial = serial();
    let mut debug = Behold::new().manual();
    let reading = Reading {
        sensor: "temp",
        value: 21,
    };
    // Keyword names join the requested list, so `sensor` must be asked for.
    let item = debug
        .get(Args::new().name("sensor").subject(&reading).field("value", 99))
        .unwrap()
        .unwrap();
    assert_eq!(item.get("value"), Some(&json!(99)));
    assert_eq!(item.get("sensor"), Some(&json!("temp")));

    // Without explicit names the requested list is the keyword names alone;
    // the full-key-set fallback only applies when nothing was requested.
    let item = debug
        .get(Args::new().subject(&reading).field("value", 99))
        .unwrap()
        .unwrap();
    assert_eq!(item.get("value"), Some(&json!(99)));
    assert_eq!(item.get("sensor"), None);
}

#[test]
fn context_suffix_semantics() {
    let _serial = serial();
    set_context("it_x", 10);
    let mut debug = Behold::new().manual();

    assert!(debug.when_context("it_x__gt", 5).is_true(Args::new()).unwrap());
    assert!(!debug.when_context("it_x__lt", 5).is_true(Args::new()).unwrap());
    assert!(debug
        .when_context("it_x__in", json!([1, 10]))
        .is_true(Args::new())
        .unwrap());
    assert!(!debug
        .when_context("it_x__in", json!([1, 2]))
        .is_true(Args::new())
        .unwrap());

    unset_context(["it_x"]);
    assert!(!debug.when_context("it_x__gt", 5).is_true(Args::new()).unwrap());
    assert!(!debug.when_context("it_x", 10).is_true(Args::new()).unwrap());
}

#[test]
fn nested_scoped_context_removes_rather_than_restores() {
    let _serial = serial();
    let mut debug = Behold::new().manual();
    {
        let _outer = in_context([("it_what", "a")]);
        assert!(debug.when_context("it_what", "a").is_true(Args::new()).unwrap());
        {
            let _inner = in_context([("it_what", "b")]);
            assert!(debug.when_context("it_what", "b").is_true(Args::new()).unwrap());
        }
        // The inner exit unset the key entirely; the outer value is gone.
        assert!(!debug.when_context("it_what", "a").is_true(Args::new()).unwrap());
    }
}

#[test]
fn stash_accumulates_and_copies_and_clears() {
    let _serial = serial();
    clear_stash::<_, &str>([]).unwrap();
    let mut debug = Behold::new().tag("it_rows").manual();

    for n in 0..3 {
        assert!(debug.stash(Args::new().field("n", n)).unwrap());
    }

    let rows = get_stash("it_rows").unwrap();
    assert_eq!(rows.len(), 3);
    // Raw values, in recording order, not display strings.
    assert_eq!(rows[0].get("n"), Some(&json!(0)));
    assert_eq!(rows[2].get("n"), Some(&json!(2)));

    // The returned rows are a deep copy.
    let mut copied = get_stash("it_rows").unwrap();
    copied[0].set("n", json!(999));
    assert_eq!(get_stash("it_rows").unwrap()[0].get("n"), Some(&json!(0)));

    // Round-trip: clear the tag, then retrieval raises.
    clear_stash(["it_rows"]).unwrap();
    let err = get_stash("it_rows").unwrap_err();
    assert!(matches!(err, BeholdError::UnknownStash { .. }));
}

#[test]
fn clear_stash_without_names_empties_all_tags() {
    let _serial = serial();
    let mut debug = Behold::new().tag("it_all_a").manual();
    debug.stash(Args::new().field("x", 1)).unwrap();
    let mut debug = Behold::new().tag("it_all_b").manual();
    debug.stash(Args::new().field("x", 2)).unwrap();

    clear_stash::<_, &str>([]).unwrap();
    assert!(get_stash("it_all_a").is_err());
    assert!(get_stash("it_all_b").is_err());
}

#[test]
fn strict_only_binds_to_supplied_subjects() {
    let _serial = serial();
    let mut debug = Behold::new().strict().manual();
    let reading = Reading {
        sensor: "temp",
        value: 21,
    };

    // Missing attribute on an explicit subject raises.
    let err = debug
        .show(Args::new().name("ghost").subject(&reading))
        .unwrap_err();
    assert!(matches!(err, BeholdError::StrictMiss(name) if name == "ghost"));

    // The same request against an ambient scope snapshot does not.
    let sensor = "temp";
    let passed = debug
        .is_true(Args::new().name("ghost").scope(snapshot!(sensor)))
        .unwrap();
    assert!(passed);
}

#[test]
fn value_filters_gate_on_display_text() {
    let _serial = serial();
    let sink = SharedSink::default();
    let mut debug = Behold::new().with_sink(Box::new(sink.clone()));

    let color = "red";
    debug
        .when_values("color", "blue")
        .show(Args::new().scope(snapshot!(color)))
        .unwrap();
    assert_eq!(sink.contents(), "");

    debug
        .when_values("color", "red")
        .show(Args::new().scope(snapshot!(color)))
        .unwrap();
    assert_eq!(sink.contents(), "color: red\n");
}

#[test]
fn viewed_context_and_tag_extend_the_line() {
    let _serial = serial();
    set_context("it_phase", "warmup");
    let sink = SharedSink::default();
    let mut debug = Behold::new()
        .tag("it_probe")
        .with_sink(Box::new(sink.clone()));
    debug
        .view_context("it_phase")
        .show(Args::new().field("step", 1))
        .unwrap();
    assert_eq!(sink.contents(), "step: 1, it_phase: warmup, it_probe\n");
    unset_context(["it_phase"]);
}

#[test]
fn missing_stash_values_come_back_as_null() {
    let _serial = serial();
    clear_stash::<_, &str>([]).unwrap();
    let mut debug = Behold::new().tag("it_nulls").manual();
    debug
        .stash(Args::new().name("ghost").field("present", 1))
        .unwrap();
    let rows = get_stash("it_nulls").unwrap();
    assert_eq!(rows[0].get("ghost"), Some(&Value::Null));
    assert_eq!(rows[0].get("present"), Some(&json!(1)));
    clear_stash(["it_nulls"]).unwrap();
}
