// End-to-end profiler scenarios: real exporters, files on disk, several threads.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use profiler_core::{
    BasicEntryFactory, CsvExporter, Entry, JsonlExporter, Profiler, ProfilerConfig,
    ProfilerError, RecordingDiagnostics, ThreadEntryFactory, Timestamp, THREADED_HEADER,
};

use test_helpers::{CsvFixture, HEADER};

// ========== Single timer ==========

#[test]
fn test_load_scenario_exports_one_row() -> Result<()> {
    for async_export in [false, true] {
        let fx = CsvFixture::new(async_export)?;
        fx.clock.set(100);
        fx.profiler.start("load");
        fx.clock.set(150);
        fx.profiler.end("load");

        fx.profiler.export();
        fx.profiler.shutdown();

        assert_eq!(fx.read()?, format!("{HEADER}\nload,100,150,50\n"));
    }
    Ok(())
}

#[test]
fn test_end_without_start_leaves_others_alone() -> Result<()> {
    let fx = CsvFixture::new(false)?;
    fx.clock.set(10);
    fx.profiler.start("kept");
    fx.profiler.end("missing");
    fx.clock.set(30);
    fx.profiler.end("kept");

    assert_eq!(fx.diag.warnings().len(), 1);
    let entries = fx.profiler.entries();
    assert_eq!(entries, vec![Entry::basic("kept", Timestamp(10), Timestamp(30))]);
    Ok(())
}

// ========== Export consistency ==========

#[test]
fn test_reexport_is_byte_identical() -> Result<()> {
    let fx = CsvFixture::new(false)?;
    for (i, name) in ["parse", "plan", "execute"].iter().enumerate() {
        fx.clock.set(i as i64 * 10);
        fx.profiler.start(name);
        fx.clock.advance(3);
        fx.profiler.end(name);
    }

    fx.profiler.export();
    let first = fx.read()?;
    fx.profiler.export();
    let second = fx.read()?;

    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 4);
    Ok(())
}

#[test]
fn test_empty_export_writes_header_only() -> Result<()> {
    let fx = CsvFixture::new(false)?;
    fx.profiler.export();
    assert_eq!(fx.read()?, format!("{HEADER}\n"));
    Ok(())
}

#[test]
fn test_failed_export_can_be_retried() -> Result<()> {
    let fx = CsvFixture::new(false)?;
    fx.profiler.time("step", || ());

    // Occupy the parent path with a file so the directory cannot be created.
    let out_dir = fx.path.parent().expect("path has a parent");
    std::fs::write(out_dir, b"not a directory")?;
    fx.profiler.export();
    assert_eq!(fx.diag.errors().len(), 1);
    assert_eq!(fx.profiler.len(), 1);

    std::fs::remove_file(out_dir)?;
    fx.profiler.export();
    assert_eq!(fx.read()?, format!("{HEADER}\nstep,0,0,0\n"));
    Ok(())
}

#[test]
fn test_async_exports_are_ordered() -> Result<()> {
    let fx = CsvFixture::new(true)?;
    for i in 0..20 {
        let name = format!("t{i}");
        fx.profiler.start(&name);
        fx.clock.advance(1);
        fx.profiler.end(&name);
        fx.profiler.export();
    }
    fx.profiler.shutdown();

    // The last queued export holds every entry and is written last.
    let contents = fx.read()?;
    assert_eq!(contents.lines().count(), 21);
    assert!(contents.ends_with("t19,19,20,1\n"));
    Ok(())
}

// ========== Concurrency ==========

#[test]
fn test_concurrent_same_name() -> Result<()> {
    let fx = CsvFixture::with(|config| {
        config.async_export = false;
        config.clock = Arc::new(profiler_core::SystemClock);
    })?;
    let threads = 8;
    let rounds = 500;

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                for _ in 0..rounds {
                    fx.profiler.start("x");
                    fx.profiler.end("x");
                }
            });
        }
    });

    let entries = fx.profiler.entries();
    // Each end either consumed some open timer or warned.
    assert_eq!(entries.len() + fx.diag.warnings().len(), threads * rounds);
    assert!(!entries.is_empty());
    for entry in &entries {
        assert_eq!(entry.name(), "x");
        assert!(entry.duration() >= 0, "garbage duration: {entry:?}");
    }
    assert!(!fx.profiler.is_running("x"));
    Ok(())
}

#[test]
fn test_concurrent_distinct_names_with_exports() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("threads.csv");
    let profiler = Profiler::new(ProfilerConfig {
        factory: Some(Arc::new(ThreadEntryFactory)),
        exporter: Some(Arc::new(CsvExporter::new(&path))),
        diagnostics: Arc::new(RecordingDiagnostics::new()),
        ..Default::default()
    })?;

    thread::scope(|scope| {
        for t in 0..4 {
            let profiler = &profiler;
            scope.spawn(move || {
                for i in 0..100 {
                    let name = format!("worker{t}.{i}");
                    profiler.start(&name);
                    profiler.end(&name);
                    if i % 25 == 0 {
                        profiler.export();
                    }
                }
            });
        }
    });
    profiler.export();
    profiler.shutdown();

    let entries = profiler.entries();
    assert_eq!(entries.len(), 400);
    let threads: HashSet<u64> = entries
        .iter()
        .map(|e| match e {
            Entry::Threaded { thread_id, .. } => *thread_id,
            other => panic!("unexpected entry {other:?}"),
        })
        .collect();
    assert_eq!(threads.len(), 4);

    let contents = std::fs::read_to_string(&path)?;
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some(THREADED_HEADER.join(",").as_str()));
    assert_eq!(lines.filter(|line| line.split(',').count() == 5).count(), 400);
    Ok(())
}

// ========== Construction ==========

#[test]
fn test_no_exporter_fails_construction() {
    let result = Profiler::new(ProfilerConfig {
        factory: Some(Arc::new(BasicEntryFactory)),
        exporter: None,
        ..Default::default()
    });
    match result {
        Err(ProfilerError::MissingExporter) => {}
        other => panic!("expected missing exporter error, got {other:?}"),
    }
}

#[test]
fn test_jsonl_profiler() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("profile.jsonl");
    let profiler = Profiler::new(ProfilerConfig {
        factory: Some(Arc::new(BasicEntryFactory)),
        exporter: Some(Arc::new(JsonlExporter::new(&path))),
        async_export: false,
        ..Default::default()
    })?;

    {
        let _guard = profiler.guard("scoped");
    }
    profiler.export();

    let contents = std::fs::read_to_string(&path)?;
    let value: serde_json::Value = serde_json::from_str(contents.trim_end())?;
    assert_eq!(value["name"], "scoped");
    assert_eq!(value["kind"], "basic");
    Ok(())
}
