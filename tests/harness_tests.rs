//! End-to-end harness tests: real veilc process, real artifacts, real
//! runtime facility.

use std::fs;
use std::path::{Path, PathBuf};

use classveil::harness::{HarnessConfig, ScenarioOutcome, ScenarioRunner, FIXTURES};
use classveil::runtime::{Runtime, Value};

fn veilc() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_veilc"))
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/nonfindable")
}

fn temp_out_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("classveil_{}_{}", tag, std::process::id()))
}

#[test]
fn full_harness_passes_over_shipped_fixtures() {
    let out_dir = temp_out_dir("full_run");
    let _ = fs::remove_dir_all(&out_dir);

    let config = HarnessConfig::new(fixtures_dir(), &out_dir).with_compiler(veilc());
    let summary = ScenarioRunner::<Runtime>::new(config).run();

    assert!(summary.is_pass(), "reports: {:?}", summary.reports);
    assert_eq!(summary.reports.len(), FIXTURES.len());

    assert_eq!(
        summary.reports[0].outcome,
        ScenarioOutcome::Success {
            result: Value::Int(42)
        }
    );
    for report in &summary.reports[1..] {
        match &report.outcome {
            ScenarioOutcome::ExpectedFailure { detail } => {
                assert!(
                    detail.contains(report.fixture),
                    "diagnostic for {} should name the class: {}",
                    report.fixture,
                    detail
                );
            }
            other => panic!("{} should fail as expected, got {:?}", report.fixture, other),
        }
    }

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn rerunning_the_harness_is_idempotent() {
    let out_dir = temp_out_dir("idempotent");
    let _ = fs::remove_dir_all(&out_dir);

    let config = HarnessConfig::new(fixtures_dir(), &out_dir).with_compiler(veilc());
    let runner = ScenarioRunner::<Runtime>::new(config);

    let first = runner.run();
    let second = runner.run();
    let outcomes = |s: &classveil::harness::HarnessSummary| {
        s.reports.iter().map(|r| r.outcome.clone()).collect::<Vec<_>>()
    };
    assert_eq!(outcomes(&first), outcomes(&second));

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn a_failing_fixture_does_not_stop_the_rest() {
    // Only the self-referencing fixtures exist here: the Valid fixture's
    // source is missing, so its build fails, but the others still run.
    let src_dir = temp_out_dir("isolation_src");
    let _ = fs::remove_dir_all(&src_dir);
    fs::create_dir_all(&src_dir).unwrap();
    for name in ["NonFindableField.vc", "NonFindableMethod.vc"] {
        fs::copy(fixtures_dir().join(name), src_dir.join(name)).unwrap();
    }

    let out_dir = temp_out_dir("isolation_out");
    let _ = fs::remove_dir_all(&out_dir);

    let config = HarnessConfig::new(&src_dir, &out_dir).with_compiler(veilc());
    let summary = ScenarioRunner::<Runtime>::new(config).run();

    assert_eq!(summary.reports.len(), FIXTURES.len());
    assert!(matches!(
        summary.reports[0].outcome,
        ScenarioOutcome::UnexpectedFailure { ref detail } if detail.contains("build failed")
    ));
    assert!(summary.reports[1].outcome.is_pass());
    assert!(summary.reports[2].outcome.is_pass());
    assert!(!summary.is_pass());

    let _ = fs::remove_dir_all(&src_dir);
    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn veilc_exits_nonzero_on_a_broken_source() {
    let src_dir = temp_out_dir("broken_src");
    let _ = fs::remove_dir_all(&src_dir);
    fs::create_dir_all(&src_dir).unwrap();
    let broken = src_dir.join("Broken.vc");
    fs::write(&broken, "field x: Int\n").unwrap();

    let status = std::process::Command::new(veilc())
        .arg("-d")
        .arg(&src_dir)
        .arg(&broken)
        .status()
        .unwrap();
    assert!(!status.success());

    let _ = fs::remove_dir_all(&src_dir);
}

#[test]
fn veilc_is_deterministic() {
    let out_a = temp_out_dir("det_a");
    let out_b = temp_out_dir("det_b");
    for dir in [&out_a, &out_b] {
        let _ = fs::remove_dir_all(dir);
    }

    let source = fixtures_dir().join("NonFindable.vc");
    for dir in [&out_a, &out_b] {
        let status = std::process::Command::new(veilc())
            .arg("-d")
            .arg(dir)
            .arg(&source)
            .status()
            .unwrap();
        assert!(status.success());
    }

    let a = fs::read(out_a.join("NonFindable.vclass")).unwrap();
    let b = fs::read(out_b.join("NonFindable.vclass")).unwrap();
    assert_eq!(a, b);

    let _ = fs::remove_dir_all(&out_a);
    let _ = fs::remove_dir_all(&out_b);
}

#[test]
fn classveil_run_exits_zero_on_the_shipped_fixtures() {
    let out_dir = temp_out_dir("cli_run");
    let _ = fs::remove_dir_all(&out_dir);

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_classveil"))
        .arg("run")
        .arg("--fixtures")
        .arg(fixtures_dir())
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--compiler")
        .arg(veilc())
        .status()
        .unwrap();
    assert!(status.success());

    let _ = fs::remove_dir_all(&out_dir);
}
