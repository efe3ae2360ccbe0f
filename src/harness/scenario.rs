//! Per-fixture orchestration: Compile → Load → Register → check.

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use crate::runtime::{DefinitionError, Runtime, Value};

use super::compiler::ArtifactCompiler;
use super::loader::load_artifact;
use super::registrar::{DefinitionFacility, HiddenClassRegistrar};
use super::HarnessConfig;

/// The three source variants the harness drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureVariant {
    /// A plain class: registration succeeds, instantiation and invocation
    /// work through the handle.
    Valid,
    /// Declares a field whose type is the class itself.
    SelfReferencingField,
    /// Declares a method whose signature references the class itself.
    SelfReferencingMethod,
}

impl FixtureVariant {
    /// Whether registration of this variant is expected to fail.
    pub fn expects_failure(self) -> bool {
        !matches!(self, FixtureVariant::Valid)
    }
}

/// One fixture: a source file on disk, the class it declares, and what the
/// harness expects of it.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub class_name: &'static str,
    pub source_file: &'static str,
    pub variant: FixtureVariant,
}

/// The fixture set, driven in order. Each entry's source file stem matches
/// its declared class name, which is also the artifact's file stem.
pub const FIXTURES: [Fixture; 3] = [
    Fixture {
        class_name: "NonFindable",
        source_file: "NonFindable.vc",
        variant: FixtureVariant::Valid,
    },
    Fixture {
        class_name: "NonFindableField",
        source_file: "NonFindableField.vc",
        variant: FixtureVariant::SelfReferencingField,
    },
    Fixture {
        class_name: "NonFindableMethod",
        source_file: "NonFindableMethod.vc",
        variant: FixtureVariant::SelfReferencingMethod,
    },
];

/// Terminal outcome of one fixture's scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioOutcome {
    /// Registration succeeded and the invocation returned this value.
    Success { result: Value },
    /// Registration failed exactly the way the fixture expects.
    ExpectedFailure { detail: String },
    /// An expected-to-fail registration succeeded.
    UnexpectedSuccess,
    /// Anything else that deviates from the expectation.
    UnexpectedFailure { detail: String },
}

impl ScenarioOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(
            self,
            ScenarioOutcome::Success { .. } | ScenarioOutcome::ExpectedFailure { .. }
        )
    }
}

/// One fixture's report.
#[derive(Debug)]
pub struct ScenarioReport {
    pub fixture: &'static str,
    pub outcome: ScenarioOutcome,
    pub duration: Duration,
}

/// Aggregate result of a full harness run.
#[derive(Debug)]
pub struct HarnessSummary {
    pub reports: Vec<ScenarioReport>,
    pub duration: Duration,
}

impl HarnessSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    /// True iff every fixture produced its expected outcome.
    pub fn is_pass(&self) -> bool {
        self.failed() == 0
    }
}

/// Drives every fixture through the pipeline, sequentially, each against a
/// fresh facility so no state leaks between scenarios.
pub struct ScenarioRunner<F: DefinitionFacility + Default = Runtime> {
    config: HarnessConfig,
    verbose: bool,
    _facility: PhantomData<F>,
}

impl<F: DefinitionFacility + Default> ScenarioRunner<F> {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            verbose: false,
            _facility: PhantomData,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run all fixtures and report per-fixture and aggregate results. A
    /// failure in one fixture never prevents the remaining fixtures from
    /// being attempted.
    pub fn run(&self) -> HarnessSummary {
        let start = Instant::now();
        let mut reports = Vec::with_capacity(FIXTURES.len());

        for fixture in &FIXTURES {
            let scenario_start = Instant::now();
            let outcome = self.run_scenario(fixture);
            let report = ScenarioReport {
                fixture: fixture.class_name,
                outcome,
                duration: scenario_start.elapsed(),
            };
            print_report(&report, self.verbose);
            reports.push(report);
        }

        let summary = HarnessSummary {
            reports,
            duration: start.elapsed(),
        };
        print_summary(&summary);
        summary
    }

    /// One fixture, end to end. Every deviation is folded into the outcome;
    /// nothing propagates past the scenario.
    #[tracing::instrument(skip_all, fields(fixture = fixture.class_name))]
    fn run_scenario(&self, fixture: &Fixture) -> ScenarioOutcome {
        let source = self.config.src_dir.join(fixture.source_file);
        let compiler = ArtifactCompiler::new(&self.config);
        if let Err(e) = compiler.compile(&source, &self.config.out_dir) {
            return ScenarioOutcome::UnexpectedFailure {
                detail: format!("build failed: {}", e),
            };
        }

        let artifact = self
            .config
            .out_dir
            .join(format!("{}.{}", fixture.class_name, veil_format::ARTIFACT_EXTENSION));
        let bytes = match load_artifact(&artifact) {
            Ok(bytes) => bytes,
            Err(e) => {
                return ScenarioOutcome::UnexpectedFailure {
                    detail: format!("artifact unreadable: {}", e),
                }
            }
        };

        // The one registration attempt for this fixture; `bytes` is dropped
        // with this scope, whatever the result.
        let mut registrar = HiddenClassRegistrar::new(F::default());
        let result = registrar.register(&bytes);
        self.check_expectation(fixture, result)
    }

    fn check_expectation(
        &self,
        fixture: &Fixture,
        result: Result<crate::runtime::RegisteredType, DefinitionError>,
    ) -> ScenarioOutcome {
        match (fixture.variant.expects_failure(), result) {
            (false, Ok(handle)) => {
                let instance = handle.instantiate();
                match instance.invoke("test") {
                    Ok(result) => ScenarioOutcome::Success { result },
                    Err(e) => ScenarioOutcome::UnexpectedFailure {
                        detail: format!("invocation failed: {}", e),
                    },
                }
            }
            (false, Err(e)) => ScenarioOutcome::UnexpectedFailure {
                detail: format!("expected registration to succeed, got: {}", e),
            },
            (true, Ok(_)) => ScenarioOutcome::UnexpectedSuccess,
            (true, Err(e @ DefinitionError::NameResolution { .. })) => {
                let detail = e.to_string();
                if detail.contains(fixture.class_name) {
                    ScenarioOutcome::ExpectedFailure { detail }
                } else {
                    ScenarioOutcome::UnexpectedFailure {
                        detail: format!(
                            "name-resolution error does not mention '{}': {}",
                            fixture.class_name, detail
                        ),
                    }
                }
            }
            (true, Err(e)) => ScenarioOutcome::UnexpectedFailure {
                detail: format!("expected a name-resolution error, got: {}", e),
            },
        }
    }
}

fn print_report(report: &ScenarioReport, verbose: bool) {
    let status = if report.outcome.is_pass() {
        "\x1b[32mPASSED\x1b[0m".to_string()
    } else {
        "\x1b[31mFAILED\x1b[0m".to_string()
    };
    if verbose {
        println!(
            "{} {} ({:.0}ms)",
            report.fixture,
            status,
            report.duration.as_millis()
        );
    } else {
        println!("{} {}", report.fixture, status);
    }
    match &report.outcome {
        ScenarioOutcome::UnexpectedFailure { detail } => {
            println!("    {}", detail);
        }
        ScenarioOutcome::UnexpectedSuccess => {
            println!("    registration succeeded but was expected to fail");
        }
        ScenarioOutcome::ExpectedFailure { detail } if verbose => {
            println!("    failed as expected: {}", detail);
        }
        ScenarioOutcome::Success { result } if verbose => {
            println!("    test() returned {}", result);
        }
        _ => {}
    }
}

fn print_summary(summary: &HarnessSummary) {
    let color = if summary.is_pass() {
        "\x1b[1;32m"
    } else {
        "\x1b[1;31m"
    };
    let mut parts = Vec::new();
    if summary.passed() > 0 {
        parts.push(format!("{} passed", summary.passed()));
    }
    if summary.failed() > 0 {
        parts.push(format!("{} failed", summary.failed()));
    }
    println!(
        "{}=================== {} in {:.2}s ===================\x1b[0m",
        color,
        parts.join(", "),
        summary.duration.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{DefineOptions, RegisteredType, Runtime};

    /// A facility that defines every class as a findable type so hidden
    /// self-references "succeed" — the runner must flag that.
    #[derive(Default)]
    struct AlwaysFindable {
        runtime: Runtime,
    }

    impl DefinitionFacility for AlwaysFindable {
        fn define(
            &mut self,
            bytes: &[u8],
            _options: DefineOptions,
        ) -> Result<RegisteredType, DefinitionError> {
            self.runtime.define(bytes, DefineOptions::FINDABLE)
        }
    }

    /// A facility whose diagnostics omit the unresolved name's context.
    #[derive(Default)]
    struct WrongName;

    impl DefinitionFacility for WrongName {
        fn define(
            &mut self,
            _bytes: &[u8],
            _options: DefineOptions,
        ) -> Result<RegisteredType, DefinitionError> {
            Err(DefinitionError::NameResolution {
                name: "SomethingElse".to_string(),
            })
        }
    }

    fn runner_with<F: DefinitionFacility + Default>() -> ScenarioRunner<F> {
        ScenarioRunner::new(HarnessConfig::new("unused", "unused"))
    }

    fn failing_fixture() -> Fixture {
        FIXTURES[1]
    }

    #[test]
    fn unexpected_success_when_expected_failure_registers() {
        let runner = runner_with::<AlwaysFindable>();
        let mut facility = AlwaysFindable::default();
        let bytes = crate::compiler::compile_source(
            "class NonFindableField\nfield next: NonFindableField\n",
        )
        .unwrap()
        .encode()
        .unwrap();
        let result = facility.define(&bytes, DefineOptions::HIDDEN_NESTMATE);
        let outcome = runner.check_expectation(&failing_fixture(), result);
        assert_eq!(outcome, ScenarioOutcome::UnexpectedSuccess);
    }

    #[test]
    fn wrong_name_in_diagnostic_is_unexpected() {
        let runner = runner_with::<WrongName>();
        let result = WrongName.define(b"", DefineOptions::HIDDEN_NESTMATE);
        let outcome = runner.check_expectation(&failing_fixture(), result);
        assert!(matches!(
            outcome,
            ScenarioOutcome::UnexpectedFailure { ref detail }
                if detail.contains("NonFindableField")
        ));
    }

    #[test]
    fn malformed_bytes_are_not_an_expected_failure() {
        let runner = runner_with::<Runtime>();
        let result = Runtime::new().define(b"garbage", DefineOptions::HIDDEN_NESTMATE);
        let outcome = runner.check_expectation(&failing_fixture(), result);
        assert!(matches!(
            outcome,
            ScenarioOutcome::UnexpectedFailure { ref detail }
                if detail.contains("expected a name-resolution error")
        ));
    }

    #[test]
    fn valid_fixture_success_carries_invocation_result() {
        let runner = runner_with::<Runtime>();
        let bytes = crate::compiler::compile_source(
            "class NonFindable\n\nmethod test() -> Int:\n    return 42\n",
        )
        .unwrap()
        .encode()
        .unwrap();
        let result = Runtime::new().define(&bytes, DefineOptions::HIDDEN_NESTMATE);
        let outcome = runner.check_expectation(&FIXTURES[0], result);
        assert_eq!(
            outcome,
            ScenarioOutcome::Success {
                result: Value::Int(42)
            }
        );
    }

    #[test]
    fn registration_failure_of_valid_fixture_is_unexpected() {
        let runner = runner_with::<Runtime>();
        let result = Runtime::new().define(b"garbage", DefineOptions::HIDDEN_NESTMATE);
        let outcome = runner.check_expectation(&FIXTURES[0], result);
        assert!(matches!(outcome, ScenarioOutcome::UnexpectedFailure { .. }));
    }
}
