// tests/config_loading.rs

mod common;
use crate::common::builders::WorkflowTomlBuilder;
use crate::common::init_tracing;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use trialflow::config::{load_and_validate, parse_str, InputConfig, WorkflowFile};
use trialflow::errors::TrialflowError;
use trialflow::graph::{GraphState, InputValue};
use trialflow::types::FailurePolicy;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn load(contents: &str) -> Result<WorkflowFile, TrialflowError> {
    let file = write_temp(contents);
    load_and_validate(file.path(), &BTreeMap::new())
}

fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const ADSL_STEP: &str = r#"[[step]]
name = "ADSL"
command = "prod/adam/adsl.sas"
outputs = ["adsl"]
inputs.sdtm_data_path = { param = "sdtm_data_path" }
inputs.title = "Subject level"
"#;

#[test]
fn loads_a_chain_and_plans_it() {
    init_tracing();

    let toml = WorkflowTomlBuilder::new("chain")
        .failure_policy("fail_after_executable_nodes_complete")
        .step("A", &[])
        .step("B", &["A"])
        .step("C", &["A", "B"])
        .output("final", "C")
        .build();

    let file = load(&toml).unwrap();

    assert_eq!(file.workflow.name(), "chain");
    assert_eq!(
        file.workflow.failure_policy(),
        FailurePolicy::FailAfterExecutableNodesComplete
    );
    assert_eq!(file.plan.step_ids(), vec!["A", "B", "C"]);
    assert_eq!(file.workflow.state(), GraphState::Frozen);
    assert_eq!(file.workflow.outputs()["final"].step, "C");
}

#[test]
fn failure_policy_defaults_to_fail_immediately() {
    let toml = WorkflowTomlBuilder::new("plain").step("A", &[]).build();
    let file = load(&toml).unwrap();
    assert_eq!(file.workflow.failure_policy(), FailurePolicy::FailImmediately);
}

#[test]
fn params_bind_literal_inputs_and_can_be_overridden() {
    let toml = WorkflowTomlBuilder::new("params")
        .param("sdtm_data_path", "/mnt/sdtm-blind/1")
        .raw_step(ADSL_STEP)
        .build();

    let file = load(&toml).unwrap();
    let step = file.plan.step("ADSL").unwrap();
    assert_eq!(
        step.inputs["sdtm_data_path"],
        InputValue::Literal("/mnt/sdtm-blind/1".to_string())
    );
    assert_eq!(
        step.inputs["title"],
        InputValue::Literal("Subject level".to_string())
    );

    let temp = write_temp(&toml);
    let file = load_and_validate(
        temp.path(),
        &overrides(&[("sdtm_data_path", "/mnt/sdtm-unblind/1")]),
    )
    .unwrap();
    let step = file.plan.step("ADSL").unwrap();
    assert_eq!(
        step.inputs["sdtm_data_path"],
        InputValue::Literal("/mnt/sdtm-unblind/1".to_string())
    );
    assert_eq!(file.workflow.param("sdtm_data_path"), Some("/mnt/sdtm-unblind/1"));
}

#[test]
fn override_of_undeclared_param_is_rejected() {
    let toml = WorkflowTomlBuilder::new("params")
        .param("sdtm_data_path", "/mnt/sdtm-blind/1")
        .raw_step(ADSL_STEP)
        .build();
    let temp = write_temp(&toml);

    match load_and_validate(temp.path(), &overrides(&[("study", "X")])) {
        Err(TrialflowError::Config(msg)) => assert!(msg.contains("study")),
        other => panic!("Expected Config error, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn required_param_without_default_is_supplied_by_override() {
    let toml = WorkflowTomlBuilder::new("required").raw_step(ADSL_STEP).build();
    let temp = write_temp(&toml);

    let file = load_and_validate(
        temp.path(),
        &overrides(&[("sdtm_data_path", "/mnt/sdtm-unblind/2")]),
    )
    .unwrap();

    let step = file.plan.step("ADSL").unwrap();
    assert_eq!(
        step.inputs["sdtm_data_path"],
        InputValue::Literal("/mnt/sdtm-unblind/2".to_string())
    );
    assert_eq!(file.workflow.param("sdtm_data_path"), Some("/mnt/sdtm-unblind/2"));
}

#[test]
fn input_naming_undeclared_param_is_rejected() {
    let toml = WorkflowTomlBuilder::new("params").raw_step(ADSL_STEP).build();

    match load(&toml) {
        Err(TrialflowError::Config(msg)) => assert!(msg.contains("sdtm_data_path")),
        other => panic!("Expected Config error, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn steps_may_appear_in_any_order() {
    let top_down = WorkflowTomlBuilder::new("ordered")
        .step("A", &[])
        .step("B", &["A"])
        .step("C", &["B"])
        .build();
    let bottom_up = WorkflowTomlBuilder::new("ordered")
        .step("C", &["B"])
        .step("B", &["A"])
        .step("A", &[])
        .build();

    let top_down = load(&top_down).unwrap();
    let bottom_up = load(&bottom_up).unwrap();

    assert_eq!(top_down.plan.step_ids(), bottom_up.plan.step_ids());
}

#[test]
fn cyclic_file_is_rejected() {
    let toml = WorkflowTomlBuilder::new("loop")
        .step("A", &["B"])
        .step("B", &["A"])
        .build();

    match load(&toml) {
        Err(TrialflowError::CycleDetected { steps }) => assert_eq!(steps, vec!["A", "B"]),
        other => panic!("Expected CycleDetected, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn reference_to_unknown_step_is_rejected() {
    let toml = WorkflowTomlBuilder::new("dangling")
        .step("A", &["ghost"])
        .build();

    match load(&toml) {
        Err(TrialflowError::UnresolvedReference { step, referenced }) => {
            assert_eq!(step, "A");
            assert_eq!(referenced, "ghost");
        }
        other => panic!("Expected UnresolvedReference, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn reference_to_undeclared_output_is_rejected() {
    let toml = WorkflowTomlBuilder::new("bad_output")
        .step("A", &[])
        .raw_step(
            r#"[[step]]
name = "B"
command = "run B"
inputs.x = { step = "A", output = "nope" }
"#,
        )
        .build();

    match load(&toml) {
        Err(TrialflowError::MissingOutput {
            step,
            referenced,
            output,
        }) => {
            assert_eq!(step, "B");
            assert_eq!(referenced, "A");
            assert_eq!(output, "nope");
        }
        other => panic!("Expected MissingOutput, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn workflow_output_must_name_a_declared_output() {
    let toml = WorkflowTomlBuilder::new("exposed")
        .step("A", &[])
        .build()
        + "\n[outputs]\nreport = { step = \"A\", output = \"report\" }\n";

    match load(&toml) {
        Err(TrialflowError::MissingOutput {
            step,
            referenced,
            output,
        }) => {
            assert_eq!(step, "exposed");
            assert_eq!(referenced, "A");
            assert_eq!(output, "report");
        }
        other => panic!("Expected MissingOutput, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn duplicate_step_names_are_rejected() {
    let toml = WorkflowTomlBuilder::new("dupes")
        .step("A", &[])
        .step("A", &[])
        .build();

    match load(&toml) {
        Err(TrialflowError::DuplicateStep { step }) => assert_eq!(step, "A"),
        other => panic!("Expected DuplicateStep, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn duplicate_output_names_within_a_step_are_rejected() {
    let toml = WorkflowTomlBuilder::new("dupe_outputs")
        .raw_step("[[step]]\nname = \"A\"\ncommand = \"a\"\noutputs = [\"x\", \"x\"]\n")
        .build();

    assert!(matches!(load(&toml), Err(TrialflowError::Config(_))));
}

#[test]
fn file_without_steps_is_rejected() {
    let toml = WorkflowTomlBuilder::new("empty").build();
    assert!(matches!(load(&toml), Err(TrialflowError::Config(_))));
}

#[test]
fn blank_workflow_name_is_rejected() {
    let toml = WorkflowTomlBuilder::new("   ").step("A", &[]).build();

    match load(&toml) {
        Err(TrialflowError::Config(msg)) => assert!(msg.contains("name")),
        other => panic!("Expected Config error, got: {:?}", other.map(|f| f.plan)),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        load("[workflow\nname = \"broken\""),
        Err(TrialflowError::Toml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        load_and_validate(&path, &BTreeMap::new()),
        Err(TrialflowError::Io(_))
    ));
}

#[test]
fn step_metadata_overrides_defaults_key_by_key() {
    let toml = r#"
[workflow]
name = "meta"

[defaults.metadata]
environment = "SAS Analytics Pro"
hardware_tier = "Small"

[[step]]
name = "A"
command = "a.sas"
outputs = ["out"]

[[step]]
name = "B"
command = "b.py"
inputs.a = { step = "A", output = "out" }
metadata = { environment = "GxP Validated R & Py" }
"#;

    let file = load(toml).unwrap();
    let a = file.plan.step("A").unwrap();
    let b = file.plan.step("B").unwrap();

    assert_eq!(a.metadata["environment"], "SAS Analytics Pro");
    assert_eq!(b.metadata["environment"], "GxP Validated R & Py");
    assert_eq!(b.metadata["hardware_tier"], "Small");
}

#[test]
fn all_input_forms_parse() {
    let raw = parse_str(
        r#"
[workflow]
name = "forms"

[[step]]
name = "A"
command = "a"
inputs.plain = "x"
inputs.boxed = { value = "y" }
inputs.bound = { param = "p" }
inputs.wired = { step = "S", output = "o" }
"#,
    )
    .unwrap();

    let inputs = &raw.steps[0].inputs;
    assert_eq!(inputs["plain"], InputConfig::Literal("x".to_string()));
    assert_eq!(
        inputs["boxed"],
        InputConfig::Value {
            value: "y".to_string()
        }
    );
    assert_eq!(
        inputs["bound"],
        InputConfig::Param {
            param: "p".to_string()
        }
    );
    assert_eq!(
        inputs["wired"],
        InputConfig::Output {
            step: "S".to_string(),
            output: "o".to_string()
        }
    );
}

#[test]
fn shipped_demo_workflow_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/sce_workflow.toml");
    let file = load_and_validate(&path, &BTreeMap::new()).unwrap();

    assert_eq!(file.workflow.name(), "sce_workflow");
    assert_eq!(
        file.plan.step_ids(),
        vec!["Create ADSL dataset", "Create T_POP report", "Python task"]
    );
    let python = file.plan.step("Python task").unwrap();
    assert_eq!(python.metadata["environment"], "GxP Validated R & Py");
    assert_eq!(python.metadata["hardware_tier"], "Small");
}
