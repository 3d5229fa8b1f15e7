// tests/catalog_workflows.rs

mod common;
use crate::common::init_tracing;

use trialflow::catalog::adam::adam_step_id;
use trialflow::catalog::tfl::tfl_step_id;
use trialflow::catalog::workflows::{analysis_workflow, full_workflow, sce_workflow};
use trialflow::catalog::{builtin, BUILTIN_NAMES, ENVIRONMENT, HARDWARE_TIER, REPORT_OUTPUT};
use trialflow::errors::TrialflowError;
use trialflow::graph::{InputValue, OutputRef};
use trialflow::types::FailurePolicy;

const SDTM: &str = "/mnt/imported/data/snapshots/sdtm-blind/1";

#[test]
fn every_builtin_plans_with_expected_size() {
    init_tracing();

    let expected = [
        ("sdtm", 2),
        ("sce", 3),
        ("adam_tfl", 9),
        ("full", 15),
        ("analysis", 19),
        ("r_plot", 2),
    ];
    assert_eq!(BUILTIN_NAMES.len(), expected.len());

    for (name, steps) in expected {
        let mut workflow = builtin(name, SDTM).unwrap();
        let plan = workflow.plan().unwrap();
        assert_eq!(plan.len(), steps, "workflow '{name}'");
        assert_eq!(workflow.param("sdtm_data_path"), Some(SDTM));
    }
}

#[test]
fn unknown_builtin_is_a_config_error() {
    match builtin("nightly", SDTM) {
        Err(TrialflowError::Config(msg)) => assert!(msg.contains("nightly")),
        Err(other) => panic!("Expected Config error, got: {other:?}"),
        Ok(_) => panic!("Expected Config error, got a workflow"),
    }
}

#[test]
fn plan_order_follows_authoring_order() {
    for name in BUILTIN_NAMES {
        let mut workflow = builtin(name, SDTM).unwrap();
        let authored: Vec<String> = workflow
            .graph()
            .steps()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        let plan = workflow.plan().unwrap();
        assert_eq!(plan.step_ids(), authored, "workflow '{name}'");
    }
}

#[test]
fn failure_policies_match_each_workflow() {
    let policy = |name: &str| builtin(name, SDTM).unwrap().failure_policy();

    assert_eq!(policy("sdtm"), FailurePolicy::FailAfterExecutableNodesComplete);
    assert_eq!(policy("sce"), FailurePolicy::FailAfterExecutableNodesComplete);
    assert_eq!(policy("analysis"), FailurePolicy::FailAfterExecutableNodesComplete);
    assert_eq!(policy("r_plot"), FailurePolicy::FailAfterExecutableNodesComplete);
    assert_eq!(policy("adam_tfl"), FailurePolicy::FailImmediately);
    assert_eq!(policy("full"), FailurePolicy::FailImmediately);
}

#[test]
fn advs_runs_after_adsl_and_adae() {
    let mut workflow = full_workflow(SDTM).unwrap();
    let plan = workflow.plan().unwrap();

    let advs = plan.step(&adam_step_id("ADVS")).unwrap();
    assert_eq!(
        advs.inputs["adsl"],
        InputValue::Output(OutputRef::new(adam_step_id("ADSL"), "adsl"))
    );
    assert_eq!(
        advs.inputs["adae"],
        InputValue::Output(OutputRef::new(adam_step_id("ADAE"), "adae"))
    );
    assert_eq!(
        advs.inputs["sdtm_data_path"],
        InputValue::Literal(SDTM.to_string())
    );

    let at = plan.position(&advs.id).unwrap();
    assert!(plan.position(&adam_step_id("ADSL")).unwrap() < at);
    assert!(plan.position(&adam_step_id("ADAE")).unwrap() < at);
}

#[test]
fn vital_signs_table_has_its_own_script() {
    let mut workflow = builtin("adam_tfl", SDTM).unwrap();
    let plan = workflow.plan().unwrap();

    let ae_rel = plan.step(&tfl_step_id("T_AE_REL")).unwrap();
    let vscat = plan.step(&tfl_step_id("T_VSCAT")).unwrap();

    assert_eq!(ae_rel.command, "sas -stdio prod/tfl/t_ae_rel.sas");
    assert_eq!(vscat.command, "sas -stdio prod/tfl/t_vscat.sas");
    assert!(vscat.inputs.contains_key("advs"));
}

#[test]
fn full_workflow_exposes_every_report_but_population() {
    let workflow = full_workflow(SDTM).unwrap();
    let outputs = workflow.outputs();

    assert_eq!(outputs.len(), 8);
    assert!(!outputs.contains_key("t_pop"));
    assert_eq!(
        outputs["t_saf"],
        OutputRef::new(tfl_step_id("T_SAF"), REPORT_OUTPUT)
    );
}

#[test]
fn merge_step_comes_last_and_reads_every_report() {
    let mut workflow = analysis_workflow(SDTM).unwrap();
    let plan = workflow.plan().unwrap();

    let levels = plan.levels();
    assert_eq!(levels.last().unwrap(), &vec!["Merge TFL PDFs"]);
    assert_eq!(levels[0], vec![adam_step_id("ADSL")]);

    let merge = plan.step("Merge TFL PDFs").unwrap();
    assert_eq!(merge.inputs.len(), 9);
    assert!(merge.outputs.is_empty());
    assert_eq!(plan.upstream_of("Merge TFL PDFs").len(), 9);
}

#[test]
fn analysis_steps_carry_platform_metadata() {
    let mut workflow = analysis_workflow(SDTM).unwrap();
    let plan = workflow.plan().unwrap();

    let adsl = plan.step(&adam_step_id("ADSL")).unwrap();
    assert_eq!(adsl.metadata[ENVIRONMENT], "SAS Analytics Pro");
    assert_eq!(adsl.metadata[HARDWARE_TIER], "Medium - [AWS US]");

    let t_pop = plan.step(&tfl_step_id("T_POP")).unwrap();
    assert_eq!(t_pop.metadata[HARDWARE_TIER], "Small - [AWS US]");

    let plot = plan.step("AE Analysis Plot in ggplot and R").unwrap();
    assert_eq!(plot.metadata[ENVIRONMENT], "GxP Validated R & Py");
    assert_eq!(
        plot.inputs["adae"],
        InputValue::Output(OutputRef::new(adam_step_id("ADAE"), "adae"))
    );
}

#[test]
fn sce_python_step_consumes_population_report() {
    let mut workflow = sce_workflow(SDTM).unwrap();
    let plan = workflow.plan().unwrap();

    assert_eq!(
        plan.step_ids(),
        vec!["Create ADSL dataset", "Create T_POP report", "Python task"]
    );
    let python = plan.step("Python task").unwrap();
    assert_eq!(python.command, "utilities/combine_tfl.py");
    assert_eq!(
        python.inputs["t_pop"],
        InputValue::Output(OutputRef::new("Create T_POP report", REPORT_OUTPUT))
    );
}

#[test]
fn each_call_builds_an_independent_workflow() {
    let mut first = builtin("sdtm", SDTM).unwrap();
    first.plan().unwrap();
    let second = builtin("sdtm", "/mnt/other").unwrap();

    assert!(matches!(
        second.state(),
        trialflow::graph::GraphState::Open
    ));
    assert_eq!(second.param("sdtm_data_path"), Some("/mnt/other"));
}
