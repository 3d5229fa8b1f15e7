// src/catalog/workflows.rs

//! Factory functions for the shipped workflows.
//!
//! All of them share the same ADaM derivation chain and report table; they
//! differ in which steps they include, the hardware tiers they request and
//! their failure policy.

use std::collections::BTreeMap;

use crate::catalog::adam::{adam_dataset, AdamDataset, AdamStep};
use crate::catalog::tfl::{tfl_report, TflStep};
use crate::catalog::{ENVIRONMENT, HARDWARE_TIER, R_PY_ENVIRONMENT, SAS_ENVIRONMENT};
use crate::errors::{Result, TrialflowError};
use crate::graph::{OutputRef, StepSpec};
use crate::types::FailurePolicy;
use crate::workflow::Workflow;

const SMALL: &str = "Small";
const SMALL_AWS: &str = "Small - [AWS US]";
const MEDIUM_AWS: &str = "Medium - [AWS US]";

/// Report tables and the ADaM datasets each one reads.
const TFL_TABLES: &[(&str, &[&str])] = &[
    ("T_POP", &["ADSL"]),
    ("T_AE_REL", &["ADAE"]),
    ("T_VSCAT", &["ADVS"]),
    ("T_CONMED", &["ADCM"]),
    ("T_DEMOG", &["ADSL"]),
    ("T_EFF", &["ADEF"]),
    ("T_SAF", &["ADSL", "ADAE"]),
    ("T_VITALS", &["ADVS"]),
    ("L_MEDHIST", &["ADVS"]),
];

/// The standard set of ADaM datasets derived from one SDTM snapshot.
#[derive(Debug, Clone)]
pub struct AdamDatasets {
    pub adsl: AdamDataset,
    pub adae: AdamDataset,
    pub advs: AdamDataset,
    pub adcm: AdamDataset,
    pub adef: AdamDataset,
    pub adlb: AdamDataset,
    pub admh: AdamDataset,
}

impl AdamDatasets {
    pub fn by_name(&self, name: &str) -> Option<&AdamDataset> {
        [
            &self.adsl, &self.adae, &self.advs, &self.adcm, &self.adef, &self.adlb, &self.admh,
        ]
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

fn sas_adam(name: &str, sdtm_data_path: &str, tier: &str) -> AdamStep {
    AdamStep::new(
        name,
        format!("prod/adam/{}.sas", name.to_lowercase()),
        sdtm_data_path,
    )
    .environment(SAS_ENVIRONMENT)
    .hardware_tier(tier)
}

/// Add the ADSL step only.
fn add_adsl(workflow: &mut Workflow, sdtm_data_path: &str, tier: &str) -> Result<AdamDataset> {
    adam_dataset(workflow, sas_adam("ADSL", sdtm_data_path, tier))
}

/// Add the full ADaM derivation chain.
///
/// ADSL comes first; ADVS additionally needs ADAE, every other dataset
/// needs ADSL only.
pub fn add_adam_datasets(
    workflow: &mut Workflow,
    sdtm_data_path: &str,
    tier: &str,
) -> Result<AdamDatasets> {
    let adsl = add_adsl(workflow, sdtm_data_path, tier)?;
    let adae = adam_dataset(
        workflow,
        sas_adam("ADAE", sdtm_data_path, tier).depends_on(&adsl),
    )?;
    let advs = adam_dataset(
        workflow,
        sas_adam("ADVS", sdtm_data_path, tier)
            .depends_on(&adsl)
            .depends_on(&adae),
    )?;

    let on_adsl = |name: &str| sas_adam(name, sdtm_data_path, tier).depends_on(&adsl);
    let adcm = adam_dataset(workflow, on_adsl("ADCM"))?;
    let adef = adam_dataset(workflow, on_adsl("ADEF"))?;
    let adlb = adam_dataset(workflow, on_adsl("ADLB"))?;
    let admh = adam_dataset(workflow, on_adsl("ADMH"))?;

    Ok(AdamDatasets {
        adsl,
        adae,
        advs,
        adcm,
        adef,
        adlb,
        admh,
    })
}

/// Add report steps for the named tables, keyed by lower-case table name.
///
/// `launcher` is prepended to each script path (e.g. `"sas -stdio "`).
pub fn add_tfl_reports(
    workflow: &mut Workflow,
    datasets: &AdamDatasets,
    tables: &[&str],
    tier: &str,
    launcher: &str,
) -> Result<BTreeMap<String, OutputRef>> {
    let mut reports = BTreeMap::new();

    for table in tables {
        let (name, deps) = TFL_TABLES
            .iter()
            .find(|(name, _)| name == table)
            .ok_or_else(|| TrialflowError::Config(format!("unknown TFL table '{table}'")))?;

        let mut step = TflStep::new(
            *name,
            format!("{launcher}prod/tfl/{}.sas", name.to_lowercase()),
        )
        .environment(SAS_ENVIRONMENT)
        .hardware_tier(tier);

        for dep in deps.iter() {
            let dataset = datasets.by_name(dep).ok_or_else(|| {
                TrialflowError::Config(format!("table '{name}' needs unknown dataset '{dep}'"))
            })?;
            step = step.depends_on(dataset);
        }

        reports.insert(name.to_lowercase(), tfl_report(workflow, step)?);
    }

    Ok(reports)
}

fn expose_all(workflow: &mut Workflow, reports: &BTreeMap<String, OutputRef>) {
    for (name, report) in reports {
        workflow.expose(name.clone(), report.clone());
    }
}

fn base(name: &str, sdtm_data_path: &str) -> Workflow {
    Workflow::new(name).with_param("sdtm_data_path", sdtm_data_path)
}

/// ADSL followed by the population table.
pub fn sdtm_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("sdtm", sdtm_data_path)
        .with_failure_policy(FailurePolicy::FailAfterExecutableNodesComplete);

    let adsl = add_adsl(&mut wf, sdtm_data_path, SMALL)?;
    let t_pop = tfl_report(
        &mut wf,
        TflStep::new("T_POP", "prod/tfl/t_pop.sas")
            .environment(SAS_ENVIRONMENT)
            .hardware_tier(SMALL)
            .depends_on(&adsl),
    )?;

    wf.expose("t_pop", t_pop);
    Ok(wf)
}

/// ADSL, the population table, and a generic Python step that combines
/// the report.
pub fn sce_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("sce_workflow", sdtm_data_path)
        .with_failure_policy(FailurePolicy::FailAfterExecutableNodesComplete);

    let adsl = add_adsl(&mut wf, sdtm_data_path, SMALL)?;
    let t_pop = tfl_report(
        &mut wf,
        TflStep::new("T_POP", "prod/tfl/t_pop.sas")
            .environment(SAS_ENVIRONMENT)
            .hardware_tier(SMALL)
            .depends_on(&adsl),
    )?;

    wf.add_step(
        StepSpec::new("Python task", "utilities/combine_tfl.py")
            .output_input("t_pop", t_pop.clone())
            .output("report")
            .meta(ENVIRONMENT, R_PY_ENVIRONMENT)
            .meta(HARDWARE_TIER, SMALL),
    )?;

    wf.expose("t_pop", t_pop);
    Ok(wf)
}

/// All ADaM datasets, then the AE and vital-signs category tables.
pub fn adam_tfl_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("adam_tfl", sdtm_data_path);

    let datasets = add_adam_datasets(&mut wf, sdtm_data_path, SMALL)?;
    let reports = add_tfl_reports(
        &mut wf,
        &datasets,
        &["T_AE_REL", "T_VSCAT"],
        SMALL,
        "sas -stdio ",
    )?;

    expose_all(&mut wf, &reports);
    Ok(wf)
}

/// All ADaM datasets and every report except the population table.
pub fn full_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("workflow_full", sdtm_data_path);

    let datasets = add_adam_datasets(&mut wf, sdtm_data_path, SMALL)?;
    let tables: Vec<&str> = TFL_TABLES
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| *name != "T_POP")
        .collect();
    let reports = add_tfl_reports(&mut wf, &datasets, &tables, SMALL, "")?;

    expose_all(&mut wf, &reports);
    Ok(wf)
}

/// Every dataset and report, two R plots, and a final PDF merge step.
pub fn analysis_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("analysis", sdtm_data_path)
        .with_failure_policy(FailurePolicy::FailAfterExecutableNodesComplete);

    let datasets = add_adam_datasets(&mut wf, sdtm_data_path, MEDIUM_AWS)?;
    let tables: Vec<&str> = TFL_TABLES.iter().map(|(name, _)| *name).collect();
    let reports = add_tfl_reports(&mut wf, &datasets, &tables, SMALL_AWS, "")?;

    wf.add_step(r_plot(
        "AE Analysis Plot in ggplot and R",
        "prod/tfl/ae_analysis.R",
        &datasets.adae,
    ))?;
    wf.add_step(r_plot(
        "Average Age Plot in ggplot and R",
        "prod/tfl/sl_analysis.R",
        &datasets.adsl,
    ))?;

    let mut merge = StepSpec::new("Merge TFL PDFs", "utilities/merge_tfl.py")
        .meta(ENVIRONMENT, R_PY_ENVIRONMENT)
        .meta(HARDWARE_TIER, SMALL_AWS);
    for (name, report) in &reports {
        merge = merge.output_input(name.clone(), report.clone());
    }
    wf.add_step(merge)?;

    expose_all(&mut wf, &reports);
    Ok(wf)
}

/// ADSL followed by an R plot of average age.
pub fn r_plot_workflow(sdtm_data_path: &str) -> Result<Workflow> {
    let mut wf = base("r_plot", sdtm_data_path)
        .with_failure_policy(FailurePolicy::FailAfterExecutableNodesComplete);

    let adsl = add_adsl(&mut wf, sdtm_data_path, MEDIUM_AWS)?;
    wf.add_step(r_plot(
        "Average Age Plot in ggplot and R",
        "prod/tfl/sl_analysis.R",
        &adsl,
    ))?;

    Ok(wf)
}

fn r_plot(name: &str, command: &str, dataset: &AdamDataset) -> StepSpec {
    StepSpec::new(name, command)
        .output_input(dataset.filename.clone(), dataset.data.clone())
        .meta(ENVIRONMENT, R_PY_ENVIRONMENT)
        .meta(HARDWARE_TIER, SMALL_AWS)
}
