#![allow(dead_code)]

use trialflow::graph::{Graph, OutputRef, StepSpec};

/// Output name every step built by [`dep_step`] declares.
pub const OUT: &str = "out";

/// A step named `id` with one output [`OUT`] and one input per entry of
/// `deps`, each wired to that dependency's [`OUT`].
pub fn dep_step(id: &str, deps: &[&str]) -> StepSpec {
    let mut spec = StepSpec::new(id, format!("run {id}")).output(OUT);
    for dep in deps {
        spec = spec.output_input(*dep, OutputRef::new(*dep, OUT));
    }
    spec
}

/// Builder for `Graph` to simplify test setup.
///
/// Steps are added with `declare_step`, so forward references are allowed
/// and only surface at `build()`.
pub struct GraphBuilder {
    steps: Vec<StepSpec>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step(mut self, id: &str, deps: &[&str]) -> Self {
        self.steps.push(dep_step(id, deps));
        self
    }

    pub fn spec(mut self, spec: StepSpec) -> Self {
        self.steps.push(spec);
        self
    }

    pub fn build(self) -> Graph {
        let mut graph = Graph::new();
        for spec in self.steps {
            graph
                .declare_step(spec)
                .expect("Failed to declare step in test graph");
        }
        graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for workflow TOML text.
pub struct WorkflowTomlBuilder {
    header: String,
    params: Vec<(String, String)>,
    steps: Vec<String>,
    outputs: Vec<String>,
}

impl WorkflowTomlBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            header: format!("[workflow]\nname = \"{name}\"\n"),
            params: Vec::new(),
            steps: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn failure_policy(mut self, policy: &str) -> Self {
        self.header
            .push_str(&format!("failure_policy = \"{policy}\"\n"));
        self
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a `[[step]]` with output `out` and one input per dependency.
    pub fn step(mut self, name: &str, deps: &[&str]) -> Self {
        let mut s = format!(
            "[[step]]\nname = \"{name}\"\ncommand = \"run {name}\"\noutputs = [\"{OUT}\"]\n"
        );
        for dep in deps {
            s.push_str(&format!(
                "inputs.{dep} = {{ step = \"{dep}\", output = \"{OUT}\" }}\n"
            ));
        }
        self.steps.push(s);
        self
    }

    /// Add a raw `[[step]]` block.
    pub fn raw_step(mut self, block: &str) -> Self {
        self.steps.push(block.to_string());
        self
    }

    pub fn output(mut self, name: &str, step: &str) -> Self {
        self.outputs.push(format!(
            "{name} = {{ step = \"{step}\", output = \"{OUT}\" }}\n"
        ));
        self
    }

    pub fn build(self) -> String {
        let mut out = self.header;
        if !self.params.is_empty() {
            out.push_str("\n[params]\n");
            for (k, v) in &self.params {
                out.push_str(&format!("{k} = \"{v}\"\n"));
            }
        }
        for step in &self.steps {
            out.push('\n');
            out.push_str(step);
        }
        if !self.outputs.is_empty() {
            out.push_str("\n[outputs]\n");
            for o in &self.outputs {
                out.push_str(o);
            }
        }
        out
    }
}
