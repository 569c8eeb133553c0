//! Runtime variables and their classification
//!
//! Variable names are dot-delimited; the prefix encodes the scope that
//! produced the value (`cds.proj.*` comes from the project, `git.*` from the
//! repository manager, ...). Classification is an ordered prefix match:
//! the first matching rule wins, and anything unmatched lands in the
//! generic bucket, so no variable is ever dropped.

use serde::{Deserialize, Serialize};

/// A named runtime value attached to a build or node run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Semantic scope a variable belongs to, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableScope {
    Project,
    Application,
    Pipeline,
    Environment,
    Parent,
    Build,
    Git,
    Workflow,
    /// Fallback for engine-level and unprefixed variables.
    Generic,
}

/// Prefix rules in priority order; evaluated top to bottom.
const SCOPE_RULES: &[(&str, VariableScope)] = &[
    ("cds.proj.", VariableScope::Project),
    ("cds.app.", VariableScope::Application),
    ("cds.pip.", VariableScope::Pipeline),
    ("cds.env.", VariableScope::Environment),
    ("cds.parent.", VariableScope::Parent),
    ("cds.build.", VariableScope::Build),
    ("git.", VariableScope::Git),
    ("workflow.", VariableScope::Workflow),
];

impl VariableScope {
    /// Classify a variable name. Total: unmatched names are `Generic`.
    pub fn of(name: &str) -> Self {
        SCOPE_RULES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, scope)| *scope)
            .unwrap_or(Self::Generic)
    }

    /// All scopes, in display order.
    pub fn all() -> [Self; 9] {
        [
            Self::Project,
            Self::Application,
            Self::Pipeline,
            Self::Environment,
            Self::Parent,
            Self::Build,
            Self::Git,
            Self::Workflow,
            Self::Generic,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Application => "application",
            Self::Pipeline => "pipeline",
            Self::Environment => "environment",
            Self::Parent => "parent",
            Self::Build => "build",
            Self::Git => "git",
            Self::Workflow => "workflow",
            Self::Generic => "cds",
        }
    }
}

/// Variables partitioned by scope, in stable append order per bucket.
///
/// `assign` is not additive: each call resets every bucket before
/// repopulating from the full list it is given.
#[derive(Debug, Clone, Default)]
pub struct VariableBuckets {
    pub project: Vec<Variable>,
    pub application: Vec<Variable>,
    pub pipeline: Vec<Variable>,
    pub environment: Vec<Variable>,
    pub parent: Vec<Variable>,
    pub build: Vec<Variable>,
    pub git: Vec<Variable>,
    pub workflow: Vec<Variable>,
    pub generic: Vec<Variable>,
}

impl VariableBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition a full variable list.
    pub fn classify(variables: &[Variable]) -> Self {
        let mut buckets = Self::new();
        buckets.assign(variables);
        buckets
    }

    /// Replace the bucket contents with a classification of `variables`.
    pub fn assign(&mut self, variables: &[Variable]) {
        *self = Self::new();
        for variable in variables {
            self.bucket_mut(VariableScope::of(&variable.name))
                .push(variable.clone());
        }
    }

    pub fn bucket(&self, scope: VariableScope) -> &[Variable] {
        match scope {
            VariableScope::Project => &self.project,
            VariableScope::Application => &self.application,
            VariableScope::Pipeline => &self.pipeline,
            VariableScope::Environment => &self.environment,
            VariableScope::Parent => &self.parent,
            VariableScope::Build => &self.build,
            VariableScope::Git => &self.git,
            VariableScope::Workflow => &self.workflow,
            VariableScope::Generic => &self.generic,
        }
    }

    fn bucket_mut(&mut self, scope: VariableScope) -> &mut Vec<Variable> {
        match scope {
            VariableScope::Project => &mut self.project,
            VariableScope::Application => &mut self.application,
            VariableScope::Pipeline => &mut self.pipeline,
            VariableScope::Environment => &mut self.environment,
            VariableScope::Parent => &mut self.parent,
            VariableScope::Build => &mut self.build,
            VariableScope::Git => &mut self.git,
            VariableScope::Workflow => &mut self.workflow,
            VariableScope::Generic => &mut self.generic,
        }
    }

    /// Total number of classified variables across all buckets.
    pub fn len(&self) -> usize {
        VariableScope::all()
            .iter()
            .map(|scope| self.bucket(*scope).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Variable {
        Variable::new(name, "v")
    }

    #[test]
    fn test_every_variable_lands_in_exactly_one_bucket() {
        let input = vec![
            var("cds.proj.key"),
            var("cds.app.name"),
            var("cds.pip.name"),
            var("cds.env.name"),
            var("cds.parent.build"),
            var("cds.build.id"),
            var("git.hash"),
            var("workflow.root"),
            var("cds.version"),
            var("unprefixed"),
        ];
        let buckets = VariableBuckets::classify(&input);

        assert_eq!(buckets.project.len(), 1);
        assert_eq!(buckets.application.len(), 1);
        assert_eq!(buckets.pipeline.len(), 1);
        assert_eq!(buckets.environment.len(), 1);
        assert_eq!(buckets.parent.len(), 1);
        assert_eq!(buckets.build.len(), 1);
        assert_eq!(buckets.git.len(), 1);
        assert_eq!(buckets.workflow.len(), 1);
        assert_eq!(buckets.generic.len(), 2);
        assert_eq!(buckets.len(), input.len());
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        // cds.proj.foo must classify as project even though the generic
        // bucket would also take it.
        assert_eq!(VariableScope::of("cds.proj.foo"), VariableScope::Project);
        // cds.parent.* before cds.p-anything looser.
        assert_eq!(
            VariableScope::of("cds.parent.cds.build.x"),
            VariableScope::Parent
        );
        // Prefixes anchor at the start of the name.
        assert_eq!(VariableScope::of("my.git.hash"), VariableScope::Generic);
    }

    #[test]
    fn test_assign_resets_buckets() {
        let mut buckets = VariableBuckets::classify(&[var("git.hash"), var("git.branch")]);
        assert_eq!(buckets.git.len(), 2);

        buckets.assign(&[var("cds.proj.key")]);
        assert!(buckets.git.is_empty());
        assert_eq!(buckets.project.len(), 1);
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn test_append_order_is_stable_within_bucket() {
        let buckets = VariableBuckets::classify(&[
            var("git.branch"),
            var("git.hash"),
            var("git.author"),
        ]);
        let names: Vec<&str> = buckets.git.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["git.branch", "git.hash", "git.author"]);
    }
}
