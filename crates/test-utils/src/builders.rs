use batchgrade::config::{BatchConfig, InputGroup, RawConfigFile};
use batchgrade::types::TraversalMode;

/// Builder for `BatchConfig` to simplify test setup.
///
/// Starts from the built-in defaults with the given root.
pub struct BatchConfigBuilder {
    raw: RawConfigFile,
    input_groups: Option<Vec<InputGroup>>,
}

impl BatchConfigBuilder {
    pub fn new(root: &str) -> Self {
        let mut raw = RawConfigFile::default();
        raw.batch.in_dir = Some(root.to_string());
        Self {
            raw,
            input_groups: None,
        }
    }

    pub fn compiler(mut self, compiler: &str) -> Self {
        self.raw.batch.compiler = compiler.to_string();
        self
    }

    pub fn std(mut self, std: &str) -> Self {
        self.raw.batch.std = Some(std.to_string());
        self
    }

    pub fn question(mut self, tag: &str) -> Self {
        self.raw.batch.question = Some(tag.to_string());
        self
    }

    pub fn student(mut self, id: &str) -> Self {
        self.raw.batch.student = Some(id.to_string());
        self
    }

    pub fn mode(mut self, mode: TraversalMode) -> Self {
        self.raw.batch.source = mode;
        self
    }

    pub fn times(mut self, times: usize) -> Self {
        self.raw.batch.times = times;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.raw.batch.strict = strict;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.layout.exclude.push(pattern.to_string());
        self
    }

    /// One scripted group of lines per run.
    pub fn inputs(mut self, groups: &[&[&str]]) -> Self {
        self.input_groups = Some(groups.iter().map(|g| InputGroup::new(g.iter().copied())).collect());
        self
    }

    pub fn build(self) -> BatchConfig {
        let cfg = BatchConfig::try_from(self.raw).expect("Failed to build valid config from builder");
        match self.input_groups {
            Some(groups) => cfg
                .with_input_groups(groups)
                .expect("Failed to attach input groups from builder"),
            None => cfg,
        }
    }
}
