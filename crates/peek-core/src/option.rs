/// Knobs for one resolver instance.
#[derive(Debug, Clone)]
pub struct ResolveOption {
    /// How deep keyed array literals are expanded into `structure`.
    pub max_infer_depth: usize,
    /// Overrides the frontend's default extensions during discovery.
    pub extensions: Option<Vec<String>>,
}

impl Default for ResolveOption {
    fn default() -> Self {
        Self {
            max_infer_depth: Self::DEFAULT_MAX_INFER_DEPTH,
            extensions: None,
        }
    }
}

impl ResolveOption {
    pub const DEFAULT_MAX_INFER_DEPTH: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_infer_depth(mut self, depth: usize) -> Self {
        self.max_infer_depth = depth;
        self
    }

    pub fn with_extensions(mut self, extensions: Option<Vec<String>>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Extensions to search: the override if set, else `defaults`.
    pub fn extensions_or<'a>(&'a self, defaults: &'a [&'a str]) -> Vec<&'a str> {
        match &self.extensions {
            Some(exts) => exts.iter().map(|e| e.trim_start_matches('.')).collect(),
            None => defaults.to_vec(),
        }
    }
}
