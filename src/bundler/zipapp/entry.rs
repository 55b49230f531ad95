//! Entry point specifiers (`pkg.module:function`).

use regex::Regex;
use std::sync::LazyLock;

static ENTRY_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+\.)*[A-Za-z0-9_]+(?::[A-Za-z0-9_]+)?$")
        .expect("entry point pattern is valid")
});

/// A parsed entry point: a dotted module path and an optional callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    module: String,
    function: Option<String>,
}

impl EntryPoint {
    /// Builds an entry point from already-known parts.
    pub fn new(module: &str, function: Option<&str>) -> Self {
        Self {
            module: module.to_string(),
            function: function.map(str::to_string),
        }
    }

    /// Parses `pkg.module` or `pkg.module:function`.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if !ENTRY_POINT_RE.is_match(spec) {
            return None;
        }

        let (module, function) = match spec.split_once(':') {
            Some((module, function)) => (module, Some(function.to_string())),
            None => (spec, None),
        };

        Some(Self {
            module: module.to_string(),
            function,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Source of the `__main__.py` that starts this entry point.
    pub fn main_module_source(&self) -> String {
        let module = &self.module;
        match &self.function {
            Some(function) => {
                format!("# -*- coding: utf-8 -*-\nimport {module}\n{module}.{function}()\n")
            }
            None => format!(
                "# -*- coding: utf-8 -*-\nimport runpy\nrunpy.run_module(\"{module}\", run_name=\"__main__\", alter_sys=True)\n"
            ),
        }
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{}:{}", self.module, function),
            None => f.write_str(&self.module),
        }
    }
}
