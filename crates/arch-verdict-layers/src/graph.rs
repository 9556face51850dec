//! Element graph: the code elements and dependencies rules are checked against.
//!
//! The graph is produced by an external exporter (bytecode scanner, compiler
//! plugin, ...) and read here as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a code element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// A class.
    #[default]
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An annotation type.
    Annotation,
}

impl ElementKind {
    fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Enum => "Enum",
            Self::Annotation => "Annotation",
        }
    }
}

/// A named code element, e.g. `com.example.domain.User`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeElement {
    /// Fully-qualified name.
    pub name: String,
    /// Element kind.
    #[serde(default)]
    pub kind: ElementKind,
}

impl CodeElement {
    /// Creates a class element.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Class,
        }
    }

    /// Name without its package, e.g. `User`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for CodeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.kind.label(), self.name)
    }
}

/// How the origin uses the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// Origin extends target.
    Extends,
    /// Origin implements target.
    Implements,
    /// Origin has a field of the target type.
    FieldType,
    /// A method of origin has a parameter of the target type.
    ParameterType,
    /// A method of origin returns the target type.
    ReturnType,
    /// A method of origin calls a method of target.
    MethodCall,
    /// A method of origin reads or writes a field of target.
    FieldAccess,
    /// Any other use.
    #[default]
    DependsOn,
}

/// A directed dependency between two code elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Fully-qualified name of the depending element.
    pub origin: String,
    /// Fully-qualified name of the element depended upon.
    pub target: String,
    /// Kind of use.
    #[serde(default)]
    pub kind: DependencyKind,
    /// Source file the dependency was found in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Line within `source_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Kind of the origin element; filled from `elements` when parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_kind: Option<ElementKind>,
}

impl Dependency {
    /// Creates a plain dependency without source location.
    #[must_use]
    pub fn new(origin: impl Into<String>, target: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
            kind,
            source_file: None,
            line: None,
            origin_kind: None,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, source_file: impl Into<String>, line: usize) -> Self {
        self.source_file = Some(source_file.into());
        self.line = Some(line);
        self
    }

    /// Sets the kind of the origin element.
    #[must_use]
    pub fn with_origin_kind(mut self, kind: ElementKind) -> Self {
        self.origin_kind = Some(kind);
        self
    }

    /// One-line description used in violation reports, e.g.
    /// `Class <a.User> has field of type <b.Repo> in (User.java:12)`.
    ///
    /// The origin is labelled by its kind; unknown origins are labelled `Class`.
    #[must_use]
    pub fn description(&self) -> String {
        let origin = CodeElement {
            name: self.origin.clone(),
            kind: self.origin_kind.unwrap_or_default(),
        };
        let target = &self.target;
        let mut text = match self.kind {
            DependencyKind::Extends => format!("{origin} extends <{target}>"),
            DependencyKind::Implements => format!("{origin} implements interface <{target}>"),
            DependencyKind::FieldType => format!("{origin} has field of type <{target}>"),
            DependencyKind::ParameterType => {
                format!("{origin} has method parameter of type <{target}>")
            }
            DependencyKind::ReturnType => format!("{origin} has method return type <{target}>"),
            DependencyKind::MethodCall => format!("{origin} calls method of <{target}>"),
            DependencyKind::FieldAccess => format!("{origin} accesses field of <{target}>"),
            DependencyKind::DependsOn => format!("{origin} depends on <{target}>"),
        };
        match (&self.source_file, self.line) {
            (Some(file), Some(line)) => text.push_str(&format!(" in ({file}:{line})")),
            (Some(file), None) => text.push_str(&format!(" in ({file})")),
            _ => {}
        }
        text
    }
}

/// Code elements and the dependencies between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementGraph {
    /// All known elements.
    #[serde(default)]
    pub elements: Vec<CodeElement>,
    /// All dependencies, in export order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ElementGraph {
    /// Reads a graph from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid graph.
    pub fn from_file(path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses a graph from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a graph.
    pub fn parse(content: &str) -> Result<Self, GraphError> {
        let mut graph: Self = serde_json::from_str(content).map_err(|e| GraphError::Parse {
            message: e.to_string(),
        })?;
        graph.resolve_origin_kinds();
        Ok(graph)
    }

    /// Fills missing `origin_kind`s from the element list.
    fn resolve_origin_kinds(&mut self) {
        let kinds: HashMap<&str, ElementKind> = self
            .elements
            .iter()
            .map(|e| (e.name.as_str(), e.kind))
            .collect();
        for dependency in &mut self.dependencies {
            if dependency.origin_kind.is_none() {
                dependency.origin_kind = kinds.get(dependency.origin.as_str()).copied();
            }
        }
    }

    /// Returns a copy without elements matching any of `patterns`, and
    /// without dependencies whose origin or target matches.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn without_excluded(&self, patterns: &[String]) -> Result<Self, GraphError> {
        if patterns.is_empty() {
            return Ok(self.clone());
        }
        let compiled = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| GraphError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let excluded = |name: &str| compiled.iter().any(|p| p.matches(name));

        let graph = Self {
            elements: self
                .elements
                .iter()
                .filter(|e| !excluded(&e.name))
                .cloned()
                .collect(),
            dependencies: self
                .dependencies
                .iter()
                .filter(|d| !excluded(&d.origin) && !excluded(&d.target))
                .cloned()
                .collect(),
        };
        tracing::debug!(
            "Excluded {} elements and {} dependencies",
            self.elements.len() - graph.elements.len(),
            self.dependencies.len() - graph.dependencies.len()
        );
        Ok(graph)
    }

    /// Dependencies originating from `name`.
    pub fn dependencies_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> {
        self.dependencies.iter().filter(move |d| d.origin == name)
    }
}

/// Errors when loading an element graph.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GraphError {
    /// Failed to read the graph file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(arch_verdict::graph::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// The file is not a valid graph.
    #[error("invalid element graph: {message}")]
    #[diagnostic(code(arch_verdict::graph::parse))]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern '{pattern}': {message}")]
    #[diagnostic(code(arch_verdict::graph::pattern))]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob error detail.
        message: String,
    },
}
