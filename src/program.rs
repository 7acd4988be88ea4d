//! Program builder - whole-program graph from many file units
//!
//! Files are compiled independently on a worker pool. The per-file graphs
//! are then folded into the program graph one at a time on the calling
//! thread, so merging never needs a lock. Each file's unit fingerprint is
//! kept so that re-submitting an unchanged file is a no-op and a changed
//! file replaces its old contribution.

use crate::config::ScopeConfig;
use crate::language::{default_registry, LanguageRegistry};
use crate::scope::ScopeGraph;
use crate::srcml::Node;
use crate::{Error, Result};
use crossbeam::channel;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// What re-submitting a file unit means for the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    New,
    Modified,
    Unchanged,
}

/// A unit that could not be compiled
#[derive(Debug, Clone)]
pub struct FailedUnit {
    pub file: String,
    pub reason: String,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct ProgramStats {
    pub compiled: usize,
    pub unchanged: usize,
    pub failed: Vec<FailedUnit>,
}

impl std::fmt::Display for ProgramStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Program Statistics:")?;
        writeln!(f, "  Compiled: {}", self.compiled)?;
        writeln!(f, "  Unchanged: {}", self.unchanged)?;
        writeln!(f, "  Failed: {}", self.failed.len())?;
        for failed in &self.failed {
            writeln!(f, "    {}: {}", failed.file, failed.reason)?;
        }
        Ok(())
    }
}

/// Result of compiling one unit on a worker
enum CompileMessage {
    Compiled {
        index: usize,
        file: String,
        fingerprint: blake3::Hash,
        graph: ScopeGraph,
    },
    Failed {
        index: usize,
        file: String,
        error: Error,
    },
}

impl CompileMessage {
    fn index(&self) -> usize {
        match self {
            CompileMessage::Compiled { index, .. } | CompileMessage::Failed { index, .. } => *index,
        }
    }
}

fn compile_one(registry: &LanguageRegistry, index: usize, unit: &Node) -> CompileMessage {
    let file = unit.attribute("filename").unwrap_or_default().to_string();
    match registry.for_unit(unit).and_then(|descriptor| crate::compile(unit, descriptor)) {
        Ok(graph) => CompileMessage::Compiled {
            index,
            file,
            fingerprint: unit.fingerprint(),
            graph,
        },
        Err(error) => CompileMessage::Failed { index, file, error },
    }
}

/// A program graph assembled from file units
pub struct Program {
    registry: LanguageRegistry,
    graph: ScopeGraph,
    fingerprints: HashMap<String, blake3::Hash>,
    workers: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl Program {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self {
            registry,
            graph: ScopeGraph::new(),
            fingerprints: HashMap::new(),
            workers: ScopeConfig::default().worker_count(),
        }
    }

    /// Built-in descriptors extended by the configuration
    pub fn from_config(config: &ScopeConfig) -> Result<Self> {
        let mut registry = default_registry();
        config.apply(&mut registry)?;
        Ok(Self::new(registry).with_workers(config.worker_count()))
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn graph(&self) -> &ScopeGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ScopeGraph {
        self.graph
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Files currently contributing to the program, sorted
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.fingerprints.keys().map(String::as_str).collect();
        files.sort();
        files
    }

    /// How `unit` compares with what the program already holds for its file
    pub fn status(&self, unit: &Node) -> FileStatus {
        let file = unit.attribute("filename").unwrap_or_default();
        match self.fingerprints.get(file) {
            None => FileStatus::New,
            Some(known) if *known == unit.fingerprint() => FileStatus::Unchanged,
            Some(_) => FileStatus::Modified,
        }
    }

    /// Compile `units` in parallel and merge them into the program.
    ///
    /// A unit that fails is reported in the stats and skipped. Units whose
    /// file is already known replace its previous contribution, unchanged
    /// ones are skipped. Only the first unit for a file in one batch is
    /// used; later ones are reported as failed.
    pub fn add_units(&mut self, units: Vec<Node>) -> ProgramStats {
        let mut stats = ProgramStats::default();
        let mut seen = HashSet::new();
        let mut pending = Vec::with_capacity(units.len());
        for unit in units {
            let file = unit.attribute("filename").unwrap_or_default().to_string();
            if !seen.insert(file.clone()) {
                warn!(file = %file, "file appears more than once in the batch, keeping the first unit");
                stats.failed.push(FailedUnit {
                    file,
                    reason: "duplicate unit in batch".to_string(),
                });
                continue;
            }
            if self.status(&unit) == FileStatus::Unchanged {
                stats.unchanged += 1;
                continue;
            }
            pending.push(unit);
        }
        let total = pending.len();

        let (job_tx, job_rx) = channel::unbounded::<(usize, Node)>();
        let (message_tx, message_rx) = channel::unbounded::<CompileMessage>();
        for job in pending.into_iter().enumerate() {
            job_tx.send(job).ok();
        }
        drop(job_tx);

        let registry = &self.registry;
        let workers = self.workers.min(total).max(1);
        let outcome = crossbeam::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let message_tx = message_tx.clone();
                scope.spawn(move |_| {
                    for (index, unit) in job_rx.iter() {
                        message_tx.send(compile_one(registry, index, &unit)).ok();
                    }
                });
            }
        });
        drop(message_tx);
        if outcome.is_err() {
            warn!("a compile worker panicked; its units are missing from the program");
        }

        // submission order keeps the fold reproducible
        let mut messages: Vec<CompileMessage> = message_rx.iter().collect();
        messages.sort_by_key(CompileMessage::index);

        for message in messages {
            match message {
                CompileMessage::Compiled { file, fingerprint, graph, .. } => {
                    self.merge_file(file, fingerprint, graph);
                    stats.compiled += 1;
                }
                CompileMessage::Failed { file, error, .. } => {
                    warn!(file = %file, error = %error, "failed to compile unit");
                    stats.failed.push(FailedUnit {
                        file,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            compiled = stats.compiled,
            unchanged = stats.unchanged,
            failed = stats.failed.len(),
            workers,
            "added units to program"
        );
        stats
    }

    /// Compile one unit on the calling thread and bring the program up to date
    pub fn update_unit(&mut self, unit: &Node) -> Result<FileStatus> {
        let status = self.status(unit);
        if status == FileStatus::Unchanged {
            return Ok(status);
        }
        let descriptor = self.registry.for_unit(unit)?;
        let graph = crate::compile(unit, descriptor)?;
        let file = unit.attribute("filename").unwrap_or_default().to_string();
        self.merge_file(file, unit.fingerprint(), graph);
        Ok(status)
    }

    /// Retract everything `file` contributed. Returns false for an unknown file.
    pub fn remove_file(&mut self, file: &str) -> bool {
        if self.fingerprints.remove(file).is_none() {
            return false;
        }
        self.retract(file);
        true
    }

    fn merge_file(&mut self, file: String, fingerprint: blake3::Hash, graph: ScopeGraph) {
        if self.fingerprints.contains_key(&file) {
            debug!(file = %file, "replacing previous contribution");
            self.retract(&file);
        }
        let program = std::mem::take(&mut self.graph);
        self.graph = program.merge(graph);
        self.fingerprints.insert(file, fingerprint);
    }

    /// Remove a file's contribution; scopes left without a parent are
    /// re-homed under the global namespace
    fn retract(&mut self, file: &str) {
        let Some(orphans) = self.graph.remove_file(file) else {
            return;
        };
        let root = self.graph.root();
        for orphan in orphans {
            self.graph.add_child(root, orphan);
        }
    }
}
