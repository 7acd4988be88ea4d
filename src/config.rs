use crate::language::{Language, LanguageDescriptor, LanguageRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScopeConfig {
    /// Compile worker threads; the available parallelism when unset
    pub workers: Option<usize>,
    /// Extra tags per language, keyed by language name (`"C++"`, `"java"`, ...)
    #[serde(default)]
    pub languages: HashMap<String, LanguageOverrides>,
}

/// Tags added to the sets of a built-in descriptor
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LanguageOverrides {
    pub containers: Vec<String>,
    pub types: Vec<String>,
    pub methods: Vec<String>,
    pub namespaces: Vec<String>,
    pub declarations: Vec<String>,
    pub references: Vec<String>,
    pub transparent: Vec<String>,
}

impl LanguageOverrides {
    fn apply_to(&self, descriptor: &mut LanguageDescriptor) {
        let sets: [(&mut HashSet<String>, &Vec<String>); 7] = [
            (&mut descriptor.containers, &self.containers),
            (&mut descriptor.types, &self.types),
            (&mut descriptor.methods, &self.methods),
            (&mut descriptor.namespaces, &self.namespaces),
            (&mut descriptor.declarations, &self.declarations),
            (&mut descriptor.references, &self.references),
            (&mut descriptor.transparent, &self.transparent),
        ];
        for (set, extra) in sets {
            set.extend(extra.iter().cloned());
        }
    }
}

impl ScopeConfig {
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|n| *n > 0)
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    /// Add the configured tags to the registry's descriptors
    pub fn apply(&self, registry: &mut LanguageRegistry) -> crate::Result<()> {
        for (name, overrides) in &self.languages {
            let language: Language = name
                .parse()
                .map_err(|_| crate::Error::Config(format!("unknown language {:?}", name)))?;
            let descriptor = registry
                .get_mut(language)
                .ok_or_else(|| crate::Error::Config(format!("no descriptor registered for {}", language)))?;
            overrides.apply_to(descriptor);
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("srcscope.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ScopeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ScopeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ScopeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (pass force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
