//! Shared fixtures and test doubles for the analysis tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::class::LoadedClass;
use crate::config::AnalysisConfiguration;
use crate::context::AnalysisContext;
use crate::loader::{ClassLoader, CodeSupply, LoadError, ReferenceExtractor, SupplyError};
use crate::source::ClassSource;
use crate::whitelist::Whitelist;

/// In-memory description of a fixture class.
#[derive(Debug, Clone, Default)]
pub struct FixtureClass {
    pub super_name: Option<String>,
    pub references: Vec<String>,
}

/// Class universe backing both the loader and extractor seams.
///
/// Every listed class loads successfully; everything else fails with a
/// not-found error, mirroring a supply that lacks the unit.
#[derive(Debug, Clone, Default)]
pub struct FixtureUniverse {
    classes: BTreeMap<String, FixtureClass>,
}

impl FixtureUniverse {
    pub fn with_class(mut self, name: &str, super_name: Option<&str>, references: &[&str]) -> Self {
        self.classes.insert(
            name.to_owned(),
            FixtureClass {
                super_name: super_name.map(str::to_owned),
                references: references.iter().map(|reference| (*reference).to_owned()).collect(),
            },
        );
        self
    }
}

impl ClassLoader for FixtureUniverse {
    fn load(
        &self,
        source: &ClassSource,
        context: &mut AnalysisContext,
    ) -> Result<LoadedClass, LoadError> {
        let name = source.binary_name();
        let fixture = self.classes.get(name).ok_or_else(|| LoadError::NotFound {
            binary_name: name.to_owned(),
        })?;
        let class = LoadedClass::new(name, fixture.super_name.clone(), vec![0xCA, 0xFE]);
        context.record_class(class.clone());
        Ok(class)
    }
}

impl ReferenceExtractor for FixtureUniverse {
    fn references_of(&self, class: &LoadedClass, _analyze_annotations: bool) -> Vec<String> {
        self.classes
            .get(class.binary_name())
            .map(|fixture| fixture.references.clone())
            .unwrap_or_default()
    }
}

/// Bootstrap supply whose release is observable through a shared flag.
#[derive(Debug)]
pub struct RecordingSupply {
    closed: Arc<AtomicBool>,
}

impl RecordingSupply {
    /// Creates the supply and the flag that records its release.
    pub fn create() -> (Arc<dyn CodeSupply>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let supply = Arc::new(Self {
            closed: Arc::clone(&closed),
        });
        (supply, closed)
    }
}

impl CodeSupply for RecordingSupply {
    fn class_bytes(&self, _binary_name: &str) -> Result<Option<Vec<u8>>, SupplyError> {
        Ok(None)
    }

    fn close(&self) -> Result<(), SupplyError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Root configuration over the given whitelist and a throwaway supply.
pub fn configuration(whitelist: Whitelist) -> AnalysisConfiguration {
    let (supply, _closed) = RecordingSupply::create();
    AnalysisConfiguration::root(whitelist, supply)
}
