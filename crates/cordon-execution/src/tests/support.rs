//! Shared fixtures and test doubles for the execution tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cordon_analysis::{
    AnalysisConfiguration, AnalysisContext, ClassLoader, ClassSource, CodeSupply, EntryPoint,
    InvocationFault, LoadError, LoadedClass, ReferenceExtractor, SupplyError, Whitelist,
};
use cordon_costing::{CostCategory, CostMeter};
use serde_json::Value;

use crate::executor::SandboxExecutor;

/// Supply with no content; execution tests never read the bootstrap.
#[derive(Debug)]
pub struct EmptySupply;

impl CodeSupply for EmptySupply {
    fn class_bytes(&self, _binary_name: &str) -> Result<Option<Vec<u8>>, SupplyError> {
        Ok(None)
    }

    fn close(&self) -> Result<(), SupplyError> {
        Ok(())
    }
}

/// Root configuration with the minimal whitelist.
pub fn configuration() -> Arc<AnalysisConfiguration> {
    Arc::new(AnalysisConfiguration::root(
        Whitelist::minimal(),
        Arc::new(EmptySupply),
    ))
}

/// Entry returning `input + 1` with a small deterministic cost.
pub struct AddOneEntry;

impl EntryPoint for AddOneEntry {
    fn invoke(&self, input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        meter.record(CostCategory::Allocation, 24)?;
        meter.record(CostCategory::Invocation, 1)?;
        let number = input.as_i64().unwrap_or(0);
        Ok(Some(Value::from(number + 1)))
    }
}

/// Entry spinning through jump costs until the budget trips.
pub struct SpinningEntry;

impl EntryPoint for SpinningEntry {
    fn invoke(&self, _input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        for _ in 0..1_000 {
            meter.record(CostCategory::Jump, 1)?;
        }
        Ok(Some(Value::from(0)))
    }
}

/// Entry recording a fixed number of jumps, then returning.
pub struct BoundedJumpEntry {
    pub jumps: u64,
}

impl EntryPoint for BoundedJumpEntry {
    fn invoke(&self, _input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        meter.record(CostCategory::Jump, self.jumps)?;
        Ok(Some(Value::Null))
    }
}

/// Entry raising a sandboxed user throwable.
pub struct ThrowingEntry;

impl EntryPoint for ThrowingEntry {
    fn invoke(&self, _input: Value, _meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        Err(InvocationFault::Thrown {
            class_name: "sandbox/com/example/JobFailure$Thrown".to_owned(),
            message: "job constraint violated".to_owned(),
        })
    }
}

/// Entry overflowing the sandboxed stack; the message carries frames.
pub struct OverflowingEntry;

impl EntryPoint for OverflowingEntry {
    fn invoke(&self, _input: Value, _meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        Err(InvocationFault::StackOverflow {
            message: "recursion limit reached\n  at sandbox/com/example/Deep.dive\n  at sandbox/com/example/Deep.dive"
                .to_owned(),
        })
    }
}

/// Entry recording one invocation, then stalling well past any deadline.
pub struct StallingEntry;

impl EntryPoint for StallingEntry {
    fn invoke(&self, _input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        meter.record(CostCategory::Invocation, 1)?;
        thread::sleep(Duration::from_secs(5));
        Ok(Some(Value::from(0)))
    }
}

/// Entry failing outside the fault taxonomy.
pub struct PanickingEntry;

impl EntryPoint for PanickingEntry {
    #[expect(
        clippy::panic_in_result_fn,
        reason = "exercises panic capture at the isolation boundary"
    )]
    fn invoke(&self, _input: Value, _meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        panic!("entry imploded")
    }
}

/// Entry doubling the `amount` field of a structured input.
pub struct DoublingEntry;

impl EntryPoint for DoublingEntry {
    fn invoke(&self, input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault> {
        meter.record(CostCategory::Invocation, 1)?;
        let amount = input.get("amount").and_then(Value::as_i64).unwrap_or(0);
        Ok(Some(serde_json::json!({ "doubled": amount * 2 })))
    }
}

/// Loader serving classes from an in-memory map.
#[derive(Clone, Default)]
pub struct FixtureLoader {
    classes: BTreeMap<String, LoadedClass>,
}

impl FixtureLoader {
    /// Adds an entry class exposing the given entry operation.
    pub fn with_entry(mut self, name: &str, entry: Arc<dyn EntryPoint>) -> Self {
        let class = LoadedClass::new(name, Some("java/lang/Object".to_owned()), vec![0xCA, 0xFE])
            .with_entry_point(entry);
        self.classes.insert(name.to_owned(), class);
        self
    }

    /// Adds a class with no entry operation.
    pub fn with_plain_class(mut self, name: &str) -> Self {
        let class = LoadedClass::new(name, Some("java/lang/Object".to_owned()), vec![0xCA, 0xFE]);
        self.classes.insert(name.to_owned(), class);
        self
    }
}

impl ClassLoader for FixtureLoader {
    fn load(
        &self,
        source: &ClassSource,
        context: &mut AnalysisContext,
    ) -> Result<LoadedClass, LoadError> {
        let fixture = self
            .classes
            .get(source.binary_name())
            .ok_or_else(|| LoadError::NotFound {
                binary_name: source.binary_name().to_owned(),
            })?;
        context.record_class(fixture.clone());
        Ok(fixture.clone())
    }
}

/// Extractor reporting no references at all.
pub struct NoReferences;

impl ReferenceExtractor for NoReferences {
    fn references_of(&self, _class: &LoadedClass, _analyze_annotations: bool) -> Vec<String> {
        Vec::new()
    }
}

/// Extractor reporting the same references for every class.
pub struct FixedReferences(pub Vec<String>);

impl ReferenceExtractor for FixedReferences {
    fn references_of(&self, _class: &LoadedClass, _analyze_annotations: bool) -> Vec<String> {
        self.0.clone()
    }
}

/// Executor over the fixture loader with no discovered references.
pub fn executor(loader: FixtureLoader) -> SandboxExecutor {
    SandboxExecutor::new(configuration(), Arc::new(loader), Arc::new(NoReferences))
}
