//! The extractor registry: a process-wide mapping from extractor id to
//! a factory function. Registration here is explicit, built at
//! bootstrap time, replacing the source system's module-load
//! side-effect registration (spec.md §9 redesign note).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::extractor::BaseExtractor;

pub type ExtractorFactory = Arc<dyn Fn() -> Arc<dyn BaseExtractor> + Send + Sync>;

#[derive(Default)]
pub struct ExtractorRegistry {
    factories: BTreeMap<String, ExtractorFactory>,
    /// Insertion order for extractors in the order they were
    /// registered with `bootstrap()`; phase-3 ordering among
    /// non-phase-1/2 extractors is otherwise undefined per spec.
    order: Vec<String>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        extractor_id: impl Into<String>,
        factory: impl Fn() -> Arc<dyn BaseExtractor> + Send + Sync + 'static,
    ) {
        let extractor_id = extractor_id.into();
        self.order.push(extractor_id.clone());
        self.factories.insert(extractor_id, Arc::new(factory));
    }

    pub fn build(&self, extractor_id: &str) -> Option<Arc<dyn BaseExtractor>> {
        self.factories.get(extractor_id).map(|f| f())
    }

    pub fn extractor_ids(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, extractor_id: &str) -> bool {
        self.factories.contains_key(extractor_id)
    }

    pub fn build_all(&self) -> Vec<Arc<dyn BaseExtractor>> {
        self.order.iter().filter_map(|id| self.build(id)).collect()
    }

    /// All registered extractors except the given ids (used by the
    /// orchestrator to exclude phase 1/2 singletons from phase 3).
    pub fn build_all_except(&self, excluded: &[&str]) -> Vec<Arc<dyn BaseExtractor>> {
        self.order
            .iter()
            .filter(|id| !excluded.contains(&id.as_str()))
            .filter_map(|id| self.build(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
    use async_trait::async_trait;
    use erp_coverage::TableExpectation;

    struct Stub(&'static str);

    #[async_trait]
    impl BaseExtractor for Stub {
        fn identity(&self) -> ExtractorIdentity {
            ExtractorIdentity {
                extractor_id: self.0.into(),
                name: self.0.into(),
                module: "test".into(),
                category: "test".into(),
            }
        }
        fn expected_tables(&self) -> Vec<TableExpectation> {
            vec![]
        }
        async fn extract_live(&self, _h: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
            Ok(ExtractorOutput::new(self.0))
        }
        async fn extract_offline(&self, h: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
            self.extract_live(h).await
        }
    }

    #[test]
    fn register_and_build() {
        let mut registry = ExtractorRegistry::new();
        registry.register("A", || Arc::new(Stub("A")));
        registry.register("B", || Arc::new(Stub("B")));

        assert!(registry.contains("A"));
        assert_eq!(registry.extractor_ids(), &["A".to_string(), "B".to_string()]);
        assert!(registry.build("MISSING").is_none());
        assert_eq!(registry.build_all().len(), 2);
    }

    #[test]
    fn build_all_except_excludes_phase_singletons() {
        let mut registry = ExtractorRegistry::new();
        registry.register("SYSTEM_INFO", || Arc::new(Stub("SYSTEM_INFO")));
        registry.register("DATA_DICTIONARY", || Arc::new(Stub("DATA_DICTIONARY")));
        registry.register("FINANCIALS", || Arc::new(Stub("FINANCIALS")));

        let rest = registry.build_all_except(&["SYSTEM_INFO", "DATA_DICTIONARY"]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].identity().extractor_id, "FINANCIALS");
    }
}
