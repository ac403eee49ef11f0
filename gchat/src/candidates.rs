use gprovider::{ModelRoster, ModelSelector, ProviderError};

/// Position within one request's model roster.
#[derive(Debug, Clone)]
pub(crate) struct CandidateCursor {
    roster: ModelRoster,
    index: usize,
    promoted: bool,
}

impl CandidateCursor {
    /// Current selection first, then the selector's fallback list.
    pub(crate) async fn open(selector: &dyn ModelSelector) -> Self {
        let current = selector.select_current().await;
        let roster = ModelRoster::from_candidates(
            std::iter::once(current).chain(selector.fallback_list()),
        );
        Self {
            roster,
            index: 0,
            promoted: false,
        }
    }

    pub(crate) fn current(&self) -> Option<&str> {
        self.roster.get(self.index)
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Moves past a candidate the backend reported as unusable.
    pub(crate) fn reject(&mut self, selector: &dyn ModelSelector, error: &ProviderError) {
        let model = self.current().unwrap_or_default();
        tracing::warn!(
            phase = "model_fallback",
            model = model,
            candidate_index = self.index,
            error = %error,
            "model unusable; trying next candidate"
        );

        if self.index == 0 {
            selector.invalidate();
        }
        self.index += 1;
    }

    /// Records a working fallback candidate with the selector once per request.
    pub(crate) fn accept(&mut self, selector: &dyn ModelSelector) {
        if self.index == 0 || self.promoted {
            return;
        }
        if let Some(model) = self.roster.get(self.index) {
            selector.force_candidate(model);
            self.promoted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use gprovider::FixedModelSelector;

    use super::*;

    #[tokio::test]
    async fn cursor_walks_roster_and_promotes_fallback() {
        let selector = FixedModelSelector::new(["a", "b", "c"]);
        let mut cursor = CandidateCursor::open(&selector).await;

        assert_eq!(cursor.current(), Some("a"));
        cursor.reject(&selector, &ProviderError::model_unavailable("gone"));
        assert_eq!(selector.invalidations(), 1);
        assert_eq!(cursor.current(), Some("b"));

        cursor.accept(&selector);
        cursor.accept(&selector);
        assert_eq!(selector.fallback_list().first(), Some("b"));
        assert_eq!(cursor.index(), 1);

        cursor.reject(&selector, &ProviderError::model_unavailable("gone"));
        cursor.reject(&selector, &ProviderError::model_unavailable("gone"));
        assert_eq!(selector.invalidations(), 1);
        assert_eq!(cursor.current(), None);
    }
}
