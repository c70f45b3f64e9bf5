//! Multi-request setup pipeline for a provider.
//!
//! Progress lives in a serializable [`PipelineSession`] the server keeps
//! between requests. A session is only resumed if it was started for the same
//! organization and provider and the provider's step list has not changed
//! since; otherwise setup restarts from the first step.

use crate::error::PipelineError;
use crate::provider::{
    FormFields, IntegrationProvider, PipelineState, PipelineView, ProviderRegistry, StepOutcome,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use switchyard_core::{OrganizationSlug, ProviderKey, Result};
use tracing::{debug, warn};

/// Stored progress of one setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSession {
    pub organization: OrganizationSlug,
    pub provider: ProviderKey,
    pub signature: String,
    pub step: usize,
    pub state: PipelineState,
}

/// Result of a completed pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedSetup {
    pub provider: ProviderKey,
    /// Display name for the new integration.
    pub name: String,
    pub metadata: Map<String, JsonValue>,
}

/// What the caller should do after [`Pipeline::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineProgress {
    /// Respond with this step's HTML.
    Render(String),
    /// Every step is done.
    Finished(FinishedSetup),
}

/// A provider's pipeline bound to one session.
pub struct Pipeline {
    provider: Arc<dyn IntegrationProvider>,
    steps: Vec<Box<dyn PipelineView>>,
    session: PipelineSession,
}

impl Pipeline {
    /// Fingerprint of a step list; changes whenever steps are added,
    /// removed, or reordered.
    #[must_use]
    pub fn signature(steps: &[Box<dyn PipelineView>]) -> String {
        steps
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Starts a fresh pipeline.
    pub fn start(
        registry: &ProviderRegistry,
        organization: OrganizationSlug,
        provider: &ProviderKey,
    ) -> Result<Self, PipelineError> {
        Self::resume(registry, organization, provider, None)
    }

    /// Resumes `stored` if it still matches, otherwise starts fresh.
    pub fn resume(
        registry: &ProviderRegistry,
        organization: OrganizationSlug,
        provider: &ProviderKey,
        stored: Option<PipelineSession>,
    ) -> Result<Self, PipelineError> {
        let found = registry
            .get(provider)
            .ok_or_else(|| PipelineError::UnknownProvider {
                key: provider.clone(),
            })?;
        let steps = found.pipeline();
        let signature = Self::signature(&steps);

        let session = match stored {
            Some(s)
                if s.organization == organization
                    && s.provider == *provider
                    && s.signature == signature =>
            {
                s
            }
            Some(s) => {
                warn!(
                    org = %organization,
                    provider = %provider,
                    stored_org = %s.organization,
                    stored_provider = %s.provider,
                    "stored setup session does not match, restarting"
                );
                Self::fresh(organization, provider, signature)
            }
            None => Self::fresh(organization, provider, signature),
        };

        Ok(Self {
            provider: found,
            steps,
            session,
        })
    }

    fn fresh(
        organization: OrganizationSlug,
        provider: &ProviderKey,
        signature: String,
    ) -> PipelineSession {
        PipelineSession {
            organization,
            provider: provider.clone(),
            signature,
            step: 0,
            state: PipelineState::default(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> PipelineSession {
        self.session
    }

    /// Runs the current step with `input`.
    ///
    /// A step that advances hands the same input to the next step, so a
    /// single submission can complete several steps.
    pub fn advance(&mut self, input: &FormFields) -> Result<PipelineProgress, PipelineError> {
        loop {
            let Some(step) = self.steps.get(self.session.step) else {
                return Ok(PipelineProgress::Finished(self.finish()));
            };

            match step.dispatch(input, &mut self.session.state) {
                StepOutcome::Render(html) => return Ok(PipelineProgress::Render(html)),
                StepOutcome::Advance => {
                    debug!(
                        provider = %self.session.provider,
                        step = step.name(),
                        "pipeline step complete"
                    );
                    self.session.step += 1;
                }
                StepOutcome::Fail(message) => {
                    return Err(PipelineError::StepFailed {
                        provider: self.session.provider.clone(),
                        step: step.name().to_string(),
                        message,
                    }
                    .into());
                }
            }
        }
    }

    fn finish(&self) -> FinishedSetup {
        let metadata = self.provider.build_metadata(&self.session.state);
        let name = metadata
            .get("name")
            .and_then(JsonValue::as_str)
            .unwrap_or_else(|| self.provider.name())
            .to_string();
        FinishedSetup {
            provider: self.session.provider.clone(),
            name,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ExampleProvider;

    struct Ask(&'static str);

    impl PipelineView for Ask {
        fn name(&self) -> &'static str {
            self.0
        }

        fn dispatch(&self, input: &FormFields, state: &mut PipelineState) -> StepOutcome {
            match input.get(self.0) {
                Some(v) => {
                    state.bind(self.0, v.clone());
                    StepOutcome::Advance
                }
                None => StepOutcome::Render(format!("ask {}", self.0)),
            }
        }
    }

    struct TwoStep;

    impl IntegrationProvider for TwoStep {
        fn key(&self) -> ProviderKey {
            ProviderKey::from_static("two-step")
        }

        fn name(&self) -> &str {
            "Two Step"
        }

        fn pipeline(&self) -> Vec<Box<dyn PipelineView>> {
            vec![Box::new(Ask("host")), Box::new(Ask("token"))]
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::with_builtin();
        registry.register(Arc::new(TwoStep));
        registry
    }

    fn org() -> OrganizationSlug {
        OrganizationSlug::from_static("acme")
    }

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = Pipeline::start(&registry(), org(), &ProviderKey::from_static("slack"));
        let err = result.err().expect("should fail");
        assert!(err.to_string().contains("slack"));
    }

    #[test]
    fn example_pipeline_renders_then_finishes() {
        let mut pipeline =
            Pipeline::start(&registry(), org(), &ProviderKey::from_static("example"))
                .expect("start");

        let progress = pipeline.advance(&FormFields::new()).expect("advance");
        assert!(matches!(progress, PipelineProgress::Render(_)));
        assert_eq!(pipeline.session().step, 0);

        let progress = pipeline
            .advance(&fields(&[("name", "Ops tracker")]))
            .expect("advance");
        let PipelineProgress::Finished(done) = progress else {
            panic!("expected completion");
        };
        assert_eq!(done.name, "Ops tracker");
        assert_eq!(done.provider.as_str(), "example");
        assert_eq!(done.metadata.get("name"), Some(&JsonValue::from("Ops tracker")));
    }

    #[test]
    fn session_resumes_across_requests() {
        let key = ProviderKey::from_static("two-step");
        let mut first = Pipeline::start(&registry(), org(), &key).expect("start");
        first
            .advance(&fields(&[("host", "example.com")]))
            .expect("advance");
        let stored = first.into_session();
        assert_eq!(stored.step, 1);

        let mut second =
            Pipeline::resume(&registry(), org(), &key, Some(stored)).expect("resume");
        let progress = second
            .advance(&fields(&[("token", "t0k")]))
            .expect("advance");
        let PipelineProgress::Finished(done) = progress else {
            panic!("expected completion");
        };
        assert_eq!(done.name, "Two Step");
        assert_eq!(second.session().state.fetch("host"), Some("example.com"));
    }

    #[test]
    fn one_submission_can_complete_several_steps() {
        let key = ProviderKey::from_static("two-step");
        let mut pipeline = Pipeline::start(&registry(), org(), &key).expect("start");
        let progress = pipeline
            .advance(&fields(&[("host", "h"), ("token", "t")]))
            .expect("advance");
        assert!(matches!(progress, PipelineProgress::Finished(_)));
    }

    #[test]
    fn mismatched_session_restarts() {
        let key = ProviderKey::from_static("two-step");
        let stale = PipelineSession {
            organization: org(),
            provider: key.clone(),
            signature: "host".to_string(),
            step: 1,
            state: PipelineState::default(),
        };
        let pipeline = Pipeline::resume(&registry(), org(), &key, Some(stale)).expect("resume");
        assert_eq!(pipeline.session().step, 0);
        assert_eq!(pipeline.session().signature, "host,token");

        let other_org = PipelineSession {
            organization: OrganizationSlug::from_static("globex"),
            ..pipeline.session().clone()
        };
        let pipeline =
            Pipeline::resume(&registry(), org(), &key, Some(other_org)).expect("resume");
        assert_eq!(pipeline.session().organization, org());
    }

    #[test]
    fn failing_step_reports_provider_and_step() {
        let mut pipeline = Pipeline::start(
            &registry(),
            org(),
            &ExampleProvider.key(),
        )
        .expect("start");
        let err = pipeline
            .advance(&fields(&[("name", "")]))
            .expect_err("blank name fails");
        let text = err.to_string();
        assert!(text.contains("example"));
        assert!(text.contains("example.setup"));
    }
}
