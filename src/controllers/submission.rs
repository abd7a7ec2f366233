use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::FormCatalog;
use crate::models::{DraftError, FieldErrors, FieldName, ProfileImage, User, UserDraft};
use crate::notify::Notifier;
use crate::schemas::CreateUserForm;
use crate::services::{ServiceError, UserService};
use crate::signal::RefreshSignal;
use crate::utils::validation::validate_form;

/// Why a submission did not create a user. The form stays usable after any of them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected locally; no request was sent.
    #[error("draft failed validation on {} field(s)", .0.len())]
    ClientValidation(FieldErrors),
    /// The server rejected specific fields.
    #[error("server rejected {} field(s)", .0.len())]
    ServerValidation(FieldErrors),
    /// Anything else: transport failure or an unstructured server error.
    #[error("submission failed: {0}")]
    Unknown(String),
}

/// Owns the draft and its field errors and drives the create workflow.
///
/// `submit` takes `&mut self`, so a second submission cannot start while one
/// is in flight on the same controller.
pub struct SubmissionController {
    service: Arc<dyn UserService>,
    catalog: Arc<FormCatalog>,
    notifier: Arc<dyn Notifier>,
    signal: RefreshSignal,
    draft: UserDraft,
    errors: FieldErrors,
}

impl SubmissionController {
    pub fn new(
        service: Arc<dyn UserService>,
        catalog: Arc<FormCatalog>,
        notifier: Arc<dyn Notifier>,
        signal: RefreshSignal,
    ) -> Self {
        let draft = UserDraft::with_role(catalog.roles.default_role().id);
        Self {
            service,
            catalog,
            notifier,
            signal,
            draft,
            errors: FieldErrors::new(),
        }
    }

    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn catalog(&self) -> &FormCatalog {
        &self.catalog
    }

    /// The draft a fresh form starts with.
    pub fn default_draft(&self) -> UserDraft {
        UserDraft::with_role(self.catalog.roles.default_role().id)
    }

    /// Replace one text field. Validation waits for `submit`.
    pub fn update_field(
        &mut self,
        field: FieldName,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        self.draft = self.draft.clone().with_text(field, value)?;
        Ok(())
    }

    pub fn update_profile_image(&mut self, image: ProfileImage) {
        self.draft = self.draft.clone().with_profile_image(image);
    }

    /// Select a role. Ids outside the role catalog are refused.
    pub fn update_role(&mut self, role_id: i64) -> Result<(), DraftError> {
        if !self.catalog.roles.contains(role_id) {
            return Err(DraftError::UnknownRole(role_id));
        }
        self.draft = self.draft.clone().with_role_id(role_id);
        Ok(())
    }

    /// Validate the draft and, if it passes, send it to the users service.
    ///
    /// On success the draft is reset, a success notice is shown and a
    /// [`crate::signal::UsersChanged`] event is published. Server field errors
    /// replace the current errors wholesale; other failures only raise a
    /// generic notice and leave the errors empty.
    pub async fn submit(&mut self) -> Result<Option<User>, SubmitError> {
        self.errors.clear();

        let errors = validate_form(&self.draft, &self.catalog.messages);
        if !errors.is_empty() {
            debug!(fields = errors.len(), "Draft rejected before sending");
            self.errors = errors.clone();
            return Err(SubmitError::ClientValidation(errors));
        }

        let Some(form) = CreateUserForm::from_draft(&self.draft) else {
            let mut errors = FieldErrors::new();
            errors.insert(FieldName::ProfileImage, self.catalog.messages.invalid_image.clone());
            self.errors = errors.clone();
            return Err(SubmitError::ClientValidation(errors));
        };

        match self.service.create(form).await {
            Ok(created) => {
                self.notifier.success(&self.catalog.toasts.user_added);
                self.draft = self.default_draft();
                let generation = self.signal.publish(created.clone());
                info!(
                    generation,
                    user_id = created.as_ref().map(|u| u.id),
                    "User created"
                );
                Ok(created)
            }
            Err(ServiceError::Validation(errors)) => {
                warn!(fields = errors.len(), "Server rejected the draft");
                self.errors = errors.clone();
                Err(SubmitError::ServerValidation(errors))
            }
            Err(e) => {
                error!(error = %e, "Failed to create user");
                self.notifier.failure(&self.catalog.toasts.something_went_wrong);
                Err(SubmitError::Unknown(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::PartValue;
    use crate::test_helpers::{
        FakeUserService, RecordingNotifier, sample_image, sample_user, valid_draft,
    };

    struct Harness {
        service: Arc<FakeUserService>,
        notifier: Arc<RecordingNotifier>,
        signal: RefreshSignal,
        controller: SubmissionController,
    }

    fn harness() -> Harness {
        let service = Arc::new(FakeUserService::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let signal = RefreshSignal::new();
        let controller = SubmissionController::new(
            service.clone(),
            Arc::new(FormCatalog::default()),
            notifier.clone(),
            signal.clone(),
        );
        Harness {
            service,
            notifier,
            signal,
            controller,
        }
    }

    fn fill(controller: &mut SubmissionController) {
        let d = valid_draft();
        controller.update_field(FieldName::Name, d.name).unwrap();
        controller.update_field(FieldName::Email, d.email).unwrap();
        controller.update_field(FieldName::Phone, d.phone).unwrap();
        controller.update_field(FieldName::Description, d.description).unwrap();
        controller.update_profile_image(sample_image());
    }

    #[test]
    fn starts_with_the_default_role() {
        let h = harness();
        assert_eq!(h.controller.draft().role_id, 1);
        assert!(h.controller.errors().is_empty());
    }

    #[test]
    fn update_role_refuses_unknown_ids() {
        let mut h = harness();
        assert_eq!(h.controller.update_role(99), Err(DraftError::UnknownRole(99)));
        assert_eq!(h.controller.draft().role_id, 1);
        h.controller.update_role(2).unwrap();
        assert_eq!(h.controller.draft().role_id, 2);
    }

    #[test]
    fn updates_do_not_validate() {
        let mut h = harness();
        h.controller.update_field(FieldName::Name, "x").unwrap();
        assert!(h.controller.errors().is_empty());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_service() {
        let mut h = harness();
        fill(&mut h.controller);
        h.controller.update_field(FieldName::Email, "foo@bar").unwrap();

        let err = h.controller.submit().await.unwrap_err();
        let SubmitError::ClientValidation(errors) = err else {
            panic!("expected client validation failure");
        };
        assert!(errors.contains(FieldName::Email));
        assert_eq!(h.controller.errors(), &errors);
        assert!(h.service.created().is_empty());
        assert!(h.notifier.failures().is_empty());
        assert_eq!(h.signal.generation(), 0);
    }

    #[tokio::test]
    async fn pristine_form_fails_on_the_missing_image() {
        let mut h = harness();
        let err = h.controller.submit().await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::ClientValidation(ref e) if e.contains(FieldName::ProfileImage)
        ));
        assert!(h.service.created().is_empty());
    }

    #[tokio::test]
    async fn valid_draft_sends_one_request_with_six_parts() {
        let mut h = harness();
        fill(&mut h.controller);
        h.controller.update_role(3).unwrap();
        h.service.push_create(Ok(Some(sample_user(7, "Grace Hopper"))));

        let created = h.controller.submit().await.unwrap();
        assert_eq!(created.map(|u| u.id), Some(7));

        let sent = h.service.created();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].parts().len(), 6);
        assert_eq!(sent[0].text(FieldName::Email), Some("grace@example.com"));
        assert_eq!(sent[0].text(FieldName::RoleId), Some("3"));
        assert!(matches!(sent[0].part(FieldName::ProfileImage), Some(PartValue::File(_))));
    }

    #[tokio::test]
    async fn success_resets_the_draft_and_fires_the_signal_once() {
        let mut h = harness();
        let mut events = h.signal.subscribe();
        fill(&mut h.controller);
        h.controller.update_role(2).unwrap();

        h.controller.submit().await.unwrap();

        assert_eq!(h.controller.draft(), &h.controller.default_draft());
        assert!(h.controller.errors().is_empty());
        assert_eq!(h.signal.generation(), 1);
        assert_eq!(events.recv().await.unwrap().generation, 1);
        assert!(events.try_recv().is_err());
        assert_eq!(h.notifier.successes(), vec!["User added successfully!".to_string()]);
    }

    #[tokio::test]
    async fn server_field_errors_are_adopted_verbatim() {
        let mut h = harness();
        fill(&mut h.controller);
        let mut server = FieldErrors::new();
        server.insert(FieldName::Email, "taken");
        h.service.push_create(Err(ServiceError::Validation(server.clone())));

        let err = h.controller.submit().await.unwrap_err();
        assert_eq!(err, SubmitError::ServerValidation(server.clone()));
        assert_eq!(h.controller.errors(), &server);
        assert_eq!(h.controller.errors().len(), 1);
        // The draft is kept so the user can correct it.
        assert_eq!(h.controller.draft().email, "grace@example.com");
        assert!(h.notifier.failures().is_empty());
        assert_eq!(h.signal.generation(), 0);
    }

    #[tokio::test]
    async fn empty_server_error_map_is_adopted_without_a_notice() {
        let mut h = harness();
        fill(&mut h.controller);
        h.service.push_create(Err(ServiceError::Validation(FieldErrors::new())));

        let err = h.controller.submit().await.unwrap_err();
        assert_eq!(err, SubmitError::ServerValidation(FieldErrors::new()));
        assert!(h.controller.errors().is_empty());
        assert!(h.notifier.failures().is_empty());
        assert!(h.notifier.successes().is_empty());
        assert_eq!(h.signal.generation(), 0);
    }

    #[tokio::test]
    async fn unstructured_failure_only_notifies() {
        let mut h = harness();
        fill(&mut h.controller);
        h.service.push_create(Err(ServiceError::Status {
            status: 500,
            message: "Server Error".into(),
        }));

        let err = h.controller.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Unknown(_)));
        assert!(h.controller.errors().is_empty());
        assert_eq!(h.notifier.failures(), vec!["Something went wrong!".to_string()]);
        assert!(h.notifier.successes().is_empty());
        assert_eq!(h.signal.generation(), 0);
    }

    #[tokio::test]
    async fn errors_are_cleared_at_the_start_of_each_attempt() {
        let mut h = harness();
        assert!(h.controller.submit().await.is_err());
        assert!(!h.controller.errors().is_empty());

        fill(&mut h.controller);
        h.controller.submit().await.unwrap();
        assert!(h.controller.errors().is_empty());
    }

    #[tokio::test]
    async fn form_is_resubmittable_after_a_failure() {
        let mut h = harness();
        fill(&mut h.controller);
        h.service.push_create(Err(ServiceError::Decode("garbage".into())));
        assert!(h.controller.submit().await.is_err());

        h.controller.submit().await.unwrap();
        assert_eq!(h.service.created().len(), 2);
        assert_eq!(h.signal.generation(), 1);
    }
}
