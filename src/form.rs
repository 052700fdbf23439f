use crate::client::GenerationBackend;
use crate::model::{DownloadLink, Field, GenerationResult, ProjectDraft};

/// Client-side state of the project submission form.
///
/// Lifecycle: idle -> submitting -> (succeeded | failed). The success/failure
/// display persists until the next submission attempt overwrites it, and the
/// draft is deliberately NOT reset after a successful submission so the user
/// can resubmit with edits.
pub struct SubmissionForm {
    draft: ProjectDraft,
    submitting: bool,
    succeeded: bool,
    result: Option<GenerationResult>,
    show_preview: bool,
}

impl SubmissionForm {
    pub fn new() -> Self {
        SubmissionForm {
            draft: ProjectDraft::default(),
            submitting: false,
            succeeded: false,
            result: None,
            show_preview: false,
        }
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    /// Replaces the draft wholesale with one updated field; numeric input
    /// coercion happens inside the draft transition.
    pub fn update_field(&mut self, field: Field, raw: &str) {
        let draft = std::mem::take(&mut self.draft);
        self.draft = draft.with_field(field, raw);
    }

    // ---- objectives -------------------------------------------------------

    pub fn add_objective(&mut self) {
        self.draft.objectives.push(String::new());
    }

    pub fn update_objective(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.draft.objectives.get_mut(index) {
            *slot = value.to_string();
        }
    }

    /// Removing the last remaining objective is not allowed; the UI disables
    /// the affordance via `can_remove_objectives`, and the operation itself
    /// refuses so the list never becomes empty.
    pub fn remove_objective(&mut self, index: usize) {
        if self.draft.objectives.len() > 1 && index < self.draft.objectives.len() {
            self.draft.objectives.remove(index);
        }
    }

    pub fn can_remove_objectives(&self) -> bool {
        self.draft.objectives.len() > 1
    }

    // ---- submission -------------------------------------------------------

    /// Builds the generation request from the current draft and performs one
    /// backend call. Re-entrant calls while a submission is in flight are
    /// ignored. Any backend error is recorded as the generic failure result;
    /// nothing propagates past this boundary, and the in-flight flag is
    /// cleared on every path.
    pub fn submit(&mut self, backend: &dyn GenerationBackend) {
        if self.submitting {
            return;
        }
        self.submitting = true;
        self.succeeded = false;

        let request = self.draft.to_request();
        match backend.generate(&request) {
            Ok(result) => {
                self.result = Some(result);
                self.succeeded = true;
            }
            Err(err) => {
                eprintln!("❌ Error generating DPR: {err}");
                self.result = Some(GenerationResult::failure());
            }
        }

        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn last_succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn result_message(&self) -> Option<&str> {
        self.result.as_ref().and_then(|r| r.message.as_deref())
    }

    /// Download affordances for the last result; empty when there is no
    /// result or the result carries no artifact paths.
    pub fn result_links(&self, base_url: &str) -> Vec<DownloadLink> {
        self.result
            .as_ref()
            .map(|r| r.download_links(base_url))
            .unwrap_or_default()
    }

    // ---- preview ----------------------------------------------------------

    pub fn set_preview_visible(&mut self, visible: bool) {
        self.show_preview = visible;
    }

    pub fn preview_visible(&self) -> bool {
        self.show_preview
    }

    /// Read-only textual dump of the current draft. Pure projection: no
    /// side effects, no network activity.
    pub fn preview(&self) -> String {
        serde_json::to_string_pretty(&self.draft).unwrap_or_default()
    }
}

impl Default for SubmissionForm {
    fn default() -> Self {
        SubmissionForm::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::model::GenerationRequest;

    struct OkBackend(GenerationResult);

    impl GenerationBackend for OkBackend {
        fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
            Ok(self.0.clone())
        }
    }

    struct FailBackend;

    impl GenerationBackend for FailBackend {
        fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
            Err(ClientError::Status(500))
        }
    }

    struct PanicBackend;

    impl GenerationBackend for PanicBackend {
        fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
            panic!("backend must not be called while a submission is in flight");
        }
    }

    #[test]
    fn numeric_field_update_never_stores_nan() {
        let mut form = SubmissionForm::new();
        form.update_field(Field::EstimatedCost, "not a number");
        assert_eq!(form.draft().estimated_cost, 0.0);
        form.update_field(Field::EstimatedCost, "NaN");
        assert!(!form.draft().estimated_cost.is_nan());
        assert_eq!(form.draft().estimated_cost, 0.0);
    }

    #[test]
    fn add_then_remove_restores_objectives() {
        let mut form = SubmissionForm::new();
        form.update_objective(0, "Increase yield");
        form.add_objective();
        form.update_objective(1, "Create jobs");
        let before = form.draft().objectives.clone();

        form.add_objective();
        form.remove_objective(2);
        assert_eq!(form.draft().objectives, before);
    }

    #[test]
    fn last_objective_cannot_be_removed() {
        let mut form = SubmissionForm::new();
        form.update_objective(0, "Only goal");
        assert!(!form.can_remove_objectives());
        form.remove_objective(0);
        assert_eq!(form.draft().objectives, vec!["Only goal"]);
    }

    #[test]
    fn update_objective_leaves_neighbours_untouched() {
        let mut form = SubmissionForm::new();
        form.update_objective(0, "first");
        form.add_objective();
        form.update_objective(1, "second");
        form.update_objective(0, "revised");
        assert_eq!(form.draft().objectives, vec!["revised", "second"]);
    }

    #[test]
    fn successful_submit_stores_result_and_clears_flag() {
        let mut form = SubmissionForm::new();
        form.update_field(Field::Title, "Solar Dryer");
        let backend = OkBackend(GenerationResult {
            docx: Some("out/report.docx".to_string()),
            ..Default::default()
        });

        form.submit(&backend);

        assert!(form.last_succeeded());
        assert!(!form.is_submitting());
        assert_eq!(form.result().unwrap().docx.as_deref(), Some("out/report.docx"));
        // Draft persists after success so the user can resubmit with edits.
        assert_eq!(form.draft().title, "Solar Dryer");
    }

    #[test]
    fn failed_submit_records_generic_failure() {
        let mut form = SubmissionForm::new();
        form.submit(&FailBackend);

        assert!(!form.last_succeeded());
        assert!(!form.is_submitting());
        assert_eq!(
            form.result_message(),
            Some("Failed to generate DPR. Check backend logs.")
        );
        assert!(form.result_links("http://localhost:8000").is_empty());
    }

    #[test]
    fn submit_is_ignored_while_in_flight() {
        let mut form = SubmissionForm::new();
        form.submitting = true;
        form.submit(&PanicBackend);
        assert!(form.result().is_none());
        assert!(form.is_submitting());
    }

    #[test]
    fn next_submission_overwrites_previous_outcome() {
        let mut form = SubmissionForm::new();
        form.submit(&FailBackend);
        assert!(!form.last_succeeded());

        form.submit(&OkBackend(GenerationResult::default()));
        assert!(form.last_succeeded());
        assert!(form.result_message().is_none());
    }

    #[test]
    fn preview_is_a_pure_projection() {
        let mut form = SubmissionForm::new();
        form.update_field(Field::Title, "Cold Storage");
        let preview = form.preview();
        assert!(preview.contains("\"title\": \"Cold Storage\""));
        assert!(form.result().is_none());
        assert!(!form.is_submitting());
    }
}
