use crate::assess::{
    Decision, NormalizedAssessment, RetryDiagnostics, RubricSubscores, ScoreBreakdown,
};
use crate::candidate::Candidate;
use crate::crawl::EvidenceBundle;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One report row: everything decided about a candidate.
///
/// Scores and subscores are absent when scoring failed or was skipped;
/// they are never filled with defaults.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRecord {
    pub run_id: String,
    pub candidate_id: String,
    pub title: String,
    pub tool_name: String,
    pub homepage: Option<String>,
    pub documentation: Vec<String>,
    pub repository: Vec<String>,
    pub publication_ids: Vec<String>,
    pub origin_types: Vec<String>,
    pub evidence: EvidenceBundle,
    pub subscores: Option<RubricSubscores>,
    pub scores: Option<ScoreBreakdown>,
    pub decision: Decision,
    pub diagnostics: RetryDiagnostics,
    pub concise_description: String,
    pub rationale: String,
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_error: Option<String>,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentRecord {
    /// Row without model output; the decision explains why.
    pub fn unscored(
        run_id: &str,
        candidate: &Candidate,
        evidence: EvidenceBundle,
        decision: Decision,
        diagnostics: RetryDiagnostics,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            candidate_id: candidate.key().to_string(),
            title: candidate.title.clone(),
            tool_name: candidate.title.clone(),
            homepage: candidate.homepage.clone(),
            documentation: candidate.documentation.clone(),
            repository: candidate.repository.clone(),
            publication_ids: candidate.publication_ids.clone(),
            origin_types: candidate
                .origin_types()
                .into_iter()
                .map(String::from)
                .collect(),
            evidence,
            subscores: None,
            scores: None,
            decision,
            diagnostics,
            concise_description: candidate.description.clone(),
            rationale: String::new(),
            notes: Vec::new(),
            scoring_error: None,
            assessed_at: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.scoring_error = Some(error.to_string());
        self
    }

    /// Take names, identifiers and scores from a normalized response.
    pub fn with_assessment(mut self, assessment: NormalizedAssessment) -> Self {
        self.tool_name = assessment.tool_name;
        if assessment.homepage.is_some() {
            self.homepage = assessment.homepage;
        }
        self.publication_ids = assessment.publication_ids;
        self.subscores = Some(assessment.subscores);
        self.scores = Some(assessment.scores);
        self.concise_description = assessment.concise_description;
        self.rationale = assessment.rationale;
        self.notes = assessment.notes;
        self
    }

    pub fn scoring_failed(&self) -> bool {
        self.scoring_error.is_some()
    }
}
