//! Evaluation prompts sent alongside the résumé image.
//!
//! Every prompt lives here so that changing the wording of an evaluation
//! means editing exactly one place, and so tests can inspect the templates
//! without a model in the loop.
//!
//! Each [`EvaluationPrompt`] variant is one of the three actions a user can
//! trigger. The variant carries no per-request state; it only selects an
//! immutable template, the label of its trigger, and the heading shown above
//! the model's answer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Template for the "Tell Me About the Resume" action.
pub const FIT_REVIEW_PROMPT: &str = r#"
You are an experienced Technical Human Resource Manager. Your task is to review the provided resume against the job description.
Please share your professional evaluation on whether the candidate's profile aligns with the role.
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.
"#;

/// Template for the "How Can I Improve My Skills" action.
pub const SKILL_IMPROVEMENT_PROMPT: &str = r#"
You are an expert career advisor. Suggest ways to improve the applicant's skills based on the provided resume and job description.
"#;

/// Template for the "Percentage Match" action.
pub const PERCENTAGE_MATCH_PROMPT: &str = r#"
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding of data science and ATS functionality.
Evaluate the resume against the provided job description. Give the percentage match, highlight missing keywords, and provide final thoughts.
"#;

/// The three evaluations a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPrompt {
    /// Strengths and weaknesses of the résumé against the role.
    FitReview,
    /// Suggestions for skills the applicant should build.
    SkillImprovement,
    /// ATS-style percentage match with missing keywords.
    PercentageMatch,
}

impl EvaluationPrompt {
    /// All actions, in the order their triggers are presented.
    pub const ALL: [EvaluationPrompt; 3] = [
        EvaluationPrompt::FitReview,
        EvaluationPrompt::SkillImprovement,
        EvaluationPrompt::PercentageMatch,
    ];

    /// The instruction template sent to the model.
    pub fn template(self) -> &'static str {
        match self {
            EvaluationPrompt::FitReview => FIT_REVIEW_PROMPT,
            EvaluationPrompt::SkillImprovement => SKILL_IMPROVEMENT_PROMPT,
            EvaluationPrompt::PercentageMatch => PERCENTAGE_MATCH_PROMPT,
        }
    }

    /// Label of the trigger that selects this prompt.
    pub fn label(self) -> &'static str {
        match self {
            EvaluationPrompt::FitReview => "Tell Me About the Resume",
            EvaluationPrompt::SkillImprovement => "How Can I Improve My Skills",
            EvaluationPrompt::PercentageMatch => "Percentage Match",
        }
    }

    /// Heading displayed above the model's answer.
    pub fn heading(self) -> &'static str {
        match self {
            EvaluationPrompt::SkillImprovement => "Suggestions to Improve Skills:",
            EvaluationPrompt::FitReview | EvaluationPrompt::PercentageMatch => "The Response is:",
        }
    }
}

impl fmt::Display for EvaluationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
