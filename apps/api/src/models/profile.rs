//! The structured profile record — the caller's persisted portfolio,
//! distinct from any transient review session.

use serde::{Deserialize, Serialize};

/// Closed set of profile fields a reviewed section can sync into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    SelfIntroduction,
    Experience,
    Internship,
    Extracurricular,
    Awards,
    CustomQuestions,
    AdditionalInfo,
    Projects,
}

impl ProfileField {
    /// Resolves a wire-level field name. Accepts camelCase and snake_case;
    /// anything else is unresolvable and the assignment is not actionable.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "selfIntroduction" | "self_introduction" => Some(ProfileField::SelfIntroduction),
            "experience" => Some(ProfileField::Experience),
            "internship" => Some(ProfileField::Internship),
            "extracurricular" => Some(ProfileField::Extracurricular),
            "awards" => Some(ProfileField::Awards),
            "customQuestions" | "custom_questions" => Some(ProfileField::CustomQuestions),
            "additionalInfo" | "additional_info" => Some(ProfileField::AdditionalInfo),
            "projects" => Some(ProfileField::Projects),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::SelfIntroduction => "selfIntroduction",
            ProfileField::Experience => "experience",
            ProfileField::Internship => "internship",
            ProfileField::Extracurricular => "extracurricular",
            ProfileField::Awards => "awards",
            ProfileField::CustomQuestions => "customQuestions",
            ProfileField::AdditionalInfo => "additionalInfo",
            ProfileField::Projects => "projects",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
}

/// The structured profile. Cloning is a deep copy (owned strings and a
/// fully owned project list), which is what the sync engine's
/// copy-on-write contract relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    pub self_introduction: String,
    pub experience: String,
    pub internship: String,
    pub extracurricular: String,
    pub awards: String,
    pub custom_questions: String,
    pub additional_info: String,
    pub projects: Vec<ProjectEntry>,
}

impl ProfileRecord {
    /// Overwrites a scalar field. `Projects` is not a scalar and is handled
    /// by the sync engine's append path; passing it here is a no-op.
    pub fn set_scalar(&mut self, field: ProfileField, value: String) -> bool {
        match field {
            ProfileField::SelfIntroduction => self.self_introduction = value,
            ProfileField::Experience => self.experience = value,
            ProfileField::Internship => self.internship = value,
            ProfileField::Extracurricular => self.extracurricular = value,
            ProfileField::Awards => self.awards = value,
            ProfileField::CustomQuestions => self.custom_questions = value,
            ProfileField::AdditionalInfo => self.additional_info = value,
            ProfileField::Projects => return false,
        }
        true
    }
}
