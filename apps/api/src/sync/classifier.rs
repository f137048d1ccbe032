//! Field-Mapping Classifier — suggests which structured-profile field a
//! reviewed section most likely corresponds to, from its title alone.
//!
//! Pure and deterministic: keyword families per field, matched
//! case-insensitively. The result is a *suggestion* only; the sync engine
//! acts exclusively on caller-approved assignments.

use crate::models::profile::ProfileField;

/// Keyword families, checked in order. More specific families come first:
/// "インターンシップ経験" must resolve to `Internship`, not `Experience`.
const FAMILIES: &[(ProfileField, &[&str])] = &[
    (
        ProfileField::Internship,
        &["インターン", "intern", "就業体験"],
    ),
    (
        ProfileField::Awards,
        &["受賞", "表彰", "award", "prize", "入賞", "コンテスト", "contest"],
    ),
    (
        ProfileField::Projects,
        &["プロジェクト", "project", "制作", "作品", "ポートフォリオ", "portfolio", "開発物"],
    ),
    (
        ProfileField::SelfIntroduction,
        &["自己紹介", "自己pr", "プロフィール", "self-introduction", "about me", "profile"],
    ),
    (
        ProfileField::Extracurricular,
        &["課外", "部活", "サークル", "ボランティア", "ガクチカ", "学生時代", "extracurricular", "club", "volunteer"],
    ),
    (
        ProfileField::CustomQuestions,
        &["設問", "志望動機", "質問", "question", "motivation"],
    ),
    (
        ProfileField::Experience,
        &["経験", "経歴", "職務", "職歴", "experience", "work history", "career"],
    ),
    (
        ProfileField::AdditionalInfo,
        &["その他", "追加", "補足", "特記", "additional", "other", "misc"],
    ),
];

/// Suggests a profile field for a section title, or `None` when no keyword
/// family matches. Callers must not assume a suggestion exists.
pub fn suggest_field(section_title: &str) -> Option<ProfileField> {
    let title = section_title.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }
    FAMILIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(field, _)| *field)
}
