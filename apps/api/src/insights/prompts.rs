// Career insight prompt templates.

use std::fmt::Write;

use crate::insights::models::UserProfile;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const SYSTEM_PROMPT_BODY: &str = "\
You are a career advisor specialised in the Middle East and North Africa (MENA) job market. \
Given a candidate profile, produce honest, practical career insights grounded in the \
candidate's country and experience. Do not invent credentials the candidate does not have.

Return a JSON object with EXACTLY this schema:
{
  \"summary\": \"2-3 sentence overview of the candidate's position\",
  \"recommended_roles\": [
    {\"title\": \"string\", \"match_score\": 0-100, \"reason\": \"string\"}
  ],
  \"skill_gaps\": [
    {\"skill\": \"string\", \"priority\": \"high\" | \"medium\" | \"low\", \"how_to_close\": \"string\"}
  ],
  \"salary_insights\": {\"currency\": \"ISO 4217 code\", \"min\": number, \"max\": number, \"notes\": \"string\"} | null,
  \"market_outlook\": \"string\",
  \"next_steps\": [\"string\"]
}";

/// Full system prompt: the schema description plus the JSON-only instruction.
pub fn system_prompt() -> String {
    format!("{SYSTEM_PROMPT_BODY}\n\n{JSON_ONLY_SYSTEM}")
}

pub fn build_user_prompt(profile: &UserProfile) -> String {
    let mut out = String::from("Candidate profile:\n");

    let optional = [
        ("Name", &profile.full_name),
        ("City", &profile.city),
        ("Current title", &profile.current_title),
        ("Education", &profile.education_level),
        ("Field of study", &profile.field_of_study),
    ];

    let _ = writeln!(out, "- Country: {}", profile.country.trim());
    let _ = writeln!(out, "- Years of experience: {}", profile.years_experience);
    for (label, value) in optional {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "- {label}: {v}");
        }
    }

    let lists = [
        ("Skills", &profile.skills),
        ("Languages", &profile.languages),
        ("Industries", &profile.industries),
        ("Target roles", &profile.target_roles),
    ];
    for (label, items) in lists {
        if !items.is_empty() {
            let _ = writeln!(out, "- {label}: {}", items.join(", "));
        }
    }

    if let Some(goals) = profile.career_goals.as_deref().filter(|g| !g.trim().is_empty()) {
        let _ = writeln!(out, "\nCareer goals:\n{}", goals.trim());
    }

    out.push_str("\nReturn ONLY the JSON object.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> UserProfile {
        serde_json::from_value(serde_json::json!({
            "full_name": "Layla Haddad",
            "country": "United Arab Emirates",
            "city": "  ",
            "years_experience": 4.5,
            "skills": ["Python", "SQL"],
            "target_roles": ["Data Engineer"],
            "career_goals": "Move into a lead role within two years."
        }))
        .unwrap()
    }

    #[test]
    fn test_user_prompt_includes_populated_fields() {
        let prompt = build_user_prompt(&sample_profile());
        assert!(prompt.contains("- Country: United Arab Emirates"));
        assert!(prompt.contains("- Years of experience: 4.5"));
        assert!(prompt.contains("- Name: Layla Haddad"));
        assert!(prompt.contains("- Skills: Python, SQL"));
        assert!(prompt.contains("- Target roles: Data Engineer"));
        assert!(prompt.contains("Move into a lead role"));
    }

    #[test]
    fn test_user_prompt_skips_blank_and_empty_fields() {
        let prompt = build_user_prompt(&sample_profile());
        assert!(!prompt.contains("City"));
        assert!(!prompt.contains("Languages"));
    }

    #[test]
    fn test_system_prompt_names_every_required_field() {
        let prompt = system_prompt();
        for field in ["summary", "recommended_roles", "skill_gaps", "next_steps"] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("JSON"));
    }
}
