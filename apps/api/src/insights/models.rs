use serde::{Deserialize, Serialize};

use crate::interpret::OutputContract;

const MAX_YEARS_EXPERIENCE: f32 = 60.0;

/// Career profile submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub current_title: Option<String>,
    pub years_experience: f32,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
}

impl UserProfile {
    pub fn validate(&self) -> Result<(), String> {
        if self.country.trim().is_empty() {
            return Err("country cannot be empty".to_string());
        }
        if !self.years_experience.is_finite()
            || !(0.0..=MAX_YEARS_EXPERIENCE).contains(&self.years_experience)
        {
            return Err(format!(
                "years_experience must be between 0 and {MAX_YEARS_EXPERIENCE}"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecommendation {
    pub title: String,
    /// 0 – 100
    pub match_score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub priority: String,
    pub how_to_close: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInsights {
    pub currency: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Structured career insights recovered from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerInsightsResponse {
    pub summary: String,
    pub recommended_roles: Vec<RoleRecommendation>,
    pub skill_gaps: Vec<SkillGap>,
    #[serde(default)]
    pub salary_insights: Option<SalaryInsights>,
    #[serde(default)]
    pub market_outlook: String,
    pub next_steps: Vec<String>,
}

impl OutputContract for CareerInsightsResponse {
    fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary cannot be empty".to_string());
        }
        if let Some(role) = self.recommended_roles.iter().find(|r| r.match_score > 100) {
            return Err(format!(
                "recommended_roles: match_score for '{}' must be 0-100, got {}",
                role.title, role.match_score
            ));
        }
        if let Some(salary) = &self.salary_insights {
            if salary.min > salary.max {
                return Err(format!(
                    "salary_insights: min ({}) exceeds max ({})",
                    salary.min, salary.max
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::{interpret, InterpretError};

    fn profile(country: &str, years: f32) -> UserProfile {
        serde_json::from_value(serde_json::json!({
            "country": country,
            "years_experience": years,
        }))
        .unwrap()
    }

    const INSIGHTS: &str = r#"{
        "summary": "Strong backend profile for the Gulf market.",
        "recommended_roles": [
            {"title": "Senior Backend Engineer", "match_score": 85, "reason": "5 years of Go"}
        ],
        "skill_gaps": [
            {"skill": "Kubernetes", "priority": "high", "how_to_close": "CKA certification"}
        ],
        "salary_insights": {"currency": "AED", "min": 25000, "max": 35000},
        "market_outlook": "Demand is growing in Dubai and Riyadh.",
        "next_steps": ["Update LinkedIn", "Apply to 5 fintechs"]
    }"#;

    #[test]
    fn test_profile_defaults_list_fields() {
        let p = profile("Jordan", 3.0);
        assert!(p.skills.is_empty());
        assert!(p.target_roles.is_empty());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_profile_rejects_blank_country() {
        assert!(profile("  ", 3.0).validate().is_err());
    }

    #[test]
    fn test_profile_rejects_negative_experience() {
        assert!(profile("Egypt", -1.0).validate().is_err());
    }

    #[test]
    fn test_full_insights_deserialize() {
        let insights: CareerInsightsResponse = interpret(INSIGHTS).unwrap();
        assert_eq!(insights.recommended_roles[0].match_score, 85);
        assert_eq!(insights.salary_insights.unwrap().currency, "AED");
        assert_eq!(insights.next_steps.len(), 2);
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let raw = r#"{"summary": "ok", "recommended_roles": [], "skill_gaps": [], "next_steps": []}"#;
        let insights: CareerInsightsResponse = interpret(raw).unwrap();
        assert!(insights.salary_insights.is_none());
        assert!(insights.market_outlook.is_empty());
    }

    #[test]
    fn test_missing_next_steps_fails_validation() {
        let raw = r#"{"summary": "ok", "recommended_roles": [], "skill_gaps": []}"#;
        match interpret::<CareerInsightsResponse>(raw).unwrap_err() {
            InterpretError::Validation(msg) => assert!(msg.contains("next_steps")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_match_score_fails_validation() {
        let raw = r#"{"summary": "ok", "skill_gaps": [], "next_steps": [],
            "recommended_roles": [{"title": "PM", "match_score": 140, "reason": "x"}]}"#;
        let err = interpret::<CareerInsightsResponse>(raw).unwrap_err();
        assert!(err.to_string().contains("match_score"));
    }

    #[test]
    fn test_inverted_salary_range_fails_validation() {
        let raw = r#"{"summary": "ok", "recommended_roles": [], "skill_gaps": [], "next_steps": [],
            "salary_insights": {"currency": "SAR", "min": 9000, "max": 4000}}"#;
        assert_eq!(
            interpret::<CareerInsightsResponse>(raw).unwrap_err().kind(),
            "validation_error"
        );
    }

    #[test]
    fn test_blank_summary_fails_validation() {
        let raw = r#"{"summary": " ", "recommended_roles": [], "skill_gaps": [], "next_steps": []}"#;
        assert!(interpret::<CareerInsightsResponse>(raw).is_err());
    }
}
