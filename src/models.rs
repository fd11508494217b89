use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Summary,
    Skills,
    Education,
    Projects,
    Experience,
    Certifications,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Summary,
        Field::Skills,
        Field::Education,
        Field::Projects,
        Field::Experience,
        Field::Certifications,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Summary => "summary",
            Field::Skills => "skills",
            Field::Education => "education",
            Field::Projects => "projects",
            Field::Experience => "experience",
            Field::Certifications => "certifications",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Summary => "Summary",
            Field::Skills => "Skills",
            Field::Education => "Education",
            Field::Projects => "Projects",
            Field::Experience => "Experience",
            Field::Certifications => "Certifications",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Field {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Field {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The six free-text resume fields, serialized with the field keys the
/// recommendation API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDraft {
    pub summary: String,
    pub skills: String,
    pub education: String,
    pub projects: String,
    pub experience: String,
    pub certifications: String,
}

impl ResumeDraft {
    pub fn sample() -> Self {
        Self {
            summary: "Experienced software developer with a background in machine learning and cloud computing.".to_string(),
            skills: "Python, JavaScript, React, FastAPI, Docker, AWS".to_string(),
            education: "B.S. in Computer Science".to_string(),
            projects: "Developed a real-time recommendation engine for e-commerce.".to_string(),
            experience: "Software Engineer at Tech Corp, focused on backend services.".to_string(),
            certifications: "AWS Certified Developer".to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Summary => &self.summary,
            Field::Skills => &self.skills,
            Field::Education => &self.education,
            Field::Projects => &self.projects,
            Field::Experience => &self.experience,
            Field::Certifications => &self.certifications,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Summary => &mut self.summary,
            Field::Skills => &mut self.skills,
            Field::Education => &mut self.education,
            Field::Projects => &mut self.projects,
            Field::Experience => &mut self.experience,
            Field::Certifications => &mut self.certifications,
        }
    }

    /// True when at least one field has non-whitespace content.
    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().any(|f| !self.get(*f).trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub requirements: String,
}

impl RecommendationRecord {
    pub fn list_key(&self, index: usize) -> ListKey {
        ListKey {
            title: self.title.clone(),
            company: self.company.clone(),
            index,
        }
    }
}

/// Row identity for rendering. The API assigns no ids, so duplicates of the
/// same title and company stay distinct by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub title: String,
    pub company: String,
    pub index: usize,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
