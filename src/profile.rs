// src/profile.rs
//! Biography data the chat endpoint speaks for

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    /// One-line capability statement used in the introduction reply
    pub summary: String,
    pub education: Education,
    pub experience: Vec<Experience>,
    pub projects: Vec<String>,
    pub project_highlights: Vec<String>,
    pub skills: Vec<String>,
    pub core_abilities: Vec<String>,
    pub specialties: Vec<String>,
    /// Fields the greeting offers to talk about, e.g. "AI产品管理、建筑设计和研究"
    #[serde(default)]
    pub focus_areas: String,
    /// Closing line of the contact reply
    #[serde(default)]
    pub contact_note: String,
    /// Short names (beyond full company names) that mean "work experience"
    #[serde(default)]
    pub experience_keywords: Vec<String>,
    /// Short names (beyond full project names) that mean "projects"
    #[serde(default)]
    pub project_keywords: Vec<String>,
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub degrees: Vec<String>,
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
}

impl Profile {
    /// Load the profile from a YAML file, or fall back to the built-in one
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let profile = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read profile: {}", path.display()))?;
                let profile: Profile = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse profile: {}", path.display()))?;
                info!("Loaded profile for {} from {}", profile.name, path.display());
                profile
            }
            None => Self::builtin(),
        };

        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Profile must include a name");
        }
        Ok(())
    }

    /// Degrees joined for display, e.g. "香港大学硕士，长沙理工大学本科"
    pub fn degrees_line(&self) -> String {
        self.education.degrees.join("，")
    }

    pub fn honors_line(&self) -> String {
        self.education.honors.join("，")
    }

    /// The site owner's biography, compiled into the binary
    pub fn builtin() -> Self {
        Self {
            name: "李磊".to_string(),
            title: "AI产品经理".to_string(),
            summary: "他具备从前沿研究到产品落地的全链路能力，擅长以产品化方法探索和驱动AI技术的商业价值。"
                .to_string(),
            education: Education {
                degrees: vec!["香港大学硕士".to_string(), "长沙理工大学本科".to_string()],
                honors: vec!["湖南省优秀毕业生（前1%）".to_string()],
            },
            experience: vec![
                Experience {
                    company: "云鲸致人工智能".to_string(),
                    position: "AI产品经理".to_string(),
                    description: "主导云秒搭智能体平台0-1建设，识别准确率领先竞品15%".to_string(),
                },
                Experience {
                    company: "深圳市建筑设计研究总院".to_string(),
                    position: "建筑师".to_string(),
                    description: "开发参数化协同设计平台，将协同周期缩短37%".to_string(),
                },
                Experience {
                    company: "香港大学".to_string(),
                    position: "研究助理".to_string(),
                    description: "AIGC赋能建筑设计研究，成果发表于CAAD FUTURES 2025".to_string(),
                },
            ],
            projects: vec![
                "云秒搭智能体平台".to_string(),
                "建筑参数化协同设计平台".to_string(),
                "AR/VR建筑设计应用".to_string(),
                "深圳房价与微博情绪关系研究".to_string(),
            ],
            project_highlights: vec![
                "主导了云秒搭智能体平台的0-1建设，基于\"垂直行业解决方案工厂\"的核心战略。通过深度竞品分析与用户访谈，将识别准确率做到领先竞品15%。".to_string(),
                "开发了建筑参数化协同设计平台，将协同周期缩短37%，以及基于Unity的AR/VR建筑设计应用，为建筑行业带来了创新的解决方案。".to_string(),
                "参与了深圳房价与微博情绪关系的数据科学研究项目，与MIT学者合作，展现了跨学科研究方面的能力。".to_string(),
            ],
            skills: vec![
                "AI产品设计".to_string(),
                "市场分析".to_string(),
                "用户研究".to_string(),
                "Python".to_string(),
                "React".to_string(),
                "GPT-4V".to_string(),
                "Unity".to_string(),
                "机器学习".to_string(),
            ],
            core_abilities: vec![
                "AI产品设计".to_string(),
                "市场分析".to_string(),
                "用户研究".to_string(),
                "技术选型".to_string(),
            ],
            specialties: vec![
                "AI Agent".to_string(),
                "计算机视觉".to_string(),
                "AIGC".to_string(),
                "建筑参数化设计".to_string(),
            ],
            focus_areas: "AI产品管理、建筑设计和研究".to_string(),
            contact_note: "他很乐意与您交流AI产品管理和技术创新的话题！".to_string(),
            experience_keywords: vec!["云鲸致".to_string()],
            project_keywords: vec!["云秒搭".to_string()],
            contact: Contact {
                email: "lileiaad@connect.hku.hk".to_string(),
                phone: "(86) 15243684038".to_string(),
                linkedin: "linkedin.com/in/lilei".to_string(),
                github: "github.com/lilei".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_profile_is_valid() {
        let profile = Profile::load(None).unwrap();
        assert_eq!(profile.name, "李磊");
        assert_eq!(profile.experience.len(), 3);
        assert_eq!(profile.experience[0].company, "云鲸致人工智能");
    }

    #[test]
    fn test_load_profile_from_yaml() {
        let mut profile = Profile::builtin();
        profile.name = "Ada".to_string();
        let yaml = serde_yaml::to_string(&profile).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Profile::load(Some(file.path())).unwrap();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.projects, profile.projects);
        assert_eq!(loaded.project_keywords, vec!["云秒搭".to_string()]);
    }

    #[test]
    fn test_optional_wording_defaults_to_empty() {
        let mut value = serde_yaml::to_value(Profile::builtin()).unwrap();
        let map = value.as_mapping_mut().unwrap();
        for key in ["focus_areas", "contact_note", "experience_keywords", "project_keywords"] {
            map.remove(key);
        }

        let profile: Profile = serde_yaml::from_value(value).unwrap();
        assert!(profile.focus_areas.is_empty());
        assert!(profile.contact_note.is_empty());
        assert!(profile.experience_keywords.is_empty());
        assert!(profile.project_keywords.is_empty());
    }

    #[test]
    fn test_profile_without_name_is_rejected() {
        let mut profile = Profile::builtin();
        profile.name = "  ".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_missing_profile_file_is_an_error() {
        assert!(Profile::load(Some(Path::new("/nonexistent/profile.yaml"))).is_err());
    }
}
