// src/responder.rs
//! Keyword-matched canned replies about the profile owner. No I/O.

use crate::profile::Profile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use thiserror::Error;

const GREETING_KEYWORDS: &[&str] = &["你好", "hi", "hello", "您好", "嗨", "hey"];
const IDENTITY_KEYWORDS: &[&str] = &["介绍", "背景", "是谁", "简介"];
const EXPERIENCE_KEYWORDS: &[&str] = &["工作", "经验", "职业", "经历", "公司"];
const PROJECT_KEYWORDS: &[&str] = &["项目", "智能体", "平台", "产品"];
const SKILL_KEYWORDS: &[&str] = &["技能", "技术", "能力", "专长", "擅长"];
const CONTACT_KEYWORDS: &[&str] = &["联系", "邮箱", "电话", "微信", "怎么找", "contact"];
const FAREWELL_KEYWORDS: &[&str] = &["谢谢", "感谢", "再见", "拜拜", "thank"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocalReplyError {
    #[error("no message to reply to")]
    EmptyMessage,
    #[error("no reply template available for {0:?}")]
    NoTemplate(Topic),
}

/// Reply categories, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Identity,
    Experience,
    Projects,
    Skills,
    Contact,
    Farewell,
    Other,
}

/// Single source of randomness for template selection.
pub struct TemplatePicker {
    rng: Mutex<StdRng>,
}

impl TemplatePicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn pick<T>(&self, mut options: Vec<T>) -> Option<T> {
        if options.is_empty() {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = rng.random_range(0..options.len());
        Some(options.swap_remove(index))
    }
}

impl Default for TemplatePicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Decide which category a message falls into. First match wins.
pub fn classify(message: &str, profile: &Profile) -> Topic {
    let text = message.to_lowercase();
    let companies = profile
        .experience
        .iter()
        .map(|e| e.company.as_str())
        .chain(profile.experience_keywords.iter().map(String::as_str));
    let projects = profile
        .projects
        .iter()
        .chain(&profile.project_keywords)
        .map(String::as_str);

    if mentions(&text, GREETING_KEYWORDS.iter().copied()) {
        Topic::Greeting
    } else if mentions(&text, IDENTITY_KEYWORDS.iter().copied())
        || mentions(&text, [profile.name.as_str()])
    {
        Topic::Identity
    } else if mentions(&text, EXPERIENCE_KEYWORDS.iter().copied()) || mentions(&text, companies) {
        Topic::Experience
    } else if mentions(&text, PROJECT_KEYWORDS.iter().copied()) || mentions(&text, projects) {
        Topic::Projects
    } else if mentions(&text, SKILL_KEYWORDS.iter().copied()) {
        Topic::Skills
    } else if mentions(&text, CONTACT_KEYWORDS.iter().copied()) {
        Topic::Contact
    } else if mentions(&text, FAREWELL_KEYWORDS.iter().copied()) {
        Topic::Farewell
    } else {
        Topic::Other
    }
}

/// `text` must already be lower-cased
fn mentions<'a>(text: &str, keywords: impl IntoIterator<Item = &'a str>) -> bool {
    keywords.into_iter().any(|keyword| {
        let keyword = keyword.trim();
        !keyword.is_empty() && text.contains(&keyword.to_lowercase())
    })
}

/// Produce a canned reply for `message`.
pub fn local_reply(
    message: &str,
    profile: &Profile,
    picker: &TemplatePicker,
) -> Result<String, LocalReplyError> {
    if message.trim().is_empty() {
        return Err(LocalReplyError::EmptyMessage);
    }

    let topic = classify(message, profile);
    let reply = match topic {
        Topic::Greeting => picker.pick(greetings(profile)),
        Topic::Identity => Some(introduction(profile)),
        Topic::Experience => Some(experience_listing(profile)),
        Topic::Projects => picker.pick(
            profile
                .project_highlights
                .iter()
                .map(|h| format!("{}{}", profile.name, h))
                .collect::<Vec<_>>(),
        ),
        Topic::Skills => Some(skills_summary(profile)),
        Topic::Contact => Some(contact_card(profile)),
        Topic::Farewell => picker.pick(farewells(profile)),
        Topic::Other => picker.pick(prompts(profile)),
    };

    reply.ok_or(LocalReplyError::NoTemplate(topic))
}

pub fn greetings(profile: &Profile) -> Vec<String> {
    let name = &profile.name;
    vec![
        format!("你好！很高兴见到你！我是{name}的AI助手，可以为您介绍他的项目、研究经历和专业技能。有什么想了解的吗？"),
        if profile.focus_areas.is_empty() {
            format!("您好！欢迎访问{name}的个人网站！我可以为您详细介绍他的工作经历、项目成果和研究方向。")
        } else {
            format!(
                "您好！欢迎访问{name}的个人网站！我可以为您详细介绍他在{}领域的精彩经历。",
                profile.focus_areas
            )
        },
        format!(
            "Hi！我是{name}的智能助手，很高兴为您服务！他是一位经验丰富的{}，您想了解哪个方面呢？",
            profile.title
        ),
    ]
}

fn introduction(profile: &Profile) -> String {
    let mut credentials = vec![profile.degrees_line(), profile.honors_line()];
    credentials.retain(|c| !c.is_empty());

    format!(
        "{}是一位优秀的{}，{}。{}",
        profile.name,
        profile.title,
        credentials.join("，"),
        profile.summary
    )
}

fn experience_listing(profile: &Profile) -> String {
    let mut text = format!("{}拥有丰富的工作经验：\n\n", profile.name);
    for exp in &profile.experience {
        text.push_str(&format!(
            "🏢 {} - {}\n{}\n\n",
            exp.company, exp.position, exp.description
        ));
    }
    text.trim_end().to_string()
}

fn skills_summary(profile: &Profile) -> String {
    format!(
        "{}具备全面的专业技能：\n\n🎯 核心能力：{}\n💻 技术栈：{}\n🚀 专业领域：{}",
        profile.name,
        profile.core_abilities.join("、"),
        profile.skills.join(", "),
        profile.specialties.join("、")
    )
}

fn contact_card(profile: &Profile) -> String {
    let contact = &profile.contact;
    let closing = if profile.contact_note.is_empty() {
        "欢迎随时联系！".to_string()
    } else {
        format!("欢迎随时联系，{}", profile.contact_note)
    };
    format!(
        "很高兴您想要联系{}！以下是他的联系方式：\n\n📧 邮箱：{}\n📱 电话：{}\n💼 LinkedIn：{}\n💻 GitHub：{}\n\n{}",
        profile.name, contact.email, contact.phone, contact.linkedin, contact.github, closing
    )
}

pub fn farewells(profile: &Profile) -> Vec<String> {
    let name = &profile.name;
    vec![
        format!("非常感谢您对{name}的关注！如果您有任何其他问题，或者希望与{name}取得联系，请随时告诉我。祝您生活愉快！👋"),
        format!("不客气！欢迎随时回来了解{name}的最新动态。再见！👋"),
        format!("感谢您的来访！希望这些信息对您有帮助，期待您与{name}进一步交流。"),
    ]
}

pub fn prompts(profile: &Profile) -> Vec<String> {
    let name = &profile.name;
    let title = &profile.title;
    vec![
        format!("这是一个很有趣的问题！{name}有很多相关经验，您想了解他的哪个具体项目呢？"),
        format!("让我为您介绍一下{name}的专业背景。他是{title}，您可以问我他的工作经历、项目或技能。"),
        format!("您想了解{name}的哪个方面呢？我可以为您介绍他的项目经历、研究背景、专业技能或联系方式。"),
        format!("{name}是一位很有才华的{title}，在多个领域都有出色表现。您对哪个方面比较感兴趣？"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::builtin()
    }

    #[test]
    fn test_greeting_wins_over_later_categories() {
        let profile = profile();
        assert_eq!(classify("你好", &profile), Topic::Greeting);
        // also mentions contact and skills, greeting still comes first
        assert_eq!(classify("你好，请问怎么联系他？技能如何？", &profile), Topic::Greeting);
        assert_eq!(classify("HELLO there", &profile), Topic::Greeting);
    }

    #[test]
    fn test_classify_each_category() {
        let profile = profile();
        assert_eq!(classify("李磊", &profile), Topic::Identity);
        assert_eq!(classify("说说背景", &profile), Topic::Identity);
        assert_eq!(classify("深圳市建筑设计研究总院", &profile), Topic::Experience);
        assert_eq!(classify("工作经历", &profile), Topic::Experience);
        assert_eq!(classify("有哪些项目", &profile), Topic::Projects);
        assert_eq!(classify("会什么技术", &profile), Topic::Skills);
        assert_eq!(classify("邮箱多少", &profile), Topic::Contact);
        assert_eq!(classify("Contact", &profile), Topic::Contact);
        assert_eq!(classify("谢谢", &profile), Topic::Farewell);
        assert_eq!(classify("天气怎么样", &profile), Topic::Other);
    }

    #[test]
    fn test_short_names_classify() {
        let profile = profile();
        assert_eq!(classify("云鲸致是做什么的", &profile), Topic::Experience);
        assert_eq!(classify("云秒搭是什么", &profile), Topic::Projects);
        // full company names count as experience too
        assert_eq!(classify("香港大学", &profile), Topic::Experience);

        let mut bare = profile.clone();
        bare.experience_keywords.clear();
        bare.project_keywords.clear();
        assert_eq!(classify("云秒搭是什么", &bare), Topic::Other);
    }

    #[test]
    fn test_owner_wording_in_replies() {
        let profile = profile();
        assert!(greetings(&profile)
            .iter()
            .any(|g| g.contains("AI产品管理、建筑设计和研究领域")));

        let reply = local_reply("联系方式", &profile, &TemplatePicker::seeded(1)).unwrap();
        assert!(reply.ends_with("欢迎随时联系，他很乐意与您交流AI产品管理和技术创新的话题！"));

        let mut plain = profile.clone();
        plain.contact_note.clear();
        let reply = local_reply("联系方式", &plain, &TemplatePicker::seeded(1)).unwrap();
        assert!(reply.ends_with("欢迎随时联系！"));
    }

    #[test]
    fn test_greeting_reply_is_from_greeting_set() {
        let profile = profile();
        let picker = TemplatePicker::default();
        let expected = greetings(&profile);
        for _ in 0..20 {
            let reply = local_reply("你好", &profile, &picker).unwrap();
            assert!(expected.contains(&reply), "unexpected greeting: {}", reply);
        }
    }

    #[test]
    fn test_seeded_picker_is_repeatable() {
        let profile = profile();
        let first: Vec<String> = {
            let picker = TemplatePicker::seeded(42);
            (0..5).map(|_| local_reply("随便聊聊", &profile, &picker).unwrap()).collect()
        };
        let second: Vec<String> = {
            let picker = TemplatePicker::seeded(42);
            (0..5).map(|_| local_reply("随便聊聊", &profile, &picker).unwrap()).collect()
        };
        assert_eq!(first, second);
        assert!(first.iter().all(|r| prompts(&profile).contains(r)));
    }

    #[test]
    fn test_experience_listing_keeps_order() {
        let profile = profile();
        let reply = local_reply("工作经验", &profile, &TemplatePicker::seeded(1)).unwrap();
        let positions: Vec<usize> = profile
            .experience
            .iter()
            .map(|e| reply.find(&e.company).expect("company missing"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for exp in &profile.experience {
            assert!(reply.contains(&exp.position));
            assert!(reply.contains(&exp.description));
        }
    }

    #[test]
    fn test_contact_reply_embeds_every_field() {
        let profile = profile();
        let reply = local_reply("怎么找他", &profile, &TemplatePicker::seeded(1)).unwrap();
        assert!(reply.contains(&profile.contact.email));
        assert!(reply.contains(&profile.contact.phone));
        assert!(reply.contains(&profile.contact.linkedin));
        assert!(reply.contains(&profile.contact.github));
    }

    #[test]
    fn test_skills_reply_lists_skills() {
        let profile = profile();
        let reply = local_reply("擅长什么", &profile, &TemplatePicker::seeded(1)).unwrap();
        assert!(reply.contains(&profile.skills.join(", ")));
        assert_eq!(reply.lines().filter(|l| !l.is_empty()).count(), 4);
    }

    #[test]
    fn test_empty_message_fails() {
        let result = local_reply("  ", &profile(), &TemplatePicker::seeded(1));
        assert_eq!(result, Err(LocalReplyError::EmptyMessage));
    }

    #[test]
    fn test_missing_highlights_fail() {
        let mut profile = profile();
        profile.project_highlights.clear();
        let result = local_reply("项目", &profile, &TemplatePicker::seeded(1));
        assert_eq!(result, Err(LocalReplyError::NoTemplate(Topic::Projects)));
    }
}
