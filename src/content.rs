use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteContent {
    pub home: HomeContent,
    pub about: AboutContent,
    pub projects: Vec<Project>,
    pub contacts: ContactsContent,
    pub story: StoryContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
}

/// A home page call to action: pressing `key` opens the page with id `target`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageAction {
    pub label: String,
    pub key: char,
    pub target: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeContent {
    pub name: String,
    pub tagline: String,
    pub intro: String,
    pub services: Vec<Entry>,
    pub technologies: Vec<String>,
    #[serde(default)]
    pub actions: Vec<PageAction>,
}

impl HomeContent {
    pub fn action_for(&self, key: char) -> Option<&PageAction> {
        self.actions.iter().find(|action| action.key == key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillLevel {
    pub level: u8,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineItem {
    pub title: String,
    pub place: String,
    pub description: String,
    pub period: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AboutContent {
    pub skill_levels: Vec<SkillLevel>,
    pub skills: Vec<Skill>,
    pub education: Vec<TimelineItem>,
    pub experience: Vec<TimelineItem>,
}

impl AboutContent {
    pub fn level_name(&self, level: u8) -> &str {
        self.skill_levels
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.name.as_str())
            .unwrap_or("?")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactsContent {
    pub intro: String,
    pub links: Vec<ContactLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryContent {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub chapters: Vec<Chapter>,
    pub closing: String,
}

impl SiteContent {
    /// Distinct project categories in first-seen order.
    pub fn project_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for project in &self.projects {
            if !categories.contains(&project.category.as_str()) {
                categories.push(&project.category);
            }
        }
        categories
    }

    /// Distinct technologies across all projects in first-seen order.
    pub fn project_technologies(&self) -> Vec<&str> {
        let mut techs: Vec<&str> = Vec::new();
        for tech in self.projects.iter().flat_map(|project| &project.technologies) {
            if !techs.contains(&tech.as_str()) {
                techs.push(tech);
            }
        }
        techs
    }
}

pub fn content() -> &'static SiteContent {
    static CONTENT: OnceLock<SiteContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        let raw = include_str!("../assets/content.json");
        serde_json::from_str(raw).unwrap_or_else(|err| {
            log::error!("bundled page content is invalid: {err}");
            SiteContent::default()
        })
    })
}
