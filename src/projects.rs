use crate::content::Project;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    pub category: String,
    pub techs: Vec<String>,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            techs: Vec::new(),
        }
    }
}

impl ProjectFilter {
    /// Search is case-insensitive over title and description. Technologies
    /// combine with AND.
    pub fn matches(&self, project: &Project) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || project.title.to_lowercase().contains(&needle)
            || project.description.to_lowercase().contains(&needle);
        let matches_category =
            self.category == ALL_CATEGORIES || self.category == project.category;
        let matches_techs = self
            .techs
            .iter()
            .all(|tech| project.technologies.iter().any(|used| used == tech));

        matches_search && matches_category && matches_techs
    }

    pub fn toggle_tech(&mut self, tech: &str) {
        if let Some(pos) = self.techs.iter().position(|selected| selected == tech) {
            self.techs.remove(pos);
        } else {
            self.techs.push(tech.to_string());
        }
    }

    pub fn has_tech(&self, tech: &str) -> bool {
        self.techs.iter().any(|selected| selected == tech)
    }

    /// Steps through `All` followed by `categories`, wrapping around.
    pub fn cycle_category(&mut self, categories: &[&str]) {
        let position = categories
            .iter()
            .position(|category| *category == self.category);
        self.category = match position {
            None if categories.is_empty() => ALL_CATEGORIES.to_string(),
            None => categories[0].to_string(),
            Some(index) if index + 1 < categories.len() => categories[index + 1].to_string(),
            Some(_) => ALL_CATEGORIES.to_string(),
        };
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.category != ALL_CATEGORIES || !self.techs.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Projects page state: the filter, the highlighted row among the visible
/// projects, the technology picker cursor and an optional detail view.
#[derive(Debug, Clone, Default)]
pub struct ProjectBrowser {
    pub filter: ProjectFilter,
    pub searching: bool,
    selected: usize,
    tech_cursor: usize,
    detail: Option<usize>,
}

impl ProjectBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices into `projects` of the entries passing the filter, in order.
    pub fn visible(&self, projects: &[Project]) -> Vec<usize> {
        projects
            .iter()
            .enumerate()
            .filter(|(_, project)| self.filter.matches(project))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn tech_cursor(&self) -> usize {
        self.tech_cursor
    }

    /// Index into the full project list of the open detail view.
    pub fn detail(&self) -> Option<usize> {
        self.detail
    }

    pub fn select_next(&mut self, projects: &[Project]) {
        let count = self.visible(projects).len();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_tech_cursor(&mut self, delta: isize, tech_count: usize) {
        if tech_count == 0 {
            self.tech_cursor = 0;
            return;
        }
        let count = tech_count as isize;
        self.tech_cursor = (self.tech_cursor as isize + delta).rem_euclid(count) as usize;
    }

    pub fn toggle_tech_at_cursor(&mut self, techs: &[&str]) {
        if let Some(tech) = techs.get(self.tech_cursor) {
            self.filter.toggle_tech(tech);
            self.selected = 0;
        }
    }

    pub fn cycle_category(&mut self, categories: &[&str]) {
        self.filter.cycle_category(categories);
        self.selected = 0;
    }

    pub fn push_search(&mut self, ch: char) {
        self.filter.search.push(ch);
        self.selected = 0;
    }

    pub fn pop_search(&mut self) {
        self.filter.search.pop();
        self.selected = 0;
    }

    /// Opens the detail view for the highlighted project, if any is visible.
    pub fn open_detail(&mut self, projects: &[Project]) -> bool {
        match self.visible(projects).get(self.selected) {
            Some(&index) => {
                self.detail = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.searching = false;
        self.selected = 0;
        self.detail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn project(title: &str, category: &str, techs: &[&str]) -> Project {
        Project {
            title: title.to_string(),
            description: format!("{title} description"),
            category: category.to_string(),
            technologies: techs.iter().map(|tech| tech.to_string()).collect(),
        }
    }

    fn sample() -> Vec<Project> {
        vec![
            project("Shop", "Web Apps", &["React", "MySQL"]),
            project("Charts", "Data Visualization", &["Python"]),
            project("Inventory", "Desktop Apps", &["Python", "MySQL"]),
        ]
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = ProjectFilter::default();
        assert!(!filter.is_active());
        assert!(sample().iter().all(|p| filter.matches(p)));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let projects = sample();
        let mut filter = ProjectFilter {
            search: "CHART".to_string(),
            ..ProjectFilter::default()
        };
        assert!(filter.matches(&projects[1]));
        assert!(!filter.matches(&projects[0]));

        filter.search = "inventory DESC".to_string();
        assert!(filter.matches(&projects[2]));
    }

    #[test]
    fn tech_filter_requires_every_selected_tech() {
        let projects = sample();
        let mut filter = ProjectFilter::default();
        filter.toggle_tech("Python");
        filter.toggle_tech("MySQL");

        // Charts uses Python but not MySQL, so it is excluded.
        assert!(!filter.matches(&projects[1]));
        assert!(filter.matches(&projects[2]));
        assert!(!filter.matches(&projects[0]));
    }

    #[test]
    fn toggle_tech_removes_a_selected_tech() {
        let mut filter = ProjectFilter::default();
        filter.toggle_tech("Python");
        assert!(filter.has_tech("Python"));
        filter.toggle_tech("Python");
        assert!(filter.techs.is_empty());
    }

    #[test]
    fn category_cycle_wraps_back_to_all() {
        let categories = ["Web Apps", "Bots"];
        let mut filter = ProjectFilter::default();
        filter.cycle_category(&categories);
        assert_eq!(filter.category, "Web Apps");
        filter.cycle_category(&categories);
        assert_eq!(filter.category, "Bots");
        filter.cycle_category(&categories);
        assert_eq!(filter.category, ALL_CATEGORIES);
    }

    #[test]
    fn reset_clears_every_criterion() {
        let mut filter = ProjectFilter {
            search: "x".to_string(),
            category: "Bots".to_string(),
            techs: vec!["Python".to_string()],
        };
        assert!(filter.is_active());
        filter.reset();
        assert_eq!(filter, ProjectFilter::default());
    }

    #[test]
    fn browser_detail_tracks_the_filtered_row() {
        let projects = sample();
        let mut browser = ProjectBrowser::new();
        browser.filter.category = "Desktop Apps".to_string();
        assert_eq!(browser.visible(&projects), vec![2]);

        assert!(browser.open_detail(&projects));
        assert_eq!(browser.detail(), Some(2));
        browser.close_detail();

        browser.push_search('z');
        assert!(browser.visible(&projects).is_empty());
        assert!(!browser.open_detail(&projects));

        browser.reset();
        assert_eq!(browser.visible(&projects).len(), projects.len());
        assert!(browser.detail().is_none());
    }

    #[test]
    fn browser_selection_stays_within_visible_rows() {
        let projects = sample();
        let mut browser = ProjectBrowser::new();
        for _ in 0..5 {
            browser.select_next(&projects);
        }
        assert_eq!(browser.selected(), 2);
        browser.select_prev();
        assert_eq!(browser.selected(), 1);

        browser.move_tech_cursor(-1, 3);
        assert_eq!(browser.tech_cursor(), 2);
        browser.toggle_tech_at_cursor(&["React", "Python", "MySQL"]);
        assert_eq!(browser.filter.techs, vec!["MySQL".to_string()]);
        assert_eq!(browser.selected(), 0);
    }

    proptest! {
        #[test]
        fn selected_techs_are_all_present_in_matches(
            picks in proptest::collection::vec(0usize..4, 0..4),
            uses in proptest::collection::vec(0usize..4, 0..4),
        ) {
            let pool = ["Python", "MySQL", "React", "Figma"];
            let candidate = project(
                "P",
                "Web Apps",
                &uses.iter().map(|i| pool[*i]).collect::<Vec<_>>(),
            );
            let mut filter = ProjectFilter::default();
            for index in &picks {
                if !filter.has_tech(pool[*index]) {
                    filter.toggle_tech(pool[*index]);
                }
            }

            let every = filter
                .techs
                .iter()
                .all(|tech| candidate.technologies.contains(tech));
            prop_assert_eq!(filter.matches(&candidate), every);
        }

        #[test]
        fn filtering_never_adds_projects(search in "[a-zA-Z ]{0,6}") {
            let projects = sample();
            let mut browser = ProjectBrowser::new();
            let all = browser.visible(&projects).len();
            for ch in search.chars() {
                browser.push_search(ch);
            }
            prop_assert!(browser.visible(&projects).len() <= all);
        }
    }
}
