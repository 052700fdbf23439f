use crate::client::ClientError;
use crate::model::PersistedProject;

/// Narrow read-only seam over the datastore so the concrete technology is
/// swappable without touching filter or render logic. Implementations return
/// projects ordered by creation time, newest first.
pub trait ProjectRepository {
    fn list_projects(&self) -> Result<Vec<PersistedProject>, ClientError>;
}

/// Client-side state of the project browsing view: one load on entry, then
/// pure filtering over the loaded list.
pub struct ProjectBrowser {
    projects: Vec<PersistedProject>,
}

impl ProjectBrowser {
    pub fn new() -> Self {
        ProjectBrowser { projects: Vec::new() }
    }

    /// Issues one repository query. A failed load is logged and leaves the
    /// list empty; to the caller it is indistinguishable from an empty
    /// datastore (known gap, preserved deliberately).
    pub fn load(&mut self, repo: &dyn ProjectRepository) {
        match repo.list_projects() {
            Ok(projects) => self.projects = projects,
            Err(err) => {
                eprintln!("❌ Error fetching projects: {err}");
                self.projects = Vec::new();
            }
        }
    }

    pub fn projects(&self) -> &[PersistedProject] {
        &self.projects
    }

    /// Pure filter over the loaded list, order-preserving. A project matches
    /// when the search text (case-insensitive) occurs in its title, location
    /// or promoter name, and the sector (when given) matches exactly.
    pub fn filter(&self, search: &str, sector: &str) -> Vec<&PersistedProject> {
        let needle = search.to_lowercase();
        self.projects
            .iter()
            .filter(|project| {
                let matches_search = needle.is_empty()
                    || project.title.to_lowercase().contains(&needle)
                    || project.location.to_lowercase().contains(&needle)
                    || project.promoter_name.to_lowercase().contains(&needle);
                let matches_sector = sector.is_empty() || project.sector == sector;
                matches_search && matches_sector
            })
            .collect()
    }

    /// Distinct sector values present in the loaded list (not the fixed
    /// catalog), in first-seen order.
    pub fn available_sectors(&self) -> Vec<String> {
        let mut sectors: Vec<String> = Vec::new();
        for project in &self.projects {
            if !sectors.contains(&project.sector) {
                sectors.push(project.sector.clone());
            }
        }
        sectors
    }
}

impl Default for ProjectBrowser {
    fn default() -> Self {
        ProjectBrowser::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRepo(Vec<PersistedProject>);

    impl ProjectRepository for FixedRepo {
        fn list_projects(&self) -> Result<Vec<PersistedProject>, ClientError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRepo;

    impl ProjectRepository for FailingRepo {
        fn list_projects(&self) -> Result<Vec<PersistedProject>, ClientError> {
            Err(ClientError::Status(503))
        }
    }

    fn project(id: &str, title: &str, location: &str, promoter: &str, sector: &str) -> PersistedProject {
        PersistedProject {
            id: id.to_string(),
            title: title.to_string(),
            location: location.to_string(),
            promoter_name: promoter.to_string(),
            sector: sector.to_string(),
            ..Default::default()
        }
    }

    fn loaded_browser() -> ProjectBrowser {
        let mut browser = ProjectBrowser::new();
        browser.load(&FixedRepo(vec![
            project("3", "Solar Dryer", "Pune, Maharashtra", "A. Patil", "Food Tech"),
            project("2", "Cold Storage", "Delhi", "R. Sharma", "Agro Processing"),
            project("1", "Drip Irrigation", "Nashik", "S. Kulkarni", "Food Tech"),
        ]));
        browser
    }

    #[test]
    fn empty_filter_returns_list_unchanged() {
        let browser = loaded_browser();
        let all = browser.filter("", "");
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_location_promoter() {
        let browser = loaded_browser();

        let by_location = browser.filter("pune", "");
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].title, "Solar Dryer");

        let by_promoter = browser.filter("sharma", "");
        assert_eq!(by_promoter.len(), 1);
        assert_eq!(by_promoter[0].location, "Delhi");

        assert!(browser.filter("bengaluru", "").is_empty());
    }

    #[test]
    fn sector_filter_is_exact_and_combines_with_search() {
        let browser = loaded_browser();

        let food_tech = browser.filter("", "Food Tech");
        assert_eq!(food_tech.len(), 2);

        let combined = browser.filter("nashik", "Food Tech");
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].title, "Drip Irrigation");

        assert!(browser.filter("", "Food").is_empty());
    }

    #[test]
    fn available_sectors_are_distinct_in_first_seen_order() {
        let browser = loaded_browser();
        assert_eq!(
            browser.available_sectors(),
            vec!["Food Tech".to_string(), "Agro Processing".to_string()]
        );
    }

    #[test]
    fn failed_load_leaves_list_empty_without_panicking() {
        let mut browser = ProjectBrowser::new();
        browser.load(&FailingRepo);
        assert!(browser.projects().is_empty());
        assert!(browser.filter("", "").is_empty());
        assert!(browser.available_sectors().is_empty());
    }

    #[test]
    fn reload_after_failure_replaces_the_list() {
        let mut browser = ProjectBrowser::new();
        browser.load(&FailingRepo);
        browser.load(&FixedRepo(vec![project("1", "Seed Bank", "Jaipur", "M. Singh", "Forestry")]));
        assert_eq!(browser.projects().len(), 1);
    }
}
