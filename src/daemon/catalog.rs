use std::sync::Arc;

use crate::process_api::ProcessObservation;

/// Canonical name of a tracked application, e.g. "Google Chrome" or "YouTube".
pub type AppName = Arc<str>;

struct Rule {
    /// Lowercase substring looked for in the raw signal.
    fragment: String,
    app: AppName,
}

impl Rule {
    fn new(fragment: &str, app: &str) -> Self {
        Self {
            fragment: fragment.to_lowercase(),
            app: Arc::from(app),
        }
    }
}

/// Static mapping from low-level process signals to canonical app names. Attribution
/// never classifies processes outside these rules.
pub struct AppCatalog {
    /// Matched against command-line arguments and window titles. A domain match
    /// attributes a browser process to the site being viewed rather than the browser.
    domain_rules: Vec<Rule>,
    /// Matched against executable names.
    process_rules: Vec<Rule>,
}

impl AppCatalog {
    /// The built-in catalog: major browsers plus the streaming sites they can host.
    pub fn default_catalog() -> Self {
        Self {
            domain_rules: vec![
                Rule::new("youtube.com", "YouTube"),
                Rule::new("netflix.com", "Netflix"),
            ],
            process_rules: vec![
                Rule::new("chrome", "Google Chrome"),
                Rule::new("firefox", "Firefox"),
                Rule::new("msedge", "Microsoft Edge"),
            ],
        }
    }

    /// Extends the catalog with process rules derived from user-added app names, so an
    /// app tracked through the cli is recognized once the daemon restarts.
    pub fn with_tracked_apps<'a>(mut self, apps: impl IntoIterator<Item = &'a str>) -> Self {
        for app in apps {
            let already_known = self
                .domain_rules
                .iter()
                .chain(self.process_rules.iter())
                .any(|rule| rule.app.as_ref() == app);
            if !already_known {
                self.process_rules.push(Rule::new(app, app));
            }
        }
        self
    }

    /// Maps one scan of the process table to the tracked app that currently has the
    /// user's attention. Domain substrings win over executable-name matches, so a
    /// browser showing a streaming site is attributed to the site.
    pub fn attribute(&self, observations: &[ProcessObservation]) -> Option<AppName> {
        for observation in observations {
            for rule in &self.domain_rules {
                if observation_mentions(observation, &rule.fragment) {
                    return Some(rule.app.clone());
                }
            }
        }

        for observation in observations {
            let process_name = observation.process_name.to_lowercase();
            for rule in &self.process_rules {
                if process_name.contains(&rule.fragment) {
                    return Some(rule.app.clone());
                }
            }
        }

        None
    }
}

fn observation_mentions(observation: &ProcessObservation, fragment: &str) -> bool {
    let in_cmdline = observation
        .cmdline
        .iter()
        .any(|arg| arg.to_lowercase().contains(fragment));
    let in_title = observation
        .window_title
        .as_deref()
        .is_some_and(|title| title.to_lowercase().contains(fragment));
    in_cmdline || in_title
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::process_api::ProcessObservation;

    use super::AppCatalog;

    fn observation(process_name: &str, cmdline: &[&str]) -> ProcessObservation {
        ProcessObservation {
            process_name: Arc::from(process_name),
            cmdline: cmdline.iter().map(|v| Arc::from(*v)).collect(),
            window_title: None,
        }
    }

    #[test]
    fn test_process_fragment_matches_browser() {
        let catalog = AppCatalog::default_catalog();
        let observations = [observation("chrome", &["chrome", "--type=renderer"])];
        assert_eq!(
            catalog.attribute(&observations).as_deref(),
            Some("Google Chrome")
        );
    }

    #[test]
    fn test_domain_match_wins_over_browser_process() {
        let catalog = AppCatalog::default_catalog();
        // The plain browser process comes first in the scan, but the domain signal in a
        // later process still decides the attribution.
        let observations = [
            observation("firefox", &["firefox"]),
            observation("chrome", &["chrome", "https://www.youtube.com/watch"]),
        ];
        assert_eq!(catalog.attribute(&observations).as_deref(), Some("YouTube"));
    }

    #[test]
    fn test_domain_match_in_window_title() {
        let catalog = AppCatalog::default_catalog();
        let observations = [ProcessObservation {
            process_name: Arc::from("chrome"),
            cmdline: vec![Arc::from("chrome")],
            window_title: Some(Arc::from("Vibing on NETFLIX.COM - Chrome")),
        }];
        assert_eq!(catalog.attribute(&observations).as_deref(), Some("Netflix"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let catalog = AppCatalog::default_catalog();
        let observations = [observation("MsEdge.exe", &[])];
        assert_eq!(
            catalog.attribute(&observations).as_deref(),
            Some("Microsoft Edge")
        );
    }

    #[test]
    fn test_unknown_processes_are_not_classified() {
        let catalog = AppCatalog::default_catalog();
        let observations = [observation("nvim", &["nvim", "main.rs"])];
        assert_eq!(catalog.attribute(&observations), None);
    }

    #[test]
    fn test_tracked_app_extends_process_rules() {
        let catalog = AppCatalog::default_catalog().with_tracked_apps(["Spotify"]);
        let observations = [observation("spotify", &[])];
        assert_eq!(catalog.attribute(&observations).as_deref(), Some("Spotify"));
    }

    #[test]
    fn test_tracked_app_does_not_duplicate_builtin_rules() {
        let catalog = AppCatalog::default_catalog().with_tracked_apps(["YouTube", "Firefox"]);
        let observations = [observation("firefox", &[])];
        assert_eq!(catalog.attribute(&observations).as_deref(), Some("Firefox"));
    }
}
