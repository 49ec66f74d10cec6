//! Declarative scenarios.
//!
//! A [`Suite`] is a list of [`ScenarioGroup`]s. Each group declares the users
//! its scenarios need and, optionally, who logs in before the steps run.
//! Scenarios are plain data so they can be loaded from YAML:
//!
//! ```yaml
//! groups:
//!   - name: Login
//!     setup:
//!       users:
//!         - { username: usertest, name: test1, password: "1234" }
//!     scenarios:
//!       - name: succeeds with correct credentials
//!         steps:
//!           - { action: login, username: usertest, password: "1234" }
//!           - { action: expect_visible, text: test1 logged in }
//! ```

use crate::helpers::blog_item;
use crate::locator::{Locator, Role};
use crate::result::{ProbeError, ProbeResult};
use crate::seed::NewUser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Something on the page a step can look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    /// Element with role and accessible name, optionally inside a blog entry
    Role {
        /// Accessible role
        role: Role,
        /// Accessible name
        name: String,
        /// Title of the blog entry to search in
        #[serde(default, skip_serializing_if = "Option::is_none")]
        within: Option<String>,
    },
    /// Element whose text contains `text`
    Text {
        /// Text fragment
        text: String,
    },
}

impl Target {
    /// Text target
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Page-level role target
    #[must_use]
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: name.into(),
            within: None,
        }
    }

    /// Button target scoped to the blog entry titled `title`
    #[must_use]
    pub fn button_in(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Role {
            role: Role::Button,
            name: name.into(),
            within: Some(title.into()),
        }
    }

    /// Locator for this target
    #[must_use]
    pub fn locator(&self) -> Locator {
        match self {
            Self::Text { text } => Locator::text(text),
            Self::Role {
                role,
                name,
                within: Some(title),
            } => blog_item(title).get_by_role(*role, name),
            Self::Role {
                role,
                name,
                within: None,
            } => Locator::role(*role, name),
        }
    }
}

/// One action or assertion in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Submit the login form
    Login {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// Click logout
    Logout,
    /// Create a blog and wait for it to be listed
    CreateBlog {
        /// Title
        title: String,
    },
    /// Expand a blog entry
    View {
        /// Title
        title: String,
    },
    /// Like a blog entry `times` times
    Like {
        /// Title
        title: String,
        /// Number of likes
        #[serde(default = "one")]
        times: u32,
    },
    /// Remove a blog entry, accepting the confirmation
    Remove {
        /// Title
        title: String,
    },
    /// Target becomes visible
    ExpectVisible(Target),
    /// Target is absent or hidden
    ExpectHidden(Target),
    /// Blog entries contain these titles, top to bottom
    ExpectOrder {
        /// Titles in expected order
        titles: Vec<String>,
    },
    /// Every blog entry shows a like count and counts never increase
    ExpectLikesRanked,
    /// `"<name> logged in"` is shown
    ExpectLoggedIn {
        /// Display name
        name: String,
    },
    /// The login form is shown and nobody is logged in
    ExpectLoggedOut,
}

const fn one() -> u32 {
    1
}

impl Step {
    /// Login step
    #[must_use]
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Login {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create-blog step
    #[must_use]
    pub fn create_blog(title: impl Into<String>) -> Self {
        Self::CreateBlog {
            title: title.into(),
        }
    }

    /// View step
    #[must_use]
    pub fn view(title: impl Into<String>) -> Self {
        Self::View {
            title: title.into(),
        }
    }

    /// Like step
    #[must_use]
    pub fn like(title: impl Into<String>, times: u32) -> Self {
        Self::Like {
            title: title.into(),
            times,
        }
    }

    /// Remove step
    #[must_use]
    pub fn remove(title: impl Into<String>) -> Self {
        Self::Remove {
            title: title.into(),
        }
    }

    /// Text-visible step
    #[must_use]
    pub fn expect_text(text: impl Into<String>) -> Self {
        Self::ExpectVisible(Target::text(text))
    }

    /// Text-hidden step
    #[must_use]
    pub fn expect_no_text(text: impl Into<String>) -> Self {
        Self::ExpectHidden(Target::text(text))
    }

    /// Order step
    #[must_use]
    pub fn expect_order<S: Into<String>>(titles: impl IntoIterator<Item = S>) -> Self {
        Self::ExpectOrder {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// Logged-in step
    #[must_use]
    pub fn expect_logged_in(name: impl Into<String>) -> Self {
        Self::ExpectLoggedIn { name: name.into() }
    }

    /// Whether this step is a verdict rather than an action
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::ExpectVisible(_)
                | Self::ExpectHidden(_)
                | Self::ExpectOrder { .. }
                | Self::ExpectLikesRanked
                | Self::ExpectLoggedIn { .. }
                | Self::ExpectLoggedOut
        )
    }

    /// Short label for logs and reports
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Login { username, .. } => format!("login as {username}"),
            Self::Logout => "logout".to_string(),
            Self::CreateBlog { title } => format!("create blog {title:?}"),
            Self::View { title } => format!("view {title:?}"),
            Self::Like { title, times } => format!("like {title:?} x{times}"),
            Self::Remove { title } => format!("remove {title:?}"),
            Self::ExpectVisible(target) => format!("expect {} visible", target.locator()),
            Self::ExpectHidden(target) => format!("expect {} hidden", target.locator()),
            Self::ExpectOrder { titles } => format!("expect order {titles:?}"),
            Self::ExpectLikesRanked => "expect blogs ranked by likes".to_string(),
            Self::ExpectLoggedIn { name } => format!("expect {name} logged in"),
            Self::ExpectLoggedOut => "expect logged out".to_string(),
        }
    }
}

/// Login performed after navigation, before the steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Group-level setup, applied before every scenario of the group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    /// Users seeded after the reset
    #[serde(default)]
    pub users: Vec<NewUser>,
    /// Login performed once the frontend is open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<Credentials>,
}

impl Setup {
    /// Setup with no users
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user
    #[must_use]
    pub fn with_user(mut self, user: NewUser) -> Self {
        self.users.push(user);
        self
    }

    /// Log in before the steps
    #[must_use]
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Steps, run in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// Scenarios sharing a setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioGroup {
    /// Group name
    pub name: String,
    /// Setup applied before each scenario
    #[serde(default)]
    pub setup: Setup,
    /// Scenarios
    pub scenarios: Vec<Scenario>,
}

impl ScenarioGroup {
    /// Create an empty group
    #[must_use]
    pub fn new(name: impl Into<String>, setup: Setup) -> Self {
        Self {
            name: name.into(),
            setup,
            scenarios: Vec::new(),
        }
    }

    /// Append a scenario
    #[must_use]
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Full name of a scenario in this group
    #[must_use]
    pub fn full_name(&self, scenario: &Scenario) -> String {
        format!("{} > {}", self.name, scenario.name)
    }
}

/// An ordered collection of scenario groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    /// Groups, run in order
    pub groups: Vec<ScenarioGroup>,
}

impl Suite {
    /// Create an empty suite
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group
    #[must_use]
    pub fn group(mut self, group: ScenarioGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Number of scenarios across all groups
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.groups.iter().map(|g| g.scenarios.len()).sum()
    }

    /// Full names of all scenarios, in run order
    #[must_use]
    pub fn scenario_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.scenarios.iter().map(move |s| g.full_name(s)))
            .collect()
    }

    /// Parse a suite from YAML
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the suite is empty
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        let suite: Self = serde_yaml_ng::from_str(text)?;
        if suite.scenario_count() == 0 {
            return Err(ProbeError::Config {
                message: "scenario file defines no scenarios".to_string(),
            });
        }
        Ok(suite)
    }

    /// Load a suite from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const LOGIN_YAML: &str = r#"
groups:
  - name: Login
    setup:
      users:
        - { username: usertest, name: test1, password: "1234" }
    scenarios:
      - name: succeeds with correct credentials
        steps:
          - { action: login, username: usertest, password: "1234" }
          - { action: expect_visible, text: test1 logged in }
          - { action: expect_hidden, role: button, name: remove, within: first blog }
          - { action: like, title: first blog }
          - action: expect_logged_out
"#;

    #[test]
    fn test_parse_yaml_suite() {
        let suite = Suite::from_yaml(LOGIN_YAML).unwrap();
        assert_eq!(suite.scenario_count(), 1);
        let group = &suite.groups[0];
        assert_eq!(group.setup.users[0].name, "test1");
        assert!(group.setup.login.is_none());
        let steps = &group.scenarios[0].steps;
        assert_eq!(steps[0], Step::login("usertest", "1234"));
        assert_eq!(steps[1], Step::expect_text("test1 logged in"));
        assert_eq!(
            steps[2],
            Step::ExpectHidden(Target::button_in("remove", "first blog"))
        );
        assert_eq!(steps[3], Step::like("first blog", 1));
        assert_eq!(steps[4], Step::ExpectLoggedOut);
    }

    #[test]
    fn test_empty_suite_rejected() {
        let err = Suite::from_yaml("groups: []\n").unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let yaml = "groups:\n  - name: g\n    scenarios:\n      - name: s\n        steps:\n          - { action: fly }\n";
        assert!(matches!(Suite::from_yaml(yaml), Err(ProbeError::Yaml(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let suite = Suite::new().group(
            ScenarioGroup::new(
                "when logged in",
                Setup::new()
                    .with_user(NewUser::new("testuser", "test", "1234"))
                    .with_login("testuser", "1234"),
            )
            .scenario(
                Scenario::new("like")
                    .step(Step::create_blog("liked blog"))
                    .step(Step::view("liked blog"))
                    .step(Step::like("liked blog", 2)),
            ),
        );
        let yaml = suite.to_yaml().unwrap();
        assert_eq!(Suite::from_yaml(&yaml).unwrap(), suite);
    }

    #[test]
    fn test_target_locators() {
        assert_eq!(
            Target::text("Wrong credentials").locator(),
            Locator::text("Wrong credentials")
        );
        assert_eq!(
            Target::button_in("remove", "delete this blog").locator(),
            blog_item("delete this blog").get_by_role(Role::Button, "remove")
        );
        assert_eq!(
            Target::role(Role::Button, "login").locator(),
            Locator::role(Role::Button, "login")
        );
    }

    #[test]
    fn test_step_kinds_and_names() {
        assert!(Step::expect_text("x").is_assertion());
        assert!(!Step::remove("x").is_assertion());
        let group = ScenarioGroup::new("Login", Setup::new()).scenario(Scenario::new("fails"));
        assert_eq!(group.full_name(&group.scenarios[0]), "Login > fails");
        assert_eq!(Step::like("a", 2).label(), "like \"a\" x2");
    }
}
